// src/report.rs

use crossterm::style::Stylize;

use crate::core::models::{Finding, ScoreReport, Severity};

/// Rating band for a score percentage. Boundaries are inclusive on the lower
/// band, so exactly 30 still reads "Low Security".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityRating {
    Low,
    MediumLow,
    Good,
    High,
}

impl SecurityRating {
    pub fn from_percent(percent: u8) -> Self {
        match percent {
            0..=30 => Self::Low,
            31..=60 => Self::MediumLow,
            61..=85 => Self::Good,
            _ => Self::High,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low Security",
            Self::MediumLow => "Medium-Low",
            Self::Good => "Good",
            Self::High => "High Security",
        }
    }
}

/// Renders the audit outcome to stdout: the colored score line, then one
/// line per finding colored by severity, then a separator.
pub fn render(report: &ScoreReport) {
    println!("\nSecurity Score: {}", score_line(report.percent));

    if !report.issues.is_empty() {
        println!("\nIssues found:");
        for finding in &report.issues {
            println!(" - {}", styled_message(finding));
        }
    }

    println!("\n{}", "-".repeat(60));
}

fn score_line(percent: u8) -> String {
    let rating = SecurityRating::from_percent(percent);
    let text = format!("{}% ({})", percent, rating.label());
    match rating {
        SecurityRating::Low => text.red().to_string(),
        SecurityRating::MediumLow => text.yellow().to_string(),
        SecurityRating::Good => text.green().to_string(),
        SecurityRating::High => text.green().bold().to_string(),
    }
}

fn styled_message(finding: &Finding) -> String {
    let message = finding.message.clone();
    match finding.severity {
        Severity::Critical => message.red().to_string(),
        Severity::Warning => message.yellow().to_string(),
        Severity::Info => message.grey().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_band_boundaries() {
        assert_eq!(SecurityRating::from_percent(30).label(), "Low Security");
        assert_eq!(SecurityRating::from_percent(31).label(), "Medium-Low");
        assert_eq!(SecurityRating::from_percent(60).label(), "Medium-Low");
        assert_eq!(SecurityRating::from_percent(61).label(), "Good");
        assert_eq!(SecurityRating::from_percent(85).label(), "Good");
        assert_eq!(SecurityRating::from_percent(86).label(), "High Security");
        assert_eq!(SecurityRating::from_percent(100).label(), "High Security");
    }

    #[test]
    fn zero_percent_is_low() {
        assert_eq!(SecurityRating::from_percent(0), SecurityRating::Low);
    }
}
