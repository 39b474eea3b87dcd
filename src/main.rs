// src/main.rs

use clap::Parser;
use color_eyre::eyre::{Result, eyre};

mod core;
mod logging;
mod report;

use crate::core::scanner::{self, LiveProbe};

/// Audits vmess://, vless:// and trojan:// links for security posture.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The configuration link to audit.
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    logging::initialize_logging()?;

    let cli = Cli::parse();
    let probe = LiveProbe::new().map_err(|e| eyre!(e))?;

    println!("\nAnalyzing Config:\n{}", cli.config);
    let result = scanner::run_audit(&cli.config, &probe).await;
    report::render(&result);

    Ok(())
}
