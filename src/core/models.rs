// src/core/models.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Proxy link scheme recognized by the parser. `Unknown` is terminal: a link
/// that matches no supported scheme is never probed or scored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Protocol {
    VMess,
    VLess,
    Trojan,
    Unknown,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::VMess => write!(f, "vmess"),
            Protocol::VLess => write!(f, "vless"),
            Protocol::Trojan => write!(f, "trojan"),
            Protocol::Unknown => write!(f, "unknown"),
        }
    }
}

/// Semantic connection parameters extracted from a link.
///
/// Every field is a plain string; an empty string means the source carried no
/// value for it. VMess links fill these from the decoded JSON payload,
/// VLESS/Trojan links from URI query parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFields {
    pub tls: String,
    pub net: String,
    pub sni_host: String,
    pub path: String,
    pub encryption: String,
    pub alter_id: String,
    pub security: String,
}

/// Canonical result of parsing a raw link.
///
/// Parsing never fails outward: malformed input comes back with
/// `decode_error` set and empty fields, and scoring short-circuits on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedConfig {
    pub protocol: Protocol,
    /// Target host, empty when the link carries none.
    pub host: String,
    /// Target port, 0 when absent or unparseable.
    pub port: u16,
    pub fields: ConfigFields,
    pub decode_error: Option<String>,
}

impl ParsedConfig {
    pub fn empty(protocol: Protocol) -> Self {
        Self {
            protocol,
            host: String::new(),
            port: 0,
            fields: ConfigFields::default(),
            decode_error: None,
        }
    }

    pub fn failed(protocol: Protocol, error: String) -> Self {
        Self {
            decode_error: Some(error),
            ..Self::empty(protocol)
        }
    }
}

/// Severity of a single finding. Drives the color of the issue line in the
/// rendered report; it has no effect on the score itself.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

/// One failed checklist criterion, in evaluation order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Outcome of the DNS + TLS checks for one (host, port) pair. Built fresh on
/// every evaluation; nothing is cached between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    pub dns_resolved: bool,
    pub tls_ok: bool,
    /// Negotiated protocol version on success, failure description otherwise.
    pub tls_detail: String,
}

/// Final audit verdict: a truncating percentage and the ordered findings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreReport {
    pub percent: u8,
    pub issues: Vec<Finding>,
}

impl ScoreReport {
    /// Terminal zero-score report carrying a single message, used for
    /// unrecognized formats and decode failures.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            percent: 0,
            issues: vec![Finding::new(Severity::Critical, message)],
        }
    }
}
