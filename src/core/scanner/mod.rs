// src/core/scanner/mod.rs

pub mod dns_probe;
pub mod tls_probe;

use std::sync::Arc;

use async_trait::async_trait;
use rustls::ClientConfig;
use tracing::info;

use crate::core::models::ScoreReport;
use crate::core::{parser, scorer};

/// Network reachability checks consumed by the scorer.
///
/// The scorer takes this as an injected capability, so tests can pin both
/// outcomes without touching the network.
#[async_trait]
pub trait NetworkProbe: Send + Sync {
    /// True iff the hostname resolves to at least one address.
    async fn resolve(&self, hostname: &str) -> bool;

    /// Performs a TLS handshake against `host:port` with `host` as SNI.
    /// Ok carries the negotiated protocol version, Err a failure description.
    async fn handshake(&self, host: &str, port: u16) -> Result<String, String>;
}

/// Production probe: hickory DNS resolution plus a rustls handshake against
/// the platform trust store.
pub struct LiveProbe {
    tls_config: Arc<ClientConfig>,
}

impl LiveProbe {
    pub fn new() -> Result<Self, String> {
        Ok(Self {
            tls_config: tls_probe::client_config()?,
        })
    }
}

#[async_trait]
impl NetworkProbe for LiveProbe {
    async fn resolve(&self, hostname: &str) -> bool {
        dns_probe::resolve(hostname).await
    }

    async fn handshake(&self, host: &str, port: u16) -> Result<String, String> {
        tls_probe::handshake(self.tls_config.clone(), host, port).await
    }
}

/// Runs one full audit: parse the link, then score it with `probe` supplying
/// the network evidence.
pub async fn run_audit(raw: &str, probe: &dyn NetworkProbe) -> ScoreReport {
    let config = parser::parse(raw);
    info!(
        protocol = %config.protocol,
        host = %config.host,
        port = config.port,
        "Link parsed, starting audit."
    );

    let report = scorer::score(&config, probe).await;
    info!(
        percent = report.percent,
        issues = report.issues.len(),
        "Audit finished."
    );
    report
}
