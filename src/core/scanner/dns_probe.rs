// src/core/scanner/dns_probe.rs

use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use tracing::{debug, warn};

/// Checks whether `hostname` resolves to at least one address.
///
/// Any resolution failure (NXDOMAIN, timeout, transport error) yields
/// `false`; this probe never propagates a fault.
pub async fn resolve(hostname: &str) -> bool {
    debug!(hostname, "Resolving target host.");
    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());

    match resolver.lookup_ip(hostname).await {
        Ok(lookup) => {
            let found = lookup.iter().next().is_some();
            debug!(hostname, found, "DNS lookup completed.");
            found
        }
        Err(e) => {
            warn!(hostname, error = %e, "DNS lookup failed.");
            false
        }
    }
}
