// src/core/scanner/tls_probe.rs

use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rustls::{ClientConfig, ClientConnection, ProtocolVersion, RootCertStore, ServerName};
use tokio::task::spawn_blocking;
use tracing::{debug, error, info, warn};
use x509_parser::prelude::*;

/// Upper bound for the TCP connect and for each handshake read/write.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds a rustls client configuration backed by the platform trust store.
pub fn client_config() -> Result<Arc<ClientConfig>, String> {
    let mut root_store = RootCertStore::empty();
    let native_certs = rustls_native_certs::load_native_certs()
        .map_err(|e| format!("Could not load native certificates: {e}"))?;
    for cert in native_certs {
        if let Err(e) = root_store.add(&rustls::Certificate(cert.0)) {
            warn!(error = %e, "Skipping unusable root certificate.");
        }
    }

    let config = ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Ok(Arc::new(config))
}

/// Connects to `host:port` and performs a TLS handshake presenting `host` as
/// the SNI value, validated against the platform trust store.
///
/// Ok carries the negotiated protocol version; any failure (timeout, refusal,
/// certificate rejection) comes back as an Err description, never a panic.
pub async fn handshake(config: Arc<ClientConfig>, host: &str, port: u16) -> Result<String, String> {
    info!(host, port, "Starting TLS handshake probe.");
    let host_owned = host.to_string();

    debug!("Spawning blocking task for the TLS connection.");
    spawn_blocking(move || perform_handshake(config, &host_owned, port))
        .await
        .unwrap_or_else(|e| {
            error!(panic = %e, "Blocking TLS probe task panicked!");
            Err(format!("Task panicked: {e}"))
        })
}

fn perform_handshake(config: Arc<ClientConfig>, host: &str, port: u16) -> Result<String, String> {
    let server_name =
        ServerName::try_from(host).map_err(|e| format!("Invalid server name '{host}': {e}"))?;

    let addr = (host, port)
        .to_socket_addrs()
        .map_err(|e| format!("Address lookup error: {e}"))?
        .next()
        .ok_or_else(|| format!("No address found for {host}"))?;

    debug!(%addr, "Connecting TCP stream.");
    let mut sock = TcpStream::connect_timeout(&addr, PROBE_TIMEOUT)
        .map_err(|e| format!("TCP connection error: {e}"))?;
    sock.set_read_timeout(Some(PROBE_TIMEOUT))
        .and_then(|_| sock.set_write_timeout(Some(PROBE_TIMEOUT)))
        .map_err(|e| format!("Socket setup error: {e}"))?;

    // The socket is owned by this frame, so every early return below also
    // closes the connection.
    let mut conn = ClientConnection::new(config, server_name)
        .map_err(|e| format!("TLS client error: {e}"))?;

    debug!(host, "Driving TLS handshake.");
    while conn.is_handshaking() {
        conn.complete_io(&mut sock)
            .map_err(|e| format!("TLS handshake error: {e}"))?;
    }

    if let Some(cert) = conn.peer_certificates().and_then(|certs| certs.first()) {
        log_peer_certificate(&cert.0);
    }

    let version = conn
        .protocol_version()
        .map(version_name)
        .unwrap_or_else(|| "unknown".to_string());
    info!(host, port, %version, "TLS handshake succeeded.");
    Ok(version)
}

fn version_name(version: ProtocolVersion) -> String {
    match version {
        ProtocolVersion::TLSv1_3 => "TLSv1.3".to_string(),
        ProtocolVersion::TLSv1_2 => "TLSv1.2".to_string(),
        other => format!("{other:?}"),
    }
}

/// Certificate metadata is logged for operators; it does not feed the score.
fn log_peer_certificate(der: &[u8]) {
    match parse_x509_certificate(der) {
        Ok((_, x509)) => {
            let not_after = asn1_time_to_chrono_utc(&x509.validity().not_after);
            let days_until_expiry = not_after.signed_duration_since(Utc::now()).num_days();
            debug!(
                subject = %x509.subject(),
                issuer = %x509.issuer(),
                days_until_expiry,
                "Parsed peer certificate."
            );
        }
        Err(e) => warn!(error = %e, "Could not parse peer certificate."),
    }
}

fn asn1_time_to_chrono_utc(time: &ASN1Time) -> DateTime<Utc> {
    DateTime::from_timestamp(time.timestamp(), 0).unwrap_or_default()
}
