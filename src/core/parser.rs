// src/core/parser.rs

use base64::{Engine as _, engine::general_purpose};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::core::models::{ConfigFields, ParsedConfig, Protocol};

/// Decodes a raw proxy link into its canonical representation.
///
/// Dispatches on the scheme prefix, checked in order. Never fails outward:
/// malformed input comes back as a `ParsedConfig` with `decode_error` set,
/// and a link matching no supported scheme is tagged `Unknown`.
pub fn parse(raw: &str) -> ParsedConfig {
    if let Some(payload) = raw.strip_prefix("vmess://") {
        parse_vmess(payload)
    } else if raw.starts_with("vless://") {
        parse_query_link(raw, Protocol::VLess)
    } else if raw.starts_with("trojan://") {
        parse_query_link(raw, Protocol::Trojan)
    } else {
        debug!("Link matches no supported scheme.");
        ParsedConfig::empty(Protocol::Unknown)
    }
}

fn parse_vmess(payload: &str) -> ParsedConfig {
    let json = match decode_vmess_payload(payload) {
        Ok(json) => json,
        Err(detail) => {
            debug!(%detail, "VMess payload rejected.");
            return ParsedConfig::failed(
                Protocol::VMess,
                format!("Base64 decode failed: {detail}"),
            );
        }
    };

    ParsedConfig {
        protocol: Protocol::VMess,
        host: string_field(&json, "add"),
        port: port_field(&json),
        fields: ConfigFields {
            tls: string_field(&json, "tls"),
            net: string_field(&json, "net"),
            sni_host: string_field(&json, "host"),
            path: string_field(&json, "path"),
            encryption: string_field(&json, "encryption"),
            alter_id: string_field(&json, "aid"),
            security: String::new(),
        },
        decode_error: None,
    }
}

/// Base64 + JSON stage of VMess decoding. The payload is treated as inert
/// key/value data throughout; anything that is not a JSON object is rejected.
fn decode_vmess_payload(payload: &str) -> Result<Value, String> {
    let bytes = decode_base64_lenient(payload).map_err(|e| e.to_string())?;
    let text = String::from_utf8(bytes).map_err(|e| e.to_string())?;
    let json: Value = serde_json::from_str(&text).map_err(|e| e.to_string())?;
    if !json.is_object() {
        return Err("payload is not a JSON object".to_string());
    }
    Ok(json)
}

/// Standard-alphabet base64 decode that tolerates stripped trailing padding,
/// which is common in shared VMess links.
fn decode_base64_lenient(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let mut padded = input.trim().to_string();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }
    general_purpose::STANDARD.decode(padded)
}

fn string_field(json: &Value, key: &str) -> String {
    match json.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn port_field(json: &Value) -> u16 {
    match json.get("port") {
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        Some(Value::Number(n)) => n.as_u64().and_then(|p| u16::try_from(p).ok()).unwrap_or(0),
        _ => 0,
    }
}

fn parse_query_link(raw: &str, protocol: Protocol) -> ParsedConfig {
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(e) => {
            debug!(error = %e, %protocol, "URI rejected.");
            return ParsedConfig::failed(protocol, format!("Invalid {protocol} URI: {e}"));
        }
    };

    ParsedConfig {
        protocol,
        host: url.host_str().unwrap_or_default().to_string(),
        port: url.port().unwrap_or(0),
        fields: ConfigFields {
            security: query_param(&url, "security"),
            net: query_param(&url, "type"),
            sni_host: query_param(&url, "host"),
            path: query_param(&url, "path"),
            encryption: query_param(&url, "encryption"),
            ..ConfigFields::default()
        },
        decode_error: None,
    }
}

/// First occurrence wins when a query key repeats.
fn query_param(url: &Url, key: &str) -> String {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}
