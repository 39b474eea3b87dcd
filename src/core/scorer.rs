// src/core/scorer.rs

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::core::models::{Finding, ParsedConfig, ProbeResult, Protocol, ScoreReport, Severity};
use crate::core::scanner::NetworkProbe;

/// Scoring ceiling, kept at 12 so percentages stay comparable with reports
/// produced by earlier releases of the checker. The checklist evaluates at
/// most nine criteria, so a config passing every check tops out at 75%.
const MAX_SCORE: u32 = 12;

/// Accepted shape for a public hostname: label characters, a literal dot,
/// then an alphabetic TLD of two or more letters.
static HOSTNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.-]+\.[a-z]{2,}$").expect("hostname pattern is valid"));

/// One checklist criterion: whether it passed, and the finding to report if
/// it did not.
type Check = (bool, Finding);

/// Scores a parsed config against the protocol checklist plus the network
/// checks, producing the percentage and the ordered list of findings.
///
/// Terminal cases return immediately without probing: unknown schemes score
/// zero with a fixed message, decode failures score zero with the decode
/// message as the sole finding.
pub async fn score(config: &ParsedConfig, probe: &dyn NetworkProbe) -> ScoreReport {
    if config.protocol == Protocol::Unknown {
        return ScoreReport::rejected("Unsupported or unknown config format.");
    }
    if let Some(error) = &config.decode_error {
        return ScoreReport::rejected(error.clone());
    }

    let checks = match config.protocol {
        Protocol::VMess => vmess_checks(config),
        Protocol::VLess | Protocol::Trojan => query_link_checks(config),
        Protocol::Unknown => Vec::new(),
    };

    let mut score = checks.iter().filter(|(passed, _)| *passed).count() as u32;
    let mut issues: Vec<Finding> = checks
        .into_iter()
        .filter(|(passed, _)| !passed)
        .map(|(_, finding)| finding)
        .collect();

    if !config.host.is_empty() {
        let evidence = run_probe(probe, &config.host, config.port).await;
        debug!(?evidence, "Network checks completed.");

        if evidence.dns_resolved {
            score += 1;
        } else {
            issues.push(Finding::new(
                Severity::Critical,
                format!("Domain name '{}' does not resolve to an IP.", config.host),
            ));
        }

        if config.port != 0 {
            if evidence.tls_ok {
                score += 1;
            } else {
                issues.push(Finding::new(
                    Severity::Critical,
                    format!("TLS handshake failed: {}", evidence.tls_detail),
                ));
            }
        }
    }

    let percent = (score * 100 / MAX_SCORE) as u8;
    ScoreReport { percent, issues }
}

/// Collects the network evidence for one (host, port) pair. DNS first, then
/// the handshake, strictly sequential; a failed lookup does not suppress the
/// handshake attempt, but a zero port skips it.
async fn run_probe(probe: &dyn NetworkProbe, host: &str, port: u16) -> ProbeResult {
    let dns_resolved = probe.resolve(host).await;
    let (tls_ok, tls_detail) = if port != 0 {
        match probe.handshake(host, port).await {
            Ok(version) => (true, version),
            Err(detail) => (false, detail),
        }
    } else {
        (false, String::new())
    };

    ProbeResult {
        dns_resolved,
        tls_ok,
        tls_detail,
    }
}

fn vmess_checks(config: &ParsedConfig) -> Vec<Check> {
    let f = &config.fields;
    vec![
        (
            f.tls == "tls",
            Finding::new(
                Severity::Critical,
                "TLS is not enabled (`tls` should be 'tls').",
            ),
        ),
        (
            matches!(config.port, 443 | 8443),
            Finding::new(
                Severity::Warning,
                "Non-standard port used for TLS (recommended 443 or 8443).",
            ),
        ),
        (
            matches!(f.net.as_str(), "ws" | "grpc"),
            Finding::new(
                Severity::Warning,
                format!("Insecure or unknown transport: {}", f.net),
            ),
        ),
        (
            !f.sni_host.is_empty(),
            Finding::new(Severity::Warning, "Missing host/SNI."),
        ),
        (
            f.path.len() > 2,
            Finding::new(Severity::Info, "WebSocket path is too short or empty."),
        ),
        (
            matches!(
                f.encryption.to_lowercase().as_str(),
                "auto" | "aes-128-gcm" | "chacha20-poly1305"
            ),
            Finding::new(Severity::Critical, "Weak or missing encryption setting."),
        ),
        (
            f.alter_id == "0",
            Finding::new(
                Severity::Warning,
                "AlterId should be 0 (deprecated, better to disable).",
            ),
        ),
    ]
}

fn query_link_checks(config: &ParsedConfig) -> Vec<Check> {
    let f = &config.fields;
    vec![
        (
            matches!(f.security.as_str(), "tls" | "reality"),
            Finding::new(
                Severity::Critical,
                "`security` should be 'tls' or 'reality'.",
            ),
        ),
        (
            matches!(config.port, 443 | 8443),
            Finding::new(
                Severity::Warning,
                format!("Insecure port used: {}", config.port),
            ),
        ),
        (
            matches!(f.net.as_str(), "ws" | "grpc"),
            Finding::new(
                Severity::Warning,
                format!("Insecure or unknown transport: {}", f.net),
            ),
        ),
        (
            !f.sni_host.is_empty(),
            Finding::new(Severity::Warning, "Host/SNI is not set."),
        ),
        (
            f.path.len() > 2,
            Finding::new(Severity::Info, "Path is too short or missing."),
        ),
        (
            f.encryption == "none",
            Finding::new(Severity::Warning, "Encryption should be 'none' for VLESS."),
        ),
        (
            HOSTNAME_RE.is_match(&config.host),
            Finding::new(Severity::Warning, "Invalid or missing domain name."),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser;
    use async_trait::async_trait;
    use base64::{Engine as _, engine::general_purpose};

    /// Probe with pinned outcomes, standing in for the live network.
    struct StubProbe {
        dns: bool,
        tls: Result<String, String>,
    }

    #[async_trait]
    impl NetworkProbe for StubProbe {
        async fn resolve(&self, _hostname: &str) -> bool {
            self.dns
        }

        async fn handshake(&self, _host: &str, _port: u16) -> Result<String, String> {
            self.tls.clone()
        }
    }

    /// Probe that fails the test if either check runs, for asserting that
    /// terminal cases never touch the network.
    struct PanicProbe;

    #[async_trait]
    impl NetworkProbe for PanicProbe {
        async fn resolve(&self, _hostname: &str) -> bool {
            panic!("resolve must not be called")
        }

        async fn handshake(&self, _host: &str, _port: u16) -> Result<String, String> {
            panic!("handshake must not be called")
        }
    }

    fn vmess_link(json: &str) -> String {
        format!("vmess://{}", general_purpose::STANDARD.encode(json))
    }

    fn messages(report: &ScoreReport) -> Vec<&str> {
        report.issues.iter().map(|f| f.message.as_str()).collect()
    }

    const GOOD_VMESS: &str = r#"{"add":"example.com","port":"443","tls":"tls","net":"ws","host":"example.com","path":"/ws-path","encryption":"auto","aid":"0"}"#;

    #[tokio::test]
    async fn full_pass_vmess_caps_at_75_percent() {
        let probe = StubProbe {
            dns: true,
            tls: Ok("TLSv1.3".to_string()),
        };
        let config = parser::parse(&vmess_link(GOOD_VMESS));
        let report = score(&config, &probe).await;
        assert_eq!(report.percent, 75);
        assert!(report.issues.is_empty());
    }

    #[tokio::test]
    async fn weak_vless_link_lists_failures_in_checklist_order() {
        let probe = StubProbe {
            dns: false,
            tls: Err("connection refused".to_string()),
        };
        let config =
            parser::parse("vless://198.51.100.10:80?security=none&type=tcp&encryption=auto");
        let report = score(&config, &probe).await;
        assert_eq!(report.percent, 0);
        assert_eq!(
            messages(&report),
            vec![
                "`security` should be 'tls' or 'reality'.",
                "Insecure port used: 80",
                "Insecure or unknown transport: tcp",
                "Host/SNI is not set.",
                "Path is too short or missing.",
                "Encryption should be 'none' for VLESS.",
                "Invalid or missing domain name.",
                "Domain name '198.51.100.10' does not resolve to an IP.",
                "TLS handshake failed: connection refused",
            ]
        );
    }

    #[tokio::test]
    async fn unknown_scheme_short_circuits_without_probing() {
        let config = parser::parse("http://example.com");
        let report = score(&config, &PanicProbe).await;
        assert_eq!(report.percent, 0);
        assert_eq!(
            messages(&report),
            vec!["Unsupported or unknown config format."]
        );
    }

    #[tokio::test]
    async fn decode_error_short_circuits_without_probing() {
        let config = parser::parse("vmess://%%%not-base64%%%");
        let report = score(&config, &PanicProbe).await;
        assert_eq!(report.percent, 0);
        assert_eq!(report.issues.len(), 1);
        assert!(
            report.issues[0]
                .message
                .starts_with("Base64 decode failed")
        );
    }

    #[tokio::test]
    async fn zero_port_skips_the_handshake_criterion() {
        struct DnsOnlyProbe;

        #[async_trait]
        impl NetworkProbe for DnsOnlyProbe {
            async fn resolve(&self, _hostname: &str) -> bool {
                true
            }

            async fn handshake(&self, _host: &str, _port: u16) -> Result<String, String> {
                panic!("handshake must not run for port 0")
            }
        }

        let config = parser::parse(
            "vless://secure.example.com?security=tls&type=ws&host=secure.example.com&path=/tunnel&encryption=none",
        );
        let report = score(&config, &DnsOnlyProbe).await;
        // Six protocol passes plus DNS out of twelve.
        assert_eq!(report.percent, 58);
        assert_eq!(messages(&report), vec!["Insecure port used: 0"]);
    }

    #[tokio::test]
    async fn repeated_evaluation_is_stable_under_a_fixed_network() {
        let probe = StubProbe {
            dns: true,
            tls: Err("handshake timeout".to_string()),
        };
        let config = parser::parse(&vmess_link(GOOD_VMESS));
        let first = score(&config, &probe).await;
        let second = score(&config, &probe).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn percent_stays_in_range_for_arbitrary_input() {
        let probe = StubProbe {
            dns: false,
            tls: Err("unreachable".to_string()),
        };
        for raw in [
            "",
            "vmess://",
            "vmess://AAAA",
            "vless://?",
            "trojan://x.y:443?path=/p",
            "ss://abc",
        ] {
            let report = score(&parser::parse(raw), &probe).await;
            assert!(report.percent <= 100, "out of range for {raw:?}");
        }
    }
}
