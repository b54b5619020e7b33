use anyhow::{bail, Result};

/// Label reported for reachable ports missing from [`PORT_PROTOCOLS`].
pub const UNKNOWN_PROTOCOL: &str = "Unknown Protocol";

/// Well-known TCP ports and the protocol label printed for them.
pub const PORT_PROTOCOLS: &[(u16, &str)] = &[
    (80, "HTTP"),
    (443, "HTTPS"),
    (21, "FTP"),
    (22, "SSH"),
    (23, "Telnet"),
    (25, "SMTP"),
    (110, "POP3"),
    (139, "NetBIOS"),
    (445, "Microsoft-DS"),
    (8080, "HTTP Proxy"),
];

/// Ports that get an HTTP(S) GET after a successful connect.
pub const HTTP_CANDIDATES: &[u16] = &[80, 443];

/// Look up the protocol label for `port`, falling back to [`UNKNOWN_PROTOCOL`].
pub fn protocol_label(port: u16) -> &'static str {
    PORT_PROTOCOLS
        .iter()
        .find(|(p, _)| *p == port)
        .map(|(_, label)| *label)
        .unwrap_or(UNKNOWN_PROTOCOL)
}

pub fn is_http_candidate(port: u16) -> bool {
    HTTP_CANDIDATES.contains(&port)
}

/// URL scheme used when fingerprinting `port`.
pub fn http_scheme(port: u16) -> &'static str {
    if port == 443 {
        "https"
    } else {
        "http"
    }
}

/// Parse one port token (1..=65535). Surrounding whitespace is ignored.
pub fn parse_port_str(s: &str) -> Result<u16> {
    let val: u32 = s.trim().parse::<u32>()?;
    if val == 0 || val > 65535 {
        bail!("port out of range: {val}");
    }
    Ok(val as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_for_known_and_unknown_ports() {
        assert_eq!(protocol_label(80), "HTTP");
        assert_eq!(protocol_label(22), "SSH");
        assert_eq!(protocol_label(8080), "HTTP Proxy");
        assert_eq!(protocol_label(9999), "Unknown Protocol");
    }

    #[test]
    fn only_web_ports_are_candidates() {
        assert!(is_http_candidate(80));
        assert!(is_http_candidate(443));
        assert!(!is_http_candidate(8080));
        assert!(!is_http_candidate(22));
    }

    #[test]
    fn scheme_is_https_only_for_443() {
        assert_eq!(http_scheme(443), "https");
        assert_eq!(http_scheme(80), "http");
    }

    #[test]
    fn port_token_bounds() {
        assert_eq!(parse_port_str(" 443 ").unwrap(), 443);
        assert!(parse_port_str("0").is_err());
        assert!(parse_port_str("65536").is_err());
        assert!(parse_port_str("abc").is_err());
        assert!(parse_port_str("").is_err());
    }
}
