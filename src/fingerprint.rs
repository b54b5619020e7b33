use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use std::net::Ipv6Addr;
use std::time::Duration;
use tracing::debug;

use crate::ports::{http_scheme, is_http_candidate};
use crate::types::FingerprintResult;

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(3);

/// Build the shared HTTP client. Certificates are validated unless `accept_invalid_certs`.
pub fn build_client(accept_invalid_certs: bool) -> Result<Client> {
    Client::builder()
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()
        .context("failed to build HTTP client")
}

/// `scheme://host/` for a web port. IPv6 literals are bracketed.
pub fn fingerprint_url(host: &str, port: u16) -> String {
    let scheme = http_scheme(port);
    if host.parse::<Ipv6Addr>().is_ok() {
        format!("{scheme}://[{host}]/")
    } else {
        format!("{scheme}://{host}/")
    }
}

/// GET the root of `host` over HTTP(S) and confirm it answers `200 OK`.
///
/// Returns `None` for ports outside the HTTP(S) candidate set and for any failure
/// (timeout, transport or TLS error, non-200 status).
pub async fn fingerprint(
    client: &Client,
    host: &str,
    port: u16,
    timeout: Duration,
) -> Option<FingerprintResult> {
    if !is_http_candidate(port) {
        return None;
    }
    let url = fingerprint_url(host, port);
    get_is_ok(client, &url, timeout).await.then(|| FingerprintResult {
        host: host.to_string(),
        port,
        confirmed: true,
    })
}

pub(crate) async fn get_is_ok(client: &Client, url: &str, timeout: Duration) -> bool {
    match client.get(url).timeout(timeout).send().await {
        Ok(resp) => {
            let status = resp.status();
            debug!(url, status = status.as_u16(), "fingerprint response");
            status == StatusCode::OK
        }
        Err(e) => {
            debug!(url, error = %e, "fingerprint request failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response per connection until the test ends.
    async fn serve(status_line: &'static str) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            while let Ok((mut sock, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = sock.read(&mut buf).await;
                let resp = format!("{status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
                let _ = sock.write_all(resp.as_bytes()).await;
            }
        });
        port
    }

    #[test]
    fn url_scheme_follows_port() {
        assert_eq!(fingerprint_url("example.org", 443), "https://example.org/");
        assert_eq!(fingerprint_url("10.0.0.1", 80), "http://10.0.0.1/");
        assert_eq!(fingerprint_url("::1", 80), "http://[::1]/");
    }

    #[tokio::test]
    async fn non_web_port_is_never_fingerprinted() {
        let client = build_client(false).unwrap();
        assert!(fingerprint(&client, "127.0.0.1", 22, DEFAULT_HTTP_TIMEOUT)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn status_200_confirms() {
        let port = serve("HTTP/1.1 200 OK").await;
        let client = build_client(false).unwrap();
        let url = format!("http://127.0.0.1:{port}/");
        assert!(get_is_ok(&client, &url, DEFAULT_HTTP_TIMEOUT).await);
    }

    #[tokio::test]
    async fn non_200_does_not_confirm() {
        let port = serve("HTTP/1.1 404 Not Found").await;
        let client = build_client(false).unwrap();
        let url = format!("http://127.0.0.1:{port}/");
        assert!(!get_is_ok(&client, &url, DEFAULT_HTTP_TIMEOUT).await);
    }

    #[tokio::test]
    async fn connection_refused_does_not_confirm() {
        let port = {
            let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
            l.local_addr().unwrap().port()
        };
        let client = build_client(false).unwrap();
        let url = format!("http://127.0.0.1:{port}/");
        assert!(!get_is_ok(&client, &url, Duration::from_millis(500)).await);
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        // Accept and hold connections without ever answering.
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((sock, _)) = listener.accept().await {
                held.push(sock);
            }
        });
        let client = build_client(false).unwrap();
        let url = format!("http://127.0.0.1:{port}/");

        let start = std::time::Instant::now();
        let ok = get_is_ok(&client, &url, Duration::from_millis(300)).await;

        assert!(!ok);
        assert!(
            start.elapsed() < Duration::from_secs(2),
            "took {:?}",
            start.elapsed()
        );
    }
}
