use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{self, Instant};
use tracing::debug;

use crate::types::ProbeResult;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Make one TCP connect attempt to `host:port`, bounded by `timeout`.
///
/// Name resolution counts against the same timeout. Refusal, timeout, unreachable
/// networks and DNS failures all come back as an unreachable result, never an error.
pub async fn probe(host: &str, port: u16, timeout: Duration) -> ProbeResult {
    let start = Instant::now();
    match time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => {
            debug!(host, port, elapsed_ms = start.elapsed().as_millis() as u64, "port open");
            ProbeResult::reachable(host, port)
        }
        Ok(Err(e)) => {
            debug!(host, port, error = %e, "connect failed");
            ProbeResult::unreachable(host, port)
        }
        Err(_) => {
            debug!(host, port, "connect timed out");
            ProbeResult::unreachable(host, port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProbeOutcome;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn open_port_is_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let r = probe("127.0.0.1", port, DEFAULT_CONNECT_TIMEOUT).await;
        assert!(r.is_reachable());
        assert_eq!(r.port, port);
    }

    #[tokio::test]
    async fn closed_port_is_unreachable() {
        // Bind then drop to get a port nothing is listening on.
        let port = {
            let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
            l.local_addr().unwrap().port()
        };
        let r = probe("127.0.0.1", port, DEFAULT_CONNECT_TIMEOUT).await;
        assert_eq!(r.outcome, ProbeOutcome::Unreachable);
    }

    #[tokio::test]
    async fn unresolvable_host_is_unreachable() {
        let r = probe("no-such-host.invalid", 80, DEFAULT_CONNECT_TIMEOUT).await;
        assert!(!r.is_reachable());
    }
}
