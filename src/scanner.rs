use crate::fingerprint::{self, DEFAULT_HTTP_TIMEOUT};
use crate::ports::is_http_candidate;
use crate::prober::{self, DEFAULT_CONNECT_TIMEOUT};
use crate::progress::Progress;
use crate::sink::ReportSink;
use crate::types::{
    CampaignSummary, FingerprintResult, ProbeOutcome, ProbeResult, ReportEntry, Target,
    TargetReport,
};
use ::time::{format_description::well_known, OffsetDateTime};
use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

pub const DEFAULT_CONCURRENCY: usize = 20;

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Max in-flight probes for one target.
    pub concurrency: usize,
    pub connect_timeout: Duration,
    pub http_timeout: Duration,
    pub accept_invalid_certs: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            accept_invalid_certs: false,
        }
    }
}

/// The network operations the engine needs. Neither may fail: failures are
/// negative results.
pub trait ScanBackend: Send + Sync + 'static {
    fn probe(&self, host: &str, port: u16) -> impl Future<Output = ProbeResult> + Send;

    fn fingerprint(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = Option<FingerprintResult>> + Send;
}

/// Real TCP connects and HTTP(S) GETs.
#[derive(Debug, Clone)]
pub struct NetworkBackend {
    connect_timeout: Duration,
    http_timeout: Duration,
    client: reqwest::Client,
}

impl NetworkBackend {
    pub fn new(config: &ScanConfig) -> Result<Self> {
        Ok(Self {
            connect_timeout: config.connect_timeout,
            http_timeout: config.http_timeout,
            client: fingerprint::build_client(config.accept_invalid_certs)?,
        })
    }
}

impl ScanBackend for NetworkBackend {
    async fn probe(&self, host: &str, port: u16) -> ProbeResult {
        prober::probe(host, port, self.connect_timeout).await
    }

    async fn fingerprint(&self, host: &str, port: u16) -> Option<FingerprintResult> {
        fingerprint::fingerprint(&self.client, host, port, self.http_timeout).await
    }
}

pub struct Scanner<B: ScanBackend> {
    backend: Arc<B>,
    progress: Arc<dyn Progress>,
    concurrency: usize,
}

impl Scanner<NetworkBackend> {
    /// Scanner over the real network, configured from `config`.
    pub fn from_config(config: &ScanConfig, progress: Arc<dyn Progress>) -> Result<Self> {
        Ok(Self::new(NetworkBackend::new(config)?, progress, config.concurrency))
    }
}

impl<B: ScanBackend> Scanner<B> {
    pub fn new(backend: B, progress: Arc<dyn Progress>, concurrency: usize) -> Self {
        Self {
            backend: Arc::new(backend),
            progress,
            concurrency: concurrency.max(1),
        }
    }

    /// Probe every port of `target` with at most `concurrency` connects in flight.
    ///
    /// Entries are appended in completion order. A reachable web port is fingerprinted
    /// right after its probe completes, and its fingerprint line follows its alive line.
    pub async fn scan_target(&self, target: &Target) -> TargetReport {
        let mut report = TargetReport::new(&target.host);
        let sem = Arc::new(Semaphore::new(self.concurrency));
        let mut set = JoinSet::new();

        for &port in &target.ports {
            let sem = sem.clone();
            let backend = self.backend.clone();
            let progress = self.progress.clone();
            let host = target.host.clone();

            set.spawn(async move {
                let Ok(_permit) = sem.acquire_owned().await else {
                    return ProbeResult::unreachable(host, port);
                };
                let res = backend.probe(&host, port).await;
                if res.is_reachable() {
                    progress.advance(1);
                }
                res
            });
        }

        while let Some(joined) = set.join_next().await {
            let res = match joined {
                Ok(res) => res,
                Err(e) => {
                    warn!(host = %target.host, error = %e, "probe task failed");
                    continue;
                }
            };
            let ProbeOutcome::Reachable(label) = res.outcome else {
                continue;
            };
            info!(host = %res.host, port = res.port, protocol = %label, "target alive");
            report.entries.push(ReportEntry::Alive {
                host: res.host.clone(),
                port: res.port,
                label,
            });

            if is_http_candidate(res.port) {
                match self.backend.fingerprint(&res.host, res.port).await {
                    Some(fp) if fp.confirmed => {
                        self.progress.advance(1);
                        info!(host = %fp.host, port = fp.port, "http fingerprint confirmed");
                        report.entries.push(ReportEntry::Fingerprint {
                            host: fp.host,
                            port: fp.port,
                        });
                    }
                    _ => debug!(host = %res.host, port = res.port, "http fingerprint not confirmed"),
                }
            }
        }

        report
    }

    /// Scan `targets` one after another, appending each non-empty report to `sink`.
    ///
    /// A sink failure is logged and the campaign carries on.
    pub async fn run(&self, targets: &[Target], sink: &mut dyn ReportSink) -> CampaignSummary {
        let total: u64 = targets.iter().map(|t| t.ports.len() as u64).sum();
        let mut summary = CampaignSummary {
            targets: targets.len() as u64,
            ports_total: total,
            started_at: now_iso_like(),
            ..CampaignSummary::default()
        };
        self.progress.begin(total);
        info!(targets = targets.len(), tasks = total, "campaign started");

        for target in targets {
            self.progress.set_label(&target.host);
            let report = self.scan_target(target).await;
            if report.is_empty() {
                debug!(host = %target.host, "no reachable ports");
                continue;
            }
            summary.ports_alive += report.alive_count();
            summary.fingerprints += report.fingerprint_count();
            match sink.append(&report) {
                Ok(()) => summary.reports_written += 1,
                Err(e) => warn!(host = %target.host, "failed to persist report: {e:#}"),
            }
        }

        self.progress.finish();
        summary.finished_at = now_iso_like();
        info!(
            alive = summary.ports_alive,
            fingerprints = summary.fingerprints,
            reports = summary.reports_written,
            "campaign finished"
        );
        summary
    }
}

fn now_iso_like() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
