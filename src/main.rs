use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use target_sweep::progress::{BarProgress, NoProgress, Progress};
use target_sweep::scanner::{ScanConfig, Scanner, DEFAULT_CONCURRENCY};
use target_sweep::sink::FileSink;
use target_sweep::types::CampaignSummary;
use target_sweep::{logging, targets};

use anyhow::{Context, Result};
use clap::Parser;

/// target-sweep — bounded-concurrency TCP liveness scanner with HTTP(S) fingerprinting.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "target-sweep",
    version,
    about = "Bounded-concurrency TCP liveness scanner with HTTP(S) fingerprint follow-up.",
    long_about = None
)]
struct Cli {
    /// Target list, one `host:port1,port2,...` per line.
    #[arg(long, default_value = "targets.txt")]
    targets: PathBuf,

    /// Report file; results are appended.
    #[arg(long, default_value = "results.txt")]
    output: PathBuf,

    /// Log file for warnings about skipped lines; appended.
    #[arg(long = "log-file", default_value = "scan.log")]
    log_file: PathBuf,

    /// Max concurrent TCP connect attempts per target.
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// TCP connect timeout in milliseconds.
    #[arg(long = "connect-timeout-ms", default_value_t = 2000)]
    connect_timeout_ms: u64,

    /// HTTP(S) fingerprint timeout in milliseconds.
    #[arg(long = "http-timeout-ms", default_value_t = 3000)]
    http_timeout_ms: u64,

    /// Accept invalid TLS certificates when fingerprinting port 443.
    #[arg(long, default_value_t = false)]
    insecure: bool,

    /// Write the campaign summary as pretty JSON to this path (optional).
    #[arg(long)]
    json: Option<PathBuf>,

    /// Disable the progress bar.
    #[arg(long = "no-progress", default_value_t = false)]
    no_progress: bool,
}

impl Cli {
    fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            concurrency: self.concurrency,
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            http_timeout: Duration::from_millis(self.http_timeout_ms),
            accept_invalid_certs: self.insecure,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_file_logging(&cli.log_file, "info")?;

    let parsed = targets::load_targets_from_path(&cli.targets)?;
    println!(
        "Loaded {} targets ({} probes), skipped {} malformed lines (see {})",
        parsed.targets.len(),
        parsed.total_tasks(),
        parsed.rejected.len(),
        cli.log_file.display()
    );

    let progress: Arc<dyn Progress> = if cli.no_progress {
        Arc::new(NoProgress)
    } else {
        Arc::new(BarProgress::new())
    };
    let scanner = Scanner::from_config(&cli.scan_config(), progress)?;
    let mut sink = FileSink::open(&cli.output)?;

    let summary = scanner.run(&parsed.targets, &mut sink).await;
    print_summary(&summary, sink.path());

    if let Some(path) = cli.json.as_deref() {
        if let Err(e) = write_summary_json(path, &summary) {
            eprintln!("Failed to write JSON to {}: {:#}", path.display(), e);
        } else {
            println!("Wrote JSON summary to {}", path.display());
        }
    }

    Ok(())
}

fn print_summary(summary: &CampaignSummary, output: &std::path::Path) {
    println!("\nScan finished:");
    println!("  targets      : {}", summary.targets);
    println!("  probes       : {}", summary.ports_total);
    println!("  alive ports  : {}", summary.ports_alive);
    println!("  fingerprints : {}", summary.fingerprints);
    println!(
        "  reports      : {} (appended to {})",
        summary.reports_written,
        output.display()
    );
}

fn write_summary_json(path: &std::path::Path, summary: &CampaignSummary) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, summary)?;
    Ok(())
}
