use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};

/// Completion counter fed by the scan engine. Workers call `advance` concurrently.
pub trait Progress: Send + Sync {
    fn begin(&self, total: u64);
    fn advance(&self, n: u64);
    fn set_label(&self, _label: &str) {}
    fn finish(&self) {}
}

/// Discards all updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn begin(&self, _total: u64) {}
    fn advance(&self, _n: u64) {}
}

/// Live terminal bar on stderr: position, elapsed, remaining and rate.
#[derive(Debug, Clone)]
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
        let style = ProgressStyle::with_template(
            "{msg:>20} {percent:>3}%|{bar:40.magenta}| {pos}/{len} [{elapsed} < {eta}, {per_sec}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉ ");
        bar.set_style(style);
        Self { bar }
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for BarProgress {
    fn begin(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
    }

    fn advance(&self, n: u64) {
        self.bar.inc(n);
    }

    fn set_label(&self, label: &str) {
        self.bar.set_message(label.to_string());
    }

    fn finish(&self) {
        self.bar.finish();
    }
}

/// Atomic counters, handy for tests and summaries.
#[derive(Debug, Default)]
pub struct CounterProgress {
    total: AtomicU64,
    done: AtomicU64,
}

impl CounterProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn done(&self) -> u64 {
        self.done.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

impl Progress for CounterProgress {
    fn begin(&self, total: u64) {
        self.total.store(total, Ordering::Relaxed);
        self.done.store(0, Ordering::Relaxed);
    }

    fn advance(&self, n: u64) {
        self.done.fetch_add(n, Ordering::Relaxed);
    }
}
