use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::types::TargetReport;

/// Append-only destination for finished target reports.
pub trait ReportSink: Send {
    fn append(&mut self, report: &TargetReport) -> Result<()>;
}

/// Appends rendered reports to a text file, creating it if missing.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: File,
}

impl FileSink {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open output file: {}", path.display()))?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for FileSink {
    fn append(&mut self, report: &TargetReport) -> Result<()> {
        self.file
            .write_all(report.render().as_bytes())
            .and_then(|_| self.file.flush())
            .with_context(|| format!("failed to append report to {}", self.path.display()))
    }
}

/// Keeps reports in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub reports: Vec<TargetReport>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything appended so far, rendered exactly as [`FileSink`] would write it.
    pub fn text(&self) -> String {
        self.reports.iter().map(TargetReport::render).collect()
    }
}

impl ReportSink for MemorySink {
    fn append(&mut self, report: &TargetReport) -> Result<()> {
        self.reports.push(report.clone());
        Ok(())
    }
}
