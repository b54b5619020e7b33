use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ports::protocol_label;

/// Line written after every non-empty target report.
pub const SEPARATOR: &str = "==================================================";

/// One host and the ports to probe on it, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub ports: Vec<u16>,
}

impl Target {
    pub fn new(host: impl Into<String>, ports: Vec<u16>) -> Self {
        Self {
            host: host.into(),
            ports,
        }
    }
}

/// Result of a single connect attempt. Connection failures of any kind are `Unreachable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Reachable(String),
    Unreachable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub host: String,
    pub port: u16,
    pub outcome: ProbeOutcome,
}

impl ProbeResult {
    pub fn reachable(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            outcome: ProbeOutcome::Reachable(protocol_label(port).to_string()),
        }
    }

    pub fn unreachable(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            outcome: ProbeOutcome::Unreachable,
        }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Reachable(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintResult {
    pub host: String,
    pub port: u16,
    pub confirmed: bool,
}

/// One human-readable line of a target report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEntry {
    Alive { host: String, port: u16, label: String },
    Fingerprint { host: String, port: u16 },
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportEntry::Alive { host, port, label } => {
                write!(f, "Target {host}:{port} is alive (Protocol: {label})")
            }
            ReportEntry::Fingerprint { host, port } => {
                write!(f, "Target {host}:{port} is alive (HTTP(S) Fingerprint)")
            }
        }
    }
}

/// Result lines for one target, in the order probes completed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TargetReport {
    pub host: String,
    pub entries: Vec<ReportEntry>,
}

impl TargetReport {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn alive_count(&self) -> u64 {
        self.entries
            .iter()
            .filter(|e| matches!(e, ReportEntry::Alive { .. }))
            .count() as u64
    }

    pub fn fingerprint_count(&self) -> u64 {
        self.entries
            .iter()
            .filter(|e| matches!(e, ReportEntry::Fingerprint { .. }))
            .count() as u64
    }

    /// Render as text: one line per entry, then [`SEPARATOR`]. Every line ends in `\n`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for e in &self.entries {
            out.push_str(&e.to_string());
            out.push('\n');
        }
        out.push_str(SEPARATOR);
        out.push('\n');
        out
    }
}

/// Aggregate counters for a whole campaign.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CampaignSummary {
    pub targets: u64,
    pub ports_total: u64,
    pub ports_alive: u64,
    pub fingerprints: u64,
    pub reports_written: u64,
    pub started_at: String,
    pub finished_at: String,
}
