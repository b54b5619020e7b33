use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::ports::parse_port_str;
use crate::types::Target;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetParseError {
    #[error("invalid line format, expected host:port1,port2,...")]
    WrongFieldCount,
    #[error("empty host")]
    EmptyHost,
    #[error("no valid ports found for {host}")]
    EmptyPorts { host: String },
    #[error("invalid port format for {host}: {ports}")]
    InvalidPort { host: String, ports: String },
}

/// A line that was excluded from the campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    pub line_no: usize,
    pub line: String,
    pub reason: TargetParseError,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedTargets {
    pub targets: Vec<Target>,
    pub rejected: Vec<RejectedLine>,
}

impl ParsedTargets {
    /// Sum of port-list lengths, i.e. the number of probes the campaign will run.
    pub fn total_tasks(&self) -> u64 {
        self.targets.iter().map(|t| t.ports.len() as u64).sum()
    }
}

/// Parse a single `host:port1,port2,...` line.
///
/// Any bad port token rejects the whole line. Duplicate ports are kept.
pub fn parse_target_line(line: &str) -> Result<Target, TargetParseError> {
    let parts: Vec<&str> = line.trim().split(':').collect();
    if parts.len() != 2 {
        return Err(TargetParseError::WrongFieldCount);
    }
    let host = parts[0].trim();
    if host.is_empty() {
        return Err(TargetParseError::EmptyHost);
    }
    let raw_ports = parts[1].trim();
    if raw_ports.is_empty() {
        return Err(TargetParseError::EmptyPorts { host: host.into() });
    }
    let ports = raw_ports
        .split(',')
        .map(parse_port_str)
        .collect::<Result<Vec<u16>>>()
        .map_err(|_| TargetParseError::InvalidPort {
            host: host.into(),
            ports: raw_ports.into(),
        })?;
    Ok(Target::new(host, ports))
}

/// Parse a target list. Malformed lines are logged as warnings and skipped;
/// blank lines and `#` comments are ignored silently.
pub fn parse_targets_str(s: &str) -> ParsedTargets {
    let mut out = ParsedTargets::default();

    for (idx, raw_line) in s.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match parse_target_line(line) {
            Ok(t) => out.targets.push(t),
            Err(reason) => {
                warn!(line_no, line, "skipping target line: {reason}");
                out.rejected.push(RejectedLine {
                    line_no,
                    line: line.to_string(),
                    reason,
                });
            }
        }
    }

    out
}

/// Load and parse a target list file. Errors only if the file cannot be read.
pub fn load_targets_from_path(path: impl AsRef<Path>) -> Result<ParsedTargets> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("failed to read targets file: {}", path.as_ref().display()))?;
    Ok(parse_targets_str(&content))
}
