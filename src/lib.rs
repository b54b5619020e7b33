//! Library crate for target-sweep exposing the scan engine and its collaborators.
pub mod fingerprint;
pub mod logging;
pub mod ports;
pub mod prober;
pub mod progress;
pub mod scanner;
pub mod sink;
pub mod targets;
pub mod types;
