//! Scan orchestration: one upload at a time, from raw image to labeled
//! results, with a cosmetic progress indicator and recovery from every
//! failure.
//!
//! State is published through a [`tokio::sync::watch`] channel so any number
//! of presentation layers can follow it. Sessions are numbered; an upload or
//! reset supersedes the previous session and its late results are ignored.

pub mod config;
pub mod error;
mod metrics;
pub mod orchestrator;
pub mod progress;
pub mod state;

pub use config::ScannerConfig;
pub use error::ScanError;
pub use orchestrator::{ScanHandle, ScanOrchestrator, ScanOutcome};
pub use progress::ProgressDriver;
pub use state::{ImagePreview, ScanPhase, ScanSnapshot};
