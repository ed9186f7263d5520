//! Enumeration backend interface
//!
//! A backend answers the questions a scan asks: which devices exist, what
//! each category source knows about them, and what the chassis service tag
//! is. Backends block (they talk to the OS); the scanner calls them in order
//! from a single thread.

use dhm_core::{AbsentReason, CategoryDetails, Degradation, Outcome, RawDeviceEntry};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("{0} is not available on this platform")]
    Unsupported(String),
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Query {query} failed: {message}")]
    QueryFailed { query: String, message: String },
    #[error("Query {query} returned invalid JSON: {source}")]
    InvalidOutput {
        query: String,
        #[source]
        source: serde_json::Error,
    },
}

impl BackendError {
    /// Reason to record when this error only costs an enrichment source
    pub fn to_absent_reason(&self) -> AbsentReason {
        match self {
            BackendError::InvalidOutput { .. } => AbsentReason::Malformed(self.to_string()),
            _ => AbsentReason::Unsupported(self.to_string()),
        }
    }
}

/// Detail mapping of one category plus the records that could not be decoded
#[derive(Debug, Clone)]
pub struct Collected {
    pub details: CategoryDetails,
    pub issues: Vec<Degradation>,
}

impl Collected {
    pub fn clean(details: CategoryDetails) -> Self {
        Self {
            details,
            issues: Vec::new(),
        }
    }
}

/// Source of raw inventory data for a scan
pub trait EnumerationBackend: Send + Sync {
    /// Short name used in logs and reports
    fn name(&self) -> &str;

    /// Primary device listing, in enumeration order
    fn primary_entries(&self) -> Result<Vec<RawDeviceEntry>, BackendError>;

    /// Disk drives keyed by plug-and-play identifier
    fn disk_details(&self) -> Result<Collected, BackendError>;

    /// Monitors keyed by instance name with the `_<index>` suffix removed
    fn monitor_details(&self) -> Result<Collected, BackendError>;

    /// Printers keyed by printer name
    fn printer_details(&self) -> Result<Collected, BackendError>;

    /// Network adapters keyed by plug-and-play identifier
    fn adapter_details(&self) -> Result<Collected, BackendError>;

    /// Machine-wide service tag; failures are reported, never raised
    fn service_tag(&self) -> Outcome<String>;
}
