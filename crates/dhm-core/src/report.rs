//! Scan results handed to the transport

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::detail::DetailCategory;
use crate::device::DeviceRecord;
use crate::outcome::AbsentReason;

/// Enrichment source that may degrade without failing a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentSource {
    Disk,
    Monitor,
    Printer,
    NetworkAdapter,
    ServiceTag,
}

impl From<DetailCategory> for EnrichmentSource {
    fn from(category: DetailCategory) -> Self {
        match category {
            DetailCategory::Disk => EnrichmentSource::Disk,
            DetailCategory::Monitor => EnrichmentSource::Monitor,
            DetailCategory::Printer => EnrichmentSource::Printer,
            DetailCategory::NetworkAdapter => EnrichmentSource::NetworkAdapter,
        }
    }
}

impl fmt::Display for EnrichmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EnrichmentSource::Disk => "disk",
            EnrichmentSource::Monitor => "monitor",
            EnrichmentSource::Printer => "printer",
            EnrichmentSource::NetworkAdapter => "network_adapter",
            EnrichmentSource::ServiceTag => "service_tag",
        };
        f.write_str(name)
    }
}

/// A source that did not contribute fully to a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degradation {
    pub source: EnrichmentSource,
    /// Record the failure applies to (e.g. a monitor instance); `None` for the whole source
    pub subject: Option<String>,
    pub reason: AbsentReason,
}

impl Degradation {
    pub fn source(source: impl Into<EnrichmentSource>, reason: AbsentReason) -> Self {
        Self {
            source: source.into(),
            subject: None,
            reason,
        }
    }

    pub fn record(
        source: impl Into<EnrichmentSource>,
        subject: impl Into<String>,
        reason: AbsentReason,
    ) -> Self {
        Self {
            source: source.into(),
            subject: Some(subject.into()),
            reason,
        }
    }
}

/// Output of one scan: the resolved devices plus what went missing on the way
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub scan_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Name of the reporting host
    pub hostname: String,
    /// Name of the backend that produced the inputs
    pub backend: String,
    pub devices: Vec<DeviceRecord>,
    pub degraded: Vec<Degradation>,
}

impl ScanReport {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }

    /// Degradations that cover a whole source rather than a single record
    pub fn degraded_sources(&self) -> Vec<EnrichmentSource> {
        let mut sources: Vec<EnrichmentSource> = self
            .degraded
            .iter()
            .filter(|d| d.subject.is_none())
            .map(|d| d.source)
            .collect();
        sources.dedup();
        sources
    }
}
