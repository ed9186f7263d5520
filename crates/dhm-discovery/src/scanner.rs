//! Inventory scanner that runs one backend through the resolver

use chrono::Utc;
use dhm_core::{
    AbsentReason, CategoryDetails, Degradation, DetailCategory, DetailSet, EnrichmentSource,
    Outcome, Resolver, ScanReport,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backend::{BackendError, Collected, EnumerationBackend};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Device enumeration via {backend} failed: {source}")]
    Enumeration {
        backend: String,
        #[source]
        source: BackendError,
    },
}

/// Scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Name reported as the owning host
    pub hostname: String,
    pub disk: bool,
    pub monitor: bool,
    pub printer: bool,
    pub network_adapter: bool,
    pub service_tag: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            hostname: "unknown-host".to_string(),
            disk: true,
            monitor: true,
            printer: true,
            network_adapter: true,
            service_tag: true,
        }
    }
}

impl ScannerConfig {
    pub fn category_enabled(&self, category: DetailCategory) -> bool {
        match category {
            DetailCategory::Disk => self.disk,
            DetailCategory::Monitor => self.monitor,
            DetailCategory::Printer => self.printer,
            DetailCategory::NetworkAdapter => self.network_adapter,
        }
    }
}

/// Inventory scanner service
pub struct InventoryScanner {
    backend: Box<dyn EnumerationBackend>,
    resolver: Resolver,
    config: ScannerConfig,
}

impl InventoryScanner {
    pub fn new(backend: Box<dyn EnumerationBackend>, config: ScannerConfig) -> Self {
        Self::with_resolver(backend, Resolver::default(), config)
    }

    pub fn with_resolver(
        backend: Box<dyn EnumerationBackend>,
        resolver: Resolver,
        config: ScannerConfig,
    ) -> Self {
        Self {
            backend,
            resolver,
            config,
        }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Run a single inventory scan
    ///
    /// Enrichment sources degrade into the report; only a failed primary
    /// enumeration fails the scan.
    pub fn scan_once(&self) -> Result<ScanReport, ScanError> {
        let started_at = Utc::now();
        let backend = self.backend.name().to_string();
        info!(backend = %backend, host = %self.config.hostname, "Starting inventory scan");

        let mut degraded = Vec::new();
        let mut details = DetailSet::empty();

        for category in DetailCategory::ALL {
            if !self.config.category_enabled(category) {
                debug!(category = %category, "Category collection disabled");
                degraded.push(Degradation::source(category, AbsentReason::Disabled));
                continue;
            }
            match self.collect(category) {
                Ok(collected) => {
                    debug!(
                        category = %category,
                        records = collected.details.len(),
                        issues = collected.issues.len(),
                        "Collected category details"
                    );
                    degraded.extend(collected.issues);
                    details.set(collected.details);
                }
                Err(e) => {
                    warn!(category = %category, error = %e, "Category source unavailable");
                    degraded.push(Degradation::source(category, e.to_absent_reason()));
                    details.set(CategoryDetails::new(category));
                }
            }
        }

        let service_tag = if self.config.service_tag {
            self.backend.service_tag()
        } else {
            Outcome::Absent(AbsentReason::Disabled)
        };
        if let Outcome::Absent(reason) = &service_tag {
            if *reason != AbsentReason::NotReported {
                warn!(reason = %reason, "Service tag unavailable");
            }
            degraded.push(Degradation::source(
                EnrichmentSource::ServiceTag,
                reason.clone(),
            ));
        }

        let entries = self
            .backend
            .primary_entries()
            .map_err(|source| ScanError::Enumeration {
                backend: backend.clone(),
                source,
            })?;

        let service_tag = service_tag.into_option();
        let devices = self
            .resolver
            .resolve(&entries, &details, service_tag.as_deref());

        let report = ScanReport {
            scan_id: Uuid::new_v4(),
            started_at,
            finished_at: Utc::now(),
            hostname: self.config.hostname.clone(),
            backend,
            devices,
            degraded,
        };

        info!(
            scan_id = %report.scan_id,
            devices = report.devices.len(),
            degraded = report.degraded.len(),
            "Inventory scan complete"
        );
        Ok(report)
    }

    fn collect(&self, category: DetailCategory) -> Result<Collected, BackendError> {
        match category {
            DetailCategory::Disk => self.backend.disk_details(),
            DetailCategory::Monitor => self.backend.monitor_details(),
            DetailCategory::Printer => self.backend.printer_details(),
            DetailCategory::NetworkAdapter => self.backend.adapter_details(),
        }
    }
}
