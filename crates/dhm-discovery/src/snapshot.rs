//! Recorded inventory replay
//!
//! A snapshot is one JSON object whose sections hold the same records the
//! CIM queries return:
//!
//! ```json
//! {
//!   "pnp_entities": [{"Name": "...", "DeviceID": "...", "Status": "OK"}],
//!   "disk_drives": [{"PNPDeviceID": "...", "Model": "...", "SerialNumber": "..."}],
//!   "monitors": {"error": "Invalid namespace"},
//!   "bios": {"SerialNumber": "7XK2Q13"}
//! }
//! ```
//!
//! A missing section is an empty source. A section of the form
//! `{"error": "..."}` replays a failed query.

use std::path::Path;

use dhm_core::{Outcome, RawDeviceEntry};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::backend::{BackendError, Collected, EnumerationBackend};
use crate::records::{
    into_records, parse_bios_serial, parse_disk_drives, parse_monitors, parse_network_adapters,
    parse_pnp_entities, parse_printers,
};

pub const PNP_ENTITIES: &str = "pnp_entities";
pub const DISK_DRIVES: &str = "disk_drives";
pub const MONITORS: &str = "monitors";
pub const PRINTERS: &str = "printers";
pub const NETWORK_ADAPTERS: &str = "network_adapters";
pub const BIOS: &str = "bios";

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to read snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Snapshot must be a JSON object of sections")]
    NotAnObject,
}

/// Backend that answers from a recorded snapshot
#[derive(Debug, Clone)]
pub struct SnapshotBackend {
    sections: Map<String, Value>,
}

impl SnapshotBackend {
    pub fn from_value(value: Value) -> Result<Self, SnapshotError> {
        match value {
            Value::Object(sections) => Ok(Self { sections }),
            _ => Err(SnapshotError::NotAnObject),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, SnapshotError> {
        Self::from_value(serde_json::from_str(raw)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let backend = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            sections = backend.sections.len(),
            "Loaded inventory snapshot"
        );
        Ok(backend)
    }

    fn section(&self, name: &str) -> Result<Vec<Value>, BackendError> {
        let Some(value) = self.sections.get(name) else {
            debug!(section = name, "Snapshot section missing, treating as empty");
            return Ok(Vec::new());
        };

        if let Value::Object(obj) = value {
            if obj.len() == 1 {
                if let Some(message) = obj.get("error") {
                    return Err(BackendError::QueryFailed {
                        query: name.to_string(),
                        message: message
                            .as_str()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| message.to_string()),
                    });
                }
            }
        }

        Ok(into_records(value.clone()))
    }
}

impl EnumerationBackend for SnapshotBackend {
    fn name(&self) -> &str {
        "snapshot"
    }

    fn primary_entries(&self) -> Result<Vec<RawDeviceEntry>, BackendError> {
        Ok(parse_pnp_entities(&self.section(PNP_ENTITIES)?))
    }

    fn disk_details(&self) -> Result<Collected, BackendError> {
        Ok(parse_disk_drives(&self.section(DISK_DRIVES)?))
    }

    fn monitor_details(&self) -> Result<Collected, BackendError> {
        Ok(parse_monitors(&self.section(MONITORS)?))
    }

    fn printer_details(&self) -> Result<Collected, BackendError> {
        Ok(parse_printers(&self.section(PRINTERS)?))
    }

    fn adapter_details(&self) -> Result<Collected, BackendError> {
        Ok(parse_network_adapters(&self.section(NETWORK_ADAPTERS)?))
    }

    fn service_tag(&self) -> Outcome<String> {
        match self.section(BIOS) {
            Ok(records) => parse_bios_serial(&records),
            Err(e) => Outcome::Absent(e.to_absent_reason()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dhm_core::AbsentReason;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "pnp_entities": [
            {"Name":"USB Mass Storage Device","DeviceID":"USB\\VID_0951&PID_1666\\E0D55C2D9D61E5B3G","Manufacturer":"Kingston","Status":"OK"},
            {"Name":"Dell U2419H","DeviceID":"DISPLAY\\DELA0F4\\5&2a5d1b1&0&UID4353","Status":"OK"}
        ],
        "disk_drives": {"PNPDeviceID":"USB\\VID_0951&PID_1666\\E0D55C2D9D61E5B3G","Model":"Kingston DataTraveler 3.0","SerialNumber":"ABC123"},
        "monitors": {"error": "Invalid namespace"},
        "bios": {"SerialNumber":"7XK2Q13"}
    }"#;

    #[test]
    fn test_snapshot_sections() {
        let backend = SnapshotBackend::from_json(SAMPLE).unwrap();
        assert_eq!(backend.name(), "snapshot");
        assert_eq!(backend.primary_entries().unwrap().len(), 2);
        assert_eq!(backend.disk_details().unwrap().details.len(), 1);
        assert!(backend.printer_details().unwrap().details.is_empty());
        assert!(backend.adapter_details().unwrap().details.is_empty());
        assert_eq!(backend.service_tag(), Outcome::Present("7XK2Q13".to_string()));
    }

    #[test]
    fn test_snapshot_error_section() {
        let backend = SnapshotBackend::from_json(SAMPLE).unwrap();
        match backend.monitor_details() {
            Err(BackendError::QueryFailed { query, message }) => {
                assert_eq!(query, MONITORS);
                assert_eq!(message, "Invalid namespace");
            }
            other => panic!("expected QueryFailed, got {:?}", other.map(|c| c.details)),
        }
    }

    #[test]
    fn test_snapshot_missing_bios() {
        let backend = SnapshotBackend::from_json(r#"{"bios": {"error": "Access denied"}}"#).unwrap();
        assert!(matches!(
            backend.service_tag(),
            Outcome::Absent(AbsentReason::Unsupported(_))
        ));

        let backend = SnapshotBackend::from_json("{}").unwrap();
        assert_eq!(backend.service_tag(), Outcome::not_reported());
        assert!(backend.primary_entries().unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_rejects_non_object() {
        assert!(matches!(
            SnapshotBackend::from_json("[1, 2]"),
            Err(SnapshotError::NotAnObject)
        ));
        assert!(matches!(
            SnapshotBackend::from_json("{"),
            Err(SnapshotError::Json(_))
        ));
    }

    #[test]
    fn test_snapshot_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let backend = SnapshotBackend::from_file(file.path()).unwrap();
        assert_eq!(backend.primary_entries().unwrap().len(), 2);

        assert!(matches!(
            SnapshotBackend::from_file(file.path().with_extension("missing")),
            Err(SnapshotError::Io { .. })
        ));
    }
}
