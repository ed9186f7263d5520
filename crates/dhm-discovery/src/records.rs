//! Parsers for CIM records as emitted by `ConvertTo-Json`
//!
//! PowerShell serializes a single result as an object and several results as
//! an array, so every parser accepts either. Unknown or missing properties
//! are tolerated; records that lack their key are dropped.

use dhm_core::{
    monitor_key, monitor_series, AbsentReason, CategoryDetail, CategoryDetails, Degradation,
    DetailCategory, Outcome, RawDeviceEntry,
};
use serde_json::Value;
use tracing::debug;

use crate::backend::{BackendError, Collected};

/// Normalize `ConvertTo-Json` output into a list of records
pub fn json_records(query: &str, raw: &str) -> Result<Vec<Value>, BackendError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_json::from_str(raw).map_err(|source| BackendError::InvalidOutput {
        query: query.to_string(),
        source,
    })?;
    Ok(into_records(value))
}

/// Same normalization for an already-parsed value
pub fn into_records(value: Value) -> Vec<Value> {
    match value {
        Value::Array(arr) => arr,
        Value::Null => Vec::new(),
        single => vec![single],
    }
}

fn text(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn trimmed(record: &Value, key: &str) -> Option<String> {
    text(record, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `Win32_PnPEntity` rows (with the signed-driver version joined in)
pub fn parse_pnp_entities(records: &[Value]) -> Vec<RawDeviceEntry> {
    records
        .iter()
        .filter_map(|record| {
            let Some(raw_identifier) = text(record, "DeviceID") else {
                debug!("Dropping PnP entity without DeviceID");
                return None;
            };
            Some(RawDeviceEntry {
                device_name: text(record, "Name").unwrap_or_default(),
                raw_identifier,
                manufacturer: text(record, "Manufacturer"),
                status: text(record, "Status"),
                driver_version: text(record, "DriverVersion"),
                adapter_identifier: text(record, "PNPDeviceID"),
            })
        })
        .collect()
}

/// `Win32_DiskDrive` rows: model and trimmed serial, keyed by PNPDeviceID
pub fn parse_disk_drives(records: &[Value]) -> Collected {
    let pairs = records.iter().filter_map(|record| {
        let key = trimmed(record, "PNPDeviceID")?;
        Some((
            key,
            CategoryDetail {
                model_number: text(record, "Model"),
                series_number: trimmed(record, "SerialNumber"),
                version: None,
            },
        ))
    });
    Collected::clean(CategoryDetails::from_pairs(DetailCategory::Disk, pairs))
}

/// `WmiMonitorID` rows: serial decoded from `SerialNumberID`, keyed by truncated InstanceName
///
/// A serial that fails to decode leaves that monitor without a series number
/// and is reported as an issue.
pub fn parse_monitors(records: &[Value]) -> Collected {
    let mut details = CategoryDetails::new(DetailCategory::Monitor);
    let mut issues = Vec::new();

    for record in records {
        let Some(instance) = text(record, "InstanceName") else {
            continue;
        };
        let series_number = match monitor_series(record.get("SerialNumberID")) {
            Outcome::Present(serial) => Some(serial),
            Outcome::Absent(reason) => {
                if reason != AbsentReason::NotReported {
                    issues.push(Degradation::record(DetailCategory::Monitor, &instance, reason));
                }
                None
            }
        };
        details.insert(
            monitor_key(&instance),
            CategoryDetail {
                model_number: None,
                series_number,
                version: None,
            },
        );
    }

    Collected { details, issues }
}

/// `Win32_Printer` rows: the printer name doubles as its model
pub fn parse_printers(records: &[Value]) -> Collected {
    let pairs = records.iter().filter_map(|record| {
        let name = text(record, "Name")?;
        Some((
            name.clone(),
            CategoryDetail {
                model_number: Some(name),
                series_number: None,
                version: None,
            },
        ))
    });
    Collected::clean(CategoryDetails::from_pairs(DetailCategory::Printer, pairs))
}

/// `Win32_NetworkAdapter` rows: adapter type, MAC address and link speed, keyed by PNPDeviceID
pub fn parse_network_adapters(records: &[Value]) -> Collected {
    let pairs = records.iter().filter_map(|record| {
        let key = trimmed(record, "PNPDeviceID")?;
        Some((
            key,
            CategoryDetail {
                model_number: text(record, "AdapterType"),
                series_number: text(record, "MACAddress"),
                version: text(record, "Speed"),
            },
        ))
    });
    Collected::clean(CategoryDetails::from_pairs(DetailCategory::NetworkAdapter, pairs))
}

/// First non-empty trimmed `Win32_BIOS.SerialNumber`
pub fn parse_bios_serial(records: &[Value]) -> Outcome<String> {
    Outcome::from_option(records.iter().find_map(|record| trimmed(record, "SerialNumber")))
}
