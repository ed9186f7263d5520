//! Device types for the primary enumeration and the canonical output record

use serde::{Deserialize, Serialize};

/// Raw plug-and-play identifier, the stable key of a device within a scan
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub String);

impl DeviceId {
    /// Create a new DeviceId from a hardware ID string
    pub fn from_hwid(hwid: &str) -> Self {
        Self(hwid.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(value: &str) -> Self {
        Self::from_hwid(value)
    }
}

/// One entry of the primary device enumeration, as reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDeviceEntry {
    /// Display name; entries with a blank name are not reported
    pub device_name: String,
    /// Raw identifier string (e.g. `USB\VID_0951&PID_1666\...`)
    pub raw_identifier: String,
    pub manufacturer: Option<String>,
    pub status: Option<String>,
    pub driver_version: Option<String>,
    /// Identifier used to find the matching network adapter record
    pub adapter_identifier: Option<String>,
}

impl RawDeviceEntry {
    pub fn new(device_name: impl Into<String>, raw_identifier: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
            raw_identifier: raw_identifier.into(),
            ..Default::default()
        }
    }

    /// Trimmed device name, or `None` when the name is blank
    pub fn display_name(&self) -> Option<&str> {
        let name = self.device_name.trim();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

/// Canonical, merged record for one device in a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub device_name: String,
    pub model_number: Option<String>,
    pub series_number: Option<String>,
    /// Machine-wide service tag, identical on every record of a scan
    pub service_tag: Option<String>,
    pub version: Option<String>,
    pub manufacturer: Option<String>,
    pub status: Option<String>,
    /// Driver version exactly as enumerated; never merged into `version`
    pub driver_version: Option<String>,
    pub raw_identifier: DeviceId,
}

impl DeviceRecord {
    /// Record carrying only the name and identifier
    pub fn new(device_name: impl Into<String>, raw_identifier: DeviceId) -> Self {
        Self {
            device_name: device_name.into(),
            model_number: None,
            series_number: None,
            service_tag: None,
            version: None,
            manufacturer: None,
            status: None,
            driver_version: None,
            raw_identifier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_id_from_hwid() {
        let id = DeviceId::from_hwid("USB\\VID_0951&PID_1666\\CN42");
        assert_eq!(id.as_str(), "USB\\VID_0951&PID_1666\\CN42");
        assert_eq!(id.to_string(), "USB\\VID_0951&PID_1666\\CN42");
    }

    #[test]
    fn test_display_name_trims() {
        let entry = RawDeviceEntry::new("  Generic USB Hub \t", "USB\\ROOT_HUB30\\4&1");
        assert_eq!(entry.display_name(), Some("Generic USB Hub"));

        let blank = RawDeviceEntry::new(" \t ", "ACPI\\PNP0C0A\\1");
        assert_eq!(blank.display_name(), None);
    }

    #[test]
    fn test_device_id_serializes_as_string() {
        let record = DeviceRecord::new("Disk", DeviceId::from_hwid("SCSI\\DISK\\0"));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["raw_identifier"], "SCSI\\DISK\\0");
    }
}
