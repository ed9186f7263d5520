//! Live inventory from CIM/WMI via PowerShell
//!
//! Each source is one `Get-CimInstance ... | ConvertTo-Json -Compress`
//! invocation. Only Windows hosts can answer; elsewhere every query reports
//! [`BackendError::Unsupported`].

use std::path::PathBuf;
use std::process::Command;

use dhm_core::{Outcome, RawDeviceEntry};
use serde_json::Value;
use tracing::{debug, trace};

use crate::backend::{BackendError, Collected, EnumerationBackend};
use crate::records::{
    json_records, parse_bios_serial, parse_disk_drives, parse_monitors, parse_network_adapters,
    parse_pnp_entities, parse_printers,
};

/// Absolute path avoids PATH-search hijacking when running as a service
pub const POWERSHELL_EXE: &str = r"C:\Windows\System32\WindowsPowerShell\v1.0\powershell.exe";

/// A named PowerShell script producing CIM records as JSON
#[derive(Debug, Clone, Copy)]
pub struct CimQuery {
    pub name: &'static str,
    pub script: &'static str,
}

pub mod queries {
    use super::CimQuery;

    pub const PNP_ENTITIES: CimQuery = CimQuery {
        name: "Win32_PnPEntity",
        script: concat!(
            "$drivers=@{};",
            "Get-CimInstance Win32_PnPSignedDriver -ErrorAction SilentlyContinue | ",
            "Where-Object { $_.DeviceID } | ForEach-Object { $drivers[$_.DeviceID]=$_.DriverVersion };",
            "Get-CimInstance Win32_PnPEntity -ErrorAction Stop | ForEach-Object { [pscustomobject]@{ ",
            "Name=$_.Name; DeviceID=$_.DeviceID; PNPDeviceID=$_.PNPDeviceID; ",
            "Manufacturer=$_.Manufacturer; Status=$_.Status; ",
            "DriverVersion=$(if ($_.DeviceID) { $drivers[$_.DeviceID] } else { $null }) } } | ",
            "ConvertTo-Json -Compress",
        ),
    };

    pub const DISK_DRIVES: CimQuery = CimQuery {
        name: "Win32_DiskDrive",
        script: concat!(
            "Get-CimInstance Win32_DiskDrive -ErrorAction Stop | ",
            "Select-Object PNPDeviceID,Model,SerialNumber | ConvertTo-Json -Compress",
        ),
    };

    pub const MONITORS: CimQuery = CimQuery {
        name: "WmiMonitorID",
        script: concat!(
            "Get-CimInstance -Namespace root\\wmi -ClassName WmiMonitorID -ErrorAction Stop | ",
            "Select-Object InstanceName,SerialNumberID | ConvertTo-Json -Compress",
        ),
    };

    pub const PRINTERS: CimQuery = CimQuery {
        name: "Win32_Printer",
        script: "Get-CimInstance Win32_Printer -ErrorAction Stop | Select-Object Name | ConvertTo-Json -Compress",
    };

    pub const NETWORK_ADAPTERS: CimQuery = CimQuery {
        name: "Win32_NetworkAdapter",
        script: concat!(
            "Get-CimInstance Win32_NetworkAdapter -ErrorAction Stop | ",
            "Select-Object PNPDeviceID,AdapterType,MACAddress,Speed | ConvertTo-Json -Compress",
        ),
    };

    pub const BIOS: CimQuery = CimQuery {
        name: "Win32_BIOS",
        script: "Get-CimInstance Win32_BIOS -ErrorAction Stop | Select-Object SerialNumber | ConvertTo-Json -Compress",
    };
}

/// Backend that queries the local CIM repository
#[derive(Debug, Clone)]
pub struct WmiBackend {
    powershell: PathBuf,
}

impl Default for WmiBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl WmiBackend {
    pub fn new() -> Self {
        Self {
            powershell: PathBuf::from(POWERSHELL_EXE),
        }
    }

    /// Use a different PowerShell binary (e.g. `pwsh`)
    pub fn with_powershell(powershell: impl Into<PathBuf>) -> Self {
        Self {
            powershell: powershell.into(),
        }
    }

    /// Whether live CIM queries can run on this host
    pub fn is_supported() -> bool {
        cfg!(target_os = "windows")
    }

    fn query(&self, query: &CimQuery) -> Result<Vec<Value>, BackendError> {
        if !Self::is_supported() {
            return Err(BackendError::Unsupported(format!("CIM query {}", query.name)));
        }
        let stdout = self.run_powershell(query)?;
        let records = json_records(query.name, &stdout)?;
        debug!(query = query.name, records = records.len(), "CIM query complete");
        Ok(records)
    }

    fn run_powershell(&self, query: &CimQuery) -> Result<String, BackendError> {
        trace!(query = query.name, "Running PowerShell");
        let output = Command::new(&self.powershell)
            .args(["-NoProfile", "-NonInteractive", "-Command", query.script])
            .output()
            .map_err(|source| BackendError::Spawn {
                program: self.powershell.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(BackendError::QueryFailed {
                query: query.name.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl EnumerationBackend for WmiBackend {
    fn name(&self) -> &str {
        "wmi"
    }

    fn primary_entries(&self) -> Result<Vec<RawDeviceEntry>, BackendError> {
        let records = self.query(&queries::PNP_ENTITIES)?;
        Ok(parse_pnp_entities(&records))
    }

    fn disk_details(&self) -> Result<Collected, BackendError> {
        Ok(parse_disk_drives(&self.query(&queries::DISK_DRIVES)?))
    }

    fn monitor_details(&self) -> Result<Collected, BackendError> {
        Ok(parse_monitors(&self.query(&queries::MONITORS)?))
    }

    fn printer_details(&self) -> Result<Collected, BackendError> {
        Ok(parse_printers(&self.query(&queries::PRINTERS)?))
    }

    fn adapter_details(&self) -> Result<Collected, BackendError> {
        Ok(parse_network_adapters(&self.query(&queries::NETWORK_ADAPTERS)?))
    }

    fn service_tag(&self) -> Outcome<String> {
        match self.query(&queries::BIOS) {
            Ok(records) => parse_bios_serial(&records),
            Err(e) => {
                debug!(error = %e, "Service tag lookup failed");
                Outcome::Absent(e.to_absent_reason())
            }
        }
    }
}
