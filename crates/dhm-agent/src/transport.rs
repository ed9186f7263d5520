//! Delivery of scan reports to the collector
//!
//! The collector accepts `{"client_hostname": ..., "devices": [...]}` with
//! human-readable device keys and answers `{"message": ...}`.

use dhm_core::{DeviceRecord, ScanReport};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Status sent when the enumeration reported none
pub const UNKNOWN_STATUS: &str = "Unknown";

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Collector rejected sync with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Invalid acknowledgement: {0}")]
    InvalidAck(#[source] serde_json::Error),
}

/// Device as the collector expects it
#[derive(Debug, Serialize)]
pub struct WireDevice<'a> {
    #[serde(rename = "Device Name")]
    pub device_name: &'a str,
    #[serde(rename = "Model Number")]
    pub model_number: Option<&'a str>,
    #[serde(rename = "Series Number")]
    pub series_number: Option<&'a str>,
    #[serde(rename = "Service Tag")]
    pub service_tag: Option<&'a str>,
    #[serde(rename = "Version")]
    pub version: Option<&'a str>,
    #[serde(rename = "Manufacturer")]
    pub manufacturer: Option<&'a str>,
    #[serde(rename = "Status")]
    pub status: &'a str,
    #[serde(rename = "DeviceID")]
    pub device_id: &'a str,
}

impl<'a> From<&'a DeviceRecord> for WireDevice<'a> {
    fn from(record: &'a DeviceRecord) -> Self {
        Self {
            device_name: &record.device_name,
            model_number: record.model_number.as_deref(),
            series_number: record.series_number.as_deref(),
            service_tag: record.service_tag.as_deref(),
            version: record.version.as_deref(),
            manufacturer: record.manufacturer.as_deref(),
            status: record.status.as_deref().unwrap_or(UNKNOWN_STATUS),
            device_id: record.raw_identifier.as_str(),
        }
    }
}

/// Request body of one sync
#[derive(Debug, Serialize)]
pub struct SyncPayload<'a> {
    pub client_hostname: &'a str,
    pub devices: Vec<WireDevice<'a>>,
}

impl<'a> SyncPayload<'a> {
    pub fn from_report(report: &'a ScanReport) -> Self {
        Self {
            client_hostname: &report.hostname,
            devices: report.devices.iter().map(WireDevice::from).collect(),
        }
    }
}

/// Collector acknowledgement
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SyncAck {
    #[serde(default)]
    pub message: Option<String>,
}

/// HTTP client for the collector sync endpoint
#[derive(Debug, Clone)]
pub struct SyncClient {
    client: reqwest::Client,
    url: String,
}

impl SyncClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one report; a single attempt, no retries
    pub async fn send(&self, report: &ScanReport) -> Result<SyncAck, TransportError> {
        let payload = SyncPayload::from_report(report);
        debug!(
            url = %self.url,
            scan_id = %report.scan_id,
            devices = payload.devices.len(),
            "Sending inventory"
        );

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| TransportError::Request {
                url: self.url.clone(),
                source,
            })?;

        if !status.is_success() {
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let ack = if body.trim().is_empty() {
            SyncAck::default()
        } else {
            serde_json::from_str(&body).map_err(TransportError::InvalidAck)?
        };

        info!(
            scan_id = %report.scan_id,
            devices = report.devices.len(),
            message = ack.message.as_deref().unwrap_or(""),
            "Inventory synced"
        );
        Ok(ack)
    }
}
