//! DHM Discovery - Hardware enumeration for the inventory agent
//!
//! This crate provides the enumeration backends and the scan entry point:
//! - CIM/WMI queries through PowerShell on Windows hosts
//! - Recorded snapshots for replay and testing on any host
//! - The scanner that collects every source and resolves a [`dhm_core::ScanReport`]

pub mod backend;
pub mod records;
pub mod scanner;
pub mod snapshot;
pub mod wmi;

pub use backend::{BackendError, Collected, EnumerationBackend};
pub use scanner::{InventoryScanner, ScanError, ScannerConfig};
pub use snapshot::{SnapshotBackend, SnapshotError};
pub use wmi::WmiBackend;
