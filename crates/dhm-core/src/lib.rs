//! DHM Core - Device identity resolution and enrichment
//!
//! This crate provides the pure, I/O-free part of the inventory agent:
//! - Parsing raw plug-and-play identifiers into vendor/product/serial fields
//! - Category detail mappings (disk, monitor, printer, network adapter)
//! - Field precedence and the resolver that merges everything into one record per device
//! - Scan report types handed to the transport

pub mod detail;
pub mod device;
pub mod identity;
pub mod outcome;
pub mod precedence;
pub mod report;
pub mod resolver;

pub use detail::{
    decode_char_codes, monitor_key, monitor_series, CategoryDetail, CategoryDetails,
    DecodeError, DetailCategory, DetailSet,
};
pub use device::{DeviceId, DeviceRecord, RawDeviceEntry};
pub use identity::{
    parse_identifier, parse_identifier_with, AcceptAllSerials, IdentityFragment,
    InstanceIdHeuristic, SerialHeuristic,
};
pub use outcome::{AbsentReason, Outcome};
pub use precedence::{DetailField, FieldPrecedence, MatchedDetails};
pub use report::{Degradation, EnrichmentSource, ScanReport};
pub use resolver::{resolve, Resolver};
