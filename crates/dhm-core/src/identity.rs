//! Hardware identifier parsing
//!
//! Plug-and-play identifiers look like `USB\VID_04F2&PID_B2E5&MI_00\6&1F7B8B3&0&0000`
//! or `USB\VID_03F0&PID_2B17\CN12345678`: a bus tag, an `&`-joined token list
//! carrying the vendor and product tags, and an instance segment that is
//! sometimes a real serial number and sometimes a generated instance id.
//!
//! Parsing never fails. Anything that does not match the expected shape is
//! simply left unset in the resulting [`IdentityFragment`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Bus tag prefix for USB identifiers
pub const USB_PREFIX: &str = "USB";

/// Identity fields decoded from a raw identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityFragment {
    /// 4-digit vendor tag, uppercase hex
    pub vendor_tag: Option<String>,
    /// 4-digit product tag, uppercase hex
    pub product_tag: Option<String>,
    /// Serial number, if the instance segment looks like one
    pub serial: Option<String>,
}

impl IdentityFragment {
    /// `VID_xxxx&PID_yyyy` when both tags were found
    pub fn model_tag(&self) -> Option<String> {
        match (&self.vendor_tag, &self.product_tag) {
            (Some(vid), Some(pid)) => Some(format!("VID_{}&PID_{}", vid, pid)),
            _ => None,
        }
    }
}

/// Decides whether an instance segment is a genuine serial number
pub trait SerialHeuristic: Send + Sync {
    fn accepts(&self, candidate: &str) -> bool;
}

/// Rejects the instance ids Windows generates when a device has no serial
///
/// Exactly 8 or 16 uppercase hex digits, or an `MI_` multi-interface marker,
/// are treated as generated. Real serials that happen to look like that are
/// rejected too; lowercase hex is never generated and is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstanceIdHeuristic;

impl SerialHeuristic for InstanceIdHeuristic {
    fn accepts(&self, candidate: &str) -> bool {
        if candidate.trim().is_empty() {
            return false;
        }
        if candidate.starts_with("MI_") {
            return false;
        }
        let all_hex = candidate
            .chars()
            .all(|c| matches!(c, '0'..='9' | 'A'..='F'));
        !(all_hex && (candidate.len() == 8 || candidate.len() == 16))
    }
}

/// Accepts every non-empty instance segment
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllSerials;

impl SerialHeuristic for AcceptAllSerials {
    fn accepts(&self, candidate: &str) -> bool {
        !candidate.trim().is_empty()
    }
}

fn vendor_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"VID_([0-9A-Fa-f]{4})(?:[^0-9A-Fa-f]|$)").ok())
        .as_ref()
}

fn product_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"PID_([0-9A-Fa-f]{4})(?:[^0-9A-Fa-f]|$)").ok())
        .as_ref()
}

fn capture_tag(pattern: Option<&Regex>, haystack: &str) -> Option<String> {
    pattern?
        .captures(haystack)?
        .get(1)
        .map(|m| m.as_str().to_ascii_uppercase())
}

/// Whether the identifier sits on the USB bus
pub fn is_usb(identifier: &str) -> bool {
    identifier.starts_with(USB_PREFIX)
}

/// Parse an identifier using the default [`InstanceIdHeuristic`]
pub fn parse_identifier(identifier: &str) -> IdentityFragment {
    parse_identifier_with(identifier, &InstanceIdHeuristic)
}

/// Parse an identifier, using `heuristic` to judge the serial candidate
pub fn parse_identifier_with(identifier: &str, heuristic: &dyn SerialHeuristic) -> IdentityFragment {
    let segments: Vec<&str> = identifier.split('\\').collect();
    if segments.len() < 2 {
        return IdentityFragment::default();
    }

    let tokens = segments[1];
    let mut fragment = IdentityFragment {
        vendor_tag: capture_tag(vendor_pattern(), tokens),
        product_tag: capture_tag(product_pattern(), tokens),
        serial: None,
    };

    // Only segment 2 is a serial candidate; deeper segments are ignored
    if let Some(candidate) = segments.get(2) {
        if heuristic.accepts(candidate) {
            fragment.serial = Some(candidate.to_string());
        }
    }

    fragment
}
