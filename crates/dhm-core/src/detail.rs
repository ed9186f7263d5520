//! Category detail mappings
//!
//! Each hardware category (disk, monitor, printer, network adapter) has its
//! own inventory source, keyed by whatever identifier that source exposes.
//! A [`DetailSet`] bundles the four mappings for one scan; it is built once
//! and only read afterwards.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::outcome::{AbsentReason, Outcome};

/// Hardware category with its own detail source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailCategory {
    Disk,
    Monitor,
    Printer,
    NetworkAdapter,
}

impl DetailCategory {
    pub const ALL: [DetailCategory; 4] = [
        DetailCategory::Disk,
        DetailCategory::Monitor,
        DetailCategory::Printer,
        DetailCategory::NetworkAdapter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DetailCategory::Disk => "disk",
            DetailCategory::Monitor => "monitor",
            DetailCategory::Printer => "printer",
            DetailCategory::NetworkAdapter => "network_adapter",
        }
    }
}

impl fmt::Display for DetailCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial identity contributed by one category source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDetail {
    pub model_number: Option<String>,
    pub series_number: Option<String>,
    pub version: Option<String>,
}

impl CategoryDetail {
    pub fn is_empty(&self) -> bool {
        self.model_number.is_none() && self.series_number.is_none() && self.version.is_none()
    }
}

/// Detail records of one category, keyed by the category's natural key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDetails {
    category: DetailCategory,
    entries: HashMap<String, CategoryDetail>,
}

impl CategoryDetails {
    pub fn new(category: DetailCategory) -> Self {
        Self {
            category,
            entries: HashMap::new(),
        }
    }

    pub fn category(&self) -> DetailCategory {
        self.category
    }

    /// Insert a record; a later record for the same key replaces the earlier one
    pub fn insert(&mut self, key: impl Into<String>, detail: CategoryDetail) {
        self.entries.insert(key.into(), detail);
    }

    pub fn get(&self, key: &str) -> Option<&CategoryDetail> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build from `(key, detail)` pairs
    pub fn from_pairs<I, K>(category: DetailCategory, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, CategoryDetail)>,
        K: Into<String>,
    {
        let mut details = Self::new(category);
        for (key, detail) in pairs {
            details.insert(key, detail);
        }
        details
    }
}

/// The four detail mappings of a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailSet {
    pub disk: CategoryDetails,
    pub monitor: CategoryDetails,
    pub printer: CategoryDetails,
    pub network_adapter: CategoryDetails,
}

impl DetailSet {
    pub fn empty() -> Self {
        Self {
            disk: CategoryDetails::new(DetailCategory::Disk),
            monitor: CategoryDetails::new(DetailCategory::Monitor),
            printer: CategoryDetails::new(DetailCategory::Printer),
            network_adapter: CategoryDetails::new(DetailCategory::NetworkAdapter),
        }
    }

    pub fn get(&self, category: DetailCategory) -> &CategoryDetails {
        match category {
            DetailCategory::Disk => &self.disk,
            DetailCategory::Monitor => &self.monitor,
            DetailCategory::Printer => &self.printer,
            DetailCategory::NetworkAdapter => &self.network_adapter,
        }
    }

    /// Replace the mapping for the category the given details belong to
    pub fn set(&mut self, details: CategoryDetails) {
        match details.category() {
            DetailCategory::Disk => self.disk = details,
            DetailCategory::Monitor => self.monitor = details,
            DetailCategory::Printer => self.printer = details,
            DetailCategory::NetworkAdapter => self.network_adapter = details,
        }
    }
}

impl Default for DetailSet {
    fn default() -> Self {
        Self::empty()
    }
}

/// Key shared by monitor records and primary entries: the identifier without its `_<index>` suffix
///
/// `DISPLAY\DEL4109\5&2a5d1b1&0&UID4353_0` becomes `DISPLAY\DEL4109\5&2a5d1b1&0&UID4353`.
/// Identifiers whose last `_` is not followed by digits only are returned unchanged.
pub fn monitor_key(identifier: &str) -> &str {
    match identifier.rsplit_once('_') {
        Some((prefix, index))
            if !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()) =>
        {
            prefix
        }
        _ => identifier,
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("character codes are not an array")]
    NotAnArray,
    #[error("non-numeric character code at index {0}")]
    NonNumeric(usize),
    #[error("invalid character code {code} at index {index}")]
    InvalidCode { index: usize, code: u64 },
}

/// Decode an array of character codes (as reported in `WmiMonitorID.SerialNumberID`)
///
/// Surrounding whitespace and NUL padding are trimmed.
pub fn decode_char_codes(codes: &Value) -> Result<String, DecodeError> {
    let codes = codes.as_array().ok_or(DecodeError::NotAnArray)?;
    let mut decoded = String::with_capacity(codes.len());
    for (index, code) in codes.iter().enumerate() {
        let code = code.as_u64().ok_or(DecodeError::NonNumeric(index))?;
        let ch = u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .ok_or(DecodeError::InvalidCode { index, code })?;
        decoded.push(ch);
    }
    Ok(decoded
        .trim_matches(|c: char| c.is_whitespace() || c == '\0')
        .to_string())
}

/// Monitor series number from its character codes, with the reason when there is none
pub fn monitor_series(codes: Option<&Value>) -> Outcome<String> {
    match codes {
        None | Some(Value::Null) => Outcome::not_reported(),
        Some(codes) => match decode_char_codes(codes) {
            Ok(serial) if serial.is_empty() => Outcome::not_reported(),
            Ok(serial) => Outcome::Present(serial),
            Err(e) => Outcome::Absent(AbsentReason::Malformed(e.to_string())),
        },
    }
}
