//! Best-effort lookup results
//!
//! Enrichment sources (monitor serials, the chassis service tag, whole
//! category listings) are allowed to fail without aborting a scan. Instead of
//! discarding the failure, lookups return an [`Outcome`] that carries either
//! the value or the reason it is missing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a best-effort value is missing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AbsentReason {
    /// The source answered but had no value for this field
    NotReported,
    /// The source cannot be queried on this host (missing namespace, denied access, wrong platform)
    Unsupported(String),
    /// The source answered with data that could not be decoded
    Malformed(String),
    /// Collection was switched off in configuration
    Disabled,
}

impl fmt::Display for AbsentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbsentReason::NotReported => write!(f, "not reported"),
            AbsentReason::Unsupported(why) => write!(f, "unsupported: {}", why),
            AbsentReason::Malformed(why) => write!(f, "malformed: {}", why),
            AbsentReason::Disabled => write!(f, "disabled"),
        }
    }
}

/// A value that is either present or absent for a known reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Present(T),
    Absent(AbsentReason),
}

impl<T> Outcome<T> {
    /// Absent because the source had nothing to report
    pub fn not_reported() -> Self {
        Outcome::Absent(AbsentReason::NotReported)
    }

    /// Wrap an optional value, treating `None` as "not reported"
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Outcome::Present(v),
            None => Outcome::not_reported(),
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Outcome::Present(_))
    }

    /// Reason the value is missing, if it is
    pub fn reason(&self) -> Option<&AbsentReason> {
        match self {
            Outcome::Present(_) => None,
            Outcome::Absent(reason) => Some(reason),
        }
    }

    /// Drop the reason and keep only the value
    pub fn into_option(self) -> Option<T> {
        match self {
            Outcome::Present(v) => Some(v),
            Outcome::Absent(_) => None,
        }
    }
}

impl<T> From<Option<T>> for Outcome<T> {
    fn from(value: Option<T>) -> Self {
        Outcome::from_option(value)
    }
}
