//! Field precedence across category sources
//!
//! Every merged field lists the categories it may be taken from, in order.
//! The first category with a non-blank value wins.

use serde::{Deserialize, Serialize};

use crate::detail::{monitor_key, CategoryDetail, DetailCategory, DetailSet};
use crate::device::RawDeviceEntry;

/// Fields of a device record that are filled from category details
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailField {
    ModelNumber,
    SeriesNumber,
    Version,
}

impl DetailField {
    fn pick(self, detail: &CategoryDetail) -> Option<&str> {
        match self {
            DetailField::ModelNumber => detail.model_number.as_deref(),
            DetailField::SeriesNumber => detail.series_number.as_deref(),
            DetailField::Version => detail.version.as_deref(),
        }
    }
}

/// Ordered source list for each merged field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPrecedence {
    pub model_number: Vec<DetailCategory>,
    pub series_number: Vec<DetailCategory>,
    pub version: Vec<DetailCategory>,
}

impl Default for FieldPrecedence {
    fn default() -> Self {
        Self {
            model_number: vec![
                DetailCategory::Disk,
                DetailCategory::Printer,
                DetailCategory::NetworkAdapter,
            ],
            series_number: vec![
                DetailCategory::Disk,
                DetailCategory::Monitor,
                DetailCategory::NetworkAdapter,
            ],
            version: vec![DetailCategory::NetworkAdapter],
        }
    }
}

impl FieldPrecedence {
    pub fn order(&self, field: DetailField) -> &[DetailCategory] {
        match field {
            DetailField::ModelNumber => &self.model_number,
            DetailField::SeriesNumber => &self.series_number,
            DetailField::Version => &self.version,
        }
    }

    /// First non-blank value for `field` following this precedence
    pub fn resolve(&self, field: DetailField, matched: &MatchedDetails<'_>) -> Option<String> {
        self.order(field)
            .iter()
            .filter_map(|category| matched.get(*category))
            .filter_map(|detail| field.pick(detail))
            .find(|value| !value.trim().is_empty())
            .map(ToString::to_string)
    }
}

/// The detail record each category contributes to one device, if any
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchedDetails<'a> {
    pub disk: Option<&'a CategoryDetail>,
    pub monitor: Option<&'a CategoryDetail>,
    pub printer: Option<&'a CategoryDetail>,
    pub network_adapter: Option<&'a CategoryDetail>,
}

impl<'a> MatchedDetails<'a> {
    /// Look the entry up in every category under that category's natural key
    ///
    /// Disk uses the raw identifier, printer the trimmed device name, network
    /// adapter the adapter identifier, monitor the raw identifier truncated
    /// at its last underscore.
    pub fn lookup(entry: &RawDeviceEntry, name: &str, details: &'a DetailSet) -> Self {
        let raw = entry.raw_identifier.as_str();
        Self {
            disk: details.disk.get(raw),
            monitor: details.monitor.get(monitor_key(raw)),
            printer: details.printer.get(name),
            network_adapter: entry
                .adapter_identifier
                .as_deref()
                .and_then(|id| details.network_adapter.get(id)),
        }
    }

    pub fn get(&self, category: DetailCategory) -> Option<&'a CategoryDetail> {
        match category {
            DetailCategory::Disk => self.disk,
            DetailCategory::Monitor => self.monitor,
            DetailCategory::Printer => self.printer,
            DetailCategory::NetworkAdapter => self.network_adapter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(model: Option<&str>, series: Option<&str>, version: Option<&str>) -> CategoryDetail {
        CategoryDetail {
            model_number: model.map(String::from),
            series_number: series.map(String::from),
            version: version.map(String::from),
        }
    }

    #[test]
    fn test_default_orders() {
        let p = FieldPrecedence::default();
        assert_eq!(
            p.order(DetailField::ModelNumber),
            &[DetailCategory::Disk, DetailCategory::Printer, DetailCategory::NetworkAdapter]
        );
        assert_eq!(
            p.order(DetailField::SeriesNumber),
            &[DetailCategory::Disk, DetailCategory::Monitor, DetailCategory::NetworkAdapter]
        );
        assert_eq!(p.order(DetailField::Version), &[DetailCategory::NetworkAdapter]);
    }

    #[test]
    fn test_first_source_wins() {
        let disk = detail(Some("Samsung SSD 980"), Some("S64DNF0R"), None);
        let adapter = detail(Some("Ethernet 802.3"), Some("AA:BB:CC:DD:EE:FF"), Some("1000000000"));
        let matched = MatchedDetails {
            disk: Some(&disk),
            network_adapter: Some(&adapter),
            ..Default::default()
        };
        let p = FieldPrecedence::default();
        assert_eq!(
            p.resolve(DetailField::ModelNumber, &matched).as_deref(),
            Some("Samsung SSD 980")
        );
        assert_eq!(p.resolve(DetailField::SeriesNumber, &matched).as_deref(), Some("S64DNF0R"));
        assert_eq!(p.resolve(DetailField::Version, &matched).as_deref(), Some("1000000000"));
    }

    #[test]
    fn test_blank_values_fall_through() {
        let disk = detail(Some(""), Some("  "), None);
        let monitor = detail(None, Some("H4ZN800123"), None);
        let printer = detail(Some("HP LaserJet 400"), None, None);
        let matched = MatchedDetails {
            disk: Some(&disk),
            monitor: Some(&monitor),
            printer: Some(&printer),
            network_adapter: None,
        };
        let p = FieldPrecedence::default();
        assert_eq!(
            p.resolve(DetailField::ModelNumber, &matched).as_deref(),
            Some("HP LaserJet 400")
        );
        assert_eq!(
            p.resolve(DetailField::SeriesNumber, &matched).as_deref(),
            Some("H4ZN800123")
        );
        assert_eq!(p.resolve(DetailField::Version, &matched), None);
    }

    #[test]
    fn test_monitor_never_supplies_model() {
        let monitor = detail(Some("Should not be used"), None, None);
        let matched = MatchedDetails {
            monitor: Some(&monitor),
            ..Default::default()
        };
        assert_eq!(
            FieldPrecedence::default().resolve(DetailField::ModelNumber, &matched),
            None
        );
    }

    #[test]
    fn test_custom_order() {
        let disk = detail(Some("Disk model"), None, None);
        let adapter = detail(Some("Adapter model"), None, None);
        let matched = MatchedDetails {
            disk: Some(&disk),
            network_adapter: Some(&adapter),
            ..Default::default()
        };
        let p = FieldPrecedence {
            model_number: vec![DetailCategory::NetworkAdapter, DetailCategory::Disk],
            ..Default::default()
        };
        assert_eq!(
            p.resolve(DetailField::ModelNumber, &matched).as_deref(),
            Some("Adapter model")
        );
    }
}
