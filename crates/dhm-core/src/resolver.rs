//! Device enrichment
//!
//! Merges the primary enumeration with the category detail mappings into one
//! [`DeviceRecord`] per named device. Resolution is a pure function of its
//! inputs: no I/O, no shared state, enumeration order preserved.

use tracing::{debug, trace};

use crate::detail::DetailSet;
use crate::device::{DeviceId, DeviceRecord, RawDeviceEntry};
use crate::identity::{is_usb, parse_identifier_with, InstanceIdHeuristic, SerialHeuristic};
use crate::precedence::{DetailField, FieldPrecedence, MatchedDetails};

/// Merges raw entries and category details into canonical records
pub struct Resolver {
    precedence: FieldPrecedence,
    heuristic: Box<dyn SerialHeuristic>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(FieldPrecedence::default(), Box::new(InstanceIdHeuristic))
    }
}

impl Resolver {
    pub fn new(precedence: FieldPrecedence, heuristic: Box<dyn SerialHeuristic>) -> Self {
        Self {
            precedence,
            heuristic,
        }
    }

    /// Same precedence, different serial heuristic
    pub fn with_heuristic(mut self, heuristic: Box<dyn SerialHeuristic>) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// Resolve every entry, skipping those without a name
    pub fn resolve(
        &self,
        entries: &[RawDeviceEntry],
        details: &DetailSet,
        service_tag: Option<&str>,
    ) -> Vec<DeviceRecord> {
        let records: Vec<DeviceRecord> = entries
            .iter()
            .filter_map(|entry| self.resolve_entry(entry, details, service_tag))
            .collect();

        debug!(
            entries = entries.len(),
            records = records.len(),
            skipped = entries.len() - records.len(),
            "Resolved device records"
        );
        records
    }

    /// Resolve one entry; `None` when its name is blank
    pub fn resolve_entry(
        &self,
        entry: &RawDeviceEntry,
        details: &DetailSet,
        service_tag: Option<&str>,
    ) -> Option<DeviceRecord> {
        let Some(name) = entry.display_name() else {
            trace!(id = %entry.raw_identifier, "Skipping entry without a name");
            return None;
        };

        let matched = MatchedDetails::lookup(entry, name, details);

        let mut record = DeviceRecord::new(name, DeviceId::from_hwid(&entry.raw_identifier));
        record.model_number = self.precedence.resolve(DetailField::ModelNumber, &matched);
        record.series_number = self.precedence.resolve(DetailField::SeriesNumber, &matched);
        record.version = self.precedence.resolve(DetailField::Version, &matched);

        if is_usb(&entry.raw_identifier) {
            let identity = parse_identifier_with(&entry.raw_identifier, self.heuristic.as_ref());
            // A serial in the identifier beats any category series number
            if let Some(serial) = identity.serial.clone() {
                record.series_number = Some(serial);
            }
            if record.model_number.is_none() {
                record.model_number = identity.model_tag();
            }
        }

        record.service_tag = service_tag.map(ToString::to_string);
        record.manufacturer = entry.manufacturer.clone();
        record.status = entry.status.clone();
        record.driver_version = entry.driver_version.clone();

        Some(record)
    }
}

/// Resolve with the default precedence and serial heuristic
pub fn resolve(
    entries: &[RawDeviceEntry],
    details: &DetailSet,
    service_tag: Option<&str>,
) -> Vec<DeviceRecord> {
    Resolver::default().resolve(entries, details, service_tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detail::{monitor_key, CategoryDetail, CategoryDetails, DetailCategory};
    use crate::identity::AcceptAllSerials;

    fn model(m: &str) -> CategoryDetail {
        CategoryDetail {
            model_number: Some(m.to_string()),
            ..Default::default()
        }
    }

    fn series(s: &str) -> CategoryDetail {
        CategoryDetail {
            series_number: Some(s.to_string()),
            ..Default::default()
        }
    }

    fn usb_drive() -> RawDeviceEntry {
        RawDeviceEntry {
            device_name: "Generic USB Drive".to_string(),
            raw_identifier: "USB\\VID_0951&PID_1666\\E0D55C2D9D61E5B3".to_string(),
            manufacturer: Some("SanDisk".to_string()),
            status: Some("OK".to_string()),
            driver_version: None,
            adapter_identifier: None,
        }
    }

    #[test]
    fn test_usb_drive_end_to_end() {
        let records = resolve(&[usb_drive()], &DetailSet::empty(), None);
        assert_eq!(records.len(), 1);

        let r = &records[0];
        assert_eq!(r.device_name, "Generic USB Drive");
        assert_eq!(r.model_number.as_deref(), Some("VID_0951&PID_1666"));
        // sixteen hex digits look like a generated instance id
        assert_eq!(r.series_number, None);
        assert_eq!(r.service_tag, None);
        assert_eq!(r.version, None);
        assert_eq!(r.manufacturer.as_deref(), Some("SanDisk"));
        assert_eq!(r.status.as_deref(), Some("OK"));
        assert_eq!(r.raw_identifier.as_str(), "USB\\VID_0951&PID_1666\\E0D55C2D9D61E5B3");
    }

    #[test]
    fn test_usb_drive_with_real_serial() {
        let mut entry = usb_drive();
        entry.raw_identifier = "USB\\VID_0951&PID_1666\\E0D55C2D9D61G5B3".to_string();

        let records = resolve(&[entry], &DetailSet::empty(), None);
        assert_eq!(records[0].model_number.as_deref(), Some("VID_0951&PID_1666"));
        assert_eq!(records[0].series_number.as_deref(), Some("E0D55C2D9D61G5B3"));
    }

    #[test]
    fn test_disk_model_beats_adapter_model() {
        let id = "PCI\\VEN_8086&DEV_15F3\\3&11583659&0&E8";
        let mut entry = RawDeviceEntry::new("Intel Ethernet", id);
        entry.adapter_identifier = Some(id.to_string());

        let mut details = DetailSet::empty();
        details.set(CategoryDetails::from_pairs(DetailCategory::Disk, [(id, model("Disk model"))]));
        details.set(CategoryDetails::from_pairs(
            DetailCategory::NetworkAdapter,
            [(id, model("Ethernet 802.3"))],
        ));

        let records = resolve(&[entry], &details, None);
        assert_eq!(records[0].model_number.as_deref(), Some("Disk model"));
    }

    #[test]
    fn test_usb_serial_overrides_disk_series() {
        let id = "USB\\VID_0781&PID_5581\\4C530001230101119534";
        let entry = RawDeviceEntry::new("SanDisk Ultra", id);

        let mut details = DetailSet::empty();
        details.set(CategoryDetails::from_pairs(
            DetailCategory::Disk,
            [(id, CategoryDetail {
                model_number: Some("SanDisk Ultra USB Device".to_string()),
                series_number: Some("DISK-SERIAL".to_string()),
                version: None,
            })],
        ));

        let records = resolve(&[entry], &details, None);
        assert_eq!(records[0].series_number.as_deref(), Some("4C530001230101119534"));
        // a category model is kept; the tag only fills a gap
        assert_eq!(records[0].model_number.as_deref(), Some("SanDisk Ultra USB Device"));
    }

    #[test]
    fn test_blank_names_skipped() {
        let entries = vec![
            RawDeviceEntry::new("", "ACPI\\PNP0C0A\\1"),
            RawDeviceEntry::new("Keyboard", "HID\\VID_046D&PID_C31C\\7&1"),
            RawDeviceEntry::new("   ", "ACPI\\PNP0C0A\\2"),
            RawDeviceEntry::new("\tMouse ", "HID\\VID_046D&PID_C077\\7&2"),
        ];
        let records = resolve(&entries, &DetailSet::empty(), Some("7XK2Q13"));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].device_name, "Keyboard");
        assert_eq!(records[1].device_name, "Mouse");
        assert!(records.iter().all(|r| r.service_tag.as_deref() == Some("7XK2Q13")));
    }

    #[test]
    fn test_monitor_lookup_by_truncated_key() {
        let entry = RawDeviceEntry::new(
            "Generic PnP Monitor",
            "DISPLAY\\DEL4109\\5&2A5D1B1&0&UID4353_0",
        );
        let mut details = DetailSet::empty();
        details.set(CategoryDetails::from_pairs(
            DetailCategory::Monitor,
            [("DISPLAY\\DEL4109\\5&2A5D1B1&0&UID4353", series("CN0H4ZN8"))],
        ));

        let records = resolve(&[entry], &details, None);
        assert_eq!(records[0].series_number.as_deref(), Some("CN0H4ZN8"));
        assert_eq!(records[0].model_number, None);
    }

    #[test]
    fn test_monitor_lookup_with_underscore_in_identifier() {
        let entry = RawDeviceEntry::new(
            "Generic Non-PnP Monitor",
            "DISPLAY\\Default_Monitor\\4&1B2C3D&0&UID0",
        );
        let mut details = DetailSet::empty();
        details.set(CategoryDetails::from_pairs(
            DetailCategory::Monitor,
            [(
                monitor_key("DISPLAY\\Default_Monitor\\4&1B2C3D&0&UID0_0"),
                series("CN0H4ZN8"),
            )],
        ));

        let records = resolve(&[entry], &details, None);
        assert_eq!(records[0].series_number.as_deref(), Some("CN0H4ZN8"));
    }

    #[test]
    fn test_printer_lookup_by_trimmed_name() {
        let entry = RawDeviceEntry::new(" HP LaserJet 400 ", "SWD\\PRINTENUM\\{5A1F}");
        let mut details = DetailSet::empty();
        details.set(CategoryDetails::from_pairs(
            DetailCategory::Printer,
            [("HP LaserJet 400", model("HP LaserJet 400"))],
        ));

        let records = resolve(&[entry], &details, None);
        assert_eq!(records[0].model_number.as_deref(), Some("HP LaserJet 400"));
    }

    #[test]
    fn test_adapter_supplies_version_and_driver_version_untouched() {
        let mut entry = RawDeviceEntry::new("Realtek PCIe GbE", "PCI\\VEN_10EC&DEV_8168\\4&1");
        entry.adapter_identifier = Some("PCI\\VEN_10EC&DEV_8168\\4&1".to_string());
        entry.driver_version = Some("10.38.1118.2019".to_string());

        let mut details = DetailSet::empty();
        details.set(CategoryDetails::from_pairs(
            DetailCategory::NetworkAdapter,
            [("PCI\\VEN_10EC&DEV_8168\\4&1", CategoryDetail {
                model_number: Some("Ethernet 802.3".to_string()),
                series_number: Some("00:E0:4C:68:01:02".to_string()),
                version: Some("1000000000".to_string()),
            })],
        ));

        let records = resolve(&[entry], &details, None);
        let r = &records[0];
        assert_eq!(r.version.as_deref(), Some("1000000000"));
        assert_eq!(r.driver_version.as_deref(), Some("10.38.1118.2019"));
        assert_eq!(r.series_number.as_deref(), Some("00:E0:4C:68:01:02"));
    }

    #[test]
    fn test_no_adapter_identifier_means_no_adapter_match() {
        let id = "PCI\\VEN_10EC&DEV_8168\\4&1";
        let entry = RawDeviceEntry::new("Realtek PCIe GbE", id);
        let mut details = DetailSet::empty();
        details.set(CategoryDetails::from_pairs(
            DetailCategory::NetworkAdapter,
            [(id, model("Ethernet 802.3"))],
        ));

        let records = resolve(&[entry], &details, None);
        assert_eq!(records[0].model_number, None);
    }

    #[test]
    fn test_non_usb_identifiers_not_parsed() {
        let entry = RawDeviceEntry::new("HID Keyboard", "HID\\VID_046D&PID_C31C\\CN42SERIAL");
        let records = resolve(&[entry], &DetailSet::empty(), None);
        assert_eq!(records[0].model_number, None);
        assert_eq!(records[0].series_number, None);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let entries = vec![
            usb_drive(),
            RawDeviceEntry::new("Keyboard", "USB\\VID_046D&PID_C31C\\CN42"),
            RawDeviceEntry::new("", "ACPI\\PNP0C0A\\1"),
        ];
        let details = DetailSet::empty();
        let first = resolve(&entries, &details, Some("TAG"));
        let second = resolve(&entries, &details, Some("TAG"));
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_custom_heuristic() {
        let resolver = Resolver::default().with_heuristic(Box::new(AcceptAllSerials));
        let records = resolver.resolve(&[usb_drive()], &DetailSet::empty(), None);
        assert_eq!(records[0].series_number.as_deref(), Some("E0D55C2D9D61E5B3"));
    }
}
