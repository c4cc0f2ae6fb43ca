//! Extended mode table
//!
//! Icom radios report a modulation code and, separately, a DATA on/off flag
//! (LSB with DATA on is shown as "LSB-D"). The extended mode table merges the
//! two into one index so the rest of the system tracks a single value.

use std::fmt;

use crate::error::DecodeError;

/// Position of an entry in the [`ModeTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeIndex(pub usize);

impl ModeIndex {
    /// Get the raw table position
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

/// Receive filter selection (FIL1..FIL3 on Icom radios)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterIndex(pub u8);

impl fmt::Display for FilterIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FIL{}", self.0)
    }
}

/// One (mode, data) combination the radio supports
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ModeEntry {
    /// CI-V modulation code as sent on the wire
    pub raw_code: u8,
    /// DATA flag: 0 = off, 1 = on
    pub data_flag: u8,
    /// Display label
    pub label: &'static str,
    /// Last filter reported for this mode
    pub filter_width: FilterIndex,
}

impl ModeEntry {
    const fn new(raw_code: u8, data_flag: u8, label: &'static str, filter: u8) -> Self {
        Self {
            raw_code,
            data_flag,
            label,
            filter_width: FilterIndex(filter),
        }
    }
}

/// Ordered (mode, data) → index table
///
/// Entries are fixed after construction except for their filter width, which
/// follows the most recent report for that mode.
#[derive(Debug, Clone)]
pub struct ModeTable {
    entries: Vec<ModeEntry>,
}

impl ModeTable {
    /// Build a table from explicit entries
    pub fn new(entries: Vec<ModeEntry>) -> Self {
        Self { entries }
    }

    /// The mode set of current Icom HF/VHF/UHF transceivers
    pub fn icom() -> Self {
        Self::new(vec![
            ModeEntry::new(0x00, 0, "LSB", 2),
            ModeEntry::new(0x00, 1, "LSB-D", 2),
            ModeEntry::new(0x01, 0, "USB", 2),
            ModeEntry::new(0x01, 1, "USB-D", 2),
            ModeEntry::new(0x02, 0, "AM", 2),
            ModeEntry::new(0x02, 1, "AM-D", 2),
            ModeEntry::new(0x03, 0, "CW", 2),
            ModeEntry::new(0x04, 0, "RTTY", 2),
            ModeEntry::new(0x05, 0, "FM", 1),
            ModeEntry::new(0x05, 1, "FM-D", 1),
            ModeEntry::new(0x06, 0, "WFM", 1),
            ModeEntry::new(0x07, 0, "CW-R", 2),
            ModeEntry::new(0x08, 0, "RTTY-R", 2),
            ModeEntry::new(0x17, 0, "DV", 1),
            ModeEntry::new(0x22, 0, "DD", 1),
            ModeEntry::new(0x23, 0, "ATV", 1),
        ])
    }

    /// Find the first entry matching `(raw_code, data_flag)`
    pub fn resolve(&self, raw_code: u8, data_flag: u8) -> Result<ModeIndex, DecodeError> {
        self.entries
            .iter()
            .position(|e| e.raw_code == raw_code && e.data_flag == data_flag)
            .map(ModeIndex)
            .ok_or(DecodeError::ModeNotFound {
                raw_code,
                data_flag,
            })
    }

    /// Resolve a mode and record the filter reported alongside it
    ///
    /// On `ModeNotFound` no entry is touched.
    pub fn resolve_with_filter(
        &mut self,
        raw_code: u8,
        data_flag: u8,
        filter: FilterIndex,
    ) -> Result<ModeIndex, DecodeError> {
        let index = self.resolve(raw_code, data_flag)?;
        self.entries[index.0].filter_width = filter;
        Ok(index)
    }

    /// Look up an entry by index
    pub fn get(&self, index: ModeIndex) -> Option<&ModeEntry> {
        self.entries.get(index.0)
    }

    /// Display label for an index, `"---"` when out of range
    pub fn label(&self, index: ModeIndex) -> &'static str {
        self.get(index).map(|e| e.label).unwrap_or("---")
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in index order
    pub fn iter(&self) -> impl Iterator<Item = &ModeEntry> {
        self.entries.iter()
    }
}

impl Default for ModeTable {
    fn default() -> Self {
        Self::icom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_resolve_data_variants() {
        let table = ModeTable::icom();
        let usb = table.resolve(0x01, 0).unwrap();
        let usb_d = table.resolve(0x01, 1).unwrap();
        assert_ne!(usb, usb_d);
        assert_eq!(table.label(usb), "USB");
        assert_eq!(table.label(usb_d), "USB-D");
    }

    #[test]
    fn test_resolve_absent_pair() {
        let table = ModeTable::icom();
        // CW has no DATA variant
        assert_eq!(
            table.resolve(0x03, 1),
            Err(DecodeError::ModeNotFound {
                raw_code: 0x03,
                data_flag: 1
            })
        );
    }

    #[test]
    fn test_resolve_with_filter_updates_only_that_entry() {
        let mut table = ModeTable::icom();
        let before: Vec<_> = table.iter().cloned().collect();

        let idx = table.resolve_with_filter(0x05, 1, FilterIndex(3)).unwrap();

        for (i, (old, new)) in before.iter().zip(table.iter()).enumerate() {
            if i == idx.0 {
                assert_eq!(new.filter_width, FilterIndex(3));
            } else {
                assert_eq!(old, new);
            }
        }
    }

    #[test]
    fn test_resolve_with_filter_absent_leaves_table() {
        let mut table = ModeTable::icom();
        let before: Vec<_> = table.iter().cloned().collect();
        assert!(table.resolve_with_filter(0x42, 0, FilterIndex(1)).is_err());
        assert_eq!(before, table.iter().cloned().collect::<Vec<_>>());
    }

    #[test]
    fn test_label_out_of_range() {
        assert_eq!(ModeTable::icom().label(ModeIndex(999)), "---");
    }

    #[test]
    fn test_filter_display() {
        assert_eq!(FilterIndex(2).to_string(), "FIL2");
    }

    proptest! {
        #[test]
        fn every_present_pair_resolves_to_its_position(pos in 0usize..16) {
            let table = ModeTable::icom();
            let entry = table.get(ModeIndex(pos)).unwrap().clone();
            prop_assert_eq!(
                table.resolve(entry.raw_code, entry.data_flag).unwrap(),
                ModeIndex(pos)
            );
        }

        #[test]
        fn absent_pairs_signal_not_found(raw in any::<u8>(), data in 0u8..=1) {
            let table = ModeTable::icom();
            let present = table.iter().any(|e| e.raw_code == raw && e.data_flag == data);
            prop_assert_eq!(table.resolve(raw, data).is_ok(), present);
        }
    }
}
