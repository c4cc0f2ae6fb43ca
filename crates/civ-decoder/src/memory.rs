//! Per-band memory
//!
//! Every band keeps the three band-stack registers of the radio plus the
//! receiver settings last reported while operating on it. The store is owned
//! by the caller and written only through [`BandMemoryStore::apply`].

use std::fmt;

use crate::band::{Band, BandPlan};
use crate::error::DecodeError;
use crate::mode::{FilterIndex, ModeIndex};
use crate::report::CivReport;

/// Number of band-stack registers per band
pub const STACK_DEPTH: usize = 3;

/// Band-stack register number, 1 (most recent) to 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StackRegister(u8);

impl StackRegister {
    pub fn new(number: u8) -> Result<Self, DecodeError> {
        if (1..=STACK_DEPTH as u8).contains(&number) {
            Ok(Self(number))
        } else {
            Err(DecodeError::InvalidRegister(number))
        }
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    fn slot(&self) -> usize {
        usize::from(self.0) - 1
    }
}

/// Which VFO an extended mode report refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Vfo {
    Selected,
    Unselected,
}

/// AGC time constant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Agc {
    Fast,
    Mid,
    Slow,
}

impl fmt::Display for Agc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Agc::Fast => "AGC-F",
            Agc::Mid => "AGC-M",
            Agc::Slow => "AGC-S",
        };
        f.write_str(name)
    }
}

/// Frequency and mode settings of one VFO or band-stack register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VfoSlot {
    pub frequency_hz: u64,
    /// `None` until a mode has been reported
    pub mode: Option<ModeIndex>,
    pub filter: FilterIndex,
    pub data_flag: u8,
}

impl VfoSlot {
    fn with_filter(filter: FilterIndex) -> Self {
        Self {
            frequency_hz: 0,
            mode: None,
            filter,
            data_flag: 0,
        }
    }

    fn set_mode(&mut self, mode: ModeIndex, filter: FilterIndex, data_flag: u8) {
        self.mode = Some(mode);
        self.filter = filter;
        self.data_flag = data_flag;
    }
}

impl Default for VfoSlot {
    fn default() -> Self {
        Self::with_filter(FilterIndex(1))
    }
}

/// Everything remembered about one band
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BandMemoryRecord {
    /// Band-stack registers; register 1 is the selected VFO
    slots: [VfoSlot; STACK_DEPTH],
    unselected: VfoSlot,
    attenuator: bool,
    preamp: bool,
    agc: Option<Agc>,
    split: bool,
    rit_offset_hz: i64,
    xit_offset_hz: i64,
    rit_on: bool,
    xit_on: bool,
    duplex_offset_hz: i64,
}

impl BandMemoryRecord {
    fn with_filter(filter: FilterIndex) -> Self {
        Self {
            slots: [VfoSlot::with_filter(filter); STACK_DEPTH],
            unselected: VfoSlot::with_filter(filter),
            ..Default::default()
        }
    }

    /// Selected VFO, which is also band-stack register 1
    pub fn primary(&self) -> &VfoSlot {
        &self.slots[0]
    }

    pub fn slot(&self, register: StackRegister) -> &VfoSlot {
        &self.slots[register.slot()]
    }

    pub fn slots(&self) -> &[VfoSlot; STACK_DEPTH] {
        &self.slots
    }

    pub fn unselected(&self) -> &VfoSlot {
        &self.unselected
    }

    pub fn attenuator(&self) -> bool {
        self.attenuator
    }

    pub fn preamp(&self) -> bool {
        self.preamp
    }

    pub fn agc(&self) -> Option<Agc> {
        self.agc
    }

    pub fn split(&self) -> bool {
        self.split
    }

    pub fn rit_offset_hz(&self) -> i64 {
        self.rit_offset_hz
    }

    pub fn xit_offset_hz(&self) -> i64 {
        self.xit_offset_hz
    }

    pub fn rit_on(&self) -> bool {
        self.rit_on
    }

    pub fn xit_on(&self) -> bool {
        self.xit_on
    }

    pub fn duplex_offset_hz(&self) -> i64 {
        self.duplex_offset_hz
    }

    fn set_preamp(&mut self, on: bool) {
        self.preamp = on;
        if on {
            self.attenuator = false;
        }
    }

    fn set_attenuator(&mut self, on: bool) {
        self.attenuator = on;
        if on {
            self.preamp = false;
        }
    }
}

/// One [`BandMemoryRecord`] per [`Band`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BandMemoryStore {
    records: [BandMemoryRecord; Band::COUNT],
}

impl BandMemoryStore {
    /// Empty store with each band's default filter from the plan
    pub fn new(plan: &BandPlan) -> Self {
        Self {
            records: std::array::from_fn(|i| {
                BandMemoryRecord::with_filter(plan.edges(Band::ALL[i]).default_filter)
            }),
        }
    }

    pub fn record(&self, band: Band) -> &BandMemoryRecord {
        &self.records[band.index()]
    }

    fn record_mut(&mut self, band: Band) -> &mut BandMemoryRecord {
        &mut self.records[band.index()]
    }

    /// Iterate records in band order
    pub fn iter(&self) -> impl Iterator<Item = (Band, &BandMemoryRecord)> {
        Band::ALL.into_iter().zip(self.records.iter())
    }

    /// Commit a decoded report
    ///
    /// Band-stack reports name their own band; everything else lands on
    /// `current`. Reports that only describe the radio as a whole (TX state,
    /// clock, position, UTC offset) leave the store untouched.
    pub fn apply(&mut self, current: Band, report: &CivReport) {
        match *report {
            CivReport::Frequency { hz } => {
                self.record_mut(current).slots[0].frequency_hz = hz;
            }
            CivReport::Mode {
                mode,
                filter,
                data_flag,
            } => {
                self.record_mut(current).slots[0].set_mode(mode, filter, data_flag);
            }
            CivReport::BandStack(entry) => {
                let slot = &mut self.record_mut(entry.band).slots[entry.register.slot()];
                slot.frequency_hz = entry.frequency_hz;
                if let Some(mode) = entry.mode {
                    slot.set_mode(mode, entry.filter, entry.data_flag);
                }
            }
            CivReport::ExtendedMode {
                vfo,
                mode,
                filter,
                data_flag,
            } => {
                let record = self.record_mut(current);
                let slot = match vfo {
                    Vfo::Selected => &mut record.slots[0],
                    Vfo::Unselected => &mut record.unselected,
                };
                slot.set_mode(mode, filter, data_flag);
            }
            CivReport::Preamp { on } => self.record_mut(current).set_preamp(on),
            CivReport::Attenuator { on } => self.record_mut(current).set_attenuator(on),
            CivReport::Agc(agc) => self.record_mut(current).agc = Some(agc),
            CivReport::Split { on } => self.record_mut(current).split = on,
            CivReport::DuplexOffset { offset_hz } => {
                self.record_mut(current).duplex_offset_hz = offset_hz;
            }
            CivReport::RitXitOffset { offset_hz } => {
                // RIT and XIT share one offset on the radio
                let record = self.record_mut(current);
                record.rit_offset_hz = offset_hz;
                record.xit_offset_hz = offset_hz;
            }
            CivReport::RitOnOff { on } => self.record_mut(current).rit_on = on,
            CivReport::XitOnOff { on } => self.record_mut(current).xit_on = on,
            CivReport::Transmit { .. } | CivReport::Position { .. } | CivReport::UtcOffset(_) => {}
        }
    }
}

impl Default for BandMemoryStore {
    fn default() -> Self {
        Self::new(&BandPlan::default())
    }
}
