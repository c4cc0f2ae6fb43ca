//! Amateur bands and the band plan

use std::fmt;

use crate::mode::FilterIndex;

/// Bands tracked by the band memory store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Band {
    Band160M,
    Band80M,
    Band60M,
    Band40M,
    Band30M,
    Band20M,
    Band17M,
    Band15M,
    Band12M,
    Band10M,
    Band6M,
    Band144,
    Band222,
    Band432,
    Band902,
    Band1296,
    Band2400,
    Band3400,
    Band5760,
    Band10G,
    Band24G,
    Band47G,
    Band76G,
    Band122G,
}

impl Band {
    /// Number of bands
    pub const COUNT: usize = 24;

    /// All bands in ascending frequency order
    pub const ALL: [Band; Band::COUNT] = [
        Band::Band160M,
        Band::Band80M,
        Band::Band60M,
        Band::Band40M,
        Band::Band30M,
        Band::Band20M,
        Band::Band17M,
        Band::Band15M,
        Band::Band12M,
        Band::Band10M,
        Band::Band6M,
        Band::Band144,
        Band::Band222,
        Band::Band432,
        Band::Band902,
        Band::Band1296,
        Band::Band2400,
        Band::Band3400,
        Band::Band5760,
        Band::Band10G,
        Band::Band24G,
        Band::Band47G,
        Band::Band76G,
        Band::Band122G,
    ];

    /// Position in [`Band::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns a human-readable name for the band
    pub fn name(&self) -> &'static str {
        match self {
            Band::Band160M => "160M",
            Band::Band80M => "80M",
            Band::Band60M => "60M",
            Band::Band40M => "40M",
            Band::Band30M => "30M",
            Band::Band20M => "20M",
            Band::Band17M => "17M",
            Band::Band15M => "15M",
            Band::Band12M => "12M",
            Band::Band10M => "10M",
            Band::Band6M => "6M",
            Band::Band144 => "2M",
            Band::Band222 => "222",
            Band::Band432 => "432",
            Band::Band902 => "902",
            Band::Band1296 => "1296",
            Band::Band2400 => "2400",
            Band::Band3400 => "3400",
            Band::Band5760 => "5760",
            Band::Band10G => "10G",
            Band::Band24G => "24G",
            Band::Band47G => "47G",
            Band::Band76G => "76G",
            Band::Band122G => "122G",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Edges and default filter of one band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BandEdges {
    /// Lowest frequency in Hz
    pub lower_hz: u64,
    /// Highest frequency in Hz
    pub upper_hz: u64,
    /// Filter selected when nothing has been reported yet
    pub default_filter: FilterIndex,
}

impl BandEdges {
    const fn new(lower_hz: u64, upper_hz: u64, default_filter: u8) -> Self {
        Self {
            lower_hz,
            upper_hz,
            default_filter: FilterIndex(default_filter),
        }
    }

    /// Whether a frequency falls inside the band
    pub fn contains(&self, hz: u64) -> bool {
        (self.lower_hz..=self.upper_hz).contains(&hz)
    }
}

/// Per-band configuration, one entry per [`Band`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BandPlan {
    edges: Vec<BandEdges>,
}

impl BandPlan {
    /// IARU Region 2 band plan
    pub fn region2() -> Self {
        Self {
            edges: vec![
                BandEdges::new(1_800_000, 2_000_000, 2),
                BandEdges::new(3_500_000, 4_000_000, 2),
                BandEdges::new(5_330_500, 5_406_400, 2),
                BandEdges::new(7_000_000, 7_300_000, 2),
                BandEdges::new(10_100_000, 10_150_000, 2),
                BandEdges::new(14_000_000, 14_350_000, 2),
                BandEdges::new(18_068_000, 18_168_000, 2),
                BandEdges::new(21_000_000, 21_450_000, 2),
                BandEdges::new(24_890_000, 24_990_000, 2),
                BandEdges::new(28_000_000, 29_700_000, 2),
                BandEdges::new(50_000_000, 54_000_000, 2),
                BandEdges::new(144_000_000, 148_000_000, 1),
                BandEdges::new(222_000_000, 225_000_000, 1),
                BandEdges::new(420_000_000, 450_000_000, 1),
                BandEdges::new(902_000_000, 928_000_000, 1),
                BandEdges::new(1_240_000_000, 1_300_000_000, 1),
                BandEdges::new(2_300_000_000, 2_450_000_000, 1),
                BandEdges::new(3_300_000_000, 3_500_000_000, 1),
                BandEdges::new(5_650_000_000, 5_925_000_000, 1),
                BandEdges::new(10_000_000_000, 10_500_000_000, 1),
                BandEdges::new(24_000_000_000, 24_250_000_000, 1),
                BandEdges::new(47_000_000_000, 47_200_000_000, 1),
                BandEdges::new(76_000_000_000, 81_000_000_000, 1),
                BandEdges::new(122_250_000_000, 123_000_000_000, 1),
            ],
        }
    }

    /// Edges of a band
    ///
    /// Plans deserialized with fewer entries than [`Band::COUNT`] fall back to
    /// the Region 2 edges for the missing bands.
    pub fn edges(&self, band: Band) -> BandEdges {
        self.edges
            .get(band.index())
            .copied()
            .unwrap_or_else(|| Self::region2().edges[band.index()])
    }

    /// Band containing a frequency, if any
    pub fn band_for(&self, hz: u64) -> Option<Band> {
        Band::ALL
            .into_iter()
            .find(|&band| self.edges(band).contains(hz))
    }
}

impl Default for BandPlan {
    fn default() -> Self {
        Self::region2()
    }
}
