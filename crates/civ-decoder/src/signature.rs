//! Command signature table and matcher
//!
//! A signature is the fixed leading part of a CI-V command body: the command
//! byte, optionally followed by sub-command and selector bytes. Incoming bodies
//! are matched by scanning the table in order; the first signature whose bytes
//! all agree with the start of the body wins.
//!
//! Because the scan stops at the first hit, a short signature placed before a
//! longer one that starts with the same bytes hides the longer one for good.
//! [`SignatureTable::new`] rejects such orderings.

use crate::error::TableError;
use crate::message::DecodedMessage;

/// Longest signature the table accepts
pub const MAX_SIGNATURE_LEN: usize = 5;

/// Logical CI-V commands known to the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandId {
    /// 0x00: operating frequency sent to all
    FrequencyBroadcast,
    /// 0x05: operating frequency sent to one
    FrequencySend,
    /// 0x03: read operating frequency
    FrequencyRead,
    /// 0x26: mode, data and filter of a VFO
    VfoMode,
    /// 0x26 0x00: selected VFO mode/data/filter
    SelectedVfoMode,
    /// 0x26 0x01: unselected VFO mode/data/filter
    UnselectedVfoMode,
    /// 0x25 0x00: selected VFO frequency
    SelectedVfoFrequency,
    /// 0x25 0x01: unselected VFO frequency
    UnselectedVfoFrequency,
    /// 0x04: read modulation mode
    ModeRead,
    /// 0x06 0x23 0x02: set ATV, FIL2
    ModeSetAtv,
    /// 0x01: modulation mode sent to all
    ModeBroadcast,
    /// 0x06: modulation mode sent to one
    ModeSend,
    /// 0x06 0x01 0x01: USB, FIL1
    ModeUsbFilter1,
    /// 0x06 0x01: USB
    ModeUsb,
    /// 0x26 0x00 0x01 0x00 0x02: USB, DATA off, FIL2
    UsbData0Filter2,
    /// 0x26 0x00 0x01 0x01 0x02: USB, DATA on, FIL2
    UsbData1Filter2,
    /// 0x26 0x00 0x00 0x00 0x02: LSB, DATA off, FIL2
    LsbData0Filter2,
    /// 0x26 0x00 0x00 0x01 0x02: LSB, DATA on, FIL2
    LsbData1Filter2,
    /// 0x26 0x00 0x05 0x01 0x01: FM, DATA on, FIL1
    FmData1Filter1,
    /// 0x11: attenuator state
    AttenuatorRead,
    /// 0x11 0x00: attenuator off
    AttenuatorOff,
    /// 0x11 0x10: attenuator 10 dB
    AttenuatorOn,
    /// 0x0F: split state
    SplitRead,
    /// 0x0F 0x00: split off
    SplitOff,
    /// 0x0F 0x01: split on
    SplitOn,
    /// 0x14 0x02: RF gain
    RfGain,
    /// 0x14 0x01: AF gain
    AfGain,
    /// 0x14 0x0A: RF power
    RfPower,
    /// 0x15 0x02: S-meter level
    SMeterLevel,
    /// 0x16 0x02: preamp state
    PreampRead,
    /// 0x16 0x02 0x00: preamp off
    PreampOff,
    /// 0x16 0x02 0x01: preamp 1 on
    PreampOn,
    /// 0x16 0x02 0x02: preamp 2 on
    PreampOn2,
    /// 0x16 0x12: AGC state
    AgcRead,
    /// 0x16 0x12 0x01
    AgcFast,
    /// 0x16 0x12 0x02
    AgcMid,
    /// 0x16 0x12 0x03
    AgcSlow,
    /// 0x17: CW message
    CwMessage,
    /// 0x1A 0x01: band-stack register contents
    BandStack,
    /// 0x23 0x00: read my GPS position
    MyPositionRead,
    /// 0x23: GPS position and time
    MyPositionData,
    /// 0x18: transceiver power
    TransceiverPower,
    /// 0x19 0x00: transceiver ID
    TransceiverId,
    /// 0x1C 0x00: TX state
    Transmit,
    /// 0x1A 0x05 0x00 0x94: date
    Date,
    /// 0x1A 0x05 0x00 0x95: time
    Time,
    /// 0x1A 0x05 0x01 0x81: UTC offset (IC-905)
    UtcOffset905,
    /// 0x1A 0x05 0x01 0x70: UTC offset (IC-705)
    UtcOffset705,
    /// 0x0C: read duplex offset
    DuplexRead,
    /// 0x0D: send duplex offset
    DuplexSend,
    /// 0x21 0x00: RIT/XIT offset
    RitXitOffset,
    /// 0x21 0x01: RIT on/off
    RitOnOff,
    /// 0x21 0x02: XIT on/off
    XitOnOff,
    /// 0x18 0x00: power off
    RadioOff,
    /// 0x18 0x01: power on
    RadioOn,
}

/// Fixed leading bytes of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSignature {
    /// Command this signature identifies
    pub id: CommandId,
    bytes: [u8; MAX_SIGNATURE_LEN],
    length: usize,
}

impl CommandSignature {
    /// Create a signature from its bytes
    pub fn new(id: CommandId, bytes: &[u8]) -> Result<Self, TableError> {
        if bytes.is_empty() || bytes.len() > MAX_SIGNATURE_LEN {
            return Err(TableError::InvalidLength {
                id,
                length: bytes.len(),
            });
        }
        let mut buf = [0u8; MAX_SIGNATURE_LEN];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            id,
            bytes: buf,
            length: bytes.len(),
        })
    }

    /// Number of meaningful bytes
    pub fn len(&self) -> usize {
        self.length
    }

    /// Always false; signatures carry at least one byte
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The meaningful bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..self.length]
    }

    /// Whether a payload (body without its length byte) starts with this signature
    pub fn matches(&self, payload: &[u8]) -> bool {
        payload.starts_with(self.bytes())
    }

    /// Whether this signature's bytes start `other`'s bytes (or equal them)
    fn is_prefix_of(&self, other: &CommandSignature) -> bool {
        other.bytes().starts_with(self.bytes())
    }
}

/// Signatures of the standard table, in priority order
const STANDARD_CATALOG: &[(CommandId, &[u8])] = &[
    (CommandId::FrequencyBroadcast, &[0x00]),
    (CommandId::FrequencySend, &[0x05]),
    (CommandId::FrequencyRead, &[0x03]),
    (CommandId::UsbData0Filter2, &[0x26, 0x00, 0x01, 0x00, 0x02]),
    (CommandId::UsbData1Filter2, &[0x26, 0x00, 0x01, 0x01, 0x02]),
    (CommandId::LsbData0Filter2, &[0x26, 0x00, 0x00, 0x00, 0x02]),
    (CommandId::LsbData1Filter2, &[0x26, 0x00, 0x00, 0x01, 0x02]),
    (CommandId::FmData1Filter1, &[0x26, 0x00, 0x05, 0x01, 0x01]),
    (CommandId::SelectedVfoMode, &[0x26, 0x00]),
    (CommandId::UnselectedVfoMode, &[0x26, 0x01]),
    (CommandId::VfoMode, &[0x26]),
    (CommandId::SelectedVfoFrequency, &[0x25, 0x00]),
    (CommandId::UnselectedVfoFrequency, &[0x25, 0x01]),
    (CommandId::ModeRead, &[0x04]),
    (CommandId::ModeBroadcast, &[0x01]),
    (CommandId::ModeSetAtv, &[0x06, 0x23, 0x02]),
    (CommandId::ModeUsbFilter1, &[0x06, 0x01, 0x01]),
    (CommandId::ModeUsb, &[0x06, 0x01]),
    (CommandId::ModeSend, &[0x06]),
    (CommandId::AttenuatorOff, &[0x11, 0x00]),
    (CommandId::AttenuatorOn, &[0x11, 0x10]),
    (CommandId::AttenuatorRead, &[0x11]),
    (CommandId::SplitOff, &[0x0F, 0x00]),
    (CommandId::SplitOn, &[0x0F, 0x01]),
    (CommandId::SplitRead, &[0x0F]),
    (CommandId::RfGain, &[0x14, 0x02]),
    (CommandId::AfGain, &[0x14, 0x01]),
    (CommandId::RfPower, &[0x14, 0x0A]),
    (CommandId::SMeterLevel, &[0x15, 0x02]),
    (CommandId::PreampOff, &[0x16, 0x02, 0x00]),
    (CommandId::PreampOn, &[0x16, 0x02, 0x01]),
    (CommandId::PreampOn2, &[0x16, 0x02, 0x02]),
    (CommandId::PreampRead, &[0x16, 0x02]),
    (CommandId::AgcFast, &[0x16, 0x12, 0x01]),
    (CommandId::AgcMid, &[0x16, 0x12, 0x02]),
    (CommandId::AgcSlow, &[0x16, 0x12, 0x03]),
    (CommandId::AgcRead, &[0x16, 0x12]),
    (CommandId::CwMessage, &[0x17]),
    (CommandId::BandStack, &[0x1A, 0x01]),
    (CommandId::MyPositionRead, &[0x23, 0x00]),
    (CommandId::MyPositionData, &[0x23]),
    (CommandId::RadioOff, &[0x18, 0x00]),
    (CommandId::RadioOn, &[0x18, 0x01]),
    (CommandId::TransceiverPower, &[0x18]),
    (CommandId::TransceiverId, &[0x19, 0x00]),
    (CommandId::Transmit, &[0x1C, 0x00]),
    (CommandId::Date, &[0x1A, 0x05, 0x00, 0x94]),
    (CommandId::Time, &[0x1A, 0x05, 0x00, 0x95]),
    (CommandId::UtcOffset905, &[0x1A, 0x05, 0x01, 0x81]),
    (CommandId::UtcOffset705, &[0x1A, 0x05, 0x01, 0x70]),
    (CommandId::DuplexRead, &[0x0C]),
    (CommandId::DuplexSend, &[0x0D]),
    (CommandId::RitXitOffset, &[0x21, 0x00]),
    (CommandId::RitOnOff, &[0x21, 0x01]),
    (CommandId::XitOnOff, &[0x21, 0x02]),
];

/// Ordered signature catalog
///
/// Table order is match priority.
#[derive(Debug, Clone)]
pub struct SignatureTable {
    signatures: Vec<CommandSignature>,
}

impl SignatureTable {
    /// Build a table, rejecting entries that could never be matched
    ///
    /// An entry is unreachable when an earlier entry's bytes are a prefix of
    /// (or equal to) its own. Longer, more specific signatures must therefore
    /// come before the shorter ones they extend.
    pub fn new(signatures: Vec<CommandSignature>) -> Result<Self, TableError> {
        for (i, later) in signatures.iter().enumerate() {
            if let Some(earlier) = signatures[..i].iter().find(|e| e.is_prefix_of(later)) {
                return Err(TableError::Shadowed {
                    earlier: earlier.id,
                    shadowed: later.id,
                });
            }
        }
        Ok(Self { signatures })
    }

    /// Build a table without the reachability check
    ///
    /// Priority is still strict table order, so shadowed entries stay dead.
    pub fn new_unchecked(signatures: Vec<CommandSignature>) -> Self {
        Self { signatures }
    }

    /// The standard Icom catalog, most specific signatures first in each family
    pub fn standard() -> Self {
        match Self::try_standard() {
            Ok(table) => table,
            Err(e) => {
                debug_assert!(false, "standard CI-V catalog rejected: {e}");
                tracing::error!(error = %e, "standard CI-V catalog rejected, using it unchecked");
                Self::new_unchecked(
                    STANDARD_CATALOG
                        .iter()
                        .filter_map(|&(id, bytes)| CommandSignature::new(id, bytes).ok())
                        .collect(),
                )
            }
        }
    }

    /// The standard catalog built through the reachability check
    pub fn try_standard() -> Result<Self, TableError> {
        let signatures = STANDARD_CATALOG
            .iter()
            .map(|&(id, bytes)| CommandSignature::new(id, bytes))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(signatures)
    }

    /// Find the first signature matching a payload
    pub fn find(&self, payload: &[u8]) -> Option<&CommandSignature> {
        self.signatures.iter().find(|sig| sig.matches(payload))
    }

    /// Match a decoded body, returning the winning command
    pub fn match_message(&self, message: &DecodedMessage) -> Option<CommandId> {
        self.find(message.payload()).map(|sig| sig.id)
    }

    /// Look up the signature registered for a command
    pub fn signature(&self, id: CommandId) -> Option<&CommandSignature> {
        self.signatures.iter().find(|sig| sig.id == id)
    }

    /// Number of signatures
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Iterate signatures in priority order
    pub fn iter(&self) -> impl Iterator<Item = &CommandSignature> {
        self.signatures.iter()
    }
}

impl Default for SignatureTable {
    fn default() -> Self {
        Self::standard()
    }
}
