//! Decoded reports and the per-command field decoders
//!
//! Each matched command is decoded into one [`CivReport`] variant. Decoding
//! only reads the message (and records filter widths in the mode table); band
//! memory is written afterwards by [`BandMemoryStore::apply`].
//!
//! [`BandMemoryStore::apply`]: crate::memory::BandMemoryStore::apply

use std::fmt;

use crate::band::Band;
use crate::bcd::{decode_bcd_be, decode_bcd_byte, decode_bcd_le, validate_bcd};
use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::memory::{Agc, StackRegister, Vfo};
use crate::message::DecodedMessage;
use crate::mode::{FilterIndex, ModeIndex, ModeTable};
use crate::signature::CommandId;
use crate::time::{TimeFields, UtcOffset};

/// Category code returned to the caller for each processed body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageType {
    /// Nothing recognized, or nothing the caller needs to act on
    #[default]
    None,
    Frequency,
    Mode,
    BandStack,
    ExtendedMode,
    TxState,
    Position,
    UtcOffset,
    Preamp,
    Attenuator,
    Agc,
    DuplexOffset,
    RitXitOffset,
    RitOnOff,
    XitOnOff,
}

impl MessageType {
    /// Numeric code 0..=14
    pub fn code(self) -> u8 {
        match self {
            MessageType::None => 0,
            MessageType::Frequency => 1,
            MessageType::Mode => 2,
            MessageType::BandStack => 3,
            MessageType::ExtendedMode => 4,
            MessageType::TxState => 5,
            MessageType::Position => 6,
            MessageType::UtcOffset => 7,
            MessageType::Preamp => 8,
            MessageType::Attenuator => 9,
            MessageType::Agc => 10,
            MessageType::DuplexOffset => 11,
            MessageType::RitXitOffset => 12,
            MessageType::RitOnOff => 13,
            MessageType::XitOnOff => 14,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// GPS fix reported by the radio
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GpsPosition {
    /// Decimal degrees, north positive
    pub latitude_deg: f64,
    /// Decimal degrees, east positive
    pub longitude_deg: f64,
    pub altitude_m: f64,
    pub course_deg: u16,
    pub speed_kmh: f64,
}

/// Contents of one band-stack register report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BandStackEntry {
    pub band: Band,
    pub register: StackRegister,
    pub frequency_hz: u64,
    /// `None` when the (mode, data) pair is not in the mode table
    pub mode: Option<ModeIndex>,
    pub filter: FilterIndex,
    pub data_flag: u8,
}

/// One decoded report
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CivReport {
    Frequency {
        hz: u64,
    },
    Mode {
        mode: ModeIndex,
        filter: FilterIndex,
        data_flag: u8,
    },
    BandStack(BandStackEntry),
    ExtendedMode {
        vfo: Vfo,
        mode: ModeIndex,
        filter: FilterIndex,
        data_flag: u8,
    },
    Transmit {
        on: bool,
    },
    Position {
        position: GpsPosition,
        time: TimeFields,
    },
    UtcOffset(UtcOffset),
    Preamp {
        on: bool,
    },
    Attenuator {
        on: bool,
    },
    Agc(Agc),
    Split {
        on: bool,
    },
    DuplexOffset {
        offset_hz: i64,
    },
    RitXitOffset {
        offset_hz: i64,
    },
    RitOnOff {
        on: bool,
    },
    XitOnOff {
        on: bool,
    },
}

impl CivReport {
    /// Category code of this report
    ///
    /// Split reports are stored but have no category of their own.
    pub fn message_type(&self) -> MessageType {
        match self {
            CivReport::Frequency { .. } => MessageType::Frequency,
            CivReport::Mode { .. } => MessageType::Mode,
            CivReport::BandStack(_) => MessageType::BandStack,
            CivReport::ExtendedMode { .. } => MessageType::ExtendedMode,
            CivReport::Transmit { .. } => MessageType::TxState,
            CivReport::Position { .. } => MessageType::Position,
            CivReport::UtcOffset(_) => MessageType::UtcOffset,
            CivReport::Preamp { .. } => MessageType::Preamp,
            CivReport::Attenuator { .. } => MessageType::Attenuator,
            CivReport::Agc(_) => MessageType::Agc,
            CivReport::Split { .. } => MessageType::None,
            CivReport::DuplexOffset { .. } => MessageType::DuplexOffset,
            CivReport::RitXitOffset { .. } => MessageType::RitXitOffset,
            CivReport::RitOnOff { .. } => MessageType::RitOnOff,
            CivReport::XitOnOff { .. } => MessageType::XitOnOff,
        }
    }
}

/// Whether a command reports the operating frequency
pub fn is_frequency_command(command: CommandId) -> bool {
    matches!(
        command,
        CommandId::FrequencyBroadcast | CommandId::FrequencySend | CommandId::FrequencyRead
    )
}

/// Decode the fields of a matched command
///
/// Returns `Ok(None)` for commands the decoder recognizes but does not act on
/// (gain levels, meter readings, power, ID, clock setting). `primary_data_flag`
/// is the DATA flag of the current band's selected VFO, needed by the plain
/// mode reports which do not carry one.
pub fn decode(
    command: CommandId,
    message: &DecodedMessage,
    modes: &mut ModeTable,
    config: &DecoderConfig,
    primary_data_flag: u8,
) -> Result<Option<CivReport>, DecodeError> {
    use CommandId::*;

    let report = match command {
        FrequencyBroadcast | FrequencySend | FrequencyRead => {
            // A garbled body must not be committed as whatever the transport computed
            validate_bcd(message.datafield(1))?;
            CivReport::Frequency {
                hz: message.numeric_value().saturating_mul(config.frequency_scale),
            }
        }

        ModeBroadcast | ModeRead => decode_mode(message, modes, primary_data_flag)?,

        BandStack => CivReport::BandStack(decode_band_stack(message, modes, config)?),

        VfoMode | SelectedVfoMode | UnselectedVfoMode | UsbData0Filter2 | UsbData1Filter2
        | LsbData0Filter2 | LsbData1Filter2 | FmData1Filter1 => {
            decode_extended_mode(command, message, modes)?
        }

        Transmit => CivReport::Transmit {
            on: match status_value(message, 2)? {
                0 => false,
                1 => true,
                value => return Err(DecodeError::UnexpectedValue { command, value }),
            },
        },

        MyPositionRead => decode_position(message)?,

        UtcOffset905 | UtcOffset705 => CivReport::UtcOffset(UtcOffset::decode(message.datafield(4))?),

        PreampRead | PreampOff | PreampOn | PreampOn2 => CivReport::Preamp {
            on: match status_value(message, 2)? {
                0 => false,
                1 | 2 => true,
                value => return Err(DecodeError::UnexpectedValue { command, value }),
            },
        },

        AttenuatorRead | AttenuatorOff | AttenuatorOn => CivReport::Attenuator {
            on: status_value(message, 1)? != 0,
        },

        AgcRead | AgcFast | AgcMid | AgcSlow => CivReport::Agc(match status_value(message, 2)? {
            1 => Agc::Fast,
            2 => Agc::Mid,
            3 => Agc::Slow,
            value => return Err(DecodeError::UnexpectedValue { command, value }),
        }),

        SplitRead | SplitOff | SplitOn => CivReport::Split {
            on: status_value(message, 1)? != 0,
        },

        DuplexRead | DuplexSend => {
            let data = require(message.datafield(1), 3)?;
            let magnitude = decode_bcd_le(&data[..3])? as i64 * 100;
            CivReport::DuplexOffset {
                offset_hz: signed(magnitude, data.get(3).copied()),
            }
        }

        RitXitOffset => {
            let data = require(message.datafield(2), 2)?;
            let magnitude = decode_bcd_le(&data[..2])? as i64;
            CivReport::RitXitOffset {
                offset_hz: signed(magnitude, data.get(2).copied()),
            }
        }

        RitOnOff => CivReport::RitOnOff {
            on: status_value(message, 2)? != 0,
        },

        XitOnOff => CivReport::XitOnOff {
            on: status_value(message, 2)? != 0,
        },

        SelectedVfoFrequency | UnselectedVfoFrequency | ModeSetAtv | ModeSend | ModeUsbFilter1
        | ModeUsb | RfGain | AfGain | RfPower | SMeterLevel | CwMessage | TransceiverPower
        | TransceiverId | Date | Time | RadioOff | RadioOn | MyPositionData => return Ok(None),
    };

    Ok(Some(report))
}

/// Check that a field slice holds at least `needed` bytes
fn require(data: &[u8], needed: usize) -> Result<&[u8], DecodeError> {
    if data.len() < needed {
        return Err(DecodeError::TruncatedField {
            needed,
            available: data.len(),
        });
    }
    Ok(data)
}

fn signed(magnitude: i64, sign: Option<u8>) -> i64 {
    match sign {
        Some(s) if s != 0 => -magnitude,
        _ => magnitude,
    }
}

/// Single status byte after a command header of `header_len` bytes
///
/// Bodies that end at the header carry their value in the transport's numeric
/// value instead.
fn status_value(message: &DecodedMessage, header_len: usize) -> Result<u64, DecodeError> {
    match message.datafield(header_len).first() {
        Some(&byte) => Ok(u64::from(decode_bcd_byte(byte)?)),
        None => Ok(message.numeric_value()),
    }
}

/// `[cmd, mode, filter]`; the filter byte is optional
fn decode_mode(
    message: &DecodedMessage,
    modes: &mut ModeTable,
    data_flag: u8,
) -> Result<CivReport, DecodeError> {
    let data = require(message.datafield(1), 1)?;
    let raw_code = data[0];
    let mode = match data.get(1) {
        Some(&filter) => modes.resolve_with_filter(raw_code, data_flag, FilterIndex(filter))?,
        None => modes.resolve(raw_code, data_flag)?,
    };
    let filter = modes
        .get(mode)
        .map(|entry| entry.filter_width)
        .unwrap_or(FilterIndex(1));

    Ok(CivReport::Mode {
        mode,
        filter,
        data_flag,
    })
}

/// `[26, vfo, mode, data, filter]`
fn decode_extended_mode(
    command: CommandId,
    message: &DecodedMessage,
    modes: &mut ModeTable,
) -> Result<CivReport, DecodeError> {
    let data = require(message.datafield(1), 4)?;
    let vfo = match data[0] {
        0x00 => Vfo::Selected,
        0x01 => Vfo::Unselected,
        other => {
            return Err(DecodeError::UnexpectedValue {
                command,
                value: u64::from(other),
            })
        }
    };
    // DATA1..DATA3 all count as DATA on
    let data_flag = u8::from(data[2] != 0);
    let filter = FilterIndex(data[3]);
    let mode = modes.resolve_with_filter(data[1], data_flag, filter)?;

    Ok(CivReport::ExtendedMode {
        vfo,
        mode,
        filter,
        data_flag,
    })
}

/// `[1A, 01, band, register, freq(5|6), mode, filter, data]`
fn decode_band_stack(
    message: &DecodedMessage,
    modes: &mut ModeTable,
    config: &DecoderConfig,
) -> Result<BandStackEntry, DecodeError> {
    let freq_len = config.model.band_stack_frequency_len();
    let data = require(message.datafield(2), 2 + freq_len + 2)?;

    let band = config.model.band_for_stack_code(data[0])?;
    let register = StackRegister::new(decode_bcd_byte(data[1])?)?;
    let frequency_hz = decode_bcd_le(&data[2..2 + freq_len])?;

    let raw_mode = data[2 + freq_len];
    let filter = FilterIndex(data[3 + freq_len]);
    let data_flag = data
        .get(4 + freq_len)
        .map_or(0, |&flag| u8::from(flag != 0));

    let mode = modes
        .resolve_with_filter(raw_mode, data_flag, filter)
        .inspect_err(|e| tracing::warn!(%band, error = %e, "band-stack mode left unchanged"))
        .ok();

    Ok(BandStackEntry {
        band,
        register,
        frequency_hz,
        mode,
        filter,
        data_flag,
    })
}

/// `[23, 00, lat(5), lon(6), alt(4), course(2), speed(3), year(2), month, day, h, m, s]`
fn decode_position(message: &DecodedMessage) -> Result<CivReport, DecodeError> {
    let p = require(message.payload(), 29)?;

    // dd, mm.mmmm, 0 = south / 1 = north
    let lat_minutes = decode_bcd_be(&p[3..6])? as f64 / 10_000.0;
    let latitude = f64::from(decode_bcd_byte(p[2])?) + lat_minutes / 60.0;

    // ddd (two bytes), mm.mmmm, 0 = west / 1 = east
    let lon_minutes = decode_bcd_be(&p[9..12])? as f64 / 10_000.0;
    let longitude = decode_bcd_be(&p[7..9])? as f64 + lon_minutes / 60.0;

    let altitude = decode_bcd_be(&p[13..16])? as f64 / 10.0;

    let position = GpsPosition {
        latitude_deg: if p[6] == 0 { -latitude } else { latitude },
        longitude_deg: if p[12] == 0 { -longitude } else { longitude },
        altitude_m: if p[16] == 0 { altitude } else { -altitude },
        course_deg: decode_bcd_be(&p[17..19])? as u16,
        speed_kmh: decode_bcd_be(&p[19..22])? as f64 / 10.0,
    };
    let time = TimeFields::decode(&p[22..29])?;

    Ok(CivReport::Position { position, time })
}
