//! Radio clock decoding
//!
//! The radio reports its clock in UTC as BCD fields and, separately, the
//! offset to local time. [`TimeFields`] keeps both so the caller can present
//! either one according to [`TimeDisplay`].

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::bcd::{decode_bcd_be, decode_bcd_byte};
use crate::config::TimeDisplay;
use crate::error::DecodeError;

/// Offset from UTC to the radio's local time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UtcOffset {
    pub hours: u8,
    pub minutes: u8,
    /// West of Greenwich
    pub negative: bool,
}

impl UtcOffset {
    /// Decode `[hours, minutes, sign]`; a missing sign byte means positive
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < 2 {
            return Err(DecodeError::TruncatedField {
                needed: 2,
                available: data.len(),
            });
        }
        Ok(Self {
            hours: decode_bcd_byte(data[0])?,
            minutes: decode_bcd_byte(data[1])?,
            negative: data.get(2).is_some_and(|&sign| sign != 0),
        })
    }

    /// Signed offset as a duration
    pub fn as_delta(&self) -> TimeDelta {
        let delta =
            TimeDelta::hours(i64::from(self.hours)) + TimeDelta::minutes(i64::from(self.minutes));
        if self.negative {
            -delta
        } else {
            delta
        }
    }
}

/// Decode a BCD year
///
/// Two bytes carry all four digits (`20 24` is 2024). A single byte holds the
/// last two digits and is read as 20YY.
pub fn decode_year(bytes: &[u8]) -> Result<i32, DecodeError> {
    match bytes {
        [] => Err(DecodeError::TruncatedField {
            needed: 1,
            available: 0,
        }),
        [yy] => Ok(2000 + i32::from(decode_bcd_byte(*yy)?)),
        _ => Ok(decode_bcd_be(&bytes[..2])? as i32),
    }
}

/// Date and time as reported by the radio, plus the offset last reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeFields {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub offset: UtcOffset,
}

impl TimeFields {
    /// Decode `[year(2), month, day, hour, minute, second]`
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < 7 {
            return Err(DecodeError::TruncatedField {
                needed: 7,
                available: data.len(),
            });
        }
        Ok(Self {
            year: decode_year(&data[0..2])?,
            month: decode_bcd_byte(data[2])?,
            day: decode_bcd_byte(data[3])?,
            hour: decode_bcd_byte(data[4])?,
            minute: decode_bcd_byte(data[5])?,
            second: decode_bcd_byte(data[6])?,
            offset: UtcOffset::default(),
        })
    }

    /// Same fields with a different UTC offset
    pub fn with_offset(self, offset: UtcOffset) -> Self {
        Self { offset, ..self }
    }

    /// Radio clock in UTC
    pub fn utc(&self) -> Result<NaiveDateTime, DecodeError> {
        NaiveDate::from_ymd_opt(self.year, u32::from(self.month), u32::from(self.day))
            .and_then(|date| {
                date.and_hms_opt(
                    u32::from(self.hour),
                    u32::from(self.minute),
                    u32::from(self.second),
                )
            })
            .ok_or_else(|| {
                DecodeError::InvalidTime(format!(
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    self.year, self.month, self.day, self.hour, self.minute, self.second
                ))
            })
    }

    /// Radio clock shifted by the UTC offset
    ///
    /// Day, month and year roll over when the offset crosses midnight.
    pub fn local(&self) -> Result<NaiveDateTime, DecodeError> {
        let utc = self.utc()?;
        utc.checked_add_signed(self.offset.as_delta())
            .ok_or_else(|| DecodeError::InvalidTime(format!("{utc} shifted out of range")))
    }

    /// Timestamp in the configured presentation
    pub fn display(&self, mode: TimeDisplay) -> Result<NaiveDateTime, DecodeError> {
        match mode {
            TimeDisplay::Utc => self.utc(),
            TimeDisplay::Local => self.local(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> TimeFields {
        // 2024-07-20 23:32:45
        TimeFields::decode(&[0x20, 0x24, 0x07, 0x20, 0x23, 0x32, 0x45]).unwrap()
    }

    #[test]
    fn test_decode_fields() {
        let t = fields();
        assert_eq!(t.year, 2024);
        assert_eq!((t.month, t.day), (7, 20));
        assert_eq!((t.hour, t.minute, t.second), (23, 32, 45));
    }

    #[test]
    fn test_decode_year() {
        assert_eq!(decode_year(&[0x20, 0x24]), Ok(2024));
        assert_eq!(decode_year(&[0x24]), Ok(2024));
        assert!(decode_year(&[]).is_err());
    }

    #[test]
    fn test_utc_offset_decode() {
        let off = UtcOffset::decode(&[0x07, 0x00, 0x01]).unwrap();
        assert_eq!(off.hours, 7);
        assert!(off.negative);
        assert_eq!(off.as_delta(), TimeDelta::hours(-7));

        let off = UtcOffset::decode(&[0x05, 0x30]).unwrap();
        assert!(!off.negative);
        assert_eq!(off.as_delta(), TimeDelta::minutes(330));
    }

    #[test]
    fn test_utc_offset_truncated() {
        assert_eq!(
            UtcOffset::decode(&[0x07]),
            Err(DecodeError::TruncatedField {
                needed: 2,
                available: 1
            })
        );
    }

    #[test]
    fn test_local_rolls_over_midnight() {
        let t = fields().with_offset(UtcOffset {
            hours: 2,
            minutes: 0,
            negative: false,
        });
        let local = t.display(TimeDisplay::Local).unwrap();
        assert_eq!(local.to_string(), "2024-07-21 01:32:45");

        let utc = t.display(TimeDisplay::Utc).unwrap();
        assert_eq!(utc.to_string(), "2024-07-20 23:32:45");
    }

    #[test]
    fn test_invalid_date() {
        let mut t = fields();
        t.month = 13;
        assert!(matches!(t.utc(), Err(DecodeError::InvalidTime(_))));
    }
}
