//! Error types for CI-V report decoding

use thiserror::Error;

use crate::signature::CommandId;

/// Errors that abort the decoding of a single report
///
/// None of these are fatal to the caller's poll loop: the engine logs them and
/// reports message type 0 for the offending body.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A nibble above 9 in a BCD field
    #[error("invalid BCD digit in byte 0x{0:02X}")]
    InvalidBcd(u8),

    /// BCD field holds more digits than a u64 can represent
    #[error("BCD field of {len} bytes overflows u64")]
    Overflow { len: usize },

    /// Body ended before a field the decoder needs
    #[error("truncated field: need {needed} data bytes, got {available}")]
    TruncatedField { needed: usize, available: usize },

    /// No mode table entry for this (mode, data) pair
    #[error("mode 0x{raw_code:02X} with data flag {data_flag} not in mode table")]
    ModeNotFound { raw_code: u8, data_flag: u8 },

    /// Band-stack register outside 1..=3
    #[error("invalid band-stack register: {0}")]
    InvalidRegister(u8),

    /// Band-stack band code the configured radio model does not define
    #[error("unknown band-stack band code: 0x{0:02X}")]
    UnknownBandCode(u8),

    /// Field decoded fine but carries a value the command does not define
    #[error("unexpected value {value} for {command:?}")]
    UnexpectedValue { command: CommandId, value: u64 },

    /// Date or time fields do not form a valid civil timestamp
    #[error("invalid date/time: {0}")]
    InvalidTime(String),
}

/// Errors raised while building a signature table
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Signature with no bytes or more than five
    #[error("signature {id:?} has invalid length {length}")]
    InvalidLength { id: CommandId, length: usize },

    /// A later signature can never match because an earlier one is a prefix of it
    #[error("signature {shadowed:?} is unreachable behind {earlier:?}")]
    Shadowed {
        /// Entry that wins the scan
        earlier: CommandId,
        /// Entry that can never be selected
        shadowed: CommandId,
    },
}
