//! Command bodies handed over by the transport layer

use crate::bcd::decode_bcd_be;
use crate::error::DecodeError;

/// One received command body
///
/// The transport strips preamble, addresses and terminator and hands over the
/// remaining body prefixed with its length, together with a numeric value it
/// has already computed for simple single-field commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
    /// `[length, payload...]`
    raw_body: Vec<u8>,
    numeric_value: u64,
}

impl DecodedMessage {
    /// Build a message from a payload (command byte onward) and its numeric value
    ///
    /// Payloads longer than 255 bytes are cut to fit the length byte.
    pub fn new(payload: &[u8], numeric_value: u64) -> Self {
        let payload = &payload[..payload.len().min(u8::MAX as usize)];
        let mut raw_body = Vec::with_capacity(payload.len() + 1);
        raw_body.push(payload.len() as u8);
        raw_body.extend_from_slice(payload);
        Self {
            raw_body,
            numeric_value,
        }
    }

    /// Build a message from a length-prefixed body
    ///
    /// Bytes beyond the declared length are ignored; a length larger than the
    /// bytes present is clamped.
    pub fn from_raw_body(raw_body: &[u8], numeric_value: u64) -> Self {
        match raw_body.split_first() {
            Some((&len, rest)) => Self::new(&rest[..rest.len().min(len as usize)], numeric_value),
            None => Self::new(&[], numeric_value),
        }
    }

    /// Build a message whose numeric value is the big-endian BCD of every
    /// byte after the command byte
    ///
    /// This is the transport's convention for level and status replies
    /// (`[0x14, 0x01, 0x01, 0x28]` carries 10128). Frequency replies use
    /// little-endian digits; transports supply those through [`Self::new`].
    pub fn from_payload(payload: &[u8]) -> Result<Self, DecodeError> {
        let value = decode_bcd_be(payload.get(1..).unwrap_or(&[]))?;
        Ok(Self::new(payload, value))
    }

    /// Declared body length
    pub fn body_length(&self) -> usize {
        self.raw_body[0] as usize
    }

    /// Length-prefixed body, index 0 holds the length
    pub fn raw_body(&self) -> &[u8] {
        &self.raw_body
    }

    /// Body without the length byte
    pub fn payload(&self) -> &[u8] {
        &self.raw_body[1..]
    }

    /// Bytes after a command header of `header_len` bytes
    pub fn datafield(&self, header_len: usize) -> &[u8] {
        self.payload().get(header_len..).unwrap_or(&[])
    }

    /// Numeric value computed by the transport
    pub fn numeric_value(&self) -> u64 {
        self.numeric_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_prefixes_length() {
        let msg = DecodedMessage::new(&[0x11, 0x10], 10);
        assert_eq!(msg.raw_body(), &[0x02, 0x11, 0x10]);
        assert_eq!(msg.body_length(), 2);
        assert_eq!(msg.payload(), &[0x11, 0x10]);
        assert_eq!(msg.numeric_value(), 10);
    }

    #[test]
    fn test_from_raw_body_respects_declared_length() {
        let msg = DecodedMessage::from_raw_body(&[0x02, 0x11, 0x10, 0xFF], 0);
        assert_eq!(msg.payload(), &[0x11, 0x10]);

        let msg = DecodedMessage::from_raw_body(&[0x05, 0x11], 0);
        assert_eq!(msg.body_length(), 1);

        let msg = DecodedMessage::from_raw_body(&[], 0);
        assert_eq!(msg.body_length(), 0);
        assert!(msg.payload().is_empty());
    }

    #[test]
    fn test_from_payload_digit_pairs() {
        let msg = DecodedMessage::from_payload(&[0x00, 0x46, 0x92]).unwrap();
        assert_eq!(msg.raw_body(), &[0x03, 0x00, 0x46, 0x92]);
        assert_eq!(msg.numeric_value(), 4692);
    }

    #[test]
    fn test_from_payload_rejects_bad_digit() {
        assert_eq!(
            DecodedMessage::from_payload(&[0x11, 0x1F]),
            Err(DecodeError::InvalidBcd(0x1F))
        );
    }

    #[test]
    fn test_datafield() {
        let msg = DecodedMessage::new(&[0x1A, 0x05, 0x01, 0x70, 0x07, 0x00, 0x01], 0);
        assert_eq!(msg.datafield(4), &[0x07, 0x00, 0x01]);
        assert!(msg.datafield(9).is_empty());
    }
}
