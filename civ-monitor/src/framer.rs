//! CI-V bus framing
//!
//! # Frame Format
//! ```text
//! FE FE [to] [from] [cmd] [subcmd] [data...] FD
//! ```
//!
//! - `FE FE`: Preamble (two bytes)
//! - `to`: Destination address (0xE0 for the controller, 0x00 for broadcast)
//! - `from`: Source address (the radio)
//! - `cmd` onward: the command body handed to the decoder
//! - `FD`: Terminator
//!
//! The framer only splits and addresses frames. Everything from the command
//! byte on is passed through untouched, together with the numeric value the
//! decoder expects from its transport.

use civ_decoder::bcd::{decode_bcd_be, decode_bcd_le};
use civ_decoder::{DecodeError, DecodedMessage};
use tracing::{debug, trace};

/// CI-V frame preamble byte
pub const PREAMBLE: u8 = 0xFE;
/// CI-V frame terminator byte
pub const TERMINATOR: u8 = 0xFD;
/// Default controller address
pub const CONTROLLER_ADDR: u8 = 0xE0;
/// Broadcast address
pub const BROADCAST_ADDR: u8 = 0x00;

/// Longest frame kept while waiting for a terminator
const MAX_FRAME_LEN: usize = 64;

/// One frame received from the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CivFrame {
    pub to_addr: u8,
    pub from_addr: u8,
    /// Command byte onward, terminator excluded
    pub body: Vec<u8>,
}

impl CivFrame {
    /// Whether the frame carries the operating frequency (`00`, `03`, `05`)
    pub fn is_frequency_report(&self) -> bool {
        matches!(self.body.first(), Some(0x00 | 0x03 | 0x05))
    }

    /// Numeric value of the frame's data
    ///
    /// Frequency reports carry little-endian Hz; everything else is read as
    /// big-endian digit pairs.
    pub fn numeric_value(&self) -> Result<u64, DecodeError> {
        let data = self.body.get(1..).unwrap_or(&[]);
        if self.is_frequency_report() {
            decode_bcd_le(data)
        } else {
            decode_bcd_be(data)
        }
    }

    /// Hand the body over to the decoder
    ///
    /// Frequency reports without a valid value are dropped. Other commands
    /// fall back to 0; their decoders read the body themselves.
    pub fn to_message(&self) -> Option<DecodedMessage> {
        match self.numeric_value() {
            Ok(value) => Some(DecodedMessage::new(&self.body, value)),
            Err(e) if self.is_frequency_report() => {
                debug!("dropping frequency frame {:02X?}: {}", self.body, e);
                None
            }
            Err(e) => {
                trace!("no numeric value for {:02X?}: {}", self.body, e);
                Some(DecodedMessage::new(&self.body, 0))
            }
        }
    }
}

/// Streaming CI-V framer
///
/// Accepts arbitrary chunks of bus bytes and yields the frames addressed to
/// the controller (or broadcast). Frames for other stations, including the
/// echo of the controller's own requests, are dropped.
#[derive(Debug)]
pub struct CivFramer {
    buffer: Vec<u8>,
    controller_addr: u8,
}

impl CivFramer {
    pub fn new(controller_addr: u8) -> Self {
        Self {
            buffer: Vec::with_capacity(MAX_FRAME_LEN),
            controller_addr,
        }
    }

    pub fn push_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);

        // Prevent buffer overflow
        if self.buffer.len() > MAX_FRAME_LEN * 4 {
            let start = self.buffer.len() - MAX_FRAME_LEN;
            self.buffer.drain(..start);
        }
    }

    /// Find the start of a frame (FE FE sequence)
    fn find_preamble(&self) -> Option<usize> {
        self.buffer
            .windows(2)
            .position(|w| w[0] == PREAMBLE && w[1] == PREAMBLE)
    }

    /// Next complete frame for the controller, if one is buffered
    pub fn next_frame(&mut self) -> Option<CivFrame> {
        loop {
            let preamble_pos = self.find_preamble()?;

            // Discard bytes before preamble
            if preamble_pos > 0 {
                self.buffer.drain(..preamble_pos);
            }

            // Skip repeated preamble bytes
            let start = self.buffer.iter().position(|&b| b != PREAMBLE)?;

            let term_pos = start + self.buffer[start..].iter().position(|&b| b == TERMINATOR)?;

            // A frame that lost its terminator runs into the next preamble
            if let Some(restart) = self.buffer[start..term_pos]
                .windows(2)
                .rposition(|w| w == [PREAMBLE, PREAMBLE])
            {
                let cut = start + restart;
                debug!("dropping unterminated CI-V frame: {:02X?}", &self.buffer[..cut]);
                self.buffer.drain(..cut);
                continue;
            }

            let frame: Vec<u8> = self.buffer.drain(..=term_pos).collect();
            let inner = &frame[start..frame.len() - 1];

            // to, from, cmd
            if inner.len() < 3 {
                debug!("dropping short CI-V frame: {:02X?}", frame);
                continue;
            }

            let (to_addr, from_addr) = (inner[0], inner[1]);
            if to_addr != self.controller_addr && to_addr != BROADCAST_ADDR {
                trace!("frame for 0x{to_addr:02X} from 0x{from_addr:02X} ignored");
                continue;
            }

            return Some(CivFrame {
                to_addr,
                from_addr,
                body: inner[2..].to_vec(),
            });
        }
    }
}

impl Default for CivFramer {
    fn default() -> Self {
        Self::new(CONTROLLER_ADDR)
    }
}
