//! CI-V Report Decoder
//!
//! This crate interprets Icom CI-V command bodies reported by a transceiver
//! and keeps per-band state for an accessory controller:
//!
//! - **Signature matching**: an ordered table of command shapes (1 to 5 bytes)
//!   identifies which command a body carries
//! - **BCD decoding**: frequencies, offsets, levels and timestamps
//! - **Extended modes**: (mode, DATA flag) pairs resolved to one index
//! - **Band memory**: three band-stack registers plus receiver settings per band
//!
//! # Architecture
//!
//! The transport layer (framing, addressing, retries) is not part of this
//! crate. It hands over a [`DecodedMessage`]: the command body prefixed with its
//! length, plus a numeric value already computed from the body.
//!
//! [`CivEngine::process`] then:
//! 1. Finds the first matching [`CommandSignature`] in table order
//! 2. Decodes the command's fields into a [`CivReport`]
//! 3. Commits the report to the caller's [`BandMemoryStore`]
//! 4. Returns a [`MessageType`] code telling the caller what changed
//!
//! Decode failures never propagate: they are logged through `tracing` and
//! reported as [`MessageType::None`].
//!
//! # Example
//!
//! ```rust
//! use civ_decoder::{Band, BandMemoryStore, CivEngine, DecodedMessage, MessageType, NoopNotifier};
//!
//! let mut engine = CivEngine::default();
//! let mut store = BandMemoryStore::default();
//!
//! // FE FE E0 A4 11 10 FD with the frame stripped: attenuator on
//! let msg = DecodedMessage::from_payload(&[0x11, 0x10]).unwrap();
//! let dispatch = engine.process(&msg, &mut store, Band::Band144, &mut NoopNotifier);
//!
//! assert_eq!(dispatch.message_type, MessageType::Attenuator);
//! assert!(store.record(Band::Band144).attenuator());
//! ```

pub mod band;
pub mod bcd;
pub mod config;
pub mod engine;
pub mod error;
pub mod memory;
pub mod message;
pub mod mode;
pub mod report;
pub mod signature;
pub mod time;

pub use band::{Band, BandEdges, BandPlan};
pub use config::{DecoderConfig, RadioModel, TimeDisplay};
pub use engine::{CivEngine, Dispatch, NoopNotifier, RadioStatus, StatusNotifier};
pub use error::{DecodeError, TableError};
pub use memory::{Agc, BandMemoryRecord, BandMemoryStore, StackRegister, Vfo, VfoSlot};
pub use message::DecodedMessage;
pub use mode::{FilterIndex, ModeEntry, ModeIndex, ModeTable};
pub use report::{BandStackEntry, CivReport, GpsPosition, MessageType};
pub use signature::{CommandId, CommandSignature, SignatureTable};
pub use time::{TimeFields, UtcOffset};
