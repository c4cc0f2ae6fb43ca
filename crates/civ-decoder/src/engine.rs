//! The decoding engine
//!
//! [`CivEngine::process`] runs one body through the whole pipeline:
//! signature match, field decode, band memory commit, status snapshot and
//! display notifications. Failures are logged and reported as
//! [`MessageType::None`]; the caller's poll loop never sees an error.

use tracing::{debug, trace, warn};

use crate::band::Band;
use crate::bcd::validate_bcd;
use crate::config::DecoderConfig;
use crate::memory::{Agc, BandMemoryStore, Vfo};
use crate::message::DecodedMessage;
use crate::mode::{FilterIndex, ModeIndex, ModeTable};
use crate::report::{self, CivReport, GpsPosition, MessageType};
use crate::signature::{CommandId, SignatureTable};
use crate::time::{TimeFields, UtcOffset};

/// Display refresh hooks
///
/// Called after the band record has been updated. Preamp and attenuator
/// reports refresh both indicators since one can switch the other off.
pub trait StatusNotifier {
    fn attenuator_changed(&mut self, _band: Band, _on: bool) {}
    fn preamp_changed(&mut self, _band: Band, _on: bool) {}
    fn agc_changed(&mut self, _band: Band, _agc: Agc) {}
}

/// Notifier that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl StatusNotifier for NoopNotifier {}

/// Radio-wide state last reported
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RadioStatus {
    pub frequency_hz: u64,
    pub mode: Option<ModeIndex>,
    pub filter: Option<FilterIndex>,
    pub data_flag: u8,
    pub transmitting: bool,
    pub utc_offset: UtcOffset,
    /// Radio clock from the last position report, carrying the current offset
    pub clock: Option<TimeFields>,
    pub position: Option<GpsPosition>,
}

/// Result of processing one body
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dispatch {
    /// Matched command, `None` when no signature matched
    pub command: Option<CommandId>,
    /// Decoded report, `None` on no match, decode failure or ignored command
    pub report: Option<CivReport>,
    pub message_type: MessageType,
}

impl Dispatch {
    fn ignored(command: CommandId) -> Self {
        Self {
            command: Some(command),
            ..Default::default()
        }
    }
}

/// Matches, decodes and commits CI-V reports
#[derive(Debug, Clone)]
pub struct CivEngine {
    table: SignatureTable,
    modes: ModeTable,
    config: DecoderConfig,
    status: RadioStatus,
}

impl CivEngine {
    /// Engine with the standard signature table and Icom mode table
    pub fn new(config: DecoderConfig) -> Self {
        Self::with_tables(SignatureTable::standard(), ModeTable::icom(), config)
    }

    pub fn with_tables(table: SignatureTable, modes: ModeTable, config: DecoderConfig) -> Self {
        Self {
            table,
            modes,
            config,
            status: RadioStatus::default(),
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn modes(&self) -> &ModeTable {
        &self.modes
    }

    pub fn table(&self) -> &SignatureTable {
        &self.table
    }

    pub fn status(&self) -> &RadioStatus {
        &self.status
    }

    /// Frequency in Hz carried by a body, if it is a frequency report
    ///
    /// Lets the caller switch its current band before the report is committed.
    pub fn reported_frequency(&self, message: &DecodedMessage) -> Option<u64> {
        self.table
            .match_message(message)
            .filter(|&command| report::is_frequency_command(command))
            .filter(|_| validate_bcd(message.datafield(1)).is_ok())
            .map(|_| {
                message
                    .numeric_value()
                    .saturating_mul(self.config.frequency_scale)
            })
    }

    /// Process one body against the record of `current`
    pub fn process<N: StatusNotifier + ?Sized>(
        &mut self,
        message: &DecodedMessage,
        store: &mut BandMemoryStore,
        current: Band,
        notifier: &mut N,
    ) -> Dispatch {
        let Some(command) = self.table.match_message(message) else {
            trace!(body = ?message.payload(), "no matching CI-V signature");
            return Dispatch::default();
        };

        let primary_data_flag = store.record(current).primary().data_flag;
        let decoded = report::decode(
            command,
            message,
            &mut self.modes,
            &self.config,
            primary_data_flag,
        );

        let report = match decoded {
            Ok(Some(report)) => report,
            Ok(None) => {
                trace!(?command, "CI-V command not tracked");
                return Dispatch::ignored(command);
            }
            Err(e) => {
                warn!(?command, body = ?message.payload(), error = %e, "failed to decode CI-V report");
                return Dispatch::ignored(command);
            }
        };

        let message_type = self.update_status(&report);
        store.apply(current, &report);
        self.notify(&report, store, current, notifier);

        debug!(
            ?command,
            %current,
            message_type = message_type.code(),
            ?report,
            "CI-V report"
        );

        Dispatch {
            command: Some(command),
            report: Some(report),
            message_type,
        }
    }

    /// Update the radio-wide snapshot and settle the message type
    fn update_status(&mut self, report: &CivReport) -> MessageType {
        let status = &mut self.status;
        match *report {
            CivReport::Frequency { hz } => status.frequency_hz = hz,
            CivReport::Mode {
                mode,
                filter,
                data_flag,
            }
            | CivReport::ExtendedMode {
                vfo: Vfo::Selected,
                mode,
                filter,
                data_flag,
            } => {
                status.mode = Some(mode);
                status.filter = Some(filter);
                status.data_flag = data_flag;
            }
            CivReport::Transmit { on } => {
                // Repeated TX state reports are not news
                if status.transmitting == on {
                    return MessageType::None;
                }
                status.transmitting = on;
            }
            CivReport::Position { position, time } => {
                status.position = Some(position);
                status.clock = Some(time.with_offset(status.utc_offset));
            }
            CivReport::UtcOffset(offset) => {
                status.utc_offset = offset;
                status.clock = status.clock.map(|clock| clock.with_offset(offset));
            }
            _ => {}
        }
        report.message_type()
    }

    fn notify<N: StatusNotifier + ?Sized>(
        &self,
        report: &CivReport,
        store: &BandMemoryStore,
        current: Band,
        notifier: &mut N,
    ) {
        let record = store.record(current);
        match report {
            CivReport::Preamp { .. } | CivReport::Attenuator { .. } => {
                notifier.preamp_changed(current, record.preamp());
                notifier.attenuator_changed(current, record.attenuator());
            }
            CivReport::Agc(agc) => notifier.agc_changed(current, *agc),
            _ => {}
        }
    }

    /// Radio clock in the configured presentation
    pub fn clock(&self) -> Option<chrono::NaiveDateTime> {
        let clock = self.status.clock?;
        clock
            .display(self.config.time_display)
            .inspect_err(|e| warn!(error = %e, "radio clock not representable"))
            .ok()
    }
}

impl Default for CivEngine {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
    }

    impl StatusNotifier for Recorder {
        fn attenuator_changed(&mut self, _band: Band, _on: bool) {
            self.calls.push("attn");
        }
        fn preamp_changed(&mut self, _band: Band, _on: bool) {
            self.calls.push("preamp");
        }
        fn agc_changed(&mut self, _band: Band, _agc: Agc) {
            self.calls.push("agc");
        }
    }

    fn process(engine: &mut CivEngine, store: &mut BandMemoryStore, payload: &[u8]) -> Dispatch {
        let msg = DecodedMessage::from_payload(payload).unwrap();
        engine.process(&msg, store, Band::Band144, &mut NoopNotifier)
    }

    #[test]
    fn test_no_match_changes_nothing() {
        let mut engine = CivEngine::default();
        let mut store = BandMemoryStore::default();
        let before = store.clone();

        let dispatch = process(&mut engine, &mut store, &[0x7F, 0x00]);
        assert_eq!(dispatch, Dispatch::default());
        assert_eq!(store, before);
    }

    #[test]
    fn test_tx_edge_detection() {
        let mut engine = CivEngine::default();
        let mut store = BandMemoryStore::default();

        let tx_on = [0x1C, 0x00, 0x01];
        let tx_off = [0x1C, 0x00, 0x00];
        assert_eq!(process(&mut engine, &mut store, &tx_off).message_type, MessageType::None);
        assert_eq!(process(&mut engine, &mut store, &tx_on).message_type, MessageType::TxState);
        assert_eq!(process(&mut engine, &mut store, &tx_on).message_type, MessageType::None);
        assert!(engine.status().transmitting);
        assert_eq!(process(&mut engine, &mut store, &tx_off).message_type, MessageType::TxState);
    }

    #[test]
    fn test_notifier_calls() {
        let mut engine = CivEngine::default();
        let mut store = BandMemoryStore::default();
        let mut recorder = Recorder::default();

        for payload in [&[0x11, 0x10][..], &[0x16, 0x12, 0x02][..], &[0x14, 0x02, 0x01, 0x28][..]] {
            let msg = DecodedMessage::from_payload(payload).unwrap();
            engine.process(&msg, &mut store, Band::Band432, &mut recorder);
        }
        assert_eq!(recorder.calls, vec!["preamp", "attn", "agc"]);
    }

    #[test]
    fn test_decode_error_reports_none() {
        let mut engine = CivEngine::default();
        let mut store = BandMemoryStore::default();
        let dispatch = process(&mut engine, &mut store, &[0x26, 0x00]);
        assert_eq!(dispatch.command, Some(CommandId::SelectedVfoMode));
        assert_eq!(dispatch.message_type, MessageType::None);
        assert!(dispatch.report.is_none());
    }

    #[test]
    fn test_reported_frequency() {
        let engine = CivEngine::default();
        let msg = DecodedMessage::new(&[0x00, 0x00, 0x00, 0x25, 0x14, 0x00], 14_250_000);
        assert_eq!(engine.reported_frequency(&msg), Some(14_250_000));

        let msg = DecodedMessage::new(&[0x11, 0x10], 10);
        assert_eq!(engine.reported_frequency(&msg), None);

        let msg = DecodedMessage::new(&[0x00, 0x00, 0x40, 0xFE, 0xFE], 0);
        assert_eq!(engine.reported_frequency(&msg), None);
    }
}
