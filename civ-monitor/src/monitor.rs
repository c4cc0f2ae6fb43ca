//! Bus monitor: framer, engine and band memory glued together

use civ_decoder::{
    Agc, Band, BandMemoryStore, BandPlan, CivEngine, CivReport, Dispatch, MessageType,
    RadioStatus, StatusNotifier,
};
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::error::MonitorError;
use crate::framer::CivFramer;
use crate::settings::Settings;

/// Logs indicator changes the way a front panel would show them
#[derive(Debug, Default)]
pub struct LogNotifier;

impl StatusNotifier for LogNotifier {
    fn attenuator_changed(&mut self, band: Band, on: bool) {
        info!("{band}: ATT {}", on_off(on));
    }

    fn preamp_changed(&mut self, band: Band, on: bool) {
        info!("{band}: P.AMP {}", on_off(on));
    }

    fn agc_changed(&mut self, band: Band, agc: Agc) {
        info!("{band}: {agc}");
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "ON"
    } else {
        "OFF"
    }
}

/// Snapshot written on exit
#[derive(Debug, Serialize)]
pub struct MonitorDump<'a> {
    pub current_band: Band,
    pub status: &'a RadioStatus,
    pub bands: &'a BandMemoryStore,
}

/// Decodes a CI-V byte stream into per-band state
pub struct Monitor<N: StatusNotifier = LogNotifier> {
    framer: CivFramer,
    engine: CivEngine,
    store: BandMemoryStore,
    plan: BandPlan,
    current: Band,
    notifier: N,
}

impl Monitor<LogNotifier> {
    pub fn new(settings: &Settings) -> Self {
        Self::with_notifier(settings, LogNotifier)
    }
}

impl<N: StatusNotifier> Monitor<N> {
    pub fn with_notifier(settings: &Settings, notifier: N) -> Self {
        Self {
            framer: CivFramer::new(settings.controller_address),
            engine: CivEngine::new(settings.decoder.clone()),
            store: BandMemoryStore::new(&settings.band_plan),
            plan: settings.band_plan.clone(),
            current: settings.initial_band,
            notifier,
        }
    }

    pub fn current_band(&self) -> Band {
        self.current
    }

    pub fn store(&self) -> &BandMemoryStore {
        &self.store
    }

    pub fn engine(&self) -> &CivEngine {
        &self.engine
    }

    #[cfg(test)]
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Feed raw bus bytes, returning one dispatch per complete frame
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Dispatch> {
        self.framer.push_bytes(bytes);

        let mut dispatches = Vec::new();
        while let Some(frame) = self.framer.next_frame() {
            trace!(to = frame.to_addr, from = frame.from_addr, body = ?frame.body, "CI-V frame");
            let Some(message) = frame.to_message() else {
                continue;
            };

            // Band changes are followed before the report is committed
            if let Some(band) = self
                .engine
                .reported_frequency(&message)
                .and_then(|hz| self.plan.band_for(hz))
            {
                if band != self.current {
                    info!("band change {} -> {}", self.current, band);
                    self.current = band;
                }
            }

            let dispatch =
                self.engine
                    .process(&message, &mut self.store, self.current, &mut self.notifier);
            if let Some(report) = &dispatch.report {
                self.log_report(report, dispatch.message_type);
            }
            dispatches.push(dispatch);
        }
        dispatches
    }

    fn log_report(&self, report: &CivReport, message_type: MessageType) {
        let modes = self.engine.modes();
        match report {
            CivReport::Frequency { hz } => info!("{}: {} Hz", self.current, hz),
            CivReport::Mode {
                mode,
                filter,
                ..
            } => info!("{}: {} {}", self.current, modes.label(*mode), filter),
            CivReport::ExtendedMode {
                vfo,
                mode,
                filter,
                ..
            } => info!(
                "{}: {:?} VFO {} {}",
                self.current,
                vfo,
                modes.label(*mode),
                filter
            ),
            CivReport::BandStack(entry) => info!(
                "{} register {}: {} Hz {}",
                entry.band,
                entry.register.number(),
                entry.frequency_hz,
                entry.mode.map(|m| modes.label(m)).unwrap_or("---")
            ),
            CivReport::Transmit { on } if message_type != MessageType::None => {
                info!("{}", if *on { "TX" } else { "RX" })
            }
            CivReport::Position { position, .. } => {
                info!(
                    "position {:.4}, {:.4} alt {:.1} m",
                    position.latitude_deg, position.longitude_deg, position.altitude_m
                );
                if let Some(clock) = self.engine.clock() {
                    info!("radio clock {clock}");
                }
            }
            // Indicator changes go through the notifier
            CivReport::Preamp { .. } | CivReport::Attenuator { .. } | CivReport::Agc(_) => {}
            other => debug!("{}: {:?}", self.current, other),
        }
    }

    /// Current state as pretty JSON
    pub fn dump_json(&self) -> Result<String, MonitorError> {
        let dump = MonitorDump {
            current_band: self.current,
            status: self.engine.status(),
            bands: self.store(),
        };
        Ok(serde_json::to_string_pretty(&dump)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl StatusNotifier for Recorder {
        fn attenuator_changed(&mut self, band: Band, on: bool) {
            self.events.push(format!("{band} att {on}"));
        }

        fn preamp_changed(&mut self, band: Band, on: bool) {
            self.events.push(format!("{band} preamp {on}"));
        }
    }

    fn monitor() -> Monitor<Recorder> {
        Monitor::with_notifier(&Settings::default(), Recorder::default())
    }

    #[test]
    fn test_follows_band_from_frequency() {
        let mut monitor = monitor();
        assert_eq!(monitor.current_band(), Band::Band20M);

        // 7.074 MHz transceive report
        let dispatches = monitor.feed(&[
            0xFE, 0xFE, 0x00, 0xA4, 0x00, 0x00, 0x40, 0x07, 0x07, 0x00, 0xFD,
        ]);
        assert_eq!(dispatches.len(), 1);
        assert_eq!(dispatches[0].message_type, MessageType::Frequency);
        assert_eq!(monitor.current_band(), Band::Band40M);
        assert_eq!(monitor.engine().status().frequency_hz, 7_074_000);
    }

    #[test]
    fn test_attenuator_lands_on_current_band() {
        let mut monitor = monitor();
        monitor.feed(&[
            0xFE, 0xFE, 0xE0, 0xA4, 0x03, 0x00, 0x00, 0x00, 0x44, 0x01, 0xFD,
        ]);
        assert_eq!(monitor.current_band(), Band::Band144);

        let dispatches = monitor.feed(&[0xFE, 0xFE, 0xE0, 0xA4, 0x11, 0x10, 0xFD]);
        assert_eq!(dispatches[0].message_type, MessageType::Attenuator);
        assert!(monitor.store().record(Band::Band144).attenuator());
        assert!(!monitor.store().record(Band::Band20M).attenuator());
        assert_eq!(
            monitor.notifier().events,
            vec!["2M preamp false", "2M att true"]
        );
    }

    #[test]
    fn test_split_frames_across_feeds() {
        let mut monitor = monitor();
        assert!(monitor.feed(&[0xFE, 0xFE, 0xE0]).is_empty());
        let dispatches = monitor.feed(&[0xA4, 0x1C, 0x00, 0x01, 0xFD]);
        assert_eq!(dispatches[0].message_type, MessageType::TxState);
        assert!(monitor.engine().status().transmitting);
    }

    #[test]
    fn test_unknown_command_is_none() {
        let mut monitor = monitor();
        let dispatches = monitor.feed(&[0xFE, 0xFE, 0xE0, 0xA4, 0x19, 0x00, 0xA4, 0xFD]);
        assert_eq!(dispatches.len(), 1);
        assert_eq!(dispatches[0].message_type, MessageType::None);
    }

    #[test]
    fn test_dump_json() {
        let mut monitor = monitor();
        monitor.feed(&[0xFE, 0xFE, 0xE0, 0xA4, 0x11, 0x10, 0xFD]);
        let json: serde_json::Value = serde_json::from_str(&monitor.dump_json().unwrap()).unwrap();
        assert_eq!(json["current_band"], "Band20M");
        assert!(json["bands"]["records"].is_array());
    }

    #[test]
    fn test_collision_keeps_frequency_and_next_report() {
        let mut monitor = monitor();
        monitor.feed(&[
            0xFE, 0xFE, 0x00, 0xA4, 0x00, 0x00, 0x40, 0x07, 0x07, 0x00, 0xFD,
        ]);
        assert_eq!(monitor.current_band(), Band::Band40M);

        // Frequency broadcast cut short, then an attenuator reply
        let dispatches = monitor.feed(&[
            0xFE, 0xFE, 0x00, 0xA4, 0x00, 0x00, 0x40, 0xFE, 0xFE, 0xE0, 0xA4, 0x11, 0x10, 0xFD,
        ]);

        assert_eq!(dispatches.len(), 1);
        assert_eq!(dispatches[0].message_type, MessageType::Attenuator);
        assert_eq!(monitor.current_band(), Band::Band40M);
        assert_eq!(monitor.engine().status().frequency_hz, 7_074_000);
        let record = monitor.store().record(Band::Band40M);
        assert_eq!(record.primary().frequency_hz, 7_074_000);
        assert!(record.attenuator());
    }

    #[test]
    fn test_invalid_frequency_frame_dropped() {
        let mut monitor = monitor();
        monitor.feed(&[
            0xFE, 0xFE, 0x00, 0xA4, 0x00, 0x00, 0x40, 0x07, 0x07, 0x00, 0xFD,
        ]);

        let dispatches = monitor.feed(&[
            0xFE, 0xFE, 0x00, 0xA4, 0x00, 0x00, 0x4A, 0x07, 0x07, 0x00, 0xFD,
        ]);
        assert!(dispatches.is_empty());
        assert_eq!(monitor.engine().status().frequency_hz, 7_074_000);
        assert_eq!(
            monitor.store().record(Band::Band40M).primary().frequency_hz,
            7_074_000
        );
    }
}
