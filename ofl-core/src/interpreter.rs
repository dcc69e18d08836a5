//! Telemetry interpretation
//!
//! Folds the decoded message stream into a position/speed track. Two
//! sources compete for position: global position estimates are
//! authoritative, raw GNSS fixes are only used until the first estimate is
//! seen. Ground speed rides along from the most recent HUD report and is
//! attached to whichever position sample comes next.

use tracing::debug;

use crate::model::{AirspeedHud, GlobalPosition, GpsRawFix, TelemetryMessage, Track, TrackSample};

/// Fixed-point units per degree of the wire lat/lon encoding.
const DEG_SCALE: f64 = 1e7;
/// Millimeters per meter of the wire altitude encoding.
const ALT_SCALE: f64 = 1000.0;
const US_PER_SEC: f64 = 1_000_000.0;

/// Stateful reduction of a `(timestamp, message)` stream into a [`Track`].
///
/// Scratch state is deliberately small: the track start, the last HUD
/// speed, and whether the authoritative position source has appeared.
#[derive(Debug, Default)]
pub struct TelemetryInterpreter {
    start_us: Option<u64>,
    last_speed: f64,
    global_position_seen: bool,
    samples: Vec<TrackSample>,
}

impl TelemetryInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one timestamped message into the track.
    pub fn observe(&mut self, ts_us: u64, message: &TelemetryMessage) {
        // The first message of the log defines the track start, whatever
        // its kind.
        let start_us = *self.start_us.get_or_insert(ts_us);

        // TODO: surface flight-mode change messages as track events
        match message {
            TelemetryMessage::GpsRawFix(fix) => self.on_gps_raw_fix(ts_us, start_us, fix),
            TelemetryMessage::GlobalPosition(pos) => self.on_global_position(ts_us, start_us, pos),
            TelemetryMessage::AirspeedHud(hud) => self.on_airspeed_hud(hud),
            TelemetryMessage::Other { .. } => {}
        }
    }

    /// Finish the fold.
    pub fn into_track(self) -> Track {
        Track {
            start_us: self.start_us.unwrap_or(0),
            samples: self.samples,
        }
    }

    fn on_gps_raw_fix(&mut self, ts_us: u64, start_us: u64, fix: &GpsRawFix) {
        if self.global_position_seen || !fix.fix_type.has_3d_lock() {
            return;
        }
        self.append(TrackSample {
            time_s: elapsed_s(ts_us, start_us),
            lon_deg: f64::from(fix.lon) / DEG_SCALE,
            lat_deg: f64::from(fix.lat) / DEG_SCALE,
            alt_m: f64::from(fix.alt) / ALT_SCALE,
            speed_mps: self.last_speed,
        });
    }

    fn on_global_position(&mut self, ts_us: u64, start_us: u64, pos: &GlobalPosition) {
        // From the first estimate on, raw fixes are permanently outranked.
        self.global_position_seen = true;
        self.append(TrackSample {
            time_s: elapsed_s(ts_us, start_us),
            lon_deg: f64::from(pos.lon) / DEG_SCALE,
            lat_deg: f64::from(pos.lat) / DEG_SCALE,
            alt_m: f64::from(pos.alt) / ALT_SCALE,
            speed_mps: self.last_speed,
        });
    }

    fn on_airspeed_hud(&mut self, hud: &AirspeedHud) {
        let speed = f64::from(hud.groundspeed);
        self.last_speed = if speed.is_nan() { 0.0 } else { speed };
    }

    fn append(&mut self, sample: TrackSample) {
        if let Some(last) = self.samples.last() {
            if last.same_position(&sample) {
                return;
            }
        }
        debug!(
            "appending track sample [{:.3}, {:.6}, {:.6}, {:.3}, {:.3}]",
            sample.time_s, sample.lon_deg, sample.lat_deg, sample.alt_m, sample.speed_mps
        );
        self.samples.push(sample);
    }
}

fn elapsed_s(ts_us: u64, start_us: u64) -> f64 {
    (ts_us as i64 - start_us as i64) as f64 / US_PER_SEC
}
