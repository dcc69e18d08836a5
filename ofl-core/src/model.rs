//! Track data model and decoded telemetry messages
//!
//! Defines the canonical position/speed track the interpreter accumulates,
//! and the decoded message variants a decoder session produces. Message
//! fields keep the wire convention of the source log: fixed-point degrees
//! (deg * 1e7) and millimeter altitudes, scaled to degrees/meters only when
//! track samples are built.

use serde::{Deserialize, Serialize};

/// A decoded telemetry message, tagged by kind.
///
/// Only three kinds participate in track building. Every other message id
/// is reported as [`TelemetryMessage::Other`] so the timestamp/message
/// interleave of the log stays paired even for kinds nobody consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TelemetryMessage {
    /// Raw GNSS receiver fix (lower-priority position source).
    GpsRawFix(GpsRawFix),
    /// Fused global position estimate (authoritative position source).
    GlobalPosition(GlobalPosition),
    /// HUD-style airspeed/groundspeed report.
    AirspeedHud(AirspeedHud),
    /// Any message kind the converter does not interpret.
    Other { msg_id: u32 },
}

/// Raw GNSS fix as reported by the receiver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GpsRawFix {
    /// Receiver timestamp, microseconds since epoch.
    pub time_usec: u64,
    /// Latitude in degrees * 1e7.
    pub lat: i32,
    /// Longitude in degrees * 1e7.
    pub lon: i32,
    /// Altitude (MSL) in millimeters.
    pub alt: i32,
    /// Horizontal dilution of position.
    pub eph: u16,
    /// Vertical dilution of position.
    pub epv: u16,
    /// Ground speed in cm/s.
    pub vel: u16,
    /// Course over ground in centidegrees.
    pub cog: u16,
    /// Fix quality.
    pub fix_type: GpsFixType,
    /// Number of satellites used.
    pub satellites_visible: u8,
}

/// Fused global position estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalPosition {
    /// Autopilot boot-relative timestamp, milliseconds.
    pub time_boot_ms: u32,
    /// Latitude in degrees * 1e7.
    pub lat: i32,
    /// Longitude in degrees * 1e7.
    pub lon: i32,
    /// Altitude (MSL) in millimeters.
    pub alt: i32,
    /// Altitude above ground in millimeters.
    pub relative_alt: i32,
    /// Ground velocity north, cm/s.
    pub vx: i16,
    /// Ground velocity east, cm/s.
    pub vy: i16,
    /// Ground velocity down, cm/s.
    pub vz: i16,
    /// Heading in centidegrees.
    pub hdg: u16,
}

/// HUD-style speed/altitude report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AirspeedHud {
    /// Indicated airspeed, m/s.
    pub airspeed: f32,
    /// Ground speed, m/s.
    pub groundspeed: f32,
    /// Altitude (MSL), meters.
    pub alt: f32,
    /// Climb rate, m/s.
    pub climb: f32,
    /// Heading in degrees, 0..360.
    pub heading: i16,
    /// Throttle, percent.
    pub throttle: u16,
}

/// GNSS fix quality, ordered from no receiver to PPP.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum GpsFixType {
    #[default]
    NoGps,
    NoFix,
    Fix2d,
    Fix3d,
    Dgps,
    RtkFloat,
    RtkFixed,
    Static,
    Ppp,
}

impl GpsFixType {
    /// Map the wire enum value; out-of-range values count as no fix.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => GpsFixType::NoGps,
            1 => GpsFixType::NoFix,
            2 => GpsFixType::Fix2d,
            3 => GpsFixType::Fix3d,
            4 => GpsFixType::Dgps,
            5 => GpsFixType::RtkFloat,
            6 => GpsFixType::RtkFixed,
            7 => GpsFixType::Static,
            8 => GpsFixType::Ppp,
            _ => GpsFixType::NoFix,
        }
    }

    /// Whether the fix is three-dimensional or better.
    pub fn has_3d_lock(self) -> bool {
        self >= GpsFixType::Fix3d
    }
}

/// One timestamped position/speed sample of a track. Immutable once appended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackSample {
    /// Seconds elapsed since the start of the track.
    pub time_s: f64,
    /// Longitude in degrees.
    pub lon_deg: f64,
    /// Latitude in degrees.
    pub lat_deg: f64,
    /// Altitude in meters (WGS84).
    pub alt_m: f64,
    /// Ground speed in meters per second.
    pub speed_mps: f64,
}

impl TrackSample {
    /// Position/speed equality, ignoring elapsed time.
    ///
    /// Consecutive samples that only differ in time are collapsed by the
    /// interpreter, so the comparison deliberately skips `time_s`.
    pub fn same_position(&self, other: &TrackSample) -> bool {
        self.lon_deg == other.lon_deg
            && self.lat_deg == other.lat_deg
            && self.alt_m == other.alt_m
            && self.speed_mps == other.speed_mps
    }
}

/// An ordered, append-only sequence of track samples.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Track {
    /// Timestamp of the first message in the log, microseconds since epoch.
    /// Zero until the first message is observed.
    pub start_us: u64,
    /// Samples in log order, non-decreasing `time_s`.
    pub samples: Vec<TrackSample>,
}

impl Track {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}
