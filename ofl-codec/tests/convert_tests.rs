//! End-to-end conversion tests
//!
//! Logs are synthesized with the codec's own encoders, written to disk,
//! and pushed through the full pipeline: channel pool, stream reader,
//! interpreter, GUTMA rendering.

use ofl_codec::messages;
use ofl_codec::ChannelPool;
use ofl_core::model::{AirspeedHud, GlobalPosition, GpsFixType, GpsRawFix, TelemetryMessage};
use ofl_core::{ConvertError, Converter};
use std::fs;
use std::path::{Path, PathBuf};

/// 2020-09-13T12:26:40Z in microseconds.
const T0: u64 = 1_600_000_000_000_000;

/// Builds the on-disk interleave: a record timestamp before every message.
struct LogBuilder {
    data: Vec<u8>,
    seq: u8,
    big_endian: bool,
}

impl LogBuilder {
    fn new(start_us: u64) -> Self {
        let mut builder = Self {
            data: Vec::new(),
            seq: 0,
            big_endian: true,
        };
        builder.timestamp(start_us);
        builder
    }

    /// Same layout, but timestamps written in host-swapped byte order.
    fn new_byte_swapped(start_us: u64) -> Self {
        let mut builder = Self {
            data: Vec::new(),
            seq: 0,
            big_endian: false,
        };
        builder.timestamp(start_us);
        builder
    }

    fn timestamp(&mut self, ts_us: u64) {
        let raw = if self.big_endian {
            ts_us.to_be_bytes()
        } else {
            ts_us.to_le_bytes()
        };
        self.data.extend_from_slice(&raw);
    }

    /// Append a message frame followed by the next record's timestamp.
    fn message(&mut self, message: &TelemetryMessage, next_ts_us: u64) -> &mut Self {
        self.data
            .extend(messages::encode_v1(self.seq, 1, 1, message));
        self.seq = self.seq.wrapping_add(1);
        self.timestamp(next_ts_us);
        self
    }

    fn write(&self, path: &Path) {
        fs::write(path, &self.data).unwrap();
    }
}

fn global_position(lat: i32, lon: i32, alt: i32) -> TelemetryMessage {
    TelemetryMessage::GlobalPosition(GlobalPosition {
        lat,
        lon,
        alt,
        ..GlobalPosition::default()
    })
}

fn gps_fix(lat: i32, lon: i32, alt: i32, fix_type: GpsFixType) -> TelemetryMessage {
    TelemetryMessage::GpsRawFix(GpsRawFix {
        lat,
        lon,
        alt,
        fix_type,
        ..GpsRawFix::default()
    })
}

fn hud(groundspeed: f32) -> TelemetryMessage {
    TelemetryMessage::AirspeedHud(AirspeedHud {
        groundspeed,
        ..AirspeedHud::default()
    })
}

/// Unique scratch directory per test.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ofl-e2e-{}-{}", std::process::id(), name));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn read_document(path: &Path) -> serde_json::Value {
    let text = fs::read_to_string(path).unwrap();
    serde_json::from_str(&text).expect("output should be valid JSON")
}

fn items(document: &serde_json::Value) -> Vec<Vec<f64>> {
    document["exchange"]["message"]["flight_logging"]["flight_logging_items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| {
            row.as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_f64().unwrap())
                .collect()
        })
        .collect()
}

fn assert_row(row: &[f64], expected: [f64; 5]) {
    for (got, want) in row.iter().zip(expected) {
        assert!(
            (got - want).abs() < 1e-9,
            "row {row:?} differs from {expected:?}"
        );
    }
}

#[test]
fn position_then_hud_produces_one_zero_speed_sample() {
    let dir = scratch_dir("scenario");
    let src = dir.join("flight_007.tlog");
    let dst = dir.join("flight_007.json");

    // The speed report arrives after the only position message, so no
    // sample ever carries it.
    LogBuilder::new(T0)
        .message(
            &global_position(377_654_320, -1_223_456_780, 100_000),
            T0 + 2_000_000,
        )
        .message(&hud(5.5), T0 + 3_000_000)
        .write(&src);

    let mut converter = Converter::new(ChannelPool::default());
    let summary = converter.convert(&src, &dst).unwrap();
    assert_eq!(summary.samples, 1);
    assert!(summary.output_written);

    let document = read_document(&dst);
    let rows = items(&document);
    assert_eq!(rows.len(), 1);
    assert_row(&rows[0], [0.0, -122.345_678, 37.765_432, 100.0, 0.0]);

    assert_eq!(
        document["exchange"]["message"]["flight_logging"]["logging_start_dtg"],
        "2020-09-13T12:26:40Z"
    );
    assert_eq!(
        document["exchange"]["message"]["file"]["filename"],
        "flight_007"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn hud_speed_is_attached_to_later_positions() {
    let dir = scratch_dir("speed");
    let src = dir.join("flight.tlog");
    let dst = dir.join("flight.json");

    LogBuilder::new(T0)
        .message(&hud(5.5), T0 + 1_000_000)
        .message(
            &global_position(377_654_320, -1_223_456_780, 100_000),
            T0 + 2_000_000,
        )
        .write(&src);

    let mut converter = Converter::new(ChannelPool::default());
    converter.convert(&src, &dst).unwrap();

    let rows = items(&read_document(&dst));
    assert_eq!(rows.len(), 1);
    assert_row(&rows[0], [1.0, -122.345_678, 37.765_432, 100.0, 5.5]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn empty_log_leaves_no_destination_file() {
    let dir = scratch_dir("empty");
    let src = dir.join("empty.tlog");
    let dst = dir.join("empty.json");
    fs::write(&src, b"").unwrap();

    let mut converter = Converter::new(ChannelPool::default());
    let summary = converter.convert(&src, &dst).unwrap();
    assert_eq!(summary.samples, 0);
    assert!(!dst.exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn sample_free_log_removes_the_destination_file() {
    let dir = scratch_dir("no-samples");
    let src = dir.join("hud-only.tlog");
    let dst = dir.join("hud-only.json");

    LogBuilder::new(T0)
        .message(&hud(3.0), T0 + 1_000_000)
        .message(&hud(4.0), T0 + 2_000_000)
        .message(&TelemetryMessage::Other { msg_id: 0 }, T0 + 3_000_000)
        .write(&src);

    let mut converter = Converter::new(ChannelPool::default());
    let summary = converter.convert(&src, &dst).unwrap();
    assert_eq!(summary.samples, 0);
    assert!(!summary.output_written);
    assert!(!dst.exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn duplicate_positions_collapse_into_one_item() {
    let dir = scratch_dir("dedup");
    let src = dir.join("dup.tlog");
    let dst = dir.join("dup.json");

    LogBuilder::new(T0)
        .message(&global_position(1, 2, 3), T0 + 1_000_000)
        .message(&global_position(1, 2, 3), T0 + 2_000_000)
        .message(&global_position(1, 2, 3), T0 + 3_000_000)
        .write(&src);

    let mut converter = Converter::new(ChannelPool::default());
    let summary = converter.convert(&src, &dst).unwrap();
    assert_eq!(summary.samples, 1);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn global_position_suppresses_later_raw_fixes() {
    let dir = scratch_dir("priority");
    let src = dir.join("priority.tlog");
    let dst = dir.join("priority.json");

    LogBuilder::new(T0)
        .message(&gps_fix(10_000_000, 20_000_000, 1_000, GpsFixType::Fix3d), T0 + 1_000_000)
        .message(&global_position(30_000_000, 40_000_000, 2_000), T0 + 2_000_000)
        .message(&gps_fix(50_000_000, 60_000_000, 3_000, GpsFixType::RtkFixed), T0 + 3_000_000)
        .write(&src);

    let mut converter = Converter::new(ChannelPool::default());
    let summary = converter.convert(&src, &dst).unwrap();
    assert_eq!(summary.samples, 2);

    let rows = items(&read_document(&dst));
    assert_row(&rows[0], [0.0, 2.0, 1.0, 1.0, 0.0]);
    assert_row(&rows[1], [1.0, 4.0, 3.0, 2.0, 0.0]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn low_quality_fixes_never_reach_the_document() {
    let dir = scratch_dir("fix-gate");
    let src = dir.join("gate.tlog");
    let dst = dir.join("gate.json");

    LogBuilder::new(T0)
        .message(&gps_fix(10_000_000, 20_000_000, 1_000, GpsFixType::Fix2d), T0 + 1_000_000)
        .message(&gps_fix(10_000_000, 20_000_000, 1_000, GpsFixType::NoFix), T0 + 2_000_000)
        .write(&src);

    let mut converter = Converter::new(ChannelPool::default());
    let summary = converter.convert(&src, &dst).unwrap();
    assert_eq!(summary.samples, 0);
    assert!(!dst.exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn byte_swapped_timestamps_are_autodetected() {
    let dir = scratch_dir("swapped");
    let src = dir.join("swapped.tlog");
    let dst = dir.join("swapped.json");

    // The detection heuristic needs the wrong-order reading to land in the
    // future; a nonzero low byte guarantees that for every stamp here.
    let start = T0 + 255;
    LogBuilder::new_byte_swapped(start)
        .message(&global_position(1, 2, 3), start + 2_500_000)
        .message(&global_position(4, 5, 6), start + 5_000_000)
        .write(&src);

    let mut converter = Converter::new(ChannelPool::default());
    converter.convert(&src, &dst).unwrap();

    let rows = items(&read_document(&dst));
    assert_eq!(rows.len(), 2);
    assert!((rows[1][0] - 2.5).abs() < 1e-9, "elapsed {:?}", rows[1]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn exhausted_pool_fails_the_conversion() {
    let dir = scratch_dir("exhausted");
    let src = dir.join("log.tlog");
    let dst = dir.join("log.json");
    LogBuilder::new(T0)
        .message(&global_position(1, 2, 3), T0 + 1_000_000)
        .write(&src);

    let pool = ChannelPool::new(1);
    let mut first = Converter::new(pool.clone());
    first.convert(&src, &dst).unwrap();

    // the first converter still holds the only channel
    let mut second = Converter::new(pool.clone());
    let err = second.convert(&src, &dst).unwrap_err();
    assert!(matches!(err, ConvertError::NoSessionAvailable));

    drop(first);
    let mut third = Converter::new(pool);
    third.convert(&src, &dst).unwrap();

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn corrupted_frames_are_skipped_and_the_stream_recovers() {
    let dir = scratch_dir("corrupt");
    let src = dir.join("corrupt.tlog");
    let dst = dir.join("corrupt.json");

    let mut builder = LogBuilder::new(T0);
    builder
        .message(&global_position(1, 2, 3), T0 + 1_000_000)
        .message(&global_position(4, 5, 6), T0 + 2_000_000);
    let mut data = builder.data.clone();
    // flip a payload byte of the first frame; its checksum no longer matches
    data[8 + 8] ^= 0xFF;
    fs::write(&src, &data).unwrap();

    let mut converter = Converter::new(ChannelPool::default());
    let summary = converter.convert(&src, &dst).unwrap();
    // only the intact second position survives
    assert_eq!(summary.samples, 1);

    let _ = fs::remove_dir_all(&dir);
}
