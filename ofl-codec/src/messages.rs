//! Message-level codec
//!
//! Payload layouts for the consumed message kinds, the CRC_EXTRA seed each
//! contributes to the frame checksum, and frame encoders used to synthesize
//! logs in tests. Payload fields are little-endian, laid out largest-first
//! per the wire contract.

use ofl_core::model::{AirspeedHud, GlobalPosition, GpsFixType, GpsRawFix, TelemetryMessage};

use crate::crc::Crc;
use crate::frame::{MAGIC_V1, MAGIC_V2};

/// GPS_RAW_INT wire id.
pub const MSG_ID_GPS_RAW_FIX: u32 = 24;
/// GLOBAL_POSITION_INT wire id.
pub const MSG_ID_GLOBAL_POSITION: u32 = 33;
/// VFR_HUD wire id.
pub const MSG_ID_AIRSPEED_HUD: u32 = 74;

const GPS_RAW_FIX_LEN: usize = 30;
const GLOBAL_POSITION_LEN: usize = 28;
const AIRSPEED_HUD_LEN: usize = 20;

/// Checksum seed for the given message id; `None` outside the consumed set.
pub fn crc_extra(msg_id: u32) -> Option<u8> {
    match msg_id {
        MSG_ID_GPS_RAW_FIX => Some(24),
        MSG_ID_GLOBAL_POSITION => Some(104),
        MSG_ID_AIRSPEED_HUD => Some(20),
        _ => None,
    }
}

/// Decode a frame payload.
///
/// v2 frames truncate trailing zero bytes, so the payload is zero-extended
/// to the full wire length before field extraction; bytes beyond the base
/// length (v2 extensions) are ignored.
pub fn decode(msg_id: u32, payload: &[u8]) -> TelemetryMessage {
    match msg_id {
        MSG_ID_GPS_RAW_FIX => TelemetryMessage::GpsRawFix(decode_gps_raw_fix(payload)),
        MSG_ID_GLOBAL_POSITION => {
            TelemetryMessage::GlobalPosition(decode_global_position(payload))
        }
        MSG_ID_AIRSPEED_HUD => TelemetryMessage::AirspeedHud(decode_airspeed_hud(payload)),
        _ => TelemetryMessage::Other { msg_id },
    }
}

fn decode_gps_raw_fix(payload: &[u8]) -> GpsRawFix {
    let buf = extend(payload, GPS_RAW_FIX_LEN);
    GpsRawFix {
        time_usec: read_u64(&buf, 0),
        lat: read_i32(&buf, 8),
        lon: read_i32(&buf, 12),
        alt: read_i32(&buf, 16),
        eph: read_u16(&buf, 20),
        epv: read_u16(&buf, 22),
        vel: read_u16(&buf, 24),
        cog: read_u16(&buf, 26),
        fix_type: GpsFixType::from_u8(buf[28]),
        satellites_visible: buf[29],
    }
}

fn decode_global_position(payload: &[u8]) -> GlobalPosition {
    let buf = extend(payload, GLOBAL_POSITION_LEN);
    GlobalPosition {
        time_boot_ms: read_u32(&buf, 0),
        lat: read_i32(&buf, 4),
        lon: read_i32(&buf, 8),
        alt: read_i32(&buf, 12),
        relative_alt: read_i32(&buf, 16),
        vx: read_i16(&buf, 20),
        vy: read_i16(&buf, 22),
        vz: read_i16(&buf, 24),
        hdg: read_u16(&buf, 26),
    }
}

fn decode_airspeed_hud(payload: &[u8]) -> AirspeedHud {
    let buf = extend(payload, AIRSPEED_HUD_LEN);
    AirspeedHud {
        airspeed: read_f32(&buf, 0),
        groundspeed: read_f32(&buf, 4),
        alt: read_f32(&buf, 8),
        climb: read_f32(&buf, 12),
        heading: read_i16(&buf, 16),
        throttle: read_u16(&buf, 18),
    }
}

/// Encode a message as a MAVLink v1 frame. v1 ids are a single byte, so
/// `Other` ids above 255 need [`encode_v2`].
pub fn encode_v1(seq: u8, sys_id: u8, comp_id: u8, message: &TelemetryMessage) -> Vec<u8> {
    let (msg_id, payload) = payload_of(message);
    let mut frame = Vec::with_capacity(8 + payload.len());
    frame.push(MAGIC_V1);
    frame.push(payload.len() as u8);
    frame.push(seq);
    frame.push(sys_id);
    frame.push(comp_id);
    frame.push(msg_id as u8);
    frame.extend_from_slice(&payload);
    push_checksum(&mut frame, msg_id);
    frame
}

/// Encode a message as a MAVLink v2 frame with a zero-truncated payload.
pub fn encode_v2(seq: u8, sys_id: u8, comp_id: u8, message: &TelemetryMessage) -> Vec<u8> {
    let (msg_id, mut payload) = payload_of(message);
    while payload.len() > 1 && payload.last() == Some(&0) {
        payload.pop();
    }
    let mut frame = Vec::with_capacity(12 + payload.len());
    frame.push(MAGIC_V2);
    frame.push(payload.len() as u8);
    frame.push(0); // incompat_flags
    frame.push(0); // compat_flags
    frame.push(seq);
    frame.push(sys_id);
    frame.push(comp_id);
    frame.push(msg_id as u8);
    frame.push((msg_id >> 8) as u8);
    frame.push((msg_id >> 16) as u8);
    frame.extend_from_slice(&payload);
    push_checksum(&mut frame, msg_id);
    frame
}

fn payload_of(message: &TelemetryMessage) -> (u32, Vec<u8>) {
    match message {
        TelemetryMessage::GpsRawFix(fix) => (MSG_ID_GPS_RAW_FIX, encode_gps_raw_fix(fix)),
        TelemetryMessage::GlobalPosition(pos) => {
            (MSG_ID_GLOBAL_POSITION, encode_global_position(pos))
        }
        TelemetryMessage::AirspeedHud(hud) => (MSG_ID_AIRSPEED_HUD, encode_airspeed_hud(hud)),
        TelemetryMessage::Other { msg_id } => (*msg_id, vec![0]),
    }
}

fn encode_gps_raw_fix(fix: &GpsRawFix) -> Vec<u8> {
    let mut buf = Vec::with_capacity(GPS_RAW_FIX_LEN);
    buf.extend_from_slice(&fix.time_usec.to_le_bytes());
    buf.extend_from_slice(&fix.lat.to_le_bytes());
    buf.extend_from_slice(&fix.lon.to_le_bytes());
    buf.extend_from_slice(&fix.alt.to_le_bytes());
    buf.extend_from_slice(&fix.eph.to_le_bytes());
    buf.extend_from_slice(&fix.epv.to_le_bytes());
    buf.extend_from_slice(&fix.vel.to_le_bytes());
    buf.extend_from_slice(&fix.cog.to_le_bytes());
    buf.push(fix.fix_type as u8);
    buf.push(fix.satellites_visible);
    buf
}

fn encode_global_position(pos: &GlobalPosition) -> Vec<u8> {
    let mut buf = Vec::with_capacity(GLOBAL_POSITION_LEN);
    buf.extend_from_slice(&pos.time_boot_ms.to_le_bytes());
    buf.extend_from_slice(&pos.lat.to_le_bytes());
    buf.extend_from_slice(&pos.lon.to_le_bytes());
    buf.extend_from_slice(&pos.alt.to_le_bytes());
    buf.extend_from_slice(&pos.relative_alt.to_le_bytes());
    buf.extend_from_slice(&pos.vx.to_le_bytes());
    buf.extend_from_slice(&pos.vy.to_le_bytes());
    buf.extend_from_slice(&pos.vz.to_le_bytes());
    buf.extend_from_slice(&pos.hdg.to_le_bytes());
    buf
}

fn encode_airspeed_hud(hud: &AirspeedHud) -> Vec<u8> {
    let mut buf = Vec::with_capacity(AIRSPEED_HUD_LEN);
    buf.extend_from_slice(&hud.airspeed.to_le_bytes());
    buf.extend_from_slice(&hud.groundspeed.to_le_bytes());
    buf.extend_from_slice(&hud.alt.to_le_bytes());
    buf.extend_from_slice(&hud.climb.to_le_bytes());
    buf.extend_from_slice(&hud.heading.to_le_bytes());
    buf.extend_from_slice(&hud.throttle.to_le_bytes());
    buf
}

fn push_checksum(frame: &mut Vec<u8>, msg_id: u32) {
    let mut crc = Crc::new();
    for &byte in &frame[1..] {
        crc.accumulate(byte);
    }
    // Out-of-set ids encode with seed 0; the decoder accepts those frames
    // without verification, so the seed only has to be consistent here.
    crc.accumulate(crc_extra(msg_id).unwrap_or(0));
    let value = crc.value();
    frame.push((value & 0xFF) as u8);
    frame.push((value >> 8) as u8);
}

fn extend(payload: &[u8], len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len.max(payload.len())];
    buf[..payload.len()].copy_from_slice(payload);
    buf
}

fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

fn read_i16(buf: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([buf[offset], buf[offset + 1]])
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

fn read_i32(buf: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

fn read_u64(buf: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[offset..offset + 8]);
    u64::from_le_bytes(bytes)
}

fn read_f32(buf: &[u8], offset: usize) -> f32 {
    f32::from_bits(read_u32(buf, offset))
}
