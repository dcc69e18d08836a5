//! Record timestamp decoding
//!
//! Every record in a telemetry log is preceded by an 8-byte timestamp in
//! microseconds since epoch. Well-formed logs store it big-endian, but some
//! recorders write host byte order instead; `decode` detects that case by
//! checking the big-endian reading against the current wall clock.

use chrono::Utc;

/// Size of the on-disk record timestamp in bytes.
pub const TIMESTAMP_SIZE: usize = 8;

/// Decode a record timestamp, auto-detecting byte order.
///
/// The bytes are read big-endian first. A value later than "now" can only
/// come from a byte-swapped recorder, so the swapped reading is returned
/// instead. The heuristic is reliable only for logs whose true timestamps
/// lie in the past relative to conversion time; garbage bytes still yield a
/// value, validity is the caller's concern.
pub fn decode(raw: [u8; TIMESTAMP_SIZE]) -> u64 {
    decode_at(raw, Utc::now().timestamp_micros() as u64)
}

/// Byte-order detection against an explicit reference clock.
pub(crate) fn decode_at(raw: [u8; TIMESTAMP_SIZE], now_us: u64) -> u64 {
    let stamp = u64::from_be_bytes(raw);
    if stamp > now_us {
        stamp.swap_bytes()
    } else {
        stamp
    }
}
