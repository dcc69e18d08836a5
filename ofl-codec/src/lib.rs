//! OpenFlightLog MAVLink codec
//!
//! Streaming frame parser fed one byte at a time, payload codec for the
//! consumed message kinds, and the reservable decoder channel pool that
//! plugs into `ofl-core`'s session traits.

pub mod channels;
pub mod crc;
pub mod frame;
pub mod messages;

pub use channels::{ChannelPool, DecoderChannel, DEFAULT_CHANNELS};
pub use frame::FrameParser;
