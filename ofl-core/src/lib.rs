//! OpenFlightLog Core Library
//!
//! Track data model, telemetry interpretation, GUTMA document rendering and
//! the conversion pipeline. Wire framing is pluggable: the pipeline drives
//! any implementation of the decoder-session traits defined here (the
//! `ofl-codec` crate provides the MAVLink one).

pub mod convert;
pub mod error;
pub mod gutma;
pub mod interpreter;
pub mod model;
pub mod reader;
pub mod session;
pub mod timestamp;

pub use convert::{ConversionSummary, Converter};
pub use error::ConvertError;
pub use interpreter::TelemetryInterpreter;
pub use model::{TelemetryMessage, Track, TrackSample};
pub use reader::MessageStreamReader;
pub use session::{DecoderSession, SessionProvider};
