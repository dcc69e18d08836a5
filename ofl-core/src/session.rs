//! Decoder session trait definitions
//!
//! Message framing is provided by an external decoding service: a session is
//! reserved from a provider, fed the log one byte at a time, and reports
//! each completed message. Sessions are exclusively owned; the underlying
//! channel is returned when the session is dropped.

use crate::model::TelemetryMessage;

/// Source of decoder sessions (channel reservation).
pub trait SessionProvider {
    type Session: DecoderSession;

    /// Reserve a decoding session.
    ///
    /// Returns `None` when no channel is free. Callers must treat that as
    /// fatal for the operation that needed the session.
    fn acquire(&self) -> Option<Self::Session>;
}

/// A stateful streaming message decoder.
///
/// Feeding bytes advances internal framing state, so a session must not be
/// shared across concurrent readers.
pub trait DecoderSession {
    /// Feed one byte from the log stream.
    ///
    /// Returns the decoded message when this byte completes a frame, `None`
    /// while a frame is still incomplete. Malformed input never errors; the
    /// decoder resynchronizes on the next frame it can recognize.
    fn advance(&mut self, byte: u8) -> Option<TelemetryMessage>;
}
