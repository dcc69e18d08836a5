//! Streaming log reader
//!
//! A telemetry log is a repeating sequence of an 8-byte record timestamp
//! followed by one framed message. The reader consumes the leading
//! timestamp up front, then pumps bytes through a decoder session one at a
//! time; each completed message is paired with the timestamp that preceded
//! it, and the 8 bytes after the message become the timestamp of the next
//! record.

use std::io::{self, ErrorKind, Read};

use crate::model::TelemetryMessage;
use crate::session::DecoderSession;
use crate::timestamp::{self, TIMESTAMP_SIZE};

/// Reads `(timestamp, message)` pairs from a log stream.
///
/// Advances the session's framing state as a side effect; neither the
/// stream nor the session can be shared with a concurrent reader.
pub struct MessageStreamReader<'s, R, S> {
    src: R,
    session: &'s mut S,
    /// Timestamp attributed to the next decoded message. `None` before the
    /// leading timestamp is consumed and once the stream has ended.
    pending_ts: Option<u64>,
    started: bool,
}

impl<'s, R: Read, S: DecoderSession> MessageStreamReader<'s, R, S> {
    pub fn new(src: R, session: &'s mut S) -> Self {
        Self {
            src,
            session,
            pending_ts: None,
            started: false,
        }
    }

    /// Next `(timestamp, message)` pair.
    ///
    /// Returns `Ok(None)` once the stream ends before another full message
    /// is decoded — the normal termination condition, not an error. A
    /// message that completes with fewer than [`TIMESTAMP_SIZE`] trailing
    /// bytes left is still returned; the stream then ends.
    pub fn next_message(&mut self) -> io::Result<Option<(u64, TelemetryMessage)>> {
        if !self.started {
            self.started = true;
            self.pending_ts = self.read_timestamp()?;
        }
        let Some(ts) = self.pending_ts else {
            return Ok(None);
        };

        let mut byte = [0u8; 1];
        loop {
            match self.src.read(&mut byte) {
                Ok(0) => {
                    self.pending_ts = None;
                    return Ok(None);
                }
                Ok(_) => {
                    if let Some(message) = self.session.advance(byte[0]) {
                        self.pending_ts = self.read_timestamp()?;
                        return Ok(Some((ts, message)));
                    }
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }

    /// Read the next record timestamp; `None` when the stream ends first.
    fn read_timestamp(&mut self) -> io::Result<Option<u64>> {
        let mut raw = [0u8; TIMESTAMP_SIZE];
        match self.src.read_exact(&mut raw) {
            Ok(()) => Ok(Some(timestamp::decode(raw))),
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => Ok(None),
            Err(err) => Err(err),
        }
    }
}
