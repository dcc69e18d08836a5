//! Incremental MAVLink frame parsing
//!
//! One byte per call, never errors: anything that fails framing or checksum
//! validation is dropped and the parser hunts for the next start marker.
//! Both v1 (`0xFE`) and v2 (`0xFD`) frames are recognized; v2 signatures
//! are consumed but not verified.

use ofl_core::model::TelemetryMessage;
use tracing::debug;

use crate::crc::Crc;
use crate::messages;

/// v1 start marker.
pub const MAGIC_V1: u8 = 0xFE;
/// v2 start marker.
pub const MAGIC_V2: u8 = 0xFD;

/// v2 incompat flag bit: the frame carries a 13-byte signature.
const INCOMPAT_SIGNED: u8 = 0x01;
const SIGNATURE_LEN: usize = 13;

/// len, seq, sysid, compid, msgid
const HEADER_LEN_V1: usize = 5;
/// len, incompat, compat, seq, sysid, compid, msgid[3]
const HEADER_LEN_V2: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Header,
    Payload,
    Checksum,
    Signature,
}

/// Streaming MAVLink v1/v2 frame parser.
#[derive(Debug)]
pub struct FrameParser {
    state: State,
    v2: bool,
    header: Vec<u8>,
    payload: Vec<u8>,
    checksum_lo: Option<u8>,
    sig_remaining: usize,
}

impl FrameParser {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            v2: false,
            header: Vec::with_capacity(HEADER_LEN_V2),
            payload: Vec::with_capacity(255),
            checksum_lo: None,
            sig_remaining: 0,
        }
    }

    /// Feed one byte; returns the decoded message when a frame completes.
    pub fn advance(&mut self, byte: u8) -> Option<TelemetryMessage> {
        match self.state {
            State::Idle => {
                match byte {
                    MAGIC_V1 => self.begin(false),
                    MAGIC_V2 => self.begin(true),
                    _ => {}
                }
                None
            }
            State::Header => {
                self.header.push(byte);
                if self.header.len() == self.header_len() {
                    self.state = if self.payload_len() == 0 {
                        State::Checksum
                    } else {
                        State::Payload
                    };
                }
                None
            }
            State::Payload => {
                self.payload.push(byte);
                if self.payload.len() == self.payload_len() {
                    self.state = State::Checksum;
                }
                None
            }
            State::Checksum => match self.checksum_lo {
                None => {
                    self.checksum_lo = Some(byte);
                    None
                }
                Some(lo) => self.verify(u16::from(byte) << 8 | u16::from(lo)),
            },
            State::Signature => {
                self.sig_remaining -= 1;
                if self.sig_remaining == 0 {
                    return Some(self.finish());
                }
                None
            }
        }
    }

    fn begin(&mut self, v2: bool) {
        self.v2 = v2;
        self.header.clear();
        self.payload.clear();
        self.checksum_lo = None;
        self.state = State::Header;
    }

    fn header_len(&self) -> usize {
        if self.v2 {
            HEADER_LEN_V2
        } else {
            HEADER_LEN_V1
        }
    }

    fn payload_len(&self) -> usize {
        usize::from(self.header[0])
    }

    fn msg_id(&self) -> u32 {
        if self.v2 {
            u32::from(self.header[6])
                | u32::from(self.header[7]) << 8
                | u32::from(self.header[8]) << 16
        } else {
            u32::from(self.header[4])
        }
    }

    fn verify(&mut self, received: u16) -> Option<TelemetryMessage> {
        let msg_id = self.msg_id();
        // Ids outside the consumed set carry no known checksum seed; those
        // frames are accepted structurally so the record interleave of the
        // log stays paired.
        if let Some(extra) = messages::crc_extra(msg_id) {
            let mut crc = Crc::new();
            for &byte in self.header.iter().chain(&self.payload) {
                crc.accumulate(byte);
            }
            crc.accumulate(extra);
            if crc.value() != received {
                debug!("dropping message {} frame: checksum mismatch", msg_id);
                self.state = State::Idle;
                return None;
            }
        }
        if self.v2 && self.header[1] & INCOMPAT_SIGNED != 0 {
            self.sig_remaining = SIGNATURE_LEN;
            self.state = State::Signature;
            return None;
        }
        Some(self.finish())
    }

    fn finish(&mut self) -> TelemetryMessage {
        self.state = State::Idle;
        messages::decode(self.msg_id(), &self.payload)
    }
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}
