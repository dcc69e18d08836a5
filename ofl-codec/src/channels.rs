//! Decoder channel pool
//!
//! Frame decoding is a reservable resource: each conversion owns one
//! channel exclusively and returns it when done. The pool is cheap to clone
//! and safe to share, so parallel conversions can each reserve their own
//! channel.

use std::sync::{Arc, Mutex, PoisonError};

use ofl_core::model::TelemetryMessage;
use ofl_core::session::{DecoderSession, SessionProvider};
use tracing::debug;

use crate::frame::FrameParser;

/// Default number of decoder channels.
pub const DEFAULT_CHANNELS: usize = 16;

/// Fixed-capacity pool of decoder channels.
#[derive(Debug, Clone)]
pub struct ChannelPool {
    /// `true` marks a reserved slot.
    slots: Arc<Mutex<Vec<bool>>>,
}

impl ChannelPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Arc::new(Mutex::new(vec![false; capacity])),
        }
    }

    pub fn capacity(&self) -> usize {
        self.lock().len()
    }

    /// Channels currently free.
    pub fn available(&self) -> usize {
        self.lock().iter().filter(|used| !**used).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<bool>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ChannelPool {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNELS)
    }
}

impl SessionProvider for ChannelPool {
    type Session = DecoderChannel;

    fn acquire(&self) -> Option<DecoderChannel> {
        let mut slots = self.lock();
        let id = slots.iter().position(|&used| !used)?;
        slots[id] = true;
        debug!("reserved decoder channel {}", id);
        Some(DecoderChannel {
            id,
            parser: FrameParser::new(),
            slots: Arc::clone(&self.slots),
        })
    }
}

/// An exclusively owned decoder channel; its slot frees on drop.
#[derive(Debug)]
pub struct DecoderChannel {
    id: usize,
    parser: FrameParser,
    slots: Arc<Mutex<Vec<bool>>>,
}

impl DecoderChannel {
    pub fn id(&self) -> usize {
        self.id
    }
}

impl DecoderSession for DecoderChannel {
    fn advance(&mut self, byte: u8) -> Option<TelemetryMessage> {
        self.parser.advance(byte)
    }
}

impl Drop for DecoderChannel {
    fn drop(&mut self) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots[self.id] = false;
        debug!("released decoder channel {}", self.id);
    }
}
