//! Conversion pipeline
//!
//! Drives a whole log-to-document conversion: reserve a decoder session,
//! stream the source log through the interpreter, and either write the
//! rendered document or remove the empty destination file.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ConvertError;
use crate::gutma;
use crate::interpreter::TelemetryInterpreter;
use crate::reader::MessageStreamReader;
use crate::session::SessionProvider;

/// Outcome of a successful conversion.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ConversionSummary {
    /// Track samples accumulated from the log.
    pub samples: usize,
    /// Whether a document was written. `false` means the log produced no
    /// samples and the destination file was removed.
    pub output_written: bool,
}

/// Log-to-GUTMA converter holding one reusable decoder session.
///
/// The session is reserved on the first conversion and kept until the
/// converter is dropped (or [`Converter::release_session`] is called), so
/// consecutive conversions reuse a single channel.
pub struct Converter<P: SessionProvider> {
    provider: P,
    session: Option<P::Session>,
}

impl<P: SessionProvider> Converter<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            session: None,
        }
    }

    /// Convert the telemetry log at `src` into a GUTMA document at `dst`.
    ///
    /// Fails only when no session can be reserved, the source cannot be
    /// opened, or the destination cannot be created. Faults after both
    /// files are open truncate the conversion instead of failing it.
    pub fn convert(&mut self, src: &Path, dst: &Path) -> Result<ConversionSummary, ConvertError> {
        let session = match &mut self.session {
            Some(session) => session,
            slot => {
                let Some(session) = self.provider.acquire() else {
                    warn!("no decoder session available");
                    return Err(ConvertError::NoSessionAvailable);
                };
                slot.insert(session)
            }
        };

        let source = File::open(src).map_err(|err| {
            warn!("unable to open log file {}: {}", src.display(), err);
            ConvertError::SourceUnreadable {
                path: src.to_path_buf(),
                source: err,
            }
        })?;
        let mut destination = File::create(dst).map_err(|err| {
            warn!("unable to create output file {}: {}", dst.display(), err);
            ConvertError::DestinationUnwritable {
                path: dst.to_path_buf(),
                source: err,
            }
        })?;

        let mut interpreter = TelemetryInterpreter::new();
        let mut reader = MessageStreamReader::new(BufReader::new(source), session);
        loop {
            match reader.next_message() {
                Ok(Some((ts_us, message))) => interpreter.observe(ts_us, &message),
                Ok(None) => break,
                Err(err) => {
                    // A read fault mid-stream truncates the conversion;
                    // whatever was accumulated so far is kept.
                    warn!("log read failed mid-stream: {}", err);
                    break;
                }
            }
        }

        let track = interpreter.into_track();
        if track.is_empty() {
            drop(destination);
            if let Err(err) = fs::remove_file(dst) {
                warn!("unable to remove empty output file {}: {}", dst.display(), err);
            }
            debug!("log {} produced no samples", src.display());
            return Ok(ConversionSummary {
                samples: 0,
                output_written: false,
            });
        }

        let stem = dst.file_stem().and_then(OsStr::to_str).unwrap_or_default();
        let document = gutma::render(&track, stem, Utc::now());
        if let Err(err) = destination.write_all(document.as_bytes()) {
            warn!("unable to write output file {}: {}", dst.display(), err);
        }
        info!("converted {} samples from {}", track.len(), src.display());
        Ok(ConversionSummary {
            samples: track.len(),
            output_written: true,
        })
    }

    /// Release the held decoder session, if any.
    ///
    /// The next conversion reserves a fresh one.
    pub fn release_session(&mut self) {
        self.session = None;
    }

    /// Whether a decoder session is currently held.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }
}
