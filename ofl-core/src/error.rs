//! Conversion error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal conversion failures.
///
/// Only conditions that abort a conversion before the stream is processed
/// are errors. Decoding problems inside the stream never surface here: the
/// decoder resynchronizes or the read loop ends early, and an empty result
/// is signaled by the absence of an output file rather than an error.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// No decoder channel could be reserved.
    #[error("no decoder session available")]
    NoSessionAvailable,

    /// The source log could not be opened for reading.
    #[error("unable to open log file '{}': {source}", path.display())]
    SourceUnreadable { path: PathBuf, source: io::Error },

    /// The destination file could not be created.
    #[error("unable to create output file '{}': {source}", path.display())]
    DestinationUnwritable { path: PathBuf, source: io::Error },
}
