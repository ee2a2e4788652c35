//! Error types for the midi-key-transposer library

use std::io;

/// Library error type for transposition operations
#[derive(Debug, thiserror::Error)]
pub enum TransposeError {
    /// Key token that does not name a key (unknown letter, conflicting accidentals...)
    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    /// File name without at least a style and a key part
    #[error("malformed file name: {0:?}")]
    MalformedFilename(String),

    /// File skipped because its extension is not a MIDI one
    #[error("unsupported file type: {0:?}")]
    UnsupportedFileType(String),

    /// Loading, parsing or saving a MIDI file failed
    #[error("MIDI I/O error: {0}")]
    MidiIo(String),

    /// Transposed pitch outside of 0..=127 while rejecting such notes
    #[error("transposed pitch {0} is outside of the MIDI note range")]
    PitchOutOfRange(i32),

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(String),

    /// Background batch worker stopped without reporting
    #[error("worker error: {0}")]
    WorkerError(String),
}

impl TransposeError {
    /// Skipped non-MIDI files are notices rather than failures.
    pub const fn is_notice(&self) -> bool {
        matches!(self, Self::UnsupportedFileType(_))
    }
}

impl From<io::Error> for TransposeError {
    fn from(error: io::Error) -> Self {
        Self::IoError(error.to_string())
    }
}
