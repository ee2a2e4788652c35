//! midi-key-transposer - batch transposition of MIDI loops into every key
//!
//! This library provides:
//! - Parsing of key tokens (`G#`, `Eb`, `Am`...) and structured file names
//! - Generation of the target keys for a source file
//! - Transposition of the note events of a Standard MIDI File
//! - A batch orchestrator running over a directory, in place or on a worker thread
//!
//! # Example
//!
//! ```no_run
//! use midi_key_transposer::{BatchConfig, BatchOrchestrator};
//!
//! let config = BatchConfig::full_chromatic("loops", "transposed");
//! let report = BatchOrchestrator::new(config).run().unwrap();
//! println!("{} files written", report.output_count());
//! ```

pub mod batch;
pub mod error;
pub mod parser;
pub mod transpose;

// Re-export main types for convenience
pub use batch::{
    job::BatchJob,
    midi_file::MidiSource,
    orchestrator::{
        is_midi_file, BatchConfig, BatchOrchestrator, BatchProgress, BatchReport, ProcessedFile,
        SkippedFile,
    },
};
pub use error::TransposeError;
pub use parser::{
    file_name::{encode_file_name, normalize_style, NamingPolicy, ParsedFilename},
    key_parser::resolve_key,
};
pub use transpose::{
    note_transposer::{transpose_events, PitchPolicy, TransposeSummary},
    pitch_class::{Key, PitchClass},
    target_keys::{generate_targets, TargetMode, TransposeTarget, OFFSET_WINDOW},
};
