use crate::picker::{pick_folder, FolderPickerError};
use crate::AppError::BatchError;
use clap::{Parser, ValueEnum};
use config::Config;
use midi_key_transposer::{
    BatchConfig, BatchJob, BatchOrchestrator, PitchPolicy, TransposeError as LibTransposeError,
};
use std::io;
use std::path::PathBuf;

mod config;
mod picker;

fn main() {
    let result = main_result();
    std::process::exit(match result {
        Ok(()) => 0,
        Err(err) => {
            // use Display instead of Debug for user friendly error messages
            log::error!("{err}");
            1
        }
    });
}

pub fn main_result() -> Result<(), AppError> {
    // setup logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("midi_key_transposer=info"),
    )
    .init();

    // args
    let args = CliArgs::parse();
    if args.mode == Mode::Full && args.pitch_offset.is_some() {
        log::warn!("--pitch-offset is ignored in full chromatic mode");
    }

    // read local config
    let mut local_config = Config::read_config()?;

    // folders from args, or picked by hand
    let source_dir = match args.source_dir {
        Some(source_dir) => source_dir,
        None => pick_folder(
            "Pick the folder with the MIDI files to transpose",
            local_config.get_source_folder().as_deref(),
        )?,
    };
    let dest_dir = match args.dest_dir {
        Some(dest_dir) => dest_dir,
        None => pick_folder(
            "Pick the destination folder",
            local_config.get_dest_folder().as_deref(),
        )?,
    };

    log::info!("Transposing files from {source_dir:?} into {dest_dir:?}");

    let batch_config = match args.mode {
        Mode::Full => BatchConfig::full_chromatic(source_dir.clone(), dest_dir.clone()),
        Mode::Windowed => {
            let pitch_offset = args
                .pitch_offset
                .or(local_config.get_pitch_offset())
                .unwrap_or_default();
            log::info!("Windowed mode with pitch offset {pitch_offset}");
            BatchConfig::windowed(source_dir.clone(), dest_dir.clone(), pitch_offset)
        }
    }
    .with_pitch_policy(args.pitch_policy.into());

    // only remember folders that make a valid batch
    let orchestrator = BatchOrchestrator::new(batch_config);
    orchestrator.validate()?;

    let pitch_offset = match args.mode {
        Mode::Windowed => args.pitch_offset,
        Mode::Full => None,
    };
    local_config.remember(source_dir, dest_dir, pitch_offset)?;

    // go!
    let job = BatchJob::spawn(orchestrator)?;
    let report = job.wait()?;
    for skipped in &report.skipped {
        log::warn!("Skipped {:?}: {}", skipped.path, skipped.reason);
    }
    for failed in &report.failed {
        log::error!("Failed {:?}: {}", failed.path, failed.reason);
    }
    if report.failed.is_empty() {
        Ok(())
    } else {
        Err(BatchError(report.failed.len()))
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// Folder with the MIDI files to transpose, a folder picker opens when missing.
    #[arg(long)]
    source_dir: Option<PathBuf>,
    /// Destination folder, a folder picker opens when missing.
    #[arg(long)]
    dest_dir: Option<PathBuf>,
    /// Which keys to generate.
    #[arg(long, value_enum, default_value_t = Mode::Full)]
    mode: Mode,
    /// Shift applied to the -6..6 window (windowed mode only).
    #[arg(
        long,
        allow_hyphen_values = true,
        value_parser = clap::value_parser!(i32).range(-127..=127)
    )]
    pitch_offset: Option<i32>,
    /// What to do with notes shifted outside of the MIDI range.
    #[arg(long, value_enum, default_value_t = CliPitchPolicy::Unchecked)]
    pitch_policy: CliPitchPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// All 12 keys in `{dest}/{PitchClass}/`
    Full,
    /// 12 offsets around the source key in `{dest}/{Style}_{Key}/`
    Windowed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliPitchPolicy {
    /// Write shifted notes as they come
    Unchecked,
    /// Clamp to 0..=127
    Clamp,
    /// Fail the file
    Reject,
}

impl From<CliPitchPolicy> for PitchPolicy {
    fn from(policy: CliPitchPolicy) -> Self {
        match policy {
            CliPitchPolicy::Unchecked => Self::Unchecked,
            CliPitchPolicy::Clamp => Self::Clamp,
            CliPitchPolicy::Reject => Self::Reject,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    ConfigError(String),
    #[error("{0} file(s) could not be transposed")]
    BatchError(usize),
    #[error("other error: {0}")]
    OtherError(String),
}

impl From<LibTransposeError> for AppError {
    fn from(error: LibTransposeError) -> Self {
        match error {
            LibTransposeError::ConfigError(s) => Self::ConfigError(s),
            other => Self::OtherError(other.to_string()),
        }
    }
}

impl From<FolderPickerError> for AppError {
    fn from(error: FolderPickerError) -> Self {
        Self::ConfigError(error.to_string())
    }
}

impl From<io::Error> for AppError {
    fn from(error: io::Error) -> Self {
        Self::OtherError(error.to_string())
    }
}
