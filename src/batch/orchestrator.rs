use crate::batch::midi_file::MidiSource;
use crate::parser::file_name::{NamingPolicy, ParsedFilename};
use crate::transpose::note_transposer::PitchPolicy;
use crate::transpose::target_keys::{generate_targets, TargetMode, MAX_PITCH_OFFSET};
use crate::TransposeError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Extensions accepted when filtering, compared case-insensitively.
pub const MIDI_EXTENSIONS: [&str; 2] = ["mid", "midi"];

/// Everything needed to run a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    pub mode: TargetMode,
    pub naming: NamingPolicy,
    /// Skip files without a MIDI extension instead of trying to load them
    pub filter_extensions: bool,
    pub pitch_policy: PitchPolicy,
}

impl BatchConfig {
    /// All 12 keys, style kept verbatim, no extension filter.
    pub fn full_chromatic(source_dir: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            dest_dir: dest_dir.into(),
            mode: TargetMode::FullChromatic,
            naming: NamingPolicy::FullChromatic,
            filter_extensions: false,
            pitch_policy: PitchPolicy::default(),
        }
    }

    /// Offset window shifted by `pitch_offset`, style normalized, MIDI files only.
    pub fn windowed(
        source_dir: impl Into<PathBuf>,
        dest_dir: impl Into<PathBuf>,
        pitch_offset: i32,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            dest_dir: dest_dir.into(),
            mode: TargetMode::Windowed { pitch_offset },
            naming: NamingPolicy::Windowed,
            filter_extensions: true,
            pitch_policy: PitchPolicy::default(),
        }
    }

    #[must_use]
    pub const fn with_pitch_policy(mut self, pitch_policy: PitchPolicy) -> Self {
        self.pitch_policy = pitch_policy;
        self
    }
}

/// Progress snapshot published after each file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchProgress {
    pub files_done: usize,
    pub files_total: usize,
    pub current_file: Option<String>,
}

/// A file that produced no output.
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: TransposeError,
}

/// A file transposed into all of its targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedFile {
    pub source: PathBuf,
    pub outputs: Vec<PathBuf>,
    /// Notes that left the MIDI range across all outputs
    pub out_of_range_notes: usize,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<ProcessedFile>,
    /// Non-MIDI files left aside by the extension filter
    pub skipped: Vec<SkippedFile>,
    pub failed: Vec<SkippedFile>,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn output_count(&self) -> usize {
        self.processed.iter().map(|p| p.outputs.len()).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && !self.cancelled
    }
}

/// `true` for `.mid` and `.midi` files, whatever the case.
pub fn is_midi_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| MIDI_EXTENSIONS.contains(&e.as_str()))
}

/// Drives the transposition of every file of a directory.
#[derive(Debug, Clone)]
pub struct BatchOrchestrator {
    config: BatchConfig,
}

impl BatchOrchestrator {
    pub const fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Fails before any processing on unusable directories.
    pub fn validate(&self) -> Result<(), TransposeError> {
        let source_dir = &self.config.source_dir;
        if !source_dir.is_dir() {
            return Err(TransposeError::ConfigError(format!(
                "Source directory not found {source_dir:?}"
            )));
        }
        let dest_dir = &self.config.dest_dir;
        if dest_dir.exists() && !dest_dir.is_dir() {
            return Err(TransposeError::ConfigError(format!(
                "Destination is not a directory {dest_dir:?}"
            )));
        }
        if let TargetMode::Windowed { pitch_offset } = self.config.mode {
            if pitch_offset.unsigned_abs() > MAX_PITCH_OFFSET.unsigned_abs() {
                return Err(TransposeError::ConfigError(format!(
                    "Pitch offset {pitch_offset} exceeds {MAX_PITCH_OFFSET} semitones"
                )));
            }
        }
        Ok(())
    }

    /// Regular files directly inside the source directory, sorted by name.
    pub fn list_sources(&self) -> Result<Vec<PathBuf>, TransposeError> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.config.source_dir)? {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    pub fn run(&self) -> Result<BatchReport, TransposeError> {
        self.run_with(&AtomicBool::new(false), |_| {})
    }

    /// Processes every source file, reporting progress after each one.
    ///
    /// `cancel` is checked between files. Per-file errors are collected in the report.
    pub fn run_with(
        &self,
        cancel: &AtomicBool,
        mut on_progress: impl FnMut(&BatchProgress),
    ) -> Result<BatchReport, TransposeError> {
        self.validate()?;
        let sources = self.list_sources()?;
        log::info!(
            "Transposing {} file(s) from {:?} to {:?} ({:?})",
            sources.len(),
            self.config.source_dir,
            self.config.dest_dir,
            self.config.mode
        );

        let mut report = BatchReport::default();
        let mut progress = BatchProgress {
            files_done: 0,
            files_total: sources.len(),
            current_file: None,
        };
        on_progress(&progress);

        for path in sources {
            if cancel.load(Ordering::Relaxed) {
                log::warn!("Batch cancelled after {} file(s)", progress.files_done);
                report.cancelled = true;
                break;
            }
            progress.current_file = path.file_name().map(|f| f.to_string_lossy().into_owned());
            match self.process_file(&path) {
                Ok(processed) => {
                    log::info!(
                        "Transposed {:?} into {} file(s)",
                        path,
                        processed.outputs.len()
                    );
                    report.processed.push(processed);
                }
                Err(reason) if reason.is_notice() => {
                    log::warn!("Skipping {path:?}: {reason}");
                    report.skipped.push(SkippedFile { path, reason });
                }
                Err(reason) => {
                    log::error!("Failed to transpose {path:?}: {reason}");
                    report.failed.push(SkippedFile { path, reason });
                }
            }
            progress.files_done += 1;
            on_progress(&progress);
        }

        log::info!(
            "Batch done: {} file(s) transposed into {} output(s), {} skipped, {} failed",
            report.processed.len(),
            report.output_count(),
            report.skipped.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Transposes one source file into all of its targets.
    pub fn process_file(&self, path: &Path) -> Result<ProcessedFile, TransposeError> {
        let config = &self.config;
        if config.filter_extensions && !is_midi_file(path) {
            return Err(TransposeError::UnsupportedFileType(
                path.display().to_string(),
            ));
        }
        let parsed = ParsedFilename::decode_path(path)?;
        let source_key = parsed.key()?;
        let targets = generate_targets(source_key, config.mode);
        let source = MidiSource::load(path)?;

        let mut outputs = Vec::with_capacity(targets.len());
        let mut written = HashSet::new();
        let mut out_of_range_notes = 0;
        for target in targets {
            let dest = config
                .naming
                .destination(&config.dest_dir, &parsed, &target.key());
            if !written.insert(dest.clone()) {
                // last write wins
                log::warn!(
                    "Overwriting {dest:?} with offset {} from the same source",
                    target.semitone_offset
                );
            }
            log::debug!(
                "{} -> {} ({:+} semitones) {dest:?}",
                source_key,
                target.key(),
                target.semitone_offset
            );
            let summary = source.transpose_to(&dest, target.semitone_offset, config.pitch_policy)?;
            if summary.out_of_range > 0 {
                log::warn!(
                    "{} note(s) outside of the MIDI range in {dest:?}",
                    summary.out_of_range
                );
            }
            out_of_range_notes += summary.out_of_range;
            outputs.push(dest);
        }
        Ok(ProcessedFile {
            source: path.to_path_buf(),
            outputs,
            out_of_range_notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::midi_file::test_support::{read_track_keys, write_midi_file};

    fn init_logger() {
        env_logger::builder()
            .is_test(true)
            .try_init()
            .unwrap_or_default();
    }

    const KEY_NAMES: [&str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];

    #[test]
    fn test_is_midi_file() {
        assert!(is_midi_file(Path::new("a/House_C_x.mid")));
        assert!(is_midi_file(Path::new("House_C_x.MIDI")));
        assert!(is_midi_file(Path::new("House_C_x.Mid")));
        assert!(!is_midi_file(Path::new("House_C_x.wav")));
        assert!(!is_midi_file(Path::new("House_C_mid")));
    }

    #[test]
    fn test_full_chromatic_end_to_end() {
        init_logger();
        let source_dir = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        write_midi_file(&source_dir.path().join("House_Gm_loop.mid"), &[67, 70, 74]);

        let config = BatchConfig::full_chromatic(source_dir.path(), dest_dir.path());
        let report = BatchOrchestrator::new(config).run().unwrap();
        assert!(report.is_success());
        assert_eq!(report.processed.len(), 1);
        assert_eq!(report.output_count(), 12);

        let mut dirs: Vec<String> = std::fs::read_dir(dest_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        dirs.sort();
        let mut expected_dirs: Vec<String> = KEY_NAMES.iter().map(|k| String::from(*k)).collect();
        expected_dirs.sort();
        assert_eq!(dirs, expected_dirs);

        for (target, name) in KEY_NAMES.iter().enumerate() {
            let label = format!("{name}m");
            let output = dest_dir
                .path()
                .join(name)
                .join(format!("House_{label}_loop.mid"));
            assert!(output.is_file(), "missing {output:?}");
            let offset = target as i32 - 7;
            let expected: Vec<u8> = [67, 67, 70, 70, 74, 74]
                .iter()
                .map(|k| (k + offset) as u8)
                .collect();
            assert_eq!(read_track_keys(&output, 0), expected, "key {label}");
            assert_eq!(read_track_keys(&output, 1), vec![36, 36]);
        }
    }

    #[test]
    fn test_windowed_skips_non_midi_files() {
        init_logger();
        let source_dir = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        write_midi_file(&source_dir.path().join("TECHNO_C_stab.MID"), &[60]);
        std::fs::write(source_dir.path().join("Techno_C_notes.txt"), "hello").unwrap();
        std::fs::create_dir(source_dir.path().join("Nested_C_dir.mid")).unwrap();

        let config = BatchConfig::windowed(source_dir.path(), dest_dir.path(), 0);
        let report = BatchOrchestrator::new(config).run().unwrap();
        assert!(report.is_success());
        assert_eq!(report.processed.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(
            report.skipped[0].reason,
            TransposeError::UnsupportedFileType(_)
        ));
        assert_eq!(report.output_count(), 12);

        // offsets -6..6 from C
        let window_keys = [
            "F#", "G", "G#", "A", "A#", "B", "C", "C#", "D", "D#", "E", "F",
        ];
        for (raw_offset, name) in (-6..6).zip(window_keys) {
            let output = dest_dir
                .path()
                .join(format!("Techno_{name}"))
                .join(format!("Techno_{name}_stab.MID"));
            assert!(output.is_file(), "missing {output:?}");
            assert_eq!(read_track_keys(&output, 0), vec![(60 + raw_offset) as u8; 2]);
        }
        assert!(!dest_dir.path().join("Techno_C").join("Techno_C_notes.txt").exists());
    }

    #[test]
    fn test_windowed_pitch_offset() {
        let source_dir = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        write_midi_file(&source_dir.path().join("Pop_Am_lead.mid"), &[57]);

        let config = BatchConfig::windowed(source_dir.path(), dest_dir.path(), 3);
        let report = BatchOrchestrator::new(config).run().unwrap();
        assert_eq!(report.output_count(), 12);
        // raw offset -6 shifted by 3 reaches F#m from Am
        let output = dest_dir.path().join("Pop_F#m").join("Pop_F#m_lead.mid");
        assert_eq!(read_track_keys(&output, 0), vec![54, 54]);
        let output = dest_dir.path().join("Pop_Em").join("Pop_Em_lead.mid");
        assert_eq!(read_track_keys(&output, 0), vec![64, 64]);
    }

    #[test]
    fn test_failures_do_not_abort_batch() {
        init_logger();
        let source_dir = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        write_midi_file(&source_dir.path().join("A_H_badkey.mid"), &[60]);
        write_midi_file(&source_dir.path().join("B.mid"), &[60]);
        std::fs::write(source_dir.path().join("C_C_corrupt.mid"), b"MThd").unwrap();
        write_midi_file(&source_dir.path().join("D_D_good.mid"), &[62]);

        let config = BatchConfig::full_chromatic(source_dir.path(), dest_dir.path());
        let report = BatchOrchestrator::new(config).run().unwrap();
        assert!(!report.is_success());
        assert_eq!(report.processed.len(), 1);
        assert_eq!(report.output_count(), 12);
        assert_eq!(report.failed.len(), 3);
        assert!(matches!(report.failed[0].reason, TransposeError::InvalidKey(_)));
        assert!(matches!(
            report.failed[1].reason,
            TransposeError::MalformedFilename(_)
        ));
        assert!(matches!(report.failed[2].reason, TransposeError::MidiIo(_)));
        assert!(dest_dir.path().join("C").join("D_C_good.mid").is_file());
    }

    #[test]
    fn test_full_chromatic_has_no_extension_filter() {
        let source_dir = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        std::fs::write(source_dir.path().join("Notes_C_readme.txt"), "text").unwrap();

        let config = BatchConfig::full_chromatic(source_dir.path(), dest_dir.path());
        let report = BatchOrchestrator::new(config).run().unwrap();
        assert!(report.skipped.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(report.failed[0].reason, TransposeError::MidiIo(_)));
    }

    #[test]
    fn test_pitch_policy_reject_fails_file() {
        let source_dir = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        write_midi_file(&source_dir.path().join("Bass_B_low.mid"), &[5]);

        let config = BatchConfig::full_chromatic(source_dir.path(), dest_dir.path())
            .with_pitch_policy(PitchPolicy::Reject);
        let report = BatchOrchestrator::new(config).run().unwrap();
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(
            report.failed[0].reason,
            TransposeError::PitchOutOfRange(_)
        ));

        let config = BatchConfig::full_chromatic(source_dir.path(), dest_dir.path());
        let report = BatchOrchestrator::new(config).run().unwrap();
        assert!(report.is_success());
        // B -> C..F are -11..-6, pushing both note events of each below 0
        assert_eq!(report.processed[0].out_of_range_notes, 12);
        assert_eq!(report.output_count(), 12);
    }

    #[test]
    fn test_invalid_directories() {
        let dest_dir = tempfile::tempdir().unwrap();
        let missing = dest_dir.path().join("missing");
        let config = BatchConfig::full_chromatic(&missing, dest_dir.path());
        assert!(matches!(
            BatchOrchestrator::new(config).run(),
            Err(TransposeError::ConfigError(_))
        ));

        let file = dest_dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        let config = BatchConfig::full_chromatic(dest_dir.path(), &file);
        assert!(matches!(
            BatchOrchestrator::new(config).run(),
            Err(TransposeError::ConfigError(_))
        ));
    }

    #[test]
    fn test_extreme_pitch_offset_rejected() {
        let source_dir = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        write_midi_file(&source_dir.path().join("House_C_a.mid"), &[60]);

        for pitch_offset in [i32::MAX, i32::MIN, MAX_PITCH_OFFSET + 1] {
            let config = BatchConfig::windowed(source_dir.path(), dest_dir.path(), pitch_offset);
            assert!(matches!(
                BatchOrchestrator::new(config).run(),
                Err(TransposeError::ConfigError(_))
            ));
        }
        assert_eq!(std::fs::read_dir(dest_dir.path()).unwrap().count(), 0);

        let config = BatchConfig::windowed(source_dir.path(), dest_dir.path(), -MAX_PITCH_OFFSET);
        assert!(BatchOrchestrator::new(config).validate().is_ok());
    }

    #[test]
    fn test_cancel_before_start() {
        let source_dir = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        write_midi_file(&source_dir.path().join("House_C_a.mid"), &[60]);

        let cancel = AtomicBool::new(true);
        let mut snapshots = Vec::new();
        let config = BatchConfig::full_chromatic(source_dir.path(), dest_dir.path());
        let report = BatchOrchestrator::new(config)
            .run_with(&cancel, |p| snapshots.push(p.clone()))
            .unwrap();
        assert!(report.cancelled);
        assert!(report.processed.is_empty());
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].files_total, 1);
    }

    #[test]
    fn test_progress_snapshots() {
        let source_dir = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        write_midi_file(&source_dir.path().join("House_C_a.mid"), &[60]);
        write_midi_file(&source_dir.path().join("House_D_b.mid"), &[62]);

        let mut snapshots = Vec::new();
        let config = BatchConfig::windowed(source_dir.path(), dest_dir.path(), 0);
        BatchOrchestrator::new(config)
            .run_with(&AtomicBool::new(false), |p| snapshots.push(p.clone()))
            .unwrap();
        let done: Vec<usize> = snapshots.iter().map(|p| p.files_done).collect();
        assert_eq!(done, vec![0, 1, 2]);
        assert_eq!(snapshots[2].current_file.as_deref(), Some("House_D_b.mid"));
    }
}
