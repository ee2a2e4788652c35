//! Loading and saving Standard MIDI Files with `midly`.
//!
//! The raw bytes of a source file are read once. Every transposition parses a fresh
//! container from them, shifts the first track and saves the result.

use crate::transpose::note_transposer::{transpose_events, PitchPolicy, TransposeSummary};
use crate::TransposeError;
use midly::Smf;
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

/// Content of a source MIDI file.
#[derive(Debug, Clone)]
pub struct MidiSource {
    path: PathBuf,
    data: Vec<u8>,
}

impl MidiSource {
    /// Reads and validates a MIDI file.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, TransposeError> {
        let path = path.into();
        let data = std::fs::read(&path).map_err(|err| {
            TransposeError::MidiIo(format!("could not read {}: {err}", path.display()))
        })?;
        let source = Self { path, data };
        let smf = source.parse()?;
        log::debug!(
            "Loaded {:?}: {} track(s), {:?}",
            source.path,
            smf.tracks.len(),
            smf.header.format
        );
        Ok(source)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self) -> Result<Smf<'_>, TransposeError> {
        Smf::parse(&self.data).map_err(|err| {
            TransposeError::MidiIo(format!("could not parse {}: {err}", self.path.display()))
        })
    }

    /// Writes a copy transposed by `semitones` to `dest`, creating its directory if needed.
    ///
    /// Only the note events of the first track are shifted, other tracks are written back as is.
    pub fn transpose_to(
        &self,
        dest: &Path,
        semitones: i32,
        policy: PitchPolicy,
    ) -> Result<TransposeSummary, TransposeError> {
        let mut smf = self.parse()?;
        let summary = match smf.tracks.first_mut() {
            Some(track) => transpose_events(track, semitones, policy)?,
            None => {
                log::warn!("No track to transpose in {:?}", self.path);
                TransposeSummary::default()
            }
        };
        if let Some(dest_dir) = dest.parent() {
            create_dir_all(dest_dir)?;
        }
        smf.save(dest).map_err(|err| {
            TransposeError::MidiIo(format!("could not save {}: {err}", dest.display()))
        })?;
        Ok(summary)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{read_track_keys, write_midi_file};
    use super::*;

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("House_C_broken.mid");
        std::fs::write(&path, b"not a midi file").unwrap();
        assert!(matches!(
            MidiSource::load(&path),
            Err(TransposeError::MidiIo(_))
        ));
        assert!(matches!(
            MidiSource::load(dir.path().join("missing.mid")),
            Err(TransposeError::MidiIo(_))
        ));
    }

    #[test]
    fn test_transpose_first_track_only() {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("House_Gm_loop.mid");
        write_midi_file(&source_path, &[55, 58, 62]);

        let source = MidiSource::load(&source_path).unwrap();
        assert_eq!(source.path(), source_path);
        let dest = dir.path().join("out").join("A#m").join("House_A#m_loop.mid");
        let summary = source.transpose_to(&dest, 3, PitchPolicy::Unchecked).unwrap();
        assert_eq!(summary.notes, 6);
        assert_eq!(summary.out_of_range, 0);

        assert_eq!(read_track_keys(&dest, 0), vec![58, 58, 61, 61, 65, 65]);
        assert_eq!(read_track_keys(&dest, 1), vec![36, 36]);
        // source untouched
        assert_eq!(read_track_keys(&source_path, 0), vec![55, 55, 58, 58, 62, 62]);
    }

    #[test]
    fn test_transpose_keeps_non_note_events() {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("Pop_C_chords.mid");
        write_midi_file(&source_path, &[60, 64]);
        let dest = dir.path().join("Pop_D_chords.mid");
        MidiSource::load(&source_path)
            .unwrap()
            .transpose_to(&dest, 2, PitchPolicy::Unchecked)
            .unwrap();

        let source_data = std::fs::read(&source_path).unwrap();
        let dest_data = std::fs::read(&dest).unwrap();
        let source_smf = Smf::parse(&source_data).unwrap();
        let dest_smf = Smf::parse(&dest_data).unwrap();
        assert_eq!(source_smf.header, dest_smf.header);
        assert_eq!(source_smf.tracks.len(), dest_smf.tracks.len());
        assert_eq!(source_smf.tracks[1], dest_smf.tracks[1]);
        for (source, dest) in source_smf.tracks[0].iter().zip(&dest_smf.tracks[0]) {
            assert_eq!(source.delta, dest.delta);
            if !crate::transpose::note_transposer::is_note_event(source) {
                assert_eq!(source, dest);
            }
        }
    }

    #[test]
    fn test_reject_out_of_range_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("Pop_B_high.mid");
        write_midi_file(&source_path, &[120]);
        let dest = dir.path().join("out").join("Pop_F_high.mid");
        let result = MidiSource::load(&source_path)
            .unwrap()
            .transpose_to(&dest, 10, PitchPolicy::Reject);
        assert!(matches!(result, Err(TransposeError::PitchOutOfRange(130))));
        assert!(!dest.exists());
    }
}
