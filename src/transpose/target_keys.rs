use crate::transpose::pitch_class::{Key, PitchClass};
use std::ops::Range;

/// Raw offsets visited by the windowed mode, before the configured shift.
pub const OFFSET_WINDOW: Range<i32> = -6..6;

/// Largest windowed shift accepted by a batch, any larger moves every note out of range.
pub const MAX_PITCH_OFFSET: i32 = 127;

/// How the set of target keys is chosen for a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMode {
    /// Every pitch class from `C` to `B`, reached by the signed difference to the source.
    FullChromatic,
    /// Offsets `-6..6`, each shifted by `pitch_offset`.
    Windowed { pitch_offset: i32 },
}

/// One key to generate from a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransposeTarget {
    pub pitch_class: PitchClass,
    pub semitone_offset: i32,
    pub is_minor: bool,
}

impl TransposeTarget {
    pub const fn key(&self) -> Key {
        Key::new(self.pitch_class, self.is_minor)
    }
}

/// Generates the ordered target set for a source key.
///
/// The minor flag of the source is carried over to every target.
/// Windowed targets are not deduplicated. Offsets saturate at the `i32` bounds.
pub fn generate_targets(source: Key, mode: TargetMode) -> Vec<TransposeTarget> {
    let is_minor = source.is_minor;
    let source_value = source.pitch_class.value();
    match mode {
        TargetMode::FullChromatic => PitchClass::all()
            .map(|pitch_class| TransposeTarget {
                pitch_class,
                semitone_offset: pitch_class.value() - source_value,
                is_minor,
            })
            .collect(),
        TargetMode::Windowed { pitch_offset } => OFFSET_WINDOW
            .map(|raw_offset| {
                let semitone_offset = raw_offset.saturating_add(pitch_offset);
                TransposeTarget {
                    pitch_class: source.pitch_class.shifted(semitone_offset),
                    semitone_offset,
                    is_minor,
                }
            })
            .collect(),
    }
}
