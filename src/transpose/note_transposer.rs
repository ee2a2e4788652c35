use crate::TransposeError;
use midly::num::u7;
use midly::{MidiMessage, TrackEvent, TrackEventKind};

/// Highest MIDI note number
pub const MAX_NOTE: i32 = 127;

/// What to do with a note shifted outside of `0..=127`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PitchPolicy {
    /// No validation: an out-of-range result wraps modulo 128 (130 is written as 2)
    /// and is counted in [`TransposeSummary::out_of_range`].
    #[default]
    Unchecked,
    /// Clamp to the nearest valid note.
    Clamp,
    /// Fail with [`TransposeError::PitchOutOfRange`].
    Reject,
}

/// Outcome of transposing a sequence of events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransposeSummary {
    /// Number of note-on/note-off events shifted
    pub notes: usize,
    /// Number of shifted notes that left the MIDI note range
    pub out_of_range: usize,
}

/// Shift a single note number according to `policy`.
///
/// Returns the new key and whether the shifted value left the MIDI range.
pub fn shift_key(
    key: u7,
    semitones: i32,
    policy: PitchPolicy,
) -> Result<(u7, bool), TransposeError> {
    let shifted = i32::from(key.as_int()).saturating_add(semitones);
    let in_range = (0..=MAX_NOTE).contains(&shifted);
    let value = match policy {
        _ if in_range => shifted,
        PitchPolicy::Unchecked => shifted.rem_euclid(MAX_NOTE + 1),
        PitchPolicy::Clamp => shifted.clamp(0, MAX_NOTE),
        PitchPolicy::Reject => return Err(TransposeError::PitchOutOfRange(shifted)),
    };
    Ok((u7::new(value as u8), !in_range))
}

/// Shift the key of every note-on and note-off event by `semitones`.
///
/// Every other event, delta times and ordering included, is left untouched.
/// With [`PitchPolicy::Reject`] the events may be partially shifted when an error is returned.
pub fn transpose_events(
    events: &mut [TrackEvent<'_>],
    semitones: i32,
    policy: PitchPolicy,
) -> Result<TransposeSummary, TransposeError> {
    let mut summary = TransposeSummary::default();
    if semitones == 0 {
        summary.notes = events.iter().filter(|e| is_note_event(e)).count();
        return Ok(summary);
    }
    for event in events.iter_mut() {
        if let TrackEventKind::Midi {
            message: MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. },
            ..
        } = &mut event.kind
        {
            let (shifted, out_of_range) = shift_key(*key, semitones, policy)?;
            *key = shifted;
            summary.notes += 1;
            if out_of_range {
                summary.out_of_range += 1;
            }
        }
    }
    Ok(summary)
}

/// Note-on or note-off, whatever the channel.
pub const fn is_note_event(event: &TrackEvent<'_>) -> bool {
    matches!(
        event.kind,
        TrackEventKind::Midi {
            message: MidiMessage::NoteOn { .. } | MidiMessage::NoteOff { .. },
            ..
        }
    )
}
