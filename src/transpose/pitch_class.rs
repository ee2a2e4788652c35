use std::fmt;

/// Number of pitch classes in an octave
pub const PITCH_CLASS_COUNT: i32 = 12;

/// Canonical spelling, sharps only.
const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// One of the 12 pitch classes, always reduced modulo 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: Self = Self(0);

    /// Reduces any signed value into `0..12`.
    pub const fn new(value: i32) -> Self {
        Self(value.rem_euclid(PITCH_CLASS_COUNT) as u8)
    }

    pub const fn value(self) -> i32 {
        self.0 as i32
    }

    pub const fn name(self) -> &'static str {
        PITCH_CLASS_NAMES[self.0 as usize]
    }

    /// Pitch class reached after shifting by `semitones`.
    pub const fn shifted(self, semitones: i32) -> Self {
        Self::new(self.value() + semitones.rem_euclid(PITCH_CLASS_COUNT))
    }

    /// All pitch classes in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..PITCH_CLASS_COUNT).map(Self::new)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A musical key as found in file names: a tonic and a minor flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub pitch_class: PitchClass,
    pub is_minor: bool,
}

impl Key {
    pub const fn new(pitch_class: PitchClass, is_minor: bool) -> Self {
        Self {
            pitch_class,
            is_minor,
        }
    }

    /// Canonical label used in file and directory names (e.g. `G#m`).
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_minor {
            write!(f, "{}m", self.pitch_class)
        } else {
            write!(f, "{}", self.pitch_class)
        }
    }
}
