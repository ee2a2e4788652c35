pub mod note_transposer;
pub mod pitch_class;
pub mod target_keys;
