pub mod job;
pub mod midi_file;
pub mod orchestrator;
