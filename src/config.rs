use std::{
    fs::{create_dir_all, File},
    io::{BufReader, Write},
    path::PathBuf,
};

use home::home_dir;
use midi_key_transposer::TransposeError;
use serde::{Deserialize, Serialize};

/// Values remembered between runs.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    source_folder: Option<PathBuf>,
    dest_folder: Option<PathBuf>,
    pitch_offset: Option<i32>,
}

impl Config {
    // folder placed in $HOME directory
    const FOLDER: &'static str = ".midi-key-transposer";

    pub fn get_source_folder(&self) -> Option<PathBuf> {
        self.source_folder.clone()
    }

    pub fn get_dest_folder(&self) -> Option<PathBuf> {
        self.dest_folder.clone()
    }

    pub const fn get_pitch_offset(&self) -> Option<i32> {
        self.pitch_offset
    }

    /// Saves the config only if something changed.
    pub fn remember(
        &mut self,
        source_folder: PathBuf,
        dest_folder: PathBuf,
        pitch_offset: Option<i32>,
    ) -> Result<(), TransposeError> {
        let updated = Self {
            source_folder: Some(source_folder),
            dest_folder: Some(dest_folder),
            pitch_offset: pitch_offset.or(self.pitch_offset),
        };
        if *self == updated {
            // no op
            Ok(())
        } else {
            *self = updated;
            self.save_config()
        }
    }

    fn get_base_path() -> Result<PathBuf, TransposeError> {
        let home = home_dir().ok_or_else(|| {
            TransposeError::ConfigError("Could not find home directory".to_string())
        })?;
        Ok(home.join(Self::FOLDER))
    }

    fn get_path() -> Result<PathBuf, TransposeError> {
        let base = Self::get_base_path()?;
        Ok(base.join("config.json"))
    }

    /// Creates config if it does not exist
    pub fn read_config() -> Result<Self, TransposeError> {
        let base_path = Self::get_base_path()?;
        if !base_path.exists() {
            create_dir_all(base_path)?;
        }
        let config_path = Self::get_path()?;
        if !config_path.exists() {
            // create empty config
            Self::default().save_config()?;
        }
        let file = File::open(config_path)?;
        let reader = BufReader::new(file);
        let config: Self = serde_json::from_reader(reader).map_err(|err| {
            TransposeError::ConfigError(format!("Could not read local configuration {err:}"))
        })?;
        Ok(config)
    }

    /// Assumes the config folder exists
    pub fn save_config(&self) -> Result<(), TransposeError> {
        let config_path = Self::get_path()?;
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            TransposeError::ConfigError(format!("Could not save local configuration {err:}"))
        })?;
        let mut file = File::create(config_path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
