use crate::parser::key_parser::resolve_key;
use crate::transpose::pitch_class::Key;
use crate::TransposeError;
use std::path::{Path, PathBuf};

const SEPARATOR: char = '_';

/// Structured file name `{style}_{key}[_{rest}...][.{extension}]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFilename {
    pub style: String,
    pub key_token: String,
    pub remainder: Vec<String>,
    pub extension: Option<String>,
}

impl ParsedFilename {
    /// Splits the extension off, then splits the stem on `_`.
    pub fn decode(file_name: &str) -> Result<Self, TransposeError> {
        let (stem, extension) = match file_name.rsplit_once('.') {
            Some((stem, extension)) if !stem.is_empty() => (stem, Some(extension.to_string())),
            _ => (file_name, None),
        };
        let mut parts = stem.split(SEPARATOR).map(str::to_string);
        let (Some(style), Some(key_token)) = (parts.next(), parts.next()) else {
            return Err(TransposeError::MalformedFilename(file_name.to_string()));
        };
        Ok(Self {
            style,
            key_token,
            remainder: parts.collect(),
            extension,
        })
    }

    /// Decodes the file name part of `path`.
    pub fn decode_path(path: &Path) -> Result<Self, TransposeError> {
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .ok_or_else(|| TransposeError::MalformedFilename(path.display().to_string()))?;
        Self::decode(file_name)
    }

    /// Key embedded in the file name.
    pub fn key(&self) -> Result<Key, TransposeError> {
        resolve_key(&self.key_token)
    }
}

/// Builds `{style}_{key_label}[_{remainder}][.{extension}]`.
pub fn encode_file_name(
    style: &str,
    key_label: &str,
    remainder: &[String],
    extension: Option<&str>,
) -> String {
    let mut file_name = format!("{style}{SEPARATOR}{key_label}");
    for part in remainder {
        file_name.push(SEPARATOR);
        file_name.push_str(part);
    }
    if let Some(extension) = extension {
        file_name.push('.');
        file_name.push_str(extension);
    }
    file_name
}

/// Lowercase everything, then uppercase the first letter (`HOUSE` -> `House`).
pub fn normalize_style(style: &str) -> String {
    let lower = style.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => lower,
    }
}

/// How output files and their directories are named.
///
/// The two variants carry historically different conventions and must stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingPolicy {
    /// Style kept verbatim, one `{PitchClass}/` directory per tonic, minor or not.
    FullChromatic,
    /// Style normalized, one `{Style}_{KeyLabel}/` directory per key.
    Windowed,
}

impl NamingPolicy {
    pub fn style(self, style: &str) -> String {
        match self {
            Self::FullChromatic => style.to_string(),
            Self::Windowed => normalize_style(style),
        }
    }

    pub fn file_name(self, parsed: &ParsedFilename, key: &Key) -> String {
        encode_file_name(
            &self.style(&parsed.style),
            &key.label(),
            &parsed.remainder,
            parsed.extension.as_deref(),
        )
    }

    pub fn directory_name(self, parsed: &ParsedFilename, key: &Key) -> String {
        match self {
            Self::FullChromatic => key.pitch_class.name().to_string(),
            Self::Windowed => format!("{}{SEPARATOR}{}", self.style(&parsed.style), key.label()),
        }
    }

    /// Full output path below `dest_root`.
    pub fn destination(self, dest_root: &Path, parsed: &ParsedFilename, key: &Key) -> PathBuf {
        dest_root
            .join(self.directory_name(parsed, key))
            .join(self.file_name(parsed, key))
    }
}
