use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Function '{name}' is listed in both `{first}` and `{second}`")]
    Overlap {
        name: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("Invalid `{anchor}` anchor pattern: {source}")]
    InvalidPattern {
        anchor: &'static str,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Error)]
pub enum CodemodError {
    #[error("Edit {start}..{end} is outside the source text (length {len})")]
    EditOutOfBounds { start: usize, end: usize, len: usize },

    #[error("Edit {start}..{end} does not fall on a character boundary")]
    EditNotOnCharBoundary { start: usize, end: usize },

    #[error("Edits {first:?} and {second:?} overlap")]
    OverlappingEdits {
        first: (usize, usize),
        second: (usize, usize),
    },

    #[error("Step `{step}` failed")]
    Step {
        step: &'static str,
        #[source]
        source: Box<CodemodError>,
    },
}

pub type Result<T> = std::result::Result<T, CodemodError>;
