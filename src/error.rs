use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BindError {
    #[error("Unsupported field type '{type_name}' for binding '{key}'")]
    UnsupportedField {
        key: String,
        type_name: &'static str,
    },

    #[error("Invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Command line error: {0}")]
    Flags(#[from] clap::Error),

    #[error("Flag '{0}' is bound to more than one field")]
    DuplicateFlag(String),

    #[error("Flag '{name}' does not match its registration: {reason}")]
    LookupMismatch { name: String, reason: String },

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    JsonError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl BindError {
    /// True when the command line asked for help or version output rather
    /// than failing. Callers usually print the error and exit successfully.
    pub fn is_display_request(&self) -> bool {
        matches!(
            self,
            BindError::Flags(err) if matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            )
        )
    }
}
