use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimerError {
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    #[error("ambiguous time format: {0:?}. Use 24h (01:30) or 12h (1:30AM/PM)")]
    AmbiguousTimeFormat(String),

    #[error(
        "unable to parse time {0:?}. Supported formats: 15:04, 3:04PM, 3:04pm, 15:04:05, 3:04:05PM, 3:04:05pm"
    )]
    UnsupportedTimeFormat(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("failed run: {command:?}: {reason}")]
    Hook { command: String, reason: String },

    #[error("failed to read config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

pub type Result<T, E = TimerError> = std::result::Result<T, E>;
