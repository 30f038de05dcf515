//! Error types.

use std::io;

pub type Result<T> = core::result::Result<T, Error>;

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::IoError(e.to_string())
    }
}

/// Crate-wide error type.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    IoError(String),

    #[error("yaml deserialization error: {0}")]
    YamlDeserError(#[from] serde_yaml::Error),
    #[error("toml deserialization error: {0}")]
    TomlDeserError(#[from] toml::de::Error),
    #[error("json deserialization error: {0}")]
    JsonDeserError(#[from] serde_json::Error),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("invalid run spec: {0}")]
    InvalidRunSpec(String),

    #[error("failed generating configuration file: {0}")]
    FailedGeneratingConfig(String),

    #[error("failed spawning process \"{program}\": {message}")]
    FailedSpawningProcess { program: String, message: String },
    #[error("simulation run \"{title}\" failed: {status}")]
    SimulationFailed {
        title: String,
        status: String,
        code: Option<i32>,
    },
    #[error("optimizer process failed: {status}")]
    OptimizerFailed { status: String, code: Option<i32> },

    #[error("result artifact not found at: {0}")]
    ResultNotFound(String),
    #[error("malformed result artifact: {0}")]
    MalformedResult(String),
    #[error("result artifact doesn't contain group: \"{0}\"")]
    GroupNotFound(String),
    #[error("no column \"{column}\" in group \"{group}\"{hint}")]
    ColumnNotFound {
        group: String,
        column: String,
        hint: String,
    },

    #[error("experiment descriptor not found at: {0}")]
    ManifestNotFound(String),

    #[error("other error: {0}")]
    Other(String),
}
