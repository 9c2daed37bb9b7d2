use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or querying the configuration map.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration path not set (CONFIG_PATH)")]
    PathNotSet,
    #[error("cannot read configuration at {path}: {source}")]
    Unreachable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed configuration: {0}")]
    Malformed(#[from] csv::Error),
    #[error("duplicate configuration key '{0}'")]
    DuplicateKey(String),
    #[error("missing configuration key '{0}'")]
    MissingKey(String),
    #[error("configuration key '{key}' must be a non-negative integer, got '{value}'")]
    NotANumber { key: String, value: String },
}

/// Errors raised while stopping a managed resource.
#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("failed to stop {name}: {source}")]
    StopFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Other(String),
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
