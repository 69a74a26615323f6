use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("missing required config value: {0}")]
    MissingRequiredValue(String),

    #[error("value at '{path}' is not appendable (found {found})")]
    NotAppendable { path: String, found: &'static str },

    #[error("cannot assign a {found}, expected a table")]
    InvalidArgument { found: &'static str },

    #[error("cannot traverse '{segment}' in '{path}': found {found}")]
    NotTraversable {
        path: String,
        segment: String,
        found: &'static str,
    },

    #[error("index {index} out of bounds in '{path}' (length {len})")]
    IndexOutOfBounds {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("config module not found: {0}")]
    ModuleNotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to deserialize config at '{path}': {source}")]
    Deserialize {
        path: String,
        source: toml::de::Error,
    },
}
