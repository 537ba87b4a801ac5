use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogError {
    #[error("Query log '{path}' exists but cannot be read: {cause}")]
    Read { path: PathBuf, cause: io::Error },

    #[error("Failed to truncate query log '{path}': {cause}")]
    Truncate { path: PathBuf, cause: io::Error },

    #[error("Failed to read proxy config '{path}': {cause}")]
    ConfigRead { path: PathBuf, cause: io::Error },

    #[error("Failed to parse proxy config '{path}': {cause}")]
    ConfigParse {
        path: PathBuf,
        cause: toml::de::Error,
    },
}

impl LogError {
    /// True for failures reading or truncating an existing log file
    pub fn is_access(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Truncate { .. })
    }
}

pub type Result<T> = std::result::Result<T, LogError>;
