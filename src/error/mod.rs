//! Errors for the parts of facetstore that touch the outside world. Store operations themselves
//! never fail; everything here comes from persistence, configuration, logging setup or compiling
//! a search pattern.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The type handed back to a caller that wants a printable error, e.g. the command line front end
/// when it is asked for JSON output
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// The human-readable message given back
    pub message: String,
}

impl ErrorResponse {
    /// Create an error response from anything that implements ToString
    pub fn new<M: ToString>(message: M) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl From<Error> for ErrorResponse {
    fn from(err: Error) -> Self {
        Self::new(err)
    }
}

/// facetstore's base error types
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing persisted state failed
    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),
    /// The settings file or environment could not be turned into [`crate::settings::Settings`]
    #[error("Invalid Configuration: {0}")]
    ConfigError(#[from] config::ConfigError),
    /// When an invalid log config is provided
    #[error("Error Deserializing Log Config: '{0}'")]
    TomlError(#[from] toml::de::Error),
    /// Any error related to serde_json
    #[error("Error Parsing Json: '{0}'")]
    JsonError(#[from] serde_json::Error),
    /// A search pattern handed to [`crate::Pattern::regex`] did not compile
    #[error("Invalid Pattern: '{0}'")]
    RegexError(#[from] regex::Error),
    /// The logger could not be built from its config
    #[error("Logging Error: '{0}'")]
    LogError(String),
}

impl From<sloggers::Error> for Error {
    fn from(err: sloggers::Error) -> Self {
        Error::LogError(err.to_string())
    }
}

impl From<log::SetLoggerError> for Error {
    fn from(err: log::SetLoggerError) -> Self {
        Error::LogError(err.to_string())
    }
}
