//! Error types and handling for HandsUp

use thiserror::Error;

/// Main error type for HandsUp
#[derive(Error, Debug)]
pub enum HandsUpError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A record looked up by id does not exist
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Key-value storage errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// A warning feed URL could not be used
    #[error("Invalid endpoint: {url}")]
    InvalidEndpoint { url: String },

    /// Transport failures, timeouts and non-success responses
    #[error("Network error: {message}")]
    Network { message: String },

    /// A feed payload could not be decoded
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl HandsUpError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn invalid_endpoint<S: Into<String>>(url: S) -> Self {
        Self::InvalidEndpoint { url: url.into() }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            HandsUpError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            HandsUpError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            HandsUpError::NotFound { message } => message.clone(),
            HandsUpError::Storage { .. } => {
                "Saved data could not be read or written. Changes may not persist.".to_string()
            }
            HandsUpError::InvalidEndpoint { url } => {
                format!("Warning service address is invalid: {url}")
            }
            HandsUpError::Network { .. } => {
                "Unable to reach the warning service. Please check your internet connection."
                    .to_string()
            }
            HandsUpError::Parse { .. } => {
                "The warning service returned data that could not be read.".to_string()
            }
            HandsUpError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<serde_json::Error> for HandsUpError {
    fn from(err: serde_json::Error) -> Self {
        HandsUpError::storage(err.to_string())
    }
}
