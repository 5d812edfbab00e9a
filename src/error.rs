//! Error types and handling for the `RainAlert` service

use thiserror::Error;

/// Main error type for the `RainAlert` service
#[derive(Error, Debug)]
pub enum RainAlertError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Forecast page could not be retrieved
    #[error("Fetch error: {message}")]
    Fetch { message: String },

    /// Input data (branch file, forecast page, stored row) could not be understood
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// SQLite persistence errors
    #[error("Storage error: {source}")]
    Storage {
        #[from]
        source: rusqlite::Error,
    },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// CSV or notification export errors
    #[error("Export error: {message}")]
    Export { message: String },
}

impl RainAlertError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new fetch error
    pub fn fetch<S: Into<String>>(message: S) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new export error
    pub fn export<S: Into<String>>(message: S) -> Self {
        Self::Export {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            RainAlertError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            RainAlertError::Fetch { .. } => {
                "Unable to retrieve forecast pages. Please check your internet connection."
                    .to_string()
            }
            RainAlertError::Parse { message } => format!("Invalid data: {message}"),
            RainAlertError::Storage { .. } => {
                "Database operation failed. Check that the database file is writable.".to_string()
            }
            RainAlertError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            RainAlertError::Export { message } => format!("Export failed: {message}"),
        }
    }
}

impl From<reqwest::Error> for RainAlertError {
    fn from(err: reqwest::Error) -> Self {
        RainAlertError::fetch(err.to_string())
    }
}
