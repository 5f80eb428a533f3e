//! Error types and handling for Thermolog
//!
//! This module defines the error types used throughout the poller. Each
//! variant maps to one failure class of a poll run; `is_fatal` tells the
//! caller whether the run must abort or only the current device is affected.

use thiserror::Error;

/// Result type alias for Thermolog operations
pub type Result<T> = std::result::Result<T, PollerError>;

/// Main error type for Thermolog
#[derive(Debug, Error)]
pub enum PollerError {
    /// Configuration file missing, unreadable or malformed
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Configuration field failed validation
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// OAuth refresh-token exchange failed
    #[error("Authentication error: {message}")]
    Auth { message: String },

    /// Device listing failed; nothing can be polled
    #[error("Device list error: {message}")]
    DeviceList { message: String },

    /// Trait fetch for a single device failed
    #[error("Device fetch error for {device}: {message}")]
    DeviceFetch { device: String, message: String },

    /// Outdoor temperature lookup failed
    #[error("Weather error: {message}")]
    Weather { message: String },

    /// Appending a row to a device log failed
    #[error("CSV write error for {path}: {message}")]
    CsvWrite { path: String, message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Network-related errors
    #[error("Network error: {message}")]
    Network { message: String },
}

impl PollerError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        PollerError::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        PollerError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new auth error
    pub fn auth<S: Into<String>>(message: S) -> Self {
        PollerError::Auth {
            message: message.into(),
        }
    }

    /// Create a new device listing error
    pub fn device_list<S: Into<String>>(message: S) -> Self {
        PollerError::DeviceList {
            message: message.into(),
        }
    }

    /// Create a new per-device fetch error
    pub fn device_fetch<D: Into<String>, S: Into<String>>(device: D, message: S) -> Self {
        PollerError::DeviceFetch {
            device: device.into(),
            message: message.into(),
        }
    }

    /// Create a new weather error
    pub fn weather<S: Into<String>>(message: S) -> Self {
        PollerError::Weather {
            message: message.into(),
        }
    }

    /// Create a new CSV write error
    pub fn csv_write<P: Into<String>, S: Into<String>>(path: P, message: S) -> Self {
        PollerError::CsvWrite {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        PollerError::Io {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        PollerError::Network {
            message: message.into(),
        }
    }

    /// Whether this error must abort the whole run.
    ///
    /// Device fetch, weather and CSV write failures only affect one device
    /// (or one enrichment field) and are logged while the run continues.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            PollerError::DeviceFetch { .. }
                | PollerError::Weather { .. }
                | PollerError::CsvWrite { .. }
        )
    }
}

impl From<std::io::Error> for PollerError {
    fn from(err: std::io::Error) -> Self {
        PollerError::io(err.to_string())
    }
}

impl From<serde_json::Error> for PollerError {
    fn from(err: serde_json::Error) -> Self {
        PollerError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for PollerError {
    fn from(err: csv::Error) -> Self {
        PollerError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for PollerError {
    fn from(err: reqwest::Error) -> Self {
        PollerError::network(err.to_string())
    }
}

impl From<chrono::ParseError> for PollerError {
    fn from(err: chrono::ParseError) -> Self {
        PollerError::validation("datetime", &err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = PollerError::config("test config error");
        assert!(matches!(err, PollerError::Config { .. }));

        let err = PollerError::device_fetch("enterprises/p/devices/d1", "HTTP 500");
        assert!(matches!(err, PollerError::DeviceFetch { .. }));

        let err = PollerError::validation("field", "test validation error");
        assert!(matches!(err, PollerError::Validation { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = PollerError::config("test error");
        assert_eq!(format!("{}", err), "Configuration error: test error");

        let err = PollerError::validation("timezone", "unknown zone");
        assert_eq!(format!("{}", err), "Validation error: timezone - unknown zone");

        let err = PollerError::csv_write("logs/hall.csv", "disk full");
        assert_eq!(format!("{}", err), "CSV write error for logs/hall.csv: disk full");
    }

    #[test]
    fn test_fatal_classification() {
        assert!(PollerError::config("x").is_fatal());
        assert!(PollerError::auth("x").is_fatal());
        assert!(PollerError::device_list("x").is_fatal());
        assert!(!PollerError::device_fetch("d", "x").is_fatal());
        assert!(!PollerError::weather("x").is_fatal());
        assert!(!PollerError::csv_write("p", "x").is_fatal());
    }
}
