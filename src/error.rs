//! Error handling for bulletin decoding and catalog assembly.
//!
//! Per-event and per-line variants (`MalformedHeader`, `MissingCoordinates`,
//! `MalformedPick`, `InvalidCoordinateString`) are recovered by the caller and
//! counted. File-level variants propagate to the binary.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed header in event {event_index}: {reason}")]
    MalformedHeader { event_index: usize, reason: String },

    #[error("Event {event_index} ({public_id}) has no usable latitude/longitude")]
    MissingCoordinates {
        event_index: usize,
        public_id: String,
    },

    #[error("Malformed pick line: {reason}")]
    MalformedPick { reason: String },

    #[error("Invalid time: {reason}")]
    InvalidTime { reason: String },

    #[error("Invalid coordinate string '{value}'")]
    InvalidCoordinateString { value: String },

    #[error("No velocity layers found in station file")]
    EmptyVelocityModel,

    #[error("Invalid velocity model: {reason}")]
    InvalidVelocityModel { reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization failed: {message}")]
    Serialization { message: String },
}

impl CatalogError {
    pub fn read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFailed {
            path: path.into(),
            source,
        }
    }

    pub fn malformed_header(event_index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedHeader {
            event_index,
            reason: reason.into(),
        }
    }

    pub fn missing_coordinates(event_index: usize, public_id: impl Into<String>) -> Self {
        Self::MissingCoordinates {
            event_index,
            public_id: public_id.into(),
        }
    }

    pub fn malformed_pick(reason: impl Into<String>) -> Self {
        Self::MalformedPick {
            reason: reason.into(),
        }
    }

    pub fn invalid_time(reason: impl Into<String>) -> Self {
        Self::InvalidTime {
            reason: reason.into(),
        }
    }

    pub fn invalid_coordinate_string(value: impl Into<String>) -> Self {
        Self::InvalidCoordinateString {
            value: value.into(),
        }
    }

    pub fn invalid_velocity_model(reason: impl Into<String>) -> Self {
        Self::InvalidVelocityModel {
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
