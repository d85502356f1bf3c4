//! Location parsing errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LocationError>;

/// Error returned when a string cannot be turned into a [`crate::Location`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location is empty")]
    Empty,

    #[error("Relative location '{0}': expected a scheme or a leading '/'")]
    Relative(String),

    #[error("Malformed location '{input}': {reason}")]
    Malformed { input: String, reason: String },
}

impl LocationError {
    pub(crate) fn malformed(input: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
