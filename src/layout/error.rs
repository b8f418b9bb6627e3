use thiserror::Error;

use super::types::PinId;

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    /// Reset needs at least one silhouette point to seed pins from.
    #[error("no silhouette data: the intensity grid produced no points above threshold")]
    NoSilhouetteData,

    #[error("invalid config `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("intensity grid size mismatch: expected {expected} cells, got {actual}")]
    GridSizeMismatch { expected: usize, actual: usize },

    #[error("unknown pin {0:?}")]
    UnknownPin(PinId),

    #[error("invalid bubble: {0}")]
    InvalidBubble(String),

    #[error("a bubble needs at least one pin")]
    EmptyPinSet,
}

impl LayoutError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        LayoutError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LayoutError>;
