//! Error taxonomy for the item, progress, and statistics operations.
//!
//! Callers map [`DietError::Validation`] and [`DietError::NotFound`] to different
//! responses (400-like vs 404-like). Storage failures pass through untouched.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DietError {
    /// Caller-supplied input violated a documented constraint.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced identifier does not exist in the store.
    #[error("{0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DietError {
    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    pub(crate) fn item_not_found(id: &str) -> Self {
        Self::NotFound(format!("Item not found: {id}"))
    }

    /// `true` for errors caused by the caller rather than the store.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_))
    }
}

pub type Result<T, E = DietError> = std::result::Result<T, E>;
