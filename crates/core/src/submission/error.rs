//! Submission error types.

use relay_shared::AppError;
use thiserror::Error;

use crate::mail::DispatchError;
use crate::storage::StorageError;

/// Submission pipeline errors.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// Staging the attachment failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The transport did not accept the message.
    #[error("dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
}

impl SubmissionError {
    /// Client-facing description of the failure.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Storage(err) => err.describe(),
            Self::Dispatch(err) => err.describe(),
        }
    }
}

impl From<SubmissionError> for AppError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Storage(err) => err.into(),
            SubmissionError::Dispatch(err) => err.into(),
        }
    }
}
