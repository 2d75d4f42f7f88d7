//! Dispatch error types.

use std::time::Duration;

use relay_shared::AppError;
use thiserror::Error;

/// Email dispatch errors.
///
/// The `Display` text of each variant is what the client sees.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A sender or recipient address could not be parsed.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// The MIME message could not be assembled.
    #[error("Failed to build email: {0}")]
    Build(String),

    /// A staged attachment could not be read.
    #[error("Attachment unreadable: {0}")]
    Attachment(String),

    /// The transport refused the connection, the credentials or the message.
    #[error("{0}")]
    Transport(String),

    /// The transport did not answer in time.
    #[error("Email transport timed out after {0:?}")]
    Timeout(Duration),
}

impl DispatchError {
    /// Create a transport error.
    #[must_use]
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Client-facing description of the failure.
    #[must_use]
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        Self::ExternalService(err.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_is_raw() {
        assert_eq!(
            DispatchError::transport("auth rejected").describe(),
            "auth rejected"
        );
    }

    #[test]
    fn test_dispatch_error_display() {
        assert_eq!(
            DispatchError::InvalidAddress("nope".into()).describe(),
            "Invalid email address: nope"
        );
        assert_eq!(
            DispatchError::Build("msg".into()).describe(),
            "Failed to build email: msg"
        );
        assert_eq!(
            DispatchError::Attachment("notes.txt".into()).describe(),
            "Attachment unreadable: notes.txt"
        );
        assert_eq!(
            DispatchError::Timeout(Duration::from_secs(30)).describe(),
            "Email transport timed out after 30s"
        );
    }

    #[test]
    fn test_into_app_error() {
        let err: AppError = DispatchError::transport("auth rejected").into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.message(), "auth rejected");
    }
}
