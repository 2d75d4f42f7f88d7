//! Submission pipeline: stage, compose, dispatch, clean up.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use relay_shared::MailConfig;
use tracing::info;

use super::error::SubmissionError;
use super::types::Submission;
use crate::mail::{DispatchError, Mailer, compose};
use crate::storage::{FileStager, StagedFile, StagedGuard};

/// Runs contact-form submissions through the mail pipeline.
pub struct SubmissionService {
    stager: Arc<FileStager>,
    mailer: Arc<dyn Mailer>,
    mail: MailConfig,
    dispatch_timeout: Duration,
}

impl SubmissionService {
    /// Create a new submission service.
    #[must_use]
    pub fn new(
        stager: Arc<FileStager>,
        mailer: Arc<dyn Mailer>,
        mail: MailConfig,
        dispatch_timeout: Duration,
    ) -> Self {
        Self {
            stager,
            mailer,
            mail,
            dispatch_timeout,
        }
    }

    /// Stage an uploaded attachment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is too large or cannot be written.
    pub async fn stage_attachment(
        &self,
        data: Bytes,
        original_name: &str,
    ) -> Result<StagedFile, SubmissionError> {
        Ok(self.stager.stage(data, original_name).await?)
    }

    /// Guard a staged attachment so it is removed unless handed off.
    #[must_use]
    pub fn guard(&self, staged: StagedFile) -> StagedGuard {
        StagedGuard::new(Arc::clone(&self.stager), staged)
    }

    /// Compose and dispatch a submission.
    ///
    /// The staged attachment, if any, is removed after the dispatch attempt
    /// whatever its outcome, including a timeout. If the returned future is
    /// dropped before completing, removal happens in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport rejects the message or does not
    /// answer within the dispatch timeout.
    pub async fn submit(&self, submission: Submission) -> Result<(), SubmissionError> {
        let message = compose(&submission, &self.mail);
        let attachment = submission.attachment.map(|staged| self.guard(staged));

        let outcome =
            match tokio::time::timeout(self.dispatch_timeout, self.mailer.dispatch(&message)).await
            {
                Ok(result) => result,
                Err(_) => Err(DispatchError::Timeout(self.dispatch_timeout)),
            };

        if let Some(guard) = attachment {
            guard.release().await;
        }

        outcome?;

        info!(
            to = %message.to,
            from = %message.from,
            attachments = message.attachments.len(),
            "Contact form email sent"
        );
        Ok(())
    }
}
