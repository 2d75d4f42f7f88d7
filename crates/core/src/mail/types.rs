//! Mail types.

use std::path::PathBuf;

/// An attachment reference inside a composed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAttachment {
    /// Filename presented to the recipient.
    pub filename: String,
    /// Where the content is read from at dispatch time.
    pub path: PathBuf,
}

/// A message ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub text_body: String,
    /// HTML body.
    pub html_body: String,
    /// Zero or one attachments.
    pub attachments: Vec<MailAttachment>,
}
