//! Builds the outbound message for a contact-form submission.

use relay_shared::MailConfig;

use super::types::{ComposedMessage, MailAttachment};
use crate::submission::Submission;

/// Compose the email for a submission.
///
/// Pure and infallible: absent fields are empty strings and render as empty
/// interpolations. Field values are embedded verbatim unless
/// `settings.escape_html` is set, in which case the HTML body (only) is
/// escaped.
#[must_use]
pub fn compose(submission: &Submission, settings: &MailConfig) -> ComposedMessage {
    let fields = &submission.fields;

    let from = match fields.email.trim() {
        "" => settings.default_sender.clone(),
        email => email.to_string(),
    };

    let subject = format!(
        "{} - Contact form from {} {}",
        settings.site_name, fields.first_name, fields.last_name
    );

    let text_body = format!(
        "First Name: {}\nLast Name: {}\nEmail: {}\nPostal Code: {}\nMessage: {}\n",
        fields.first_name, fields.last_name, fields.email, fields.postal_code, fields.message
    );

    let html = |value: &str| {
        if settings.escape_html {
            ammonia::clean_text(value)
        } else {
            value.to_string()
        }
    };
    let html_body = format!(
        "<h2>Customer Message - {}</h2>\n\
         <p><strong>First Name:</strong> {}</p>\n\
         <p><strong>Last Name:</strong> {}</p>\n\
         <p><strong>Email:</strong> {}</p>\n\
         <p><strong>Postal Code:</strong> {}</p>\n\
         <p><strong>Message:</strong><br/>{}</p>\n",
        html(&settings.site_name),
        html(&fields.first_name),
        html(&fields.last_name),
        html(&fields.email),
        html(&fields.postal_code),
        html(&fields.message),
    );

    let attachments = submission
        .attachment
        .iter()
        .map(|staged| MailAttachment {
            filename: staged.original_name.clone(),
            path: staged.storage_path.clone(),
        })
        .collect();

    ComposedMessage {
        from,
        to: settings.recipient.clone(),
        subject,
        text_body,
        html_body,
        attachments,
    }
}
