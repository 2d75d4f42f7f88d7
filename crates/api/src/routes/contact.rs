//! Contact form route.
//!
//! `POST /send-email` accepts `multipart/form-data` (text fields plus an
//! optional `file` part), `application/json` or
//! `application/x-www-form-urlencoded`, and relays the submission by email.

use axum::{
    Form, Json, Router,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State, multipart::MultipartError},
    http::{StatusCode, header::CONTENT_TYPE},
    response::Response,
    routing::post,
};
use relay_core::storage::StagedGuard;
use relay_core::submission::{ContactFields, Submission, SubmissionService};
use relay_shared::AppError;
use tracing::{debug, error};

use crate::AppState;
use crate::response::{failure, sent};

/// Name of the multipart part carrying the attachment.
const FILE_FIELD: &str = "file";

/// Creates the contact form routes.
pub fn routes(body_limit: usize) -> Router<AppState> {
    Router::new().route(
        "/send-email",
        post(send_email).layer(DefaultBodyLimit::max(body_limit)),
    )
}

/// POST `/send-email`
/// Relay a contact form submission to the configured recipient.
async fn send_email(State(state): State<AppState>, request: Request) -> Response {
    let submission = match read_submission(&state, request).await {
        Ok(submission) => submission,
        Err(err) => return failure(&err),
    };

    match state.submissions.submit(submission).await {
        Ok(()) => sent(),
        Err(e) => {
            error!(error = %e, "Failed to send contact form email");
            failure(&AppError::from(e))
        }
    }
}

/// Parse the request body according to its content type.
async fn read_submission(state: &AppState, request: Request) -> Result<Submission, AppError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "multipart/form-data" => {
            let multipart = Multipart::from_request(request, state)
                .await
                .map_err(|r| rejection(r.status(), r.body_text()))?;
            read_multipart(&state.submissions, multipart).await
        }
        "application/json" => {
            let Json(fields) = Json::<ContactFields>::from_request(request, state)
                .await
                .map_err(|r| rejection(r.status(), r.body_text()))?;
            Ok(Submission::new(fields, None))
        }
        "application/x-www-form-urlencoded" => {
            let Form(fields) = Form::<ContactFields>::from_request(request, state)
                .await
                .map_err(|r| rejection(r.status(), r.body_text()))?;
            Ok(Submission::new(fields, None))
        }
        "" => Err(AppError::UnsupportedMediaType(
            "Unsupported content type: none".to_string(),
        )),
        other => Err(AppError::UnsupportedMediaType(format!(
            "Unsupported content type: {other}"
        ))),
    }
}

/// Read every part, staging the attachment as it arrives.
///
/// A staged file is removed again if a later part cannot be read or the
/// request is abandoned before parsing finishes.
async fn read_multipart(
    submissions: &SubmissionService,
    mut multipart: Multipart,
) -> Result<Submission, AppError> {
    let mut fields = ContactFields::default();
    let mut attachment = None;

    let result = read_parts(submissions, &mut multipart, &mut fields, &mut attachment).await;
    if let Err(err) = result {
        if let Some(guard) = attachment.take() {
            guard.release().await;
        }
        return Err(err);
    }

    Ok(Submission::new(fields, attachment.map(StagedGuard::disarm)))
}

async fn read_parts(
    submissions: &SubmissionService,
    multipart: &mut Multipart,
    fields: &mut ContactFields,
    attachment: &mut Option<StagedGuard>,
) -> Result<(), AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == FILE_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await.map_err(multipart_error)?;

            // Browsers send an empty, unnamed part when no file was chosen.
            if file_name.is_empty() {
                continue;
            }
            if attachment.is_some() {
                return Err(AppError::Validation(format!(
                    "Unexpected field: {FILE_FIELD}"
                )));
            }
            let staged = submissions.stage_attachment(data, &file_name).await?;
            *attachment = Some(submissions.guard(staged));
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            if !fields.set(&name, value) {
                debug!(field = %name, "Ignoring unknown form field");
            }
        }
    }
    Ok(())
}

fn multipart_error(err: MultipartError) -> AppError {
    rejection(err.status(), err.body_text())
}

fn rejection(status: StatusCode, text: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(text)
    } else {
        AppError::Validation(text)
    }
}
