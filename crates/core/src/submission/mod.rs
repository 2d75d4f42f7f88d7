//! Contact-form submission pipeline.
//!
//! Each request moves through the same linear sequence:
//! received → composing → dispatching → cleanup → responding.
//! There are no retries; the staged attachment is removed whether or not
//! the transport accepted the message.

mod error;
mod service;
mod types;

pub use error::SubmissionError;
pub use service::SubmissionService;
pub use types::{ContactFields, Submission};
