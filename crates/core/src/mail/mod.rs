//! Mail composition and dispatch.
//!
//! - `compose` turns a submission into a [`ComposedMessage`] (pure, no I/O)
//! - [`Mailer`] submits a composed message to the transport; [`SmtpMailer`]
//!   is the `lettre` implementation

mod composer;
mod dispatcher;
mod error;
mod types;

pub use composer::compose;
#[cfg(test)]
pub use dispatcher::MockMailer;
pub use dispatcher::{Mailer, SmtpMailer, build_message};
pub use error::DispatchError;
pub use types::{ComposedMessage, MailAttachment};
