//! Attachment staging using Apache OpenDAL.
//!
//! Uploaded files are written to a local staging directory so the email
//! transport can read them, and removed again once the dispatch attempt is
//! over.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              Apache OpenDAL (fs)              │
//! ├──────────────────────────────────────────────┤
//! │ op.write("{millis}-{nonce}-{name}", data)     │
//! │ op.delete("{millis}-{nonce}-{name}")          │
//! └──────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod guard;
mod service;

pub use config::StagingConfig;
pub use error::StorageError;
pub use guard::StagedGuard;
pub use service::{FileStager, StagedFile};
