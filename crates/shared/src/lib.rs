//! Shared configuration and error types for Contact Relay.
//!
//! This crate provides the pieces every other crate depends on:
//! - Application configuration, loaded once at startup
//! - The application-wide error type and its HTTP status mapping

pub mod config;
pub mod error;

pub use config::{AppConfig, MailConfig, ServerConfig, SmtpConfig, SmtpSecurity, UploadConfig};
pub use error::{AppError, AppResult};
