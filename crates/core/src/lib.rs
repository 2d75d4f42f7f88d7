//! Core logic for Contact Relay.
//!
//! This crate contains the submission pipeline with ZERO web dependencies.
//!
//! # Modules
//!
//! - `storage` - Staging uploaded attachments on local disk
//! - `mail` - Message composition and SMTP dispatch
//! - `submission` - The per-request pipeline tying the two together

pub mod mail;
pub mod storage;
pub mod submission;
