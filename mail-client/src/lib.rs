//! # Mail Client
//!
//! Fetches one calendar day of messages from a Microsoft Graph style mail
//! API. The rest of the pipeline only sees [`MessageRecord`] values; this
//! crate owns the wire shape and the date-window query.

pub mod client;
pub mod error;
pub mod message;

pub use client::MailClient;
pub use error::{MailError, Result};
pub use message::MessageRecord;
