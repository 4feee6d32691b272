//! Error types for the mail client.

use thiserror::Error;

/// Result type alias for mail operations.
pub type Result<T> = std::result::Result<T, MailError>;

/// Errors that can occur while fetching mail.
///
/// A failed fetch is always an error, never an empty message list; "no mail
/// that day" is `Ok(vec![])`.
#[derive(Error, Debug)]
pub enum MailError {
    /// No access token configured.
    #[error("mail access token missing")]
    MissingCredential,

    /// The mail API rejected the request.
    #[error("mail API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    /// HTTP transport error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
