//! Message records as returned by the mail API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One fetched mail item.
///
/// Field names follow the Graph message resource (`subject`, `bodyPreview`,
/// `receivedDateTime`, `from.emailAddress.address`). Every field except the
/// body preview may be absent on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Message subject.
    pub subject: Option<String>,

    /// Plain-text preview of the message body.
    #[serde(rename = "bodyPreview", default)]
    pub body_preview: String,

    /// When the message was received.
    #[serde(rename = "receivedDateTime")]
    pub received_at: Option<DateTime<Utc>>,

    /// Sender envelope.
    pub from: Option<Sender>,
}

/// The `from` field of a Graph message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sender {
    /// Nested address object.
    #[serde(rename = "emailAddress")]
    pub email_address: Option<EmailAddress>,
}

/// A name/address pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAddress {
    /// Display name.
    pub name: Option<String>,

    /// SMTP address.
    pub address: Option<String>,
}

impl MessageRecord {
    /// Build a record from flat fields. Mostly useful in tests and demos;
    /// real records come off the wire via serde.
    pub fn new(
        subject: impl Into<String>,
        sender_address: impl Into<String>,
        received_at: DateTime<Utc>,
        body_preview: impl Into<String>,
    ) -> Self {
        Self {
            subject: Some(subject.into()),
            body_preview: body_preview.into(),
            received_at: Some(received_at),
            from: Some(Sender {
                email_address: Some(EmailAddress {
                    name: None,
                    address: Some(sender_address.into()),
                }),
            }),
        }
    }

    /// The sender's SMTP address, if present anywhere in the envelope.
    pub fn sender_address(&self) -> Option<&str> {
        self.from
            .as_ref()
            .and_then(|f| f.email_address.as_ref())
            .and_then(|e| e.address.as_deref())
    }
}
