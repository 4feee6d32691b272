//! Normalizing mail records into indexable documents.

use chrono::SecondsFormat;
use mailrag_mail_client::MessageRecord;
use serde::{Deserialize, Serialize};

/// Placeholder for a missing subject.
const NO_SUBJECT: &str = "No Subject";

/// Placeholder for a missing sender or timestamp.
const UNKNOWN: &str = "Unknown";

/// A normalized text document derived from one mail record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailDocument {
    /// Canonical text representation of the message.
    pub content: String,

    /// Sender address, kept for display alongside retrieved chunks.
    pub source: Option<String>,
}

/// Convert a mail record into its canonical text form.
///
/// Pure and deterministic. All four fields are always rendered in the same
/// order, with fixed placeholders for missing values, because the layout
/// decides chunk boundaries and therefore retrieval quality.
pub fn normalize(record: &MessageRecord) -> MailDocument {
    let subject = record.subject.as_deref().unwrap_or(NO_SUBJECT);
    let sender = record.sender_address().unwrap_or(UNKNOWN);
    let received = record
        .received_at
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| UNKNOWN.to_string());

    let content = format!(
        "Subject: {subject}\nFrom: {sender}\nReceived: {received}\n\nBody: {}",
        record.body_preview
    );

    MailDocument {
        content,
        source: record.sender_address().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_full_record() {
        let record = MessageRecord::new(
            "Meeting",
            "a@x.com",
            Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            "Project sync at 3pm",
        );

        let doc = normalize(&record);
        assert_eq!(
            doc.content,
            "Subject: Meeting\nFrom: a@x.com\nReceived: 2024-01-01T10:00:00Z\n\nBody: Project sync at 3pm"
        );
        assert_eq!(doc.source.as_deref(), Some("a@x.com"));
    }

    #[test]
    fn test_normalize_never_omits_fields() {
        let record: MessageRecord = serde_json::from_value(serde_json::json!({})).unwrap();

        let doc = normalize(&record);
        assert_eq!(
            doc.content,
            "Subject: No Subject\nFrom: Unknown\nReceived: Unknown\n\nBody: "
        );
        assert_eq!(doc.source, None);
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let record = MessageRecord::new(
            "Hi",
            "b@y.com",
            Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap(),
            "body",
        );

        assert_eq!(normalize(&record), normalize(&record));
    }
}
