//! HTTP client for the mail API.

use chrono::{Days, NaiveDate};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{MailError, Result};
use crate::message::MessageRecord;

const DEFAULT_BASE_URL: &str = "https://graph.microsoft.com/v1.0";
const PAGE_SIZE: usize = 100;

/// Client for fetching a day's messages from a Graph-style mail API.
pub struct MailClient {
    /// Bearer access token.
    access_token: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,
}

impl MailClient {
    /// Create a client against the stock Graph endpoint, reading the token
    /// from `GRAPH_ACCESS_TOKEN`.
    pub fn new() -> Self {
        Self {
            access_token: std::env::var("GRAPH_ACCESS_TOKEN").ok(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Set the access token.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Check if the client has a token to send.
    pub fn is_available(&self) -> bool {
        self.access_token.is_some()
    }

    /// Fetch all messages received on the given calendar date.
    ///
    /// Returns `Ok(vec![])` for a day with no mail; any transport or API
    /// failure is an error, never an empty list.
    pub async fn fetch_messages(&self, date: NaiveDate) -> Result<Vec<MessageRecord>> {
        let token = self
            .access_token
            .as_ref()
            .ok_or(MailError::MissingCredential)?;

        let next_day = date.checked_add_days(Days::new(1)).unwrap_or(date);
        let start_of_day = format!("{date}T00:00:00Z");
        let end_of_day = format!("{next_day}T00:00:00Z");

        debug!("Fetching messages for {date}");

        let response = self
            .client
            .get(format!("{}/me/messages", self.base_url))
            .header("Authorization", format!("Bearer {token}"))
            .query(&[
                (
                    "$filter",
                    format!(
                        "receivedDateTime ge {start_of_day} and receivedDateTime lt {end_of_day}"
                    ),
                ),
                (
                    "$select",
                    "subject,bodyPreview,receivedDateTime,from".to_string(),
                ),
                ("$top", PAGE_SIZE.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let page: MessagePage = response.json().await?;
        info!("Fetched {} messages for {date}", page.value.len());

        Ok(page.value)
    }
}

impl Default for MailClient {
    fn default() -> Self {
        Self::new()
    }
}

/// One page of the messages collection.
#[derive(Debug, Deserialize)]
struct MessagePage {
    #[serde(default)]
    value: Vec<MessageRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param_contains};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> MailClient {
        MailClient::new()
            .with_access_token("test-token")
            .with_base_url(server.uri())
    }

    fn test_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_messages_parses_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/me/messages"))
            .and(header("Authorization", "Bearer test-token"))
            .and(query_param_contains("$filter", "2024-01-01T00:00:00Z"))
            .and(query_param_contains("$filter", "2024-01-02T00:00:00Z"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [
                    {
                        "subject": "Meeting",
                        "bodyPreview": "Project sync at 3pm",
                        "receivedDateTime": "2024-01-01T10:00:00Z",
                        "from": { "emailAddress": { "address": "a@x.com" } }
                    }
                ]
            })))
            .mount(&server)
            .await;

        let messages = client_for(&server).fetch_messages(test_date()).await.unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].subject.as_deref(), Some("Meeting"));
    }

    #[tokio::test]
    async fn test_empty_day_is_ok_not_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/me/messages"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "value": [] })),
            )
            .mount(&server)
            .await;

        let messages = client_for(&server).fetch_messages(test_date()).await.unwrap();
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_auth_failure_is_typed_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/me/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_string("InvalidAuthenticationToken"))
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_messages(test_date()).await;

        match result {
            Err(MailError::Api { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("InvalidAuthenticationToken"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_token() {
        let client = MailClient {
            access_token: None,
            base_url: "http://localhost:1".to_string(),
            client: reqwest::Client::new(),
        };

        assert!(!client.is_available());
        let result = client.fetch_messages(test_date()).await;
        assert!(matches!(result, Err(MailError::MissingCredential)));
    }
}
