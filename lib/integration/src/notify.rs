//! Approval request delivery via the Resend HTTP API.

use crate::error::NotifyError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Resend email endpoint.
const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Request timeout for delivery calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for approval request delivery.
///
/// The recipient is fixed at construction: there is a single approver.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers an approval request and returns the provider's message id.
    ///
    /// # Errors
    ///
    /// Returns an error on provider rejection or transport failure.
    async fn send(&self, subject: &str, html: &str) -> Result<String, NotifyError>;
}

/// A notifier delivering email through Resend.
pub struct ResendNotifier {
    http: reqwest::Client,
    api_key: String,
    from: String,
    to: String,
}

impl ResendNotifier {
    /// Creates a new notifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or the HTTP client cannot
    /// be constructed.
    pub fn new(
        api_key: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(NotifyError::InvalidConfig {
                reason: "Resend API key is empty".to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| NotifyError::InvalidConfig {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            api_key,
            from: from.into(),
            to: to.into(),
        })
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(Deserialize)]
struct SendResponse {
    id: String,
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn send(&self, subject: &str, html: &str) -> Result<String, NotifyError> {
        let body = SendRequest {
            from: &self.from,
            to: [&self.to],
            subject,
            html,
        };

        let response = self
            .http
            .post(RESEND_API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::RequestFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let parsed: SendResponse =
            response
                .json()
                .await
                .map_err(|e| NotifyError::RequestFailed {
                    reason: format!("failed to parse provider response: {e}"),
                })?;

        tracing::info!(recipient = %self.to, message_id = %parsed.id, "approval email sent");
        Ok(parsed.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_rejected() {
        let result = ResendNotifier::new("", "a@b.c", "d@e.f");
        assert!(matches!(result, Err(NotifyError::InvalidConfig { .. })));
    }

    #[test]
    fn send_request_serializes_single_recipient() {
        let body = SendRequest {
            from: "noreply@example.com",
            to: ["approver@example.com"],
            subject: "New post for review",
            html: "<p>hi</p>",
        };
        let json = serde_json::to_string(&body).expect("serialize");
        assert!(json.contains("\"to\":[\"approver@example.com\"]"));
    }
}
