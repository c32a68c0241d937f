//! Publishing via the Instagram Graph API.
//!
//! Publishing is a two-step flow: create a media container, wait for the
//! platform to finish processing it, then publish the container. The
//! container id is useless on its own; only the final publish call yields
//! the platform post id.

use crate::error::PublishError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Graph API base URL.
const GRAPH_API_BASE: &str = "https://graph.instagram.com/v24.0";

/// Request timeout for Graph API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum container status polls before giving up.
const CONTAINER_POLL_ATTEMPTS: u32 = 10;

/// Delay between container status polls.
const CONTAINER_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Trait for social platform publishing.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publishes the given caption, returning the platform post id.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid credentials, rejected content, or
    /// transport failure.
    async fn publish(
        &self,
        caption: &str,
        image_url: Option<&str>,
    ) -> Result<String, PublishError>;
}

/// A publisher targeting an Instagram business account.
pub struct InstagramPublisher {
    http: reqwest::Client,
    access_token: String,
    account_id: String,
}

#[derive(Deserialize)]
struct IdResponse {
    id: Option<String>,
}

#[derive(Deserialize)]
struct StatusResponse {
    status_code: Option<String>,
}

#[derive(Deserialize)]
struct AccountResponse {
    username: Option<String>,
}

impl InstagramPublisher {
    /// Creates a new publisher.
    ///
    /// Credentials may be empty here; `publish` reports
    /// [`PublishError::MissingCredentials`] so an unconfigured deployment
    /// fails per-record instead of at startup.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        access_token: impl Into<String>,
        account_id: impl Into<String>,
    ) -> Result<Self, PublishError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PublishError::RequestFailed {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            access_token: access_token.into(),
            account_id: account_id.into(),
        })
    }

    /// Checks whether the configured credentials resolve to an account.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure; an unrecognized credential
    /// yields `Ok(false)`.
    pub async fn verify_credentials(&self) -> Result<bool, PublishError> {
        if self.access_token.is_empty() || self.account_id.is_empty() {
            return Ok(false);
        }

        let response = self
            .http
            .get(format!("{GRAPH_API_BASE}/{}", self.account_id))
            .query(&[
                ("fields", "id,username"),
                ("access_token", self.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PublishError::RequestFailed {
                reason: e.to_string(),
            })?;

        let parsed: AccountResponse =
            response
                .json()
                .await
                .map_err(|e| PublishError::RequestFailed {
                    reason: e.to_string(),
                })?;

        match parsed.username {
            Some(username) => {
                tracing::info!(%username, "platform credentials verified");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_container(
        &self,
        caption: &str,
        image_url: &str,
    ) -> Result<String, PublishError> {
        let response = self
            .http
            .post(format!("{GRAPH_API_BASE}/{}/media", self.account_id))
            .form(&[
                ("image_url", image_url),
                ("caption", caption),
                ("access_token", self.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PublishError::RequestFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(PublishError::Rejected {
                status: status.as_u16(),
                detail: body,
            });
        }

        let parsed: IdResponse =
            serde_json::from_str(&body).map_err(|e| PublishError::RequestFailed {
                reason: format!("failed to parse container response: {e}"),
            })?;

        parsed.id.ok_or(PublishError::ContainerFailed {
            detail: format!("container response carried no id: {body}"),
        })
    }

    async fn wait_for_container(&self, container_id: &str) -> Result<(), PublishError> {
        for attempt in 1..=CONTAINER_POLL_ATTEMPTS {
            let response = self
                .http
                .get(format!("{GRAPH_API_BASE}/{container_id}"))
                .query(&[
                    ("fields", "status_code"),
                    ("access_token", self.access_token.as_str()),
                ])
                .send()
                .await
                .map_err(|e| PublishError::RequestFailed {
                    reason: e.to_string(),
                })?;

            let parsed: StatusResponse =
                response
                    .json()
                    .await
                    .map_err(|e| PublishError::RequestFailed {
                        reason: e.to_string(),
                    })?;

            match parsed.status_code.as_deref() {
                Some("FINISHED") => return Ok(()),
                Some("ERROR") => {
                    return Err(PublishError::ContainerFailed {
                        detail: format!("container {container_id} reported ERROR"),
                    });
                }
                _ => {
                    tracing::debug!(
                        container_id,
                        attempt,
                        max_attempts = CONTAINER_POLL_ATTEMPTS,
                        "waiting for media processing"
                    );
                    tokio::time::sleep(CONTAINER_POLL_INTERVAL).await;
                }
            }
        }

        Err(PublishError::ProcessingTimedOut)
    }

    async fn publish_container(&self, container_id: &str) -> Result<String, PublishError> {
        let response = self
            .http
            .post(format!("{GRAPH_API_BASE}/{}/media_publish", self.account_id))
            .form(&[
                ("creation_id", container_id),
                ("access_token", self.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PublishError::RequestFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(PublishError::Rejected {
                status: status.as_u16(),
                detail: body,
            });
        }

        let parsed: IdResponse =
            serde_json::from_str(&body).map_err(|e| PublishError::RequestFailed {
                reason: format!("failed to parse publish response: {e}"),
            })?;

        parsed.id.ok_or(PublishError::Rejected {
            status: status.as_u16(),
            detail: format!("publish response carried no id: {body}"),
        })
    }
}

#[async_trait]
impl Publisher for InstagramPublisher {
    async fn publish(
        &self,
        caption: &str,
        image_url: Option<&str>,
    ) -> Result<String, PublishError> {
        if self.access_token.is_empty() || self.account_id.is_empty() {
            return Err(PublishError::MissingCredentials);
        }
        let image_url = image_url.ok_or(PublishError::MissingImage)?;

        let container_id = self.create_container(caption, image_url).await?;
        tracing::info!(container_id = %container_id, "media container created");

        self.wait_for_container(&container_id).await?;

        let post_id = self.publish_container(&container_id).await?;
        tracing::info!(post_id = %post_id, "published to platform");
        Ok(post_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_without_credentials_fails_fast() {
        let publisher = InstagramPublisher::new("", "").expect("construct");
        let err = publisher
            .publish("caption", Some("https://example.com/img.jpg"))
            .await
            .unwrap_err();
        assert_eq!(err, PublishError::MissingCredentials);
    }

    #[tokio::test]
    async fn publish_without_image_fails_fast() {
        let publisher = InstagramPublisher::new("token", "account").expect("construct");
        let err = publisher.publish("caption", None).await.unwrap_err();
        assert_eq!(err, PublishError::MissingImage);
    }

    #[test]
    fn id_response_parses() {
        let parsed: IdResponse = serde_json::from_str(r#"{"id": "17890"}"#).expect("deserialize");
        assert_eq!(parsed.id.as_deref(), Some("17890"));

        let empty: IdResponse = serde_json::from_str(r#"{}"#).expect("deserialize");
        assert!(empty.id.is_none());
    }

    #[test]
    fn status_response_parses() {
        let parsed: StatusResponse =
            serde_json::from_str(r#"{"status_code": "FINISHED"}"#).expect("deserialize");
        assert_eq!(parsed.status_code.as_deref(), Some("FINISHED"));
    }
}
