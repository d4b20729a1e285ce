//! Marketplace web app client.
//!
//! Covers the endpoints the marketplace pages call besides the cart:
//! discussion posts and replies, review deletion, session login/logout, and
//! order submission. Responses are decoded into [`ApiResponse`] so callers
//! never probe raw JSON fields.
//!
//! No call is retried and no timeout is set beyond the client defaults.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use nissahub_core::{
    ApiResponse, Message, PostCreated, PostId, ReplyCreated, ReplyId, ReviewId, SessionLogin,
    SkillId,
};

use crate::config::{ApiConfig, join_path};

/// Errors that can occur when calling the marketplace API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The server answered with a failure.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Post or reply content was blank.
    #[error("Content cannot be empty.")]
    EmptyContent,

    /// Endpoint URL could not be built.
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Client for the marketplace JSON endpoints.
///
/// Keeps a cookie jar so a session opened with
/// [`session_login`](Self::session_login) applies to later calls.
#[derive(Debug, Clone)]
pub struct MarketplaceClient {
    client: reqwest::Client,
    base_url: Url,
    checkout_url: Url,
}

impl MarketplaceClient {
    /// Create a new marketplace client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            checkout_url: config.checkout_url.clone(),
        })
    }

    /// Order submission endpoint.
    #[must_use]
    pub const fn checkout_url(&self) -> &Url {
        &self.checkout_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(join_path(&self.base_url, path)?)
    }

    /// Start a discussion thread on a course.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::EmptyContent` for blank content, or any transport,
    /// decoding, or server-side failure.
    #[instrument(skip(self, content))]
    pub async fn create_post(
        &self,
        skill_id: &SkillId,
        content: &str,
    ) -> Result<PostCreated, ApiError> {
        let content = non_empty(content)?;
        let url = self.endpoint(&discussion_path(skill_id, None, None))?;
        let response = self
            .client
            .post(url)
            .form(&[("content", content)])
            .send()
            .await?;
        read_response(response).await
    }

    /// Reply to a discussion thread.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::EmptyContent` for blank content, or any transport,
    /// decoding, or server-side failure.
    #[instrument(skip(self, content))]
    pub async fn create_reply(
        &self,
        skill_id: &SkillId,
        post_id: &PostId,
        content: &str,
    ) -> Result<ReplyCreated, ApiError> {
        let content = non_empty(content)?;
        let path = format!("{}/reply", discussion_path(skill_id, Some(post_id), None));
        let response = self
            .client
            .post(self.endpoint(&path)?)
            .form(&[("content", content)])
            .send()
            .await?;
        read_response(response).await
    }

    /// Delete a discussion thread and its replies.
    ///
    /// # Errors
    ///
    /// Returns any transport, decoding, or server-side failure.
    #[instrument(skip(self))]
    pub async fn delete_post(&self, skill_id: &SkillId, post_id: &PostId) -> Result<Message, ApiError> {
        let url = self.endpoint(&discussion_path(skill_id, Some(post_id), None))?;
        read_response(self.client.delete(url).send().await?).await
    }

    /// Delete a single reply.
    ///
    /// # Errors
    ///
    /// Returns any transport, decoding, or server-side failure.
    #[instrument(skip(self))]
    pub async fn delete_reply(
        &self,
        skill_id: &SkillId,
        post_id: &PostId,
        reply_id: &ReplyId,
    ) -> Result<Message, ApiError> {
        let url = self.endpoint(&discussion_path(skill_id, Some(post_id), Some(reply_id)))?;
        read_response(self.client.delete(url).send().await?).await
    }

    /// Delete a course review. Allowed for the review author and the course
    /// author.
    ///
    /// # Errors
    ///
    /// Returns any transport, decoding, or server-side failure.
    #[instrument(skip(self))]
    pub async fn delete_review(
        &self,
        skill_id: &SkillId,
        review_id: &ReviewId,
    ) -> Result<Message, ApiError> {
        let url = self.endpoint(&format!("skill/{skill_id}/review/{review_id}"))?;
        read_response(self.client.delete(url).send().await?).await
    }

    /// Exchange an identity-provider ID token for a marketplace session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` for invalid tokens or disabled accounts.
    #[instrument(skip(self, id_token))]
    pub async fn session_login(&self, id_token: &SecretString) -> Result<SessionLogin, ApiError> {
        let response = self
            .client
            .post(self.endpoint("auth/session_login")?)
            .bearer_auth(id_token.expose_secret())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;
        read_response(response).await
    }

    /// End the marketplace session.
    ///
    /// # Errors
    ///
    /// Returns any transport, decoding, or server-side failure.
    #[instrument(skip(self))]
    pub async fn session_logout(&self) -> Result<Message, ApiError> {
        let response = self
            .client
            .post(self.endpoint("auth/session_logout")?)
            .send()
            .await?;
        read_response(response).await
    }

    /// Post the serialized cart to the order endpoint as the `cart_data`
    /// form field.
    ///
    /// The response is only reported back; whether the order succeeded has no
    /// effect on the cart.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the request cannot be sent.
    #[instrument(skip(self, cart_payload), fields(bytes = cart_payload.len()))]
    pub async fn submit_order(&self, cart_payload: &str) -> Result<StatusCode, ApiError> {
        let response = self
            .client
            .post(self.checkout_url.clone())
            .form(&[("cart_data", cart_payload)])
            .send()
            .await?;
        let status = response.status();
        if status.is_success() || status.is_redirection() {
            debug!(%status, "order submitted");
        } else {
            warn!(%status, "order endpoint returned an error status");
        }
        Ok(status)
    }
}

/// `skill/{skill}/discussion[/{post}[/reply/{reply}]]`
fn discussion_path(skill_id: &SkillId, post_id: Option<&PostId>, reply_id: Option<&ReplyId>) -> String {
    let mut path = format!("skill/{skill_id}/discussion");
    if let Some(post_id) = post_id {
        path.push('/');
        path.push_str(post_id.as_str());
        if let Some(reply_id) = reply_id {
            path.push_str("/reply/");
            path.push_str(reply_id.as_str());
        }
    }
    path
}

fn non_empty(content: &str) -> Result<&str, ApiError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        Err(ApiError::EmptyContent)
    } else {
        Ok(trimmed)
    }
}

async fn read_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    decode(status, &body)
}

/// Succeeds only for a 2xx status with `status == "success"` in the body.
fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ApiError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let response = ApiResponse::<T>::from_value(value)?;

    match (status.is_success(), response) {
        (true, ApiResponse::Success(payload)) => Ok(payload),
        (_, response) => {
            let message = match response.into_result() {
                Ok(_) => nissahub_core::types::api::GENERIC_FAILURE_MESSAGE.to_string(),
                Err(message) => message,
            };
            Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_discussion_paths() {
        let skill = SkillId::new("s1");
        let post = PostId::new("p1");
        let reply = ReplyId::new("r1");

        assert_eq!(discussion_path(&skill, None, None), "skill/s1/discussion");
        assert_eq!(discussion_path(&skill, Some(&post), None), "skill/s1/discussion/p1");
        assert_eq!(
            discussion_path(&skill, Some(&post), Some(&reply)),
            "skill/s1/discussion/p1/reply/r1"
        );
    }

    #[test]
    fn test_non_empty_trims() {
        assert_eq!(non_empty("  hi \n").unwrap(), "hi");
        assert!(matches!(non_empty(" \n\t"), Err(ApiError::EmptyContent)));
    }

    #[test]
    fn test_decode_success() {
        let body = r#"{"status":"success","message":"Reply deleted."}"#;
        let message: Message = decode(StatusCode::OK, body).unwrap();
        assert_eq!(message.message.as_deref(), Some("Reply deleted."));
    }

    #[test]
    fn test_decode_error_status_uses_server_message() {
        let body = r#"{"status":"error","message":"You do not have permission to delete this review."}"#;
        let err = decode::<Message>(StatusCode::FORBIDDEN, body).unwrap_err();
        match err {
            ApiError::Rejected { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "You do not have permission to delete this review.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_success_body_with_bad_status_is_rejected() {
        let body = r#"{"status":"success"}"#;
        let err = decode::<Message>(StatusCode::INTERNAL_SERVER_ERROR, body).unwrap_err();
        assert!(matches!(err, ApiError::Rejected { status: 500, .. }));
    }

    #[test]
    fn test_decode_non_json_is_parse_error() {
        let err = decode::<Message>(StatusCode::BAD_GATEWAY, "<html>").unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn test_endpoint_joins_base_path() {
        let config = ApiConfig::from_base("https://example.com/market").unwrap();
        let client = MarketplaceClient::new(&config).unwrap();
        let url = client.endpoint("auth/session_login").unwrap();
        assert_eq!(url.as_str(), "https://example.com/market/auth/session_login");
        assert_eq!(client.checkout_url().as_str(), "https://example.com/market/checkout");
    }
}
