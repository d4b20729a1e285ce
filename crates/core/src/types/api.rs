//! Payloads exchanged with the marketplace JSON endpoints.
//!
//! Every endpoint answers with a JSON object carrying a `status` field next to
//! its payload fields:
//!
//! ```json
//! {"status": "success", "post": {...}, "user_profile": {...}}
//! {"status": "error", "message": "Content cannot be empty."}
//! ```
//!
//! The auth endpoints report failures as `{"error": "..."}` with no status.
//! [`ApiResponse`] folds all of these into a success variant carrying the
//! typed payload or a failure variant carrying a message.

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};

use super::id::{PostId, ReplyId, UserId};

/// Message shown when a failed response carries no message of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to submit.";

/// Avatar used when a profile has none.
pub const AVATAR_PLACEHOLDER: &str = "/static/img/avatar_placeholder.png";

/// Value of the `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    #[serde(other)]
    Error,
}

/// A decoded endpoint response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResponse<T> {
    /// `status == "success"`, payload decoded from the remaining fields.
    Success(T),
    /// Anything else.
    Failure { message: Option<String> },
}

impl<T> ApiResponse<T> {
    /// Convert into a `Result`, substituting the generic message when the
    /// server sent none.
    ///
    /// # Errors
    ///
    /// Returns the failure message for the `Failure` variant.
    pub fn into_result(self) -> Result<T, String> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::Failure { message } => {
                Err(message.unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()))
            }
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// Decode from an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an object, or if a success
    /// response does not match the payload type.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let serde_json::Value::Object(map) = value else {
            return Err(serde_json::Error::custom("expected a JSON object"));
        };

        let status = map
            .get("status")
            .cloned()
            .map(serde_json::from_value::<ApiStatus>)
            .transpose()?;

        if status == Some(ApiStatus::Success) {
            let payload = serde_json::from_value(serde_json::Value::Object(map))?;
            return Ok(Self::Success(payload));
        }

        let message = map
            .get("message")
            .or_else(|| map.get("error"))
            .and_then(serde_json::Value::as_str)
            .map(String::from);
        Ok(Self::Failure { message })
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for ApiResponse<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(D::Error::custom)
    }
}

/// Public profile fields attached to discussion responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl UserProfile {
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or("Anonymous User")
    }

    #[must_use]
    pub fn avatar_url(&self) -> &str {
        self.avatar_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(AVATAR_PLACEHOLDER)
    }
}

/// A top-level discussion post on a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionPost {
    pub id: PostId,
    pub content: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// A reply under a discussion post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionReply {
    pub id: ReplyId,
    pub content: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Payload of a successful post creation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostCreated {
    pub post: DiscussionPost,
    #[serde(default)]
    pub user_profile: UserProfile,
}

/// Payload of a successful reply creation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReplyCreated {
    pub reply: DiscussionReply,
    #[serde(default)]
    pub user_profile: UserProfile,
}

/// Payload of endpoints that only acknowledge, such as deletes and logout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub message: Option<String>,
}

/// Payload of a successful session login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionLogin {
    /// Where the browser should go next (`/dashboard` or `/select-role`).
    pub redirect: String,
}
