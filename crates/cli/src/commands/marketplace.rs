//! Marketplace commands: discussions, reviews, and sessions.
//!
//! Sessions are cookie based and live only as long as one [`Session`], so a
//! command that needs a logged-in user passes `--id-token` and logs in first.
//!
//! # Environment Variables
//!
//! - `NISSAHUB_API_BASE_URL` - Marketplace web app base URL
//! - `NISSAHUB_ID_TOKEN` - Identity-provider ID token (optional)

use nissahub_core::{Message, PostId, ReplyId, ReviewId, SkillId};
use nissahub_storefront::config::{ApiConfig, ConfigError};
use nissahub_storefront::services::{ApiError, MarketplaceClient};
use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur during marketplace commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Marketplace endpoints are not configured.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Marketplace call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// `auth login` was run without a token.
    #[error("Missing ID token: pass --id-token or set NISSAHUB_ID_TOKEN")]
    MissingIdToken,
}

/// A marketplace client, logged in when a token was given.
pub struct Session {
    client: MarketplaceClient,
}

impl Session {
    /// Connect to the marketplace and log in with `id_token` if present.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is missing or the login is rejected.
    pub async fn connect(id_token: Option<&SecretString>) -> Result<Self, CommandError> {
        let client = MarketplaceClient::new(&ApiConfig::from_env()?)?;
        if let Some(token) = id_token {
            let login = client.session_login(token).await?;
            tracing::info!(redirect = %login.redirect, "Logged in");
        }
        Ok(Self { client })
    }

    /// Start a discussion thread and print its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is blank or the marketplace rejects it.
    pub async fn create_post(&self, skill: &str, content: &str) -> Result<(), CommandError> {
        let created = self.client.create_post(&SkillId::new(skill), content).await?;
        print_line(&format!(
            "Created post {} as {}",
            created.post.id,
            created.user_profile.display_name()
        ));
        Ok(())
    }

    /// Reply to a thread and print the reply id.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is blank or the marketplace rejects it.
    pub async fn create_reply(
        &self,
        skill: &str,
        post: &str,
        content: &str,
    ) -> Result<(), CommandError> {
        let created = self
            .client
            .create_reply(&SkillId::new(skill), &PostId::new(post), content)
            .await?;
        print_line(&format!("Created reply {}", created.reply.id));
        Ok(())
    }

    /// Delete a thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the marketplace rejects the deletion.
    pub async fn delete_post(&self, skill: &str, post: &str) -> Result<(), CommandError> {
        let message = self
            .client
            .delete_post(&SkillId::new(skill), &PostId::new(post))
            .await?;
        print_message(&message);
        Ok(())
    }

    /// Delete a reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the marketplace rejects the deletion.
    pub async fn delete_reply(&self, skill: &str, post: &str, reply: &str) -> Result<(), CommandError> {
        let message = self
            .client
            .delete_reply(&SkillId::new(skill), &PostId::new(post), &ReplyId::new(reply))
            .await?;
        print_message(&message);
        Ok(())
    }

    /// Delete a course review.
    ///
    /// # Errors
    ///
    /// Returns an error if the marketplace rejects the deletion.
    pub async fn delete_review(&self, skill: &str, review: &str) -> Result<(), CommandError> {
        let message = self
            .client
            .delete_review(&SkillId::new(skill), &ReviewId::new(review))
            .await?;
        print_message(&message);
        Ok(())
    }

    /// End the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the marketplace rejects the logout.
    pub async fn logout(&self) -> Result<(), CommandError> {
        let message = self.client.session_logout().await?;
        print_message(&message);
        Ok(())
    }
}

/// Log in and print where the marketplace redirects the user.
///
/// # Errors
///
/// Returns an error if configuration is missing or the token is rejected.
pub async fn login(id_token: &SecretString) -> Result<(), CommandError> {
    let client = MarketplaceClient::new(&ApiConfig::from_env()?)?;
    let login = client.session_login(id_token).await?;
    print_line(&login.redirect);
    Ok(())
}

fn print_message(message: &Message) {
    print_line(message.message.as_deref().unwrap_or("Done"));
}

#[allow(clippy::print_stdout)]
fn print_line(line: &str) {
    println!("{line}");
}
