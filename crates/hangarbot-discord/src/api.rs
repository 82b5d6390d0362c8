//! Discord REST API HTTP client.

use std::time::Duration;

use anyhow::{bail, Context};
use reqwest::Client;

use hangarbot_types::{EditOutcome, MessageHandle};

use crate::types::{ApiErrorBody, BotUser, DiscordMessage, MessageParams};

/// Discord error code for "Unknown Message" (the edit target was
/// deleted).
const UNKNOWN_MESSAGE_CODE: i64 = 10008;

/// HTTP client for the Discord REST API.
pub struct DiscordApi {
    client: Client,
    base_url: String,
    auth: String,
}

impl DiscordApi {
    /// Create a new API client with the given bot token.
    pub fn new(bot_token: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build reqwest client");
        Self {
            client,
            base_url: "https://discord.com/api/v10".to_string(),
            auth: format!("Bot {bot_token}"),
        }
    }

    /// Verify the bot token by fetching the bot's own user.
    pub async fn get_current_user(&self) -> anyhow::Result<BotUser> {
        let resp = self
            .client
            .get(format!("{}/users/@me", self.base_url))
            .header("Authorization", &self.auth)
            .send()
            .await
            .context("users/@me request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("users/@me failed with {status}: {body}");
        }
        resp.json().await.context("users/@me response parse failed")
    }

    /// Post a new message to a channel.
    pub async fn create_message(
        &self,
        channel_id: &str,
        content: &str,
    ) -> anyhow::Result<MessageHandle> {
        let resp = self
            .client
            .post(format!("{}/channels/{channel_id}/messages", self.base_url))
            .header("Authorization", &self.auth)
            .json(&MessageParams { content })
            .send()
            .await
            .context("createMessage request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("createMessage failed with {status}: {body}");
        }
        let msg: DiscordMessage = resp
            .json()
            .await
            .context("createMessage response parse failed")?;
        Ok(MessageHandle {
            channel_id: msg.channel_id,
            message_id: msg.id,
        })
    }

    /// Edit an existing message's content.
    ///
    /// A deleted edit target is a normal outcome
    /// ([`EditOutcome::NotFound`]), not an error.
    pub async fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        content: &str,
    ) -> anyhow::Result<EditOutcome> {
        let resp = self
            .client
            .patch(format!(
                "{}/channels/{channel_id}/messages/{message_id}",
                self.base_url
            ))
            .header("Authorization", &self.auth)
            .json(&MessageParams { content })
            .send()
            .await
            .context("editMessage request failed")?;

        let status = resp.status();
        if status.is_success() {
            let msg: DiscordMessage = resp
                .json()
                .await
                .context("editMessage response parse failed")?;
            return Ok(EditOutcome::Edited(MessageHandle {
                channel_id: msg.channel_id,
                message_id: msg.id,
            }));
        }

        let body = resp.text().await.unwrap_or_default();
        if edit_target_gone(status.as_u16(), &body) {
            return Ok(EditOutcome::NotFound);
        }
        bail!("editMessage failed with {status}: {body}");
    }
}

/// True when a failed edit means the target message was deleted, as
/// opposed to a transient or permission failure.
fn edit_target_gone(status: u16, body: &str) -> bool {
    if status != 404 {
        return false;
    }
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|e| e.code == UNKNOWN_MESSAGE_CODE)
        .unwrap_or(false)
}
