//! Discord delivery for hangarbot.
//!
//! Talks to the Discord REST API directly over HTTP; the bot never
//! opens a gateway session, because the status message only flows one
//! way.
//!
//! # Configuration
//!
//! ```json5
//! // ~/.hangarbot/config.json5
//! {
//!   discord: { channel_id: "1423026396741107772" },
//! }
//! ```
//!
//! The bot token comes from the `DISCORD_TOKEN` environment variable.

pub mod api;
pub mod types;

use hangarbot_types::{EditOutcome, MessageHandle};
use hangarbot_updater::channel::StatusChannel;

use api::DiscordApi;

/// A single Discord channel holding the status message.
pub struct DiscordStatusChannel {
    api: DiscordApi,
    channel_id: String,
}

impl DiscordStatusChannel {
    pub fn new(api: DiscordApi, channel_id: String) -> Self {
        Self { api, channel_id }
    }

    /// The configured destination channel.
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }
}

#[async_trait::async_trait]
impl StatusChannel for DiscordStatusChannel {
    async fn send(&self, content: &str) -> anyhow::Result<MessageHandle> {
        self.api.create_message(&self.channel_id, content).await
    }

    async fn edit(&self, handle: &MessageHandle, content: &str) -> anyhow::Result<EditOutcome> {
        self.api
            .edit_message(&handle.channel_id, &handle.message_id, content)
            .await
    }
}
