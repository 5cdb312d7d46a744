use crate::application::format::truncate_chars;
use crate::config::DiscordCredentials;
use crate::domain::error::ProviderError;
use crate::domain::ports::chat_channel::ChatChannel;
use crate::infrastructure::http::{client, APP_USER_AGENT};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://discord.com";

/// Discord caps message content at 2000 characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Posts to one channel as a bot user (`Authorization: Bot <token>`).
pub struct DiscordChannel {
    base_url: String,
    token: String,
    channel_id: String,
    client: reqwest::Client,
}

impl DiscordChannel {
    pub fn new(creds: &DiscordCredentials, timeout: Duration) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, creds, timeout)
    }

    pub fn with_base_url(base_url: &str, creds: &DiscordCredentials, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: creds.bot_token.clone(),
            channel_id: creds.channel_id.clone(),
            client: client(APP_USER_AGENT, timeout),
        }
    }
}

#[async_trait]
impl ChatChannel for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    async fn send(&self, text: &str) -> Result<(), ProviderError> {
        let url = format!(
            "{}/api/v10/channels/{}/messages",
            self.base_url, self.channel_id
        );
        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .json(&json!({ "content": truncate_chars(&discord_bold(text), MAX_MESSAGE_CHARS) }))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ProviderError::from_response("discord", resp).await);
        }
        Ok(())
    }
}

/// Messages are rendered with Telegram's single-asterisk bold, which Discord
/// shows as italics. Double every lone `*`; longer runs are left alone.
fn discord_bold(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '*' {
            out.push(c);
            continue;
        }
        let mut run = 1;
        while chars.next_if_eq(&'*').is_some() {
            run += 1;
        }
        let width = if run == 1 { 2 } else { run };
        out.extend(std::iter::repeat('*').take(width));
    }
    out
}
