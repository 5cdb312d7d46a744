//! Telegram Bot API over plain HTTPS: `sendMessage` for outgoing signals and
//! `getUpdates` long polling for inbound commands.

use crate::application::command_handler::ParsedCommand;
use crate::application::format::truncate_chars;
use crate::config::TelegramCredentials;
use crate::domain::error::ProviderError;
use crate::domain::ports::chat_channel::ChatChannel;
use crate::infrastructure::http::{client, decode, APP_USER_AGENT};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Longest text `sendMessage` accepts.
pub const MAX_MESSAGE_CHARS: usize = 4096;

pub struct TelegramBot {
    base_url: String,
    token: String,
    chat_id: String,
    parse_mode: Option<String>,
    client: reqwest::Client,
}

/// A command received from any chat the bot is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCommand {
    pub chat_id: i64,
    pub message_id: i64,
    pub command: ParsedCommand,
}

#[derive(Debug, Deserialize)]
struct ApiReply<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    #[serde(default)]
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    message_id: i64,
    chat: Chat,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

impl TelegramBot {
    /// `parse_mode` is sent with every message unless empty.
    pub fn new(creds: &TelegramCredentials, parse_mode: &str, timeout: Duration) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, creds, parse_mode, timeout)
    }

    pub fn with_base_url(
        base_url: &str,
        creds: &TelegramCredentials,
        parse_mode: &str,
        timeout: Duration,
    ) -> Self {
        let parse_mode = Some(parse_mode.trim().to_string()).filter(|m| !m.is_empty());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: creds.bot_token.clone(),
            chat_id: creds.chat_id.clone(),
            parse_mode,
            client: client(APP_USER_AGENT, timeout),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.base_url, self.token)
    }

    async fn send_to(
        &self,
        chat_id: serde_json::Value,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<(), ProviderError> {
        let text = truncate_chars(text, MAX_MESSAGE_CHARS);
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if let Some(id) = reply_to {
            body["reply_to_message_id"] = json!(id);
        }
        if let Some(mode) = &self.parse_mode {
            body["parse_mode"] = json!(mode);
        }

        match self.post_message(&body).await {
            // Markdown that Telegram cannot parse is rejected with 400; resend as plain text.
            Err(ProviderError::Status { status: 400, body: detail, .. })
                if self.parse_mode.is_some() =>
            {
                warn!(error = %detail, "Telegram rejected formatting, resending as plain text");
                if let Some(obj) = body.as_object_mut() {
                    obj.remove("parse_mode");
                }
                self.post_message(&body).await
            }
            other => other,
        }
    }

    async fn post_message(&self, body: &serde_json::Value) -> Result<(), ProviderError> {
        let resp = self
            .client
            .post(self.method_url("sendMessage"))
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let reply: ApiReply<serde_json::Value> = decode("telegram", resp).await?;
        if !reply.ok {
            return Err(ProviderError::Parse(format!(
                "telegram: {}",
                reply.description.unwrap_or_else(|| "request not ok".into())
            )));
        }
        Ok(())
    }

    /// Long-poll for new messages and keep the ones that are commands.
    ///
    /// Returns the commands and the offset to pass next time, which
    /// acknowledges every update seen here, commands or not.
    pub async fn poll_commands(
        &self,
        offset: Option<i64>,
        poll_timeout: Duration,
    ) -> Result<(Vec<InboundCommand>, Option<i64>), ProviderError> {
        let mut query = vec![
            ("timeout", poll_timeout.as_secs().to_string()),
            ("allowed_updates", r#"["message"]"#.to_string()),
        ];
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }

        let resp = self
            .client
            .get(self.method_url("getUpdates"))
            .query(&query)
            .timeout(poll_timeout + Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let reply: ApiReply<Vec<Update>> = decode("telegram", resp).await?;
        if !reply.ok {
            return Err(ProviderError::Parse(format!(
                "telegram getUpdates: {}",
                reply.description.unwrap_or_default()
            )));
        }
        let updates = reply.result.unwrap_or_default();

        let next = updates.iter().map(|u| u.update_id + 1).max().or(offset);
        let commands: Vec<InboundCommand> = updates
            .into_iter()
            .filter_map(|u| {
                let msg = u.message?;
                let command = ParsedCommand::parse(msg.text.as_deref()?)?;
                Some(InboundCommand {
                    chat_id: msg.chat.id,
                    message_id: msg.message_id,
                    command,
                })
            })
            .collect();
        if !commands.is_empty() {
            debug!(count = commands.len(), ?next, "Received Telegram commands");
        }
        Ok((commands, next))
    }

    /// Answer `cmd` in the chat it came from, threaded under the request.
    pub async fn reply(&self, cmd: &InboundCommand, text: &str) -> Result<(), ProviderError> {
        self.send_to(json!(cmd.chat_id), text, Some(cmd.message_id))
            .await
    }
}

#[async_trait]
impl ChatChannel for TelegramBot {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, text: &str) -> Result<(), ProviderError> {
        self.send_to(json!(self.chat_id), text, None).await
    }
}
