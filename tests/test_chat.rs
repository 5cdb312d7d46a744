//! Telegram and Discord adapters against a local mock server.

use marketsignal::config::{DiscordCredentials, TelegramCredentials};
use marketsignal::domain::error::ProviderError;
use marketsignal::domain::ports::chat_channel::ChatChannel;
use marketsignal::infrastructure::chat::discord::{self, DiscordChannel};
use marketsignal::infrastructure::chat::telegram::TelegramBot;
use mockito::{Matcher, Server};
use serde_json::json;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

fn telegram_creds() -> TelegramCredentials {
    TelegramCredentials {
        bot_token: "123:abc".into(),
        chat_id: "-100200".into(),
    }
}

#[tokio::test]
async fn test_telegram_send_uses_parse_mode() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/bot123:abc/sendMessage")
        .match_body(Matcher::Json(json!({
            "chat_id": "-100200",
            "text": "*AAPL*\nPrice: $150.00",
            "parse_mode": "Markdown"
        })))
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok":true,"result":{"message_id":1}}"#)
        .create_async()
        .await;

    let bot = TelegramBot::with_base_url(&server.url(), &telegram_creds(), "Markdown", TIMEOUT);
    bot.send("*AAPL*\nPrice: $150.00").await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_telegram_falls_back_to_plain_text_on_bad_markup() {
    let mut server = Server::new_async().await;
    let rejected = server
        .mock("POST", "/bot123:abc/sendMessage")
        .match_body(Matcher::PartialJson(json!({"parse_mode": "Markdown"})))
        .with_status(400)
        .with_body(r#"{"ok":false,"description":"Bad Request: can't parse entities"}"#)
        .create_async()
        .await;
    let plain = server
        .mock("POST", "/bot123:abc/sendMessage")
        .match_body(Matcher::Json(json!({"chat_id": "-100200", "text": "BRK_B *up"})))
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok":true,"result":{"message_id":2}}"#)
        .create_async()
        .await;

    let bot = TelegramBot::with_base_url(&server.url(), &telegram_creds(), "Markdown", TIMEOUT);
    bot.send("BRK_B *up").await.unwrap();

    rejected.assert_async().await;
    plain.assert_async().await;
}

#[tokio::test]
async fn test_telegram_plain_text_failure_is_reported() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/bot123:abc/sendMessage")
        .with_status(403)
        .with_body(r#"{"ok":false,"description":"Forbidden: bot was kicked"}"#)
        .create_async()
        .await;

    let bot = TelegramBot::with_base_url(&server.url(), &telegram_creds(), "", TIMEOUT);
    let err = bot.send("hello").await.unwrap_err();

    assert!(matches!(err, ProviderError::Status { status: 403, .. }));
}

#[tokio::test]
async fn test_telegram_poll_commands_and_reply() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/bot123:abc/getUpdates")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("offset".into(), "41".into()),
            Matcher::UrlEncoded("timeout".into(), "0".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(
            json!({"ok": true, "result": [
                {"update_id": 41, "message": {"message_id": 7, "chat": {"id": 555}, "text": "/stock@SignalBot tsla"}},
                {"update_id": 42, "message": {"message_id": 8, "chat": {"id": 555}, "text": "good morning"}},
                {"update_id": 43, "edited_message": {"message_id": 6, "chat": {"id": 555}, "text": "/help"}}
            ]})
            .to_string(),
        )
        .create_async()
        .await;
    let reply = server
        .mock("POST", "/bot123:abc/sendMessage")
        .match_body(Matcher::Json(json!({
            "chat_id": 555,
            "text": "pong",
            "reply_to_message_id": 7
        })))
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok":true,"result":{"message_id":9}}"#)
        .create_async()
        .await;

    let bot = TelegramBot::with_base_url(&server.url(), &telegram_creds(), "", TIMEOUT);
    let (commands, next) = bot.poll_commands(Some(41), Duration::ZERO).await.unwrap();

    assert_eq!(next, Some(44));
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].chat_id, 555);
    assert_eq!(commands[0].command.name, "stock");
    assert_eq!(commands[0].command.args, vec!["tsla".to_string()]);

    bot.reply(&commands[0], "pong").await.unwrap();
    reply.assert_async().await;
}

#[tokio::test]
async fn test_telegram_poll_without_updates_keeps_offset() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/bot123:abc/getUpdates")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok":true,"result":[]}"#)
        .create_async()
        .await;

    let bot = TelegramBot::with_base_url(&server.url(), &telegram_creds(), "", TIMEOUT);
    let (commands, next) = bot.poll_commands(Some(10), Duration::ZERO).await.unwrap();

    assert!(commands.is_empty());
    assert_eq!(next, Some(10));
}

#[tokio::test]
async fn test_discord_send_truncates_to_limit() {
    let long = "x".repeat(discord::MAX_MESSAGE_CHARS + 50);
    let expected = format!("{}…", "x".repeat(discord::MAX_MESSAGE_CHARS - 1));

    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v10/channels/987/messages")
        .match_header("authorization", "Bot discord-token")
        .match_body(Matcher::Json(json!({ "content": expected })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let creds = DiscordCredentials {
        bot_token: "discord-token".into(),
        channel_id: "987".into(),
    };
    let channel = DiscordChannel::with_base_url(&server.url(), &creds, TIMEOUT);
    channel.send(&long).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_discord_send_uses_double_asterisk_bold() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v10/channels/987/messages")
        .match_body(Matcher::Json(json!({ "content": "**AAPL**\nPrice: $150.00" })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let creds = DiscordCredentials {
        bot_token: "discord-token".into(),
        channel_id: "987".into(),
    };
    let channel = DiscordChannel::with_base_url(&server.url(), &creds, TIMEOUT);
    channel.send("*AAPL*\nPrice: $150.00").await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_discord_error_status() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/v10/channels/987/messages")
        .with_status(401)
        .with_body(r#"{"message":"401: Unauthorized"}"#)
        .create_async()
        .await;

    let creds = DiscordCredentials {
        bot_token: "bad".into(),
        channel_id: "987".into(),
    };
    let channel = DiscordChannel::with_base_url(&server.url(), &creds, TIMEOUT);

    assert!(matches!(
        channel.send("hi").await,
        Err(ProviderError::Status { status: 401, .. })
    ));
}
