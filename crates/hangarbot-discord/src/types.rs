//! Discord REST API types (minimal subset).

use serde::{Deserialize, Serialize};

/// A Discord message, as returned by create/edit.
#[derive(Debug, Deserialize)]
pub struct DiscordMessage {
    pub id: String,
    pub channel_id: String,
}

/// Bot identity returned by `GET /users/@me`.
#[derive(Debug, Deserialize)]
pub struct BotUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub bot: bool,
}

/// Error body returned on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Body for message create and edit requests.
#[derive(Debug, Serialize)]
pub struct MessageParams<'a> {
    pub content: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_params_serde() {
        let params = MessageParams { content: "hello" };
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"content":"hello"}"#);
    }

    #[test]
    fn test_error_body_parse() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"message": "Unknown Message", "code": 10008}"#).unwrap();
        assert_eq!(body.code, 10008);
        assert_eq!(body.message, "Unknown Message");
    }

    #[test]
    fn test_message_parse_ignores_extra_fields() {
        let json = r#"{
            "id": "1120",
            "channel_id": "1423026396741107772",
            "content": "🟥 🟥 🟥 🟥 🟥",
            "author": { "id": "99", "bot": true }
        }"#;
        let msg: DiscordMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.id, "1120");
        assert_eq!(msg.channel_id, "1423026396741107772");
    }
}
