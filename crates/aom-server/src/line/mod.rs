//! LINE-style messaging transport
//!
//! Inbound: webhook bodies carrying a batch of events.
//! Outbound: reply, profile, and rich menu calls through [`MessagingClient`].

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, info};

pub mod render;

pub use render::{render, to_plain_text};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook body signature
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Default Messaging API host
pub const DEFAULT_API_BASE: &str = "https://api.line.me";

// ============================================================================
// Webhook events
// ============================================================================

/// Webhook request body
#[derive(Debug, Deserialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// One webhook event; unknown event types are kept as `Other` and ignored
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    Message(MessageEvent),
    Follow(FollowEvent),
    Postback(PostbackEvent),
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    pub reply_token: Option<String>,
    pub source: EventSource,
    pub message: MessageContent,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowEvent {
    pub reply_token: Option<String>,
    pub source: EventSource,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostbackEvent {
    pub reply_token: Option<String>,
    pub source: EventSource,
    pub postback: Postback,
}

#[derive(Debug, Deserialize)]
pub struct Postback {
    pub data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    pub user_id: Option<String>,
}

/// Message payload; only text is interpreted
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageContent {
    Text { text: String },
    #[serde(other)]
    Other,
}

// ============================================================================
// Outgoing messages
// ============================================================================

/// A reply payload in the transport's own message schema
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutgoingMessage {
    Text {
        text: String,
    },
    Flex {
        #[serde(rename = "altText")]
        alt_text: String,
        contents: serde_json::Value,
    },
}

/// Sender profile returned by the platform
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub display_name: String,
    pub picture_url: Option<String>,
}

// ============================================================================
// Signatures
// ============================================================================

/// Base64 HMAC-SHA256 of the raw body keyed by the channel secret
pub fn sign(channel_secret: &str, body: &[u8]) -> String {
    use base64::Engine;

    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(body);
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

/// Verify a webhook signature in constant time
pub fn verify_signature(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    use base64::Engine;

    let Ok(expected) = base64::engine::general_purpose::STANDARD.decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(channel_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

// ============================================================================
// Client
// ============================================================================

/// Outbound side of the messaging platform
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Reply to an event with up to five messages
    async fn reply(&self, reply_token: &str, messages: &[OutgoingMessage]) -> anyhow::Result<()>;

    /// Fetch a user's profile; `None` if the platform does not know the user
    async fn profile(&self, user_id: &str) -> anyhow::Result<Option<Profile>>;

    /// Attach a rich menu to a user
    async fn link_rich_menu(&self, user_id: &str, rich_menu_id: &str) -> anyhow::Result<()>;
}

/// Messaging API client
#[derive(Clone)]
pub struct LineClient {
    http_client: Client,
    base_url: String,
    access_token: String,
}

impl LineClient {
    pub fn new(access_token: &str) -> Self {
        Self::with_base_url(DEFAULT_API_BASE, access_token)
    }

    pub fn with_base_url(base_url: &str, access_token: &str) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: &'a [OutgoingMessage],
}

#[async_trait]
impl MessagingClient for LineClient {
    async fn reply(&self, reply_token: &str, messages: &[OutgoingMessage]) -> anyhow::Result<()> {
        if messages.is_empty() {
            return Ok(());
        }

        let response = self
            .http_client
            .post(format!("{}/v2/bot/message/reply", self.base_url))
            .bearer_auth(&self.access_token)
            .json(&ReplyRequest {
                reply_token,
                messages,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("reply failed with {}: {}", status, body);
        }
        debug!(count = messages.len(), "Sent reply");
        Ok(())
    }

    async fn profile(&self, user_id: &str) -> anyhow::Result<Option<Profile>> {
        let response = self
            .http_client
            .get(format!("{}/v2/bot/profile/{}", self.base_url, user_id))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            anyhow::bail!("profile lookup failed with {}", response.status());
        }
        Ok(Some(response.json().await?))
    }

    async fn link_rich_menu(&self, user_id: &str, rich_menu_id: &str) -> anyhow::Result<()> {
        let response = self
            .http_client
            .post(format!(
                "{}/v2/bot/user/{}/richmenu/{}",
                self.base_url, user_id, rich_menu_id
            ))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("rich menu link failed with {}", response.status());
        }
        Ok(())
    }
}

/// Client used when no channel access token is configured: logs instead of sending
#[derive(Clone, Default)]
pub struct LogOnlyClient;

#[async_trait]
impl MessagingClient for LogOnlyClient {
    async fn reply(&self, reply_token: &str, messages: &[OutgoingMessage]) -> anyhow::Result<()> {
        info!(
            reply_token,
            text = %to_plain_text(messages),
            "Reply (no access token configured)"
        );
        Ok(())
    }

    async fn profile(&self, _user_id: &str) -> anyhow::Result<Option<Profile>> {
        Ok(None)
    }

    async fn link_rich_menu(&self, user_id: &str, rich_menu_id: &str) -> anyhow::Result<()> {
        debug!(user_id, rich_menu_id, "Skipping rich menu link (no access token configured)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_round_trip() {
        let body = br#"{"events":[]}"#;
        let signature = sign("secret", body);
        assert!(verify_signature("secret", body, &signature));
        assert!(!verify_signature("other", body, &signature));
        assert!(!verify_signature("secret", b"tampered", &signature));
        assert!(!verify_signature("secret", body, "not base64!"));
    }

    #[test]
    fn test_parse_webhook_events() {
        let body = r#"{
            "destination": "U0",
            "events": [
                {"type": "message", "replyToken": "r1", "source": {"type": "user", "userId": "U1"},
                 "message": {"type": "text", "id": "1", "text": "อาหาร 150"}},
                {"type": "message", "replyToken": "r2", "source": {"type": "user", "userId": "U1"},
                 "message": {"type": "sticker", "id": "2"}},
                {"type": "follow", "replyToken": "r3", "source": {"type": "user", "userId": "U2"}},
                {"type": "postback", "replyToken": "r4", "source": {"type": "user", "userId": "U1"},
                 "postback": {"data": "summary"}},
                {"type": "unfollow", "source": {"type": "user", "userId": "U3"}}
            ]
        }"#;
        let parsed: WebhookBody = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.events.len(), 5);

        match &parsed.events[0] {
            Event::Message(ev) => {
                assert_eq!(ev.reply_token.as_deref(), Some("r1"));
                assert_eq!(ev.source.user_id.as_deref(), Some("U1"));
                assert!(matches!(&ev.message, MessageContent::Text { text } if text == "อาหาร 150"));
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(matches!(
            &parsed.events[1],
            Event::Message(MessageEvent {
                message: MessageContent::Other,
                ..
            })
        ));
        assert!(matches!(&parsed.events[2], Event::Follow(_)));
        assert!(matches!(&parsed.events[3], Event::Postback(ev) if ev.postback.data == "summary"));
        assert!(matches!(&parsed.events[4], Event::Other));
    }

    #[test]
    fn test_outgoing_message_schema() {
        let text = serde_json::to_value(OutgoingMessage::Text {
            text: "hi".to_string(),
        })
        .unwrap();
        assert_eq!(text, serde_json::json!({"type": "text", "text": "hi"}));

        let flex = serde_json::to_value(OutgoingMessage::Flex {
            alt_text: "alt".to_string(),
            contents: serde_json::json!({"type": "bubble"}),
        })
        .unwrap();
        assert_eq!(flex["type"], "flex");
        assert_eq!(flex["altText"], "alt");
        assert_eq!(flex["contents"]["type"], "bubble");
    }
}
