//! LINE channel: webhook payload types and the reply API.

use crate::channels::inbound::InboundEvent;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const LINE_API_BASE: &str = "https://api.line.me";

/// Webhook POST body.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    /// User id of the bot that received the events.
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

/// One webhook event. Only message events are modelled; the rest (follow, postback, ...) land in `Other`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WebhookEvent {
    Message {
        /// Absent for events delivered while the channel is in standby mode.
        #[serde(rename = "replyToken", default)]
        reply_token: Option<String>,
        message: EventMessage,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventMessage {
    Text { text: String },
    #[serde(other)]
    Other,
}

impl WebhookPayload {
    /// Text message events, in delivery order.
    pub fn into_inbound(self) -> Vec<InboundEvent> {
        self.events
            .into_iter()
            .filter_map(|event| match event {
                WebhookEvent::Message {
                    reply_token: Some(reply_token),
                    message: EventMessage::Text { text },
                } => Some(InboundEvent { text, reply_token }),
                WebhookEvent::Message { reply_token: None, .. } => {
                    log::debug!("skipping message event without reply token");
                    None
                }
                _ => None,
            })
            .collect()
    }
}

/// Parse a raw webhook body into the text message events it carries. An empty `events` array is valid.
pub fn parse_events(body: &[u8]) -> Result<Vec<InboundEvent>, serde_json::Error> {
    let payload: WebhookPayload = serde_json::from_slice(body)?;
    Ok(payload.into_inbound())
}

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("line request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("line api error: {0}")]
    Api(String),
}

/// Sends a reply correlated to an inbound event.
#[async_trait]
pub trait ReplySender: Send + Sync {
    /// Send `text` using `reply_token`. Called at most once per token.
    async fn reply(&self, reply_token: &str, text: &str) -> Result<(), ChannelError>;
}

#[derive(Debug, Serialize)]
struct ReplyMessage<'a> {
    #[serde(rename = "type")]
    typ: &'static str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: Vec<ReplyMessage<'a>>,
}

/// Client for the Messaging API reply endpoint.
#[derive(Clone)]
pub struct LineChannel {
    api_base: String,
    access_token: String,
    client: reqwest::Client,
}

impl LineChannel {
    pub fn new(access_token: String, api_base: Option<String>) -> Self {
        let api_base = api_base
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| LINE_API_BASE.to_string());
        Self {
            api_base,
            access_token,
            client: reqwest::Client::new(),
        }
    }

    /// POST /v2/bot/message/reply with a single text message.
    pub async fn reply_text(&self, reply_token: &str, text: &str) -> Result<(), ChannelError> {
        let url = format!("{}/v2/bot/message/reply", self.api_base);
        let body = ReplyRequest {
            reply_token,
            messages: vec![ReplyMessage { typ: "text", text }],
        };
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ChannelError::Api(format!("{} {}", status, body)));
        }
        Ok(())
    }
}

#[async_trait]
impl ReplySender for LineChannel {
    async fn reply(&self, reply_token: &str, text: &str) -> Result<(), ChannelError> {
        self.reply_text(reply_token, text).await
    }
}
