//! Webhook alert dispatch.

use std::time::Duration;

use serde_json::{Map, Value};
use tracing::debug;

use jobwatch_health::HttpClient;

/// Payload conventions tried in order. Discord reads `content`,
/// Slack reads `text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    Content,
    Text,
}

impl PayloadShape {
    pub const ORDER: [PayloadShape; 2] = [PayloadShape::Content, PayloadShape::Text];

    pub fn key(self) -> &'static str {
        match self {
            PayloadShape::Content => "content",
            PayloadShape::Text => "text",
        }
    }

    pub fn encode(self, message: &str) -> Value {
        let mut payload = Map::new();
        payload.insert(self.key().to_string(), Value::String(message.to_string()));
        Value::Object(payload)
    }
}

/// Send `message` to `webhook_url`, if one is configured. Never fails.
pub async fn dispatch(message: &str, webhook_url: Option<&str>, timeout: Duration) {
    let Some(url) = webhook_url.filter(|u| !u.trim().is_empty()) else {
        return;
    };
    match HttpClient::new() {
        Ok(client) => {
            dispatch_with(&client, message, url, timeout).await;
        }
        Err(e) => debug!(error = %e, "alert client setup failed"),
    }
}

/// Try each payload shape until one is accepted.
///
/// An attempt fails on any transport error, timeout or non-2xx status.
/// Returns the shape that was accepted, or `None` if every attempt failed.
pub async fn dispatch_with(
    client: &HttpClient,
    message: &str,
    webhook_url: &str,
    timeout: Duration,
) -> Option<PayloadShape> {
    for shape in PayloadShape::ORDER {
        let payload = shape.encode(message);
        match client.post_json(webhook_url, &payload, timeout).await {
            Ok(resp) if resp.is_success() => {
                debug!(shape = shape.key(), status = resp.status, "alert delivered");
                return Some(shape);
            }
            Ok(resp) => {
                debug!(shape = shape.key(), status = resp.status, "alert rejected");
            }
            Err(e) => {
                debug!(shape = shape.key(), error = %e, "alert send failed");
            }
        }
    }
    None
}
