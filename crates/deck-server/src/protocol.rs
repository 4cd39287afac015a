//! Bridge wire types: one JSON object per WebSocket text frame.

use deck_core::{ActionDescriptor, ActionExecutor, ActionOutcome};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Inbound request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeMessage {
    /// Message type tag. Every message is an action request; the tag is kept
    /// for clients that send it but not interpreted.
    #[serde(rename = "type", default)]
    pub kind: String,
    pub action: String,
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl BridgeMessage {
    pub fn into_descriptor(self) -> ActionDescriptor {
        ActionDescriptor::new(self.action, self.params.unwrap_or_default())
    }
}

/// Outbound reply, or a server-initiated broadcast.
///
/// `success` reports whether the request was understood and dispatched; the
/// action's own result is in `data`. `error` is only set when the frame could
/// not be handled at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ActionOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BridgeResponse {
    pub fn dispatched(request_id: Option<String>, outcome: ActionOutcome) -> Self {
        Self {
            request_id,
            success: true,
            data: Some(outcome),
            error: None,
        }
    }

    pub fn rejected(request_id: Option<String>, error: impl Into<String>) -> Self {
        Self {
            request_id,
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Error => "error",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decode `frame`, dispatch it, and build the reply.
///
/// A frame that is not a valid message is rejected; its `requestId` is still
/// echoed when the frame is a JSON object carrying one.
pub async fn handle_frame(executor: &ActionExecutor, frame: &str) -> BridgeResponse {
    let value: Value = match serde_json::from_str(frame) {
        Ok(v) => v,
        Err(e) => return BridgeResponse::rejected(None, e.to_string()),
    };
    let request_id = value
        .get("requestId")
        .and_then(Value::as_str)
        .map(str::to_string);
    let message: BridgeMessage = match serde_json::from_value(value) {
        Ok(m) => m,
        Err(e) => return BridgeResponse::rejected(request_id, e.to_string()),
    };
    let request_id = message.request_id.clone();
    let descriptor = message.into_descriptor();
    let outcome = executor.dispatch(&descriptor).await;
    BridgeResponse::dispatched(request_id, outcome)
}
