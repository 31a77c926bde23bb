use serde::Serialize;
use serde_json::Value;

use super::messages::{ClientMessage, ServerMessage};

/// Maximum frame size in bytes, both directions.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024; // 64 KiB

/// The `type` tags understood from clients.
const CLIENT_MESSAGE_TYPES: &[&str] = &["createLobby", "joinLobby", "startGame", "chat", "vote"];

/// The `type` tags a server emits.
const SERVER_MESSAGE_TYPES: &[&str] = &[
    "lobbyCreated",
    "error",
    "updatePlayers",
    "role",
    "gameStarted",
    "chat",
    "result",
];

#[derive(Debug)]
pub enum ProtocolError {
    EmptyMessage,
    /// Not JSON, no `type` field, or fields that don't fit the tagged shape.
    MalformedEnvelope(String),
    /// Valid JSON with a `type` tag nothing routes to.
    UnknownMessageType(String),
    PayloadTooLarge(usize),
    SerializeError(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "empty message"),
            Self::MalformedEnvelope(e) => write!(f, "malformed envelope: {e}"),
            Self::UnknownMessageType(t) => write!(f, "unknown message type: {t}"),
            Self::PayloadTooLarge(size) => {
                write!(f, "payload too large: {size} bytes (max {MAX_MESSAGE_SIZE})")
            },
            Self::SerializeError(e) => write!(f, "serialize error: {e}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Pull the envelope apart in two stages, the `type` tag first and the
/// payload second, so an unknown tag is distinguishable from a malformed
/// payload.
fn decode_envelope(text: &str, known_types: &[&str]) -> Result<Value, ProtocolError> {
    if text.is_empty() {
        return Err(ProtocolError::EmptyMessage);
    }
    if text.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::PayloadTooLarge(text.len()));
    }
    let value: Value =
        serde_json::from_str(text).map_err(|e| ProtocolError::MalformedEnvelope(e.to_string()))?;
    let tag = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ProtocolError::MalformedEnvelope("missing `type` field".to_string()))?;
    if !known_types.contains(&tag) {
        return Err(ProtocolError::UnknownMessageType(tag.to_string()));
    }
    Ok(value)
}

fn encode_envelope<T: Serialize>(msg: &T) -> Result<String, ProtocolError> {
    let text =
        serde_json::to_string(msg).map_err(|e| ProtocolError::SerializeError(e.to_string()))?;
    if text.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::PayloadTooLarge(text.len()));
    }
    Ok(text)
}

/// Decode a text frame into a `ClientMessage`.
pub fn decode_client_message(text: &str) -> Result<ClientMessage, ProtocolError> {
    let value = decode_envelope(text, CLIENT_MESSAGE_TYPES)?;
    serde_json::from_value(value).map_err(|e| ProtocolError::MalformedEnvelope(e.to_string()))
}

/// Decode a text frame into a `ServerMessage`.
pub fn decode_server_message(text: &str) -> Result<ServerMessage, ProtocolError> {
    let value = decode_envelope(text, SERVER_MESSAGE_TYPES)?;
    serde_json::from_value(value).map_err(|e| ProtocolError::MalformedEnvelope(e.to_string()))
}

/// Encode a `ClientMessage` to wire format.
pub fn encode_client_message(msg: &ClientMessage) -> Result<String, ProtocolError> {
    encode_envelope(msg)
}

/// Encode a `ServerMessage` to wire format.
pub fn encode_server_message(msg: &ServerMessage) -> Result<String, ProtocolError> {
    encode_envelope(msg)
}
