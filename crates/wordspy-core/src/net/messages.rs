use serde::{Deserialize, Serialize};

use crate::lobby::ChatEntry;
use crate::player::Role;

/// Envelopes sent by clients. The JSON `type` field discriminates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    CreateLobby,
    JoinLobby { code: String, name: String },
    StartGame { code: String },
    Chat { code: String, text: String },
    Vote { code: String, voted: String },
}

impl ClientMessage {
    /// Wire name of the envelope's `type` tag.
    pub fn message_type(&self) -> &'static str {
        match self {
            Self::CreateLobby => "createLobby",
            Self::JoinLobby { .. } => "joinLobby",
            Self::StartGame { .. } => "startGame",
            Self::Chat { .. } => "chat",
            Self::Vote { .. } => "vote",
        }
    }
}

/// Envelopes sent to clients.
///
/// `Role` is delivered per-player, never broadcast; the `word` field is
/// omitted entirely for imposters. Everything else fans out to the whole
/// lobby except `LobbyCreated` and `Error`, which go to the requester only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    LobbyCreated {
        code: String,
    },
    Error {
        message: String,
    },
    UpdatePlayers {
        players: Vec<String>,
    },
    Role {
        role: Role,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        word: Option<String>,
    },
    GameStarted,
    Chat {
        msg: ChatEntry,
    },
    #[serde(rename = "result", rename_all = "camelCase")]
    RoundResult {
        voted_out: Vec<String>,
        imposters: Vec<String>,
    },
}

impl ServerMessage {
    /// Wire name of the envelope's `type` tag.
    pub fn message_type(&self) -> &'static str {
        match self {
            Self::LobbyCreated { .. } => "lobbyCreated",
            Self::Error { .. } => "error",
            Self::UpdatePlayers { .. } => "updatePlayers",
            Self::Role { .. } => "role",
            Self::GameStarted => "gameStarted",
            Self::Chat { .. } => "chat",
            Self::RoundResult { .. } => "result",
        }
    }
}
