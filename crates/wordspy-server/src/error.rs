use wordspy_core::net::messages::ServerMessage;
use wordspy_core::net::protocol::ProtocolError;

/// Minimum roster size before a round can start.
pub const MIN_PLAYERS: usize = 4;

/// The failure modes an operation can report back to the connection that
/// requested it. Errors are always local to that connection: rendered as a
/// single `error` envelope, never broadcast, never fatal to the connection
/// or the lobby.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    LobbyNotFound,
    NameTaken(String),
    InsufficientPlayers { have: usize },
    MalformedMessage(String),
    UnknownMessageType(String),
    Internal(String),
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LobbyNotFound => write!(f, "Lobby not found."),
            Self::NameTaken(name) => write!(f, "The name \"{name}\" is already taken."),
            Self::InsufficientPlayers { have } => {
                write!(f, "At least {MIN_PLAYERS} players are needed to start (have {have}).")
            },
            Self::MalformedMessage(e) => write!(f, "Malformed message: {e}"),
            Self::UnknownMessageType(t) => write!(f, "Unknown message type: {t}"),
            // Details stay in the logs
            Self::Internal(_) => write!(f, "Internal server error."),
        }
    }
}

impl std::error::Error for GameError {}

impl GameError {
    /// The `error` envelope sent to the requesting connection.
    pub fn to_reply(&self) -> ServerMessage {
        ServerMessage::Error {
            message: self.to_string(),
        }
    }
}

impl From<ProtocolError> for GameError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::UnknownMessageType(tag) => Self::UnknownMessageType(tag),
            ProtocolError::SerializeError(e) => Self::Internal(e),
            other => Self::MalformedMessage(other.to_string()),
        }
    }
}
