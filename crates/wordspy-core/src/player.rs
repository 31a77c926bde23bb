use serde::{Deserialize, Serialize};

/// A player in a Wordspy lobby.
///
/// The display name is chosen at join time, is unique within the lobby
/// (case-sensitive), and never changes for the lifetime of the connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub role: Role,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: Role::Waiting,
        }
    }
}

/// Role assigned at game start. `Waiting` outside a round and for players
/// who joined after the current round started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Waiting,
    Normal,
    Imposter,
}
