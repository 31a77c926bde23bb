use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::ws::Utf8Bytes;
use tokio::sync::{Mutex, RwLock, mpsc};

use wordspy_core::imposter::select_imposters;
use wordspy_core::lobby::{self, ChatEntry, Lobby};
use wordspy_core::net::messages::ServerMessage;
use wordspy_core::net::protocol::encode_server_message;
use wordspy_core::player::Role;
use wordspy_core::words::WordList;

use crate::error::{GameError, MIN_PLAYERS};

/// Per-player sender for outbound WebSocket text frames. Bounded so a slow
/// client cannot grow memory without bound; `Utf8Bytes` clones are cheap
/// when a broadcast fans out.
pub type PlayerSender = mpsc::Sender<Utf8Bytes>;

/// One live lobby plus the outbound channels of its connected players,
/// keyed by display name (unique within the lobby).
pub struct LobbyEntry {
    lobby: Lobby,
    connections: HashMap<String, PlayerSender>,
}

impl LobbyEntry {
    fn new(lobby: Lobby) -> Self {
        Self {
            lobby,
            connections: HashMap::new(),
        }
    }

    /// Send one envelope to one player. Slow or gone clients are skipped.
    fn send_to(&self, name: &str, msg: &ServerMessage) {
        let Ok(text) = encode_server_message(msg) else {
            tracing::warn!(kind = msg.message_type(), "Failed to encode outbound message");
            return;
        };
        if let Some(sender) = self.connections.get(name)
            && let Err(e) = sender.try_send(text.into())
        {
            tracing::debug!(
                player = name, lobby = %self.lobby.code, error = %e,
                "Failed to send to player (slow or disconnected)"
            );
        }
    }

    /// Fan one envelope out to every connected player in the lobby.
    fn broadcast(&self, msg: &ServerMessage) {
        let Ok(text) = encode_server_message(msg) else {
            tracing::warn!(kind = msg.message_type(), "Failed to encode broadcast");
            return;
        };
        let bytes = Utf8Bytes::from(text);
        for (name, sender) in &self.connections {
            if let Err(e) = sender.try_send(bytes.clone()) {
                tracing::debug!(
                    player = name, lobby = %self.lobby.code, error = %e,
                    "Skipping broadcast to slow client"
                );
            }
        }
    }

    fn broadcast_player_list(&self) {
        self.broadcast(&ServerMessage::UpdatePlayers {
            players: self.lobby.player_names(),
        });
    }

    /// Fire the tally as soon as every current player has voted. Called
    /// after every vote and after every roster shrink, so a departure can
    /// complete a round instead of stranding it.
    fn maybe_finish_round(&mut self) {
        if !self.lobby.all_votes_in() {
            return;
        }
        let outcome = self.lobby.finish_round();
        tracing::info!(
            lobby = %self.lobby.code,
            voted_out = ?outcome.voted_out,
            "Round resolved"
        );
        self.broadcast(&ServerMessage::RoundResult {
            voted_out: outcome.voted_out,
            imposters: outcome.imposters,
        });
    }
}

/// All live lobbies. The map lock is held only to look up, insert, or
/// delete an entry; every lobby operation runs under the entry's own lock,
/// so work on different lobbies proceeds in parallel while operations on
/// one lobby never interleave. Lock order is map-then-entry, and no path
/// acquires the map lock while holding an entry lock.
pub struct LobbyRegistry {
    lobbies: RwLock<HashMap<String, Arc<Mutex<LobbyEntry>>>>,
    words: WordList,
}

impl LobbyRegistry {
    pub fn new(words: WordList) -> Self {
        Self {
            lobbies: RwLock::new(HashMap::new()),
            words,
        }
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    async fn get(&self, code: &str) -> Option<Arc<Mutex<LobbyEntry>>> {
        self.lobbies.read().await.get(code).map(Arc::clone)
    }

    /// Create a new empty lobby and return its code, retrying generation
    /// on collision with a live lobby.
    pub async fn create_lobby(&self) -> String {
        let mut lobbies = self.lobbies.write().await;
        let mut rng = rand::rng();
        let code = loop {
            let code = lobby::generate_code(&mut rng);
            if !lobbies.contains_key(&code) {
                break code;
            }
        };
        lobbies.insert(
            code.clone(),
            Arc::new(Mutex::new(LobbyEntry::new(Lobby::new(code.clone())))),
        );
        tracing::info!(%code, "Lobby created");
        code
    }

    /// Delete a lobby. Safe to call for a code that is not live.
    pub async fn remove_lobby(&self, code: &str) -> bool {
        self.lobbies.write().await.remove(code).is_some()
    }

    /// Add a player to a lobby and broadcast the updated roster to every
    /// member, the joiner included. Joining is allowed in both states; a
    /// mid-round joiner waits for the next round and counts toward the
    /// vote threshold from here on.
    pub async fn join(
        &self,
        code: &str,
        name: &str,
        sender: PlayerSender,
    ) -> Result<(), GameError> {
        let entry = self.get(code).await.ok_or(GameError::LobbyNotFound)?;
        let mut entry = entry.lock().await;
        if !entry.lobby.add_player(name.to_string()) {
            return Err(GameError::NameTaken(name.to_string()));
        }
        entry.connections.insert(name.to_string(), sender);
        entry.broadcast_player_list();
        tracing::info!(lobby = %code, player = name, "Player joined");
        Ok(())
    }

    /// Start a round: draw a word, pick imposters, assign roles, deliver
    /// each player's role privately (imposters never see the word), then
    /// broadcast the started signal.
    pub async fn start_game(&self, code: &str) -> Result<(), GameError> {
        let entry = self.get(code).await.ok_or(GameError::LobbyNotFound)?;
        let mut entry = entry.lock().await;
        let player_count = entry.lobby.players.len();
        if player_count < MIN_PLAYERS {
            return Err(GameError::InsufficientPlayers { have: player_count });
        }

        let (word, imposters) = {
            let mut rng = rand::rng();
            let word = self.words.pick(&mut rng).to_string();
            (word, select_imposters(&mut rng, player_count))
        };
        entry.lobby.begin_round(word.clone(), imposters);

        for i in 0..entry.lobby.players.len() {
            let player = &entry.lobby.players[i];
            let msg = match player.role {
                Role::Imposter => ServerMessage::Role {
                    role: Role::Imposter,
                    word: None,
                },
                _ => ServerMessage::Role {
                    role: Role::Normal,
                    word: Some(word.clone()),
                },
            };
            let name = player.name.clone();
            entry.send_to(&name, &msg);
        }
        entry.broadcast(&ServerMessage::GameStarted);
        tracing::info!(lobby = %code, players = player_count, "Game started");
        Ok(())
    }

    /// Append a chat line and relay it to every player, the sender
    /// included, in arrival order. Accepted in both states; a no-op when
    /// the lobby is absent or the sender is not in it.
    pub async fn chat(&self, code: &str, sender: &str, text: String) {
        let Some(entry) = self.get(code).await else {
            return;
        };
        let mut entry = entry.lock().await;
        if !entry.lobby.has_player(sender) {
            return;
        }
        let msg = ChatEntry {
            name: sender.to_string(),
            text,
        };
        entry.lobby.chat.push(msg.clone());
        entry.broadcast(&ServerMessage::Chat { msg });
    }

    /// Record a vote (last write wins until the tally) and resolve the
    /// round once every current player has voted. A no-op when the lobby
    /// is absent or the voter is not in it.
    pub async fn vote(&self, code: &str, voter: &str, voted: String) {
        let Some(entry) = self.get(code).await else {
            return;
        };
        let mut entry = entry.lock().await;
        if !entry.lobby.has_player(voter) {
            return;
        }
        entry.lobby.cast_vote(voter.to_string(), voted);
        entry.maybe_finish_round();
    }

    /// Remove a disconnected player. Deletes the lobby when it empties;
    /// otherwise broadcasts the shrunken roster and re-checks the vote
    /// threshold, since the departure may have completed the round.
    pub async fn leave(&self, code: &str, name: &str) {
        let mut lobbies = self.lobbies.write().await;
        let Some(entry_arc) = lobbies.get(code).map(Arc::clone) else {
            return;
        };
        let mut entry = entry_arc.lock().await;
        if !entry.lobby.remove_player(name) {
            return;
        }
        entry.connections.remove(name);
        tracing::info!(lobby = %code, player = name, "Player left");

        if entry.lobby.players.is_empty() {
            lobbies.remove(code);
            tracing::info!(%code, "Lobby closed");
            return;
        }
        drop(lobbies);

        entry.broadcast_player_list();
        entry.maybe_finish_round();
    }

    /// (active lobbies, connected players) for the health endpoint.
    pub async fn stats(&self) -> (usize, usize) {
        let lobbies = self.lobbies.read().await;
        let mut players = 0;
        for entry in lobbies.values() {
            players += entry.lock().await.lobby.players.len();
        }
        (lobbies.len(), players)
    }

    #[cfg(test)]
    pub async fn lobby_exists(&self, code: &str) -> bool {
        self.lobbies.read().await.contains_key(code)
    }

    /// Snapshot of a lobby's state for assertions.
    #[cfg(test)]
    pub async fn snapshot(&self, code: &str) -> Option<Lobby> {
        let entry = self.get(code).await?;
        let entry = entry.lock().await;
        Some(entry.lobby.clone())
    }
}
