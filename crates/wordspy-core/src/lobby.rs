use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::player::{Player, Role};

/// Length of a lobby code.
pub const CODE_LEN: usize = 6;

/// Alphabet for lobby codes. Visually ambiguous characters (`0/O/1/I`) are
/// excluded so codes survive being read aloud or scribbled down.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generate a lobby code. Uniqueness is the registry's job; this is pure
/// w.r.t. the injected rng.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Check that a string has lobby-code shape.
pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LEN && code.bytes().all(|b| CODE_ALPHABET.contains(&b))
}

/// Current state of a lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LobbyState {
    Waiting,
    Playing,
}

/// One chat line, append-only within a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub name: String,
    pub text: String,
}

/// What a completed round resolves to: every name tied for the most votes,
/// plus the real imposters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    pub voted_out: Vec<String>,
    pub imposters: Vec<String>,
}

/// A lobby and its round bookkeeping.
///
/// `players` is in join order; role assignment and the imposter index set
/// are positional, so the order is significant. `word` and `imposters` are
/// meaningful only while `state` is `Playing`.
#[derive(Debug, Clone)]
pub struct Lobby {
    pub code: String,
    pub players: Vec<Player>,
    pub chat: Vec<ChatEntry>,
    pub state: LobbyState,
    pub word: String,
    pub imposters: Vec<usize>,
    pub votes: HashMap<String, String>,
}

impl Lobby {
    pub fn new(code: String) -> Self {
        Self {
            code,
            players: Vec::new(),
            chat: Vec::new(),
            state: LobbyState::Waiting,
            word: String::new(),
            imposters: Vec::new(),
            votes: HashMap::new(),
        }
    }

    /// Display names in join order.
    pub fn player_names(&self) -> Vec<String> {
        self.players.iter().map(|p| p.name.clone()).collect()
    }

    pub fn has_player(&self, name: &str) -> bool {
        self.players.iter().any(|p| p.name == name)
    }

    /// Append a player with `role = Waiting`. Returns false if the name is
    /// already taken (exact string match); the roster is unchanged then.
    pub fn add_player(&mut self, name: String) -> bool {
        if self.has_player(&name) {
            return false;
        }
        self.players.push(Player::new(name));
        true
    }

    /// Remove a player by name, purging their own pending vote. Votes cast
    /// *for* the removed player stay countable. Returns false if no such
    /// player exists.
    pub fn remove_player(&mut self, name: &str) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p.name != name);
        if self.players.len() == before {
            return false;
        }
        self.votes.remove(name);
        true
    }

    /// Enter a round: record the word and imposter indices, assign every
    /// player's role by index membership, and reset the chat log.
    pub fn begin_round(&mut self, word: String, imposters: Vec<usize>) {
        self.word = word;
        self.state = LobbyState::Playing;
        for (i, player) in self.players.iter_mut().enumerate() {
            player.role = if imposters.contains(&i) {
                Role::Imposter
            } else {
                Role::Normal
            };
        }
        self.imposters = imposters;
        self.chat.clear();
    }

    /// Record a vote. Re-voting before the tally replaces the prior entry.
    pub fn cast_vote(&mut self, voter: String, voted: String) {
        self.votes.insert(voter, voted);
    }

    /// True when every current player has a vote on record.
    pub fn all_votes_in(&self) -> bool {
        !self.players.is_empty() && self.votes.len() == self.players.len()
    }

    /// Resolve the round: tally the votes, clear them, and revert to
    /// `Waiting`. `voted_out` holds every name tied for the maximum count,
    /// sorted for a stable wire order.
    pub fn finish_round(&mut self) -> RoundOutcome {
        let mut tally: HashMap<&str, usize> = HashMap::new();
        for voted in self.votes.values() {
            *tally.entry(voted).or_insert(0) += 1;
        }
        let max = tally.values().copied().max().unwrap_or(0);
        let mut voted_out: Vec<String> = tally
            .into_iter()
            .filter(|&(_, count)| count == max)
            .map(|(name, _)| name.to_string())
            .collect();
        voted_out.sort();

        let outcome = RoundOutcome {
            voted_out,
            imposters: self.imposter_names(),
        };
        self.votes.clear();
        self.state = LobbyState::Waiting;
        outcome
    }

    /// Resolve the imposter index set to display names, in index order.
    pub fn imposter_names(&self) -> Vec<String> {
        self.imposters
            .iter()
            .filter_map(|&i| self.players.get(i))
            .map(|p| p.name.clone())
            .collect()
    }
}
