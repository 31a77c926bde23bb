pub mod imposter;
pub mod lobby;
pub mod net;
pub mod player;
pub mod words;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::lobby::Lobby;
    use crate::player::Player;

    /// Create `n` test players named `Player1` through `PlayerN`.
    pub fn make_players(n: usize) -> Vec<Player> {
        (0..n).map(|i| Player::new(format!("Player{}", i + 1))).collect()
    }

    /// Create a lobby with a fixed code and `n` players already joined.
    pub fn make_lobby(n: usize) -> Lobby {
        let mut lobby = Lobby::new("TESTAB".to_string());
        for player in make_players(n) {
            assert!(lobby.add_player(player.name));
        }
        lobby
    }

    /// A deterministic rng for tests.
    pub fn seeded_rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }
}
