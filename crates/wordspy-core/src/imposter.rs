use rand::Rng;

/// Number of imposters for an `n`-player round: one per four players,
/// never fewer than one, never more than three.
pub fn imposter_count(player_count: usize) -> usize {
    (player_count / 4).clamp(1, 3)
}

/// Pick distinct player indices in `[0, player_count)` to be imposters,
/// uniform without replacement. The target size is at most `player_count`
/// for every `player_count >= 1`, so rejection sampling always terminates.
/// Callers enforce the four-player minimum before a round starts.
pub fn select_imposters<R: Rng + ?Sized>(rng: &mut R, player_count: usize) -> Vec<usize> {
    let target = imposter_count(player_count);
    let mut picked = Vec::with_capacity(target);
    while picked.len() < target {
        let i = rng.random_range(0..player_count);
        if !picked.contains(&i) {
            picked.push(i);
        }
    }
    picked
}
