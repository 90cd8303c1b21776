use rand::seq::SliceRandom;
use rand::Rng;

/// How many items a spawn tick should try to create.
///
/// Nothing at or above the ceiling. Below the floor the tick tops up with an
/// extra item, as long as that stays under the ceiling.
pub fn spawn_count(active: usize, floor: usize, ceiling: usize) -> usize {
    if active >= ceiling {
        return 0;
    }
    if active < floor && active + 1 < ceiling {
        2
    } else {
        1
    }
}

/// Picks uniformly among keys that are not currently live
pub fn pick_key<R: Rng + ?Sized>(keys: &[char], live: &[char], rng: &mut R) -> Option<char> {
    let free: Vec<char> = keys.iter().copied().filter(|k| !live.contains(k)).collect();
    free.choose(rng).copied()
}

/// Random horizontal offset for a new item
pub fn pick_position<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(0.0..1.0)
}
