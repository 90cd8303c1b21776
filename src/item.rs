use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Rising,
    Hit,
    Escaped,
}

/// A pollution token rising through the play area
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub key: char,
    /// horizontal offset as a fraction of the play area width
    pub position: f64,
    pub spawned_at: Duration,
    pub travel: Duration,
    pub state: ItemState,
    pub hit_at: Option<Duration>,
}

impl Item {
    pub fn new(id: ItemId, key: char, position: f64, spawned_at: Duration, travel: Duration) -> Self {
        Self {
            id,
            key,
            position: position.clamp(0.0, 1.0),
            spawned_at,
            travel,
            state: ItemState::Rising,
            hit_at: None,
        }
    }

    pub fn is_rising(&self) -> bool {
        self.state == ItemState::Rising
    }

    /// Fraction of the climb completed at `now`, frozen once hit
    pub fn progress(&self, now: Duration) -> f64 {
        let at = match self.hit_at {
            Some(hit) => hit,
            None => now,
        };
        if self.travel.is_zero() {
            return 1.0;
        }
        let climbed = at.saturating_sub(self.spawned_at).as_secs_f64();
        (climbed / self.travel.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn mark_hit(&mut self, now: Duration) {
        self.state = ItemState::Hit;
        self.hit_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> Item {
        Item::new(
            ItemId(1),
            'w',
            0.5,
            Duration::from_millis(1000),
            Duration::from_millis(2000),
        )
    }

    #[test]
    fn new_item_is_rising() {
        let it = item();
        assert!(it.is_rising());
        assert_eq!(it.hit_at, None);
        assert_eq!(it.progress(Duration::from_millis(3000)), 1.0);
    }

    #[test]
    fn progress_tracks_travel() {
        let it = item();
        assert_eq!(it.progress(Duration::from_millis(500)), 0.0);
        assert_eq!(it.progress(Duration::from_millis(1000)), 0.0);
        assert_eq!(it.progress(Duration::from_millis(2000)), 0.5);
        assert_eq!(it.progress(Duration::from_millis(5000)), 1.0);
    }

    #[test]
    fn progress_freezes_on_hit() {
        let mut it = item();
        it.mark_hit(Duration::from_millis(1500));
        assert_eq!(it.state, ItemState::Hit);
        assert_eq!(it.progress(Duration::from_millis(2900)), 0.25);
    }

    #[test]
    fn position_is_clamped() {
        let it = Item::new(ItemId(2), 'a', 1.7, Duration::ZERO, Duration::from_secs(1));
        assert_eq!(it.position, 1.0);
    }
}
