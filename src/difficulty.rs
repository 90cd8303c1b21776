use std::time::Duration;

use crate::config::Config;
use crate::session::Session;

/// Tightens spawn pacing every `step` generated items
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyController {
    step: u32,
    base_min_items: usize,
    max_items: usize,
    travel_floor: Duration,
    travel_decrement: Duration,
    spawn_delay_floor: Duration,
    spawn_delay_decrement: Duration,
}

impl DifficultyController {
    pub fn from_config(config: &Config) -> Self {
        Self {
            step: config.difficulty_step,
            base_min_items: config.min_items_on_screen,
            max_items: config.max_items_on_screen,
            travel_floor: Duration::from_millis(config.travel_floor_ms),
            travel_decrement: Duration::from_millis(config.travel_decrement_ms),
            spawn_delay_floor: Duration::from_millis(config.spawn_delay_floor_ms),
            spawn_delay_decrement: Duration::from_millis(config.spawn_delay_decrement_ms),
        }
    }

    /// Applies a step when the session's generation count lands on one.
    /// Returns true when the spawn ticker has to be restarted.
    pub fn on_generation(&self, session: &mut Session) -> bool {
        if self.step == 0 || session.generation_count == 0 || session.generation_count % self.step != 0
        {
            return false;
        }

        session.difficulty_level += 1;
        session.min_items = self
            .max_items
            .min(self.base_min_items + (session.difficulty_level / 2) as usize);
        session.travel_duration = session
            .travel_duration
            .saturating_sub(self.travel_decrement)
            .max(self.travel_floor);
        session.spawn_delay = session
            .spawn_delay
            .saturating_sub(self.spawn_delay_decrement)
            .max(self.spawn_delay_floor);

        log::debug!(
            "difficulty {} -> travel {:?}, spawn delay {:?}, min items {}",
            session.difficulty_level,
            session.travel_duration,
            session.spawn_delay,
            session.min_items
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameMode;

    fn setup() -> (DifficultyController, Session) {
        let cfg = Config::default();
        (
            DifficultyController::from_config(&cfg),
            Session::new(GameMode::Timed, &cfg),
        )
    }

    #[test]
    fn only_steps_on_multiples() {
        let (dc, mut s) = setup();
        for g in 1..10 {
            s.generation_count = g;
            assert!(!dc.on_generation(&mut s));
        }
        assert_eq!(s.difficulty_level, 0);

        s.generation_count = 10;
        assert!(dc.on_generation(&mut s));
        assert_eq!(s.difficulty_level, 1);
        assert_eq!(s.travel_duration, Duration::from_millis(1900));
        assert_eq!(s.spawn_delay, Duration::from_millis(380));
        assert_eq!(s.min_items, 4);
    }

    #[test]
    fn min_items_rises_every_other_level() {
        let (dc, mut s) = setup();
        s.generation_count = 10;
        dc.on_generation(&mut s);
        dc.on_generation(&mut s);
        assert_eq!(s.difficulty_level, 2);
        assert_eq!(s.min_items, 5);
    }

    #[test]
    fn pacing_settles_at_floors() {
        let (dc, mut s) = setup();
        s.generation_count = 10;
        for _ in 0..40 {
            dc.on_generation(&mut s);
        }
        assert_eq!(s.difficulty_level, 40);
        assert_eq!(s.travel_duration, Duration::from_millis(500));
        assert_eq!(s.spawn_delay, Duration::from_millis(200));
        assert_eq!(s.min_items, 8);
    }

    #[test]
    fn zero_generations_never_steps() {
        let (dc, mut s) = setup();
        assert!(!dc.on_generation(&mut s));
    }
}
