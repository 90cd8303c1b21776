use std::time::Duration;

use crate::config::{Config, GameMode};

/// Score sampled at a clock tick, for the results chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorePoint {
    pub secs: f64,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Victory,
    Defeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Running,
    Finished(Outcome),
}

/// Score, lives and pacing for one run of the game
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub mode: GameMode,
    pub status: SessionStatus,
    pub score: u32,
    /// countdown in whole seconds, timed mode only
    pub time_remaining: Option<u32>,
    pub elapsed_secs: u32,
    pub lives: u32,
    pub life_charge: u32,
    pub difficulty_level: u32,
    pub generation_count: u32,
    pub min_items: usize,
    pub spawn_delay: Duration,
    pub travel_duration: Duration,
    pub error_flash: bool,
    // Results
    pub misses: u32,
    pub wrong_keys: u32,
    pub reaction_times_ms: Vec<f64>,
    pub score_timeline: Vec<ScorePoint>,
}

impl Session {
    /// Fresh session for `mode`, not yet running
    pub fn new(mode: GameMode, config: &Config) -> Self {
        Self {
            mode,
            status: SessionStatus::Idle,
            score: 0,
            time_remaining: match mode {
                GameMode::Timed => Some(config.round_secs),
                GameMode::Infinite => None,
            },
            elapsed_secs: 0,
            lives: config.start_lives(mode),
            life_charge: 0,
            difficulty_level: 0,
            generation_count: 0,
            min_items: config.min_items_on_screen,
            spawn_delay: config.spawn_delay(),
            travel_duration: config.travel(),
            error_flash: false,
            misses: 0,
            wrong_keys: 0,
            reaction_times_ms: Vec::new(),
            score_timeline: Vec::new(),
        }
    }

    /// What the menu shows before any round is picked
    pub fn idle(config: &Config) -> Self {
        Self::new(GameMode::Timed, config)
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.status {
            SessionStatus::Finished(o) => Some(o),
            _ => None,
        }
    }

    /// Credits a matched key. Returns how many lives the charge restored.
    pub fn register_hit(&mut self, max_lives: u32, charge_required: u32) -> u32 {
        self.score += 1;
        self.life_charge += 1;

        let mut restored = 0;
        while self.life_charge >= charge_required && self.lives < max_lives {
            self.lives = (self.lives + 1).min(max_lives);
            self.life_charge -= charge_required;
            restored += 1;
        }
        restored
    }

    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }

    pub fn lose_time(&mut self, secs: u32) {
        if let Some(t) = self.time_remaining.as_mut() {
            *t = t.saturating_sub(secs);
        }
    }

    pub fn is_out_of_lives(&self) -> bool {
        self.lives == 0
    }

    pub fn is_out_of_time(&self) -> bool {
        self.time_remaining == Some(0)
    }

    pub fn record_second(&mut self) {
        self.elapsed_secs += 1;
        if let Some(t) = self.time_remaining.as_mut() {
            *t = t.saturating_sub(1);
        }
        self.score_timeline.push(ScorePoint {
            secs: self.elapsed_secs as f64,
            score: self.score as f64,
        });
    }

    pub fn hits(&self) -> usize {
        self.reaction_times_ms.len()
    }

    pub fn avg_reaction_ms(&self) -> Option<f64> {
        crate::util::mean(&self.reaction_times_ms)
    }

    pub fn reaction_std_dev(&self) -> Option<f64> {
        crate::util::std_dev(&self.reaction_times_ms)
    }
}
