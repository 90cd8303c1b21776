use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

use crate::config::{Config, GameMode, PenaltyKind, TimeUpRule};
use crate::difficulty::DifficultyController;
use crate::item::{Item, ItemId, ItemState};
use crate::matcher::{self, KeyMatch, KeyOutcome};
use crate::scheduler::{Scheduler, TimerKind};
use crate::session::{Outcome, Session, SessionStatus};
use crate::spawner;

const CLOCK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PenaltyCause {
    Escape,
    WrongKey,
}

/// Owns one session and everything that mutates it: the active items, the
/// timer queue and the spawner's random source.
#[derive(Debug)]
pub struct Game {
    config: Config,
    difficulty: DifficultyController,
    session: Session,
    items: Vec<Item>,
    scheduler: Scheduler,
    rng: StdRng,
    next_item_id: u64,
    last_mode: GameMode,
}

impl Game {
    pub fn new(config: Config) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic key and position choices, for replays and tests
    pub fn with_seed(config: Config, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: Config, rng: StdRng) -> Self {
        Self {
            difficulty: DifficultyController::from_config(&config),
            session: Session::idle(&config),
            items: Vec::new(),
            scheduler: Scheduler::new(),
            rng,
            next_item_id: 0,
            last_mode: GameMode::Timed,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// New settings take effect from the next session
    pub fn set_config(&mut self, config: Config) {
        self.difficulty = DifficultyController::from_config(&config);
        self.config = config;
        if self.session.status == SessionStatus::Idle {
            self.session = Session::idle(&self.config);
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|it| it.id == id)
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn last_mode(&self) -> GameMode {
        self.last_mode
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }

    pub fn has_finished(&self) -> bool {
        self.session.outcome().is_some()
    }

    pub fn start(&mut self, mode: GameMode) {
        self.cancel_session();
        self.last_mode = mode;
        self.session = Session::new(mode, &self.config);
        self.session.status = SessionStatus::Running;

        self.scheduler.schedule_in(CLOCK_PERIOD, TimerKind::Clock);
        self.scheduler
            .schedule_in(self.session.spawn_delay, TimerKind::Spawn);

        info!(
            "{} session started: {} lives, penalty {}, {}",
            mode, self.session.lives, self.config.penalty, self.config.time_up_rule
        );
    }

    pub fn restart(&mut self) {
        self.start(self.last_mode);
    }

    /// Drops the session and every pending timer. Calling it again is a no-op.
    pub fn return_to_menu(&mut self) {
        if self.session.status != SessionStatus::Idle || self.scheduler.pending() > 0 {
            info!("returning to menu, score {}", self.session.score);
        }
        self.cancel_session();
        self.session = Session::idle(&self.config);
    }

    fn cancel_session(&mut self) {
        self.scheduler.reset();
        self.items.clear();
        self.next_item_id = 0;
    }

    /// Advances the virtual clock by `dt`, firing every timer that comes due
    pub fn on_tick(&mut self, dt: Duration) {
        if !self.is_running() {
            return;
        }
        let target = self.scheduler.now() + dt;
        while let Some(kind) = self.scheduler.pop_due(target) {
            self.fire(kind);
        }
        self.scheduler.advance_to(target);
    }

    fn fire(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::Clock => self.clock_tick(),
            TimerKind::Spawn => {
                self.scheduler
                    .schedule_in(self.session.spawn_delay, TimerKind::Spawn);
                self.spawn_tick();
            }
            TimerKind::Escape(id) => self.escape(id),
            TimerKind::HitAnimation(id) => self.items.retain(|it| it.id != id),
            TimerKind::FlashEnd => self.session.error_flash = false,
        }
    }

    fn clock_tick(&mut self) {
        self.session.record_second();
        if self.session.is_out_of_time() {
            self.resolve_time_up();
        } else {
            self.scheduler.schedule_in(CLOCK_PERIOD, TimerKind::Clock);
        }
    }

    fn spawn_tick(&mut self) {
        let count = spawner::spawn_count(
            self.items.len(),
            self.session.min_items,
            self.config.max_items_on_screen,
        );
        for _ in 0..count {
            if !self.create_item() {
                break;
            }
        }
    }

    fn create_item(&mut self) -> bool {
        let live: Vec<char> = self.items.iter().map(|it| it.key).collect();
        let Some(key) = spawner::pick_key(&self.config.keys, &live, &mut self.rng) else {
            return false;
        };
        let position = spawner::pick_position(&mut self.rng);

        let id = ItemId(self.next_item_id);
        self.next_item_id += 1;

        let item = Item::new(
            id,
            key,
            position,
            self.scheduler.now(),
            self.session.travel_duration,
        );
        self.scheduler
            .schedule_in(item.travel, TimerKind::Escape(id));
        debug!("spawned {id} '{key}' travel {:?}", item.travel);
        self.items.push(item);

        self.session.generation_count += 1;
        if self.difficulty.on_generation(&mut self.session) {
            self.restart_spawn_ticker();
        }
        true
    }

    fn restart_spawn_ticker(&mut self) {
        self.scheduler.cancel(|k| *k == TimerKind::Spawn);
        self.scheduler
            .schedule_in(self.session.spawn_delay, TimerKind::Spawn);
    }

    fn escape(&mut self, id: ItemId) {
        let Some(idx) = self
            .items
            .iter()
            .position(|it| it.id == id && it.is_rising())
        else {
            return;
        };
        let mut item = self.items.remove(idx);
        item.state = ItemState::Escaped;
        self.session.misses += 1;
        debug!("{} '{}' {:?}", item.id, item.key, item.state);

        self.penalize(PenaltyCause::Escape);
    }

    /// Matches a keypress against the rising items
    pub fn on_key(&mut self, c: char) -> KeyOutcome {
        if !self.is_running() {
            return KeyOutcome::Ignored;
        }

        match matcher::classify(c, &self.config.keys, &self.items) {
            KeyMatch::Target(id) => self.hit(id),
            KeyMatch::Unrecognized(key) => {
                debug!("unrecognized key {key:?}");
                self.wrong_key();
                KeyOutcome::Unrecognized(key)
            }
            KeyMatch::NoTarget(key) => {
                debug!("no rising item for '{key}'");
                self.wrong_key();
                KeyOutcome::NoTarget(key)
            }
        }
    }

    fn hit(&mut self, id: ItemId) -> KeyOutcome {
        let now = self.scheduler.now();
        let reaction = match self.items.iter_mut().find(|it| it.id == id) {
            Some(item) => {
                item.mark_hit(now);
                now.saturating_sub(item.spawned_at)
            }
            None => return KeyOutcome::Ignored,
        };

        self.scheduler.cancel(|k| *k == TimerKind::Escape(id));
        self.scheduler
            .schedule_in(self.config.hit_animation(), TimerKind::HitAnimation(id));

        self.session
            .reaction_times_ms
            .push(reaction.as_millis() as f64);
        let restored_lives = self
            .session
            .register_hit(self.config.max_lives, self.config.life_charge_required);
        debug!(
            "hit {id} after {reaction:?}, score {}, charge {}",
            self.session.score, self.session.life_charge
        );
        if restored_lives > 0 {
            debug!("life restored, lives {}", self.session.lives);
        }

        KeyOutcome::Hit { id, restored_lives }
    }

    fn wrong_key(&mut self) {
        self.session.wrong_keys += 1;
        self.session.error_flash = true;
        self.scheduler.cancel(|k| *k == TimerKind::FlashEnd);
        self.scheduler
            .schedule_in(self.config.error_flash(), TimerKind::FlashEnd);
        self.penalize(PenaltyCause::WrongKey);
    }

    fn penalty_kind(&self) -> PenaltyKind {
        match self.session.mode {
            GameMode::Timed => self.config.penalty,
            GameMode::Infinite => PenaltyKind::Life,
        }
    }

    fn penalize(&mut self, cause: PenaltyCause) {
        match self.penalty_kind() {
            PenaltyKind::Life => {
                self.session.lose_life();
                if self.session.is_out_of_lives() && self.ends_on_last_life() {
                    self.finish(Outcome::Defeat);
                }
            }
            PenaltyKind::Time => {
                let secs = match cause {
                    PenaltyCause::Escape => self.config.miss_time_penalty_secs,
                    PenaltyCause::WrongKey => self.config.wrong_key_time_penalty_secs,
                };
                self.session.lose_time(secs);
                if self.session.is_out_of_time() {
                    self.resolve_time_up();
                }
            }
        }
    }

    fn ends_on_last_life(&self) -> bool {
        match self.session.mode {
            GameMode::Infinite => true,
            GameMode::Timed => self.config.time_up_rule == TimeUpRule::SuddenDeath,
        }
    }

    fn resolve_time_up(&mut self) {
        let outcome = if self.session.lives > 0 {
            Outcome::Victory
        } else {
            Outcome::Defeat
        };
        self.finish(outcome);
    }

    fn finish(&mut self, outcome: Outcome) {
        self.session.status = SessionStatus::Finished(outcome);
        self.session.life_charge = 0;
        self.session.error_flash = false;
        self.scheduler.clear();
        self.items.clear();
        info!(
            "{} session over: {:?}, score {}, {} misses, {} wrong keys",
            self.session.mode,
            outcome,
            self.session.score,
            self.session.misses,
            self.session.wrong_keys
        );
    }
}
