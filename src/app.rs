use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, info, warn};
use ratatui::layout::Rect;

use crate::config::{Config, ConfigStore, GameMode};
use crate::effects::Effects;
use crate::game::Game;
use crate::matcher::KeyOutcome;
use crate::session::Outcome;
use crate::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Menu,
    Playing,
    /// round paused while the player decides whether to leave
    ConfirmExit,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub game: Game,
    pub state: AppState,
    pub effects: Effects,
    /// last known terminal size, used to place hit sparks
    pub viewport: Rect,
    store: Option<Box<dyn ConfigStore>>,
}

impl App {
    pub fn new(game: Game) -> Self {
        Self {
            game,
            state: AppState::Menu,
            effects: Effects::new(),
            viewport: Rect::new(0, 0, 80, 24),
            store: None,
        }
    }

    /// Menu toggles are written back through `store`
    pub fn with_store(mut self, store: Box<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport = Rect::new(0, 0, width, height);
        self.effects.resize(width, height);
    }

    pub fn start(&mut self, mode: GameMode) {
        self.effects.clear();
        self.game.start(mode);
        self.state = AppState::Playing;
    }

    pub fn on_tick(&mut self, dt: Duration) {
        self.effects.update(dt.as_secs_f64());

        if self.state != AppState::Playing {
            return;
        }
        self.game.on_tick(dt);
        if self.game.has_finished() {
            self.enter_game_over();
        }
    }

    fn enter_game_over(&mut self) {
        self.state = AppState::GameOver;
        self.effects.clear();
        if self.game.session().outcome() == Some(Outcome::Victory) {
            self.effects.celebrate("VICTORY");
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        match self.state {
            AppState::Menu => match key.code {
                KeyCode::Char('t') => self.start(GameMode::Timed),
                KeyCode::Char('i') => self.start(GameMode::Infinite),
                KeyCode::Char('p') => self.update_config(|c| c.penalty = c.penalty.toggled()),
                KeyCode::Char('v') => {
                    self.update_config(|c| c.time_up_rule = c.time_up_rule.toggled())
                }
                KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
                _ => {}
            },
            AppState::Playing => match key.code {
                KeyCode::Esc => self.state = AppState::ConfirmExit,
                KeyCode::Char(_)
                    if key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {}
                KeyCode::Char(c) => self.press(c),
                _ => {}
            },
            AppState::ConfirmExit => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.to_menu(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.state = AppState::Playing
                }
                _ => {}
            },
            AppState::GameOver => match key.code {
                KeyCode::Char('r') => self.start(self.game.last_mode()),
                KeyCode::Char('m') => self.to_menu(),
                KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
                _ => {}
            },
        }
        Flow::Continue
    }

    fn press(&mut self, c: char) {
        let outcome = self.game.on_key(c);
        if outcome.is_penalty() {
            debug!("penalised press {outcome:?}");
        }
        if let KeyOutcome::Hit { id, restored_lives } = outcome {
            let field = ui::play_field(self.viewport);
            let cell = self
                .game
                .item(id)
                .and_then(|item| ui::item_cell(field, item, self.game.now()));
            if let Some((x, y)) = cell {
                self.effects.burst(x as f64, y as f64);
            }
            if restored_lives > 0 {
                info!("{restored_lives} life restored");
            }
        }
        if self.game.has_finished() {
            self.enter_game_over();
        }
    }

    fn to_menu(&mut self) {
        self.effects.clear();
        self.game.return_to_menu();
        self.state = AppState::Menu;
    }

    fn update_config(&mut self, change: impl FnOnce(&mut Config)) {
        let mut config = self.game.config().clone();
        change(&mut config);
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&config) {
                warn!("could not save settings: {e}");
            }
        }
        self.game.set_config(config);
    }
}
