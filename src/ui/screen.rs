use ratatui::{buffer::Buffer, layout::Rect};

use crate::app::{App, AppState};
use crate::ui;

/// One full-screen view of the app
pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

pub struct MenuScreen;

impl Screen for MenuScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        ui::render_menu(app, area, buf);
    }
}

pub struct PlayScreen;

impl Screen for PlayScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        ui::render_play(app, area, buf);
        ui::render_particles(&app.effects, area, buf);
    }
}

/// The frozen play field with the leave-round question on top
pub struct ConfirmExitScreen;

impl Screen for ConfirmExitScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        ui::render_play(app, area, buf);
        ui::render_confirm_exit(area, buf);
    }
}

pub struct GameOverScreen;

impl Screen for GameOverScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        ui::render_game_over(app, area, buf);
        ui::render_particles(&app.effects, area, buf);
    }
}

pub fn current_screen(state: AppState) -> Box<dyn Screen> {
    match state {
        AppState::Menu => Box::new(MenuScreen),
        AppState::Playing => Box::new(PlayScreen),
        AppState::ConfirmExit => Box::new(ConfirmExitScreen),
        AppState::GameOver => Box::new(GameOverScreen),
    }
}
