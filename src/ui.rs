pub mod charting;
pub mod screen;

use std::time::Duration;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::effects::{Effects, ParticleKind};
use crate::item::{Item, ItemState};
use crate::session::{Outcome, Session};
use crate::util;

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

const STORY: &str = "The city is choking on smog. Every cloud that drifts past the rooftops \
                     makes the air a little worse.";
const INSTRUCTIONS: &str = "Press the key shown on a cloud to clear it before it reaches the top. \
                            Wrong keys and escaped clouds cost you.";
const CONFIRM_EXIT: &str = "Leave this round? (y)es / (n)o";

const PARTICLE_COLORS: [Color; 7] = [
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
    Color::Green,
    Color::Red,
    Color::Blue,
    Color::LightYellow,
];

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        screen::current_screen(self.state).render(self, area, buf);
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

fn play_layout(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(1), // hud
            Constraint::Min(3),    // sky
            Constraint::Length(1), // legend
        ])
        .split(area);
    (chunks[0], chunks[1], chunks[2])
}

fn play_block(flash: bool) -> Block<'static> {
    let border_style = if flash {
        bold().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(" sky ", Style::default().fg(Color::Cyan)))
}

/// Inner area of the play field for a frame of size `area`
pub fn play_field(area: Rect) -> Rect {
    let (_, field, _) = play_layout(area);
    play_block(false).inner(field)
}

/// Cell an item occupies: its offset picks the column, its climb the row
pub fn item_cell(field: Rect, item: &Item, now: Duration) -> Option<(u16, u16)> {
    if field.width == 0 || field.height == 0 {
        return None;
    }
    let col = (item.position * (field.width - 1) as f64).round() as u16;
    let rise = (item.progress(now) * (field.height - 1) as f64).round() as u16;
    let row = (field.height - 1).saturating_sub(rise);
    Some((field.x + col.min(field.width - 1), field.y + row))
}

fn item_style(item: &Item, now: Duration) -> Style {
    if item.state == ItemState::Hit {
        return bold().fg(Color::Green);
    }
    let climbed = item.progress(now);
    let color = if climbed < 0.5 {
        Color::Gray
    } else if climbed < 0.8 {
        Color::Yellow
    } else {
        Color::Red
    };
    bold().fg(color)
}

fn hud_line(session: &Session, max_lives: u32) -> Line<'static> {
    let hearts = format!(
        "{}{}",
        "♥".repeat(session.lives as usize),
        "♡".repeat(max_lives.saturating_sub(session.lives) as usize)
    );
    let clock = match session.time_remaining {
        Some(t) => format!("time {t}s"),
        None => format!("survived {}s", session.elapsed_secs),
    };

    Line::from(vec![
        Span::styled(format!("score {}", session.score), bold()),
        Span::raw("   "),
        Span::styled(clock, bold().add_modifier(Modifier::DIM)),
        Span::raw("   "),
        Span::styled(hearts, Style::default().fg(Color::Red)),
        Span::raw("   "),
        Span::styled(
            format!("level {}", session.difficulty_level),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ])
}

pub fn render_menu(app: &App, area: Rect, buf: &mut Buffer) {
    let config = app.game.config();
    let keys = config
        .keys
        .iter()
        .map(|k| k.to_ascii_uppercase())
        .join(" ");

    let lines = vec![
        Line::from(Span::styled("CLEAN AIR", bold().fg(Color::Green))),
        Line::default(),
        Line::from(Span::styled(STORY, italic())),
        Line::default(),
        Line::from(INSTRUCTIONS),
        Line::from(Span::styled(format!("keys: {keys}"), bold())),
        Line::default(),
        Line::from(Span::styled(
            format!(
                "timed: {}s, {} lives   infinite: {} lives   one life back every {} hits, up to {}",
                config.round_secs,
                config.start_lives_timed,
                config.start_lives_infinite,
                config.life_charge_required,
                config.max_lives
            ),
            Style::default().add_modifier(Modifier::DIM),
        )),
        Line::from(Span::styled(
            format!(
                "(p) penalty: {}   (v) time up: {}",
                config.penalty, config.time_up_rule
            ),
            italic().fg(Color::Gray),
        )),
        Line::default(),
        Line::from(Span::styled("(t)imed / (i)nfinite / (q)uit", italic())),
    ];

    let top = area.height.saturating_sub(lines.len() as u16) / 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([Constraint::Length(top), Constraint::Min(1)])
        .split(area);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
}

pub fn render_play(app: &App, area: Rect, buf: &mut Buffer) {
    let game = &app.game;
    let session = game.session();
    let (hud, sky, legend) = play_layout(area);

    Paragraph::new(hud_line(session, game.config().max_lives))
        .alignment(Alignment::Center)
        .render(hud, buf);

    let block = play_block(session.error_flash);
    let field = block.inner(sky);
    block.render(sky, buf);

    let now = game.now();
    for item in game.items() {
        let Some((x, y)) = item_cell(field, item, now) else {
            continue;
        };
        // smoke trail below a rising cloud
        if item.is_rising() && y + 1 < field.y + field.height {
            if let Some(cell) = buf.cell_mut((x, y + 1)) {
                cell.set_symbol("░");
                cell.set_style(Style::default().fg(Color::DarkGray));
            }
        }
        if let Some(cell) = buf.cell_mut((x, y)) {
            cell.set_symbol(&item.key.to_ascii_uppercase().to_string());
            cell.set_style(item_style(item, now));
        }
    }

    Paragraph::new(Span::styled("(esc) leave round", italic())).render(legend, buf);
}

pub fn render_confirm_exit(area: Rect, buf: &mut Buffer) {
    let width = (CONFIRM_EXIT.width() as u16 + 4).min(area.width);
    let height = area.height.min(3);
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    Clear.render(popup, buf);
    Paragraph::new(Span::styled(CONFIRM_EXIT, bold()))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" paused "),
        )
        .render(popup, buf);
}

pub fn render_game_over(app: &App, area: Rect, buf: &mut Buffer) {
    let session = app.game.session();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // headline
            Constraint::Length(1),
            Constraint::Min(1),    // chart
            Constraint::Length(1), // stats
            Constraint::Length(1), // reaction times
            Constraint::Length(1),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let (headline, style) = match session.outcome() {
        Some(Outcome::Victory) => ("VICTORY!", bold().fg(Color::Green)),
        _ => ("GAME OVER", bold().fg(Color::Red)),
    };
    Paragraph::new(Line::from(vec![
        Span::styled(headline, style),
        Span::styled(format!("   final score {}", session.score), bold()),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let (duration, top_score) =
        charting::compute_chart_params(&session.score_timeline, session.elapsed_secs as f64);
    let points = charting::chart_points(&session.score_timeline);
    let datasets = vec![Dataset::default()
        .marker(Marker::Braille)
        .style(Style::default().fg(Color::Magenta))
        .graph_type(GraphType::Line)
        .data(&points)];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([0.0, duration])
                .labels(vec![
                    Span::styled("0", bold()),
                    Span::styled(charting::format_label(duration), bold()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("score")
                .bounds([0.0, top_score])
                .labels(vec![
                    Span::styled("0", bold()),
                    Span::styled(charting::format_label(top_score), bold()),
                ]),
        )
        .render(chunks[2], buf);

    let hits = session.hits() as u32;
    let attempts = hits + session.misses + session.wrong_keys;
    Paragraph::new(Span::styled(
        format!(
            "{} hits   {} escaped   {} wrong keys   {}% acc",
            hits,
            session.misses,
            session.wrong_keys,
            util::percent(hits, attempts)
        ),
        bold(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);

    let reactions = match (session.avg_reaction_ms(), session.reaction_std_dev()) {
        (Some(avg), Some(sd)) => format!("reaction {avg:.0} ms avg   {sd:.2} sd"),
        _ => "no clouds cleared".to_string(),
    };
    Paragraph::new(Span::styled(
        reactions,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);

    Paragraph::new(Span::styled("(r)estart / (m)enu / (q)uit", italic())).render(chunks[6], buf);
}

/// Draws the particle overlay in frame coordinates
pub fn render_particles(effects: &Effects, area: Rect, buf: &mut Buffer) {
    for particle in &effects.particles {
        if particle.x < 0.0 || particle.y < 0.0 {
            continue;
        }
        let (x, y) = (particle.x as u16, particle.y as u16);
        if x >= area.width || y >= area.height {
            continue;
        }

        let color = PARTICLE_COLORS[particle.color_index % PARTICLE_COLORS.len()];
        let vitality = particle.vitality();
        let style = match particle.kind {
            ParticleKind::Letter { .. } => bold().fg(color),
            _ if vitality > 0.7 => bold().fg(color),
            _ if vitality > 0.3 => Style::default().fg(color),
            _ => Style::default().fg(color).add_modifier(Modifier::DIM),
        };

        if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
            cell.set_symbol(&particle.symbol.to_string());
            cell.set_style(style);
        }
    }
}
