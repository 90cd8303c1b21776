use cleanair::{
    app::{App, Flow},
    app_dirs::AppDirs,
    config::{Config, ConfigError, ConfigStore, FileConfigStore, GameMode, PenaltyKind, TimeUpRule},
    game::Game,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::LevelFilter;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    ffi::OsStr,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

const TICK_RATE_MS: u64 = 33;

/// reflex typing game: clear the smog before it drifts away
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal reflex game. Pollution clouds rise through the sky, each marked with a key; press it before the cloud escapes. Play a timed round or survive as long as you can."
)]
pub struct Cli {
    /// skip the menu and start a round right away
    #[clap(long, value_enum)]
    start: Option<GameMode>,

    /// length of a timed round in seconds
    #[clap(short = 's', long)]
    secs: Option<u32>,

    /// what a miss or wrong key costs in timed rounds
    #[clap(short = 'p', long, value_enum)]
    penalty: Option<PenaltyKind>,

    /// whether losing the last life ends a timed round early
    #[clap(long, value_enum)]
    time_up: Option<TimeUpRule>,

    /// seed for cloud keys and positions
    #[clap(long)]
    seed: Option<u64>,

    /// settings file to use instead of the default location
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// where to write the log
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// write the effective settings back to the settings file
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Command line flags win over the settings file
    fn apply(&self, config: &mut Config) {
        if let Some(secs) = self.secs {
            config.round_secs = secs;
        }
        if let Some(penalty) = self.penalty {
            config.penalty = penalty;
        }
        if let Some(rule) = self.time_up {
            config.time_up_rule = rule;
        }
    }

    fn store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    // the terminal belongs to the TUI, so logs go to a file
    if let Some(path) = cli.log_file.clone().or_else(AppDirs::log_path) {
        init_logging(&path);
    }
    log::set_max_level(LevelFilter::Warn);

    let store = cli.store();
    let mut config = store.load();
    cli.apply(&mut config);

    if let Err(e) = config.validate() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::ValueValidation, e).exit();
    }
    match effective_log_level(&config, std::env::var_os("RUST_LOG").as_deref()) {
        Ok(level) => log::set_max_level(level),
        Err(e) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::ValueValidation, e).exit();
        }
    }

    if cli.save_config {
        store.save(&config)?;
        log::info!("settings saved to {}", store.path().display());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let game = match cli.seed {
        Some(seed) => Game::with_seed(config, seed),
        None => Game::new(config),
    };
    let mut app = App::new(game).with_store(Box::new(store));
    if let Some(mode) = cli.start {
        app.start(mode);
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        log::error!("terminal loop failed: {e}");
    }
    result
}

/// With `RUST_LOG` set, env_logger's own filter decides, so the facade lets
/// everything through.
fn effective_log_level(
    config: &Config,
    rust_log: Option<&OsStr>,
) -> Result<LevelFilter, ConfigError> {
    let level = config.log_level_filter()?;
    Ok(match rust_log {
        Some(_) => LevelFilter::Trace,
        None => level,
    })
}

fn init_logging(path: &Path) {
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Trace)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init();
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    let size = terminal.size()?;
    app.resize(size.width, size.height);
    let mut last = Instant::now();

    loop {
        let event = runner.step();

        // the game clock follows wall time whatever event woke us up
        let now = Instant::now();
        app.on_tick(now.duration_since(last));
        last = now;

        match event {
            AppEvent::Tick => {}
            AppEvent::Resize => {
                let size = terminal.size()?;
                app.resize(size.width, size.height);
            }
            AppEvent::Key(key) => {
                if app.on_key(key) == Flow::Quit {
                    break;
                }
            }
        }

        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleanair::app::AppState;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["cleanair"]);

        assert_eq!(cli.start, None);
        assert_eq!(cli.secs, None);
        assert_eq!(cli.penalty, None);
        assert_eq!(cli.time_up, None);
        assert_eq!(cli.seed, None);
        assert!(!cli.save_config);
    }

    #[test]
    fn test_cli_parses_policies() {
        let cli = Cli::parse_from([
            "cleanair",
            "--start",
            "infinite",
            "--penalty",
            "time",
            "--time-up",
            "full-round",
            "--seed",
            "7",
        ]);

        assert_eq!(cli.start, Some(GameMode::Infinite));
        assert_eq!(cli.penalty, Some(PenaltyKind::Time));
        assert_eq!(cli.time_up, Some(TimeUpRule::FullRound));
        assert_eq!(cli.seed, Some(7));
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["cleanair", "--start", "endless"]).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["cleanair", "-s", "30", "-p", "time"]);
        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config.round_secs, 30);
        assert_eq!(config.penalty, PenaltyKind::Time);
        assert_eq!(config.time_up_rule, TimeUpRule::SuddenDeath);
    }

    #[test]
    fn test_cli_store_uses_given_path() {
        let cli = Cli::parse_from(["cleanair", "--config", "/tmp/cleanair-test.json"]);
        assert_eq!(cli.store().path(), Path::new("/tmp/cleanair-test.json"));
    }

    #[test]
    fn test_log_level_from_config() {
        let config = Config {
            log_level: "info".to_string(),
            ..Config::default()
        };
        assert_eq!(effective_log_level(&config, None), Ok(LevelFilter::Info));
        assert_eq!(
            effective_log_level(&Config::default(), None),
            Ok(LevelFilter::Warn)
        );
    }

    #[test]
    fn test_rust_log_opens_the_facade() {
        let env = OsStr::new("debug");
        assert_eq!(
            effective_log_level(&Config::default(), Some(env)),
            Ok(LevelFilter::Trace)
        );

        let config = Config {
            log_level: "loud".to_string(),
            ..Config::default()
        };
        assert!(effective_log_level(&config, Some(env)).is_err());
    }

    #[test]
    fn test_draw_menu_and_round() {
        let mut app = App::new(Game::with_seed(Config::default(), 1));
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        terminal
            .draw(|f| f.render_widget(&app, f.area()))
            .unwrap();
        let content: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(content.contains("CLEAN AIR"));

        app.start(GameMode::Timed);
        assert_eq!(app.state, AppState::Playing);
        terminal
            .draw(|f| f.render_widget(&app, f.area()))
            .unwrap();
        let content: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(content.contains("time 60s"));
    }

    #[test]
    fn test_tick_rate_constant() {
        assert!(TICK_RATE_MS > 0 && TICK_RATE_MS <= 100);
    }
}
