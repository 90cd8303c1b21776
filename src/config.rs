use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The two ways a round can be played
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum GameMode {
    /// countdown round; survive until the clock runs out
    Timed,
    /// no clock; play until the last life is gone
    Infinite,
}

/// What a miss or a wrong key costs the player
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PenaltyKind {
    Life,
    Time,
}

impl PenaltyKind {
    pub fn toggled(self) -> Self {
        match self {
            PenaltyKind::Life => PenaltyKind::Time,
            PenaltyKind::Time => PenaltyKind::Life,
        }
    }
}

/// Whether losing the last life ends a timed round on the spot
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TimeUpRule {
    /// the last life lost ends the round in defeat; reaching zero time wins
    SuddenDeath,
    /// the round always runs to zero; it is won only if lives remain
    FullRound,
}

impl TimeUpRule {
    pub fn toggled(self) -> Self {
        match self {
            TimeUpRule::SuddenDeath => TimeUpRule::FullRound,
            TimeUpRule::FullRound => TimeUpRule::SuddenDeath,
        }
    }
}

pub const DEFAULT_KEYS: [char; 18] = [
    'w', 'a', 's', 'd', 'q', 'e', 'r', 't', 'y', 'f', 'g', 'h', 'j', 'z', 'x', 'c', 'v', 'b',
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub keys: Vec<char>,
    pub round_secs: u32,
    pub start_lives_timed: u32,
    pub start_lives_infinite: u32,
    pub max_lives: u32,
    pub life_charge_required: u32,
    pub min_items_on_screen: usize,
    pub max_items_on_screen: usize,
    pub difficulty_step: u32,
    pub travel_ms: u64,
    pub travel_floor_ms: u64,
    pub travel_decrement_ms: u64,
    pub spawn_delay_ms: u64,
    pub spawn_delay_floor_ms: u64,
    pub spawn_delay_decrement_ms: u64,
    pub hit_animation_ms: u64,
    pub error_flash_ms: u64,
    pub penalty: PenaltyKind,
    pub miss_time_penalty_secs: u32,
    pub wrong_key_time_penalty_secs: u32,
    pub time_up_rule: TimeUpRule,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keys: DEFAULT_KEYS.to_vec(),
            round_secs: 60,
            start_lives_timed: 3,
            start_lives_infinite: 3,
            max_lives: 6,
            life_charge_required: 10,
            min_items_on_screen: 4,
            max_items_on_screen: 8,
            difficulty_step: 10,
            travel_ms: 2000,
            travel_floor_ms: 500,
            travel_decrement_ms: 100,
            spawn_delay_ms: 400,
            spawn_delay_floor_ms: 200,
            spawn_delay_decrement_ms: 20,
            hit_animation_ms: 300,
            error_flash_ms: 150,
            penalty: PenaltyKind::Life,
            miss_time_penalty_secs: 2,
            wrong_key_time_penalty_secs: 1,
            time_up_rule: TimeUpRule::SuddenDeath,
            log_level: "warn".to_string(),
        }
    }
}

/// Why a configuration was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyKeySet,
    DuplicateKey(char),
    UnusableKey(char),
    ZeroDuration(&'static str),
    ZeroValue(&'static str),
    ItemBand { min: usize, max: usize },
    StartLivesAboveMax { start: u32, max: u32 },
    UnknownLogLevel(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyKeySet => write!(f, "key set must not be empty"),
            ConfigError::DuplicateKey(c) => write!(f, "key '{c}' appears more than once"),
            ConfigError::UnusableKey(c) => {
                write!(f, "key {c:?} cannot be used; keys must be printable and lowercase")
            }
            ConfigError::ZeroDuration(name) => write!(f, "{name} must be greater than zero"),
            ConfigError::ZeroValue(name) => write!(f, "{name} must be greater than zero"),
            ConfigError::ItemBand { min, max } => write!(
                f,
                "min_items_on_screen ({min}) must not exceed max_items_on_screen ({max})"
            ),
            ConfigError::StartLivesAboveMax { start, max } => {
                write!(f, "start lives ({start}) must not exceed max_lives ({max})")
            }
            ConfigError::UnknownLogLevel(level) => write!(f, "unknown log level '{level}'"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keys.is_empty() {
            return Err(ConfigError::EmptyKeySet);
        }
        for (i, &k) in self.keys.iter().enumerate() {
            if k.is_whitespace() || k.is_control() || k.is_uppercase() {
                return Err(ConfigError::UnusableKey(k));
            }
            if self.keys[..i].contains(&k) {
                return Err(ConfigError::DuplicateKey(k));
            }
        }

        for (name, ms) in [
            ("travel_ms", self.travel_ms),
            ("travel_floor_ms", self.travel_floor_ms),
            ("spawn_delay_ms", self.spawn_delay_ms),
            ("spawn_delay_floor_ms", self.spawn_delay_floor_ms),
            ("hit_animation_ms", self.hit_animation_ms),
            ("error_flash_ms", self.error_flash_ms),
        ] {
            if ms == 0 {
                return Err(ConfigError::ZeroDuration(name));
            }
        }

        for (name, v) in [
            ("round_secs", self.round_secs),
            ("start_lives_timed", self.start_lives_timed),
            ("start_lives_infinite", self.start_lives_infinite),
            ("max_lives", self.max_lives),
            ("life_charge_required", self.life_charge_required),
            ("difficulty_step", self.difficulty_step),
        ] {
            if v == 0 {
                return Err(ConfigError::ZeroValue(name));
            }
        }

        if self.max_items_on_screen == 0 {
            return Err(ConfigError::ZeroValue("max_items_on_screen"));
        }
        if self.min_items_on_screen > self.max_items_on_screen {
            return Err(ConfigError::ItemBand {
                min: self.min_items_on_screen,
                max: self.max_items_on_screen,
            });
        }

        for start in [self.start_lives_timed, self.start_lives_infinite] {
            if start > self.max_lives {
                return Err(ConfigError::StartLivesAboveMax {
                    start,
                    max: self.max_lives,
                });
            }
        }

        self.log_level_filter()?;
        Ok(())
    }

    pub fn log_level_filter(&self) -> Result<log::LevelFilter, ConfigError> {
        self.log_level
            .parse::<log::LevelFilter>()
            .map_err(|_| ConfigError::UnknownLogLevel(self.log_level.clone()))
    }

    pub fn start_lives(&self, mode: GameMode) -> u32 {
        match mode {
            GameMode::Timed => self.start_lives_timed,
            GameMode::Infinite => self.start_lives_infinite,
        }
    }

    pub fn travel(&self) -> Duration {
        Duration::from_millis(self.travel_ms)
    }

    pub fn spawn_delay(&self) -> Duration {
        Duration::from_millis(self.spawn_delay_ms)
    }

    pub fn hit_animation(&self) -> Duration {
        Duration::from_millis(self.hit_animation_ms)
    }

    pub fn error_flash(&self) -> Duration {
        Duration::from_millis(self.error_flash_ms)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = crate::app_dirs::AppDirs::config_path()
            .unwrap_or_else(|| PathBuf::from("cleanair_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => log::warn!(
                    "ignoring malformed config at {}: {e}",
                    self.path.display()
                ),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
