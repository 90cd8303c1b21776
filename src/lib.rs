// Library surface shared by the binary and the headless integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod difficulty;
pub mod effects;
pub mod game;
pub mod item;
pub mod matcher;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod spawner;
pub mod ui;
pub mod util;
