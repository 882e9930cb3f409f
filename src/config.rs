//! Server configuration read from the environment (and `.env`).

use crate::types::DEFAULT_ROUND_SECONDS;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_TICK_MILLIS: u64 = 1000;

/// Knobs of the game loop itself
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameSettings {
    /// Length of the discussion phase
    pub round_seconds: u32,
    /// Wall-clock length of one countdown step
    pub tick: Duration,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            round_seconds: DEFAULT_ROUND_SECONDS,
            tick: Duration::from_millis(DEFAULT_TICK_MILLIS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// JSON word bank replacing the built-in one
    pub word_bank_path: Option<PathBuf>,
    /// Directory served for everything that is not an API route
    pub static_dir: Option<PathBuf>,
    pub game: GameSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            word_bank_path: None,
            static_dir: None,
            game: GameSettings::default(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 4200))
}

impl ServerConfig {
    /// Load config from environment variables
    ///
    /// - IMPOSTOR_BIND_ADDR (default 0.0.0.0:4200)
    /// - IMPOSTOR_ROUND_SECONDS (default 420)
    /// - IMPOSTOR_TICK_MILLIS (default 1000)
    /// - IMPOSTOR_WORD_BANK (optional path)
    /// - IMPOSTOR_STATIC_DIR (optional path)
    pub fn from_env() -> Self {
        let bind_addr = parse_env("IMPOSTOR_BIND_ADDR").unwrap_or_else(default_bind_addr);

        let round_seconds = parse_env::<u32>("IMPOSTOR_ROUND_SECONDS")
            .filter(|s| {
                if *s == 0 {
                    tracing::warn!("IMPOSTOR_ROUND_SECONDS must be positive, using default");
                }
                *s > 0
            })
            .unwrap_or(DEFAULT_ROUND_SECONDS);

        let tick_millis = parse_env::<u64>("IMPOSTOR_TICK_MILLIS")
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_TICK_MILLIS);

        Self {
            bind_addr,
            word_bank_path: path_env("IMPOSTOR_WORD_BANK"),
            static_dir: path_env("IMPOSTOR_STATIC_DIR"),
            game: GameSettings {
                round_seconds,
                tick: Duration::from_millis(tick_millis),
            },
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid value for {}: {:?}", key, raw);
            None
        }
    }
}

fn path_env(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}
