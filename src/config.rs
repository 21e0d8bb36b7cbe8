use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

fn default_max_file_size() -> usize {
    // 10 MB in bytes
    10 * 1024 * 1024
}

fn default_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub max_file_size: usize,
    pub session_idle: Duration,
    pub max_sessions: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            max_file_size: default_max_file_size(),
            session_idle: Duration::from_secs(30 * 60),
            max_sessions: 1000,
        }
    }
}

impl Config {
    pub fn new() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        let defaults = Config::default();
        Ok(Config {
            addr: env_or("DIAGNOSTICS_ADDR", defaults.addr)?,
            max_file_size: env_or("DIAGNOSTICS_MAX_UPLOAD_BYTES", defaults.max_file_size)?,
            session_idle: Duration::from_secs(env_or(
                "DIAGNOSTICS_SESSION_IDLE_SECS",
                defaults.session_idle.as_secs(),
            )?),
            max_sessions: env_or("DIAGNOSTICS_MAX_SESSIONS", defaults.max_sessions)?,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}

pub fn load_config() -> Result<Config> {
    Config::new()
}
