//! Server configuration from environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use alarm_core::DEFAULT_HISTORY_CAPACITY;
use alarm_opensky::{Credentials, DEFAULT_BASE_URL};

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub settings_path: PathBuf,
    pub opensky_url: String,
    pub opensky_username: Option<String>,
    pub opensky_password: Option<String>,
    pub opensky_timeout_secs: u64,
    pub history_capacity: usize,
    /// Requested audio tick period in microseconds
    pub audio_tick_us: u64,
    pub initial_scan_delay_secs: u64,
    /// Directory holding level1.u8 .. level3.u8; synthesized clips when unset
    pub clip_dir: Option<PathBuf>,
    /// File or FIFO receiving raw unsigned 8-bit PCM
    pub pcm_sink: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: parse_env("ALARM_PORT", 3000),
            settings_path: env::var("ALARM_SETTINGS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/settings.json")),
            opensky_url: env::var("OPENSKY_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            opensky_username: non_empty_env("OPENSKY_USERNAME"),
            opensky_password: non_empty_env("OPENSKY_PASSWORD"),
            opensky_timeout_secs: parse_env("OPENSKY_TIMEOUT_SECS", 10),
            history_capacity: parse_env("ALARM_HISTORY_CAPACITY", DEFAULT_HISTORY_CAPACITY),
            audio_tick_us: parse_env("ALARM_AUDIO_TICK_US", 1000).max(1),
            initial_scan_delay_secs: parse_env("ALARM_INITIAL_SCAN_DELAY_SECS", 5),
            clip_dir: non_empty_env("ALARM_CLIP_DIR").map(PathBuf::from),
            pcm_sink: non_empty_env("ALARM_PCM_SINK").map(PathBuf::from),
        }
    }

    pub fn audio_tick(&self) -> Duration {
        Duration::from_micros(self.audio_tick_us)
    }

    /// Nominal sample rate implied by the tick period.
    pub fn audio_rate_hz(&self) -> u32 {
        (1_000_000 / self.audio_tick_us.max(1)).clamp(1, u64::from(u32::MAX)) as u32
    }

    pub fn opensky_timeout(&self) -> Duration {
        Duration::from_secs(self.opensky_timeout_secs)
    }

    pub fn initial_scan_delay(&self) -> Duration {
        Duration::from_secs(self.initial_scan_delay_secs)
    }

    pub fn opensky_credentials(&self) -> Option<Credentials> {
        match (&self.opensky_username, &self.opensky_password) {
            (Some(username), Some(password)) => Some(Credentials {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
