//! Runtime settings read from the environment.

use std::str::FromStr;
use std::time::Duration;

/// Server and background-task settings.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Clock cadence.
    pub clock_tick: Duration,
    /// How often the selected tournament is pushed to the spectator feed.
    pub spectator_publish_interval: Duration,
    /// Snapshots older than this are reported as stale.
    pub spectator_staleness: Duration,
    pub store_retry_attempts: u32,
    pub store_retry_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            clock_tick: Duration::from_millis(1000),
            spectator_publish_interval: Duration::from_secs(5),
            spectator_staleness: Duration::from_secs(15),
            store_retry_attempts: 3,
            store_retry_delay_ms: 200,
        }
    }
}

impl AppConfig {
    /// Defaults overridden by HOST, PORT, CLOCK_TICK_MS, SPECTATOR_PUBLISH_SECS,
    /// SPECTATOR_STALE_SECS, STORE_RETRY_ATTEMPTS and STORE_RETRY_DELAY_MS.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(d.host),
            port: parse_or(&lookup, "PORT", d.port),
            clock_tick: Duration::from_millis(parse_or(
                &lookup,
                "CLOCK_TICK_MS",
                d.clock_tick.as_millis() as u64,
            )),
            spectator_publish_interval: Duration::from_secs(parse_or(
                &lookup,
                "SPECTATOR_PUBLISH_SECS",
                d.spectator_publish_interval.as_secs(),
            )),
            spectator_staleness: Duration::from_secs(parse_or(
                &lookup,
                "SPECTATOR_STALE_SECS",
                d.spectator_staleness.as_secs(),
            )),
            store_retry_attempts: parse_or(&lookup, "STORE_RETRY_ATTEMPTS", d.store_retry_attempts),
            store_retry_delay_ms: parse_or(&lookup, "STORE_RETRY_DELAY_MS", d.store_retry_delay_ms),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Default,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(v) if v > T::default() => v,
            _ => {
                log::warn!("Ignoring invalid {}={:?}, using default", key, raw);
                default
            }
        },
    }
}
