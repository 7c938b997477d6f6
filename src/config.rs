use std::{env, fmt::Display, str::FromStr, time::Duration};

use anyhow::{anyhow, Result};
use tracing::info;

#[derive(Debug)]
pub struct Config {
    pub api_base_url: String,
    /// Pause between a result arriving and scrolling it into view.
    pub scroll_delay: Duration,
    /// Edge length in pixels of the downloaded avatar.
    pub avatar_size: u32,
    pub avatar_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            api_base_url: try_load(&lookup, "PROFILE_FINDER_API_URL", "https://api.github.com")?,
            scroll_delay: Duration::from_millis(try_load(
                &lookup,
                "PROFILE_FINDER_SCROLL_DELAY_MS",
                "100",
            )?),
            avatar_size: try_load(&lookup, "PROFILE_FINDER_AVATAR_SIZE", "120")?,
            avatar_timeout: Duration::from_millis(try_load(
                &lookup,
                "PROFILE_FINDER_AVATAR_TIMEOUT_MS",
                "10000",
            )?),
        })
    }
}

fn try_load<T: FromStr>(lookup: impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim()
        .parse()
        .map_err(|e| anyhow!("Invalid {key} value {raw:?}: {e}"))
}
