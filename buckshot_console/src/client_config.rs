use std::time::Duration;

use anyhow::Context;
use buckshot_client::animation::{SHOT_COMPLETE_DELAY, SHOT_RETURN_DELAY, ShotTimings};
use buckshot_client::client::{POLL_INTERVAL, REFRESH_INTERVAL};
use serde::{Deserialize, Serialize};
use url::Url;


pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

// Durations are written the human way: "1s", "250ms".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: Url,
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub tick_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub shot_return_delay: Duration,
    #[serde(with = "humantime_serde")]
    pub shot_complete_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            server_url: Url::parse(DEFAULT_SERVER_URL).expect("default server URL is valid"),
            poll_interval: POLL_INTERVAL,
            tick_interval: REFRESH_INTERVAL,
            shot_return_delay: SHOT_RETURN_DELAY,
            shot_complete_delay: SHOT_COMPLETE_DELAY,
        }
    }
}

impl ClientConfig {
    pub fn shot_timings(&self) -> ShotTimings {
        ShotTimings {
            return_delay: self.shot_return_delay,
            complete_delay: self.shot_complete_delay,
        }
    }

    pub fn from_yaml(contents: &str) -> anyhow::Result<Self> {
        let config: ClientConfig = serde_yaml::from_str(contents).context("Parsing config file")?;
        if config.shot_return_delay > config.shot_complete_delay {
            anyhow::bail!(
                "shot_return_delay ({:?}) exceeds shot_complete_delay ({:?})",
                config.shot_return_delay,
                config.shot_complete_delay
            );
        }
        Ok(config)
    }
}

// Loads the config file if there is one, then applies command line overrides.
pub fn load_config(
    config_file: Option<&String>, server_url: Option<&String>,
) -> anyhow::Result<ClientConfig> {
    let mut config = match config_file {
        Some(filename) => {
            let contents = std::fs::read_to_string(filename)
                .with_context(|| format!("Reading config file '{filename}'"))?;
            ClientConfig::from_yaml(&contents)?
        }
        None => ClientConfig::default(),
    };
    if let Some(url) = server_url {
        config.server_url = Url::parse(url).with_context(|| format!("Invalid server URL '{url}'"))?;
    }
    Ok(config)
}
