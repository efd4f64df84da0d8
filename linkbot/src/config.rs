//! services.json 配置
//!
//! 启动时读取一次，之后只读。缺少凭据或聊天名称不合法都视为致命错误。

use anyhow::{Context, Result, anyhow};
use processor_twitter::Credentials;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/services.json";

// 聊天 ID（可为负数）或 @username
static CHANNEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:-?\d+|@[A-Za-z][A-Za-z0-9_]{3,31})$").unwrap());

fn default_fetch_timeout() -> u64 {
    common::DEFAULT_FETCH_TIMEOUT.as_secs()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub channels: Vec<String>,
    pub dont_repeat_last_count: usize,
    pub twitter: TwitterConfig,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_seconds: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwitterConfig {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_secret: String,
    #[serde(default)]
    pub expand_urls: bool,
}

pub fn is_valid_channel(name: &str) -> bool {
    CHANNEL_REGEX.is_match(name)
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("File {} doesn't exist or can't be read", path))?;
        Self::parse(&data)
    }

    pub fn parse(data: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(data).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(channel) = self.channels.iter().find(|c| !is_valid_channel(c)) {
            return Err(anyhow!("Invalid channel '{}'", channel));
        }

        let twitter = &self.twitter;
        if [
            &twitter.consumer_key,
            &twitter.consumer_secret,
            &twitter.access_token,
            &twitter.access_secret,
        ]
        .iter()
        .any(|value| value.trim().is_empty())
        {
            return Err(anyhow!("Twitter keys cannot be empty"));
        }

        if self.fetch_timeout_seconds == 0 {
            return Err(anyhow!("fetchTimeoutSeconds must be positive"));
        }

        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            consumer_key: self.twitter.consumer_key.clone(),
            consumer_secret: self.twitter.consumer_secret.clone(),
            access_token: self.twitter.access_token.clone(),
            access_secret: self.twitter.access_secret.clone(),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }
}
