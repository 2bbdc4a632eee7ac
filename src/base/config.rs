//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use chrono_tz::Tz;
use serde::Deserialize;

use super::types::Res;

/// Default channel for the startup announcement.
fn default_status_channel() -> String {
    "bots".to_string()
}

/// Default channel that love is relayed to.
fn default_love_channel() -> String {
    "love".to_string()
}

/// Default location of the team glossary.
fn default_glossary_url() -> String {
    "https://raw.githubusercontent.com/18F/the-glossary/main/glossary.yml".to_string()
}

/// Default timezone used when a user's own timezone is unknown.
fn default_timezone() -> String {
    "America/New_York".to_string()
}

/// Default reaction that marks a message as one of the best.
fn default_best_of_reaction() -> String {
    "best-of".to_string()
}

/// Default brain endpoint (in-memory).
fn default_brain_endpoint() -> String {
    "mem://".to_string()
}

/// Configuration for the crew-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    /// The shared configuration values.
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

/// The configuration values behind [`Config`].
#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Slack app token (`HUBOT_SLACK_APP_TOKEN`).
    pub slack_app_token: String,
    /// Slack bot token (`HUBOT_SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
    /// Channel that receives the startup announcement (`HUBOT_STATUS_CHANNEL`).
    #[serde(default = "default_status_channel")]
    pub status_channel: String,
    /// Channel that love is relayed to (`HUBOT_LOVE_CHANNEL`).
    #[serde(default = "default_love_channel")]
    pub love_channel: String,
    /// URL of the YAML glossary (`HUBOT_GLOSSARY_URL`).
    #[serde(default = "default_glossary_url")]
    pub glossary_url: String,
    /// IANA timezone used when a user has none (`HUBOT_DEFAULT_TIMEZONE`).
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
    /// Reaction name that triggers the best-of relay (`HUBOT_BEST_OF_REACTION`).
    #[serde(default = "default_best_of_reaction")]
    pub best_of_reaction: String,
    /// Optional channel that best-of permalinks are posted to (`HUBOT_BEST_OF_CHANNEL`).
    #[serde(default)]
    pub best_of_channel: Option<String>,
    /// Brain endpoint, e.g. `mem://` or `ws://localhost:8000` (`HUBOT_BRAIN_ENDPOINT`).
    #[serde(default = "default_brain_endpoint")]
    pub brain_endpoint: String,
    /// Brain username (`HUBOT_BRAIN_USERNAME`).
    #[serde(default)]
    pub brain_username: Option<String>,
    /// Brain password (`HUBOT_BRAIN_PASSWORD`).
    #[serde(default)]
    pub brain_password: Option<String>,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            slack_app_token: String::new(),
            slack_bot_token: String::new(),
            status_channel: default_status_channel(),
            love_channel: default_love_channel(),
            glossary_url: default_glossary_url(),
            default_timezone: default_timezone(),
            best_of_reaction: default_best_of_reaction(),
            best_of_channel: None,
            brain_endpoint: default_brain_endpoint(),
            brain_username: None,
            brain_password: None,
        }
    }
}

impl Config {
    /// Loads the configuration from `HUBOT_`-prefixed environment variables and,
    /// if present, a TOML file (`explicit_path`, or `.hidden/config.toml`).
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        Self::load_with_environment(explicit_path, config::Environment::default().prefix("HUBOT"))
    }

    /// Loads the configuration with an explicit environment source.
    pub fn load_with_environment(explicit_path: Option<&std::path::Path>, environment: config::Environment) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(environment);

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Checks the values that cannot be expressed by the types alone.
    pub fn validate(&self) -> Res<()> {
        if self.slack_app_token.is_empty() {
            return Err(anyhow::anyhow!("Slack app token must be set."));
        }

        if self.slack_bot_token.is_empty() {
            return Err(anyhow::anyhow!("Slack bot token must be set."));
        }

        if self.status_channel.trim().is_empty() {
            return Err(anyhow::anyhow!("Status channel must not be empty."));
        }

        self.timezone()?;

        Ok(())
    }

    /// The parsed default timezone.
    pub fn timezone(&self) -> Res<Tz> {
        self.default_timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("Invalid default timezone `{}`: {}", self.default_timezone, e))
    }
}
