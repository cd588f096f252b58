//! Configuration file and environment overrides.
//!
//! The file is RON and every field is optional:
//!
//! ```ron
//! (
//!     source: (url: "https://www.eurogamer.net/", request_timeout_secs: 10),
//!     telegram: (chat_id: "484750060", disable_link_preview: false),
//!     schedule: (poll_interval_secs: 300, pacing_millis: 1000),
//!     log: (level: "info", file: Some("newswatch.log")),
//! )
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::LevelFilter;
use newswatch_engine::{FetchSettings, SourceBase, TelegramSettings, WatchSettings};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "newswatch.ron";
pub const CONFIG_PATH_ENV: &str = "NEWSWATCH_CONFIG";
const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
const CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";
const LOG_LEVEL_ENV: &str = "NEWSWATCH_LOG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub source: SourceConfig,
    pub telegram: TelegramConfig,
    pub schedule: ScheduleConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    pub user_agent: Option<String>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_bytes: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: "https://www.eurogamer.net/".to_string(),
            user_agent: None,
            connect_timeout_secs: 5,
            request_timeout_secs: 10,
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub api_base: String,
    pub bot_token: String,
    pub chat_id: String,
    pub disable_link_preview: bool,
    pub request_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        let defaults = TelegramSettings::default();
        Self {
            api_base: defaults.api_base,
            bot_token: defaults.bot_token,
            chat_id: defaults.chat_id,
            disable_link_preview: defaults.disable_link_preview,
            request_timeout_secs: defaults.request_timeout.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub poll_interval_secs: u64,
    pub pacing_millis: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 300,
            pacing_millis: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LogConfig {
    pub fn level_filter(&self) -> Option<LevelFilter> {
        self.level.trim().parse().ok()
    }
}

/// A loaded configuration plus problems to report once logging is up.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: WatchConfig,
    pub warnings: Vec<String>,
}

impl WatchConfig {
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    pub fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_ron(&text).map(Some),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Applies environment overrides; `lookup` is `std::env::var` in production.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup(BOT_TOKEN_ENV) {
            self.telegram.bot_token = token;
        }
        if let Some(chat_id) = lookup(CHAT_ID_ENV) {
            self.telegram.chat_id = chat_id;
        }
        if let Some(level) = lookup(LOG_LEVEL_ENV) {
            self.log.level = level;
        }
    }

    /// Replaces unusable values with defaults and describes each replacement.
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();
        let defaults = WatchConfig::default();

        if let Err(err) = SourceBase::parse(&self.source.url) {
            warnings.push(format!(
                "source.url '{}' is not a valid URL ({err}); using {}",
                self.source.url, defaults.source.url
            ));
            self.source.url = defaults.source.url.clone();
        }
        replace_zero(
            "schedule.poll_interval_secs",
            &mut self.schedule.poll_interval_secs,
            defaults.schedule.poll_interval_secs,
            &mut warnings,
        );
        replace_zero(
            "source.connect_timeout_secs",
            &mut self.source.connect_timeout_secs,
            defaults.source.connect_timeout_secs,
            &mut warnings,
        );
        replace_zero(
            "source.request_timeout_secs",
            &mut self.source.request_timeout_secs,
            defaults.source.request_timeout_secs,
            &mut warnings,
        );
        replace_zero(
            "source.max_bytes",
            &mut self.source.max_bytes,
            defaults.source.max_bytes,
            &mut warnings,
        );
        replace_zero(
            "telegram.request_timeout_secs",
            &mut self.telegram.request_timeout_secs,
            defaults.telegram.request_timeout_secs,
            &mut warnings,
        );
        if self.log.level_filter().is_none() {
            warnings.push(format!(
                "log.level '{}' is not a log level; using {}",
                self.log.level, defaults.log.level
            ));
            self.log.level = defaults.log.level.clone();
        }
        warnings
    }

    pub fn watch_settings(&self) -> WatchSettings {
        let mut fetch = FetchSettings {
            connect_timeout: Duration::from_secs(self.source.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.source.request_timeout_secs),
            max_bytes: self.source.max_bytes,
            ..FetchSettings::default()
        };
        if let Some(user_agent) = &self.source.user_agent {
            fetch.user_agent = user_agent.clone();
        }

        WatchSettings {
            source_url: self.source.url.clone(),
            fetch,
            telegram: TelegramSettings {
                api_base: self.telegram.api_base.clone(),
                bot_token: self.telegram.bot_token.clone(),
                chat_id: self.telegram.chat_id.clone(),
                disable_link_preview: self.telegram.disable_link_preview,
                request_timeout: Duration::from_secs(self.telegram.request_timeout_secs),
            },
            poll_interval: Duration::from_secs(self.schedule.poll_interval_secs),
            pacing: Duration::from_millis(self.schedule.pacing_millis),
        }
    }
}

fn replace_zero(name: &str, value: &mut u64, default: u64, warnings: &mut Vec<String>) {
    if *value == 0 {
        warnings.push(format!("{name} must be > 0; using {default}"));
        *value = default;
    }
}

/// Reads `path` (a missing file means defaults), applies the environment and
/// sanitizes. Never fails: problems become warnings and defaults are used.
pub fn load(path: &Path, lookup: impl Fn(&str) -> Option<String>) -> LoadedConfig {
    let mut warnings = Vec::new();
    let mut config = match WatchConfig::read(path) {
        Ok(Some(config)) => config,
        Ok(None) => WatchConfig::default(),
        Err(err) => {
            warnings.push(format!("{err}; using default configuration"));
            WatchConfig::default()
        }
    };
    config.apply_env(lookup);
    warnings.extend(config.sanitize());
    LoadedConfig { config, warnings }
}
