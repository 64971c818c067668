use std::fmt;
use std::path::Path;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder};
use serde::Deserialize;

use crate::constants::{DEFAULT_EDIT_SUMMARY, DEFAULT_TIMEZONE};
use crate::error::{CoreError, CoreResult};

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "TERMINE";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub calendar: CalendarConfig,
    pub wiki: Option<WikiConfig>,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    /// Feed location: `http(s)://`, `file://` or a plain path
    pub url: String,
    /// IANA zone that UTC and zoned feed times are shown in
    pub timezone: String,
    #[serde(default)]
    pub replace_links: Vec<LinkReplacement>,
}

/// Substitutes a keyword in event locations with wiki markup.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LinkReplacement {
    pub keyword: String,
    pub link: String,
}

#[derive(Clone, Deserialize)]
pub struct WikiConfig {
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub page_title: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub edit_summary: String,
    /// Text placed in an HTML comment above the table
    pub info: Option<String>,
}

impl fmt::Debug for WikiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WikiConfig")
            .field("api_url", &self.api_url)
            .field("page_title", &self.page_title)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("edit_summary", &self.edit_summary)
            .field("info", &self.info)
            .finish()
    }
}

impl WikiConfig {
    /// ## Summary
    /// Returns whether every value needed to log in and edit the page is set.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [&self.api_url, &self.page_title, &self.username, &self.password]
            .iter()
            .all(|v| !v.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from defaults, a TOML file and `TERMINE__*`
    /// environment variables, in increasing precedence.
    ///
    /// Without an explicit path, `config.toml` in the working directory is
    /// used when present.
    ///
    /// ## Errors
    /// Returns an error if building the configuration, deserializing it or
    /// validating it fails.
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Self::builder()?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Returns the wiki settings when publishing is fully configured.
    #[must_use]
    pub fn publish_target(&self) -> Option<&WikiConfig> {
        self.wiki.as_ref().filter(|wiki| wiki.is_complete())
    }

    fn builder() -> CoreResult<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("calendar.timezone", DEFAULT_TIMEZONE)?
            .set_default("logging.level", "info")?
            .set_default("wiki.edit_summary", DEFAULT_EDIT_SUMMARY)?)
    }

    fn validate(&self) -> CoreResult<()> {
        if self.calendar.url.trim().is_empty() {
            return Err(CoreError::InvalidSetting {
                key: "calendar.url",
                message: "must not be empty".to_string(),
            });
        }
        if let Some(entry) = self
            .calendar
            .replace_links
            .iter()
            .find(|entry| entry.keyword.is_empty())
        {
            return Err(CoreError::InvalidSetting {
                key: "calendar.replace_links",
                message: format!("empty keyword for link {}", entry.link),
            });
        }
        Ok(())
    }
}

/// ## Summary
/// Loads `.env` into the process environment, then the configuration.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config(path: Option<&Path>) -> CoreResult<Settings> {
    if let Err(error) = dotenvy::dotenv()
        && !error.not_found()
    {
        tracing::warn!(%error, "Ignoring unreadable .env file");
    }

    Settings::load(path)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
