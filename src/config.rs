use anyhow::{Context, Result};
use config::{Config, Environment, File};
use log::info;
use serde::{Serialize, Deserialize};

use crate::i18n::Language;
use crate::scoring::DEFAULT_ENDPOINT;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ScoringSettings {
    pub endpoint: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub auth_token: Option<String>,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 60, // the hosted service cold-starts slowly
            connect_timeout_secs: 10,
            auth_token: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TimerSettings {
    pub tick_millis: u64,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self { tick_millis: 1000 }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Settings {
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub timer: TimerSettings,
    #[serde(default)]
    pub language: Language,
}

impl Settings {
    /// Defaults, then `writemate.toml` if present, then `WRITEMATE__*`
    /// environment variables (`WRITEMATE__SCORING__ENDPOINT`, ...).
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok(); // Don't fail if .env doesn't exist
        Self::load_from(Config::builder().add_source(File::with_name("writemate").required(false)))
    }

    /// Loads from an explicit file path instead of `writemate.toml`.
    pub fn load_file(path: &str) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::load_from(Config::builder().add_source(File::with_name(path)))
    }

    fn load_from(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let defaults = Settings::default();
        let settings: Settings = builder
            .set_default("scoring.endpoint", defaults.scoring.endpoint)?
            .set_default("scoring.timeout_secs", defaults.scoring.timeout_secs)?
            .set_default("scoring.connect_timeout_secs", defaults.scoring.connect_timeout_secs)?
            .set_default("timer.tick_millis", defaults.timer.tick_millis)?
            .set_default("language", defaults.language.as_str())?
            .add_source(Environment::with_prefix("WRITEMATE").separator("__"))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        settings.validate()?;
        info!("Configuration loaded (scoring endpoint: {})", settings.scoring.endpoint);
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.scoring.endpoint)
            .with_context(|| format!("Invalid scoring endpoint: {}", self.scoring.endpoint))?;
        anyhow::ensure!(self.timer.tick_millis > 0, "timer.tick_millis must be positive");
        Ok(())
    }
}
