//! Layered settings.
//!
//! Sources, lowest precedence first: built-in defaults, the TOML file
//! (`roic.toml` in the working directory unless `--config` names another),
//! then `ROIC_*` environment variables with `__` between nested keys, for
//! example `ROIC_SERVER__PORT=9000` or `ROIC_POLICY__TAX_RATE=0.21`.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use roic::QualityPolicy;
use serde::Deserialize;
use std::path::Path;

/// File read when `--config` is not given. Optional.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "roic.toml";

const ENV_PREFIX: &str = "ROIC";

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct ServerSettings {
    pub(crate) host: String,
    pub(crate) port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Forecast and fetch defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct ForecastSettings {
    /// Projection horizon when `--years` is not given.
    pub(crate) years: u32,
    /// Annual periods fetched per symbol.
    pub(crate) periods: u32,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            years: 3,
            periods: 5,
        }
    }
}

/// Everything the binary reads from configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) policy: QualityPolicy,
    pub(crate) server: ServerSettings,
    pub(crate) forecast: ForecastSettings,
    /// Also picked up from `ROIC_FMP_API_KEY`.
    pub(crate) fmp_api_key: Option<String>,
}

impl Settings {
    /// Loads and validates settings from the process environment.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, environment())
    }

    fn load_with(path: Option<&Path>, env: Environment) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings: Self = Config::builder()
            .add_source(file)
            .add_source(env)
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("failed to parse configuration")?;

        settings.validate()?;
        tracing::debug!(?settings.server, ?settings.forecast, "configuration loaded");
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        self.policy.validate().context("invalid [policy] section")?;
        anyhow::ensure!(
            (1..=roic::quality::MAX_PROJECTION_YEARS).contains(&self.forecast.years),
            "forecast.years must be between 1 and {}, got {}",
            roic::quality::MAX_PROJECTION_YEARS,
            self.forecast.years
        );
        anyhow::ensure!(self.forecast.periods > 0, "forecast.periods must be positive");
        Ok(())
    }

    /// The API key, ignoring blank values.
    pub(crate) fn api_key(&self) -> Option<&str> {
        self.fmp_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
