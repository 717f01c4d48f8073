//! Application-level configuration loading: ranking metric and storage backend.

use std::{env, fs, io::ErrorKind, path::PathBuf, str::FromStr};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TEAM_BINGO_BACK_CONFIG_PATH";
/// Environment variable that overrides the configured storage backend.
const STORE_ENV: &str = "BINGO_STORE";

/// Quantity the ranking is sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMetric {
    /// Completed lines on the board (0..=12).
    #[default]
    Lines,
    /// Number of completed missions.
    Completed,
}

/// Document store the server connects to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// MongoDB through `MONGO_URI` / `MONGO_DB`.
    #[default]
    Mongo,
    /// CouchDB through `COUCH_BASE_URL` / `COUCH_DB`.
    Couch,
    /// Process memory; data is lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(Self::Mongo),
            "couch" | "couchdb" => Ok(Self::Couch),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown store backend `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    ranking_metric: RankingMetric,
    store: StoreBackend,
}

impl AppConfig {
    /// Build a configuration explicitly, bypassing disk and environment.
    pub fn new(ranking_metric: RankingMetric, store: StoreBackend) -> Self {
        Self {
            ranking_metric,
            store,
        }
    }

    /// Load the application configuration from disk, then apply environment overrides.
    pub fn load() -> Self {
        let mut config = Self::from_file();
        if let Ok(raw) = env::var(STORE_ENV) {
            match raw.parse::<StoreBackend>() {
                Ok(store) => config.store = store,
                Err(err) => warn!(var = STORE_ENV, error = %err, "ignoring store override"),
            }
        }
        config
    }

    fn from_file() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        ranking_metric = ?app_config.ranking_metric,
                        store = ?app_config.store,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse the JSON configuration document; missing fields take their defaults.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Metric the ranking is sorted by.
    pub fn ranking_metric(&self) -> RankingMetric {
        self.ranking_metric
    }

    /// Storage backend to connect to.
    pub fn store(&self) -> StoreBackend {
        self.store
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    ranking_metric: RankingMetric,
    #[serde(default)]
    store: StoreBackend,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            ranking_metric: value.ranking_metric,
            store: value.store,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = AppConfig::parse("{}").unwrap();
        assert_eq!(config.ranking_metric(), RankingMetric::Lines);
        assert_eq!(config.store(), StoreBackend::Mongo);
    }

    #[test]
    fn fields_are_snake_case() {
        let config =
            AppConfig::parse(r#"{"ranking_metric": "completed", "store": "memory"}"#).unwrap();
        assert_eq!(config, AppConfig::new(RankingMetric::Completed, StoreBackend::Memory));
    }

    #[test]
    fn unknown_metric_is_rejected() {
        assert!(AppConfig::parse(r#"{"ranking_metric": "points"}"#).is_err());
    }

    #[test]
    fn store_override_accepts_aliases() {
        assert_eq!("CouchDB".parse::<StoreBackend>(), Ok(StoreBackend::Couch));
        assert_eq!(" mongo ".parse::<StoreBackend>(), Ok(StoreBackend::Mongo));
        assert!("redis".parse::<StoreBackend>().is_err());
    }
}
