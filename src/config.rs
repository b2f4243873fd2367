use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::{EngineConfig, Eligibility};
use crate::error::WeightsError;
use crate::models::{Dimension, DimensionWeights, ScoringWeights};
use crate::services::{AppwriteConnection, PostgresConnection};

const ENV_PREFIX: &str = "MATRIMONY";
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    pub appwrite: Option<AppwriteSettings>,
    pub database: Option<DatabaseSettings>,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Which profile store backs the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Appwrite,
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    /// JSON seed file for the `memory` backend
    pub seed_path: Option<String>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            page_size: default_page_size(),
            max_candidates: default_max_candidates(),
            seed_path: None,
        }
    }
}

fn default_page_size() -> usize { 100 }
fn default_max_candidates() -> usize { 1000 }

#[derive(Debug, Clone, Deserialize)]
pub struct AppwriteSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
    #[serde(default = "default_profiles_collection")]
    pub profiles_collection: String,
}

fn default_profiles_collection() -> String { "profiles".to_string() }

impl From<AppwriteSettings> for AppwriteConnection {
    fn from(settings: AppwriteSettings) -> Self {
        Self {
            endpoint: settings.endpoint,
            api_key: settings.api_key,
            project_id: settings.project_id,
            database_id: settings.database_id,
            profiles_collection: settings.profiles_collection,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

impl From<&DatabaseSettings> for PostgresConnection {
    fn from(settings: &DatabaseSettings) -> Self {
        Self {
            url: settings.url.clone(),
            max_connections: settings.max_connections.unwrap_or(10),
            min_connections: settings.min_connections.unwrap_or(1),
            acquire_timeout_secs: settings.acquire_timeout_secs.unwrap_or(5),
            idle_timeout_secs: settings.idle_timeout_secs.unwrap_or(600),
        }
    }
}

/// Seeker profile cache
///
/// Off unless enabled. When on, a seeker's edits to their own profile reach
/// `find_matches` only after `ttl_secs`.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            redis_url: None,
            ttl_secs: None,
            l1_cache_size: None,
        }
    }
}

fn default_cache_enabled() -> bool { false }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    #[serde(default = "default_score_batch_size")]
    pub score_batch_size: usize,
    /// Require the candidate's preferences to accept the seeker as well
    #[serde(default)]
    pub mutual: bool,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            score_batch_size: default_score_batch_size(),
            mutual: false,
        }
    }
}

fn default_limit() -> usize { 20 }
fn default_max_limit() -> usize { 20 }
fn default_score_batch_size() -> usize { 256 }

impl MatchingSettings {
    pub fn engine_config(&self, store: &StoreSettings) -> EngineConfig {
        EngineConfig {
            eligibility: if self.mutual {
                Eligibility::Mutual
            } else {
                Eligibility::OneWay
            },
            max_limit: self.max_limit,
            max_candidates: store.max_candidates,
            score_batch_size: self.score_batch_size,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

/// Per-dimension weights; leaving all of them unset selects the even split
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct WeightsConfig {
    pub age: Option<f64>,
    pub height: Option<f64>,
    pub religion: Option<f64>,
    pub caste: Option<f64>,
    pub education: Option<f64>,
    pub occupation: Option<f64>,
    pub location: Option<f64>,
}

impl WeightsConfig {
    fn get(&self, dimension: Dimension) -> Option<f64> {
        match dimension {
            Dimension::Age => self.age,
            Dimension::Height => self.height,
            Dimension::Religion => self.religion,
            Dimension::Caste => self.caste,
            Dimension::Education => self.education,
            Dimension::Occupation => self.occupation,
            Dimension::Location => self.location,
        }
    }

    /// Validate into scoring weights
    ///
    /// Unset weights count as 0 once any weight is set.
    pub fn resolve(&self) -> Result<ScoringWeights, WeightsError> {
        if Dimension::ALL.iter().all(|d| self.get(*d).is_none()) {
            return Ok(ScoringWeights::EvenSplit);
        }

        for dimension in Dimension::ALL {
            if let Some(weight) = self.get(dimension) {
                if !weight.is_finite() || weight < 0.0 {
                    return Err(WeightsError::Negative(dimension.name()));
                }
            }
        }

        let weights = DimensionWeights {
            age: self.age.unwrap_or(0.0),
            height: self.height.unwrap_or(0.0),
            religion: self.religion.unwrap_or(0.0),
            caste: self.caste.unwrap_or(0.0),
            education: self.education.unwrap_or(0.0),
            occupation: self.occupation.unwrap_or(0.0),
            location: self.location.unwrap_or(0.0),
        };

        let sum = weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightsError::BadSum(sum));
        }

        Ok(ScoringWeights::Fixed(weights))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with MATRIMONY__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., MATRIMONY__SERVER__PORT -> server.port
            .add_source(env_source())
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        settings.try_deserialize()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Apply the well-known connection variables on top of the layered config
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let overrides = [
        ("database.url", env::var("DATABASE_URL").ok()),
        ("appwrite.endpoint", env::var("APPWRITE_ENDPOINT").ok()),
        ("appwrite.api_key", env::var("APPWRITE_API_KEY").ok()),
        ("appwrite.project_id", env::var("APPWRITE_PROJECT_ID").ok()),
        ("appwrite.database_id", env::var("APPWRITE_DATABASE_ID").ok()),
        ("cache.redis_url", env::var("REDIS_URL").ok()),
    ];

    let mut builder = Config::builder().add_source(settings);
    for (key, value) in overrides {
        if let Some(value) = value {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
