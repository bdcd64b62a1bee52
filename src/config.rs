use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::core::{AvailabilityChecker, MatchScorer, Ranker, DEFAULT_SUGGESTION_GAP_DAYS};
use crate::models::{AbsentSourcePolicy, ScoringWeights};
use crate::services::{EngineOptions, HistoryLimits};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub availability: AvailabilitySettings,
    #[serde(default)]
    pub recommendations: RecommendationSettings,
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

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    /// Unset or empty runs with the in-process cache only
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilitySettings {
    #[serde(default = "default_suggestion_gap_days")]
    pub suggestion_gap_days: i64,
    #[serde(default = "default_accessor_timeout_ms")]
    pub accessor_timeout_ms: u64,
}

impl Default for AvailabilitySettings {
    fn default() -> Self {
        Self {
            suggestion_gap_days: default_suggestion_gap_days(),
            accessor_timeout_ms: default_accessor_timeout_ms(),
        }
    }
}

fn default_suggestion_gap_days() -> i64 { DEFAULT_SUGGESTION_GAP_DAYS }
fn default_accessor_timeout_ms() -> u64 { 2_000 }

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationSettings {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    #[serde(default = "default_candidate_pool_multiplier")]
    pub candidate_pool_multiplier: usize,
    #[serde(default = "default_booking_history_limit")]
    pub booking_history_limit: i64,
    #[serde(default = "default_search_history_limit")]
    pub search_history_limit: i64,
    #[serde(default = "default_saved_properties_limit")]
    pub saved_properties_limit: i64,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            candidate_pool_multiplier: default_candidate_pool_multiplier(),
            booking_history_limit: default_booking_history_limit(),
            search_history_limit: default_search_history_limit(),
            saved_properties_limit: default_saved_properties_limit(),
        }
    }
}

fn default_limit() -> usize { 10 }
fn default_max_limit() -> usize { 100 }
fn default_candidate_pool_multiplier() -> usize { 5 }
fn default_booking_history_limit() -> i64 { 10 }
fn default_search_history_limit() -> i64 { 20 }
fn default_saved_properties_limit() -> i64 { 50 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
    #[serde(default)]
    pub absent_source_policy: AbsentSourcePolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_travel_profile_weight")]
    pub travel_profile: f64,
    #[serde(default = "default_preferences_weight")]
    pub preferences: f64,
    #[serde(default = "default_search_history_weight")]
    pub search_history: f64,
    #[serde(default = "default_saved_properties_weight")]
    pub saved_properties: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            travel_profile: default_travel_profile_weight(),
            preferences: default_preferences_weight(),
            search_history: default_search_history_weight(),
            saved_properties: default_saved_properties_weight(),
        }
    }
}

fn default_travel_profile_weight() -> f64 { 0.4 }
fn default_preferences_weight() -> f64 { 0.3 }
fn default_search_history_weight() -> f64 { 0.2 }
fn default_saved_properties_weight() -> f64 { 0.1 }

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
    /// 4. Environment variables (prefixed with STAY__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., STAY__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("STAY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("STAY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn scoring_weights(&self) -> ScoringWeights {
        let weights = &self.scoring.weights;
        ScoringWeights {
            travel_profile: weights.travel_profile,
            preferences: weights.preferences,
            search_history: weights.search_history,
            saved_properties: weights.saved_properties,
        }
    }

    pub fn ranker(&self) -> Ranker {
        Ranker::new(MatchScorer::new(
            self.scoring_weights(),
            self.scoring.absent_source_policy,
        ))
    }

    pub fn availability_checker(&self) -> AvailabilityChecker {
        AvailabilityChecker::new(self.availability.suggestion_gap_days)
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            accessor_timeout: Duration::from_millis(self.availability.accessor_timeout_ms),
            default_limit: self.recommendations.default_limit,
            max_limit: self.recommendations.max_limit,
            candidate_pool_multiplier: self.recommendations.candidate_pool_multiplier,
        }
    }

    pub fn history_limits(&self) -> HistoryLimits {
        HistoryLimits {
            bookings: self.recommendations.booking_history_limit,
            searches: self.recommendations.search_history_limit,
            saved_properties: self.recommendations.saved_properties_limit,
        }
    }
}

/// Let the conventional DATABASE_URL and REDIS_URL variables override the files
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(redis_url) = env::var("REDIS_URL") {
        builder = builder.set_override("cache.redis_url", redis_url)?;
    }

    builder.build()
}
