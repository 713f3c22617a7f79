use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use dotenv::dotenv;
use serde::Deserialize;
use log::{info, warn};

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub data: DataConfig,
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// CSV or JSON attempt log, re-read on every request.
    pub attempt_log_path: PathBuf,
}

/// Tunables of the analytics passes.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AnalyticsConfig {
    /// Level at which the before/after split happens.
    pub level_threshold: u32,
    /// Window length of the headline n-gram table.
    pub pattern_window: usize,
    /// Longest window of the deep pattern tables (from 2 up).
    pub max_pattern_length: usize,
    pub min_pattern_occurrences: usize,
    pub top_patterns: usize,
    /// When set, transition matrices also report the top-K destinations.
    pub transition_top_k: Option<usize>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            level_threshold: 7,
            pattern_window: 3,
            max_pattern_length: 6,
            min_pattern_occurrences: 3,
            top_patterns: 5,
            transition_top_k: None,
        }
    }
}

impl AnalyticsConfig {
    fn load() -> Self {
        let defaults = Self::default();
        Self {
            level_threshold: env_or("LEVEL_THRESHOLD", defaults.level_threshold),
            pattern_window: env_or("PATTERN_WINDOW", defaults.pattern_window),
            max_pattern_length: env_or("MAX_PATTERN_LENGTH", defaults.max_pattern_length),
            min_pattern_occurrences: env_or("MIN_PATTERN_OCCURRENCES", defaults.min_pattern_occurrences),
            top_patterns: env_or("TOP_PATTERNS", defaults.top_patterns),
            transition_top_k: env::var("TRANSITION_TOP_K").ok().and_then(|v| v.parse().ok()),
        }
    }

    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.level_threshold == 0 {
            return Err("LEVEL_THRESHOLD must be at least 1".into());
        }
        if self.pattern_window == 0 {
            return Err("PATTERN_WINDOW must be at least 1".into());
        }
        if self.max_pattern_length < 2 {
            return Err("MAX_PATTERN_LENGTH must be at least 2".into());
        }
        if self.transition_top_k == Some(0) {
            return Err("TRANSITION_TOP_K must be at least 1 when set".into());
        }
        Ok(())
    }
}

/// Reads `key` from the environment, falling back to `default` when it is
/// missing or does not parse.
fn env_or<T: FromStr + ToString>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={}, using {}", key, raw, default.to_string());
            default
        }),
        Err(_) => default,
    }
}

impl Config {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        // Check for ENV_FILE_PATH override
        match env::var("ENV_FILE_PATH") {
            Ok(env_file_path) if !env_file_path.is_empty() => {
                info!("Loading environment from ENV_FILE_PATH: {}", env_file_path);
                dotenv::from_filename(&env_file_path).ok();
            }
            _ => {
                dotenv().ok();
                // .env.<env> overrides .env for non-development environments
                let environment_hint: Environment = env::var("RUST_ENV")
                    .unwrap_or_else(|_| "development".to_string())
                    .parse()
                    .unwrap_or_default();
                let env_file = format!(".env.{:?}", environment_hint).to_lowercase();
                if env_file != ".env.development" {
                    let _ = dotenv::from_filename(&env_file);
                }
            }
        }

        let environment = env::var("RUST_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .parse()
            .unwrap_or_default();

        info!("Loading configuration for environment: {:?}", environment);

        let config = Config {
            server: Self::load_server_config(&environment),
            data: Self::load_data_config(),
            analytics: AnalyticsConfig::load(),
            environment,
        };

        config.validate()?;
        config.log_configuration();

        Ok(config)
    }

    fn load_server_config(env: &Environment) -> ServerConfig {
        let default_workers = match env {
            Environment::Production => 8,
            Environment::Development | Environment::Test => 1,
        };

        ServerConfig {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("SERVER_PORT", 5000),
            workers: env_or("BACKEND_WORKERS", default_workers),
        }
    }

    fn load_data_config() -> DataConfig {
        let path = env::var("ATTEMPT_LOG_PATH").unwrap_or_else(|_| {
            warn!("ATTEMPT_LOG_PATH not found in environment, using default");
            "csv/milyoner_data_final.csv".to_string()
        });
        DataConfig {
            attempt_log_path: PathBuf::from(path),
        }
    }

    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.environment == Environment::Production && env::var("ATTEMPT_LOG_PATH").is_err() {
            return Err("ATTEMPT_LOG_PATH must be set in production".into());
        }

        if self.server.port == 0 {
            return Err("Server port cannot be 0".into());
        }
        if self.server.workers == 0 {
            return Err("Worker count cannot be 0".into());
        }

        self.analytics.validate()
    }

    fn log_configuration(&self) {
        info!("Configuration loaded successfully");
        info!("Environment: {:?}", self.environment);
        info!("Server: {}:{} (workers: {})", self.server.host, self.server.port, self.server.workers);
        info!("Attempt log: {}", self.data.attempt_log_path.display());
        info!(
            "Analytics: level threshold {}, pattern window {}, max pattern length {}, min occurrences {}, top {}",
            self.analytics.level_threshold,
            self.analytics.pattern_window,
            self.analytics.max_pattern_length,
            self.analytics.min_pattern_occurrences,
            self.analytics.top_patterns
        );

        if !self.data.attempt_log_path.exists() {
            warn!(
                "Attempt log {} does not exist yet; requests will fail until it is created",
                self.data.attempt_log_path.display()
            );
        }
    }
}
