//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use crate::services::site::{DEFAULT_LIMIT, DEFAULT_MAX_DISTANCE_KM};

/// Origins allowed in production when `ORIGIN` is not set.
pub const DEFAULT_ORIGINS: &str = "https://points-air.ecolingui.ca https://insolites.github.io";

fn split_origins(origins: &str) -> Vec<String> {
    origins.split_whitespace().map(str::to_string).collect()
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Directory holding `villes.geojson` and `plateaux.geojson`
    pub data_dir: PathBuf,
    /// Directory for user and activity records
    pub records_dir: PathBuf,
    /// Development mode: any http://localhost origin is allowed
    pub development: bool,
    /// Allowed CORS origins in production
    pub origins: Vec<String>,
    /// Radius for nearest-site queries that give none, in km
    pub default_radius_km: f64,
    /// Result cap for nearest-site queries that give none
    pub default_limit: usize,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: 8080,
            data_dir: PathBuf::from("data"),
            records_dir: PathBuf::from("records"),
            development: true,
            origins: vec!["http://localhost:5173".to_string()],
            default_radius_km: DEFAULT_MAX_DISTANCE_KM,
            default_limit: DEFAULT_LIMIT,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: parse_var("PORT", 8080)?,
            data_dir: env::var("DATA_DIR")
                .unwrap_or_else(|_| "data".to_string())
                .into(),
            records_dir: env::var("RECORDS_DIR")
                .unwrap_or_else(|_| "records".to_string())
                .into(),
            development: env::var("DEVELOPMENT")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),
            origins: split_origins(
                &env::var("ORIGIN").unwrap_or_else(|_| DEFAULT_ORIGINS.to_string()),
            ),
            default_radius_km: parse_var("DEFAULT_RADIUS_KM", DEFAULT_MAX_DISTANCE_KM)?,
            default_limit: parse_var("DEFAULT_LIMIT", DEFAULT_LIMIT)?,
        })
    }

    pub fn municipalities_path(&self) -> PathBuf {
        self.data_dir.join("villes.geojson")
    }

    pub fn sites_path(&self) -> PathBuf {
        self.data_dir.join("plateaux.geojson")
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, value)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),
}
