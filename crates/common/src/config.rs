//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// File upload configuration.
    pub upload: UploadConfig,
    /// Escalation configuration.
    #[serde(default)]
    pub escalation: EscalationConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Email domain allowed to register (without the `@`).
    #[serde(default = "default_email_domain")]
    pub allowed_email_domain: String,
}

/// File upload configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Directory where uploaded complaint images are stored.
    #[serde(default = "default_upload_dir")]
    pub dir: PathBuf,
    /// Maximum upload size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_bytes: usize,
    /// Allowed image file extensions (lowercase, without the dot).
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

/// Escalation scheduler configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EscalationConfig {
    /// Age in days after which an unresolved complaint is escalated.
    #[serde(default = "default_threshold_days")]
    pub threshold_days: i64,
    /// Interval in hours between escalation sweeps.
    #[serde(default = "default_sweep_interval_hours")]
    pub sweep_interval_hours: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            upload: UploadConfig::default(),
            escalation: EscalationConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/campussync".to_string(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            allowed_email_domain: default_email_domain(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            max_bytes: default_max_upload_bytes(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            threshold_days: default_threshold_days(),
            sweep_interval_hours: default_sweep_interval_hours(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

fn default_email_domain() -> String {
    "asmedu.org".to_string()
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

const fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()]
}

const fn default_threshold_days() -> i64 {
    3
}

const fn default_sweep_interval_hours() -> u64 {
    24
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `CAMPUSSYNC_ENV`)
    /// 3. Environment variables with `CAMPUSSYNC_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("CAMPUSSYNC_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CAMPUSSYNC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("CAMPUSSYNC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escalation_defaults() {
        let config = EscalationConfig::default();
        assert_eq!(config.threshold_days, 3);
        assert_eq!(config.sweep_interval_hours, 24);
    }

    #[test]
    fn test_upload_defaults() {
        assert_eq!(default_max_upload_bytes(), 16 * 1024 * 1024);
        assert_eq!(
            default_allowed_extensions(),
            vec!["png", "jpg", "jpeg"]
        );
    }
}
