//! Configuration loading and types

use std::path::{Path, PathBuf};

use fitpr_core::{ClientConfig, Environment, RateLimitConfig};
use serde::{Deserialize, Serialize};

/// Top-level configuration for the fitpr daemon
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Deployment environment, overridden by `NODE_ENV`
    #[serde(default)]
    pub environment: Environment,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Rate limiting
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Clients allowed to sign in with a PIN
    #[serde(default)]
    pub clients: Vec<ClientConfig>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address and port to bind to
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

/// Longest accepted rate limit window
const MAX_WINDOW_SECS: u64 = 86_400;

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns error if the text is not a valid configuration
    pub fn parse(content: &str) -> eyre::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("failed to read {}: {e}", path.display()))?;
        Self::parse(&content)
    }

    /// Load from default paths or use defaults
    ///
    /// # Errors
    /// Returns error if a config file exists but cannot be loaded
    pub fn load_default() -> eyre::Result<Self> {
        // Check environment variable
        if let Ok(path) = std::env::var("FITPR_CONFIG") {
            return Self::load(&PathBuf::from(path));
        }

        // Try common paths
        let paths = [
            PathBuf::from("fitpr.toml"),
            PathBuf::from("/etc/fitpr/fitpr.toml"),
            dirs::config_dir()
                .map(|p| p.join("fitpr/fitpr.toml"))
                .unwrap_or_default(),
        ];

        for path in paths {
            if path.is_file() {
                return Self::load(&path);
            }
        }

        // Return default config if no file found
        tracing::warn!("no config file found, using defaults");
        Ok(Config::default())
    }

    /// Apply a `NODE_ENV` value on top of the file setting
    #[must_use]
    pub fn with_node_env(mut self, node_env: Option<&str>) -> Self {
        if let Some(value) = node_env {
            self.environment = Environment::from_node_env(value);
        }
        self
    }

    fn validate(&self) -> eyre::Result<()> {
        for rule in &self.rate_limit.rules {
            if rule.max_requests == 0 || rule.window_secs == 0 {
                eyre::bail!(
                    "rate limit rule for {} needs max_requests and window_secs above zero",
                    rule.path
                );
            }
            if rule.window_secs > MAX_WINDOW_SECS {
                eyre::bail!(
                    "rate limit rule for {} has window_secs above {MAX_WINDOW_SECS}",
                    rule.path
                );
            }
        }
        for client in &self.clients {
            fitpr_core::validate_pin(&client.pin)
                .map_err(|_| eyre::eyre!("client {} has a malformed PIN", client.id))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8000");
        assert_eq!(config.environment, Environment::Production);
        assert!(config.rate_limit.enabled);
        assert!(config.clients.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r#"
            environment = "development"

            [server]
            bind = "0.0.0.0:9000"
            log_format = "json"

            [rate_limit]
            purge_interval_secs = 5

            [[rate_limit.rules]]
            path = "/api"
            max_requests = 100
            window_secs = 60

            [[clients]]
            id = "c1"
            name = "Ana"
            trainer_id = "t1"
            pin = "1234"
            "#,
        )
        .unwrap();

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server.log_format, LogFormat::Json);
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.rate_limit.rules.len(), 1);
        assert_eq!(config.clients[0].id, "c1");
    }

    #[test]
    fn test_rejects_zero_window() {
        let result = Config::parse(
            r#"
            [[rate_limit.rules]]
            path = "/"
            max_requests = 1
            window_secs = 0
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_oversized_window() {
        let result = Config::parse(
            r#"
            [[rate_limit.rules]]
            path = "/"
            max_requests = 1
            window_secs = 10000000000000
            "#,
        );
        assert!(result.is_err());

        let result = Config::parse(
            r#"
            [[rate_limit.rules]]
            path = "/"
            max_requests = 1
            window_secs = 86400
            "#,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_rejects_bad_pin() {
        let result = Config::parse(
            r#"
            [[clients]]
            id = "c1"
            name = "Ana"
            trainer_id = "t1"
            pin = "12"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_node_env_overrides_file() {
        let config = Config::parse(r#"environment = "development""#).unwrap();
        assert_eq!(
            config.clone().with_node_env(Some("production")).environment,
            Environment::Production
        );
        assert_eq!(
            config.clone().with_node_env(Some("dev")).environment,
            Environment::Production
        );
        assert_eq!(config.with_node_env(None).environment, Environment::Development);
    }
}
