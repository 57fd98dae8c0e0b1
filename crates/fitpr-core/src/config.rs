//! Configuration types for rate limits and the client directory

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A client allowed to sign in with a PIN
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Unique client identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Owning trainer
    pub trainer_id: String,
    /// Contact email
    #[serde(default)]
    pub email: Option<String>,
    /// Access PIN (4-6 digits)
    pub pin: String,
    /// Inactive clients cannot sign in
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Limit applied to requests whose path starts with `path`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitRule {
    /// Path prefix, or the exact path when `exact` is set
    pub path: String,
    /// Match `path` exactly instead of as a prefix
    #[serde(default)]
    pub exact: bool,
    /// Requests allowed per window
    pub max_requests: u32,
    /// Window length in seconds
    pub window_secs: u64,
}

impl RateLimitRule {
    #[must_use]
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        if self.exact {
            path == self.path
        } else {
            path.starts_with(&self.path)
        }
    }
}

/// Rate limiting settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Disable to let every request through
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// How often expired records are dropped
    #[serde(default = "default_purge_interval")]
    pub purge_interval_secs: u64,
    /// Key callers by `X-Forwarded-For` / `X-Real-IP` instead of the peer
    /// address. Only safe behind a proxy that overwrites those headers.
    #[serde(default)]
    pub trust_forwarded_for: bool,
    /// Rules, first match wins
    #[serde(default = "default_rules")]
    pub rules: Vec<RateLimitRule>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            purge_interval_secs: default_purge_interval(),
            trust_forwarded_for: false,
            rules: default_rules(),
        }
    }
}

impl RateLimitConfig {
    /// First rule matching `path`
    #[must_use]
    pub fn rule_for(&self, path: &str) -> Option<&RateLimitRule> {
        self.rules.iter().find(|rule| rule.matches(path))
    }
}

fn default_enabled() -> bool {
    true
}

fn default_purge_interval() -> u64 {
    60
}

fn default_rules() -> Vec<RateLimitRule> {
    vec![
        RateLimitRule {
            path: "/".to_string(),
            exact: true,
            max_requests: 10,
            window_secs: 60,
        },
        RateLimitRule {
            path: "/health".to_string(),
            exact: true,
            max_requests: 30,
            window_secs: 60,
        },
        RateLimitRule {
            path: "/api/v1/auth".to_string(),
            exact: false,
            max_requests: 5,
            window_secs: 60,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let config = RateLimitConfig::default();
        assert_eq!(config.rule_for("/").map(|r| r.max_requests), Some(10));
        assert_eq!(config.rule_for("/health").map(|r| r.max_requests), Some(30));
        assert_eq!(config.rule_for("/api/v1/auth/pin").map(|r| r.max_requests), Some(5));
        assert!(config.rule_for("/trainer/dashboard").is_none());
        assert!(!config.trust_forwarded_for);
    }

    #[test]
    fn test_client_defaults_to_active() {
        let client: ClientConfig = serde_json::from_str(
            r#"{"id":"c1","name":"Ana","trainer_id":"t1","pin":"1234"}"#,
        )
        .unwrap();
        assert!(client.active);
        assert!(client.email.is_none());
    }
}
