/// Configuration management for the reviewer assignment service
use crate::assignment::AssignmentConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSettings,
    pub review: ReviewSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub listen_addr: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewSettings {
    pub max_reviewers: usize,
    /// Fixed seed for reviewer selection. Unset means seeded from OS entropy.
    pub random_seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            review: ReviewSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            max_reviewers: 2,
            random_seed: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

pub const DEFAULT_CONFIG_YAML: &str = r#"# Reviewer assignment service configuration

server:
  # Overridden by HTTP_ADDR
  listen_addr: "0.0.0.0:8080"

review:
  # Reviewers assigned when a pull request is opened
  max_reviewers: 2
  # Uncomment for reproducible reviewer selection
  # random_seed: 42

logging:
  # RUST_LOG takes precedence when set
  level: info
"#;

impl Config {
    /// Load configuration from file
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config =
            serde_yaml::from_str(&content).context("Failed to parse configuration file")?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Override settings from environment-style lookups
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("HTTP_ADDR") {
            self.set_listen_addr(&addr);
        }

        if let Some(max_reviewers) = lookup("PR_REVIEWER_MAX_REVIEWERS") {
            self.review.max_reviewers = max_reviewers
                .parse()
                .context("PR_REVIEWER_MAX_REVIEWERS must be a non-negative integer")?;
        }

        if let Some(seed) = lookup("PR_REVIEWER_RANDOM_SEED") {
            self.review.random_seed = Some(
                seed.parse()
                    .context("PR_REVIEWER_RANDOM_SEED must be an unsigned integer")?,
            );
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.review.max_reviewers == 0 {
            return Err(anyhow::anyhow!("max_reviewers must be greater than 0"));
        }

        self.socket_addr()?;

        if self.logging.level.trim().is_empty() {
            return Err(anyhow::anyhow!("Log level must not be empty"));
        }

        Ok(())
    }

    /// Set the listen address, accepting the bare `:port` form.
    pub fn set_listen_addr(&mut self, addr: &str) {
        self.server.listen_addr = normalize_listen_addr(addr);
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.server
            .listen_addr
            .parse()
            .with_context(|| format!("Invalid listen address: {}", self.server.listen_addr))
    }

    pub fn assignment_config(&self) -> AssignmentConfig {
        AssignmentConfig {
            max_reviewers: self.review.max_reviewers,
        }
    }
}

/// Accept the bare `:8080` form and bind it on all interfaces.
fn normalize_listen_addr(addr: &str) -> String {
    let addr = addr.trim();
    if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[tokio::test]
    async fn test_config_save_and_load() {
        let mut config = Config::default();
        config.review.random_seed = Some(99);
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).await.unwrap();
        let loaded_config = Config::load_from_file(temp_file.path()).await.unwrap();

        assert_eq!(config, loaded_config);
    }

    #[test]
    fn test_default_yaml_matches_defaults() {
        let parsed: Config = serde_yaml::from_str(DEFAULT_CONFIG_YAML).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let parsed: Config = serde_yaml::from_str("review:\n  max_reviewers: 3\n").unwrap();
        assert_eq!(parsed.review.max_reviewers, 3);
        assert_eq!(parsed.server.listen_addr, "0.0.0.0:8080");
        assert_eq!(parsed.logging.level, "info");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env_overrides(lookup_from(&[
                ("HTTP_ADDR", ":9090"),
                ("PR_REVIEWER_MAX_REVIEWERS", "3"),
                ("PR_REVIEWER_RANDOM_SEED", "7"),
            ]))
            .unwrap();

        assert_eq!(config.server.listen_addr, "0.0.0.0:9090");
        assert_eq!(config.review.max_reviewers, 3);
        assert_eq!(config.review.random_seed, Some(7));
        assert_eq!(config.assignment_config().max_reviewers, 3);
    }

    #[test]
    fn test_set_listen_addr_accepts_bare_port() {
        let mut config = Config::default();
        config.set_listen_addr(":9090");
        assert_eq!(config.server.listen_addr, "0.0.0.0:9090");
        assert_eq!(config.socket_addr().unwrap().port(), 9090);

        config.set_listen_addr("127.0.0.1:7000");
        assert_eq!(config.server.listen_addr, "127.0.0.1:7000");
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let mut config = Config::default();
        let result = config.apply_env_overrides(lookup_from(&[("PR_REVIEWER_RANDOM_SEED", "abc")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.review.max_reviewers = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.server.listen_addr = "not an address".to_string();
        assert!(config.validate().is_err());

        config = Config::default();
        config.logging.level = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
