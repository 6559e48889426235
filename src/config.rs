use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL. Without it the in-memory store is used.
    #[serde(default)]
    pub postgres_url: Option<String>,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub events: EventsConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    /// Admin account created at startup when the email is not registered yet.
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

/// Placeholder secret used when no `auth` block or `JWT_SECRET` is given.
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

fn default_token_ttl_hours() -> i64 {
    24
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_hours: default_token_ttl_hours(),
            bootstrap_admin: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EventsConfig {
    pub channel_size: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { channel_size: 1024 }
    }
}

impl AuthConfig {
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

impl AppConfig {
    /// Load `config/{env}.yaml` and apply environment overrides.
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config yaml: {}", config_path))?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// `DATABASE_URL` and `JWT_SECRET` win over the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL")
            && !url.is_empty()
        {
            self.postgres_url = Some(url);
        }
        if let Ok(secret) = std::env::var("JWT_SECRET")
            && !secret.is_empty()
        {
            self.auth.jwt_secret = secret;
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.gateway.host, self.gateway.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
log_level: info
log_dir: ./logs
log_file: storefront.log
use_json: false
rotation: daily
gateway:
  host: 127.0.0.1
  port: 8080
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = AppConfig::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.gateway.port, 8080);
        assert!(config.postgres_url.is_none());
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert!(config.auth.bootstrap_admin.is_none());
        assert!(config.auth.uses_default_secret());
        assert_eq!(config.events.channel_size, 1024);
        assert_eq!(config.listen_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_full_config() {
        let yaml = format!(
            "{MINIMAL}postgres_url: postgres://u:p@localhost/shop\nauth:\n  jwt_secret: s3cret\n  token_ttl_hours: 2\n  bootstrap_admin:\n    email: root@example.com\n    password: rootroot\nevents:\n  channel_size: 16\n"
        );
        let config = AppConfig::from_yaml(&yaml).unwrap();
        assert_eq!(
            config.postgres_url.as_deref(),
            Some("postgres://u:p@localhost/shop")
        );
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert!(!config.auth.uses_default_secret());
        assert_eq!(config.auth.token_ttl_hours, 2);
        assert_eq!(
            config.auth.bootstrap_admin.map(|a| a.email).as_deref(),
            Some("root@example.com")
        );
        assert_eq!(config.events.channel_size, 16);
    }

    #[test]
    fn test_missing_gateway_is_error() {
        assert!(AppConfig::from_yaml("log_level: info").is_err());
    }

    #[test]
    fn test_dev_config_file_parses() {
        let content = include_str!("../config/dev.yaml");
        let config = AppConfig::from_yaml(content).unwrap();
        assert_eq!(config.rotation, "daily");
    }
}
