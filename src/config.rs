//! Runtime configuration loaded from a TOML file.
//!
//! Every section and key is optional; a missing file yields the defaults.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::push::outbox::DEFAULT_HISTORY_LIMIT;

pub const SMTP_PASSWORD_ENV: &str = "REPODESK_SMTP_PASSWORD";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub repository: RepositoryConfig,
    pub database: DatabaseConfig,
    pub smtp: SmtpConfig,
    pub push: PushConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    pub path: PathBuf,
    pub remote: String,
    /// Commit identity used when git config has none
    pub author_name: Option<String>,
    pub author_email: Option<String>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            remote: "origin".to_string(),
            author_name: None,
            author_email: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/repodesk.db"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Implicit TLS, usually port 465
    #[default]
    Tls,
    /// STARTTLS upgrade, usually port 587
    Starttls,
    /// No encryption; local relays and tests only
    Plain,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sender address, defaults to `username`
    pub from: Option<String>,
    pub security: SmtpSecurity,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 465,
            username: None,
            password: None,
            from: None,
            security: SmtpSecurity::Tls,
        }
    }
}

impl SmtpConfig {
    pub fn sender(&self) -> Option<&str> {
        self.from.as_deref().or(self.username.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    /// Finished push tasks kept for `/push_tasks`; pending ones are always kept
    pub history_limit: usize,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives; `RUST_LOG` takes precedence
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse configuration")
    }

    /// Read `path`, or use the defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .context(format!("Failed to read config file '{}'", path.display()))?;
        Self::from_toml(&text).context(format!("Invalid config file '{}'", path.display()))
    }

    /// Take the SMTP password from `value` when set
    pub fn apply_smtp_password(&mut self, value: Option<String>) {
        if let Some(password) = value.filter(|p| !p.is_empty()) {
            self.smtp.password = Some(password);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();

        assert_eq!(config.server.bind.to_string(), "0.0.0.0:8000");
        assert_eq!(config.repository.path, PathBuf::from("."));
        assert_eq!(config.repository.remote, "origin");
        assert_eq!(config.database.path, PathBuf::from("data/repodesk.db"));
        assert_eq!(config.smtp.host, "smtp.gmail.com");
        assert_eq!(config.smtp.port, 465);
        assert_eq!(config.smtp.security, SmtpSecurity::Tls);
        assert_eq!(config.push.history_limit, 1000);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn sections_override_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            bind = "127.0.0.1:9000"

            [repository]
            path = "/srv/records"
            author_name = "Records Bot"

            [smtp]
            host = "localhost"
            port = 2525
            username = "bot@example.com"
            security = "plain"

            [push]
            history_limit = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind.port(), 9000);
        assert_eq!(config.repository.path, PathBuf::from("/srv/records"));
        assert_eq!(config.repository.remote, "origin");
        assert_eq!(config.repository.author_name.as_deref(), Some("Records Bot"));
        assert_eq!(config.smtp.security, SmtpSecurity::Plain);
        assert_eq!(config.smtp.sender(), Some("bot@example.com"));
        assert_eq!(config.push.history_limit, 50);
    }

    #[test]
    fn unknown_security_is_an_error() {
        assert!(Config::from_toml("[smtp]\nsecurity = \"ssl3\"").is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = assert_fs::TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.smtp.port, 465);
    }

    #[test]
    fn load_reads_file() {
        let dir = assert_fs::TempDir::new().unwrap();
        let file = dir.child("repodesk.toml");
        file.write_str("[logging]\nfilter = \"debug\"\n").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn smtp_password_override_ignores_blank() {
        let mut config = Config::default();

        config.apply_smtp_password(Some(String::new()));
        assert!(config.smtp.password.is_none());

        config.apply_smtp_password(Some("secret".into()));
        assert_eq!(config.smtp.password.as_deref(), Some("secret"));
    }
}
