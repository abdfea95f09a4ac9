//! # tt-config
//!
//! Process-level configuration for the topic-thumb binary.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. `config/topic-thumb.toml` (optional)
//! 3. `.env` (loaded into the environment by `dotenvy`)
//! 4. `TOPIC_THUMB__SECTION__KEY` environment variables
//!
//! Thumbnail behaviour itself is NOT configured here; those switches are
//! site settings owned by the forum host.

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

pub const ENV_PREFIX: &str = "TOPIC_THUMB";
pub const DEFAULT_CONFIG_FILE: &str = "config/topic-thumb";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub webhook: WebhookSettings,
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// e.g. `sqlite://forum.db` or `sqlite::memory:`
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookSettings {
    /// Shared HMAC secret. Deliveries are accepted unsigned when absent.
    pub secret: Option<SecretString>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogSettings {
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Settings {
    /// Loads from the default file location and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "ignoring unreadable .env file");
            }
        }
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Loads from `file` (extension optional, may be missing) and the environment.
    pub fn load_from(file: &str) -> Result<Self, ConfigError> {
        let settings: Settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "sqlite://topic-thumb.db")?
            .add_source(config::File::with_name(file).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Invalid("server.host must not be empty".into()));
        }
        if !self.database.url.starts_with("sqlite:") {
            return Err(ConfigError::Invalid(format!(
                "database.url must be a sqlite URL, got '{}'",
                self.database.url
            )));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(name: &str, body: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{name}-{}.toml", std::process::id()));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn defaults_apply_without_a_file() {
        let s = Settings::load_from("does/not/exist").unwrap();
        assert_eq!(s.server.port, 8080);
        assert!(s.database.url.starts_with("sqlite:"));
        assert!(s.webhook.secret.is_none());
        assert!(!s.log.json);
    }

    #[test]
    fn file_values_override_defaults() {
        let path = write_config(
            "tt-config-file",
            r#"
            [server]
            host = "0.0.0.0"
            port = 9191

            [webhook]
            secret = "hunter2"

            [log]
            json = true
            "#,
        );

        let s = Settings::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(s.bind_addr(), ("0.0.0.0".to_string(), 9191));
        assert!(s.webhook.secret.is_some());
        assert!(s.log.json);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn non_sqlite_database_is_rejected() {
        let path = write_config("tt-config-pg", "[database]\nurl = \"postgres://localhost/forum\"\n");
        let err = Settings::load_from(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        std::fs::remove_file(path).ok();
    }
}
