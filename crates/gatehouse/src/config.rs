//! Server configuration.
//!
//! Loaded via the `config` crate from, in increasing priority:
//! - an optional file (`--config`, or `config.{yaml,toml,json}` in the
//!   working directory)
//! - `GATEHOUSE_` environment variables with `__` between sections, e.g.
//!   `GATEHOUSE_AUTH__GOOGLE__REDIRECT_URL`
//! - the bare `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET` and
//!   `APPLE_PRIVATE_KEY_PATH` variables

use std::collections::HashMap;
use std::path::Path;

use config::{ConfigError, Environment, File};
use gatehouse_auth::AuthConfig;
use serde::Deserialize;

const ENV_PREFIX: &str = "GATEHOUSE";

/// Bare environment variables mapped onto config keys.
const ENV_OVERRIDES: [(&str, &str); 3] = [
    ("GOOGLE_CLIENT_ID", "auth.google.client_id"),
    ("GOOGLE_CLIENT_SECRET", "auth.google.client_secret"),
    ("APPLE_PRIVATE_KEY_PATH", "auth.apple.private_key_path"),
];

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Listener configuration. The CLI flags take precedence.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Redis connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Number of pooled clients.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_pool_size() -> usize {
    4
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            pool_size: default_pool_size(),
        }
    }
}

impl Config {
    /// Loads configuration from `path` (or `config.*` if present) and the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the named file is missing or a value fails to
    /// parse.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(path, std::env::vars().collect())
    }

    fn load_from(path: Option<&Path>, vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name("config").required(false),
        };

        let mut builder = config::Config::builder().add_source(file).add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(Some(vars.clone())),
        );

        for (var, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(key, vars.get(var).cloned())?;
        }

        builder.build()?.try_deserialize()
    }
}
