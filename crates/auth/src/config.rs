use std::path::PathBuf;
use std::time::Duration;

use gatehouse_core::auth::AuthError;
use serde::Deserialize;
use url::Url;

/// Configuration for a provider authenticated with a static client secret.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: Url,
}

/// Apple-specific configuration (uses signed JWT for client secret).
#[derive(Debug, Clone, Deserialize)]
pub struct AppleConfig {
    pub client_id: String,
    pub team_id: String,
    pub key_id: String,
    /// PKCS#8 PEM file holding the ES256 private key.
    pub private_key_path: PathBuf,
    pub redirect_url: Url,
}

/// Complete auth configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub google: Option<ProviderConfig>,

    #[serde(default)]
    pub apple: Option<AppleConfig>,

    /// Lifetime of a session record and its cookie, in seconds.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Lifetime of a pending OAuth state token, in seconds.
    #[serde(default = "default_state_ttl_secs")]
    pub state_ttl_secs: u64,

    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Whether to set the Secure flag on the session cookie (requires HTTPS).
    #[serde(default)]
    pub cookie_secure: bool,

    /// Timeout for outbound calls to provider endpoints, in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_session_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_state_ttl_secs() -> u64 {
    10 * 60
}

fn default_cookie_name() -> String {
    "session_id".to_string()
}

fn default_http_timeout_secs() -> u64 {
    10
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            google: None,
            apple: None,
            session_ttl_secs: default_session_ttl_secs(),
            state_ttl_secs: default_state_ttl_secs(),
            cookie_name: default_cookie_name(),
            cookie_secure: false,
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl AuthConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn state_ttl(&self) -> Duration {
        Duration::from_secs(self.state_ttl_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Checks that every configured provider has its required fields.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` naming the first missing field, or when no
    /// provider is configured at all.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.google.is_none() && self.apple.is_none() {
            return Err(AuthError::Config(
                "no OAuth provider configured (expected `google` and/or `apple`)".to_string(),
            ));
        }

        if let Some(google) = &self.google {
            require("google.client_id", &google.client_id)?;
            require("google.client_secret", &google.client_secret)?;
        }

        if let Some(apple) = &self.apple {
            require("apple.client_id", &apple.client_id)?;
            require("apple.team_id", &apple.team_id)?;
            require("apple.key_id", &apple.key_id)?;
            if apple.private_key_path.as_os_str().is_empty() {
                return Err(missing("apple.private_key_path"));
            }
        }

        if self.session_ttl_secs == 0 || self.state_ttl_secs == 0 {
            return Err(AuthError::Config(
                "session_ttl_secs and state_ttl_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

fn require(field: &str, value: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        Err(missing(field))
    } else {
        Ok(())
    }
}

fn missing(field: &str) -> AuthError {
    AuthError::Config(format!("missing required field `{}`", field))
}
