//! Login, callback and logout orchestration.
//!
//! A login attempt moves through `Anonymous -> StatePending -> Authenticated`
//! and, on logout, `LoggedOut`. The only shared state is the session store:
//! a pending attempt is the `oauth_state:<state>` key, an authenticated one is
//! the `session:<id>` key.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use gatehouse_core::auth::{
    calculate_expiry, email_to_name, generate_session_id, generate_state, is_session_expired,
    AuthError, ProviderRegistry, Result, SessionId, SessionRecord,
};
use gatehouse_core::store::{decode, encode, session_key, state_key, SessionStore};
use url::Url;

pub const DEFAULT_STATE_TTL: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Where to send the browser to start a login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    pub url: Url,
    pub state: String,
}

/// Parameters the provider sends back to the callback endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
    /// Name supplied in the callback itself (Apple, first login only).
    pub display_name: Option<String>,
}

/// Drives the authorization-code flow against a registry and a store.
pub struct Authenticator {
    registry: Arc<ProviderRegistry>,
    store: Arc<dyn SessionStore>,
    state_ttl: Duration,
    session_ttl: Duration,
}

impl Authenticator {
    pub fn new(registry: Arc<ProviderRegistry>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            registry,
            store,
            state_ttl: DEFAULT_STATE_TTL,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    pub fn with_ttls(mut self, state_ttl: Duration, session_ttl: Duration) -> Self {
        self.state_ttl = state_ttl;
        self.session_ttl = session_ttl;
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    pub fn state_ttl(&self) -> Duration {
        self.state_ttl
    }

    /// Records `state` as pending and returns the provider's consent URL.
    ///
    /// # Errors
    ///
    /// - `UnknownProvider` if `provider` is not registered (nothing is stored)
    /// - `Session` if the state cannot be written (no URL is returned)
    pub async fn build_authorization_url(&self, provider: &str, state: &str) -> Result<Url> {
        let oauth_provider = self.registry.get(provider)?;

        self.store
            .set(&state_key(state), &encode(&true)?, self.state_ttl)
            .await?;

        oauth_provider.authorization_url(state)
    }

    /// Starts a login with a fresh state token.
    pub async fn begin_login(&self, provider: &str) -> Result<LoginRedirect> {
        let state = generate_state();
        let url = self.build_authorization_url(provider, &state).await?;

        tracing::debug!(provider = %provider, "Login started");
        Ok(LoginRedirect { url, state })
    }

    /// Completes a login and issues a session.
    ///
    /// The state token is consumed before the code is exchanged, so a failed
    /// exchange cannot be retried with the same state.
    ///
    /// # Errors
    ///
    /// - `UnknownProvider` before any state is touched
    /// - `InvalidState` if the state was never issued, already used, or expired
    /// - `Exchange` / `ProfileFetch` if the provider calls fail
    /// - `Session` if the session record cannot be written
    pub async fn complete_callback(
        &self,
        provider: &str,
        params: CallbackParams,
    ) -> Result<(SessionId, SessionRecord)> {
        let oauth_provider = self.registry.get(provider)?;

        self.consume_state(provider, &params.state).await?;

        if params.code.is_empty() {
            return Err(AuthError::Exchange(
                "callback carried no authorization code".to_string(),
            ));
        }

        let token = oauth_provider
            .exchange_code(&params.code)
            .await
            .inspect_err(|e| {
                tracing::error!(provider = %provider, error = %e, "Code exchange failed")
            })?;

        let mut profile = oauth_provider
            .fetch_user_profile(&token)
            .await
            .inspect_err(|e| {
                tracing::error!(provider = %provider, error = %e, "Profile fetch failed")
            })?;

        if profile.name.is_empty() {
            profile.name = params
                .display_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| email_to_name(&profile.email));
        }

        let ttl = TimeDelta::from_std(self.session_ttl)
            .map_err(|e| AuthError::Config(format!("session TTL out of range: {}", e)))?;
        let now = Utc::now();
        let record = SessionRecord {
            token,
            user_info: profile,
            provider: provider.to_string(),
            created_at: now,
            expires_at: calculate_expiry(now, ttl),
        };

        let session_id = generate_session_id();
        self.store
            .set(&session_key(&session_id), &encode(&record)?, self.session_ttl)
            .await
            .inspect_err(|e| {
                tracing::error!(provider = %provider, error = %e, "Session write failed")
            })?;

        tracing::info!(
            provider = %provider,
            user_id = %record.user_info.id,
            expires_at = %record.expires_at,
            "Session issued"
        );

        Ok((session_id, record))
    }

    /// Looks up the session behind `session_id`.
    ///
    /// Missing, expired, undecodable and unreadable sessions all yield
    /// `NotAuthenticated`.
    pub async fn current_session(&self, session_id: &SessionId) -> Result<SessionRecord> {
        let raw = match self.store.get(&session_key(session_id)).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Err(AuthError::NotAuthenticated),
            Err(e) => {
                tracing::warn!(error = %e, "Session lookup failed");
                return Err(AuthError::NotAuthenticated);
            }
        };

        let record: SessionRecord = decode(&raw).map_err(|e| {
            tracing::warn!(error = %e, "Discarding undecodable session record");
            AuthError::NotAuthenticated
        })?;

        if is_session_expired(&record, Utc::now()) {
            return Err(AuthError::NotAuthenticated);
        }

        Ok(record)
    }

    /// Destroys the session behind `session_id`, if any.
    pub async fn logout(&self, session_id: Option<&SessionId>) -> Result<()> {
        let Some(session_id) = session_id else {
            return Ok(());
        };

        self.store
            .delete(&session_key(session_id))
            .await
            .map_err(|e| AuthError::DestroySession(e.to_string()))?;

        tracing::debug!("Session destroyed");
        Ok(())
    }

    async fn consume_state(&self, provider: &str, state: &str) -> Result<()> {
        if state.is_empty() {
            tracing::warn!(provider = %provider, "Callback without state");
            return Err(AuthError::InvalidState);
        }

        let marker = self
            .store
            .take(&state_key(state))
            .await
            .map_err(|e| AuthError::StateLookup(e.to_string()))?;

        match marker.as_deref().map(decode::<bool>) {
            Some(Ok(true)) => Ok(()),
            _ => {
                tracing::warn!(provider = %provider, "Rejected unknown or reused state");
                Err(AuthError::InvalidState)
            }
        }
    }
}
