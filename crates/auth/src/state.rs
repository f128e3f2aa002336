//! Application state for auth.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use axum_extra::extract::cookie::{Cookie, SameSite};
use gatehouse_core::auth::SessionId;

use crate::authenticator::Authenticator;
use crate::config::AuthConfig;

/// Shared state for auth handlers and extractors.
#[derive(Clone)]
pub struct AuthState {
    pub authenticator: Arc<Authenticator>,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

impl AuthState {
    pub fn new(authenticator: Arc<Authenticator>, config: &AuthConfig) -> Self {
        Self {
            authenticator,
            cookie_name: config.cookie_name.clone(),
            cookie_secure: config.cookie_secure,
        }
    }

    /// Cookie carrying a freshly issued session id.
    pub fn session_cookie(&self, session_id: &SessionId) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), session_id.to_string()))
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .max_age(max_age(self.authenticator.session_ttl()))
            .build()
    }

    /// Cookie that, once removed from the jar, clears the session cookie.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), "")).path("/").build()
    }
}

fn max_age(ttl: Duration) -> time::Duration {
    time::Duration::seconds(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX))
}

/// Allows AuthState to be extracted from a parent state.
impl<S> FromRef<S> for AuthState
where
    S: AsRef<AuthState>,
{
    fn from_ref(state: &S) -> Self {
        state.as_ref().clone()
    }
}
