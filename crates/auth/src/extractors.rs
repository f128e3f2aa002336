//! Axum extractors for authentication.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use axum_extra::extract::CookieJar;
use gatehouse_core::auth::{AuthError as CoreError, SessionId, SessionRecord};

use crate::error::AuthError;
use crate::AuthState;

/// Extractor for an authenticated session. Rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub id: SessionId,
    pub record: SessionRecord,
}

impl<S> FromRequestParts<S> for CurrentSession
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let id = session_id(&parts.headers, &auth_state.cookie_name)
            .ok_or(CoreError::NotAuthenticated)?;
        let record = auth_state.authenticator.current_session(&id).await?;

        Ok(CurrentSession { id, record })
    }
}

/// Extractor for an optional session. Never rejects.
#[derive(Debug, Clone)]
pub struct OptionalSession(pub Option<CurrentSession>);

impl<S> FromRequestParts<S> for OptionalSession
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalSession(
            CurrentSession::from_request_parts(parts, state).await.ok(),
        ))
    }
}

/// Session id from an `Authorization: Bearer` header (API clients), falling
/// back to the session cookie (browsers).
pub fn session_id(headers: &HeaderMap, cookie_name: &str) -> Option<SessionId> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = from_header {
        return Some(SessionId::new(token.to_string()));
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
        .map(|value| SessionId::new(value.to_string()))
}
