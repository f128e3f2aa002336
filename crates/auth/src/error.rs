use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gatehouse_core::store::StoreError;
use serde_json::json;
use thiserror::Error;

use crate::client_secret::CredentialError;

/// Auth errors for the gatehouse_auth crate.
///
/// This wraps the core `AuthError` and adds the signing-key failures that
/// only the I/O layer can produce.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error from the core auth module (state, exchange, session, ...)
    #[error(transparent)]
    Core(#[from] gatehouse_core::auth::AuthError),

    /// Apple signing key could not be loaded or used
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        Self::Core(err.into())
    }
}

impl AuthError {
    /// HTTP status and client-facing message for this error.
    ///
    /// Messages never include internal detail; that goes to the log.
    pub fn status_and_message(&self) -> (StatusCode, &'static str) {
        use gatehouse_core::auth::AuthError as CoreError;

        match self {
            AuthError::Core(core_err) => match core_err {
                CoreError::UnknownProvider(_) => (StatusCode::BAD_REQUEST, "Invalid provider"),
                CoreError::InvalidState => (StatusCode::BAD_REQUEST, "Invalid state"),
                CoreError::StateLookup(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "failed to verify state")
                }
                CoreError::NotAuthenticated => (StatusCode::UNAUTHORIZED, "Not authenticated"),
                CoreError::Exchange(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "token exchange failed")
                }
                CoreError::ProfileFetch(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "failed to get user info")
                }
                CoreError::Session(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "failed to create session")
                }
                CoreError::DestroySession(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "failed to destroy session")
                }
                CoreError::Config(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "server configuration error")
                }
            },
            AuthError::Credential(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "server configuration error")
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!(error = %self, "Auth error");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Auth request rejected");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
