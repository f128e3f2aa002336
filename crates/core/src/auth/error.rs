use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("invalid OAuth state parameter")]
    InvalidState,

    /// The store could not be asked whether a state was issued.
    #[error("failed to read OAuth state: {0}")]
    StateLookup(String),

    #[error("failed to exchange authorization code: {0}")]
    Exchange(String),

    #[error("failed to fetch user profile: {0}")]
    ProfileFetch(String),

    #[error("session storage error: {0}")]
    Session(String),

    #[error("failed to destroy session: {0}")]
    DestroySession(String),

    #[error("not authenticated")]
    NotAuthenticated,
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        Self::Session(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_become_session_errors() {
        let err: AuthError = StoreError::ConnectionFailed("refused".to_string()).into();
        assert!(matches!(err, AuthError::Session(_)));
        assert_eq!(
            err.to_string(),
            "session storage error: Store connection failed: refused"
        );
    }

    #[test]
    fn unknown_provider_names_the_provider() {
        let err = AuthError::UnknownProvider("facebook".to_string());
        assert_eq!(err.to_string(), "unknown provider: facebook");
    }
}
