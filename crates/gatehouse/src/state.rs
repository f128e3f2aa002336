//! Shared application state.

use std::sync::Arc;

use gatehouse_auth::AuthState;
use gatehouse_core::users::UserRepository;

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    pub fn new(auth: AuthState, users: Arc<dyn UserRepository>) -> Self {
        Self { auth, users }
    }
}

/// Lets the auth extractors and routes pull `AuthState` out of `AppState`.
impl AsRef<AuthState> for AppState {
    fn as_ref(&self) -> &AuthState {
        &self.auth
    }
}
