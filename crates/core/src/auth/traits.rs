use async_trait::async_trait;
use url::Url;

use super::{AccessToken, AuthError, UserProfile};

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Abstraction over OAuth identity providers.
///
/// Implementations own only their client configuration; persisting the state
/// token is the caller's job.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Registry name, e.g. `"google"`.
    fn name(&self) -> &str;

    /// Build the consent-screen URL carrying `state`.
    fn authorization_url(&self, state: &str) -> Result<Url>;

    /// Exchange an authorization code at the token endpoint.
    async fn exchange_code(&self, code: &str) -> Result<AccessToken>;

    /// Resolve the identity behind `token`.
    async fn fetch_user_profile(&self, token: &AccessToken) -> Result<UserProfile>;
}
