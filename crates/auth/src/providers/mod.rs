//! OAuth provider implementations.
//!
//! This module contains implementations of `OAuthProvider` for:
//! - Google (static client secret, userinfo endpoint)
//! - Apple (signed JWT client secret, verified identity token)

mod apple;
mod endpoints;
mod google;

use std::time::Duration;

use gatehouse_core::auth::{AuthError, Result};

pub use apple::{verify_identity_token, AppleIdentityClaims, AppleProvider, APPLE_ISSUER};
pub use endpoints::Endpoints;
pub use google::GoogleProvider;

/// Builds the HTTP client shared by all providers.
///
/// Redirects are never followed and every request is bounded by `timeout`.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(timeout)
        .build()
        .map_err(|e| AuthError::Config(format!("failed to build HTTP client: {}", e)))
}
