//! OAuth login flows and session management for gatehouse.
//!
//! This crate provides:
//! - OAuth authorization-code flows with Google and Apple providers
//! - The Apple client secret signer
//! - Session storage (in-memory, or Redis via the `redis` feature)
//! - The `Authenticator` orchestrator plus Axum handlers and extractors

mod authenticator;
mod client_secret;
mod config;
mod error;
mod extractors;
mod handlers;
mod providers;
mod sessions;
mod state;
#[cfg(test)]
mod testing;

pub use authenticator::{
    Authenticator, CallbackParams, LoginRedirect, DEFAULT_SESSION_TTL, DEFAULT_STATE_TTL,
};
pub use client_secret::{
    ClientSecretSigner, CredentialError, SignedCredential, APPLE_AUDIENCE,
    CLIENT_SECRET_LIFETIME_DAYS,
};
pub use config::{AppleConfig, AuthConfig, ProviderConfig};
pub use error::AuthError;
pub use extractors::{session_id, CurrentSession, OptionalSession};
pub use handlers::{auth_routes, found};
pub use providers::{
    http_client, verify_identity_token, AppleIdentityClaims, AppleProvider, Endpoints,
    GoogleProvider, APPLE_ISSUER,
};
#[cfg(feature = "redis")]
pub use sessions::RedisSessionStore;
pub use sessions::MemorySessionStore;
pub use state::AuthState;
