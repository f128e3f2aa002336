//! Test doubles shared by the crate's unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use chrono::Utc;
use gatehouse_core::auth::{
    AccessToken, AuthError, OAuthProvider, ProviderRegistry, Result, UserProfile,
};
use gatehouse_core::store::{self, SessionStore, StoreError};
use url::Url;

use crate::authenticator::Authenticator;
use crate::sessions::MemorySessionStore;

/// Serves `router` on an ephemeral local port and returns its base URL.
pub(crate) async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

pub(crate) fn stub_token() -> AccessToken {
    AccessToken {
        access_token: "stub-access-token".to_string(),
        token_type: "Bearer".to_string(),
        expiry: Some(Utc::now() + chrono::Duration::hours(1)),
        id_token: None,
    }
}

pub(crate) fn stub_profile() -> UserProfile {
    UserProfile {
        id: "user-42".to_string(),
        name: "Jane Doe".to_string(),
        email: "jane@example.com".to_string(),
    }
}

/// Provider returning canned values and counting exchanges.
pub(crate) struct StubProvider {
    name: String,
    token: AccessToken,
    profile: UserProfile,
    fail_exchange: bool,
    fail_profile: bool,
    exchanges: AtomicUsize,
}

impl StubProvider {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            token: stub_token(),
            profile: stub_profile(),
            fail_exchange: false,
            fail_profile: false,
            exchanges: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profile = profile;
        self
    }

    pub(crate) fn failing_exchange(mut self) -> Self {
        self.fail_exchange = true;
        self
    }

    pub(crate) fn failing_profile(mut self) -> Self {
        self.fail_profile = true;
        self
    }

    pub(crate) fn exchanges(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OAuthProvider for StubProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn authorization_url(&self, state: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("https://idp.example.com/{}/authorize", self.name))
            .map_err(|e| AuthError::Config(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", "stub-client")
            .append_pair("redirect_uri", "http://localhost:8080/callback")
            .append_pair("state", state);
        Ok(url)
    }

    async fn exchange_code(&self, code: &str) -> Result<AccessToken> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        if self.fail_exchange {
            return Err(AuthError::Exchange(format!("code `{}` rejected", code)));
        }
        Ok(self.token.clone())
    }

    async fn fetch_user_profile(&self, _token: &AccessToken) -> Result<UserProfile> {
        if self.fail_profile {
            return Err(AuthError::ProfileFetch("userinfo returned 500".to_string()));
        }
        Ok(self.profile.clone())
    }
}

/// Store whose every operation fails.
pub(crate) struct FailingStore;

#[async_trait]
impl SessionStore for FailingStore {
    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> store::Result<()> {
        Err(StoreError::ConnectionFailed("refused".to_string()))
    }

    async fn get(&self, _key: &str) -> store::Result<Option<String>> {
        Err(StoreError::ConnectionFailed("refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> store::Result<()> {
        Err(StoreError::ConnectionFailed("refused".to_string()))
    }

    async fn take(&self, _key: &str) -> store::Result<Option<String>> {
        Err(StoreError::ConnectionFailed("refused".to_string()))
    }
}

/// Authenticator over a fresh memory store with `providers` registered.
pub(crate) fn authenticator_with(
    providers: Vec<Arc<StubProvider>>,
) -> (Authenticator, Arc<MemorySessionStore>) {
    let mut registry = ProviderRegistry::new();
    for provider in providers {
        let name = provider.name().to_string();
        registry.add(name, provider);
    }

    let store = Arc::new(MemorySessionStore::default());
    let authenticator = Authenticator::new(Arc::new(registry), store.clone());
    (authenticator, store)
}
