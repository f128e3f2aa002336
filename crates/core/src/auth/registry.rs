//! Name-keyed collection of configured providers.

use std::collections::HashMap;
use std::sync::Arc;

use super::{AccessToken, AuthError, OAuthProvider, Result, UserProfile};

/// Maps provider names to provider instances.
///
/// Built once at startup and shared behind an `Arc`; a name maps to at most
/// one provider at a time.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn OAuthProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `provider` under `name`, replacing any previous entry.
    pub fn add(&mut self, name: impl Into<String>, provider: Arc<dyn OAuthProvider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Builder-style variant of [`add`](Self::add) keyed by the provider's own name.
    pub fn with(mut self, provider: Arc<dyn OAuthProvider>) -> Self {
        self.add(provider.name().to_string(), provider);
        self
    }

    /// Looks up a provider.
    ///
    /// # Errors
    ///
    /// Returns `UnknownProvider` if nothing is registered under `name`.
    pub fn get(&self, name: &str) -> Result<Arc<dyn OAuthProvider>> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| AuthError::UnknownProvider(name.to_string()))
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn OAuthProvider>> {
        self.providers.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Registered names, in no particular order.
    pub fn list(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Exchanges `code` with the named provider.
    pub async fn exchange(&self, name: &str, code: &str) -> Result<AccessToken> {
        self.get(name)?.exchange_code(code).await
    }

    /// Fetches the profile behind `token` from the named provider.
    pub async fn user_profile(&self, name: &str, token: &AccessToken) -> Result<UserProfile> {
        self.get(name)?.fetch_user_profile(token).await
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.list())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use url::Url;

    struct FixedProvider {
        name: &'static str,
    }

    #[async_trait]
    impl OAuthProvider for FixedProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn authorization_url(&self, state: &str) -> Result<Url> {
            let mut url = Url::parse("https://idp.example.com/authorize")
                .map_err(|e| AuthError::Config(e.to_string()))?;
            url.query_pairs_mut().append_pair("state", state);
            Ok(url)
        }

        async fn exchange_code(&self, code: &str) -> Result<AccessToken> {
            Ok(AccessToken {
                access_token: format!("{}-{}", self.name, code),
                token_type: "Bearer".to_string(),
                expiry: None,
                id_token: None,
            })
        }

        async fn fetch_user_profile(&self, token: &AccessToken) -> Result<UserProfile> {
            Ok(UserProfile {
                id: token.access_token.clone(),
                name: "Fixed".to_string(),
                email: "fixed@example.com".to_string(),
            })
        }
    }

    fn provider(name: &'static str) -> Arc<dyn OAuthProvider> {
        Arc::new(FixedProvider { name })
    }

    #[test]
    fn get_unregistered_is_unknown_provider() {
        let registry = ProviderRegistry::new();
        let err = registry.get("google").err().unwrap();
        assert!(matches!(err, AuthError::UnknownProvider(name) if name == "google"));
    }

    #[test]
    fn add_then_get_returns_same_instance() {
        let mut registry = ProviderRegistry::new();
        let google = provider("google");
        registry.add("google", google.clone());

        let found = registry.get("google").unwrap();
        assert!(Arc::ptr_eq(&found, &google));
    }

    #[test]
    fn remove_then_get_is_unknown_provider() {
        let mut registry = ProviderRegistry::new();
        registry.add("google", provider("google"));

        assert!(registry.remove("google").is_some());
        assert!(matches!(
            registry.get("google"),
            Err(AuthError::UnknownProvider(_))
        ));
        assert!(registry.remove("google").is_none());
    }

    #[test]
    fn add_overwrites_existing_name() {
        let mut registry = ProviderRegistry::new();
        let first = provider("google");
        let second = provider("google");
        registry.add("google", first.clone());
        registry.add("google", second.clone());

        assert_eq!(registry.len(), 1);
        let found = registry.get("google").unwrap();
        assert!(Arc::ptr_eq(&found, &second));
        assert!(!Arc::ptr_eq(&found, &first));
    }

    #[test]
    fn list_returns_every_name() {
        let registry = ProviderRegistry::new()
            .with(provider("google"))
            .with(provider("apple"));

        let mut names = registry.list();
        names.sort();
        assert_eq!(names, vec!["apple".to_string(), "google".to_string()]);
        assert!(registry.contains("apple"));
        assert!(!registry.contains("facebook"));
    }

    #[tokio::test]
    async fn exchange_routes_to_named_provider() {
        let registry = ProviderRegistry::new()
            .with(provider("google"))
            .with(provider("apple"));

        let token = registry.exchange("apple", "code-1").await.unwrap();
        assert_eq!(token.access_token, "apple-code-1");

        let profile = registry.user_profile("apple", &token).await.unwrap();
        assert_eq!(profile.id, "apple-code-1");
    }

    #[tokio::test]
    async fn pass_throughs_fail_for_unknown_provider() {
        let registry = ProviderRegistry::new();
        assert!(matches!(
            registry.exchange("facebook", "code").await,
            Err(AuthError::UnknownProvider(_))
        ));

        let token = AccessToken {
            access_token: "at".to_string(),
            token_type: "Bearer".to_string(),
            expiry: None,
            id_token: None,
        };
        assert!(matches!(
            registry.user_profile("facebook", &token).await,
            Err(AuthError::UnknownProvider(_))
        ));
    }
}
