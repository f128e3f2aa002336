//! Google OAuth provider implementation.

use async_trait::async_trait;
use chrono::Utc;
use gatehouse_core::auth::{AccessToken, AuthError, OAuthProvider, Result, UserProfile};
use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde::Deserialize;
use url::Url;

use super::Endpoints;
use crate::config::ProviderConfig;

const SCOPES: &[&str] = &["openid", "email", "profile"];

/// OAuth client with the auth and token URLs set.
type ConfiguredClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Response of Google's v2 userinfo endpoint.
#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Google OAuth provider.
pub struct GoogleProvider {
    client: ConfiguredClient,
    http_client: reqwest::Client,
    userinfo_url: Url,
}

impl GoogleProvider {
    /// Creates a Google provider against the given endpoints.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` if an endpoint is not a valid URL.
    pub fn new(
        config: &ProviderConfig,
        endpoints: Endpoints,
        http_client: reqwest::Client,
    ) -> Result<Self> {
        let client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_client_secret(ClientSecret::new(config.client_secret.clone()))
            .set_auth_uri(AuthUrl::new(endpoints.authorize).map_err(invalid_endpoint)?)
            .set_token_uri(TokenUrl::new(endpoints.token).map_err(invalid_endpoint)?)
            .set_redirect_uri(RedirectUrl::from_url(config.redirect_url.clone()));

        let userinfo_url = Url::parse(&endpoints.identity).map_err(invalid_endpoint)?;

        Ok(Self {
            client,
            http_client,
            userinfo_url,
        })
    }

    /// Creates a Google provider against Google's production endpoints.
    pub fn from_config(config: &ProviderConfig, http_client: reqwest::Client) -> Result<Self> {
        Self::new(config, Endpoints::google(), http_client)
    }
}

#[async_trait]
impl OAuthProvider for GoogleProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn authorization_url(&self, state: &str) -> Result<Url> {
        let (url, _csrf) = self
            .client
            .authorize_url(|| CsrfToken::new(state.to_string()))
            .add_scopes(SCOPES.iter().map(|s| Scope::new((*s).to_string())))
            .url();

        Ok(url)
    }

    async fn exchange_code(&self, code: &str) -> Result<AccessToken> {
        let response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| AuthError::Exchange(e.to_string()))?;

        let expiry = response
            .expires_in()
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .map(|d| Utc::now() + d);

        Ok(AccessToken {
            access_token: response.access_token().secret().clone(),
            token_type: response.token_type().as_ref().to_string(),
            expiry,
            id_token: None,
        })
    }

    async fn fetch_user_profile(&self, token: &AccessToken) -> Result<UserProfile> {
        if !token.is_bearer() {
            return Err(AuthError::ProfileFetch(format!(
                "unsupported token type `{}`",
                token.token_type
            )));
        }

        let info: GoogleUserInfo = self
            .http_client
            .get(self.userinfo_url.clone())
            .bearer_auth(&token.access_token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::ProfileFetch(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::ProfileFetch(e.to_string()))?;

        Ok(UserProfile {
            id: info.id,
            name: info.name.unwrap_or_default(),
            email: info.email.unwrap_or_default(),
        })
    }
}

fn invalid_endpoint(err: url::ParseError) -> AuthError {
    AuthError::Config(format!("invalid provider endpoint: {}", err))
}
