//! Apple OAuth provider implementation.
//!
//! Apple Sign In differs from Google in two ways:
//! - the client secret is a JWT signed with the team's ES256 key (see
//!   [`ClientSecretSigner`](crate::ClientSecretSigner))
//! - there is no userinfo endpoint; identity comes from the `id_token`
//!   returned by the token endpoint, verified against Apple's JWKS

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatehouse_core::auth::{AccessToken, AuthError, OAuthProvider, Result, UserProfile};
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use oauth2::{
    basic::{
        BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
        BasicTokenType,
    },
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet,
    EndpointSet, ExtraTokenFields, RedirectUrl, Scope, StandardRevocableToken,
    StandardTokenResponse, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use url::Url;

use super::Endpoints;
use crate::client_secret::{ClientSecretSigner, SignedCredential};
use crate::config::AppleConfig;

/// Issuer of Apple identity tokens.
pub const APPLE_ISSUER: &str = "https://appleid.apple.com";

const SCOPES: &[&str] = &["name", "email"];

/// Extra fields of Apple's token response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppleTokenFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl ExtraTokenFields for AppleTokenFields {}

type AppleTokenResponse = StandardTokenResponse<AppleTokenFields, BasicTokenType>;

/// `oauth2::Client` speaking Apple's token response, with the auth and token
/// URLs optionally set.
type AppleClient<HasAuthUrl = EndpointNotSet, HasTokenUrl = EndpointNotSet> = oauth2::Client<
    BasicErrorResponse,
    AppleTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    HasAuthUrl,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    HasTokenUrl,
>;

/// Claims of an Apple identity token that gatehouse reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppleIdentityClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Apple OAuth provider.
pub struct AppleProvider {
    client: AppleClient<EndpointSet, EndpointSet>,
    http_client: reqwest::Client,
    client_id: String,
    keys_url: Url,
    credential_expires_at: DateTime<Utc>,
}

impl AppleProvider {
    /// Creates an Apple provider using an already signed client secret.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` if an endpoint is not a valid URL.
    pub fn new(
        config: &AppleConfig,
        credential: &SignedCredential,
        endpoints: Endpoints,
        http_client: reqwest::Client,
    ) -> Result<Self> {
        let client = AppleClient::new(ClientId::new(config.client_id.clone()))
            .set_client_secret(ClientSecret::new(credential.token.clone()))
            .set_auth_uri(AuthUrl::new(endpoints.authorize).map_err(invalid_endpoint)?)
            .set_token_uri(TokenUrl::new(endpoints.token).map_err(invalid_endpoint)?)
            .set_redirect_uri(RedirectUrl::from_url(config.redirect_url.clone()))
            .set_auth_type(AuthType::RequestBody);

        let keys_url = Url::parse(&endpoints.identity).map_err(invalid_endpoint)?;

        Ok(Self {
            client,
            http_client,
            client_id: config.client_id.clone(),
            keys_url,
            credential_expires_at: credential.expires_at,
        })
    }

    /// Loads the signing key named in `config`, signs a client secret and
    /// creates a provider against Apple's production endpoints.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Credential` if the key cannot be loaded or used.
    pub fn from_config(
        config: &AppleConfig,
        http_client: reqwest::Client,
    ) -> std::result::Result<Self, crate::AuthError> {
        let signer = ClientSecretSigner::from_file(
            &config.private_key_path,
            config.team_id.clone(),
            config.client_id.clone(),
            config.key_id.clone(),
        )?;
        let credential = signer.sign()?;

        tracing::info!(
            key_id = %signer.key_id(),
            expires_at = %credential.expires_at,
            "Signed Apple client secret"
        );

        Ok(Self::new(config, &credential, Endpoints::apple(), http_client)?)
    }

    /// When the client secret in use stops being accepted by Apple.
    pub fn credential_expires_at(&self) -> DateTime<Utc> {
        self.credential_expires_at
    }

    async fn fetch_keys(&self) -> Result<JwkSet> {
        self.http_client
            .get(self.keys_url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::ProfileFetch(format!("failed to fetch Apple keys: {}", e)))?
            .json()
            .await
            .map_err(|e| AuthError::ProfileFetch(format!("invalid Apple key set: {}", e)))
    }
}

#[async_trait]
impl OAuthProvider for AppleProvider {
    fn name(&self) -> &str {
        "apple"
    }

    fn authorization_url(&self, state: &str) -> Result<Url> {
        // Apple requires form_post whenever name or email is requested.
        let (url, _csrf) = self
            .client
            .authorize_url(|| CsrfToken::new(state.to_string()))
            .add_scopes(SCOPES.iter().map(|s| Scope::new((*s).to_string())))
            .add_extra_param("response_mode", "form_post")
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
            id_token: response.extra_fields().id_token.clone(),
        })
    }

    async fn fetch_user_profile(&self, token: &AccessToken) -> Result<UserProfile> {
        let id_token = token.id_token.as_deref().ok_or_else(|| {
            AuthError::ProfileFetch("token response carried no id_token".to_string())
        })?;

        let keys = self.fetch_keys().await?;
        let claims = verify_identity_token(id_token, &keys, &self.client_id)?;

        // Apple only shares the name once, in the callback form.
        Ok(UserProfile {
            id: claims.sub,
            name: String::new(),
            email: claims.email.unwrap_or_default(),
        })
    }
}

/// Verifies an Apple identity token against `keys`.
///
/// The token must be RS256-signed by a key in the set, issued by Apple for
/// `client_id`, and unexpired.
///
/// # Errors
///
/// Returns `AuthError::ProfileFetch` describing the first failed check.
pub fn verify_identity_token(
    id_token: &str,
    keys: &JwkSet,
    client_id: &str,
) -> Result<AppleIdentityClaims> {
    let header = decode_header(id_token)
        .map_err(|e| AuthError::ProfileFetch(format!("malformed identity token: {}", e)))?;

    let kid = header
        .kid
        .ok_or_else(|| AuthError::ProfileFetch("identity token has no key id".to_string()))?;

    let jwk = keys.find(&kid).ok_or_else(|| {
        AuthError::ProfileFetch(format!("identity token signed by unknown key `{}`", kid))
    })?;

    let key = DecodingKey::from_jwk(jwk)
        .map_err(|e| AuthError::ProfileFetch(format!("unusable Apple key `{}`: {}", kid, e)))?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[client_id]);
    validation.set_issuer(&[APPLE_ISSUER]);

    decode::<AppleIdentityClaims>(id_token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::ProfileFetch(format!("invalid identity token: {}", e)))
}

fn invalid_endpoint(err: url::ParseError) -> AuthError {
    AuthError::Config(format!("invalid provider endpoint: {}", err))
}
