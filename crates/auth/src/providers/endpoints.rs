/// Authorization, token and identity endpoints of a provider.
///
/// The identity endpoint is the userinfo URL for Google and the JWKS URL for
/// Apple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub authorize: String,
    pub token: String,
    pub identity: String,
}

impl Endpoints {
    pub fn google() -> Self {
        Self {
            authorize: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token: "https://oauth2.googleapis.com/token".to_string(),
            identity: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
        }
    }

    pub fn apple() -> Self {
        Self {
            authorize: "https://appleid.apple.com/auth/authorize".to_string(),
            token: "https://appleid.apple.com/auth/token".to_string(),
            identity: "https://appleid.apple.com/auth/keys".to_string(),
        }
    }

    /// Endpoints rooted at `base`, e.g. a local test server.
    pub fn rooted_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            authorize: format!("{}/authorize", base),
            token: format!("{}/token", base),
            identity: format!("{}/identity", base),
        }
    }
}
