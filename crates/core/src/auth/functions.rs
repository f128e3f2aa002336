use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use super::{SessionId, SessionRecord};

/// Bytes of entropy in an OAuth state token (128 bits).
pub const STATE_TOKEN_BYTES: usize = 16;

/// Bytes of entropy in a session identifier (256 bits).
pub const SESSION_ID_BYTES: usize = 32;

fn random_token<const N: usize>() -> String {
    let mut bytes = [0u8; N];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a cryptographically random session ID.
pub fn generate_session_id() -> SessionId {
    SessionId::new(random_token::<SESSION_ID_BYTES>())
}

/// Generate a random state parameter for CSRF protection.
pub fn generate_state() -> String {
    random_token::<STATE_TOKEN_BYTES>()
}

/// Check if a session has expired.
pub fn is_session_expired(session: &SessionRecord, now: DateTime<Utc>) -> bool {
    session.expires_at <= now
}

/// Calculate session expiry from creation time and TTL.
pub fn calculate_expiry(created_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    created_at + ttl
}

/// Pick a display name for a profile that came back without one.
pub fn email_to_name(email: &str) -> String {
    match email.split('@').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "User".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AccessToken, UserProfile};

    fn is_url_safe(s: &str) -> bool {
        s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    fn session_expiring_at(now: DateTime<Utc>, expires_at: DateTime<Utc>) -> SessionRecord {
        SessionRecord {
            token: AccessToken {
                access_token: "at".to_string(),
                token_type: "Bearer".to_string(),
                expiry: None,
                id_token: None,
            },
            user_info: UserProfile {
                id: "user-1".to_string(),
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            },
            provider: "google".to_string(),
            created_at: now - Duration::hours(1),
            expires_at,
        }
    }

    #[test]
    fn generate_session_id_encodes_256_bits_url_safe() {
        let id = generate_session_id();
        // 32 bytes -> 43 base64 characters without padding
        assert_eq!(id.as_str().len(), 43);
        assert!(is_url_safe(id.as_str()));
    }

    #[test]
    fn generate_session_id_is_unique() {
        let id1 = generate_session_id();
        let id2 = generate_session_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn generate_state_encodes_128_bits_url_safe() {
        let state = generate_state();
        // 16 bytes -> 22 base64 characters without padding
        assert_eq!(state.len(), 22);
        assert!(is_url_safe(&state));
    }

    #[test]
    fn generate_state_is_unique() {
        assert_ne!(generate_state(), generate_state());
    }

    #[test]
    fn is_session_expired_returns_false_for_future_expiry() {
        let now = Utc::now();
        let session = session_expiring_at(now, now + Duration::hours(1));
        assert!(!is_session_expired(&session, now));
    }

    #[test]
    fn is_session_expired_returns_true_at_exact_expiry() {
        let now = Utc::now();
        let session = session_expiring_at(now, now);
        assert!(is_session_expired(&session, now));
    }

    #[test]
    fn calculate_expiry_adds_ttl_to_created_at() {
        let created = Utc::now();
        let ttl = Duration::hours(24);
        assert_eq!(calculate_expiry(created, ttl), created + ttl);
    }

    #[test]
    fn email_to_name_extracts_username() {
        assert_eq!(email_to_name("john.doe@example.com"), "john.doe");
        assert_eq!(email_to_name("no-at-sign"), "no-at-sign");
        assert_eq!(email_to_name(""), "User");
    }

    #[test]
    fn bearer_check_ignores_case() {
        let mut token = session_expiring_at(Utc::now(), Utc::now()).token;
        assert!(token.is_bearer());
        token.token_type = "bearer".to_string();
        assert!(token.is_bearer());
        token.token_type = "mac".to_string();
        assert!(!token.is_bearer());
    }
}
