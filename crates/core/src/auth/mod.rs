mod error;
mod functions;
mod registry;
mod traits;
mod types;

pub use error::AuthError;
pub use functions::{
    calculate_expiry, email_to_name, generate_session_id, generate_state, is_session_expired,
    SESSION_ID_BYTES, STATE_TOKEN_BYTES,
};
pub use registry::ProviderRegistry;
pub use traits::{OAuthProvider, Result};
pub use types::{AccessToken, SessionId, SessionRecord, UserProfile};
