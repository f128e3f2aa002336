use crate::auth::SessionId;

const STATE_PREFIX: &str = "oauth_state:";
const SESSION_PREFIX: &str = "session:";

/// Returns the store key for a pending OAuth state token.
pub fn state_key(state: &str) -> String {
    format!("{}{}", STATE_PREFIX, state)
}

/// Returns the store key for a session record.
pub fn session_key(id: &SessionId) -> String {
    format!("{}{}", SESSION_PREFIX, id)
}
