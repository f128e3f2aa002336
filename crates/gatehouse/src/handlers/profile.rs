//! Endpoints describing the signed-in user.

use axum::Json;
use gatehouse_auth::CurrentSession;
use gatehouse_core::auth::UserProfile;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Me {
    pub username: String,
}

/// GET / - Profile stored in the current session.
pub async fn profile(session: CurrentSession) -> Json<UserProfile> {
    Json(session.record.user_info)
}

/// GET /me - Display name of the current user.
pub async fn me(session: CurrentSession) -> Json<Me> {
    Json(Me {
        username: session.record.user_info.name,
    })
}
