//! Liveness probe.

use axum::http::StatusCode;

/// GET /livez - Returns 200 as soon as the server accepts connections.
#[axum::debug_handler]
pub async fn livez() -> StatusCode {
    StatusCode::OK
}
