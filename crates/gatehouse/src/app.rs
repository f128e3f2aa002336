use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use gatehouse_auth::auth_routes;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    handlers::{
        health::livez,
        profile::{me, profile},
        users::get_user,
    },
    state::AppState,
};

/// Upper bound on a whole request, provider round trips included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    let api_routes = Router::new().route("/users/{id}", get(get_user));

    Router::new()
        .route("/", get(profile))
        .route("/me", get(me))
        .route("/livez", get(livez))
        .merge(auth_routes())
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .with_state(state)
}
