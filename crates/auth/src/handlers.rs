//! HTTP handlers for auth routes.

use axum::{
    extract::{rejection::FormRejection, FromRef, Path, Query, State},
    http::{header::LOCATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::authenticator::CallbackParams;
use crate::error::AuthError;
use crate::extractors::session_id;
use crate::AuthState;

/// Query parameters for OAuth callback.
///
/// Missing fields deserialize as empty so they surface as `InvalidState`
/// rather than a framework rejection.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub state: String,
}

/// Apple sends callback as POST with form data.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackForm {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub state: String,
    /// JSON string with name on first login.
    #[serde(default)]
    pub user: Option<String>,
}

#[derive(Deserialize)]
struct AppleUser {
    name: Option<AppleName>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppleName {
    first_name: Option<String>,
    last_name: Option<String>,
}

/// Creates the auth router with all authentication routes.
///
/// Routes:
/// - `GET /auth/{provider}/login` - Redirect to the provider's consent screen
/// - `GET /auth/{provider}/callback` - Handle the provider's redirect
/// - `POST /auth/{provider}/callback` - Handle a `form_post` callback (Apple)
/// - `POST /logout` - End current session
pub fn auth_routes<S>() -> Router<S>
where
    AuthState: FromRef<S>,
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/auth/{provider}/login", get(login))
        .route(
            "/auth/{provider}/callback",
            get(callback_query).post(callback_form),
        )
        .route("/logout", post(logout))
}

/// A 302 redirect (`Redirect::to` answers 303).
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

async fn login(
    State(state): State<AuthState>,
    Path(provider): Path<String>,
) -> Result<Response, AuthError> {
    let redirect = state.authenticator.begin_login(&provider).await?;
    Ok(found(redirect.url.as_str()))
}

async fn callback_query(
    State(state): State<AuthState>,
    Path(provider): Path<String>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Result<(CookieJar, Response), AuthError> {
    let params = CallbackParams {
        code: query.code,
        state: query.state,
        display_name: None,
    };
    finish_login(&state, &provider, jar, params).await
}

async fn callback_form(
    State(state): State<AuthState>,
    Path(provider): Path<String>,
    jar: CookieJar,
    form: Result<Form<CallbackForm>, FormRejection>,
) -> Result<(CookieJar, Response), AuthError> {
    // An unreadable body carries no state; it fails like an empty form.
    let form = form.map(|Form(form)| form).unwrap_or_else(|rejection| {
        tracing::debug!(provider = %provider, %rejection, "Unreadable callback form");
        CallbackForm::default()
    });

    // Apple includes user info in form on first login
    let display_name = form.user.as_deref().and_then(display_name_from_user);

    let params = CallbackParams {
        code: form.code,
        state: form.state,
        display_name,
    };
    finish_login(&state, &provider, jar, params).await
}

async fn finish_login(
    state: &AuthState,
    provider: &str,
    jar: CookieJar,
    params: CallbackParams,
) -> Result<(CookieJar, Response), AuthError> {
    let (session_id, _record) = state
        .authenticator
        .complete_callback(provider, params)
        .await?;

    let jar = jar.add(state.session_cookie(&session_id));
    Ok((jar, found("/")))
}

async fn logout(
    State(state): State<AuthState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Response), AuthError> {
    let session_id = session_id(&headers, &state.cookie_name);

    state.authenticator.logout(session_id.as_ref()).await?;

    let jar = jar.remove(state.removal_cookie());
    Ok((jar, found("/")))
}

/// Full name from Apple's first-login `user` form field.
fn display_name_from_user(user: &str) -> Option<String> {
    let user: AppleUser = serde_json::from_str(user).ok()?;
    let name = user.name?;

    let full = [name.first_name, name.last_name]
        .into_iter()
        .flatten()
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    (!full.is_empty()).then_some(full)
}
