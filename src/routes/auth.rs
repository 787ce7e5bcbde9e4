//! Session routes and the extractors that resolve the caller.

use std::convert::Infallible;

use axum::Form;
use axum::extract::{FromRef, FromRequestParts, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use super::response::ApiError;
use super::{script, views};
use crate::services::session::Principal;
use crate::services::user::{self as user_svc, JoinRequest, LoginRequest, UserError};
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";

pub(crate) fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn cleared_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

fn token_from_jar(jar: &CookieJar) -> Option<String> {
    jar.get(COOKIE_NAME)
        .map(|c| c.value().to_owned())
        .filter(|token| !token.is_empty())
}

async fn resolve_session<S>(parts: &Parts, state: &S) -> Option<(Principal, String)>
where
    AppState: FromRef<S>,
{
    let token = token_from_jar(&CookieJar::from_headers(&parts.headers))?;
    let app_state = AppState::from_ref(state);
    let principal = app_state.sessions.get(&token).await?;
    Some((principal, token))
}

// =============================================================================
// EXTRACTORS
// =============================================================================

/// Authenticated caller for JSON endpoints. Rejects with a 401 envelope.
pub struct AuthUser {
    pub principal: Principal,
    pub token: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let (principal, token) = resolve_session(parts, state)
            .await
            .ok_or_else(ApiError::unauthenticated)?;
        Ok(Self { principal, token })
    }
}

/// Authenticated caller for HTML pages and form posts. Redirects to the
/// login form when there is no session.
pub struct PageUser {
    pub principal: Principal,
}

impl<S> FromRequestParts<S> for PageUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let (principal, _) = resolve_session(parts, state)
            .await
            .ok_or_else(|| Redirect::to("/loginForm"))?;
        Ok(Self { principal })
    }
}

/// Caller's principal if logged in; never rejects.
pub struct MaybeUser(pub Option<Principal>);

impl<S> FromRequestParts<S> for MaybeUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve_session(parts, state).await.map(|(principal, _)| principal)))
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /loginForm`
pub async fn login_form() -> Html<String> {
    views::login_form()
}

/// `GET /joinForm`
pub async fn join_form() -> Html<String> {
    views::join_form()
}

/// `POST /login`: check credentials, start a session, set the cookie.
pub async fn login(State(state): State<AppState>, jar: CookieJar, Form(req): Form<LoginRequest>) -> Response {
    if let Err(errors) = req.validate() {
        return script::back(StatusCode::BAD_REQUEST, &errors.to_string());
    }

    let user = match user_svc::authenticate(&state.pool, &req.email, &req.password).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::info!("login rejected: no matching credentials");
            return script::back(StatusCode::UNAUTHORIZED, "Incorrect email or password.");
        }
        Err(e) => {
            tracing::error!(error = %e, "login lookup failed");
            return script::back(StatusCode::INTERNAL_SERVER_ERROR, "Login failed, please try again.");
        }
    };

    // A stale session from an earlier login on this browser is dropped.
    if let Some(previous) = token_from_jar(&jar) {
        state.sessions.invalidate(&previous).await;
    }

    let token = state.sessions.create(Principal::from(&user)).await;
    let jar = jar.add(session_cookie(token, state.cookie_secure));
    (jar, script::href("/", Some("Logged in."))).into_response()
}

/// `POST /join`: register, then send the user to the login form.
pub async fn join(State(state): State<AppState>, Form(req): Form<JoinRequest>) -> Response {
    if let Err(errors) = req.validate() {
        return script::back(StatusCode::BAD_REQUEST, &errors.to_string());
    }

    match user_svc::register(&state.pool, &req).await {
        Ok(_) => script::href("/loginForm", None),
        Err(UserError::Duplicate(field)) => {
            script::back(StatusCode::CONFLICT, &format!("That {field} is already registered."))
        }
        Err(e) => {
            tracing::error!(error = %e, "registration failed");
            script::back(StatusCode::INTERNAL_SERVER_ERROR, "Registration failed, please try again.")
        }
    }
}

/// `GET /logout`: drop the session, clear the cookie, go home.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(token) = token_from_jar(&jar) {
        state.sessions.invalidate(&token).await;
        let active_sessions = state.sessions.count().await;
        tracing::debug!(active_sessions, "logout");
    }

    let jar = jar.add(cleared_cookie(state.cookie_secure));
    (jar, Redirect::to("/"))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
