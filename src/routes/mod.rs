//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! HTML pages and form posts share one router with the small JSON endpoints
//! the pages call through `fetch`. Session resolution happens per handler
//! through the extractors in [`auth`].

pub mod auth;
pub mod boards;
pub mod response;
pub mod script;
pub mod users;
pub mod views;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(boards::list_boards))
        .route("/board", get(boards::list_boards).post(boards::create_board))
        .route("/board/saveForm", get(boards::save_form))
        .route(
            "/board/{id}",
            get(boards::board_detail)
                .put(boards::update_board)
                .delete(boards::delete_board),
        )
        .route("/board/{id}/updateForm", get(boards::update_form))
        .route("/user/{id}", get(users::user_info).put(users::update_user))
        .route("/loginForm", get(auth::login_form))
        .route("/joinForm", get(auth::join_form))
        .route("/login", post(auth::login))
        .route("/join", post(auth::join))
        .route("/logout", get(auth::logout))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
