//! Board pages, forms, and the owner-only JSON mutations.

use axum::Form;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use serde::Deserialize;

use super::auth::{AuthUser, MaybeUser, PageUser};
use super::response::{ApiError, ApiResponse};
use super::{script, views};
use crate::services::board::{self, BoardError, BoardSave};
use crate::services::session::Principal;
use crate::state::AppState;

pub(crate) fn board_error_to_status(err: &BoardError) -> StatusCode {
    match err {
        BoardError::NotFound(_) => StatusCode::NOT_FOUND,
        BoardError::Forbidden(_) => StatusCode::FORBIDDEN,
        BoardError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn board_error_message(err: &BoardError) -> String {
    match err {
        BoardError::NotFound(id) => format!("Board {id} could not be found."),
        BoardError::Forbidden(id) => format!("You are not the owner of board {id}."),
        BoardError::Database(e) => {
            tracing::error!(error = %e, "board operation failed");
            "internal server error".to_owned()
        }
    }
}

impl From<BoardError> for ApiError {
    fn from(err: BoardError) -> Self {
        Self::new(board_error_to_status(&err), board_error_message(&err))
    }
}

fn board_error_page(err: &BoardError, principal: Option<&Principal>) -> Response {
    views::error_page(board_error_to_status(err), &board_error_message(err), principal)
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
}

/// `GET /` and `GET /board?page=N`: newest boards first, three per page.
pub async fn list_boards(
    State(state): State<AppState>,
    MaybeUser(principal): MaybeUser,
    Query(query): Query<ListQuery>,
) -> Response {
    match board::list_page(&state.pool, query.page.unwrap_or(0)).await {
        Ok(page) => views::board_list(&page, principal.as_ref()).into_response(),
        Err(e) => board_error_page(&e, principal.as_ref()),
    }
}

/// `GET /board/{id}`: detail page.
pub async fn board_detail(
    State(state): State<AppState>,
    MaybeUser(principal): MaybeUser,
    Path(board_id): Path<i64>,
) -> Response {
    match board::get_by_id(&state.pool, board_id).await {
        Ok(row) => views::board_detail(&row, principal.as_ref()).into_response(),
        Err(e) => board_error_page(&e, principal.as_ref()),
    }
}

/// `GET /board/saveForm`
pub async fn save_form(PageUser { principal }: PageUser) -> Html<String> {
    views::board_save_form(&principal)
}

/// `POST /board`: create from a form post.
pub async fn create_board(
    State(state): State<AppState>,
    PageUser { principal }: PageUser,
    Form(save): Form<BoardSave>,
) -> Response {
    if let Err(errors) = save.validate() {
        return script::back(StatusCode::BAD_REQUEST, &errors.to_string());
    }

    match board::create(&state.pool, &save, &principal).await {
        Ok(_) => script::href("/", None),
        Err(e) => script::back(board_error_to_status(&e), &board_error_message(&e)),
    }
}

/// `GET /board/{id}/updateForm`: edit page, owner only.
pub async fn update_form(
    State(state): State<AppState>,
    PageUser { principal }: PageUser,
    Path(board_id): Path<i64>,
) -> Response {
    let row = match board::get_by_id(&state.pool, board_id).await {
        Ok(row) => row,
        Err(e) => return board_error_page(&e, Some(&principal)),
    };
    if row.user_id != principal.id {
        return board_error_page(&BoardError::Forbidden(board_id), Some(&principal));
    }
    views::board_update_form(&row, &principal).into_response()
}

/// `PUT /board/{id}`
pub async fn update_board(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<i64>,
    save: Result<Json<BoardSave>, JsonRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let Json(save) = save?;
    save.validate().map_err(|errors| ApiError::validation(&errors))?;
    board::update(&state.pool, board_id, &auth.principal, &save).await?;
    Ok(Json(ApiResponse::ok("Board updated.", None)))
}

/// `DELETE /board/{id}`
pub async fn delete_board(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    board::delete(&state.pool, board_id, &auth.principal).await?;
    Ok(Json(ApiResponse::ok("Board deleted.", None)))
}

#[cfg(test)]
#[path = "boards_test.rs"]
mod tests;
