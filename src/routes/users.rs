//! User profile routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use super::auth::{AuthUser, PageUser};
use super::response::{ApiError, ApiResponse};
use super::views;
use crate::services::session::Principal;
use crate::services::user::{self as user_svc, UserError, UserUpdate};
use crate::state::AppState;

pub(crate) fn user_error_to_status(err: &UserError) -> StatusCode {
    match err {
        UserError::NotFound(_) => StatusCode::NOT_FOUND,
        UserError::Forbidden(_) => StatusCode::FORBIDDEN,
        UserError::Duplicate(_) => StatusCode::CONFLICT,
        UserError::Password(_) | UserError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        let status = user_error_to_status(&err);
        if status.is_server_error() {
            tracing::error!(error = %err, "user operation failed");
            return Self::new(status, "internal server error");
        }
        Self::new(status, err.to_string())
    }
}

/// `GET /user/{id}`: profile edit page, filled from the session principal.
pub async fn user_info(PageUser { principal }: PageUser, Path(user_id): Path<i64>) -> Response {
    if principal.id != user_id {
        return views::error_page(StatusCode::FORBIDDEN, "You can only edit your own profile.", Some(&principal));
    }
    views::user_update_form(&principal).into_response()
}

/// `PUT /user/{id}`: update the profile and re-issue the session principal.
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
    body: Result<Json<UserUpdate>, JsonRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let Json(body) = body?;
    body.validate().map_err(|errors| ApiError::validation(&errors))?;

    let user = user_svc::update_profile(&state.pool, user_id, &auth.principal, &body).await?;

    if !state.sessions.reissue(&auth.token, Principal::from(&user)).await {
        tracing::warn!(user_id, "session vanished during profile update");
    }

    Ok(Json(ApiResponse::ok("Profile updated.", None)))
}

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;
