//! User service: credential lookup, registration, profile updates.
//!
//! ERROR HANDLING
//! ==============
//! A failed login is `Ok(None)`, not an error; callers reserve `Err` for
//! storage problems. Duplicate usernames/emails are detected from the unique
//! constraints rather than a pre-check query.

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use tracing::info;

use super::access;
use super::password::{self, PasswordError};
use super::session::Principal;
use super::validation::{self, FieldErrors};

const USERNAME_MIN: usize = 2;
const USERNAME_MAX: usize = 20;
const EMAIL_MAX: usize = 50;
const PASSWORD_MAX: usize = 64;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("user not found: {0}")]
    NotFound(i64),
    #[error("not allowed to modify user {0}")]
    Forbidden(i64),
    #[error("{0} is already taken")]
    Duplicate(&'static str),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persisted account. The password hash is never serialized.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self { id: user.id, username: user.username.clone(), email: user.email.clone() }
    }
}

type UserTuple = (i64, String, String, String);

fn from_tuple((id, username, email, password): UserTuple) -> User {
    User { id, username, email, password }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl JoinRequest {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        validation::not_blank(&mut errors, "username", &self.username);
        validation::length_between(&mut errors, "username", self.username.trim(), USERNAME_MIN, USERNAME_MAX);
        validation::not_blank(&mut errors, "email", &self.email);
        validation::email_shape(&mut errors, "email", &self.email);
        validation::max_length(&mut errors, "email", self.email.trim(), EMAIL_MAX);
        validation::not_blank(&mut errors, "password", &self.password);
        validation::max_length(&mut errors, "password", &self.password, PASSWORD_MAX);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        validation::not_blank(&mut errors, "email", &self.email);
        validation::not_blank(&mut errors, "password", &self.password);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub email: String,
}

impl UserUpdate {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        validation::not_blank(&mut errors, "email", &self.email);
        validation::email_shape(&mut errors, "email", &self.email);
        validation::max_length(&mut errors, "email", self.email.trim(), EMAIL_MAX);
        errors.into_result()
    }
}

#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn duplicate_field(err: &sqlx::Error) -> Option<&'static str> {
    let sqlx::Error::Database(db) = err else {
        return None;
    };
    if !db.is_unique_violation() {
        return None;
    }
    match db.constraint() {
        Some("users_username_key") => Some("username"),
        Some("users_email_key") => Some("email"),
        _ => Some("account"),
    }
}

fn map_write_error(err: sqlx::Error) -> UserError {
    match duplicate_field(&err) {
        Some(field) => UserError::Duplicate(field),
        None => UserError::Database(err),
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Look up a user by email and check the password.
///
/// # Errors
///
/// Returns an error only when storage fails or the stored hash is malformed.
/// An unknown email or wrong password is `Ok(None)`.
pub async fn authenticate(pool: &PgPool, email: &str, password: &str) -> Result<Option<User>, UserError> {
    let row = sqlx::query_as::<_, UserTuple>("SELECT id, username, email, password FROM users WHERE email = $1")
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;

    let Some(user) = row.map(from_tuple) else {
        return Ok(None);
    };

    if password::verify_password(password, &user.password)? { Ok(Some(user)) } else { Ok(None) }
}

/// Create a new account from validated input.
///
/// # Errors
///
/// Returns [`UserError::Duplicate`] when the username or email is taken.
pub async fn register(pool: &PgPool, req: &JoinRequest) -> Result<User, UserError> {
    let hash = password::hash_password(&req.password)?;
    let row = sqlx::query_as::<_, UserTuple>(
        "INSERT INTO users (username, email, password) VALUES ($1, $2, $3)
         RETURNING id, username, email, password",
    )
    .bind(req.username.trim())
    .bind(normalize_email(&req.email))
    .bind(hash)
    .fetch_one(pool)
    .await
    .map_err(map_write_error)?;

    let user = from_tuple(row);
    info!(user_id = user.id, username = %user.username, "user registered");
    Ok(user)
}

/// Fetch one user.
///
/// # Errors
///
/// Returns [`UserError::NotFound`] when no row has this id.
pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<User, UserError> {
    sqlx::query_as::<_, UserTuple>("SELECT id, username, email, password FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(from_tuple)
        .ok_or(UserError::NotFound(id))
}

/// Apply a profile update on behalf of `principal`, all or nothing.
/// Returns the updated user so the caller can re-issue its session.
///
/// # Errors
///
/// Returns [`UserError::Forbidden`] when `principal` is not user `id`,
/// [`UserError::NotFound`] when the row is gone, and
/// [`UserError::Duplicate`] when the new email is taken.
pub async fn update_profile(pool: &PgPool, id: i64, principal: &Principal, update: &UserUpdate) -> Result<User, UserError> {
    access::ensure_owner(principal.id, id).map_err(|_| UserError::Forbidden(id))?;

    let mut tx = pool.begin().await?;
    if !lock_user(tx.as_mut(), id).await? {
        return Err(UserError::NotFound(id));
    }

    let row = sqlx::query_as::<_, UserTuple>(
        "UPDATE users SET email = $2 WHERE id = $1 RETURNING id, username, email, password",
    )
    .bind(id)
    .bind(normalize_email(&update.email))
    .fetch_one(tx.as_mut())
    .await
    .map_err(map_write_error)?;

    tx.commit().await?;

    let user = from_tuple(row);
    info!(user_id = user.id, "user profile updated");
    Ok(user)
}

async fn lock_user(conn: &mut PgConnection, id: i64) -> Result<bool, sqlx::Error> {
    let row = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row.is_some())
}

#[cfg(test)]
#[path = "user_test.rs"]
mod tests;
