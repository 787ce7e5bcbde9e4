//! Board service: paginated listing plus owner-checked mutations.
//!
//! DESIGN
//! ======
//! Every mutation runs in its own transaction. Update and delete lock the
//! board row (`FOR UPDATE`) before comparing owners, so a concurrent request
//! cannot slip between the ownership check and the write. Dropping the
//! transaction on any early return rolls back whatever was already written.
//!
//! ERROR HANDLING
//! ==============
//! Missing boards are `NotFound`, boards owned by someone else are
//! `Forbidden`. A delete that fails in storage is reported as `NotFound`.

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};

use super::access;
use super::session::Principal;
use super::validation::{self, FieldErrors};

/// Boards per list page.
pub const PAGE_SIZE: i64 = 3;
const TITLE_MAX: usize = 50;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("board not found: {0}")]
    NotFound(i64),
    #[error("not the owner of board {0}")]
    Forbidden(i64),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Board row joined with its owner's username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub user_id: i64,
    pub username: String,
}

type BoardTuple = (i64, String, String, i64, String);

fn from_tuple((id, title, content, user_id, username): BoardTuple) -> Board {
    Board { id, title, content, user_id, username }
}

/// Title and content submitted for create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct BoardSave {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl BoardSave {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        validation::not_blank(&mut errors, "title", &self.title);
        validation::max_length(&mut errors, "title", &self.title, TITLE_MAX);
        validation::not_blank(&mut errors, "content", &self.content);
        errors.into_result()
    }
}

/// One page of boards, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct BoardPage {
    pub boards: Vec<Board>,
    /// Zero-based page index.
    pub number: i64,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl BoardPage {
    #[must_use]
    pub fn is_first(&self) -> bool {
        self.number == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.number + 1 >= self.total_pages
    }

    /// Page the "previous" link points at. Past the end this is the last
    /// real page rather than `number - 1`.
    #[must_use]
    pub fn previous_number(&self) -> i64 {
        (self.number - 1).min(self.total_pages - 1).max(0)
    }
}

#[must_use]
pub fn page_offset(page: i64) -> i64 {
    page.max(0).saturating_mul(PAGE_SIZE)
}

#[must_use]
pub fn total_pages(total_elements: i64) -> i64 {
    if total_elements <= 0 { 0 } else { (total_elements + PAGE_SIZE - 1) / PAGE_SIZE }
}

const SELECT_BOARD: &str = "SELECT b.id, b.title, b.content, b.user_id, u.username
     FROM boards b
     JOIN users u ON u.id = b.user_id";

// =============================================================================
// READS
// =============================================================================

/// Fetch one board.
///
/// # Errors
///
/// Returns [`BoardError::NotFound`] when no board has this id.
pub async fn get_by_id(pool: &PgPool, id: i64) -> Result<Board, BoardError> {
    sqlx::query_as::<_, BoardTuple>(&format!("{SELECT_BOARD} WHERE b.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(from_tuple)
        .ok_or(BoardError::NotFound(id))
}

/// Fetch page `page` (zero-based, negative treated as 0) ordered by id
/// descending.
///
/// # Errors
///
/// Returns a database error if either query fails.
pub async fn list_page(pool: &PgPool, page: i64) -> Result<BoardPage, BoardError> {
    let number = page.max(0);
    let total_elements: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM boards")
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as::<_, BoardTuple>(&format!("{SELECT_BOARD} ORDER BY b.id DESC LIMIT $1 OFFSET $2"))
        .bind(PAGE_SIZE)
        .bind(page_offset(number))
        .fetch_all(pool)
        .await?;

    Ok(BoardPage {
        boards: rows.into_iter().map(from_tuple).collect(),
        number,
        total_elements,
        total_pages: total_pages(total_elements),
    })
}

// =============================================================================
// WRITES
// =============================================================================

/// Create a board owned by `principal`.
///
/// # Errors
///
/// Returns a database error if the insert fails.
pub async fn create(pool: &PgPool, save: &BoardSave, principal: &Principal) -> Result<Board, BoardError> {
    let mut tx = pool.begin().await?;
    let id: i64 = sqlx::query_scalar("INSERT INTO boards (title, content, user_id) VALUES ($1, $2, $3) RETURNING id")
        .bind(&save.title)
        .bind(&save.content)
        .bind(principal.id)
        .fetch_one(tx.as_mut())
        .await?;
    tx.commit().await?;

    info!(board_id = id, user_id = principal.id, "board created");
    Ok(Board {
        id,
        title: save.title.clone(),
        content: save.content.clone(),
        user_id: principal.id,
        username: principal.username.clone(),
    })
}

/// Replace title and content of a board owned by `principal`.
///
/// # Errors
///
/// Returns [`BoardError::NotFound`] when the board is absent and
/// [`BoardError::Forbidden`] when `principal` is not its owner. On any error
/// nothing is written.
pub async fn update(pool: &PgPool, id: i64, principal: &Principal, save: &BoardSave) -> Result<(), BoardError> {
    let mut tx = pool.begin().await?;
    let owner_id = lock_owner(tx.as_mut(), id).await?.ok_or(BoardError::NotFound(id))?;
    access::ensure_owner(principal.id, owner_id).map_err(|_| BoardError::Forbidden(id))?;

    set_content(tx.as_mut(), id, &save.content).await?;
    set_title(tx.as_mut(), id, &save.title).await?;

    tx.commit().await?;
    info!(board_id = id, user_id = principal.id, "board updated");
    Ok(())
}

/// Delete a board owned by `principal`.
///
/// # Errors
///
/// Returns [`BoardError::NotFound`] when the board is absent or the delete
/// fails, and [`BoardError::Forbidden`] when `principal` is not its owner.
pub async fn delete(pool: &PgPool, id: i64, principal: &Principal) -> Result<(), BoardError> {
    let mut tx = pool.begin().await?;
    let owner_id = lock_owner(tx.as_mut(), id).await?.ok_or(BoardError::NotFound(id))?;
    access::ensure_owner(principal.id, owner_id).map_err(|_| BoardError::Forbidden(id))?;

    let result = sqlx::query("DELETE FROM boards WHERE id = $1")
        .bind(id)
        .execute(tx.as_mut())
        .await
        .map_err(|e| {
            warn!(error = %e, board_id = id, "board delete failed");
            BoardError::NotFound(id)
        })?;
    if result.rows_affected() == 0 {
        return Err(BoardError::NotFound(id));
    }

    tx.commit().await?;
    info!(board_id = id, user_id = principal.id, "board deleted");
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

async fn lock_owner(conn: &mut PgConnection, id: i64) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT user_id FROM boards WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await
}

async fn set_title(conn: &mut PgConnection, id: i64, title: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE boards SET title = $2 WHERE id = $1")
        .bind(id)
        .bind(title)
        .execute(conn)
        .await?;
    Ok(())
}

async fn set_content(conn: &mut PgConnection, id: i64, content: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE boards SET content = $2 WHERE id = $1")
        .bind(id)
        .bind(content)
        .execute(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
#[path = "board_test.rs"]
mod tests;
