//! HTML page rendering.
//!
//! Templates are compiled in with `include_str!` and filled by `{{KEY}}`
//! replacement. Every inserted value passes through [`escape_html`], which
//! also escapes braces so user text can never form a placeholder.

use std::fmt::Write;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::services::board::{Board, BoardPage};
use crate::services::session::Principal;

const LAYOUT: &str = include_str!("../../templates/layout.html");
const BOARD_LIST: &str = include_str!("../../templates/board_list.html");
const BOARD_DETAIL: &str = include_str!("../../templates/board_detail.html");
const BOARD_SAVE_FORM: &str = include_str!("../../templates/board_save_form.html");
const BOARD_UPDATE_FORM: &str = include_str!("../../templates/board_update_form.html");
const LOGIN_FORM: &str = include_str!("../../templates/login_form.html");
const JOIN_FORM: &str = include_str!("../../templates/join_form.html");
const USER_UPDATE_FORM: &str = include_str!("../../templates/user_update_form.html");
const ERROR_PAGE: &str = include_str!("../../templates/error.html");

#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            _ => out.push(c),
        }
    }
    out
}

fn nav(principal: Option<&Principal>) -> String {
    let mut nav = String::from(r#"<a class="brand" href="/">blogapp</a>"#);
    match principal {
        Some(p) => {
            let _ = write!(
                nav,
                r#"<a href="/board/saveForm">Write</a><a href="/user/{}">{}</a><a href="/logout">Log out</a>"#,
                p.id,
                escape_html(&p.username)
            );
        }
        None => nav.push_str(r#"<a href="/loginForm">Log in</a><a href="/joinForm">Join</a>"#),
    }
    nav
}

fn layout(title: &str, principal: Option<&Principal>, body: &str) -> Html<String> {
    Html(
        LAYOUT
            .replace("{{TITLE}}", &escape_html(title))
            .replace("{{NAV}}", &nav(principal))
            .replace("{{BODY}}", body),
    )
}

// =============================================================================
// BOARDS
// =============================================================================

#[must_use]
pub fn board_list(page: &BoardPage, principal: Option<&Principal>) -> Html<String> {
    let items = if page.boards.is_empty() {
        "<p>No posts yet.</p>".to_owned()
    } else {
        page.boards.iter().fold(String::new(), |mut acc, board| {
            let _ = write!(
                acc,
                r#"<div class="card"><a href="/board/{}">{}</a> <small>by {}</small></div>"#,
                board.id,
                escape_html(&board.title),
                escape_html(&board.username)
            );
            acc
        })
    };

    let prev = if page.is_first() {
        "<span></span>".to_owned()
    } else {
        format!(r#"<a href="/board?page={}">previous</a>"#, page.previous_number())
    };
    let next = if page.is_last() {
        "<span></span>".to_owned()
    } else {
        format!(r#"<a href="/board?page={}">next</a>"#, page.number + 1)
    };

    let body = BOARD_LIST
        .replace("{{ITEMS}}", &items)
        .replace("{{PREV}}", &prev)
        .replace("{{NEXT}}", &next)
        .replace("{{PAGE}}", &(page.number + 1).to_string())
        .replace("{{PAGES}}", &page.total_pages.max(1).to_string());
    layout("Posts", principal, &body)
}

#[must_use]
pub fn board_detail(board: &Board, principal: Option<&Principal>) -> Html<String> {
    let actions = if principal.is_some_and(|p| p.id == board.user_id) {
        format!(
            r#"<p><a href="/board/{id}/updateForm">edit</a> <button onclick="deleteBoard({id})">delete</button></p>"#,
            id = board.id
        )
    } else {
        String::new()
    };

    let body = BOARD_DETAIL
        .replace("{{ACTIONS}}", &actions)
        .replace("{{ID}}", &board.id.to_string())
        .replace("{{USERNAME}}", &escape_html(&board.username))
        .replace("{{TITLE}}", &escape_html(&board.title))
        .replace("{{CONTENT}}", &escape_html(&board.content));
    layout(&board.title, principal, &body)
}

#[must_use]
pub fn board_save_form(principal: &Principal) -> Html<String> {
    layout("New post", Some(principal), BOARD_SAVE_FORM)
}

#[must_use]
pub fn board_update_form(board: &Board, principal: &Principal) -> Html<String> {
    let body = BOARD_UPDATE_FORM
        .replace("{{ID}}", &board.id.to_string())
        .replace("{{TITLE}}", &escape_html(&board.title))
        .replace("{{CONTENT}}", &escape_html(&board.content));
    layout("Edit post", Some(principal), &body)
}

// =============================================================================
// USERS
// =============================================================================

#[must_use]
pub fn login_form() -> Html<String> {
    layout("Log in", None, LOGIN_FORM)
}

#[must_use]
pub fn join_form() -> Html<String> {
    layout("Join", None, JOIN_FORM)
}

#[must_use]
pub fn user_update_form(principal: &Principal) -> Html<String> {
    let body = USER_UPDATE_FORM
        .replace("{{ID}}", &principal.id.to_string())
        .replace("{{USERNAME}}", &escape_html(&principal.username))
        .replace("{{EMAIL}}", &escape_html(&principal.email));
    layout("Profile", Some(principal), &body)
}

// =============================================================================
// ERRORS
// =============================================================================

/// Terminal HTML error page with the given status.
#[must_use]
pub fn error_page(status: StatusCode, message: &str, principal: Option<&Principal>) -> Response {
    let body = ERROR_PAGE
        .replace("{{STATUS}}", &status.to_string())
        .replace("{{MESSAGE}}", &escape_html(message));
    (status, layout("Error", principal, &body)).into_response()
}

#[cfg(test)]
#[path = "views_test.rs"]
mod tests;
