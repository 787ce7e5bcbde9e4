//! Script responses for classic form posts.
//!
//! A form post answers with a tiny HTML page whose script either alerts and
//! steps back in history (keeping the user's input) or navigates onward.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

/// Encode `raw` as a JS string literal that is safe inside `<script>`.
fn js_string(raw: &str) -> String {
    serde_json::to_string(raw)
        .unwrap_or_else(|_| "\"\"".to_owned())
        .replace("</", "<\\/")
}

fn page(status: StatusCode, script: &str) -> Response {
    (status, Html(format!("<!DOCTYPE html><html><body><script>{script}</script></body></html>"))).into_response()
}

/// Alert `message` and return to the previous page.
#[must_use]
pub fn back(status: StatusCode, message: &str) -> Response {
    page(status, &format!("alert({});history.back();", js_string(message)))
}

/// Optionally alert `message`, then navigate to `url`.
#[must_use]
pub fn href(url: &str, message: Option<&str>) -> Response {
    let alert = message.map(|m| format!("alert({});", js_string(m))).unwrap_or_default();
    page(StatusCode::OK, &format!("{alert}location.href={};", js_string(url)))
}

#[cfg(test)]
#[path = "script_test.rs"]
mod tests;
