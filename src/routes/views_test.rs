use super::*;

fn board(id: i64, user_id: i64, title: &str) -> Board {
    Board { id, title: title.into(), content: "body".into(), user_id, username: "alice".into() }
}

fn alice() -> Principal {
    Principal { id: 1, username: "alice".into(), email: "a@x.com".into() }
}

#[test]
fn escape_html_escapes_markup_and_braces() {
    assert_eq!(escape_html(r#"<b>"x" & 'y'</b>"#), "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;");
    assert_eq!(escape_html("{{BODY}}"), "&#123;&#123;BODY&#125;&#125;");
}

#[test]
fn layout_nav_reflects_login_state() {
    let anon = login_form().0;
    assert!(anon.contains("/loginForm"));
    assert!(!anon.contains("/logout"));

    let logged_in = board_save_form(&alice()).0;
    assert!(logged_in.contains("/logout"));
    assert!(logged_in.contains("/user/1"));
}

#[test]
fn board_list_renders_items_and_pager() {
    let page = BoardPage { boards: vec![board(5, 1, "fifth"), board(4, 1, "fourth")], number: 1, total_elements: 5, total_pages: 2 };
    let html = board_list(&page, None).0;
    assert!(html.contains(r#"<a href="/board/5">fifth</a>"#));
    assert!(html.contains("/board?page=0"));
    assert!(!html.contains("/board?page=2"));
    assert!(html.contains("page 2 of 2"));
}

#[test]
fn board_list_past_the_end_links_to_last_page() {
    let page = BoardPage { boards: Vec::new(), number: 10, total_elements: 5, total_pages: 2 };
    let html = board_list(&page, None).0;
    assert!(html.contains("/board?page=1"));
    assert!(!html.contains("/board?page=9"));
    assert!(!html.contains("/board?page=11"));
}

#[test]
fn board_list_empty_page() {
    let page = BoardPage { boards: Vec::new(), number: 0, total_elements: 0, total_pages: 0 };
    let html = board_list(&page, None).0;
    assert!(html.contains("No posts yet."));
    assert!(html.contains("page 1 of 1"));
}

#[test]
fn board_detail_escapes_user_content() {
    let mut b = board(3, 1, "<script>x</script>");
    b.content = "{{TITLE}}".into();
    let html = board_detail(&b, None).0;
    assert!(!html.contains("<script>x</script>"));
    assert!(html.contains("&lt;script&gt;"));
    assert!(html.contains("&#123;&#123;TITLE&#125;&#125;"));
}

#[test]
fn board_detail_actions_only_for_owner() {
    let owned = board_detail(&board(3, 1, "t"), Some(&alice())).0;
    assert!(owned.contains("/board/3/updateForm"));
    assert!(owned.contains("deleteBoard(3)"));

    let other = Principal { id: 2, username: "bob".into(), email: "b@x.com".into() };
    let foreign = board_detail(&board(3, 1, "t"), Some(&other)).0;
    assert!(!foreign.contains("/board/3/updateForm"));
}

#[test]
fn board_update_form_prefills_fields() {
    let html = board_update_form(&board(8, 1, "old title"), &alice()).0;
    assert!(html.contains(r#"value="old title""#));
    assert!(html.contains(r#"fetch("/board/8""#));
    assert!(!html.contains("{{ID}}"));
}

#[test]
fn user_update_form_uses_session_principal() {
    let html = user_update_form(&alice()).0;
    assert!(html.contains(r#"value="a@x.com""#));
    assert!(html.contains(r#"fetch("/user/1""#));
}

#[test]
fn error_page_sets_status() {
    let response = error_page(StatusCode::NOT_FOUND, "board not found: 9", None);
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
