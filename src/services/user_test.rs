use super::*;
#[cfg(feature = "live-db-tests")]
use crate::state::test_helpers::{integration_pool, seed_user};

fn join(username: &str, email: &str, password: &str) -> JoinRequest {
    JoinRequest { username: username.into(), email: email.into(), password: password.into() }
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn join_request_valid() {
    assert!(join("alice", "a@x.com", "p").validate().is_ok());
}

#[test]
fn join_request_collects_every_failing_field() {
    let errors = join("", "not-an-email", "").validate().unwrap_err();
    assert_eq!(errors.len(), 3);
    assert!(errors.get("username").is_some());
    assert!(errors.get("email").is_some());
    assert_eq!(errors.get("password"), Some("must not be blank"));
}

#[test]
fn join_request_username_length_limits() {
    assert!(join("a", "a@x.com", "p").validate().is_err());
    assert!(join(&"a".repeat(21), "a@x.com", "p").validate().is_err());
    assert!(join(&"a".repeat(20), "a@x.com", "p").validate().is_ok());
}

#[test]
fn login_request_requires_both_fields() {
    let req = LoginRequest { email: " ".into(), password: String::new() };
    let errors = req.validate().unwrap_err();
    assert_eq!(errors.len(), 2);

    let ok = LoginRequest { email: "a@x.com".into(), password: "p".into() };
    assert!(ok.validate().is_ok());
}

#[test]
fn user_update_rejects_malformed_email() {
    let errors = UserUpdate { email: "nope".into() }.validate().unwrap_err();
    assert!(errors.get("email").is_some());
    assert!(UserUpdate { email: "b@x.com".into() }.validate().is_ok());
}

#[test]
fn join_request_deserializes_missing_fields_as_empty() {
    let req: JoinRequest = serde_json::from_str(r#"{"username":"bob"}"#).unwrap();
    assert_eq!(req.username, "bob");
    assert!(req.email.is_empty());
    assert!(req.validate().is_err());
}

// =============================================================================
// Types
// =============================================================================

#[test]
fn normalize_email_trims_and_lowercases() {
    assert_eq!(normalize_email("  A@X.Com "), "a@x.com");
}

#[test]
fn user_serialization_hides_password() {
    let user = User { id: 1, username: "alice".into(), email: "a@x.com".into(), password: "$argon2id$secret".into() };
    let json = serde_json::to_value(&user).unwrap();
    assert_eq!(json["username"], "alice");
    assert!(json.get("password").is_none());
}

#[test]
fn principal_from_user_copies_identity() {
    let user = User { id: 9, username: "zed".into(), email: "z@x.com".into(), password: "h".into() };
    let principal = Principal::from(&user);
    assert_eq!(principal, Principal { id: 9, username: "zed".into(), email: "z@x.com".into() });
}

#[test]
fn user_error_display() {
    assert_eq!(UserError::NotFound(3).to_string(), "user not found: 3");
    assert_eq!(UserError::Duplicate("email").to_string(), "email is already taken");
}

#[tokio::test]
async fn update_profile_rejects_other_user_before_touching_storage() {
    let state = crate::state::test_helpers::test_app_state();
    let principal = Principal { id: 1, username: "alice".into(), email: "a@x.com".into() };
    let update = UserUpdate { email: "new@x.com".into() };

    let result = update_profile(&state.pool, 2, &principal, &update).await;
    assert!(matches!(result, Err(UserError::Forbidden(2))));
}

// =============================================================================
// Live database
// =============================================================================

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn authenticate_matches_only_correct_password() {
    let pool = integration_pool().await;
    let created = register(&pool, &join("alice", "a@x.com", "p")).await.expect("register");

    let found = authenticate(&pool, "a@x.com", "p").await.expect("authenticate");
    assert_eq!(found.map(|u| u.id), Some(created.id));

    let wrong = authenticate(&pool, "a@x.com", "wrong").await.expect("authenticate");
    assert!(wrong.is_none());

    let unknown = authenticate(&pool, "nobody@x.com", "p").await.expect("authenticate");
    assert!(unknown.is_none());
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn register_stores_hash_not_plaintext() {
    let pool = integration_pool().await;
    let user = register(&pool, &join("alice", "A@X.com", "p")).await.expect("register");
    assert_eq!(user.email, "a@x.com");
    assert_ne!(user.password, "p");
    assert!(user.password.starts_with("$argon2id$"));
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn register_duplicate_email_is_reported() {
    let pool = integration_pool().await;
    register(&pool, &join("alice", "a@x.com", "p")).await.expect("register");

    let dup = register(&pool, &join("alice2", "a@x.com", "p")).await;
    assert!(matches!(dup, Err(UserError::Duplicate("email"))));

    let dup = register(&pool, &join("alice", "other@x.com", "p")).await;
    assert!(matches!(dup, Err(UserError::Duplicate("username"))));
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn update_profile_changes_email_for_owner() {
    let pool = integration_pool().await;
    let alice = seed_user(&pool, "alice", "p").await;

    let updated = update_profile(&pool, alice.id, &alice, &UserUpdate { email: "new@x.com".into() })
        .await
        .expect("update_profile");
    assert_eq!(updated.email, "new@x.com");
    assert_eq!(find_by_id(&pool, alice.id).await.expect("find").email, "new@x.com");
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn find_by_id_missing_is_not_found() {
    let pool = integration_pool().await;
    assert!(matches!(find_by_id(&pool, 404).await, Err(UserError::NotFound(404))));
}
