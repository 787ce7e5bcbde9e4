use super::*;

#[test]
fn hash_password_produces_argon2id_phc_string() {
    let hash = hash_password("p").unwrap();
    assert!(hash.starts_with("$argon2id$"));
    assert!(!hash.contains("$p$"));
}

#[test]
fn hash_password_salts_each_call() {
    let a = hash_password("same").unwrap();
    let b = hash_password("same").unwrap();
    assert_ne!(a, b);
}

#[test]
fn verify_password_accepts_match() {
    let hash = hash_password("correct horse").unwrap();
    assert!(verify_password("correct horse", &hash).unwrap());
}

#[test]
fn verify_password_rejects_mismatch() {
    let hash = hash_password("correct horse").unwrap();
    assert!(!verify_password("wrong", &hash).unwrap());
}

#[test]
fn verify_password_malformed_hash_is_error() {
    let err = verify_password("p", "plaintext-not-a-hash").unwrap_err();
    assert!(matches!(err, PasswordError::Malformed(_)));
}
