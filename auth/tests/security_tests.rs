//! Security properties of tokens and password hashes.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use todolist_auth::{AuthError, TokenConfig, TokenSigner, hash_password, verify_password};

fn now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap()
}

fn signer() -> TokenSigner {
    TokenSigner::new(TokenConfig::new("integration-secret"))
}

/// A token claiming `alg: none` with an empty signature must not pass.
#[test]
fn unsigned_token_is_rejected() {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":1,"iat":0,"exp":99999999999}"#);

    for token in [format!("{header}.{payload}."), format!("{header}.{payload}")] {
        assert_eq!(signer().verify(&token, now()), Err(AuthError::InvalidToken));
    }
}

/// The signature of one token does not authenticate another payload.
#[test]
fn signatures_do_not_transfer_between_tokens() {
    let signer = signer();
    let alice = signer.issue(1, now()).unwrap();
    let bob = signer.issue(2, now()).unwrap();

    let alice_parts: Vec<_> = alice.split('.').collect();
    let bob_parts: Vec<_> = bob.split('.').collect();
    let spliced = format!("{}.{}.{}", alice_parts[0], bob_parts[1], alice_parts[2]);

    assert_eq!(signer.verify(&spliced, now()), Err(AuthError::InvalidToken));
}

/// Expiry is exclusive: a token is dead at exactly `exp`.
#[test]
fn expiry_boundary() {
    let signer = TokenSigner::new(TokenConfig::new("s").with_ttl(Duration::seconds(60)));
    let token = signer.issue(5, now()).unwrap();

    assert!(signer.verify(&token, now() + Duration::seconds(59)).is_ok());
    assert_eq!(
        signer.verify(&token, now() + Duration::seconds(60)),
        Err(AuthError::TokenExpired)
    );
}

/// Rotating the secret invalidates every outstanding token.
#[test]
fn rotated_secret_invalidates_tokens() {
    let token = signer().issue(1, now()).unwrap();
    let rotated = TokenSigner::new(TokenConfig::new("rotated-secret"));

    assert_eq!(rotated.verify(&token, now()), Err(AuthError::InvalidToken));
}

/// One signer shared across tasks issues tokens that all verify to their
/// own user.
#[tokio::test]
async fn concurrent_issue_and_verify() {
    let signer = Arc::new(signer());

    let handles: Vec<_> = (0..32_i64)
        .map(|user_id| {
            let signer = Arc::clone(&signer);
            tokio::spawn(async move {
                let token = signer.issue(user_id, now()).unwrap();
                signer.verify(&token, now()).unwrap().user_id()
            })
        })
        .collect();

    for (expected, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap(), i64::try_from(expected).unwrap());
    }
}

/// Hashes never contain the password and a near miss never matches.
#[test]
fn password_hash_hides_the_password() {
    let stored = hash_password("correct horse").unwrap();

    assert!(!stored.contains("correct horse"));
    assert!(verify_password("correct horse", &stored));
    assert!(!verify_password("correct horse ", &stored));
    assert!(!verify_password("Correct horse", &stored));
    assert!(!verify_password("", &stored));
}
