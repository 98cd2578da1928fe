//! Signed bearer tokens.
//!
//! Tokens are compact JWS strings (`header.payload.signature`, each part
//! base64url without padding) signed with HMAC-SHA256:
//!
//! ```text
//! {"alg":"HS256","typ":"JWT"} . {"sub":42,"iat":1735689600,"exp":1735693200} . HMAC
//! ```

use crate::config::TokenConfig;
use crate::error::{AuthError, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Claims carried by a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Id of the authenticated user.
    pub sub: i64,
    /// Issued at (seconds since the epoch).
    pub iat: i64,
    /// Expires at (seconds since the epoch).
    pub exp: i64,
}

impl Claims {
    /// The authenticated user id.
    #[must_use]
    pub const fn user_id(&self) -> i64 {
        self.sub
    }
}

/// Issues and verifies tokens with the configured secret.
#[derive(Debug, Clone)]
pub struct TokenSigner {
    config: TokenConfig,
}

impl TokenSigner {
    /// Create a signer.
    #[must_use]
    pub const fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &TokenConfig {
        &self.config
    }

    fn mac(&self) -> Result<HmacSha256> {
        let secret = self
            .config
            .secret
            .as_deref()
            .ok_or(AuthError::SecretNotConfigured)?;
        HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| AuthError::InternalError(format!("HMAC key setup failed: {e}")))
    }

    /// Issue a token for `user_id`, valid from `now` for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SecretNotConfigured`] without a secret.
    pub fn issue(&self, user_id: i64, now: DateTime<Utc>) -> Result<String> {
        let mut mac = self.mac()?;

        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + self.config.ttl).timestamp(),
        };
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        };

        let signing_input = format!(
            "{}.{}",
            encode_json(&header)?,
            encode_json(&claims)?
        );
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        tracing::debug!(user_id, exp = claims.exp, "Issued token");
        Ok(format!("{signing_input}.{signature}"))
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// - [`AuthError::SecretNotConfigured`] without a secret
    /// - [`AuthError::InvalidToken`] for a malformed token, another algorithm
    ///   or a signature mismatch
    /// - [`AuthError::TokenExpired`] once `exp` is not after `now`
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims> {
        let mut mac = self.mac()?;

        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::InvalidToken);
        };

        let header: Header = decode_json(header)?;
        if header.alg != ALGORITHM {
            tracing::debug!(alg = %header.alg, "Rejected token algorithm");
            return Err(AuthError::InvalidToken);
        }

        let signing_input_len = token.len() - signature.len() - 1;
        mac.update(&token.as_bytes()[..signing_input_len]);
        let expected = mac.finalize().into_bytes();
        let provided = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::InvalidToken)?;
        if !constant_time_eq::constant_time_eq(&expected, &provided) {
            return Err(AuthError::InvalidToken);
        }

        let claims: Claims = decode_json(payload)?;
        if claims.exp <= now.timestamp() {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }
}

fn encode_json<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_vec(value).map_err(|e| AuthError::InternalError(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_json<T: for<'de> Deserialize<'de>>(part: &str) -> Result<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|_| AuthError::InvalidToken)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::InvalidToken)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap()
    }

    fn signer(secret: &str) -> TokenSigner {
        TokenSigner::new(TokenConfig::new(secret))
    }

    #[test]
    fn issued_token_verifies() {
        let signer = signer("s3cret");
        let token = signer.issue(42, now()).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let claims = signer.verify(&token, now() + Duration::minutes(5)).unwrap();
        assert_eq!(claims.user_id(), 42);
        assert_eq!(claims.iat, now().timestamp());
        assert_eq!(claims.exp, (now() + Duration::hours(1)).timestamp());
    }

    #[test]
    fn other_secret_is_rejected() {
        let token = signer("one").issue(1, now()).unwrap();
        assert_eq!(
            signer("two").verify(&token, now()),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let signer = signer("s3cret");
        let token = signer.issue(1, now()).unwrap();
        assert_eq!(
            signer.verify(&token, now() + Duration::hours(1)),
            Err(AuthError::TokenExpired)
        );
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let signer = signer("s3cret");
        let token = signer.issue(1, now()).unwrap();
        let forged_claims = encode_json(&Claims {
            sub: 2,
            iat: 0,
            exp: i64::MAX,
        })
        .unwrap();
        let parts: Vec<_> = token.split('.').collect();
        let forged = format!("{}.{forged_claims}.{}", parts[0], parts[2]);
        assert_eq!(signer.verify(&forged, now()), Err(AuthError::InvalidToken));
    }

    #[test]
    fn garbage_is_rejected() {
        let signer = signer("s3cret");
        for token in ["", "abc", "a.b", "a.b.c.d", "!!.??.**"] {
            assert_eq!(signer.verify(token, now()), Err(AuthError::InvalidToken));
        }
    }

    #[test]
    fn missing_secret_is_a_server_error() {
        let signer = TokenSigner::new(TokenConfig::default());
        assert_eq!(signer.issue(1, now()), Err(AuthError::SecretNotConfigured));
        assert_eq!(
            signer.verify("a.b.c", now()),
            Err(AuthError::SecretNotConfigured)
        );
        assert!(!AuthError::SecretNotConfigured.is_client_error());
    }
}
