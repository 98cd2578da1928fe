//! Custom Axum extractors.
//!
//! - [`CorrelationId`]: the request's correlation id
//! - [`AuthUser`]: the caller, authenticated by bearer token
//! - [`ValidJson`]: a JSON body whose rejections answer 422
//!
//! ```ignore
//! async fn handler(
//!     user: AuthUser,
//!     ValidJson(body): ValidJson<CreateTodoRequest>,
//! ) -> Result<Json<Todo>, AppError> { ... }
//! ```

use crate::error::AppError;
use crate::middleware::CORRELATION_ID_HEADER;
use crate::repository::Repository;
use crate::state::AppState;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

/// Correlation id of the request.
///
/// Set by the correlation middleware; without it, read from the
/// `X-Correlation-ID` header or freshly generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Self>() {
            return Ok(*id);
        }

        let id = parts
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);
        Ok(Self(id))
    }
}

/// Token from an `Authorization: Bearer <token>` header.
///
/// - no header, or a header without a credential after the scheme: 401
/// - a credential under any scheme other than `Bearer`: 400
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Access denied"))?;

        let (scheme, token) = header
            .split_once(' ')
            .map(|(scheme, token)| (scheme, token.trim()))
            .filter(|(_, token)| !token.is_empty())
            .ok_or_else(|| AppError::unauthorized("Access denied"))?;

        if scheme != "Bearer" {
            return Err(AppError::bad_request(
                "Invalid authorization format. Expected 'Bearer <token>'",
            ));
        }

        Ok(Self(token.to_string()))
    }
}

/// The authenticated caller.
///
/// - no credential: 401
/// - non-`Bearer` scheme, or a token that does not verify or has expired: 400
/// - server without a signing secret: 500
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    /// Id carried by the token.
    pub user_id: i64,
}

#[async_trait]
impl<R: Repository> FromRequestParts<AppState<R>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<R>,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;

        let claims = state
            .signer
            .verify(&token, state.clock.now())
            .inspect_err(|e| tracing::debug!(error = %e, "Rejected bearer token"))?;

        Ok(Self {
            user_id: claims.user_id(),
        })
    }
}

/// `Json<T>` whose rejections (bad content type, malformed or mistyped
/// body) become 422 `VALIDATION_ERROR` responses.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ValidJson<T>(pub T);

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};

    fn parts(request: Request<Body>) -> Parts {
        request.into_parts().0
    }

    #[tokio::test]
    async fn correlation_id_from_header() {
        let id = Uuid::new_v4();
        let mut parts = parts(
            Request::builder()
                .header(CORRELATION_ID_HEADER, id.to_string())
                .body(Body::empty())
                .unwrap(),
        );

        let extracted = CorrelationId::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted.0, id);
    }

    #[tokio::test]
    async fn correlation_id_prefers_the_extension() {
        let id = Uuid::new_v4();
        let mut parts = parts(
            Request::builder()
                .header(CORRELATION_ID_HEADER, Uuid::new_v4().to_string())
                .body(Body::empty())
                .unwrap(),
        );
        parts.extensions.insert(CorrelationId(id));

        let extracted = CorrelationId::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted.0, id);
    }

    #[tokio::test]
    async fn bearer_token_is_extracted() {
        let mut parts = parts(
            Request::builder()
                .header(AUTHORIZATION, "Bearer abc.def.ghi")
                .body(Body::empty())
                .unwrap(),
        );

        let token = BearerToken::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(token, BearerToken("abc.def.ghi".into()));
    }

    #[tokio::test]
    async fn missing_credential_is_unauthorized() {
        for header in [None, Some("Bearer "), Some("abc")] {
            let mut builder = Request::builder();
            if let Some(value) = header {
                builder = builder.header(AUTHORIZATION, value);
            }
            let mut parts = parts(builder.body(Body::empty()).unwrap());

            let err = BearerToken::from_request_parts(&mut parts, &())
                .await
                .unwrap_err();
            assert_eq!(err.status(), StatusCode::UNAUTHORIZED, "header {header:?}");
        }
    }

    #[tokio::test]
    async fn foreign_scheme_is_a_bad_request() {
        let mut parts = parts(
            Request::builder()
                .header(AUTHORIZATION, "Basic dXNlcjpwdw==")
                .body(Body::empty())
                .unwrap(),
        );

        let err = BearerToken::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "BAD_REQUEST");
    }
}
