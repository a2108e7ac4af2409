use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;

/// Identity of the acting user, resolved from the bearer token. Token
/// issuance lives outside this service; only validation happens here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

/// Validates the bearer token against the decoding key configured at startup
/// and injects the resolved `Claims` as a request extension. Every link
/// operation downstream scopes itself to `claims.sub`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token_data = decode::<Claims>(token, &state.auth_key, &Validation::default())
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(token_data.claims);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{Router, body::Body, middleware::from_fn_with_state, routing::get};
    use jsonwebtoken::{DecodingKey, EncodingKey, Header, encode};
    use tower::ServiceExt;

    use mirrorlink_db::Database;
    use mirrorlink_hooks::mock::MockGateway;

    use crate::state::AppStateInner;

    fn app(secret: &[u8]) -> Router {
        let state = Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            gateway: Arc::new(MockGateway::returning(vec![])),
            auth_key: DecodingKey::from_secret(secret),
        });
        Router::new()
            .route("/protected", get(|| async { "ok" }))
            .layer(from_fn_with_state(state.clone(), require_auth))
            .with_state(state)
    }

    fn token(secret: &[u8]) -> String {
        let claims = Claims {
            sub: Uuid::new_v4(),
            username: "alice".into(),
            exp: u32::MAX as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let request = axum::http::Request::get("/protected")
            .body(Body::empty())
            .unwrap();
        let response = app(b"test-secret").oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_passes() {
        let request = axum::http::Request::get("/protected")
            .header("authorization", format!("Bearer {}", token(b"test-secret")))
            .body(Body::empty())
            .unwrap();
        let response = app(b"test-secret").oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn token_signed_with_wrong_key_is_rejected() {
        let request = axum::http::Request::get("/protected")
            .header("authorization", format!("Bearer {}", token(b"other-secret")))
            .body(Body::empty())
            .unwrap();
        let response = app(b"test-secret").oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
