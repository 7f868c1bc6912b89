use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    http::header,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use chrono::{Duration, Utc};

use crate::config::{AppState, JwtConfig};
use crate::interceptors::AppError;

/// JWT Claims structure - contains user id, email and admin flag at issue time
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: String,
    pub email: String,
    pub is_admin: bool,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Create claims expiring after the configured lifetime
    pub fn new(id: String, email: String, is_admin: bool, jwt: &JwtConfig) -> Self {
        let iat = Utc::now();
        let exp = iat + Duration::seconds(jwt.expiration_seconds);

        Self {
            id,
            email,
            is_admin,
            exp: exp.timestamp(),
            iat: iat.timestamp(),
        }
    }
}

/// Generate JWT token from claims
pub fn generate_token(claims: &Claims, jwt: &JwtConfig) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(jwt.secret.as_bytes()),
    )
    .map_err(AppError::JwtError)
}

/// Verify and decode JWT token
pub fn verify_token(token: &str, jwt: &JwtConfig) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::warn!("JWT verification failed: {}", e);
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::Unauthorized("Token expired".to_string())
            }
            _ => AppError::Unauthorized("Invalid token".to_string()),
        }
    })?;

    Ok(token_data.claims)
}

/// JWT Authentication Middleware
pub struct JwtMiddleware;

impl JwtMiddleware {
    /// Resolves the bearer token through the user directory and stores the
    /// resulting `AuthUser` in the request extensions.
    pub async fn auth(
        State(state): State<AppState>,
        mut request: Request,
        next: Next,
    ) -> Result<Response, AppError> {
        // Extract token from Authorization header
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format".to_string()))?;

        let user = state.directory.authenticate(token).await?;

        request.extensions_mut().insert(user);

        Ok(next.run(request).await)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        middleware,
        routing::get,
        Extension, Router,
    };
    use sqlx::SqlitePool;
    use tower::ServiceExt;

    use super::*;
    use crate::config::AppConfig;
    use crate::models::AuthUser;
    use crate::services::MockUserDirectory;

    fn app(directory: MockUserDirectory) -> Router {
        let pool = SqlitePool::connect_lazy("sqlite::memory:").unwrap();
        let state = AppState::with_directory(pool, Arc::new(AppConfig::for_tests()), Arc::new(directory));

        Router::new()
            .route("/whoami", get(|Extension(user): Extension<AuthUser>| async move { user.id }))
            .route_layer(middleware::from_fn_with_state(state.clone(), JwtMiddleware::auth))
            .with_state(state)
    }

    fn request(authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn passes_authenticated_user_to_handler() {
        let mut directory = MockUserDirectory::new();
        directory
            .expect_authenticate()
            .withf(|token: &str| token == "good-token")
            .times(1)
            .returning(|_| {
                Ok(AuthUser {
                    id: "user-1".to_string(),
                    email: "alice@cafe.dev".to_string(),
                    is_admin: false,
                })
            });

        let response = app(directory)
            .oneshot(request(Some("Bearer good-token")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"user-1");
    }

    #[tokio::test]
    async fn rejects_missing_header() {
        let mut directory = MockUserDirectory::new();
        directory.expect_authenticate().never();

        let response = app(directory).oneshot(request(None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rejects_non_bearer_scheme() {
        let mut directory = MockUserDirectory::new();
        directory.expect_authenticate().never();

        let response = app(directory)
            .oneshot(request(Some("Basic dXNlcjpwYXNz")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn surfaces_directory_rejection() {
        let mut directory = MockUserDirectory::new();
        directory
            .expect_authenticate()
            .returning(|_| Err(AppError::Unauthorized("Token expired".to_string())));

        let response = app(directory)
            .oneshot(request(Some("Bearer stale")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "UNAUTHORIZED");
    }

    #[test]
    fn token_round_trip_keeps_claims() {
        let jwt = AppConfig::for_tests().jwt;
        let token = generate_token(&Claims::new("u-1".to_string(), "a@cafe.dev".to_string(), true, &jwt), &jwt).unwrap();

        let claims = verify_token(&token, &jwt).unwrap();
        assert_eq!(claims.id, "u-1");
        assert!(claims.is_admin);

        let other = JwtConfig {
            secret: "another-secret".to_string(),
            ..jwt
        };
        assert!(matches!(verify_token(&token, &other), Err(AppError::Unauthorized(_))));
    }
}
