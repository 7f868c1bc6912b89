use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::dto::{CreateUserRequest, LoginRequest, LoginResponse, RegisterResponse, UpdateUserRequest, UserResponse};
use crate::interceptors::AppError;
use crate::middleware::{generate_token, verify_token, Claims};
use crate::models::{AuthUser, User};
use crate::utils::{hash_password, validate_request, verify_password};

/// Resolves credentials to users. The queue never trusts an identity that did
/// not come through here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Verify a bearer token and load the current state of its user
    async fn authenticate(&self, token: &str) -> Result<AuthUser, AppError>;
}

#[derive(Clone)]
pub struct UserService {
    db: SqlitePool,
    config: Arc<AppConfig>,
}

impl UserService {
    pub fn new(db: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }

    /// Register a new user
    pub async fn register(&self, request: CreateUserRequest) -> Result<RegisterResponse, AppError> {
        // Validate request
        validate_request(&request)?;

        let email = request.email.trim().to_lowercase();

        // Check if user already exists
        let existing_user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(&email)
            .fetch_optional(&self.db)
            .await?;

        if existing_user.is_some() {
            return Err(AppError::Conflict("User with this email already exists".to_string()));
        }

        // Hash password
        let password_hash = hash_password(&request.password)?;

        let is_admin = self.config.is_admin_email(&email);
        let user = User::new(email, password_hash, request.name, is_admin);

        // Insert into database
        let inserted_user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, password_hash, name, is_active, is_admin, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.is_active)
        .bind(user.is_admin)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.db)
        .await
        .map_err(|e| conflict_on_duplicate(e, "User with this email already exists"))?;

        tracing::info!("Registered user {} (admin: {})", inserted_user.id, inserted_user.is_admin);

        // Return user data only (no token for registration)
        Ok(RegisterResponse {
            user: inserted_user.to_response(),
        })
    }

    /// Login user
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        // Validate request
        validate_request(&request)?;

        // Find user by email
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(request.email.trim().to_lowercase())
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

        // Verify password
        let is_valid = verify_password(&request.password, &user.password_hash)?;

        if !is_valid {
            return Err(AppError::Unauthorized("Invalid email or password".to_string()));
        }

        // Check if user is active
        if !user.is_active {
            return Err(AppError::Forbidden("User account is disabled".to_string()));
        }

        // Generate JWT token
        let claims = Claims::new(user.id.clone(), user.email.clone(), user.is_admin, &self.config.jwt);
        let token = generate_token(&claims, &self.config.jwt)?;

        Ok(LoginResponse {
            token,
            user: user.to_response(),
        })
    }

    pub async fn list_users(&self) -> Result<Vec<UserResponse>, AppError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at ASC")
            .fetch_all(&self.db)
            .await?;

        Ok(users.iter().map(User::to_response).collect())
    }

    /// Users whose email contains `email`, ignoring case
    pub async fn find_by_email(&self, email: &str) -> Result<Vec<UserResponse>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE email LIKE '%' || ? || '%' ESCAPE '\\' ORDER BY email ASC",
        )
        .bind(escape_like(&email.trim().to_lowercase()))
        .fetch_all(&self.db)
        .await?;

        Ok(users.iter().map(User::to_response).collect())
    }

    /// Get user by ID
    pub async fn get_user_by_id(&self, user_id: &str) -> Result<UserResponse, AppError> {
        Ok(self.find_user(user_id).await?.to_response())
    }

    /// Update user. Only admins may touch `is_active` and `is_admin`.
    pub async fn update_user(
        &self,
        actor: &AuthUser,
        user_id: &str,
        request: UpdateUserRequest,
    ) -> Result<UserResponse, AppError> {
        // Validate request
        validate_request(&request)?;

        if !actor.can_act_for(user_id) {
            return Err(AppError::Forbidden("Cannot update another user".to_string()));
        }

        if (request.is_active.is_some() || request.is_admin.is_some()) && !actor.is_admin {
            return Err(AppError::Forbidden("Only admins can change account flags".to_string()));
        }

        let mut user = self.find_user(user_id).await?;

        if let Some(email) = &request.email {
            let email = email.trim().to_lowercase();

            // Check if email already exists for another user
            let existing = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ? AND id != ?")
                .bind(&email)
                .bind(user_id)
                .fetch_optional(&self.db)
                .await?;

            if existing.is_some() {
                return Err(AppError::Conflict("Email already in use".to_string()));
            }

            user.email = email;
        }

        if let Some(name) = request.name {
            user.name = Some(name);
        }
        if let Some(is_active) = request.is_active {
            user.is_active = is_active;
        }
        if let Some(is_admin) = request.is_admin {
            user.is_admin = is_admin;
        }

        let updated_user = sqlx::query_as::<_, User>(
            "UPDATE users SET email = ?, name = ?, is_active = ?, is_admin = ?, updated_at = ?
             WHERE id = ?
             RETURNING *",
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.is_active)
        .bind(user.is_admin)
        .bind(Utc::now())
        .bind(user_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| conflict_on_duplicate(e, "Email already in use"))?;

        Ok(updated_user.to_response())
    }

    async fn find_user(&self, user_id: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}

/// Escape LIKE wildcards so the input matches literally (with `ESCAPE '\'`)
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// The email check and the insert are separate statements; a concurrent
/// registration can still land first and trip the UNIQUE index.
fn conflict_on_duplicate(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::DatabaseError(err),
    }
}

#[async_trait]
impl UserDirectory for UserService {
    async fn authenticate(&self, token: &str) -> Result<AuthUser, AppError> {
        let claims = verify_token(token, &self.config.jwt)?;

        // Flags come from the database so revoked rights apply immediately
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(&claims.id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

        if !user.is_active {
            return Err(AppError::Forbidden("User account is disabled".to_string()));
        }

        Ok(AuthUser {
            id: user.id,
            email: user.email,
            is_admin: user.is_admin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::database::memory_pool;
    use crate::test_support::seed_user;

    async fn service() -> UserService {
        UserService::new(memory_pool().await, Arc::new(AppConfig::for_tests()))
    }

    fn register_request(email: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: email.to_string(),
            password: "secret123".to_string(),
            name: Some("Alice".to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_login_and_authenticate() {
        let users = service().await;

        let registered = users.register(register_request("Alice@Cafe.dev")).await.unwrap();
        assert_eq!(registered.user.email, "alice@cafe.dev");
        assert!(!registered.user.is_admin);

        let login = users
            .login(LoginRequest {
                email: "alice@cafe.dev".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        let auth = users.authenticate(&login.token).await.unwrap();
        assert_eq!(auth.id, registered.user.id);
        assert!(!auth.is_admin);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let users = service().await;
        seed_user(&users.db, "alice", false).await;

        let err = users.register(register_request("alice@cafe.dev")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_input() {
        let users = service().await;
        let mut request = register_request("not-an-email");
        request.password = "123".to_string();

        let err = users.register(request).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_garbage_token() {
        let users = service().await;

        let err = users.authenticate("not.a.token").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_authenticate_reads_current_flags() {
        let users = service().await;
        let id = seed_user(&users.db, "bob", false).await;
        let config = AppConfig::for_tests();
        let token = generate_token(&Claims::new(id.clone(), "bob@cafe.dev".to_string(), false, &config.jwt), &config.jwt).unwrap();

        sqlx::query("UPDATE users SET is_admin = 1 WHERE id = ?")
            .bind(&id)
            .execute(&users.db)
            .await
            .unwrap();
        assert!(users.authenticate(&token).await.unwrap().is_admin);

        sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
            .bind(&id)
            .execute(&users.db)
            .await
            .unwrap();
        let err = users.authenticate(&token).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_update_user_permissions() {
        let users = service().await;
        let alice = seed_user(&users.db, "alice", false).await;
        let bob = seed_user(&users.db, "bob", false).await;
        let as_alice = AuthUser {
            id: alice.clone(),
            email: "alice@cafe.dev".to_string(),
            is_admin: false,
        };

        let renamed = users
            .update_user(&as_alice, &alice, UpdateUserRequest {
                name: Some("Alice B.".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(renamed.name.as_deref(), Some("Alice B."));

        let err = users
            .update_user(&as_alice, &bob, UpdateUserRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = users
            .update_user(&as_alice, &alice, UpdateUserRequest {
                is_admin: Some(true),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = users
            .update_user(&as_alice, &alice, UpdateUserRequest {
                email: Some("bob@cafe.dev".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let as_admin = AuthUser { is_admin: true, ..as_alice };
        let promoted = users
            .update_user(&as_admin, &bob, UpdateUserRequest {
                is_admin: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(promoted.is_admin);
    }

    #[tokio::test]
    async fn test_find_by_email_matches_fragment() {
        let users = service().await;
        seed_user(&users.db, "alice", false).await;
        seed_user(&users.db, "bob", false).await;

        let found = users.find_by_email("ALI").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email, "alice@cafe.dev");

        assert_eq!(users.list_users().await.unwrap().len(), 2);
        assert!(matches!(users.get_user_by_id("missing").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_email_treats_wildcards_literally() {
        let users = service().await;
        seed_user(&users.db, "axb", false).await;
        seed_user(&users.db, "a_b", false).await;
        seed_user(&users.db, "a%c", false).await;

        let found = users.find_by_email("a_b").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email, "a_b@cafe.dev");

        let found = users.find_by_email("a%").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email, "a%c@cafe.dev");
    }

    #[test]
    fn escape_like_escapes_wildcards_and_backslash() {
        assert_eq!(escape_like(r"a_b%c\d"), r"a\_b\%c\\d");
    }

    #[tokio::test]
    async fn test_duplicate_email_insert_is_a_conflict() {
        let users = service().await;
        seed_user(&users.db, "alice", false).await;

        // Same email landing after the pre-insert check already passed
        let err = sqlx::query(
            "INSERT INTO users (id, email, password_hash, name, is_active, is_admin, created_at, updated_at)
             VALUES ('late', 'alice@cafe.dev', 'x', NULL, 1, 0, ?, ?)",
        )
        .bind(Utc::now())
        .bind(Utc::now())
        .execute(&users.db)
        .await
        .unwrap_err();

        let mapped = conflict_on_duplicate(err, "User with this email already exists");
        assert!(matches!(mapped, AppError::Conflict(_)));

        let other = conflict_on_duplicate(sqlx::Error::RowNotFound, "unused");
        assert!(matches!(other, AppError::DatabaseError(_)));
    }
}
