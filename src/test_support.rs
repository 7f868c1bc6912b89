use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Insert a user named `name` with email `<name>@cafe.dev`; returns its id.
/// The password hash is a placeholder, so seeded users cannot log in.
pub async fn seed_user(pool: &SqlitePool, name: &str, is_admin: bool) -> String {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO users (id, email, password_hash, name, is_active, is_admin, created_at, updated_at)
         VALUES (?, ?, 'x', ?, 1, ?, ?, ?)",
    )
    .bind(&id)
    .bind(format!("{}@cafe.dev", name))
    .bind(name)
    .bind(is_admin)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .unwrap();

    id
}
