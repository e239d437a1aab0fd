use chrono::Utc;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{CoreError, Result};
use crate::types::{Role, User};

pub async fn create_user(
    pool: &DbPool,
    username: &str,
    role: Role,
    email: Option<&str>,
) -> Result<User> {
    let user = User {
        id: Uuid::new_v4().to_string(),
        username: username.to_string(),
        role: role.as_str().to_string(),
        email: email.map(str::to_string),
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
            INSERT INTO users (id, username, role, email, created_at)
            VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.username)
    .bind(&user.role)
    .bind(&user.email)
    .bind(user.created_at)
    .execute(pool)
    .await?;

    Ok(user)
}

pub async fn get_user(pool: &DbPool, id: &str) -> Result<User> {
    sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = ?"#)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| CoreError::not_found("user"))
}

pub async fn reviewers(pool: &DbPool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        r#"SELECT * FROM users WHERE role = 'reviewer' ORDER BY username"#,
    )
    .fetch_all(pool)
    .await?;
    Ok(users)
}
