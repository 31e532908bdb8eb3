use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub newsletter: bool,
    pub avatar: Option<serde_json::Value>,
    #[serde(skip_serializing)]
    pub password_salt: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub auth_token: String,
    pub created_at: OffsetDateTime,
}

impl Account {
    pub async fn find_by_email(db: &PgPool, email: &str) -> ApiResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, username, newsletter, avatar,
                   password_salt, password_hash, auth_token, created_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(account)
    }

    pub async fn find_by_token(db: &PgPool, token: &str) -> ApiResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, username, newsletter, avatar,
                   password_salt, password_hash, auth_token, created_at
            FROM accounts
            WHERE auth_token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(db)
        .await?;
        Ok(account)
    }

    /// Insert a new account. The unique index on `email` backs the caller's
    /// pre-check, so a concurrent duplicate signup loses here and surfaces
    /// as the same conflict.
    pub async fn create(
        db: &PgPool,
        email: &str,
        username: &str,
        newsletter: bool,
        password_salt: &str,
        password_hash: &str,
        auth_token: &str,
    ) -> ApiResult<Account> {
        let inserted = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts
                (email, username, newsletter, password_salt, password_hash, auth_token)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, email, username, newsletter, avatar,
                      password_salt, password_hash, auth_token, created_at
            "#,
        )
        .bind(email)
        .bind(username)
        .bind(newsletter)
        .bind(password_salt)
        .bind(password_hash)
        .bind(auth_token)
        .fetch_one(db)
        .await;

        match inserted {
            Ok(account) => Ok(account),
            Err(e) if is_unique_violation(&e) => {
                Err(ApiError::Conflict("Email already registered".into()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}
