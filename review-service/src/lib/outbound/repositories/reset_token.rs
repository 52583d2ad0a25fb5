use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::models::ResetToken;
use crate::domain::authentication::ports::ResetTokenRepository;
use crate::domain::user::models::UserId;

pub struct PostgresResetTokenRepository {
    pool: PgPool,
}

impl PostgresResetTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ResetTokenRow {
    token: String,
    user_id: Uuid,
    expire_date: DateTime<Utc>,
}

impl From<ResetTokenRow> for ResetToken {
    fn from(row: ResetTokenRow) -> Self {
        Self {
            token: row.token,
            user_id: UserId(row.user_id),
            expire_date: row.expire_date,
        }
    }
}

#[async_trait]
impl ResetTokenRepository for PostgresResetTokenRepository {
    async fn create(&self, token: ResetToken) -> Result<(), AuthError> {
        sqlx::query(
            r#"
            INSERT INTO reset_tokens (token, user_id, expire_date)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&token.token)
        .bind(token.user_id.0)
        .bind(token.expire_date)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn consume(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetToken>, AuthError> {
        // Single statement: concurrent redemptions of one token succeed at most once
        let row = sqlx::query_as::<_, ResetTokenRow>(
            r#"
            DELETE FROM reset_tokens
            WHERE token = $1 AND expire_date >= $2
            RETURNING token, user_id, expire_date
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(row.map(ResetToken::from))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let result = sqlx::query(
            r#"
            DELETE FROM reset_tokens
            WHERE expire_date < $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
