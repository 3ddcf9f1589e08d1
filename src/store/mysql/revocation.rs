use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::MySqlStore;
use crate::error::AppResult;
use crate::model::revoked_token::RevokedToken;
use crate::store::RevocationStore;

#[async_trait]
impl RevocationStore for MySqlStore {
    async fn revoke_token(&self, token: RevokedToken) -> AppResult<()> {
        // logging out twice is not an error
        sqlx::query(
            r#"
            INSERT IGNORE INTO revoked_tokens (jti, user_id, revoked_at, expires_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&token.jti)
        .bind(token.user_id)
        .bind(token.revoked_at)
        .bind(token.expires_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    async fn is_token_revoked(&self, jti: &str) -> AppResult<bool> {
        let revoked = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = ? LIMIT 1)",
        )
        .bind(jti)
        .fetch_one(self.pool())
        .await?;

        Ok(revoked)
    }

    async fn purge_expired_revocations(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= ?")
            .bind(now)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected())
    }
}
