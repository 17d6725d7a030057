use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser, u32_from_i64};
use crate::repository::{GateAttempt, GateAttemptRepository, GateKey, StorageError};

#[async_trait::async_trait]
impl GateAttemptRepository for SqliteRepository {
    async fn get_attempt(&self, key: &GateKey) -> Result<Option<GateAttempt>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT attempt_count, passed, score, elapsed_secs, completed_at
                FROM gate_attempts
                WHERE user_id = ?1 AND track = ?2 AND year = ?3 AND month = ?4
            ",
        )
        .bind(key.user.to_string())
        .bind(key.track.as_str())
        .bind(i64::from(key.year))
        .bind(i64::from(key.month))
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(GateAttempt {
            key: *key,
            attempt_count: u32_from_i64(
                "attempt_count",
                row.try_get::<i64, _>("attempt_count").map_err(ser)?,
            )?,
            passed: row.try_get::<i64, _>("passed").map_err(ser)? != 0,
            score: row.try_get("score").map_err(ser)?,
            elapsed_secs: u32_from_i64(
                "elapsed_secs",
                row.try_get::<i64, _>("elapsed_secs").map_err(ser)?,
            )?,
            completed_at: row.try_get("completed_at").map_err(ser)?,
        }))
    }

    async fn upsert_attempt(&self, attempt: &GateAttempt) -> Result<(), StorageError> {
        let key = attempt.key;
        sqlx::query(
            r"
            INSERT INTO gate_attempts (
                user_id, track, year, month,
                attempt_count, passed, score, elapsed_secs, completed_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(user_id, track, year, month) DO UPDATE SET
                attempt_count = excluded.attempt_count,
                passed = excluded.passed,
                score = excluded.score,
                elapsed_secs = excluded.elapsed_secs,
                completed_at = excluded.completed_at
            ",
        )
        .bind(key.user.to_string())
        .bind(key.track.as_str())
        .bind(i64::from(key.year))
        .bind(i64::from(key.month))
        .bind(i64::from(attempt.attempt_count))
        .bind(i64::from(attempt.passed))
        .bind(attempt.score)
        .bind(i64::from(attempt.elapsed_secs))
        .bind(attempt.completed_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
