use palace_core::model::UserId;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser, track_from_str, u32_from_i64, user_from_str};
use crate::repository::{CompletionRecord, CompletionRepository, ProfileRepository, StorageError};

#[async_trait::async_trait]
impl CompletionRepository for SqliteRepository {
    async fn insert_completion(&self, record: &CompletionRecord) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO completions (user_id, track, started_at, completed_at, mastery_level)
                VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(record.user.to_string())
        .bind(record.track.as_str())
        .bind(record.started_at)
        .bind(record.completed_at)
        .bind(i64::from(record.mastery_level))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }

    async fn list_completions(&self, user: UserId) -> Result<Vec<CompletionRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT user_id, track, started_at, completed_at, mastery_level
                FROM completions
                WHERE user_id = ?1
                ORDER BY completed_at ASC, id ASC
            ",
        )
        .bind(user.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(CompletionRecord {
                user: user_from_str(&row.try_get::<String, _>("user_id").map_err(ser)?)?,
                track: track_from_str(&row.try_get::<String, _>("track").map_err(ser)?)?,
                started_at: row.try_get("started_at").map_err(ser)?,
                completed_at: row.try_get("completed_at").map_err(ser)?,
                mastery_level: u32_from_i64(
                    "mastery_level",
                    row.try_get::<i64, _>("mastery_level").map_err(ser)?,
                )?,
            });
        }
        Ok(out)
    }
}

#[async_trait::async_trait]
impl ProfileRepository for SqliteRepository {
    async fn get_mastery_level(&self, user: UserId) -> Result<u32, StorageError> {
        let level: Option<i64> =
            sqlx::query_scalar::<_, i64>("SELECT mastery_level FROM profiles WHERE user_id = ?1")
                .bind(user.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(conn)?;

        level.map_or(Ok(0), |v| u32_from_i64("mastery_level", v))
    }

    async fn set_mastery_level(&self, user: UserId, level: u32) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO profiles (user_id, mastery_level)
                VALUES (?1, ?2)
                ON CONFLICT(user_id) DO UPDATE SET mastery_level = excluded.mastery_level
            ",
        )
        .bind(user.to_string())
        .bind(i64::from(level))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
