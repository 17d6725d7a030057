use async_trait::async_trait;
use palace_core::model::UserId;

use super::SqliteRepository;
use super::mapping::{conn, flag_scope};
use crate::repository::{SettingsRepository, StorageError};

#[async_trait]
impl SettingsRepository for SqliteRepository {
    async fn get_flag(
        &self,
        user: Option<UserId>,
        key: &str,
    ) -> Result<Option<String>, StorageError> {
        sqlx::query_scalar::<_, String>("SELECT value FROM settings_flags WHERE scope = ?1 AND key = ?2")
            .bind(flag_scope(user))
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)
    }

    async fn set_flag(
        &self,
        user: Option<UserId>,
        key: &str,
        value: &str,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO settings_flags (scope, key, value)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(scope, key) DO UPDATE SET value = excluded.value
            ",
        )
        .bind(flag_scope(user))
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
