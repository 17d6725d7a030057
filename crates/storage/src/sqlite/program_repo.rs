use palace_core::model::{ProgramId, Track, UserId};

use super::SqliteRepository;
use super::mapping::{conn, map_program_row, program_id_from_i64, program_id_to_i64};
use crate::repository::{ActiveProgram, NewProgramRecord, ProgramRepository, StorageError};

const SELECT_PROGRAM: &str = r"
    SELECT id, user_id, track, year, quarter, month, completed, started_at, updated_at
    FROM programs
";

#[async_trait::async_trait]
impl ProgramRepository for SqliteRepository {
    async fn insert_program(&self, program: NewProgramRecord) -> Result<ProgramId, StorageError> {
        let state = program.state;
        let res = sqlx::query(
            r"
            INSERT INTO programs (user_id, track, year, quarter, month, completed, started_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(program.user.to_string())
        .bind(state.track().as_str())
        .bind(i64::from(state.year()))
        .bind(i64::from(state.quarter()))
        .bind(i64::from(state.month()))
        .bind(i64::from(state.completed()))
        .bind(program.started_at)
        .bind(program.started_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        program_id_from_i64(res.last_insert_rowid())
    }

    async fn get_program(&self, id: ProgramId) -> Result<Option<ActiveProgram>, StorageError> {
        let sql = format!("{SELECT_PROGRAM} WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(program_id_to_i64(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_program_row).transpose()
    }

    async fn find_program(
        &self,
        user: UserId,
        track: Track,
    ) -> Result<Option<ActiveProgram>, StorageError> {
        let sql = format!(
            "{SELECT_PROGRAM} WHERE user_id = ?1 AND track = ?2 ORDER BY started_at DESC, id DESC LIMIT 1"
        );
        let row = sqlx::query(&sql)
            .bind(user.to_string())
            .bind(track.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_program_row).transpose()
    }

    async fn update_program(&self, program: &ActiveProgram) -> Result<(), StorageError> {
        let state = program.state;
        let res = sqlx::query(
            r"
            UPDATE programs
            SET year = ?2, quarter = ?3, month = ?4, completed = ?5, updated_at = ?6
            WHERE id = ?1
            ",
        )
        .bind(program_id_to_i64(program.id)?)
        .bind(i64::from(state.year()))
        .bind(i64::from(state.quarter()))
        .bind(i64::from(state.month()))
        .bind(i64::from(state.completed()))
        .bind(program.updated_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
