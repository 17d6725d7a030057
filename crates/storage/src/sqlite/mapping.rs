use palace_core::model::{ProgramId, ProgressionState, Track, UserId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::{ActiveProgram, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn user_from_str(raw: &str) -> Result<UserId, StorageError> {
    raw.parse().map_err(ser)
}

pub(crate) fn track_from_str(raw: &str) -> Result<Track, StorageError> {
    raw.parse().map_err(ser)
}

/// Flags for anonymous users live under the empty scope.
pub(crate) fn flag_scope(user: Option<UserId>) -> String {
    user.map(|u| u.to_string()).unwrap_or_default()
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn u16_from_i64(field: &'static str, v: i64) -> Result<u16, StorageError> {
    u16::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn u8_from_i64(field: &'static str, v: i64) -> Result<u8, StorageError> {
    u8::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn program_id_to_i64(id: ProgramId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("program_id overflow".into()))
}

pub(crate) fn program_id_from_i64(v: i64) -> Result<ProgramId, StorageError> {
    u64::try_from(v)
        .map(ProgramId::new)
        .map_err(|_| StorageError::Serialization(format!("invalid program_id: {v}")))
}

pub(crate) fn year_from_i64(v: i64) -> Result<u16, StorageError> {
    u16_from_i64("year", v)
}

pub(crate) fn map_program_row(row: &SqliteRow) -> Result<ActiveProgram, StorageError> {
    let id = program_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let user = user_from_str(&row.try_get::<String, _>("user_id").map_err(ser)?)?;
    let track = track_from_str(&row.try_get::<String, _>("track").map_err(ser)?)?;
    let year = year_from_i64(row.try_get::<i64, _>("year").map_err(ser)?)?;
    let quarter = u8_from_i64("quarter", row.try_get::<i64, _>("quarter").map_err(ser)?)?;
    let month = u8_from_i64("month", row.try_get::<i64, _>("month").map_err(ser)?)?;
    let completed = row.try_get::<i64, _>("completed").map_err(ser)? != 0;

    let state = ProgressionState::new(track, year, quarter, month, completed).map_err(ser)?;

    Ok(ActiveProgram {
        id,
        user,
        state,
        started_at: row.try_get("started_at").map_err(ser)?,
        updated_at: row.try_get("updated_at").map_err(ser)?,
    })
}
