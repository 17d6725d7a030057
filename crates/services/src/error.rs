//! Shared error types for the services crate.

use thiserror::Error;

use palace_core::model::{ProgramId, QuestionError, QuestionId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

use crate::notice::Notice;

/// Errors emitted by `GateService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GateError {
    #[error("sign in required")]
    SignedOut,
    #[error("program {0} not found")]
    UnknownProgram(ProgramId),
    #[error("program already completed")]
    ProgramComplete,
    #[error("{} question(s) still need an answer", missing.len())]
    IncompleteAnswers { missing: Vec<QuestionId> },
    #[error("no unsaved submission to retry")]
    NothingToRetry,
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl GateError {
    /// User-facing notification for this error.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            GateError::SignedOut => Notice::sign_in(),
            GateError::IncompleteAnswers { missing } => Notice::error(
                "Incomplete",
                format!("Please answer all questions ({} left).", missing.len()),
            ),
            GateError::ProgramComplete => {
                Notice::info("Program complete", "You have already finished this program.")
            }
            other => Notice::error("Something went wrong", other.to_string()),
        }
    }
}

/// Errors emitted by `SettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("flag key cannot be empty")]
    EmptyKey,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
