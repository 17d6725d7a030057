use async_trait::async_trait;
use chrono::{DateTime, Utc};
use palace_core::model::{ProgramId, ProgressionState, Track, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── RECORDS ───────────────────────────────────────────────────────────────────
//

/// Key of a gate attempt: one row per user, track and calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GateKey {
    pub user: UserId,
    pub track: Track,
    pub year: u16,
    /// Month within the year, 1..=12.
    pub month: u8,
}

impl GateKey {
    #[must_use]
    pub fn for_state(user: UserId, state: &ProgressionState) -> Self {
        Self {
            user,
            track: state.track(),
            year: state.year(),
            month: state.month_of_year(),
        }
    }
}

/// Persisted history of attempts at one gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateAttempt {
    pub key: GateKey,
    pub attempt_count: u32,
    pub passed: bool,
    /// Unrounded percentage of the latest attempt.
    pub score: f64,
    pub elapsed_secs: u32,
    /// Set once the gate has been passed.
    pub completed_at: Option<DateTime<Utc>>,
}

/// A user's running program and where they are in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveProgram {
    pub id: ProgramId,
    pub user: UserId,
    pub state: ProgressionState,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to open a program; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewProgramRecord {
    pub user: UserId,
    pub state: ProgressionState,
    pub started_at: DateTime<Utc>,
}

/// Certificate written once when a program finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub user: UserId,
    pub track: Track,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub mastery_level: u32,
}

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

#[async_trait]
pub trait GateAttemptRepository: Send + Sync {
    /// Fetch the attempt record for a gate, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_attempt(&self, key: &GateKey) -> Result<Option<GateAttempt>, StorageError>;

    /// Insert or replace the attempt record for its key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn upsert_attempt(&self, attempt: &GateAttempt) -> Result<(), StorageError>;
}

#[async_trait]
pub trait ProgramRepository: Send + Sync {
    /// Create a program and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the program cannot be stored.
    async fn insert_program(&self, program: NewProgramRecord) -> Result<ProgramId, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_program(&self, id: ProgramId) -> Result<Option<ActiveProgram>, StorageError>;

    /// Most recently started program for a user on a track.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn find_program(
        &self,
        user: UserId,
        track: Track,
    ) -> Result<Option<ActiveProgram>, StorageError>;

    /// Write back a program's progression state.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the program does not exist.
    async fn update_program(&self, program: &ActiveProgram) -> Result<(), StorageError>;
}

#[async_trait]
pub trait CompletionRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn insert_completion(&self, record: &CompletionRecord) -> Result<i64, StorageError>;

    /// Completions for a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_completions(&self, user: UserId) -> Result<Vec<CompletionRecord>, StorageError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Current mastery level; 0 for users without a profile row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_mastery_level(&self, user: UserId) -> Result<u32, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be stored.
    async fn set_mastery_level(&self, user: UserId, level: u32) -> Result<(), StorageError>;
}

/// Key-value flags such as dismissed banners. `user = None` is the
/// anonymous scope.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_flag(&self, user: Option<UserId>, key: &str)
    -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the flag cannot be stored.
    async fn set_flag(
        &self,
        user: Option<UserId>,
        key: &str,
        value: &str,
    ) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    attempts: Arc<Mutex<HashMap<GateKey, GateAttempt>>>,
    programs: Arc<Mutex<Vec<ActiveProgram>>>,
    completions: Arc<Mutex<Vec<CompletionRecord>>>,
    mastery: Arc<Mutex<HashMap<UserId, u32>>>,
    flags: Arc<Mutex<HashMap<(Option<UserId>, String), String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl GateAttemptRepository for InMemoryRepository {
    async fn get_attempt(&self, key: &GateKey) -> Result<Option<GateAttempt>, StorageError> {
        let guard = self.attempts.lock().map_err(poisoned)?;
        Ok(guard.get(key).cloned())
    }

    async fn upsert_attempt(&self, attempt: &GateAttempt) -> Result<(), StorageError> {
        let mut guard = self.attempts.lock().map_err(poisoned)?;
        guard.insert(attempt.key, attempt.clone());
        Ok(())
    }
}

#[async_trait]
impl ProgramRepository for InMemoryRepository {
    async fn insert_program(&self, program: NewProgramRecord) -> Result<ProgramId, StorageError> {
        let mut guard = self.programs.lock().map_err(poisoned)?;
        let id = ProgramId::new(guard.len() as u64 + 1);
        guard.push(ActiveProgram {
            id,
            user: program.user,
            state: program.state,
            started_at: program.started_at,
            updated_at: program.started_at,
        });
        Ok(id)
    }

    async fn get_program(&self, id: ProgramId) -> Result<Option<ActiveProgram>, StorageError> {
        let guard = self.programs.lock().map_err(poisoned)?;
        Ok(guard.iter().find(|p| p.id == id).cloned())
    }

    async fn find_program(
        &self,
        user: UserId,
        track: Track,
    ) -> Result<Option<ActiveProgram>, StorageError> {
        let guard = self.programs.lock().map_err(poisoned)?;
        Ok(guard
            .iter()
            .filter(|p| p.user == user && p.state.track() == track)
            .max_by_key(|p| (p.started_at, p.id))
            .cloned())
    }

    async fn update_program(&self, program: &ActiveProgram) -> Result<(), StorageError> {
        let mut guard = self.programs.lock().map_err(poisoned)?;
        let slot = guard
            .iter_mut()
            .find(|p| p.id == program.id)
            .ok_or(StorageError::NotFound)?;
        *slot = program.clone();
        Ok(())
    }
}

#[async_trait]
impl CompletionRepository for InMemoryRepository {
    async fn insert_completion(&self, record: &CompletionRecord) -> Result<i64, StorageError> {
        let mut guard = self.completions.lock().map_err(poisoned)?;
        guard.push(record.clone());
        i64::try_from(guard.len()).map_err(|_| StorageError::Conflict)
    }

    async fn list_completions(&self, user: UserId) -> Result<Vec<CompletionRecord>, StorageError> {
        let guard = self.completions.lock().map_err(poisoned)?;
        Ok(guard.iter().filter(|c| c.user == user).cloned().collect())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn get_mastery_level(&self, user: UserId) -> Result<u32, StorageError> {
        let guard = self.mastery.lock().map_err(poisoned)?;
        Ok(guard.get(&user).copied().unwrap_or(0))
    }

    async fn set_mastery_level(&self, user: UserId, level: u32) -> Result<(), StorageError> {
        let mut guard = self.mastery.lock().map_err(poisoned)?;
        guard.insert(user, level);
        Ok(())
    }
}

#[async_trait]
impl SettingsRepository for InMemoryRepository {
    async fn get_flag(
        &self,
        user: Option<UserId>,
        key: &str,
    ) -> Result<Option<String>, StorageError> {
        let guard = self.flags.lock().map_err(poisoned)?;
        Ok(guard.get(&(user, key.to_owned())).cloned())
    }

    async fn set_flag(
        &self,
        user: Option<UserId>,
        key: &str,
        value: &str,
    ) -> Result<(), StorageError> {
        let mut guard = self.flags.lock().map_err(poisoned)?;
        guard.insert((user, key.to_owned()), value.to_owned());
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub attempts: Arc<dyn GateAttemptRepository>,
    pub programs: Arc<dyn ProgramRepository>,
    pub completions: Arc<dyn CompletionRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub settings: Arc<dyn SettingsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repo(InMemoryRepository::new())
    }

    /// Use one repository value for every contract.
    pub fn from_repo<R>(repo: R) -> Self
    where
        R: GateAttemptRepository
            + ProgramRepository
            + CompletionRepository
            + ProfileRepository
            + SettingsRepository
            + Clone
            + 'static,
    {
        Self {
            attempts: Arc::new(repo.clone()),
            programs: Arc::new(repo.clone()),
            completions: Arc::new(repo.clone()),
            profiles: Arc::new(repo.clone()),
            settings: Arc::new(repo),
        }
    }
}
