use std::sync::Arc;

use palace_core::content::{QuestionBank, StaticQuestionBank};
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::gate_service::GateService;
use crate::settings_service::SettingsService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    gates: Arc<GateService>,
    settings: Arc<SettingsService>,
}

impl AppServices {
    /// Build services over an existing storage bundle with the built-in
    /// question bank.
    #[must_use]
    pub fn new(storage: &Storage, clock: Clock) -> Self {
        Self::with_bank(storage, clock, Arc::new(StaticQuestionBank::new()))
    }

    #[must_use]
    pub fn with_bank(storage: &Storage, clock: Clock, bank: Arc<dyn QuestionBank>) -> Self {
        let gates = Arc::new(GateService::new(
            clock,
            bank,
            Arc::clone(&storage.programs),
            Arc::clone(&storage.attempts),
            Arc::clone(&storage.completions),
            Arc::clone(&storage.profiles),
        ));
        let settings = Arc::new(SettingsService::new(Arc::clone(&storage.settings)));
        Self { gates, settings }
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(&storage, clock))
    }

    #[must_use]
    pub fn gates(&self) -> Arc<GateService> {
        Arc::clone(&self.gates)
    }

    #[must_use]
    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings)
    }
}
