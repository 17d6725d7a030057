use std::sync::Arc;

use storage::repository::SettingsRepository;
use tracing::debug;

use crate::context::SessionContext;
use crate::error::SettingsError;

const DISMISSED: &str = "dismissed";

/// Dismissible banners and other one-shot UI flags.
///
/// Flags are scoped to the signed-in user, or shared when anonymous.
#[derive(Clone)]
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// # Errors
    ///
    /// Returns `SettingsError::EmptyKey` for a blank key, or storage errors.
    pub async fn is_dismissed(
        &self,
        ctx: &SessionContext,
        key: &str,
    ) -> Result<bool, SettingsError> {
        let key = validate_key(key)?;
        let value = self.repo.get_flag(ctx.user(), key).await?;
        Ok(value.as_deref() == Some(DISMISSED))
    }

    /// Mark a flag as dismissed. Dismissing twice is harmless.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::EmptyKey` for a blank key, or storage errors.
    pub async fn dismiss(&self, ctx: &SessionContext, key: &str) -> Result<(), SettingsError> {
        let key = validate_key(key)?;
        self.repo.set_flag(ctx.user(), key, DISMISSED).await?;
        debug!(key, user = ?ctx.user(), "flag dismissed");
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<&str, SettingsError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(SettingsError::EmptyKey);
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use palace_core::model::UserId;
    use storage::repository::InMemoryRepository;

    fn service() -> SettingsService {
        SettingsService::new(Arc::new(InMemoryRepository::new()))
    }

    #[tokio::test]
    async fn dismiss_is_scoped_per_user() {
        let svc = service();
        let alice = SessionContext::signed_in(UserId::random());
        let anon = SessionContext::anonymous();

        assert!(!svc.is_dismissed(&alice, "welcome").await.unwrap());
        svc.dismiss(&alice, " welcome ").await.unwrap();
        svc.dismiss(&alice, "welcome").await.unwrap();

        assert!(svc.is_dismissed(&alice, "welcome").await.unwrap());
        assert!(!svc.is_dismissed(&anon, "welcome").await.unwrap());
    }

    #[tokio::test]
    async fn blank_key_is_rejected() {
        let err = service()
            .dismiss(&SessionContext::anonymous(), "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, SettingsError::EmptyKey));
    }
}
