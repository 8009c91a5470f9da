use crate::config::{AppConfig, ConfigError};
use crate::errors::AppError;
use crate::models::{ActiveProfile, ProfileHint};
use crate::profiles::resolve_active;
use crate::storage::{load_hint, persist_hint};
use crate::store::DocumentStore;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Option<DocumentStore>,
    pub config_error: Option<String>,
    pub active: Arc<Mutex<ActiveProfile>>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Result<DocumentStore, ConfigError>) -> Self {
        let (store, config_error) = match store {
            Ok(store) => (Some(store), None),
            Err(err) => (None, Some(err.to_string())),
        };
        let active = config.default_profile();
        Self {
            config: Arc::new(config),
            store,
            config_error,
            active: Arc::new(Mutex::new(active)),
        }
    }

    pub fn store(&self) -> Result<&DocumentStore, AppError> {
        self.store.as_ref().ok_or_else(|| {
            AppError::unconfigured(
                self.config_error
                    .clone()
                    .unwrap_or_else(|| "store is not configured".to_string()),
            )
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.config.today()
    }

    pub async fn active_profile(&self) -> ActiveProfile {
        self.active.lock().await.clone()
    }

    /// Startup: resolve the active profile from the hint file left by the
    /// previous run.
    pub async fn restore_active(&self) -> Result<ActiveProfile, AppError> {
        let hint = load_hint(&self.config.hint_path).await;
        self.resolve(None, &hint).await
    }

    /// Re-resolve against a fresh profile list, keeping the current profile
    /// unless `preferred_id` names another one.
    pub async fn refresh_active(&self, preferred_id: Option<&str>) -> Result<ActiveProfile, AppError> {
        let hint = ProfileHint::from(&self.active_profile().await);
        self.resolve(preferred_id, &hint).await
    }

    pub async fn set_active(&self, profile: ActiveProfile) -> ActiveProfile {
        let changed = {
            let mut active = self.active.lock().await;
            let changed = *active != profile;
            *active = profile.clone();
            changed
        };
        if changed {
            info!("active profile is now {:?} (goal {})", profile.name, profile.goal);
        }
        if let Err(err) = persist_hint(&self.config.hint_path, &ProfileHint::from(&profile)).await {
            warn!("could not remember active profile: {err}");
        }
        profile
    }

    async fn resolve(
        &self,
        preferred_id: Option<&str>,
        hint: &ProfileHint,
    ) -> Result<ActiveProfile, AppError> {
        let profiles = self.store()?.list_profiles().await;
        let next = resolve_active(&profiles, preferred_id, hint, &self.config.default_profile());
        Ok(self.set_active(next).await)
    }
}
