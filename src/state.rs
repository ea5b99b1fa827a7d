use parking_lot::RwLock;
use std::sync::Arc;

use crate::backend::{BackendClient, SettingsApi};
use crate::config::Config;
use crate::store::SettingsStore;

/// Shared application state.
///
/// The settings store is the one source of truth for every view; handlers
/// take the lock only around local edits, never across a backend call.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<RwLock<SettingsStore>>,
    pub settings_api: Arc<dyn SettingsApi>,
    pub backend: BackendClient,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let backend = BackendClient::new(config.backend.clone())?;
        let settings_api: Arc<dyn SettingsApi> = Arc::new(backend.clone());
        Ok(Self::with_settings_api(config, backend, settings_api))
    }

    /// State with a custom settings store backend, e.g. an in-memory one.
    pub fn with_settings_api(
        config: Config,
        backend: BackendClient,
        settings_api: Arc<dyn SettingsApi>,
    ) -> Self {
        Self {
            config,
            store: Arc::new(RwLock::new(SettingsStore::new())),
            settings_api,
            backend,
        }
    }
}
