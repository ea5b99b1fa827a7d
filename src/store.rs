//! The single owner of the settings value.
//!
//! Holds the editable draft and the last persisted baseline. Edits are pure
//! local transformations; only [`SettingsStore::load`] and
//! [`SettingsStore::save`] touch the network. Both are also available as
//! `begin_*`/`finish_*` halves so a store shared behind a lock can release
//! the lock while the request is in flight.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::backend::SettingsApi;
use crate::error::{InvalidMetric, SyncError};
use crate::settings::{DatabaseType, LlmProvider, Metric, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Uninitialized,
    Loading,
    Ready,
    Saving,
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    phase: Phase,
    /// Phase to return to when the in-flight request fails.
    resume_phase: Phase,
    draft: Settings,
    persisted: Option<Settings>,
    last_error: Option<SyncError>,
    synced_at: Option<DateTime<Utc>>,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore {
    /// A store holding the default draft, before anything was loaded.
    pub fn new() -> Self {
        Self {
            phase: Phase::Uninitialized,
            resume_phase: Phase::Uninitialized,
            draft: Settings::default(),
            persisted: None,
            last_error: None,
            synced_at: None,
        }
    }

    /// A store whose baseline is already known.
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            phase: Phase::Ready,
            resume_phase: Phase::Ready,
            draft: settings.clone(),
            persisted: Some(settings),
            last_error: None,
            synced_at: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The current draft.
    pub fn settings(&self) -> &Settings {
        &self.draft
    }

    /// The last value read from or written to the backend.
    pub fn persisted(&self) -> Option<&Settings> {
        self.persisted.as_ref()
    }

    pub fn last_error(&self) -> Option<&SyncError> {
        self.last_error.as_ref()
    }

    pub fn synced_at(&self) -> Option<DateTime<Utc>> {
        self.synced_at
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Loading | Phase::Saving)
    }

    pub fn is_saving(&self) -> bool {
        self.phase == Phase::Saving
    }

    /// Whether the draft differs from the baseline it was copied from.
    pub fn is_dirty(&self) -> bool {
        match &self.persisted {
            Some(persisted) => self.draft != *persisted,
            None => self.draft != Settings::default(),
        }
    }

    pub fn set_database(&mut self, database: DatabaseType) -> &Settings {
        self.draft.database = self.draft.database.switch_to(database);
        &self.draft
    }

    /// Fails without touching the draft when `metric` is outside the current
    /// database's domain.
    pub fn set_metric(&mut self, metric: Metric) -> Result<&Settings, InvalidMetric> {
        self.draft.database = self.draft.database.with_metric(metric)?;
        Ok(&self.draft)
    }

    /// The API key is kept when switching away from OpenAI.
    pub fn set_llm_provider(&mut self, provider: LlmProvider) -> &Settings {
        self.draft.llm_provider = provider;
        &self.draft
    }

    /// Stores the key verbatim; the `sk-` check is advisory only.
    pub fn set_api_key(&mut self, key: impl Into<String>) -> &Settings {
        self.draft.open_ai_api_key = Some(key.into());
        &self.draft
    }

    pub fn set_text_encoder(&mut self, model: impl Into<String>) -> &Settings {
        self.draft.text_encoder = model.into();
        &self.draft
    }

    /// Drop local edits and go back to the baseline.
    pub fn discard(&mut self) -> &Settings {
        self.draft = self.persisted.clone().unwrap_or_default();
        &self.draft
    }

    pub fn begin_load(&mut self) {
        if !self.is_busy() {
            self.resume_phase = self.phase;
        }
        self.phase = Phase::Loading;
    }

    /// On success the loaded value becomes both baseline and draft. On
    /// failure the store returns to the phase it had before the load.
    pub fn finish_load(&mut self, result: Result<Settings, SyncError>) -> Result<Settings, SyncError> {
        match result {
            Ok(settings) => {
                tracing::info!(
                    database = %settings.database_type(),
                    metric = %settings.metric(),
                    provider = %settings.llm_provider,
                    "Settings loaded"
                );
                self.persisted = Some(settings.clone());
                self.draft = settings.clone();
                self.phase = Phase::Ready;
                self.last_error = None;
                self.synced_at = Some(Utc::now());
                Ok(settings)
            }
            Err(e) => {
                tracing::warn!("Loading settings failed: {e}");
                self.phase = self.resume_phase;
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    pub async fn load(&mut self, api: &dyn SettingsApi) -> Result<Settings, SyncError> {
        self.begin_load();
        let result = api.load().await;
        self.finish_load(result)
    }

    /// Enter `Saving` and return the draft to send.
    pub fn begin_save(&mut self) -> Settings {
        if !self.is_busy() {
            self.resume_phase = self.phase;
        }
        self.phase = Phase::Saving;
        self.draft.clone()
    }

    /// On success `sent` becomes the new baseline. On failure the baseline
    /// and the draft are left alone so the save can be retried.
    pub fn finish_save(&mut self, sent: Settings, result: Result<(), SyncError>) -> Result<(), SyncError> {
        match result {
            Ok(()) => {
                tracing::info!(
                    database = %sent.database_type(),
                    metric = %sent.metric(),
                    provider = %sent.llm_provider,
                    "Settings saved"
                );
                self.persisted = Some(sent);
                self.phase = Phase::Ready;
                self.last_error = None;
                self.synced_at = Some(Utc::now());
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Saving settings failed: {e}");
                self.phase = match self.resume_phase {
                    Phase::Uninitialized => Phase::Uninitialized,
                    _ => Phase::Ready,
                };
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    pub async fn save(&mut self, api: &dyn SettingsApi) -> Result<(), SyncError> {
        let draft = self.begin_save();
        let result = api.save(&draft).await;
        self.finish_save(draft, result)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;
    use crate::settings::{MysqlMetric, PostgresMetric, VectorDatabase};

    /// In-memory remote store with switchable failures.
    struct MockApi {
        remote: Mutex<Option<Settings>>,
        load_error: Option<SyncError>,
        save_error: Option<SyncError>,
        saves: Mutex<Vec<Settings>>,
    }

    impl MockApi {
        fn with_remote(settings: Settings) -> Self {
            Self {
                remote: Mutex::new(Some(settings)),
                load_error: None,
                save_error: None,
                saves: Mutex::new(Vec::new()),
            }
        }

        fn failing_load(err: SyncError) -> Self {
            Self {
                load_error: Some(err),
                ..Self::with_remote(Settings::default())
            }
        }

        fn failing_save(err: SyncError) -> Self {
            Self {
                save_error: Some(err),
                ..Self::with_remote(Settings::default())
            }
        }
    }

    #[async_trait]
    impl SettingsApi for MockApi {
        async fn load(&self) -> Result<Settings, SyncError> {
            if let Some(e) = &self.load_error {
                return Err(e.clone());
            }
            self.remote
                .lock()
                .clone()
                .ok_or_else(|| SyncError::Decode("missing field `settings`".to_string()))
        }

        async fn save(&self, settings: &Settings) -> Result<(), SyncError> {
            self.saves.lock().push(settings.clone());
            if let Some(e) = &self.save_error {
                return Err(e.clone());
            }
            *self.remote.lock() = Some(settings.clone());
            Ok(())
        }
    }

    fn model_x() -> Settings {
        Settings {
            llm_provider: LlmProvider::Ollama,
            text_encoder: "model-x".to_string(),
            database: VectorDatabase::Postgres {
                metric: PostgresMetric::Cosine,
            },
            open_ai_api_key: None,
        }
    }

    #[test]
    fn test_new_store_is_uninitialized_with_default_draft() {
        let store = SettingsStore::new();
        assert_eq!(store.phase(), Phase::Uninitialized);
        assert_eq!(store.settings(), &Settings::default());
        assert!(store.persisted().is_none());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_set_database_from_postgres_l2_to_mysql() {
        let mut store = SettingsStore::with_settings(Settings {
            database: VectorDatabase::Postgres {
                metric: PostgresMetric::L2,
            },
            ..model_x()
        });
        let updated = store.set_database(DatabaseType::Mysql).clone();
        assert_eq!(updated.database_type(), DatabaseType::Mysql);
        // L2 is in the MySQL domain, so it survives the switch.
        assert_eq!(
            updated.database,
            VectorDatabase::Mysql {
                metric: MysqlMetric::L2
            }
        );
    }

    #[test]
    fn test_set_database_never_touches_network_or_phase() {
        let mut store = SettingsStore::with_settings(model_x());
        store.set_database(DatabaseType::Mysql);
        assert_eq!(store.phase(), Phase::Ready);
        assert!(store.is_dirty());
        assert_eq!(store.persisted(), Some(&model_x()));
    }

    #[test]
    fn test_set_metric_within_domain() {
        let mut store = SettingsStore::with_settings(model_x());
        let updated = store.set_metric(Metric::L2).unwrap().clone();
        assert_eq!(updated.metric(), Metric::L2);
        assert_eq!(updated.database_type(), DatabaseType::Postgres);
    }

    #[test]
    fn test_set_metric_accepts_exactly_the_domain() {
        for database in [DatabaseType::Postgres, DatabaseType::Mysql] {
            for metric in [Metric::Cosine, Metric::L2] {
                let mut store = SettingsStore::with_settings(model_x());
                store.set_database(database);
                let before = store.settings().clone();
                let in_domain = database.metrics().contains(&metric);
                let result = store.set_metric(metric).map(|s| s.clone());
                match result {
                    Ok(updated) => {
                        assert!(in_domain);
                        assert_eq!(updated.metric(), metric);
                        assert_eq!(updated.database_type(), database);
                    }
                    Err(err) => {
                        assert!(!in_domain);
                        assert_eq!(err.database, database);
                        assert_eq!(store.settings(), &before);
                    }
                }
            }
        }
    }

    #[test]
    fn test_set_api_key_accepts_anything() {
        let mut store = SettingsStore::new();
        for key in ["", "bad-key", "sk-123", "  spaced  "] {
            let updated = store.set_api_key(key);
            assert_eq!(updated.open_ai_api_key.as_deref(), Some(key));
        }
    }

    #[test]
    fn test_provider_change_keeps_api_key() {
        let mut store = SettingsStore::with_settings(model_x());
        store.set_llm_provider(LlmProvider::OpenAi);
        store.set_api_key("sk-live");
        let updated = store.set_llm_provider(LlmProvider::Domdata);
        assert_eq!(updated.open_ai_api_key.as_deref(), Some("sk-live"));
        assert_eq!(updated.effective_api_key(), None);
    }

    #[test]
    fn test_set_text_encoder() {
        let mut store = SettingsStore::new();
        assert_eq!(store.set_text_encoder("intfloat/e5-small").text_encoder, "intfloat/e5-small");
    }

    #[test]
    fn test_discard_restores_baseline() {
        let mut store = SettingsStore::with_settings(model_x());
        store.set_database(DatabaseType::Mysql);
        store.set_llm_provider(LlmProvider::OpenAi);
        assert!(store.is_dirty());
        assert_eq!(store.discard(), &model_x());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_discard_without_baseline_restores_default() {
        let mut store = SettingsStore::new();
        store.set_text_encoder("other");
        assert_eq!(store.discard(), &Settings::default());
    }

    #[tokio::test]
    async fn test_load_success_sets_baseline_and_draft() {
        let api = MockApi::with_remote(model_x());
        let mut store = SettingsStore::new();
        let loaded = store.load(&api).await.unwrap();
        assert_eq!(loaded, model_x());
        assert_eq!(store.phase(), Phase::Ready);
        assert_eq!(store.persisted(), Some(&model_x()));
        assert_eq!(store.settings(), &model_x());
        assert!(store.synced_at().is_some());
    }

    #[tokio::test]
    async fn test_failed_first_load_returns_to_uninitialized() {
        let api = MockApi::failing_load(SyncError::Network("connection refused".to_string()));
        let mut store = SettingsStore::new();
        let err = store.load(&api).await.unwrap_err();
        assert!(matches!(err, SyncError::Network(_)));
        assert_eq!(store.phase(), Phase::Uninitialized);
        assert_eq!(store.last_error(), Some(&err));
        assert_eq!(store.settings(), &Settings::default());
    }

    #[tokio::test]
    async fn test_decode_failure_keeps_previous_value() {
        let mut store = SettingsStore::with_settings(model_x());
        let api = MockApi::failing_load(SyncError::Decode("missing field `settings`".to_string()));
        let err = store.load(&api).await.unwrap_err();
        assert!(matches!(err, SyncError::Decode(_)));
        assert_eq!(store.phase(), Phase::Ready);
        assert_eq!(store.persisted(), Some(&model_x()));
        assert_eq!(store.settings(), &model_x());
    }

    #[tokio::test]
    async fn test_save_success_promotes_draft() {
        let api = MockApi::with_remote(model_x());
        let mut store = SettingsStore::new();
        store.load(&api).await.unwrap();
        store.set_database(DatabaseType::Mysql);
        store.save(&api).await.unwrap();

        assert_eq!(store.phase(), Phase::Ready);
        assert!(!store.is_dirty());
        assert_eq!(store.persisted().unwrap().database_type(), DatabaseType::Mysql);
        assert_eq!(api.saves.lock().len(), 1);

        // Round trip through the remote store.
        let mut fresh = SettingsStore::new();
        assert_eq!(&fresh.load(&api).await.unwrap(), store.settings());
    }

    #[tokio::test]
    async fn test_end_to_end_edit_then_failed_save() {
        let api = MockApi::failing_save(SyncError::Network(
            "backend /update-settings returned 500 Internal Server Error".to_string(),
        ));
        let mut store = SettingsStore::with_settings(model_x());

        let s = store.set_database(DatabaseType::Mysql).clone();
        assert_eq!(s.database_type(), DatabaseType::Mysql);
        assert_eq!(s.metric(), Metric::Cosine);
        assert_eq!(s.text_encoder, "model-x");

        let s = store.set_llm_provider(LlmProvider::OpenAi).clone();
        assert_eq!(s.llm_provider, LlmProvider::OpenAi);
        assert!(s.open_ai_api_key.is_none());

        let s = store.set_api_key("bad-key").clone();
        assert_eq!(s.open_ai_api_key.as_deref(), Some("bad-key"));
        assert!(s.api_key_warning().is_some());

        let draft = store.settings().clone();
        let err = store.save(&api).await.unwrap_err();
        assert!(matches!(err, SyncError::Network(_)));

        assert_eq!(store.phase(), Phase::Ready);
        assert_eq!(store.settings(), &draft);
        assert_eq!(store.settings().open_ai_api_key.as_deref(), Some("bad-key"));
        assert_eq!(store.persisted(), Some(&model_x()));
        assert!(store.is_dirty());
    }

    #[test]
    fn test_begin_save_marks_saving_and_snapshots() {
        let mut store = SettingsStore::with_settings(model_x());
        store.set_metric(Metric::L2).unwrap();
        let sent = store.begin_save();
        assert!(store.is_saving());
        assert!(store.is_busy());

        // Edits made while the request is in flight stay in the draft.
        store.set_text_encoder("late-edit");
        store.finish_save(sent.clone(), Ok(())).unwrap();
        assert_eq!(store.persisted(), Some(&sent));
        assert_eq!(store.settings().text_encoder, "late-edit");
        assert!(store.is_dirty());
    }

    #[test]
    fn test_begin_load_marks_loading() {
        let mut store = SettingsStore::new();
        store.begin_load();
        assert_eq!(store.phase(), Phase::Loading);
        let _ = store.finish_load(Err(SyncError::Network("timeout".to_string())));
        assert_eq!(store.phase(), Phase::Uninitialized);
    }

    #[test]
    fn test_successful_sync_clears_last_error() {
        let mut store = SettingsStore::new();
        store.begin_load();
        let _ = store.finish_load(Err(SyncError::Network("timeout".to_string())));
        assert!(store.last_error().is_some());
        store.begin_load();
        store.finish_load(Ok(model_x())).unwrap();
        assert!(store.last_error().is_none());
    }
}
