use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::error::{InvalidMetric, SyncError};
use crate::settings::{DatabaseType, LlmProvider, Metric, Settings};
use crate::state::AppState;
use crate::store::{Phase, SettingsStore};

/// Settings as shown in the dialog. The API key itself is never echoed back.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub phase: Phase,
    #[serde(flatten)]
    pub settings: Settings,
    pub has_api_key: bool,
    pub api_key_warning: Option<&'static str>,
    /// Metric options for the selected database
    pub metrics: Vec<Metric>,
    pub dirty: bool,
    pub last_error: Option<SyncErrorView>,
    pub synced_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct SyncErrorView {
    pub kind: &'static str,
    pub message: String,
}

impl From<&SyncError> for SyncErrorView {
    fn from(e: &SyncError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

impl SettingsView {
    pub fn from_store(store: &SettingsStore) -> Self {
        let draft = store.settings();
        Self {
            phase: store.phase(),
            settings: draft.redacted(),
            has_api_key: draft.open_ai_api_key.as_deref().is_some_and(|k| !k.is_empty()),
            api_key_warning: draft.api_key_warning(),
            metrics: draft.database_type().metrics(),
            dirty: store.is_dirty(),
            last_error: store.last_error().map(SyncErrorView::from),
            synced_at: store.synced_at(),
        }
    }
}

/// One field edit from the dialog: `{ "field": "database", "value": "mysql" }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum SettingsEdit {
    Database(DatabaseType),
    Metric(Metric),
    LlmProvider(LlmProvider),
    OpenAiApiKey(String),
    TextEncoder(String),
}

impl SettingsEdit {
    pub fn apply(self, store: &mut SettingsStore) -> Result<(), InvalidMetric> {
        match self {
            SettingsEdit::Database(db) => {
                store.set_database(db);
            }
            SettingsEdit::Metric(metric) => {
                store.set_metric(metric)?;
            }
            SettingsEdit::LlmProvider(provider) => {
                store.set_llm_provider(provider);
            }
            SettingsEdit::OpenAiApiKey(key) => {
                store.set_api_key(key);
            }
            SettingsEdit::TextEncoder(model) => {
                store.set_text_encoder(model);
            }
        }
        Ok(())
    }
}

/// Load settings from the backend into the shared store.
///
/// Refused while another load or save is in flight.
pub async fn run_load(state: &AppState) -> Result<Settings, ApiError> {
    {
        let mut store = state.store.write();
        if store.is_busy() {
            return Err(ApiError::Busy("settings are already syncing".to_string()));
        }
        store.begin_load();
    }

    let result = state.settings_api.load().await;
    let loaded = state.store.write().finish_load(result)?;
    Ok(loaded)
}

/// GET /api/settings - Current draft with sync status
pub async fn get_settings(State(state): State<AppState>) -> Json<SettingsView> {
    let store = state.store.read();
    Json(SettingsView::from_store(&store))
}

/// PATCH /api/settings - Apply one field edit to the draft (no backend call)
pub async fn edit_settings(
    State(state): State<AppState>,
    Json(edit): Json<SettingsEdit>,
) -> Result<Json<SettingsView>, ApiError> {
    let mut store = state.store.write();
    edit.apply(&mut store)?;
    Ok(Json(SettingsView::from_store(&store)))
}

/// POST /api/settings/save - Replace the backend's settings with the draft
pub async fn save_settings(State(state): State<AppState>) -> Result<Json<SettingsView>, ApiError> {
    let draft = {
        let mut store = state.store.write();
        if store.is_busy() {
            return Err(ApiError::Busy("a save is already in progress".to_string()));
        }
        store.begin_save()
    };

    if let Some(warning) = draft.api_key_warning() {
        tracing::warn!("Saving settings with suspicious API key: {warning}");
    }

    let result = state.settings_api.save(&draft).await;

    let mut store = state.store.write();
    store.finish_save(draft, result)?;
    Ok(Json(SettingsView::from_store(&store)))
}

/// POST /api/settings/reload - Re-read settings from the backend
pub async fn reload_settings(State(state): State<AppState>) -> Result<Json<SettingsView>, ApiError> {
    run_load(&state).await?;
    let store = state.store.read();
    Ok(Json(SettingsView::from_store(&store)))
}

/// POST /api/settings/discard - Throw away unsaved edits
pub async fn discard_settings(State(state): State<AppState>) -> Json<SettingsView> {
    let mut store = state.store.write();
    store.discard();
    Json(SettingsView::from_store(&store))
}
