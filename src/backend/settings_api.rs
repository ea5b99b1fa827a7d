//! Settings load/save against the backend's `/load-settings` and
//! `/update-settings` endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::client::BackendClient;
use crate::error::SyncError;
use crate::settings::Settings;

/// Remote store holding the persisted settings. The record is always
/// replaced wholesale.
#[async_trait]
pub trait SettingsApi: Send + Sync {
    async fn load(&self) -> Result<Settings, SyncError>;
    async fn save(&self, settings: &Settings) -> Result<(), SyncError>;
}

#[derive(Deserialize)]
struct LoadSettingsResponse {
    settings: Settings,
}

#[derive(Serialize)]
struct UpdateSettingsRequest<'a> {
    settings: &'a Settings,
}

/// Decode a `/load-settings` body. A missing `settings` key or a malformed
/// value is a decode failure.
pub fn decode_load_body(body: &[u8]) -> Result<Settings, SyncError> {
    serde_json::from_slice::<LoadSettingsResponse>(body)
        .map(|resp| resp.settings)
        .map_err(|e| SyncError::Decode(format!("invalid /load-settings body: {e}")))
}

async fn check_status(resp: reqwest::Response, path: &str) -> Result<reqwest::Response, SyncError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Err(SyncError::Network(format!("backend {path} returned {status}: {body}")))
}

#[async_trait]
impl SettingsApi for BackendClient {
    async fn load(&self) -> Result<Settings, SyncError> {
        let resp = self
            .http()
            .get(self.endpoint("/load-settings"))
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("failed to reach backend: {e}")))?;

        let resp = check_status(resp, "/load-settings").await?;

        let body = resp
            .bytes()
            .await
            .map_err(|e| SyncError::Network(format!("failed to read /load-settings body: {e}")))?;

        decode_load_body(&body)
    }

    async fn save(&self, settings: &Settings) -> Result<(), SyncError> {
        let req = UpdateSettingsRequest { settings };

        let resp = self
            .http()
            .post(self.endpoint("/update-settings"))
            .json(&req)
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("failed to reach backend: {e}")))?;

        check_status(resp, "/update-settings").await?;
        Ok(())
    }
}
