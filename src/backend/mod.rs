pub mod client;
pub mod settings_api;

pub use client::BackendClient;
pub use settings_api::SettingsApi;
