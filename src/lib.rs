//! # rag-console
//!
//! Console for a retrieval-augmented generation backend. It serves a single
//! forms page (document upload, search, crawl, prompt, settings) and forwards
//! each form to the backend over HTTP. Embedding, vector storage, crawling
//! and LLM calls all happen in the backend.
//!
//! ## Settings flow
//!
//! ```text
//!   forms page ──PATCH /api/settings──▶ SettingsStore (draft, local only)
//!        │                                   │
//!        ├──POST /api/settings/save─────────▶├──POST /update-settings──▶ backend
//!        └──POST /api/settings/reload───────▶└──GET  /load-settings───▶ backend
//! ```
//!
//! The store owns one draft and one persisted baseline. Database and metric
//! form a sum type so a metric can only ever be paired with a database whose
//! domain contains it.
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for the console and backend URL
//! - [`settings`] - Settings model, metric domains, wire shape, API-key advisory
//! - [`store`] - `SettingsStore`: draft/baseline state machine and sync with the backend
//! - [`backend`] - reqwest client for the backend: settings load/save and document endpoints
//! - [`models`] - Request/response types for the document endpoints
//! - [`api`] - Axum handlers for the forms page
//! - [`state`] - Shared application state holding the single store
//! - [`error`] - Sync and validation error types

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod settings;
pub mod state;
pub mod store;
