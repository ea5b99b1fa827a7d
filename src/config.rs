use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Console server bind address
    pub bind_addr: String,
    /// RAG backend connection settings
    pub backend: BackendConfig,
    /// Result count used when a search request omits `limit`
    pub search_default_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the RAG backend, without a trailing slash
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:9000".to_string(),
            backend: BackendConfig::default(),
            search_default_limit: 5,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:7998".to_string(),
            timeout_secs: 120,
            connect_timeout_secs: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("RAG_BACKEND_URL") {
            if !url.trim().is_empty() {
                config.backend.base_url = normalize_base_url(&url);
            }
        }
        if let Ok(addr) = std::env::var("RAG_CONSOLE_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(val) = std::env::var("RAG_BACKEND_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.backend.timeout_secs = v;
            }
        }
        if let Ok(val) = std::env::var("RAG_BACKEND_CONNECT_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.backend.connect_timeout_secs = v;
            }
        }
        if let Ok(val) = std::env::var("RAG_SEARCH_DEFAULT_LIMIT") {
            if let Ok(v) = val.parse::<usize>() {
                config.search_default_limit = v.max(1);
            }
        }

        config
    }
}

impl BackendConfig {
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
