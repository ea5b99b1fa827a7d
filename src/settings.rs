//! Backend settings model.
//!
//! The wire shape is flat (`{ llmProvider, textEncoder, database, metric,
//! openAiApiKey? }`) but in memory the `database`/`metric` pair is a sum type:
//! each database carries its own metric type, so a metric can never be
//! paired with a database whose domain does not contain it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InvalidMetric;

pub const DEFAULT_TEXT_ENCODER: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Prefix OpenAI API keys usually carry. Checked only as an advisory.
pub const OPENAI_KEY_PREFIX: &str = "sk-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Ollama,
    OpenAi,
    Domdata,
}

impl LlmProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            LlmProvider::Ollama => "ollama",
            LlmProvider::OpenAi => "openai",
            LlmProvider::Domdata => "domdata",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    Postgres,
    Mysql,
}

impl DatabaseType {
    pub fn as_str(self) -> &'static str {
        match self {
            DatabaseType::Postgres => "postgres",
            DatabaseType::Mysql => "mysql",
        }
    }

    /// Metric labels valid for this database.
    pub fn metrics(self) -> Vec<Metric> {
        match self {
            DatabaseType::Postgres => PostgresMetric::DOMAIN.iter().map(|m| m.metric()).collect(),
            DatabaseType::Mysql => MysqlMetric::DOMAIN.iter().map(|m| m.metric()).collect(),
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric label as the user picks it, before it is checked against a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Cosine,
    L2,
}

impl Metric {
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Cosine => "cosine",
            Metric::L2 => "l2",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of metrics one database supports.
pub trait MetricDomain: Copy + Sized + 'static {
    const DOMAIN: &'static [Self];
    const DEFAULT: Self;

    fn metric(self) -> Metric;

    fn from_metric(metric: Metric) -> Option<Self> {
        Self::DOMAIN.iter().copied().find(|m| m.metric() == metric)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostgresMetric {
    Cosine,
    L2,
}

impl MetricDomain for PostgresMetric {
    const DOMAIN: &'static [Self] = &[PostgresMetric::Cosine, PostgresMetric::L2];
    const DEFAULT: Self = PostgresMetric::Cosine;

    fn metric(self) -> Metric {
        match self {
            PostgresMetric::Cosine => Metric::Cosine,
            PostgresMetric::L2 => Metric::L2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MysqlMetric {
    Cosine,
    L2,
}

impl MetricDomain for MysqlMetric {
    const DOMAIN: &'static [Self] = &[MysqlMetric::Cosine, MysqlMetric::L2];
    const DEFAULT: Self = MysqlMetric::Cosine;

    fn metric(self) -> Metric {
        match self {
            MysqlMetric::Cosine => Metric::Cosine,
            MysqlMetric::L2 => Metric::L2,
        }
    }
}

/// Database choice together with a metric from that database's domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "database", rename_all = "lowercase")]
pub enum VectorDatabase {
    Postgres { metric: PostgresMetric },
    Mysql { metric: MysqlMetric },
}

impl VectorDatabase {
    /// The database with its domain's default metric.
    pub fn with_default_metric(database: DatabaseType) -> Self {
        match database {
            DatabaseType::Postgres => VectorDatabase::Postgres {
                metric: PostgresMetric::DEFAULT,
            },
            DatabaseType::Mysql => VectorDatabase::Mysql {
                metric: MysqlMetric::DEFAULT,
            },
        }
    }

    pub fn database(&self) -> DatabaseType {
        match self {
            VectorDatabase::Postgres { .. } => DatabaseType::Postgres,
            VectorDatabase::Mysql { .. } => DatabaseType::Mysql,
        }
    }

    pub fn metric(&self) -> Metric {
        match self {
            VectorDatabase::Postgres { metric } => metric.metric(),
            VectorDatabase::Mysql { metric } => metric.metric(),
        }
    }

    /// Move to `database`, keeping the current metric when the new domain has
    /// it and falling back to the new domain's default otherwise.
    pub fn switch_to(&self, database: DatabaseType) -> Self {
        let current = self.metric();
        match database {
            DatabaseType::Postgres => VectorDatabase::Postgres {
                metric: PostgresMetric::from_metric(current).unwrap_or(PostgresMetric::DEFAULT),
            },
            DatabaseType::Mysql => VectorDatabase::Mysql {
                metric: MysqlMetric::from_metric(current).unwrap_or(MysqlMetric::DEFAULT),
            },
        }
    }

    pub fn with_metric(&self, metric: Metric) -> Result<Self, InvalidMetric> {
        let invalid = InvalidMetric {
            metric,
            database: self.database(),
        };
        match self {
            VectorDatabase::Postgres { .. } => PostgresMetric::from_metric(metric)
                .map(|metric| VectorDatabase::Postgres { metric })
                .ok_or(invalid),
            VectorDatabase::Mysql { .. } => MysqlMetric::from_metric(metric)
                .map(|metric| VectorDatabase::Mysql { metric })
                .ok_or(invalid),
        }
    }
}

/// The backend configuration, replaced wholesale on every save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub llm_provider: LlmProvider,
    #[serde(default = "default_text_encoder")]
    pub text_encoder: String,
    #[serde(flatten)]
    pub database: VectorDatabase,
    /// Only meaningful while `llm_provider` is OpenAI; kept otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_ai_api_key: Option<String>,
}

fn default_text_encoder() -> String {
    DEFAULT_TEXT_ENCODER.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm_provider: LlmProvider::Ollama,
            text_encoder: default_text_encoder(),
            database: VectorDatabase::with_default_metric(DatabaseType::Postgres),
            open_ai_api_key: None,
        }
    }
}

impl Settings {
    pub fn database_type(&self) -> DatabaseType {
        self.database.database()
    }

    pub fn metric(&self) -> Metric {
        self.database.metric()
    }

    /// The API key, but only while the provider is OpenAI.
    pub fn effective_api_key(&self) -> Option<&str> {
        match self.llm_provider {
            LlmProvider::OpenAi => self.open_ai_api_key.as_deref(),
            _ => None,
        }
    }

    /// Advisory message when the OpenAI key does not look like one.
    /// Never blocks a save.
    pub fn api_key_warning(&self) -> Option<&'static str> {
        match self.effective_api_key() {
            Some(key) if !key.is_empty() && !key.starts_with(OPENAI_KEY_PREFIX) => {
                Some("OpenAI API keys typically start with \"sk-\"")
            }
            _ => None,
        }
    }

    /// Copy with the API key removed, for display.
    pub fn redacted(&self) -> Settings {
        Settings {
            open_ai_api_key: None,
            ..self.clone()
        }
    }
}
