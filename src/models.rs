use serde::{Deserialize, Serialize};

/// Document ingestion request (console and backend share the shape)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddDocumentsRequest {
    pub contents: Vec<String>,
}

/// Crawl request (console and backend share the shape)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlRequest {
    pub link: String,
}

/// Generic `{ "status": ... }` acknowledgement returned by `/add` and `/crawl`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: String,
    /// Database the documents were written to (`/add` only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Search request as posted by the console page
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Falls back to the configured default
    pub limit: Option<usize>,
}

/// A single search hit. Which score field is set depends on the metric the
/// backend searched with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l2_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_product_score: Option<f64>,
}

impl SearchResult {
    /// The score the backend reported, with its label.
    pub fn score(&self) -> Option<(&'static str, f64)> {
        self.similarity_percent
            .map(|s| ("similarity_percent", s))
            .or(self.l2_distance.map(|s| ("l2_distance", s)))
            .or(self.inner_product_score.map(|s| ("inner_product_score", s)))
    }
}

/// Search response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_results: Option<usize>,
}

/// Prompt request as posted by the console page. Provider and API key come
/// from the persisted settings, not from the page.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
    #[serde(default)]
    pub model: Option<String>,
}

/// A retrieved document the answer was grounded on
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_percent: Option<f64>,
}

/// Prompt response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptResponse {
    pub answer: String,
    #[serde(default)]
    pub docs: Vec<Document>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_picks_cosine_score() {
        let hit: SearchResult = serde_json::from_str(
            r#"{"id": 1, "title": "Document 1", "content": "abc", "similarity_percent": 87.5}"#,
        )
        .unwrap();
        assert_eq!(hit.score(), Some(("similarity_percent", 87.5)));
    }

    #[test]
    fn test_search_result_picks_l2_score() {
        let hit: SearchResult =
            serde_json::from_str(r#"{"id": 2, "title": null, "content": "abc", "l2_distance": 0.4}"#)
                .unwrap();
        assert_eq!(hit.score(), Some(("l2_distance", 0.4)));
        assert!(hit.title.is_none());
    }

    #[test]
    fn test_search_response_tolerates_missing_totals() {
        let resp: SearchResponse = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert!(resp.results.is_empty());
        assert!(resp.metric_used.is_none());
    }

    #[test]
    fn test_prompt_response_docs_default_empty() {
        let resp: PromptResponse = serde_json::from_str(r#"{"answer": "42"}"#).unwrap();
        assert_eq!(resp.answer, "42");
        assert!(resp.docs.is_empty());
    }

    #[test]
    fn test_status_response_with_database() {
        let resp: StatusResponse =
            serde_json::from_str(r#"{"status": "success", "database": "postgres"}"#).unwrap();
        assert_eq!(resp.status, "success");
        assert_eq!(resp.database.as_deref(), Some("postgres"));
    }
}
