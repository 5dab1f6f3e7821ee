#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use std::sync::Arc;

use async_trait::async_trait;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::ApiError;
use super::HelpDocument;

pub type BackendResult<T> = std::result::Result<T, ApiError>;
pub type BackendBox = Arc<dyn Backend + Send + Sync>;

/// Crawl depth sent with every ingestion.
pub const INGEST_DEPTH: u32 = 2;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPrompt {
    pub query: String,
    pub conversation_id: Option<String>,
    pub show_sources: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub sources: Vec<String>,
    pub conversation_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestRequest {
    pub url: String,
    pub depth: u32,
}

impl IngestRequest {
    pub fn new(url: &str) -> IngestRequest {
        return IngestRequest {
            url: url.to_string(),
            depth: INGEST_DEPTH,
        };
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReceipt {
    pub message: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub total_entries: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearReceipt {
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub mongodb: Option<String>,
    #[serde(default)]
    pub groq: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl HealthReport {
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("status: {}", self.status)];
        if let Some(db) = &self.mongodb {
            parts.push(format!("database: {db}"));
        }
        if let Some(engine) = &self.groq {
            parts.push(format!("ai engine: {engine}"));
        }
        if let Some(message) = &self.message {
            parts.push(format!("message: {message}"));
        }

        return parts.join(", ");
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ingested_at: Option<String>,
}

impl KnowledgeEntry {
    pub fn format(&self) -> String {
        let mut res = format!("- {} <{}>", self.title, self.url);
        if let Some(ingested_at) = &self.ingested_at {
            res = format!("{res}, ingested {ingested_at}");
        }
        if !self.tags.is_empty() {
            res = format!("{res}, tags: {}", self.tags.join(", "));
        }

        return res;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeOverview {
    pub total: u64,
    #[serde(default)]
    pub knowledge: Vec<KnowledgeEntry>,
    #[serde(default)]
    pub recent_count: Option<u64>,
}

#[async_trait]
pub trait Backend {
    /// Liveness of the service and its storage and AI engine.
    async fn health_check(&self) -> BackendResult<HealthReport>;

    /// Operating mode of the service, for example `limited` when no AI engine
    /// is configured.
    async fn status(&self) -> BackendResult<ServiceStatus>;

    /// Total entry count plus the most recently ingested entries.
    async fn knowledge(&self) -> BackendResult<KnowledgeOverview>;

    async fn clear_knowledge(&self) -> BackendResult<ClearReceipt>;

    /// Sends a single chat turn. A missing conversation id asks the service
    /// to open a new conversation, whose id is returned in the reply.
    async fn chat(&self, prompt: ChatPrompt) -> BackendResult<ChatReply>;

    async fn ingest(&self, request: IngestRequest) -> BackendResult<IngestReceipt>;

    async fn help(&self) -> BackendResult<HelpDocument>;
}
