#[cfg(test)]
#[path = "zark_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_derive::Deserialize;
use serde_json::Value;

use crate::domain::models::ApiError;
use crate::domain::models::Backend;
use crate::domain::models::BackendResult;
use crate::domain::models::ChatPrompt;
use crate::domain::models::ChatReply;
use crate::domain::models::ClearReceipt;
use crate::domain::models::HealthReport;
use crate::domain::models::HelpDocument;
use crate::domain::models::IngestReceipt;
use crate::domain::models::IngestRequest;
use crate::domain::models::KnowledgeOverview;
use crate::domain::models::ServiceStatus;

#[derive(Default, Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    detail: Option<Value>,
}

/// Text of the `detail` field of an error body. Non-string details are
/// rendered as JSON.
fn detail_text(body: &str) -> Option<String> {
    let res = serde_json::from_str::<ErrorResponse>(body).ok()?;
    match res.detail? {
        Value::Null => return None,
        Value::String(text) => return Some(text),
        other => return Some(other.to_string()),
    }
}

async fn read_json<T: DeserializeOwned>(res: reqwest::Response, fallback: &str) -> BackendResult<T> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        tracing::error!(status = status.as_u16(), body = %body, "Zark API request failed");
        return Err(ApiError::Application(
            detail_text(&body).unwrap_or_else(|| return fallback.to_string()),
        ));
    }

    let body = res.text().await?;
    tracing::debug!(body = %body, "Zark API response");

    return serde_json::from_str::<T>(&body).map_err(|err| {
        return ApiError::Transport(format!("Unexpected response from the Zark API: {err}"));
    });
}

pub struct Zark {
    client: reqwest::Client,
    url: String,
}

impl Zark {
    pub fn new(url: &str) -> Result<Zark> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("zark/", env!("CARGO_PKG_VERSION")))
            .build()?;

        return Ok(Zark {
            client,
            url: url.trim_end_matches('/').to_string(),
        });
    }

    fn endpoint(&self, path: &str) -> String {
        return format!("{url}/api/{path}", url = self.url);
    }
}

#[async_trait]
impl Backend for Zark {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> BackendResult<HealthReport> {
        let res = match self.client.get(self.endpoint("health")).send().await {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(error = ?err, "Zark API is not reachable");
                return Err(err.into());
            }
        };

        return read_json(res, "Health check failed").await;
    }

    #[allow(clippy::implicit_return)]
    async fn status(&self) -> BackendResult<ServiceStatus> {
        let res = self.client.get(self.endpoint("status")).send().await?;
        return read_json(res, "Failed to fetch the service status").await;
    }

    #[allow(clippy::implicit_return)]
    async fn knowledge(&self) -> BackendResult<KnowledgeOverview> {
        let res = self.client.get(self.endpoint("knowledge")).send().await?;
        return read_json(res, "Failed to fetch the knowledge base").await;
    }

    #[allow(clippy::implicit_return)]
    async fn clear_knowledge(&self) -> BackendResult<ClearReceipt> {
        let res = self.client.delete(self.endpoint("knowledge")).send().await?;
        return read_json(res, "Failed to clear the knowledge base").await;
    }

    #[allow(clippy::implicit_return)]
    async fn chat(&self, prompt: ChatPrompt) -> BackendResult<ChatReply> {
        tracing::debug!(
            query = %prompt.query,
            conversation_id = ?prompt.conversation_id,
            show_sources = prompt.show_sources,
            "Chat request"
        );

        let res = self
            .client
            .post(self.endpoint("chat"))
            .json(&prompt)
            .send()
            .await?;

        return read_json(res, "Failed to get a response").await;
    }

    #[allow(clippy::implicit_return)]
    async fn ingest(&self, request: IngestRequest) -> BackendResult<IngestReceipt> {
        tracing::debug!(url = %request.url, depth = request.depth, "Ingest request");

        let res = self
            .client
            .post(self.endpoint("ingest"))
            .json(&request)
            .send()
            .await?;

        return read_json(res, "Failed to ingest URL").await;
    }

    #[allow(clippy::implicit_return)]
    async fn help(&self) -> BackendResult<HelpDocument> {
        let res = self.client.get(self.endpoint("help")).send().await?;
        return read_json(res, "Failed to load the help document").await;
    }
}
