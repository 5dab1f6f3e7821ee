#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use std::future::Future;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::domain::models::Action;
use crate::domain::models::ApiError;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendResult;
use crate::domain::models::ChatOutcome;
use crate::domain::models::Event;

/// Runs the request on its own task so a panic inside the backend still
/// resolves to a failed result.
async fn settled<T, F>(request: F) -> BackendResult<T>
where
    T: Send + 'static,
    F: Future<Output = BackendResult<T>> + Send + 'static,
{
    match tokio::spawn(request).await {
        Ok(res) => return res,
        Err(err) => {
            tracing::error!(error = ?err, "Request task did not complete");
            return Err(ApiError::Transport(format!(
                "The request did not complete: {err}"
            )));
        }
    }
}

async fn resolve(backend: BackendBox, action: Action) -> Event {
    match action {
        Action::Chat(prompt, generation) => {
            let show_sources = prompt.show_sources;
            let result = settled(async move {
                return backend.chat(prompt).await;
            })
            .await;

            return Event::ChatSettled(ChatOutcome {
                generation,
                show_sources,
                result,
            });
        }
        Action::HealthCheck() => {
            let result = settled(async move {
                return backend.health_check().await;
            })
            .await;

            return Event::HealthSettled(result);
        }
        Action::Help() => {
            let result = settled(async move {
                return backend.help().await;
            })
            .await;

            return Event::HelpSettled(result);
        }
        Action::Ingest(request) => {
            let url = request.url.to_string();
            let result = settled(async move {
                return backend.ingest(request).await;
            })
            .await;

            return Event::IngestSettled(url, result);
        }
        Action::KnowledgeClear() => {
            let result = settled(async move {
                return backend.clear_knowledge().await;
            })
            .await;

            return Event::KnowledgeClearSettled(result);
        }
        Action::KnowledgeCount() => {
            let result = settled(async move {
                return backend.knowledge().await;
            })
            .await;

            return Event::KnowledgeCountSettled(result);
        }
        Action::StatusCheck() => {
            let result = settled(async move {
                return backend.status().await;
            })
            .await;

            return Event::StatusSettled(result);
        }
    }
}

pub struct ActionsService {}

impl ActionsService {
    /// Resolves every action on its own task and reports back exactly one
    /// settled event per action. Returns once the action channel closes.
    pub async fn start(
        backend: BackendBox,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        while let Some(action) = rx.recv().await {
            tracing::debug!(action = ?action, "Dispatching action");

            let worker_backend = backend.clone();
            let worker_tx = tx.clone();
            tokio::spawn(async move {
                let event = resolve(worker_backend, action).await;
                if worker_tx.send(event).is_err() {
                    tracing::debug!("Event channel closed before a request settled");
                }
            });
        }

        return Ok(());
    }
}
