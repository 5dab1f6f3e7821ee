use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use super::ActionsService;
use crate::domain::models::Action;
use crate::domain::models::ApiError;
use crate::domain::models::Backend;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendResult;
use crate::domain::models::ChatPrompt;
use crate::domain::models::ChatReply;
use crate::domain::models::ClearReceipt;
use crate::domain::models::Event;
use crate::domain::models::HealthReport;
use crate::domain::models::HelpDocument;
use crate::domain::models::IngestReceipt;
use crate::domain::models::IngestRequest;
use crate::domain::models::KnowledgeOverview;
use crate::domain::models::ServiceStatus;

struct FakeBackend {}

#[async_trait]
impl Backend for FakeBackend {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> BackendResult<HealthReport> {
        return Err(ApiError::Transport("connection refused".to_string()));
    }

    #[allow(clippy::implicit_return)]
    async fn status(&self) -> BackendResult<ServiceStatus> {
        return Ok(ServiceStatus {
            status: "limited".to_string(),
            message: None,
        });
    }

    #[allow(clippy::implicit_return)]
    async fn knowledge(&self) -> BackendResult<KnowledgeOverview> {
        return Ok(KnowledgeOverview {
            total: 3,
            ..KnowledgeOverview::default()
        });
    }

    #[allow(clippy::implicit_return)]
    async fn clear_knowledge(&self) -> BackendResult<ClearReceipt> {
        return Ok(ClearReceipt {
            message: "Cleared 3 knowledge entries".to_string(),
        });
    }

    #[allow(clippy::implicit_return)]
    async fn chat(&self, prompt: ChatPrompt) -> BackendResult<ChatReply> {
        return Ok(ChatReply {
            response: format!("You said: {}", prompt.query),
            sources: vec![],
            conversation_id: "conv-1".to_string(),
        });
    }

    #[allow(clippy::implicit_return)]
    async fn ingest(&self, request: IngestRequest) -> BackendResult<IngestReceipt> {
        if request.url.contains("panic") {
            panic!("ingest blew up");
        }

        return Ok(IngestReceipt {
            message: format!("Ingested {}", request.url),
            ..IngestReceipt::default()
        });
    }

    #[allow(clippy::implicit_return)]
    async fn help(&self) -> BackendResult<HelpDocument> {
        return Ok(HelpDocument::default());
    }
}

fn start() -> (
    mpsc::UnboundedSender<Action>,
    mpsc::UnboundedReceiver<Event>,
    tokio::task::JoinHandle<Result<()>>,
) {
    let backend: BackendBox = Arc::new(FakeBackend {});
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    let handle = tokio::spawn(async move {
        return ActionsService::start(backend, event_tx, &mut action_rx).await;
    });

    return (action_tx, event_rx, handle);
}

#[tokio::test]
async fn it_settles_chat() -> Result<()> {
    let (tx, mut rx, _handle) = start();
    tx.send(Action::Chat(
        ChatPrompt {
            query: "Hello".to_string(),
            conversation_id: None,
            show_sources: true,
        },
        4,
    ))?;

    match rx.recv().await {
        Some(Event::ChatSettled(outcome)) => {
            assert!(outcome.show_sources);
            assert_eq!(outcome.generation, 4);
            assert_eq!(outcome.result?.response, "You said: Hello");
        }
        _ => bail!("Wrong event"),
    }

    return Ok(());
}

#[tokio::test]
async fn it_settles_failures() -> Result<()> {
    let (tx, mut rx, _handle) = start();
    tx.send(Action::HealthCheck())?;

    match rx.recv().await {
        Some(Event::HealthSettled(result)) => {
            assert_eq!(
                result,
                Err(ApiError::Transport("connection refused".to_string()))
            );
        }
        _ => bail!("Wrong event"),
    }

    return Ok(());
}

#[tokio::test]
async fn it_settles_panicking_requests() -> Result<()> {
    let (tx, mut rx, _handle) = start();
    tx.send(Action::Ingest(IngestRequest::new("https://panic.example.com")))?;

    match rx.recv().await {
        Some(Event::IngestSettled(url, result)) => {
            assert_eq!(url, "https://panic.example.com");
            assert!(matches!(result, Err(ApiError::Transport(_))));
        }
        _ => bail!("Wrong event"),
    }

    return Ok(());
}

#[tokio::test]
async fn it_settles_every_action_once() -> Result<()> {
    let (tx, mut rx, _handle) = start();
    tx.send(Action::KnowledgeCount())?;
    tx.send(Action::StatusCheck())?;
    tx.send(Action::KnowledgeClear())?;
    tx.send(Action::Help())?;

    let mut count = 0;
    let mut status = 0;
    let mut clear = 0;
    let mut help = 0;
    for _ in 0..4 {
        match rx.recv().await {
            Some(Event::KnowledgeCountSettled(result)) => {
                assert_eq!(result?.total, 3);
                count += 1;
            }
            Some(Event::StatusSettled(result)) => {
                assert_eq!(result?.status, "limited");
                status += 1;
            }
            Some(Event::KnowledgeClearSettled(result)) => {
                assert_eq!(result?.message, "Cleared 3 knowledge entries");
                clear += 1;
            }
            Some(Event::HelpSettled(result)) => {
                assert!(result.is_ok());
                help += 1;
            }
            _ => bail!("Wrong event"),
        }
    }

    assert_eq!((count, status, clear, help), (1, 1, 1, 1));

    return Ok(());
}

#[tokio::test]
async fn it_stops_when_actions_close() -> Result<()> {
    let (tx, _rx, handle) = start();
    drop(tx);

    handle.await??;

    return Ok(());
}
