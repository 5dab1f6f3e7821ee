use super::ChatPrompt;
use super::IngestRequest;

/// Requests from the UI to the actions service. Each one settles as exactly
/// one event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// The second field is the conversation generation the prompt belongs to.
    Chat(ChatPrompt, u64),
    HealthCheck(),
    Help(),
    Ingest(IngestRequest),
    KnowledgeClear(),
    KnowledgeCount(),
    StatusCheck(),
}
