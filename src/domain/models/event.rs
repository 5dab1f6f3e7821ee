use tui_textarea::Input;

use super::BackendResult;
use super::ChatReply;
use super::ClearReceipt;
use super::HealthReport;
use super::HelpDocument;
use super::IngestReceipt;
use super::KnowledgeOverview;
use super::ServiceStatus;

pub struct ChatOutcome {
    pub generation: u64,
    pub show_sources: bool,
    pub result: BackendResult<ChatReply>,
}

pub enum Event {
    ChatSettled(ChatOutcome),
    HealthSettled(BackendResult<HealthReport>),
    HelpSettled(BackendResult<HelpDocument>),
    IngestSettled(String, BackendResult<IngestReceipt>),
    KnowledgeClearSettled(BackendResult<ClearReceipt>),
    KnowledgeCountSettled(BackendResult<KnowledgeOverview>),
    StatusSettled(BackendResult<ServiceStatus>),
    KeyboardCharInput(Input),
    KeyboardCTRLC(),
    KeyboardEnter(),
    KeyboardEsc(),
    KeyboardF1(),
    KeyboardPaste(String),
    MouseClick(u16, u16),
    UIResize(),
    UIScrollDown(),
    UIScrollUp(),
    UIScrollPageDown(),
    UIScrollPageUp(),
    UITick(),
}
