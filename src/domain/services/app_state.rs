#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use std::collections::VecDeque;

use ratatui::prelude::Rect;
use tokio::sync::mpsc;
use tui_textarea::Input;

use super::wants_sources;
use super::BubbleList;
use super::Scroll;
use crate::domain::models::Action;
use crate::domain::models::ApiError;
use crate::domain::models::BackendResult;
use crate::domain::models::ChatOutcome;
use crate::domain::models::ChatPrompt;
use crate::domain::models::ClearReceipt;
use crate::domain::models::HealthReport;
use crate::domain::models::HealthStatus;
use crate::domain::models::HelpDocument;
use crate::domain::models::HelpView;
use crate::domain::models::IngestReceipt;
use crate::domain::models::IngestRequest;
use crate::domain::models::KnowledgeOverview;
use crate::domain::models::KnowledgeSummary;
use crate::domain::models::Message;
use crate::domain::models::Notice;
use crate::domain::models::ServiceStatus;
use crate::domain::models::SlashCommand;
use crate::domain::models::TextArea;

const WELCOME: &str = "Hey there! I'm Zark. Ask me anything about what I've learned so far, or teach me something new with `/ingest URL`. Type `/help` to see everything I can do.";

fn worker_gone() -> ApiError {
    return ApiError::Transport("The request worker is no longer running.".to_string());
}

pub struct AppState<'a> {
    pub bubble_list: BubbleList<'a>,
    pub conversation_id: Option<String>,
    /// Bumped on every clear so replies from a discarded session can't revive it.
    pub conversation_generation: u64,
    pub help: Option<HelpView>,
    pub help_pending: bool,
    /// Where the help overlay was last drawn, used to hit-test clicks.
    pub help_rect: Option<Rect>,
    pub help_scroll: u16,
    pub ingests_in_flight: usize,
    pub is_sending: bool,
    pub knowledge: KnowledgeSummary,
    pub last_known_height: u16,
    pub last_known_width: u16,
    pub messages: Vec<Message>,
    pub notices: VecDeque<Notice>,
    pub scroll: Scroll,
    pub textarea: tui_textarea::TextArea<'a>,
}

impl<'a> AppState<'a> {
    pub fn new() -> AppState<'a> {
        let mut app_state = AppState {
            bubble_list: BubbleList::default(),
            conversation_id: None,
            conversation_generation: 0,
            help: None,
            help_pending: false,
            help_rect: None,
            help_scroll: 0,
            ingests_in_flight: 0,
            is_sending: false,
            knowledge: KnowledgeSummary::default(),
            last_known_height: 0,
            last_known_width: 0,
            messages: vec![],
            notices: VecDeque::new(),
            scroll: Scroll::default(),
            textarea: TextArea::default(),
        };

        app_state.add_message(Message::bot(WELCOME, vec![]));
        return app_state;
    }

    /// Fires the three status probes. None of them depend on each other.
    pub fn startup(&mut self, tx: &mpsc::UnboundedSender<Action>) {
        self.refresh_health(tx);
        self.refresh_knowledge_count(tx);
        self.refresh_detailed_status(tx);
    }

    /// Handles whatever is typed in the input box. Returns true when the user
    /// asked to quit.
    pub fn submit_input(&mut self, tx: &mpsc::UnboundedSender<Action>) -> bool {
        let text = self.textarea.lines().join("\n");
        if text.trim().is_empty() {
            return false;
        }

        if let Some(command) = SlashCommand::parse(&text) {
            if command.is_quit() {
                return true;
            }

            self.textarea = TextArea::default();
            if command.is_help() {
                self.toggle_help(tx);
            } else if command.is_ingest() {
                let url = command.argument();
                if url.is_empty() {
                    self.notices
                        .push_back(Notice::error("Usage: /ingest URL"));
                } else if self.is_ingesting() {
                    self.notices.push_back(Notice::error(
                        "An ingestion is already running. Wait for it to finish before starting another.",
                    ));
                } else {
                    self.ingest_url(&url, tx);
                }
            } else if command.is_clear_conversation() {
                self.clear_conversation();
            } else if command.is_knowledge_count() {
                self.refresh_knowledge_count(tx);
            } else if command.is_status() {
                self.refresh_health(tx);
                self.refresh_detailed_status(tx);
            } else if command.is_forget() {
                if command.is_confirmed() {
                    self.clear_knowledge(tx);
                } else {
                    self.notices.push_back(Notice::error(
                        "This deletes every entry in the knowledge base. Type `/forget confirm` to go ahead.",
                    ));
                }
            }

            return false;
        }

        if self.is_sending {
            self.notices.push_back(Notice::error(
                "Zark is still answering your last message.",
            ));
            return false;
        }

        self.send_message(&text, tx);
        return false;
    }

    pub fn send_message(&mut self, text: &str, tx: &mpsc::UnboundedSender<Action>) {
        let query = text.trim();
        if query.is_empty() {
            return;
        }

        self.add_message(Message::user(query));
        self.textarea = TextArea::default();
        self.is_sending = true;

        let show_sources = wants_sources(query);
        let prompt = ChatPrompt {
            query: query.to_string(),
            conversation_id: self.conversation_id.clone(),
            show_sources,
        };

        let generation = self.conversation_generation;
        if tx.send(Action::Chat(prompt, generation)).is_err() {
            self.handle_chat_settled(ChatOutcome {
                generation,
                show_sources,
                result: Err(worker_gone()),
            });
        }
    }

    pub fn handle_chat_settled(&mut self, outcome: ChatOutcome) {
        self.is_sending = false;

        match outcome.result {
            Ok(reply) => {
                let mut sources = vec![];
                if outcome.show_sources {
                    sources = reply.sources;
                }

                if outcome.generation == self.conversation_generation {
                    self.conversation_id = Some(reply.conversation_id);
                }
                self.add_message(Message::bot(&reply.response, sources));
            }
            Err(err) => {
                tracing::warn!(error = %err, "Chat request failed");
                self.add_message(Message::error(&format!(
                    "Sorry, I couldn't get an answer from Zark: {err}"
                )));
            }
        }
    }

    pub fn is_ingesting(&self) -> bool {
        return self.ingests_in_flight > 0;
    }

    pub fn ingest_url(&mut self, url: &str, tx: &mpsc::UnboundedSender<Action>) {
        let url = url.trim();
        if url.is_empty() {
            return;
        }

        self.ingests_in_flight += 1;
        if tx.send(Action::Ingest(IngestRequest::new(url))).is_err() {
            self.handle_ingest_settled(url, Err(worker_gone()), tx);
        }
    }

    pub fn handle_ingest_settled(
        &mut self,
        url: &str,
        result: BackendResult<IngestReceipt>,
        tx: &mpsc::UnboundedSender<Action>,
    ) {
        self.ingests_in_flight = self.ingests_in_flight.saturating_sub(1);

        match result {
            Ok(receipt) => {
                let mut text = receipt.message;
                if text.is_empty() {
                    text = format!("Ingested {url}.");
                }
                self.notices.push_back(Notice::info(&text));
                self.refresh_knowledge_count(tx);
            }
            Err(err) => {
                tracing::warn!(url = url, error = %err, "Ingestion failed");
                self.notices
                    .push_back(Notice::error(&format!("Failed to ingest {url}: {err}")));
            }
        }
    }

    /// Starts a new conversation locally. The service is not told.
    pub fn clear_conversation(&mut self) {
        self.messages.clear();
        self.conversation_id = None;
        self.conversation_generation += 1;
        self.textarea = TextArea::default();
        self.scroll = Scroll::default();
        self.sync_dependants();
    }

    pub fn clear_knowledge(&mut self, tx: &mpsc::UnboundedSender<Action>) {
        if tx.send(Action::KnowledgeClear()).is_err() {
            self.handle_knowledge_clear_settled(Err(worker_gone()), tx);
        }
    }

    pub fn handle_knowledge_clear_settled(
        &mut self,
        result: BackendResult<ClearReceipt>,
        tx: &mpsc::UnboundedSender<Action>,
    ) {
        match result {
            Ok(receipt) => {
                self.notices.push_back(Notice::info(&receipt.message));
                self.refresh_knowledge_count(tx);
            }
            Err(err) => {
                self.notices.push_back(Notice::error(&format!(
                    "Failed to clear the knowledge base: {err}"
                )));
            }
        }
    }

    pub fn refresh_knowledge_count(&mut self, tx: &mpsc::UnboundedSender<Action>) {
        if tx.send(Action::KnowledgeCount()).is_err() {
            self.handle_knowledge_count_settled(Err(worker_gone()));
        }
    }

    pub fn handle_knowledge_count_settled(&mut self, result: BackendResult<KnowledgeOverview>) {
        match result {
            Ok(overview) => self.knowledge.total_entries = Some(overview.total),
            Err(err) => tracing::warn!(error = %err, "Knowledge count refresh failed"),
        }
    }

    pub fn refresh_health(&mut self, tx: &mpsc::UnboundedSender<Action>) {
        if tx.send(Action::HealthCheck()).is_err() {
            self.handle_health_settled(Err(worker_gone()));
        }
    }

    pub fn handle_health_settled(&mut self, result: BackendResult<HealthReport>) {
        match result {
            Ok(report) => {
                self.knowledge.health = HealthStatus::from_report(&report);
                self.knowledge.health_report = Some(report);
            }
            Err(err) => {
                tracing::warn!(error = %err, "Health check failed");
                self.knowledge.health = HealthStatus::Error;
                self.knowledge.health_report = None;
            }
        }
    }

    pub fn refresh_detailed_status(&mut self, tx: &mpsc::UnboundedSender<Action>) {
        if tx.send(Action::StatusCheck()).is_err() {
            self.handle_status_settled(Err(worker_gone()));
        }
    }

    pub fn handle_status_settled(&mut self, result: BackendResult<ServiceStatus>) {
        match result {
            Ok(status) => self.knowledge.mode = Some(status.status),
            Err(err) => tracing::warn!(error = %err, "Status refresh failed"),
        }
    }

    /// Closes the help overlay when open, otherwise fetches a fresh help
    /// document and opens it once the fetch settles.
    pub fn toggle_help(&mut self, tx: &mpsc::UnboundedSender<Action>) {
        if self.help.is_some() {
            self.close_help();
            return;
        }
        if self.help_pending {
            return;
        }

        self.help_pending = true;
        if tx.send(Action::Help()).is_err() {
            self.handle_help_settled(Err(worker_gone()));
        }
    }

    pub fn handle_help_settled(&mut self, result: BackendResult<HelpDocument>) {
        self.help_pending = false;
        self.help_scroll = 0;

        match result {
            Ok(document) => {
                self.help = Some(HelpView {
                    document: Some(document),
                    error: None,
                });
            }
            Err(err) => {
                self.help = Some(HelpView {
                    document: None,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    pub fn close_help(&mut self) {
        self.help = None;
        self.help_rect = None;
        self.help_scroll = 0;
    }

    /// Closes the help overlay if the click landed outside of it. Returns true
    /// when the overlay was closed.
    pub fn click(&mut self, column: u16, row: u16) -> bool {
        if self.help.is_none() {
            return false;
        }

        if let Some(rect) = self.help_rect {
            let inside = column >= rect.x
                && column < rect.x.saturating_add(rect.width)
                && row >= rect.y
                && row < rect.y.saturating_add(rect.height);
            if inside {
                return false;
            }
        }

        self.close_help();
        return true;
    }

    /// Whether a popup covers the input box.
    pub fn is_overlay_open(&self) -> bool {
        return self.help.is_some() || !self.notices.is_empty();
    }

    pub fn type_input(&mut self, input: Input) {
        if self.is_overlay_open() {
            return;
        }
        self.textarea.input(input);
    }

    pub fn paste(&mut self, text: &str) {
        if self.is_overlay_open() {
            return;
        }
        self.textarea.insert_str(text);
    }

    pub fn current_notice(&self) -> Option<&Notice> {
        return self.notices.front();
    }

    pub fn dismiss_notice(&mut self) -> bool {
        return self.notices.pop_front().is_some();
    }

    pub fn status_line(&self) -> String {
        let mut line = self.knowledge.status_line();

        if let Some(conversation_id) = &self.conversation_id {
            let short = conversation_id.chars().take(8).collect::<String>();
            line = format!("{line} | conversation {short}");
        }
        if self.is_sending {
            line = format!("{line} | thinking");
        }
        if self.is_ingesting() {
            line = format!("{line} | ingesting ({})", self.ingests_in_flight);
        }

        return line;
    }

    pub fn input_title(&self) -> String {
        if self.is_sending {
            return "Zark is thinking...".to_string();
        }

        return "Ask Zark anything".to_string();
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.last_known_width = rect.width;
        self.last_known_height = rect.height;
        self.sync_dependants();
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
        self.sync_dependants();
        self.scroll.last();
    }

    fn sync_dependants(&mut self) {
        self.bubble_list
            .set_messages(&self.messages, self.last_known_width as usize);

        self.scroll
            .set_state(self.bubble_list.len() as u16, self.last_known_height);

        if self.is_sending {
            self.scroll.last();
        }
    }
}
