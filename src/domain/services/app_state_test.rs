use anyhow::Result;
use ratatui::prelude::Rect;
use tokio::sync::mpsc;
use tui_textarea::Input;
use tui_textarea::Key;

use super::AppState;
use crate::domain::models::Action;
use crate::domain::models::ApiError;
use crate::domain::models::ChatOutcome;
use crate::domain::models::ChatPrompt;
use crate::domain::models::ChatReply;
use crate::domain::models::ClearReceipt;
use crate::domain::models::HealthReport;
use crate::domain::models::HealthStatus;
use crate::domain::models::HelpDocument;
use crate::domain::models::IngestReceipt;
use crate::domain::models::IngestRequest;
use crate::domain::models::KnowledgeOverview;
use crate::domain::models::MessageKind;
use crate::domain::models::NoticeLevel;
use crate::domain::models::ServiceStatus;

fn app_state() -> AppState<'static> {
    let mut app_state = AppState::new();
    app_state.set_rect(Rect::new(0, 0, 100, 300));
    return app_state;
}

fn reply(response: &str, conversation_id: &str, sources: Vec<&str>) -> ChatReply {
    return ChatReply {
        response: response.to_string(),
        sources: sources.iter().map(|e| return e.to_string()).collect(),
        conversation_id: conversation_id.to_string(),
    };
}

#[test]
fn it_starts_with_a_welcome_message() {
    let app_state = app_state();

    assert_eq!(app_state.messages.len(), 1);
    assert_eq!(app_state.messages[0].kind(), MessageKind::Bot);
    assert_eq!(app_state.knowledge.health, HealthStatus::Unknown);
    assert!(!app_state.is_sending);
    assert!(!app_state.is_ingesting());
}

#[test]
fn it_fires_startup_probes() -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
    let mut app_state = app_state();
    app_state.startup(&tx);

    assert_eq!(rx.try_recv()?, Action::HealthCheck());
    assert_eq!(rx.try_recv()?, Action::KnowledgeCount());
    assert_eq!(rx.try_recv()?, Action::StatusCheck());
    assert!(rx.try_recv().is_err());

    return Ok(());
}

mod send_message {
    use super::*;

    #[test]
    fn it_ignores_blank_input() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state();
        app_state.send_message("  \n\t ", &tx);

        assert_eq!(app_state.messages.len(), 1);
        assert!(!app_state.is_sending);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn it_appends_user_message_and_dispatches() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state();
        app_state.send_message("  What is quantum computing?  ", &tx);

        assert_eq!(app_state.messages.len(), 2);
        assert_eq!(app_state.messages[1].kind(), MessageKind::User);
        assert_eq!(app_state.messages[1].content(), "What is quantum computing?");
        assert!(app_state.is_sending);
        assert_eq!(
            rx.try_recv()?,
            Action::Chat(
                ChatPrompt {
                    query: "What is quantum computing?".to_string(),
                    conversation_id: None,
                    show_sources: false,
                },
                0
            )
        );

        return Ok(());
    }

    #[test]
    fn it_asks_for_sources_on_keywords() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state();
        app_state.send_message("Show me your sources for that", &tx);

        match rx.try_recv()? {
            Action::Chat(prompt, _) => assert!(prompt.show_sources),
            _ => panic!("Wrong action"),
        }

        return Ok(());
    }

    #[test]
    fn it_appends_bot_reply_with_sources() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state();
        app_state.send_message("Where did you get that?", &tx);
        app_state.handle_chat_settled(ChatOutcome {
            generation: 0,
            show_sources: true,
            result: Ok(reply("From the web.", "conv-1", vec!["https://example.com"])),
        });

        assert_eq!(app_state.messages.len(), 3);
        assert!(!app_state.is_sending);
        assert_eq!(app_state.conversation_id, Some("conv-1".to_string()));

        let last = &app_state.messages[2];
        assert_eq!(last.kind(), MessageKind::Bot);
        assert_eq!(last.content(), "From the web.");
        assert_eq!(last.sources(), ["https://example.com".to_string()]);

        return Ok(());
    }

    #[test]
    fn it_drops_sources_when_not_asked() {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state();
        app_state.send_message("Tell me about AI", &tx);
        app_state.handle_chat_settled(ChatOutcome {
            generation: 0,
            show_sources: false,
            result: Ok(reply("AI is...", "conv-1", vec!["https://example.com"])),
        });

        assert!(app_state.messages[2].sources().is_empty());
    }

    #[test]
    fn it_reuses_and_overwrites_conversation_id() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state();
        app_state.send_message("First", &tx);
        rx.try_recv()?;
        app_state.handle_chat_settled(ChatOutcome {
            generation: 0,
            show_sources: false,
            result: Ok(reply("One", "conv-1", vec![])),
        });

        app_state.send_message("Second", &tx);
        match rx.try_recv()? {
            Action::Chat(prompt, _) => {
                assert_eq!(prompt.conversation_id, Some("conv-1".to_string()));
            }
            _ => panic!("Wrong action"),
        }

        app_state.handle_chat_settled(ChatOutcome {
            generation: 0,
            show_sources: false,
            result: Ok(reply("Two", "conv-2", vec![])),
        });
        assert_eq!(app_state.conversation_id, Some("conv-2".to_string()));

        return Ok(());
    }

    #[test]
    fn it_appends_error_on_failure() {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state();
        app_state.conversation_id = Some("conv-1".to_string());
        app_state.send_message("Hello?", &tx);
        app_state.handle_chat_settled(ChatOutcome {
            generation: 0,
            show_sources: false,
            result: Err(ApiError::Application("AI engine offline".to_string())),
        });

        assert_eq!(app_state.messages.len(), 3);
        assert!(!app_state.is_sending);
        assert_eq!(app_state.messages[2].kind(), MessageKind::Error);
        assert!(app_state.messages[2].content().contains("AI engine offline"));
        assert_eq!(app_state.conversation_id, Some("conv-1".to_string()));
    }

    #[test]
    fn it_settles_immediately_when_worker_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel::<Action>();
        drop(rx);

        let mut app_state = app_state();
        app_state.send_message("Hello?", &tx);

        assert_eq!(app_state.messages.len(), 3);
        assert_eq!(app_state.messages[2].kind(), MessageKind::Error);
        assert!(!app_state.is_sending);
    }
}

mod ingest_url {
    use super::*;

    #[test]
    fn it_ignores_blank_url() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state();
        app_state.ingest_url("   ", &tx);

        assert!(!app_state.is_ingesting());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn it_dispatches_with_fixed_depth() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state();
        app_state.ingest_url(" https://example.com ", &tx);

        assert!(app_state.is_ingesting());
        assert_eq!(
            rx.try_recv()?,
            Action::Ingest(IngestRequest {
                url: "https://example.com".to_string(),
                depth: 2,
            })
        );

        return Ok(());
    }

    #[test]
    fn it_settles_overlapping_ingestions_independently() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state();
        app_state.ingest_url("https://example.com", &tx);
        app_state.ingest_url("https://example.com", &tx);
        assert_eq!(app_state.ingests_in_flight, 2);
        rx.try_recv()?;
        rx.try_recv()?;

        app_state.handle_ingest_settled(
            "https://example.com",
            Ok(IngestReceipt {
                message: "Successfully ingested content from https://example.com".to_string(),
                ..IngestReceipt::default()
            }),
            &tx,
        );
        assert!(app_state.is_ingesting());
        assert_eq!(rx.try_recv()?, Action::KnowledgeCount());

        app_state.handle_ingest_settled(
            "https://example.com",
            Err(ApiError::Transport("connection refused".to_string())),
            &tx,
        );
        assert!(!app_state.is_ingesting());
        assert!(rx.try_recv().is_err());

        assert_eq!(app_state.notices.len(), 2);
        assert_eq!(app_state.notices[0].level, NoticeLevel::Info);
        assert_eq!(app_state.notices[1].level, NoticeLevel::Error);
        assert!(app_state.notices[1].text.contains("connection refused"));

        return Ok(());
    }

    #[test]
    fn it_leaves_summary_untouched_on_failure() {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state();
        app_state.knowledge.total_entries = Some(5);
        app_state.ingest_url("https://example.com", &tx);
        app_state.handle_ingest_settled(
            "https://example.com",
            Err(ApiError::Application("Failed to ingest URL".to_string())),
            &tx,
        );

        assert_eq!(app_state.knowledge.total_entries, Some(5));
    }

    #[test]
    fn it_settles_immediately_when_worker_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel::<Action>();
        drop(rx);

        let mut app_state = app_state();
        app_state.ingest_url("https://example.com", &tx);

        assert!(!app_state.is_ingesting());
        assert_eq!(app_state.notices.len(), 1);
        assert_eq!(app_state.notices[0].level, NoticeLevel::Error);
    }
}

mod refresh {
    use super::*;

    #[test]
    fn it_marks_health_error_on_failure() {
        let mut app_state = app_state();
        app_state.handle_health_settled(Err(ApiError::Transport("refused".to_string())));

        assert_eq!(app_state.knowledge.health, HealthStatus::Error);
    }

    #[test]
    fn it_marks_health_error_when_worker_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel::<Action>();
        drop(rx);

        let mut app_state = app_state();
        app_state.refresh_health(&tx);

        assert_eq!(app_state.knowledge.health, HealthStatus::Error);
    }

    #[test]
    fn it_stores_health_report() {
        let mut app_state = app_state();
        app_state.handle_health_settled(Ok(HealthReport {
            status: "limited".to_string(),
            mongodb: Some("connected".to_string()),
            groq: Some("not configured".to_string()),
            message: None,
        }));

        assert_eq!(app_state.knowledge.health, HealthStatus::Limited);
        assert!(app_state.knowledge.health_report.is_some());
    }

    #[test]
    fn it_keeps_count_on_failure() {
        let mut app_state = app_state();
        app_state.handle_knowledge_count_settled(Ok(KnowledgeOverview {
            total: 7,
            ..KnowledgeOverview::default()
        }));
        app_state.handle_knowledge_count_settled(Err(ApiError::Transport("refused".to_string())));

        assert_eq!(app_state.knowledge.total_entries, Some(7));
    }

    #[test]
    fn it_keeps_mode_on_failure() {
        let mut app_state = app_state();
        app_state.handle_status_settled(Ok(ServiceStatus {
            status: "limited".to_string(),
            message: None,
        }));
        app_state.handle_status_settled(Err(ApiError::Transport("refused".to_string())));

        assert_eq!(app_state.knowledge.mode, Some("limited".to_string()));
    }
}

mod clear {
    use super::*;

    #[test]
    fn it_clears_conversation_locally() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state();
        app_state.conversation_id = Some("conv-1".to_string());
        app_state.textarea.insert_str("half typed");
        app_state.clear_conversation();

        assert!(app_state.messages.is_empty());
        assert_eq!(app_state.conversation_id, None);
        assert_eq!(app_state.textarea.lines(), [""]);
        assert_eq!(app_state.bubble_list.len(), 0);
        assert!(rx.try_recv().is_err());
        drop(tx);
    }

    #[test]
    fn it_ignores_conversation_id_from_a_reply_after_clear() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state();
        app_state.textarea.insert_str("hello");
        assert!(!app_state.submit_input(&tx));
        let generation = match rx.try_recv()? {
            Action::Chat(_, generation) => generation,
            _ => panic!("Wrong action"),
        };

        app_state.textarea.insert_str("/clear");
        assert!(!app_state.submit_input(&tx));
        app_state.handle_chat_settled(ChatOutcome {
            generation,
            show_sources: false,
            result: Ok(reply("Hi!", "old-conv", vec![])),
        });

        assert!(!app_state.is_sending);
        assert_eq!(app_state.messages.len(), 1);
        assert_eq!(app_state.messages[0].kind(), MessageKind::Bot);
        assert_eq!(app_state.conversation_id, None);

        app_state.send_message("fresh start", &tx);
        match rx.try_recv()? {
            Action::Chat(prompt, next_generation) => {
                assert_eq!(prompt.conversation_id, None);
                assert_eq!(next_generation, generation + 1);
            }
            _ => panic!("Wrong action"),
        }

        return Ok(());
    }

    #[test]
    fn it_refreshes_count_after_clearing_knowledge() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state();
        app_state.clear_knowledge(&tx);
        assert_eq!(rx.try_recv()?, Action::KnowledgeClear());

        app_state.handle_knowledge_clear_settled(
            Ok(ClearReceipt {
                message: "Cleared 3 knowledge entries".to_string(),
            }),
            &tx,
        );
        assert_eq!(rx.try_recv()?, Action::KnowledgeCount());
        assert_eq!(app_state.notices[0].text, "Cleared 3 knowledge entries");

        return Ok(());
    }
}

mod help {
    use super::*;

    #[test]
    fn it_fetches_once_then_toggles_closed() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state();
        app_state.toggle_help(&tx);
        app_state.toggle_help(&tx);

        assert_eq!(rx.try_recv()?, Action::Help());
        assert!(rx.try_recv().is_err());
        assert!(app_state.help.is_none());

        app_state.handle_help_settled(Ok(HelpDocument::default()));
        assert!(app_state.help.is_some());

        app_state.toggle_help(&tx);
        assert!(app_state.help.is_none());
        assert!(rx.try_recv().is_err());

        return Ok(());
    }

    #[test]
    fn it_keeps_typing_out_of_the_hidden_input() {
        let mut app_state = app_state();
        app_state.handle_help_settled(Ok(HelpDocument::default()));
        app_state.type_input(Input {
            key: Key::Char('x'),
            ctrl: false,
            alt: false,
        });
        app_state.paste("pasted");
        assert_eq!(app_state.textarea.lines(), [""]);

        app_state.close_help();
        app_state.type_input(Input {
            key: Key::Char('x'),
            ctrl: false,
            alt: false,
        });
        assert_eq!(app_state.textarea.lines(), ["x"]);
    }

    #[test]
    fn it_shows_fetch_errors() {
        let mut app_state = app_state();
        app_state.handle_help_settled(Err(ApiError::Transport("refused".to_string())));

        let help = app_state.help.unwrap();
        assert!(help.document.is_none());
        assert_eq!(help.error, Some("refused".to_string()));
    }

    #[test]
    fn it_closes_on_click_outside() {
        let mut app_state = app_state();
        app_state.handle_help_settled(Ok(HelpDocument::default()));
        app_state.help_rect = Some(Rect::new(10, 10, 20, 5));

        assert!(!app_state.click(15, 12));
        assert!(app_state.help.is_some());

        assert!(app_state.click(30, 12));
        assert!(app_state.help.is_none());
    }

    #[test]
    fn it_ignores_clicks_without_overlay() {
        let mut app_state = app_state();
        assert!(!app_state.click(0, 0));
    }
}

mod submit_input {
    use super::*;

    fn submit(app_state: &mut AppState, text: &str, tx: &mpsc::UnboundedSender<Action>) -> bool {
        app_state.textarea.insert_str(text);
        return app_state.submit_input(tx);
    }

    #[test]
    fn it_quits() {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state();

        assert!(submit(&mut app_state, "/q", &tx));
    }

    #[test]
    fn it_sends_chat_text() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state();

        assert!(!submit(&mut app_state, "/etc/hosts is a file, right?", &tx));
        assert!(matches!(rx.try_recv()?, Action::Chat(_, _)));
        assert_eq!(app_state.textarea.lines(), [""]);

        return Ok(());
    }

    #[test]
    fn it_rejects_chat_while_sending() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state();
        app_state.is_sending = true;
        submit(&mut app_state, "Another one", &tx);

        assert!(rx.try_recv().is_err());
        assert_eq!(app_state.messages.len(), 1);
        assert_eq!(app_state.notices.len(), 1);
        assert_eq!(app_state.textarea.lines(), ["Another one"]);
    }

    #[test]
    fn it_rejects_ingest_while_ingesting() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state();
        submit(&mut app_state, "/ingest https://example.com", &tx);
        submit(&mut app_state, "/i https://example.org", &tx);

        assert!(matches!(rx.try_recv()?, Action::Ingest(_)));
        assert!(rx.try_recv().is_err());
        assert_eq!(app_state.ingests_in_flight, 1);
        assert_eq!(app_state.notices.len(), 1);

        return Ok(());
    }

    #[test]
    fn it_requires_ingest_url() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state();
        submit(&mut app_state, "/ingest", &tx);

        assert!(rx.try_recv().is_err());
        assert_eq!(app_state.notices[0].text, "Usage: /ingest URL");
    }

    #[test]
    fn it_requires_forget_confirmation() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state();
        submit(&mut app_state, "/forget", &tx);
        assert!(rx.try_recv().is_err());
        assert_eq!(app_state.notices.len(), 1);

        submit(&mut app_state, "/forget confirm", &tx);
        assert_eq!(rx.try_recv()?, Action::KnowledgeClear());

        return Ok(());
    }

    #[test]
    fn it_refreshes_status() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state();
        submit(&mut app_state, "/status", &tx);

        assert_eq!(rx.try_recv()?, Action::HealthCheck());
        assert_eq!(rx.try_recv()?, Action::StatusCheck());

        return Ok(());
    }

    #[test]
    fn it_refreshes_count() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state();
        submit(&mut app_state, "/kb", &tx);

        assert_eq!(rx.try_recv()?, Action::KnowledgeCount());

        return Ok(());
    }

    #[test]
    fn it_starts_new_conversation() {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state();
        app_state.conversation_id = Some("conv-1".to_string());
        submit(&mut app_state, "/new", &tx);

        assert!(app_state.messages.is_empty());
        assert_eq!(app_state.conversation_id, None);
    }
}

mod notices {
    use super::*;

    #[test]
    fn it_dismisses_in_order() {
        let (tx, rx) = mpsc::unbounded_channel::<Action>();
        drop(rx);

        let mut app_state = app_state();
        app_state.ingest_url("https://example.com", &tx);
        app_state.clear_knowledge(&tx);

        assert!(app_state
            .current_notice()
            .unwrap()
            .text
            .contains("https://example.com"));
        assert!(app_state.dismiss_notice());
        assert!(app_state
            .current_notice()
            .unwrap()
            .text
            .contains("knowledge base"));
        assert!(app_state.dismiss_notice());
        assert!(!app_state.dismiss_notice());
    }
}

#[test]
fn it_renders_status_line() {
    let mut app_state = app_state();
    app_state.knowledge.total_entries = Some(3);
    app_state.knowledge.health = HealthStatus::Healthy;
    app_state.conversation_id = Some("0123456789abcdef".to_string());
    app_state.is_sending = true;
    app_state.ingests_in_flight = 1;

    insta::assert_snapshot!(app_state.status_line(), @"● healthy | 3 entries | conversation 01234567 | thinking | ingesting (1)");
}
