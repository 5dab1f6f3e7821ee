use std::io;

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Padding;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Wrap;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::models::HealthStatus;
use crate::domain::models::NoticeLevel;
use crate::domain::models::TextArea;
use crate::domain::services::events::EventsService;
use crate::domain::services::AppState;

fn centered_rect(percent_x: u16, percent_y: u16, rect: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(rect);

    return Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1];
}

fn popup_block(title: &str, color: Color) -> Block<'_> {
    return Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .title(title)
        .padding(Padding::new(1, 1, 0, 0));
}

fn render<B: Backend>(frame: &mut Frame<B>, app_state: &mut AppState) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Max(4),
        ])
        .split(frame.size());

    let status_color = match app_state.knowledge.health {
        HealthStatus::Healthy => Color::Green,
        HealthStatus::Limited => Color::Yellow,
        HealthStatus::Error => Color::Red,
        HealthStatus::Unknown => Color::Gray,
    };
    frame.render_widget(
        Paragraph::new(app_state.status_line()).style(Style::default().fg(status_color)),
        layout[0],
    );

    if layout[1].width != app_state.last_known_width
        || layout[1].height != app_state.last_known_height
    {
        app_state.set_rect(layout[1]);
    }

    app_state
        .bubble_list
        .render(frame, layout[1], app_state.scroll.position);

    app_state
        .textarea
        .set_block(TextArea::block(&app_state.input_title()));
    frame.render_widget(app_state.textarea.widget(), layout[2]);

    if let Some(help) = &app_state.help {
        let rect = centered_rect(80, 80, frame.size());
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(help.as_lines().join("\n"))
                .block(popup_block(
                    "Zark help (Esc to close)",
                    Color::Rgb(64, 160, 255),
                ))
                .wrap(Wrap { trim: false })
                .scroll((app_state.help_scroll, 0)),
            rect,
        );
        app_state.help_rect = Some(rect);
    } else if let Some(notice) = app_state.current_notice() {
        let mut color = Color::Green;
        let mut title = "Zark";
        if notice.level == NoticeLevel::Error {
            color = Color::Red;
            title = "Zark error";
        }

        let rect = centered_rect(60, 30, frame.size());
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(format!("{}\n\nPress Enter to dismiss.", notice.text))
                .block(popup_block(title, color))
                .wrap(Wrap { trim: false }),
            rect,
        );
    }
}

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState<'_>,
    events: &mut EventsService,
    tx: mpsc::UnboundedSender<Action>,
) -> Result<()> {
    app_state.startup(&tx);

    loop {
        terminal.draw(|frame| render(frame, app_state))?;

        match events.next().await? {
            Event::ChatSettled(outcome) => {
                app_state.handle_chat_settled(outcome);
            }
            Event::HealthSettled(result) => {
                app_state.handle_health_settled(result);
            }
            Event::HelpSettled(result) => {
                app_state.handle_help_settled(result);
            }
            Event::IngestSettled(url, result) => {
                app_state.handle_ingest_settled(&url, result, &tx);
            }
            Event::KnowledgeClearSettled(result) => {
                app_state.handle_knowledge_clear_settled(result, &tx);
            }
            Event::KnowledgeCountSettled(result) => {
                app_state.handle_knowledge_count_settled(result);
            }
            Event::StatusSettled(result) => {
                app_state.handle_status_settled(result);
            }
            Event::KeyboardCTRLC() => {
                break;
            }
            Event::KeyboardEnter() => {
                if app_state.dismiss_notice() || app_state.help.is_some() {
                    continue;
                }
                if app_state.submit_input(&tx) {
                    break;
                }
            }
            Event::KeyboardEsc() => {
                if app_state.help.is_some() {
                    app_state.close_help();
                } else {
                    app_state.dismiss_notice();
                }
            }
            Event::KeyboardF1() => {
                app_state.toggle_help(&tx);
            }
            Event::KeyboardPaste(text) => {
                app_state.paste(&text);
            }
            Event::KeyboardCharInput(input) => {
                app_state.type_input(input);
            }
            Event::MouseClick(column, row) => {
                app_state.click(column, row);
            }
            Event::UIScrollDown() => {
                if app_state.help.is_some() {
                    app_state.help_scroll = app_state.help_scroll.saturating_add(1);
                } else {
                    app_state.scroll.down();
                }
            }
            Event::UIScrollUp() => {
                if app_state.help.is_some() {
                    app_state.help_scroll = app_state.help_scroll.saturating_sub(1);
                } else {
                    app_state.scroll.up();
                }
            }
            Event::UIScrollPageDown() => {
                if app_state.help.is_some() {
                    app_state.help_scroll = app_state.help_scroll.saturating_add(10);
                } else {
                    app_state.scroll.down_page();
                }
            }
            Event::UIScrollPageUp() => {
                if app_state.help.is_some() {
                    app_state.help_scroll = app_state.help_scroll.saturating_sub(10);
                } else {
                    app_state.scroll.up_page();
                }
            }
            Event::UIResize() | Event::UITick() => {}
        }
    }

    return Ok(());
}

pub fn destruct_terminal_for_panic() {
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    );
    let _ = crossterm::execute!(io::stdout(), cursor::Show);
}

pub async fn start(
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(
        io::stdout(),
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let term_backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(term_backend)?;

    let mut app_state = AppState::new();
    let mut events = EventsService::new(rx);
    let res = start_loop(&mut terminal, &mut app_state, &mut events, tx).await;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    return res;
}
