#[cfg(test)]
#[path = "ui_test.rs"]
mod tests;

use std::io;
use std::time::Duration;

use anyhow::anyhow;
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
use ratatui::widgets::Paragraph;
use ratatui::widgets::Scrollbar;
use ratatui::widgets::ScrollbarOrientation;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::BackendName;
use crate::domain::models::Event;
use crate::domain::models::QueryType;
use crate::domain::models::TextArea;
use crate::domain::services::events::EventsService;
use crate::domain::services::AppState;
use crate::domain::services::Submission;
use crate::domain::services::Themes;
use crate::infrastructure::backends::BackendManager;

pub const HEADER_TITLE: &str = "Chatbot";
pub const FOOTER_HINT: &str = "Enter: Send message │ Ctrl+T: Query type │ Ctrl+O: Add context │ Ctrl+Y: Copy code │ /help";

fn header_line(app_state: &AppState) -> Line<'static> {
    let selected = app_state.query.selected().as_str();
    let highlight = Style::default().add_modifier(Modifier::REVERSED);

    let mut spans = vec![
        Span::styled(
            HEADER_TITLE,
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  Query type:"),
    ];

    let mut options = app_state.query.options().to_vec();
    if !options.iter().any(|e| return e == selected) {
        options.push(selected.to_string());
    }
    for option in options {
        spans.push(Span::raw(" "));
        if option == selected {
            spans.push(Span::styled(format!(" {option} "), highlight));
        } else {
            spans.push(Span::raw(format!(" {option} ")));
        }
    }

    if let Some(file) = app_state.context_panel.selected() {
        spans.push(Span::raw("  Context: "));
        spans.push(Span::styled(
            file.name.to_string(),
            Style::default().fg(Color::Green),
        ));
    }

    return Line::from(spans);
}

/// Renders a full frame: header, chat history with its scrollbar, the
/// Context Provider panel when open, the message input and the hotkey footer.
pub fn draw<B: Backend>(
    frame: &mut Frame<B>,
    app_state: &mut AppState,
    textarea: &tui_textarea::TextArea,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.size());

    frame.render_widget(Paragraph::new(header_line(app_state)), layout[0]);

    let mut chat_rect = layout[1];
    if app_state.context_panel.is_open() {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(layout[1]);
        chat_rect = body[0];
        app_state.context_panel.render(frame, body[1]);
    }

    if chat_rect.width != app_state.last_known_width
        || chat_rect.height != app_state.last_known_height
    {
        app_state.set_rect(chat_rect);
    }

    app_state
        .bubble_list
        .render(frame, chat_rect, app_state.scroll.position);
    frame.render_stateful_widget(
        Scrollbar::new(ScrollbarOrientation::VerticalRight),
        chat_rect.inner(&Margin {
            vertical: 1,
            horizontal: 0,
        }),
        &mut app_state.scroll.scrollbar_state,
    );

    if app_state.waiting_for_backend {
        app_state.loading.render(frame, layout[2]);
    } else {
        frame.render_widget(textarea.widget(), layout[2]);
    }

    frame.render_widget(
        Paragraph::new(FOOTER_HINT).style(Style::default().add_modifier(Modifier::DIM)),
        layout[3],
    );
}

/// Applies a single event to the UI state. Returns true when the app should
/// exit.
pub fn handle_event(
    app_state: &mut AppState,
    textarea: &mut tui_textarea::TextArea<'_>,
    event: Event,
    tx: &mpsc::UnboundedSender<Action>,
) -> Result<bool> {
    match event {
        Event::BackendFailed(id, message) => {
            app_state.handle_backend_failed(id, message);
        }
        Event::BackendPromptResponse(res) => {
            app_state.handle_backend_response(res);
        }
        Event::BackendTimeout() => {
            app_state.handle_timeout(tx)?;
        }
        Event::CodeBlockCopied(number, res) => {
            app_state.handle_code_block_copied(number, res);
        }
        Event::ContextFailed(text) => {
            app_state.handle_context_failed(&text);
        }
        Event::ContextFileLoaded(file) => {
            app_state.handle_context_loaded(file);
        }
        Event::ContextFilesListed(files) => {
            app_state.handle_context_files(files);
        }
        Event::CopyLabelExpired(number) => {
            app_state.handle_copy_label_expired(number);
        }
        Event::KeyboardCharInput(input) => {
            if !app_state.waiting_for_backend {
                textarea.input(input);
            }
        }
        Event::KeyboardPaste(text) => {
            if !app_state.waiting_for_backend {
                for (idx, line) in text.lines().enumerate() {
                    if idx > 0 {
                        textarea.insert_newline();
                    }
                    textarea.insert_str(line);
                }
            }
        }
        Event::KeyboardCTRLC() => {
            if !app_state.waiting_for_backend {
                return Ok(true);
            }
            app_state.abort(tx)?;
        }
        Event::KeyboardCTRLO() => {
            app_state.toggle_context(tx)?;
        }
        Event::KeyboardCTRLT() => {
            app_state.query.next();
        }
        Event::KeyboardCTRLY() => {
            app_state.copy_code_block(None, tx)?;
        }
        Event::KeyboardEsc() => {
            app_state.context_panel.close();
        }
        Event::KeyboardEnter() => {
            if app_state.context_panel.is_open() {
                app_state.load_highlighted_context(tx)?;
                return Ok(false);
            }

            let input_str = textarea.lines().join("\n");
            match app_state.submit(&input_str, tx)? {
                Submission::Quit => return Ok(true),
                Submission::Accepted => *textarea = TextArea::default(),
                Submission::Ignored => (),
            }
        }
        Event::UIScrollDown() => {
            if app_state.context_panel.is_open() {
                app_state.context_panel.next();
            } else {
                app_state.scroll.down();
            }
        }
        Event::UIScrollUp() => {
            if app_state.context_panel.is_open() {
                app_state.context_panel.previous();
            } else {
                app_state.scroll.up();
            }
        }
        Event::UIScrollPageDown() => {
            app_state.scroll.down_page();
        }
        Event::UIScrollPageUp() => {
            app_state.scroll.up_page();
        }
        Event::UITick() => {
            app_state.tick();
        }
        Event::UIResize() => (),
    }

    return Ok(false);
}

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState,
    tx: mpsc::UnboundedSender<Action>,
    events: &mut EventsService,
) -> Result<()> {
    let mut textarea = TextArea::default();

    #[cfg(feature = "dev")]
    {
        textarea.insert_str("Write a function in Rust that prints from 0 to 10, in a fenced code block.");
    }

    loop {
        terminal.draw(|frame| {
            draw(frame, app_state, &textarea);
        })?;

        let event = events.next().await?;
        if handle_event(app_state, &mut textarea, event, &tx)? {
            break;
        }
    }

    return Ok(());
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    crossterm::execute!(io::stdout(), cursor::Show)?;

    return Ok(());
}

pub fn destruct_terminal_for_panic() {
    if let Err(err) = restore_terminal() {
        eprintln!("Failed to restore the terminal: {err}");
    }
}

pub async fn start(
    action_tx: mpsc::UnboundedSender<Action>,
    event_tx: mpsc::UnboundedSender<Event>,
    event_rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let theme = Themes::get(
        &Config::get(ConfigKey::Theme),
        &Config::get(ConfigKey::ThemeFile),
    )?;
    let backend_name = Config::get(ConfigKey::Backend);
    let backend = BackendManager::get(
        BackendName::parse(&backend_name)
            .ok_or_else(|| return anyhow!("Unknown backend {backend_name}"))?,
    )?;

    let mut app_state = AppState::new(
        theme,
        QueryType::new(&Config::get(ConfigKey::QueryType)),
        Duration::from_millis(Config::get_millis(ConfigKey::BackendTimeout)),
        event_tx,
    );
    app_state.check_backend(&backend).await;

    let mut stdout = io::stdout();

    enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;
    let mut events = EventsService::new(event_rx);

    let res = start_loop(&mut terminal, &mut app_state, action_tx, &mut events).await;
    restore_terminal()?;
    terminal.show_cursor()?;

    return res;
}
