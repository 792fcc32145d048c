#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::Result;
use ratatui::prelude::Rect;
use syntect::highlighting::Theme;
use tokio::sync::mpsc;

use super::actions::help_text;
use super::BubbleList;
use super::CodeBlocks;
use super::ContextPanel;
use super::Scroll;
use super::Timer;
use crate::domain::models::Action;
use crate::domain::models::Author;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendPrompt;
use crate::domain::models::BackendResponse;
use crate::domain::models::ContextFile;
use crate::domain::models::Event;
use crate::domain::models::Loading;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::QuerySelector;
use crate::domain::models::QueryType;
use crate::domain::models::SlashCommand;

/// How long a copy button reads "Copied!" before reverting.
pub const COPY_LABEL_DURATION: Duration = Duration::from_millis(1200);

#[derive(Debug, PartialEq, Eq)]
pub enum Submission {
    /// Nothing happened, the input should be kept.
    Ignored,
    Accepted,
    Quit,
}

pub struct AppState {
    pub bubble_list: BubbleList,
    pub codeblocks: CodeBlocks,
    pub context_panel: ContextPanel,
    pub last_known_height: u16,
    pub last_known_width: u16,
    pub loading: Loading,
    pub messages: Vec<Message>,
    pub query: QuerySelector,
    pub scroll: Scroll,
    pub streaming: Option<Message>,
    pub waiting_for_backend: bool,
    backend_timeout: Duration,
    backend_timer: Option<Timer>,
    event_tx: mpsc::UnboundedSender<Event>,
    /// Id of the latest backend request. Responses tagged with anything else
    /// belong to an abandoned request.
    request_id: u64,
}

impl AppState {
    pub fn new(
        theme: Theme,
        query_type: QueryType,
        backend_timeout: Duration,
        event_tx: mpsc::UnboundedSender<Event>,
    ) -> AppState {
        let mut app_state = AppState {
            bubble_list: BubbleList::new(theme),
            codeblocks: CodeBlocks::default(),
            context_panel: ContextPanel::default(),
            last_known_height: 0,
            last_known_width: 0,
            loading: Loading::default(),
            messages: vec![],
            query: QuerySelector::new(query_type),
            scroll: Scroll::default(),
            streaming: None,
            waiting_for_backend: false,
            backend_timeout,
            backend_timer: None,
            event_tx,
            request_id: 0,
        };

        app_state.add_message(Message::new(
            Author::Bot,
            "Hey there! What can I do for you?",
        ));

        return app_state;
    }

    pub async fn check_backend(&mut self, backend: &BackendBox) {
        if let Err(err) = backend.health_check().await {
            let backend_name = backend.name();
            self.add_message(Message::new_with_type(
                Author::System,
                MessageType::Error,
                &format!("Hey, it looks like backend {backend_name} isn't running, I can't connect to it. You should double check that before we start talking, or start with `--backend mock` to try things out.\n\nError: {err}"),
            ));
        }
    }

    /// Appends to the history. Code blocks are annotated before the message
    /// is first rendered, so its bubble comes with copy buttons.
    pub fn add_message(&mut self, mut message: Message) {
        message.set_rendered_at(self.messages.len());
        self.messages.push(message);
        self.codeblocks.annotate(&self.messages);
        self.sync_dependants();
        self.scroll.last();
    }

    fn add_notice(&mut self, text: &str) {
        self.add_message(Message::new(Author::System, text));
    }

    fn add_error(&mut self, text: &str) {
        self.add_message(Message::new_with_type(
            Author::System,
            MessageType::Error,
            text,
        ));
    }

    /// Handles the text in the message input. Slash commands are answered
    /// locally, anything else goes to the backend along with the selected
    /// query type and context file.
    pub fn submit(
        &mut self,
        input: &str,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<Submission> {
        if input.trim().is_empty() || self.waiting_for_backend {
            return Ok(Submission::Ignored);
        }

        self.add_message(Message::new(Author::User, input));

        if let Some(command) = SlashCommand::parse(input) {
            if command.is_quit() {
                return Ok(Submission::Quit);
            }

            if command.is_help() {
                self.add_notice(&help_text());
            } else if command.is_copy() {
                self.copy_code_block(command.first_arg(), tx)?;
            } else if command.is_query() {
                self.query_command(command.first_arg());
            } else if command.is_context() {
                self.context_command(command.first_arg(), tx)?;
            }

            return Ok(Submission::Accepted);
        }

        self.request_id += 1;
        let prompt = BackendPrompt::new(
            input,
            self.query.selected().clone(),
            self.context_panel.selected().cloned(),
        )
        .with_id(self.request_id);

        self.waiting_for_backend = true;
        self.backend_timer = Some(Timer::start(
            self.backend_timeout,
            self.event_tx.clone(),
            Event::BackendTimeout(),
        ));
        tx.send(Action::BackendRequest(prompt))?;

        return Ok(Submission::Accepted);
    }

    fn query_command(&mut self, arg: Option<&str>) {
        let Some(arg) = arg else {
            let text = format!(
                "Query type: {}\nPresets: {}",
                self.query.selected(),
                self.query.options().join(", ")
            );
            self.add_notice(&text);
            return;
        };

        self.query.select(QueryType::new(arg));
        let text = format!("Query type set to {}.", self.query.selected());
        self.add_notice(&text);
    }

    fn context_command(
        &mut self,
        arg: Option<&str>,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<()> {
        if arg != Some("clear") {
            return self.toggle_context(tx);
        }

        match self.context_panel.clear_selection() {
            Some(file) => {
                self.add_notice(&format!("{} is no longer attached.", file.name));
            }
            None => {
                self.add_notice("No context file is attached.");
            }
        }

        return Ok(());
    }

    pub fn request_id(&self) -> u64 {
        return self.request_id;
    }

    fn is_current_request(&self, id: u64) -> bool {
        if !self.waiting_for_backend || id != self.request_id {
            tracing::debug!(
                id,
                current = self.request_id,
                "Dropping response for an abandoned request"
            );
            return false;
        }
        return true;
    }

    pub fn handle_backend_response(&mut self, res: BackendResponse) {
        if !self.is_current_request(res.id) {
            return;
        }

        let streaming = self
            .streaming
            .get_or_insert_with(|| return Message::new(res.author, ""));
        if res.replace {
            streaming.set_text(&res.text);
        } else {
            streaming.append(&res.text);
        }

        if res.done {
            self.finish_reply();
        } else {
            self.sync_dependants();
        }
    }

    /// Moves whatever was streamed so far into the history and clears the
    /// streaming state.
    fn finish_reply(&mut self) {
        self.waiting_for_backend = false;
        self.backend_timer = None;

        match self.streaming.take() {
            Some(message) if !message.text.is_empty() => {
                self.add_message(message);
            }
            _ => {
                self.sync_dependants();
            }
        }
    }

    /// A request failed in the worker. Ends the pending reply and shows the
    /// error.
    pub fn handle_backend_failed(&mut self, id: u64, message: Message) {
        if !self.is_current_request(id) {
            return;
        }

        self.finish_reply();
        self.add_message(message);
    }

    pub fn handle_timeout(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        if !self.waiting_for_backend {
            return Ok(());
        }

        tracing::warn!(timeout_ms = self.backend_timeout.as_millis() as u64, "Backend timed out");
        tx.send(Action::BackendAbort())?;
        self.finish_reply();
        self.add_error(&format!(
            "The backend didn't reply within {} seconds, the request was cancelled.",
            self.backend_timeout.as_secs_f32()
        ));

        return Ok(());
    }

    /// Stops waiting on the backend, keeping any partial reply.
    pub fn abort(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        tx.send(Action::BackendAbort())?;
        self.finish_reply();
        return Ok(());
    }

    pub fn copy_code_block(
        &mut self,
        arg: Option<&str>,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<()> {
        let number = match self.codeblocks.resolve(arg) {
            Ok(number) => number,
            Err(err) => {
                self.add_error(&err.to_string());
                return Ok(());
            }
        };

        if let Some(block) = self.codeblocks.get(number) {
            tx.send(Action::CopyCodeBlock(number, block.code.to_string()))?;
        }

        return Ok(());
    }

    pub fn handle_code_block_copied(&mut self, number: usize, res: Result<(), String>) {
        let message_idx = match res {
            Ok(_) => {
                let timer = Timer::start(
                    COPY_LABEL_DURATION,
                    self.event_tx.clone(),
                    Event::CopyLabelExpired(number),
                );
                self.codeblocks.mark_copied(number, timer)
            }
            Err(err) => {
                tracing::warn!(number, error = %err, "Code block copy failed");
                self.codeblocks.mark_failed(number)
            }
        };

        if let Some(idx) = message_idx {
            self.bubble_list.invalidate(idx);
            self.sync_dependants();
        }
    }

    pub fn handle_copy_label_expired(&mut self, number: usize) {
        if let Some(idx) = self.codeblocks.revert_label(number) {
            self.bubble_list.invalidate(idx);
            self.sync_dependants();
        }
    }

    pub fn toggle_context(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        if self.context_panel.toggle() {
            tx.send(Action::ContextList())?;
        }

        return Ok(());
    }

    pub fn handle_context_files(&mut self, files: Vec<String>) {
        self.context_panel.set_files(files);
    }

    pub fn load_highlighted_context(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        if let Some(name) = self.context_panel.highlighted() {
            tx.send(Action::ContextLoad(name.to_string()))?;
        }

        return Ok(());
    }

    pub fn handle_context_loaded(&mut self, file: ContextFile) {
        self.context_panel.select(file);
    }

    /// Context failures are reported in the chat without touching a pending
    /// reply.
    pub fn handle_context_failed(&mut self, text: &str) {
        self.add_error(text);
    }

    pub fn tick(&mut self) {
        if self.waiting_for_backend {
            self.loading.tick();
        }
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.last_known_width = rect.width;
        self.last_known_height = rect.height;
        self.sync_dependants();
    }

    fn sync_dependants(&mut self) {
        self.bubble_list.set_messages(
            &self.messages,
            self.streaming.as_ref(),
            &self.codeblocks,
            self.last_known_width.into(),
        );

        self.scroll.set_state(
            u16::try_from(self.bubble_list.len()).unwrap_or(u16::MAX),
            self.last_known_height,
        );
    }
}
