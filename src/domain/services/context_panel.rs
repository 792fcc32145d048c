#[cfg(test)]
#[path = "context_panel_test.rs"]
mod tests;

use ratatui::prelude::Backend;
use ratatui::prelude::Constraint;
use ratatui::prelude::Direction;
use ratatui::prelude::Layout;
use ratatui::prelude::Rect;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::List;
use ratatui::widgets::ListItem;
use ratatui::widgets::ListState;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Wrap;
use ratatui::Frame;

use crate::domain::models::ContextFile;

pub const CONTEXT_PANEL_TITLE: &str = "Context Provider";

/// File picker for attaching a context file to the next queries. At most one
/// file is selected at a time.
#[derive(Default)]
pub struct ContextPanel {
    open: bool,
    files: Vec<String>,
    list_state: ListState,
    selected: Option<ContextFile>,
}

impl ContextPanel {
    /// Returns whether the panel is now open. Opening should be followed by a
    /// fresh file listing.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        return self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        return self.open;
    }

    pub fn files(&self) -> &[String] {
        return &self.files;
    }

    /// Keeps the cursor on the same file when it's still listed.
    pub fn set_files(&mut self, files: Vec<String>) {
        let highlighted = self.highlighted().map(|e| return e.to_string());
        self.files = files;

        if self.files.is_empty() {
            self.list_state.select(None);
            return;
        }

        let idx = highlighted
            .and_then(|name| return self.files.iter().position(|e| return *e == name))
            .unwrap_or(0);
        self.list_state.select(Some(idx));
    }

    pub fn highlighted(&self) -> Option<&str> {
        let idx = self.list_state.selected()?;
        return self.files.get(idx).map(|e| return e.as_str());
    }

    pub fn previous(&mut self) {
        if self.files.is_empty() {
            return;
        }

        let idx = match self.list_state.selected() {
            Some(0) | None => self.files.len() - 1,
            Some(idx) => idx - 1,
        };
        self.list_state.select(Some(idx));
    }

    pub fn next(&mut self) {
        if self.files.is_empty() {
            return;
        }

        let idx = match self.list_state.selected() {
            Some(idx) if idx + 1 < self.files.len() => idx + 1,
            _ => 0,
        };
        self.list_state.select(Some(idx));
    }

    /// Replaces any previously selected file.
    pub fn select(&mut self, file: ContextFile) {
        tracing::debug!(name = %file.name, "Selected context file");
        self.selected = Some(file);
    }

    pub fn clear_selection(&mut self) -> Option<ContextFile> {
        return self.selected.take();
    }

    pub fn selected(&self) -> Option<&ContextFile> {
        return self.selected.as_ref();
    }

    pub fn preview(&self) -> Option<String> {
        return self.selected.as_ref().map(|e| return e.preview());
    }

    pub fn render<B: Backend>(&mut self, frame: &mut Frame<B>, rect: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(CONTEXT_PANEL_TITLE);
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(inner);

        let selected_name = self.selected.as_ref().map(|e| return e.name.as_str());
        let items: Vec<ListItem> = if self.files.is_empty() {
            vec![ListItem::new("No files available")]
        } else {
            self.files
                .iter()
                .map(|name| {
                    if Some(name.as_str()) == selected_name {
                        return ListItem::new(format!("* {name}"));
                    }
                    return ListItem::new(format!("  {name}"));
                })
                .collect()
        };

        frame.render_stateful_widget(
            List::new(items)
                .block(Block::default().borders(Borders::BOTTOM).title("Files"))
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED)),
            layout[0],
            &mut self.list_state,
        );

        let preview = self
            .preview()
            .unwrap_or_else(|| return "Press Enter to attach the highlighted file.".to_string());
        frame.render_widget(
            Paragraph::new(preview)
                .block(Block::default().title("Preview"))
                .wrap(Wrap { trim: false }),
            layout[1],
        );
    }
}
