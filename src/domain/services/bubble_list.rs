use std::collections::BTreeMap;

use ratatui::prelude::Backend;
use ratatui::prelude::Rect;
use ratatui::text::Line;
use ratatui::widgets::Block;
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use syntect::highlighting::Theme;

use super::Bubble;
use super::BubbleAlignment;
use super::CodeBlocks;
use super::CopyButtonView;
use crate::domain::models::Author;
use crate::domain::models::Message;

#[cfg(test)]
#[path = "bubble_list_test.rs"]
mod tests;

fn alignment_for(message: &Message) -> BubbleAlignment {
    if message.author == Author::User {
        return BubbleAlignment::Right;
    }
    return BubbleAlignment::Left;
}

/// Rendered chat history. Messages never change once appended, so each one is
/// highlighted a single time and kept until the width changes or one of its
/// copy buttons changes label. The reply that is still streaming in is drawn
/// fresh on every update.
pub struct BubbleList {
    cache: BTreeMap<usize, Vec<Line<'static>>>,
    pending: Vec<Line<'static>>,
    line_width: usize,
    lines_len: usize,
    renders: usize,
    theme: Theme,
}

impl BubbleList {
    pub fn new(theme: Theme) -> BubbleList {
        return BubbleList {
            cache: BTreeMap::new(),
            pending: vec![],
            line_width: 0,
            lines_len: 0,
            renders: 0,
            theme,
        };
    }

    pub fn set_messages(
        &mut self,
        messages: &[Message],
        pending: Option<&Message>,
        codeblocks: &CodeBlocks,
        line_width: usize,
    ) {
        if self.line_width != line_width {
            self.cache.clear();
            self.line_width = line_width;
        }

        for (idx, message) in messages.iter().enumerate() {
            if self.cache.contains_key(&idx) {
                continue;
            }

            let buttons: Vec<CopyButtonView> = (0..message.codeblocks().len())
                .filter_map(|position| {
                    let number = codeblocks.number_for(idx, position)?;
                    let label = codeblocks.label(number)?;
                    return Some((number, label));
                })
                .collect();

            let lines = Bubble::new(message, alignment_for(message), line_width, buttons)
                .as_lines(&self.theme);
            self.cache.insert(idx, lines);
            self.renders += 1;
        }

        self.pending = match pending {
            Some(message) => {
                Bubble::new(message, alignment_for(message), line_width, vec![])
                    .as_lines(&self.theme)
            }
            None => vec![],
        };

        self.lines_len =
            self.cache.values().map(|e| return e.len()).sum::<usize>() + self.pending.len();
    }

    /// Drops the rendered lines of a message so it's highlighted again on the
    /// next update.
    pub fn invalidate(&mut self, message_idx: usize) {
        if self.cache.remove(&message_idx).is_some() {
            tracing::debug!(message_idx, renders = self.renders, "Invalidated bubble");
        }
    }

    pub fn len(&self) -> usize {
        return self.lines_len;
    }

    pub fn is_empty(&self) -> bool {
        return self.lines_len == 0;
    }

    pub fn lines(&self) -> Vec<Line<'static>> {
        return self
            .cache
            .values()
            .chain(std::iter::once(&self.pending))
            .flat_map(|lines| return lines.to_owned())
            .collect();
    }

    pub fn render<B: Backend>(&self, frame: &mut Frame<B>, rect: Rect, scroll: u16) {
        frame.render_widget(
            Paragraph::new(self.lines())
                .block(Block::default())
                .scroll((scroll, 0)),
            rect,
        );
    }
}
