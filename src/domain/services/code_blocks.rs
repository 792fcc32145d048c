#[cfg(test)]
#[path = "code_blocks_test.rs"]
mod tests;

use std::collections::HashMap;

use anyhow::bail;
use anyhow::Result;

use super::Timer;
use crate::domain::models::Message;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyLabel {
    Copy,
    Copied,
    Error,
}

impl CopyLabel {
    pub fn text(&self) -> &'static str {
        match self {
            CopyLabel::Copy => return "Copy",
            CopyLabel::Copied => return "Copied!",
            CopyLabel::Error => return "Error",
        }
    }
}

/// Copy control attached to a code block. The revert timer belongs to the
/// button, replacing it cancels the previous one.
pub struct CopyButton {
    label: CopyLabel,
    revert_timer: Option<Timer>,
}

impl Default for CopyButton {
    fn default() -> CopyButton {
        return CopyButton {
            label: CopyLabel::Copy,
            revert_timer: None,
        };
    }
}

impl CopyButton {
    pub fn label(&self) -> CopyLabel {
        return self.label;
    }

    pub fn copied(&mut self, revert_timer: Timer) {
        self.label = CopyLabel::Copied;
        self.revert_timer = Some(revert_timer);
    }

    pub fn failed(&mut self) {
        self.label = CopyLabel::Error;
        self.revert_timer = None;
    }

    /// Returns false when there was nothing to revert, such as after a failed
    /// copy.
    pub fn revert(&mut self) -> bool {
        self.revert_timer = None;
        if self.label != CopyLabel::Copied {
            return false;
        }

        self.label = CopyLabel::Copy;
        return true;
    }
}

pub struct AnnotatedCodeBlock {
    pub message_idx: usize,
    pub position: usize,
    pub language: String,
    pub code: String,
    pub button: CopyButton,
}

/// Code blocks across the whole chat history, numbered from 1 in order of
/// appearance.
#[derive(Default)]
pub struct CodeBlocks {
    blocks: Vec<AnnotatedCodeBlock>,
    /// (message index, position in message) to block number.
    numbers: HashMap<(usize, usize), usize>,
    /// Messages are immutable once in the history, only the ones past this
    /// index need scanning.
    scanned_messages: usize,
}

impl CodeBlocks {
    /// Attaches a copy button to every code block not seen before. Safe to
    /// call after every update of a growing history, existing blocks keep
    /// their buttons and labels. Only messages appended since the last call
    /// are parsed. Returns how many blocks were added.
    pub fn annotate(&mut self, messages: &[Message]) -> usize {
        let mut added = 0;
        let start = self.scanned_messages.min(messages.len());
        for (message_idx, message) in messages.iter().enumerate().skip(start) {
            for (position, codeblock) in message.codeblocks().into_iter().enumerate() {
                if self.numbers.contains_key(&(message_idx, position)) {
                    continue;
                }

                self.blocks.push(AnnotatedCodeBlock {
                    message_idx,
                    position,
                    language: codeblock.language,
                    code: codeblock.code,
                    button: CopyButton::default(),
                });
                self.numbers
                    .insert((message_idx, position), self.blocks.len());
                added += 1;
            }
        }
        self.scanned_messages = messages.len();

        if added > 0 {
            tracing::debug!(added, total = self.blocks.len(), "Annotated code blocks");
        }

        return added;
    }

    pub fn len(&self) -> usize {
        return self.blocks.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.blocks.is_empty();
    }

    pub fn get(&self, number: usize) -> Option<&AnnotatedCodeBlock> {
        if number == 0 {
            return None;
        }
        return self.blocks.get(number - 1);
    }

    fn get_mut(&mut self, number: usize) -> Option<&mut AnnotatedCodeBlock> {
        if number == 0 {
            return None;
        }
        return self.blocks.get_mut(number - 1);
    }

    pub fn number_for(&self, message_idx: usize, position: usize) -> Option<usize> {
        return self.numbers.get(&(message_idx, position)).copied();
    }

    pub fn label(&self, number: usize) -> Option<CopyLabel> {
        return self.get(number).map(|e| return e.button.label());
    }

    /// Resolves a `/copy` argument to a block number. No argument selects the
    /// most recent block.
    pub fn resolve(&self, arg: Option<&str>) -> Result<usize> {
        if self.blocks.is_empty() {
            bail!("There are no code blocks to copy yet.");
        }

        let Some(arg) = arg else {
            return Ok(self.blocks.len());
        };

        let number = match arg.trim().parse::<usize>() {
            Ok(number) => number,
            Err(_) => bail!(format!("{arg} is not a valid code block number.")),
        };

        if self.get(number).is_none() {
            bail!(format!(
                "Code block {number} does not exist. There are {} code blocks.",
                self.blocks.len()
            ));
        }

        return Ok(number);
    }

    /// Each of these returns the message index holding the block, so its
    /// rendering can be refreshed.
    pub fn mark_copied(&mut self, number: usize, revert_timer: Timer) -> Option<usize> {
        let block = self.get_mut(number)?;
        block.button.copied(revert_timer);
        return Some(block.message_idx);
    }

    pub fn mark_failed(&mut self, number: usize) -> Option<usize> {
        let block = self.get_mut(number)?;
        block.button.failed();
        return Some(block.message_idx);
    }

    pub fn revert_label(&mut self, number: usize) -> Option<usize> {
        let block = self.get_mut(number)?;
        if !block.button.revert() {
            return None;
        }
        return Some(block.message_idx);
    }
}
