#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use super::Author;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MessageType {
    Normal,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: String,
    pub code: String,
}

#[derive(Clone, Debug)]
pub struct Message {
    pub author: Author,
    pub text: String,
    mtype: MessageType,
    rendered_at: usize,
}

pub fn is_fence(line: &str) -> bool {
    return line.trim_start().starts_with("```");
}

impl Message {
    pub fn new(author: Author, text: &str) -> Message {
        return Message {
            author,
            text: text.to_string(),
            mtype: MessageType::Normal,
            rendered_at: 0,
        };
    }

    pub fn new_with_type(author: Author, mtype: MessageType, text: &str) -> Message {
        return Message {
            author,
            text: text.to_string(),
            mtype,
            rendered_at: 0,
        };
    }

    pub fn message_type(&self) -> MessageType {
        return self.mtype;
    }

    /// Position in the chat history, assigned when the message is appended.
    pub fn rendered_at(&self) -> usize {
        return self.rendered_at;
    }

    pub fn set_rendered_at(&mut self, idx: usize) {
        self.rendered_at = idx;
    }

    /// Only used while a reply is still streaming in, before it's appended to
    /// the history.
    pub fn append(&mut self, text: &str) {
        self.text += text;
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    /// Fenced markdown code blocks in order of appearance. An unterminated
    /// block runs until the end of the message.
    pub fn codeblocks(&self) -> Vec<CodeBlock> {
        let mut codeblocks: Vec<CodeBlock> = vec![];
        let mut current: Option<(String, Vec<&str>)> = None;

        for line in self.text.lines() {
            if is_fence(line) {
                if let Some((language, lines)) = current.take() {
                    codeblocks.push(CodeBlock {
                        language,
                        code: lines.join("\n"),
                    });
                } else {
                    let language = line.trim().trim_start_matches('`').trim().to_string();
                    current = Some((language, vec![]));
                }
                continue;
            }

            if let Some((_, lines)) = current.as_mut() {
                lines.push(line);
            }
        }

        if let Some((language, lines)) = current {
            codeblocks.push(CodeBlock {
                language,
                code: lines.join("\n"),
            });
        }

        return codeblocks;
    }
}
