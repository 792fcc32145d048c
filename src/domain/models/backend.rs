#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::sync::mpsc;

use super::Author;
use super::ContextFile;
use super::Event;
use super::QueryType;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum BackendName {
    Http,
    Mock,
}

impl BackendName {
    pub fn parse(text: &str) -> Option<BackendName> {
        return BackendName::iter().find(|e| return e.to_string() == text);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendPrompt {
    /// Sequence number of the request. Every response carries it back, so
    /// late replies to an abandoned request can be told apart.
    pub id: u64,
    pub text: String,
    pub query_type: QueryType,
    pub context: Option<ContextFile>,
}

impl BackendPrompt {
    pub fn new(text: &str, query_type: QueryType, context: Option<ContextFile>) -> BackendPrompt {
        return BackendPrompt {
            id: 0,
            text: text.to_string(),
            query_type,
            context,
        };
    }

    pub fn with_id(mut self, id: u64) -> BackendPrompt {
        self.id = id;
        return self;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendResponse {
    pub id: u64,
    pub author: Author,
    pub text: String,
    pub done: bool,
    /// The text replaces everything streamed so far instead of extending it.
    pub replace: bool,
}

impl BackendResponse {
    pub fn chunk(id: u64, text: &str) -> BackendResponse {
        return BackendResponse {
            id,
            author: Author::Bot,
            text: text.to_string(),
            done: false,
            replace: false,
        };
    }

    pub fn last(id: u64, text: &str) -> BackendResponse {
        return BackendResponse {
            id,
            author: Author::Bot,
            text: text.to_string(),
            done: true,
            replace: false,
        };
    }

    /// Final response carrying the whole reply, for backends that rewrite a
    /// streamed reply once it's complete.
    pub fn replacement(id: u64, text: &str) -> BackendResponse {
        return BackendResponse {
            id,
            author: Author::Bot,
            text: text.to_string(),
            done: true,
            replace: true,
        };
    }
}

#[async_trait]
pub trait Backend {
    fn name(&self) -> BackendName;

    /// Used at startup to verify the chat service can be reached.
    async fn health_check(&self) -> Result<()>;

    /// Requests a reply from the backend. Replies may be streamed back to the
    /// UI by sending each chunk through the channel.
    ///
    /// The last chunk sent always has `done` set, even when the backend
    /// answers in a single payload. Every chunk carries the prompt's `id`.
    async fn get_completion<'a>(
        &self,
        prompt: BackendPrompt,
        tx: &'a mpsc::UnboundedSender<Event>,
    ) -> Result<()>;
}

pub type BackendBox = Box<dyn Backend + Send + Sync>;
