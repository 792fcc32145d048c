#[cfg(test)]
#[path = "mock_test.rs"]
mod tests;

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::BackendPrompt;
use crate::domain::models::BackendResponse;
use crate::domain::models::Event;

pub const MOCK_REPLIES: [&str; 4] = [
    "This is a mock response.",
    "Hello from the mock LLM!",
    "Test response: everything is working.",
    "[MOCK] LLM output.",
];

const CODE_SAMPLE: &str = r#"Here is an example:

```python
def greet(name):
    print(f"Hello, {name}!")
```"#;

/// Offline backend with canned replies, rotated on every request.
pub struct Mock {
    delay: Duration,
    counter: AtomicUsize,
}

impl Default for Mock {
    fn default() -> Mock {
        return Mock {
            delay: Duration::from_millis(Config::get_millis(ConfigKey::MockDelay)),
            counter: AtomicUsize::new(0),
        };
    }
}

impl Mock {
    fn reply_for(&self, prompt: &BackendPrompt) -> String {
        let idx = self.counter.fetch_add(1, Ordering::Relaxed) % MOCK_REPLIES.len();
        let mut reply = MOCK_REPLIES[idx].to_string();

        if let Some(context) = &prompt.context {
            reply = format!("{reply} (context: {})", context.name);
        }

        if prompt.query_type.as_str() == "code" {
            reply = format!("{reply}\n\n{CODE_SAMPLE}");
        }

        return reply;
    }
}

#[async_trait]
impl Backend for Mock {
    fn name(&self) -> BackendName {
        return BackendName::Mock;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn get_completion<'a>(
        &self,
        prompt: BackendPrompt,
        tx: &'a mpsc::UnboundedSender<Event>,
    ) -> Result<()> {
        let reply = self.reply_for(&prompt);
        time::sleep(self.delay).await;

        let words = reply.split_inclusive(' ').collect::<Vec<&str>>();
        for (idx, word) in words.iter().enumerate() {
            if idx == words.len() - 1 {
                tx.send(Event::BackendPromptResponse(BackendResponse::last(
                    prompt.id, word,
                )))?;
            } else {
                tx.send(Event::BackendPromptResponse(BackendResponse::chunk(
                    prompt.id, word,
                )))?;
                time::sleep(Duration::from_millis(20)).await;
            }
        }

        return Ok(());
    }
}
