#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::clipboard::ClipboardService;
use crate::domain::models::Action;
use crate::domain::models::Author;
use crate::domain::models::BackendBox;
use crate::domain::models::ContextSourceBox;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::QUERY_TYPE_PRESETS;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /query [TYPE] - Lists the query types, or sets the query type sent with your next messages. Presets: {PRESETS}. Any other value is passed to the backend as is.
- /context [clear] - Opens or closes the Context Provider panel. With `clear`, stops attaching the selected file.
- /copy (/c) [CODE_BLOCK_NUMBER?] - Copies a code block to your clipboard. Without a number the last code block is copied.
- /quit /exit (/q) - Exit Chatbot.
- /help (/h) - Provides this help menu.

HOTKEYS:
- Enter - Send message
- CTRL+T - Cycle through query types
- CTRL+O - Add context, opens or closes the Context Provider panel
- CTRL+Y - Copy the last code block
- Up arrow - Scroll up, or move up the file list when the Context Provider is open
- Down arrow - Scroll down, or move down the file list when the Context Provider is open
- CTRL+U / Page up - Page up
- CTRL+D / Page down - Page down
- ESC - Close the Context Provider
- CTRL+C - Interrupt waiting for a response if in progress, otherwise exit.

CODE BLOCKS:
Each code block in the chat is numbered with a (NUMBER) next to its opening fence, followed by a [Copy] button. Copying flips the button to [Copied!] for a moment, or [Error] when the clipboard can't be reached.

CONTEXT:
Files in the context directory are listed in the Context Provider panel. Press Enter on a file to attach it, its name and content are then sent along with every message until cleared. Only one file is attached at a time.
        "#;

    return text
        .trim()
        .replace("{PRESETS}", &QUERY_TYPE_PRESETS.join(", "));
}

fn worker_error(id: u64, err: anyhow::Error, tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
    tx.send(Event::BackendFailed(
        id,
        Message::new_with_type(
            Author::System,
            MessageType::Error,
            &format!("The backend failed with the following error: {:?}", err),
        ),
    ))?;

    return Ok(());
}

fn context_error(err: anyhow::Error, tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
    tracing::warn!(error = ?err, "Context source failed");
    tx.send(Event::ContextFailed(format!(
        "Failed to load context files: {err}"
    )))?;

    return Ok(());
}

async fn context_list(
    context_source: &ContextSourceBox,
    tx: &mpsc::UnboundedSender<Event>,
) -> Result<()> {
    match context_source.list().await {
        Ok(files) => {
            tracing::debug!(count = files.len(), "Listed context files");
            tx.send(Event::ContextFilesListed(files))?;
        }
        Err(err) => context_error(err, tx)?,
    }

    return Ok(());
}

async fn context_load(
    context_source: &ContextSourceBox,
    name: &str,
    tx: &mpsc::UnboundedSender<Event>,
) -> Result<()> {
    match context_source.read(name).await {
        Ok(file) => {
            tx.send(Event::ContextFileLoaded(file))?;
        }
        Err(err) => context_error(err, tx)?,
    }

    return Ok(());
}

fn copy_code_block(number: usize, code: String, tx: &mpsc::UnboundedSender<Event>) {
    let worker_tx = tx.clone();
    tokio::spawn(async move {
        let res = ClipboardService::set(code)
            .await
            .map_err(|err| return err.to_string());
        if let Err(err) = &res {
            tracing::warn!(number, error = %err, "Failed to copy code block");
        }

        if worker_tx.send(Event::CodeBlockCopied(number, res)).is_err() {
            tracing::debug!(number, "Copy finished after the UI loop stopped");
        }
    });
}

/// Background side of the app. Everything that may block or fail on I/O
/// happens here, and results flow back to the UI loop as events.
pub struct ActionsService {}

impl ActionsService {
    pub async fn start(
        backend: BackendBox,
        context_source: ContextSourceBox,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        let backend = Arc::new(backend);

        // Lazy default.
        let mut worker: JoinHandle<Result<()>> = tokio::spawn(async {
            return Ok(());
        });

        while let Some(action) = rx.recv().await {
            match action {
                Action::BackendAbort() => {
                    tracing::debug!("Aborting backend request");
                    worker.abort();
                }
                Action::BackendRequest(prompt) => {
                    tracing::debug!(
                        id = prompt.id,
                        backend = %backend.name(),
                        query_type = %prompt.query_type,
                        context = ?prompt.context.as_ref().map(|e| return e.name.as_str()),
                        "Sending backend request"
                    );

                    // A new request replaces anything still running.
                    worker.abort();
                    let worker_tx = tx.clone();
                    let worker_backend = Arc::clone(&backend);
                    worker = tokio::spawn(async move {
                        let id = prompt.id;
                        let res = worker_backend.get_completion(prompt, &worker_tx).await;

                        if let Err(err) = res {
                            tracing::error!(id, error = ?err, "Backend request failed");
                            worker_error(id, err, &worker_tx)?;
                        }

                        return Ok(());
                    });
                }
                Action::ContextList() => {
                    context_list(&context_source, &tx).await?;
                }
                Action::ContextLoad(name) => {
                    context_load(&context_source, &name, &tx).await?;
                }
                Action::CopyCodeBlock(number, code) => {
                    copy_code_block(number, code, &tx);
                }
            }
        }

        worker.abort();
        return Ok(());
    }
}
