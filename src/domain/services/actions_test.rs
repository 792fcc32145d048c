use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::help_text;
use super::ActionsService;
use crate::domain::models::Action;
use crate::domain::models::Author;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::BackendPrompt;
use crate::domain::models::BackendResponse;
use crate::domain::models::ContextFile;
use crate::domain::models::ContextSource;
use crate::domain::models::Event;
use crate::domain::models::MessageType;
use crate::domain::models::QueryType;

struct EchoBackend {
    fail: bool,
}

#[async_trait]
impl Backend for EchoBackend {
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
        if self.fail {
            bail!("Connection refused");
        }

        tx.send(Event::BackendPromptResponse(BackendResponse::chunk(
            prompt.id,
            "You said: ",
        )))?;
        tx.send(Event::BackendPromptResponse(BackendResponse::last(
            prompt.id,
            &prompt.text,
        )))?;

        return Ok(());
    }
}

struct MemoryFiles {}

#[async_trait]
impl ContextSource for MemoryFiles {
    #[allow(clippy::implicit_return)]
    async fn list(&self) -> Result<Vec<String>> {
        return Ok(vec!["notes.md".to_string(), "todo.txt".to_string()]);
    }

    #[allow(clippy::implicit_return)]
    async fn read(&self, name: &str) -> Result<ContextFile> {
        if name != "notes.md" {
            bail!("{name} is not a file in the context directory");
        }

        return Ok(ContextFile::new(name, "Remember the milk"));
    }
}

struct Harness {
    action_tx: mpsc::UnboundedSender<Action>,
    event_rx: mpsc::UnboundedReceiver<Event>,
    service: JoinHandle<Result<()>>,
}

fn start(fail: bool) -> Harness {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    let service = tokio::spawn(async move {
        return ActionsService::start(
            Box::new(EchoBackend { fail }),
            Box::new(MemoryFiles {}),
            event_tx,
            &mut action_rx,
        )
        .await;
    });

    return Harness {
        action_tx,
        event_rx,
        service,
    };
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<Event>) -> Result<Event> {
    match rx.recv().await {
        Some(event) => return Ok(event),
        None => bail!("Event channel closed"),
    }
}

#[test]
fn it_lists_presets_in_help() {
    let text = help_text();
    assert!(text.contains("Presets: qa, technical, code, report."));
    assert!(!text.contains("{PRESETS}"));
}

#[tokio::test]
async fn it_streams_backend_replies() -> Result<()> {
    let mut h = start(false);
    h.action_tx.send(Action::BackendRequest(
        BackendPrompt::new("Hello", QueryType::default(), None).with_id(4),
    ))?;

    match next_event(&mut h.event_rx).await? {
        Event::BackendPromptResponse(res) => {
            assert_eq!(res, BackendResponse::chunk(4, "You said: "));
        }
        _ => bail!("Expected a response chunk"),
    }
    match next_event(&mut h.event_rx).await? {
        Event::BackendPromptResponse(res) => {
            assert_eq!(res, BackendResponse::last(4, "Hello"));
        }
        _ => bail!("Expected the last response chunk"),
    }

    drop(h.action_tx);
    h.service.await??;
    return Ok(());
}

#[tokio::test]
async fn it_reports_backend_failures() -> Result<()> {
    let mut h = start(true);
    h.action_tx.send(Action::BackendRequest(
        BackendPrompt::new("Hello", QueryType::default(), None).with_id(9),
    ))?;

    match next_event(&mut h.event_rx).await? {
        Event::BackendFailed(id, message) => {
            assert_eq!(id, 9);
            assert_eq!(message.author, Author::System);
            assert_eq!(message.message_type(), MessageType::Error);
            assert!(message
                .text
                .starts_with("The backend failed with the following error: Connection refused"));
        }
        _ => bail!("Expected an error message"),
    }

    return Ok(());
}

#[tokio::test]
async fn it_lists_and_loads_context_files() -> Result<()> {
    let mut h = start(false);

    h.action_tx.send(Action::ContextList())?;
    match next_event(&mut h.event_rx).await? {
        Event::ContextFilesListed(files) => {
            assert_eq!(files, vec!["notes.md", "todo.txt"]);
        }
        _ => bail!("Expected a file listing"),
    }

    h.action_tx.send(Action::ContextLoad("notes.md".to_string()))?;
    match next_event(&mut h.event_rx).await? {
        Event::ContextFileLoaded(file) => {
            assert_eq!(file, ContextFile::new("notes.md", "Remember the milk"));
        }
        _ => bail!("Expected a loaded file"),
    }

    return Ok(());
}

#[tokio::test]
async fn it_reports_context_failures() -> Result<()> {
    let mut h = start(false);

    h.action_tx.send(Action::ContextLoad("../secrets".to_string()))?;
    match next_event(&mut h.event_rx).await? {
        Event::ContextFailed(text) => {
            assert_eq!(
                text,
                "Failed to load context files: ../secrets is not a file in the context directory"
            );
        }
        _ => bail!("Expected a context failure"),
    }

    return Ok(());
}

#[tokio::test]
async fn it_reports_copy_failures_without_a_clipboard() -> Result<()> {
    let mut h = start(false);

    h.action_tx
        .send(Action::CopyCodeBlock(2, "print(1)".to_string()))?;
    match next_event(&mut h.event_rx).await? {
        Event::CodeBlockCopied(number, res) => {
            assert_eq!(number, 2);
            assert_eq!(
                res,
                Err("Clipboard service is not initialized.".to_string())
            );
        }
        _ => bail!("Expected a copy result"),
    }

    return Ok(());
}
