use std::sync::atomic::AtomicUsize;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::Mock;
use super::MOCK_REPLIES;
use crate::domain::models::Backend;
use crate::domain::models::BackendPrompt;
use crate::domain::models::ContextFile;
use crate::domain::models::Event;
use crate::domain::models::QueryType;

impl Mock {
    fn with_delay(delay: Duration) -> Mock {
        return Mock {
            delay,
            counter: AtomicUsize::new(0),
        };
    }
}

async fn collect_reply(rx: &mut mpsc::UnboundedReceiver<Event>) -> Result<String> {
    let mut text = String::new();
    loop {
        match rx.recv().await {
            Some(Event::BackendPromptResponse(res)) => {
                text.push_str(&res.text);
                if res.done {
                    return Ok(text);
                }
            }
            _ => bail!("Wrong type from recv"),
        }
    }
}

#[tokio::test]
async fn it_health_checks() {
    assert!(Mock::with_delay(Duration::ZERO).health_check().await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn it_waits_before_replying() -> Result<()> {
    let backend = Mock::with_delay(Duration::from_millis(1500));
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let start = Instant::now();

    backend
        .get_completion(BackendPrompt::new("Hi", QueryType::default(), None), &tx)
        .await?;

    assert!(start.elapsed() >= Duration::from_millis(1500));
    assert_eq!(collect_reply(&mut rx).await?, MOCK_REPLIES[0]);

    return Ok(());
}

#[tokio::test(start_paused = true)]
async fn it_streams_word_by_word() -> Result<()> {
    let backend = Mock::with_delay(Duration::ZERO);
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();

    let prompt = BackendPrompt::new("Hi", QueryType::default(), None).with_id(5);
    backend.get_completion(prompt, &tx).await?;

    let mut chunks = vec![];
    while let Ok(Event::BackendPromptResponse(res)) = rx.try_recv() {
        assert_eq!(res.id, 5);
        chunks.push((res.text, res.done));
    }

    assert_eq!(
        chunks,
        vec![
            ("This ".to_string(), false),
            ("is ".to_string(), false),
            ("a ".to_string(), false),
            ("mock ".to_string(), false),
            ("response.".to_string(), true),
        ]
    );

    return Ok(());
}

#[tokio::test(start_paused = true)]
async fn it_rotates_replies() -> Result<()> {
    let backend = Mock::with_delay(Duration::ZERO);
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();

    for expected in MOCK_REPLIES.iter().chain(MOCK_REPLIES.iter().take(1)) {
        backend
            .get_completion(BackendPrompt::new("Hi", QueryType::default(), None), &tx)
            .await?;
        assert_eq!(collect_reply(&mut rx).await?, *expected);
    }

    return Ok(());
}

#[tokio::test(start_paused = true)]
async fn it_replies_with_code_and_context() -> Result<()> {
    let backend = Mock::with_delay(Duration::ZERO);
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let prompt = BackendPrompt::new(
        "Write a greeting",
        QueryType::new("code"),
        Some(ContextFile::new("notes.md", "Remember the milk")),
    );

    backend.get_completion(prompt, &tx).await?;

    insta::assert_snapshot!(collect_reply(&mut rx).await?, @r###"
    This is a mock response. (context: notes.md)

    Here is an example:

    ```python
    def greet(name):
        print(f"Hello, {name}!")
    ```
    "###);

    return Ok(());
}
