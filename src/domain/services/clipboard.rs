use anyhow::anyhow;
use anyhow::Result;
use once_cell::sync::OnceCell;
use tokio::sync::mpsc;
use tokio::sync::oneshot;

type ClipboardRequest = (String, oneshot::Sender<Result<()>>);

static SENDER: OnceCell<mpsc::UnboundedSender<ClipboardRequest>> = OnceCell::new();

/// Owns the system clipboard for the lifetime of the app. Writes are queued
/// through a channel so that the clipboard handle is only touched from a
/// single task.
pub struct ClipboardService {}

impl ClipboardService {
    pub async fn start() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<ClipboardRequest>();
        if SENDER.set(tx).is_err() {
            return Err(anyhow!("Clipboard service is already running."));
        }

        // Failing to reach the clipboard isn't fatal, every copy reports the
        // error instead.
        let mut clipboard = arboard::Clipboard::new().map_err(|err| {
            tracing::warn!(error = ?err, "Clipboard is unavailable");
            return err;
        });

        while let Some((text, reply)) = rx.recv().await {
            let res = match clipboard.as_mut() {
                Ok(clipboard) => clipboard.set_text(text).map_err(anyhow::Error::from),
                Err(err) => Err(anyhow!("Clipboard is unavailable: {err}")),
            };

            if reply.send(res).is_err() {
                tracing::debug!("Clipboard result dropped before it was read");
            }
        }

        return Ok(());
    }

    pub async fn set(text: String) -> Result<()> {
        let Some(tx) = SENDER.get() else {
            return Err(anyhow!("Clipboard service is not initialized."));
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send((text, reply_tx))
            .map_err(|_| return anyhow!("Clipboard service has stopped."))?;

        return reply_rx.await?;
    }
}
