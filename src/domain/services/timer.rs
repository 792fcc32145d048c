#[cfg(test)]
#[path = "timer_test.rs"]
mod tests;

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;

use crate::domain::models::Event;

/// Posts an event back to the UI loop once the duration elapses. The pending
/// event is cancelled when the timer is dropped, so whoever owns the timer
/// decides how long it may fire.
pub struct Timer {
    handle: JoinHandle<()>,
}

impl Timer {
    pub fn start(after: Duration, tx: mpsc::UnboundedSender<Event>, event: Event) -> Timer {
        let handle = tokio::spawn(async move {
            time::sleep(after).await;
            if tx.send(event).is_err() {
                tracing::debug!("Timer fired after the UI loop stopped");
            }
        });

        return Timer { handle };
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
