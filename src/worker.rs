//! Command queue in front of a [`Conversation`].
//!
//! An interactive front end enqueues raw text and keeps running; a single
//! worker task drains the queue in order and sends each outcome back on an
//! event channel. One consumer means turns are appended in submission order.

use crate::conversation::{Conversation, ConversationTurn};
use crate::error::TurnError;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Outcome of one queued submission.
#[derive(Debug, Clone)]
pub enum TurnEvent {
    Recorded(ConversationTurn),
    /// Blank input, nothing recorded
    Ignored,
    /// Analysis failed, nothing recorded
    Failed(Arc<TurnError>),
}

#[derive(Clone)]
pub struct ConversationWorker {
    tx: mpsc::Sender<String>,
}

impl ConversationWorker {
    /// Start the worker task. Returns the submit handle, the event stream,
    /// and the task handle (which finishes once every handle is dropped).
    pub fn spawn(
        conversation: Arc<Conversation>,
        queue_size: usize,
    ) -> (Self, mpsc::Receiver<TurnEvent>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(queue_size.max(1));
        let (events_tx, events_rx) = mpsc::channel(queue_size.max(1));
        let handle = tokio::spawn(worker_loop(conversation, rx, events_tx));
        (Self { tx }, events_rx, handle)
    }

    /// Enqueue a message. Waits only if the queue is full.
    pub async fn submit(&self, text: String) -> Result<(), mpsc::error::SendError<String>> {
        self.tx.send(text).await
    }
}

async fn worker_loop(
    conversation: Arc<Conversation>,
    mut rx: mpsc::Receiver<String>,
    events: mpsc::Sender<TurnEvent>,
) {
    while let Some(text) = rx.recv().await {
        let event = match conversation.submit(&text).await {
            Ok(Some(turn)) => TurnEvent::Recorded(turn),
            Ok(None) => TurnEvent::Ignored,
            Err(e) => {
                error!("Submission failed: {}", e);
                TurnEvent::Failed(Arc::new(e))
            }
        };

        if events.send(event).await.is_err() {
            debug!("Event receiver dropped, stopping worker");
            break;
        }
    }
    debug!("Conversation worker stopped");
}
