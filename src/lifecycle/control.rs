//! Control Queue Module
//!
//! The out-of-band message channel: commands arrive with a reply port
//! and are drained by one dedicated task, so each message is fully
//! handled (reply sent) before the next is looked at, in arrival
//! order.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::lifecycle::LifecycleManager;
use crate::models::{Ack, ControlCommand, ControlReply};

const QUEUE_DEPTH: usize = 16;

struct Envelope {
    command: ControlCommand,
    reply: oneshot::Sender<ControlReply>,
}

// == Control Handle ==
/// Sender side of the control queue.
#[derive(Clone)]
pub struct ControlHandle {
    tx: mpsc::Sender<Envelope>,
}

impl ControlHandle {
    /// Enqueues a command and awaits its reply.
    ///
    /// A torn-down queue answers with a failed acknowledgement instead
    /// of an error; the control channel never panics its callers.
    pub async fn dispatch(&self, command: ControlCommand) -> ControlReply {
        let (reply_tx, reply_rx) = oneshot::channel();
        let envelope = Envelope {
            command,
            reply: reply_tx,
        };

        if self.tx.send(envelope).await.is_err() {
            return ControlReply::Ack(Ack::failed("control queue is closed"));
        }
        reply_rx
            .await
            .unwrap_or_else(|_| ControlReply::Ack(Ack::failed("control queue dropped the reply")))
    }
}

// == Spawn Control Queue ==
/// Spawns the queue task for a manager.
///
/// Returns the handle commands are dispatched through and the task's
/// JoinHandle, which the server aborts during graceful shutdown.
pub fn spawn_control_queue(
    manager: Arc<LifecycleManager>,
) -> (ControlHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<Envelope>(QUEUE_DEPTH);

    let task = tokio::spawn(async move {
        info!(
            "Control queue started for generation {}",
            manager.generation().version()
        );

        while let Some(envelope) = rx.recv().await {
            debug!("Handling control message: {:?}", envelope.command);
            let reply = manager.handle_control(envelope.command).await;
            // A caller that gave up on its reply is not our problem.
            let _ = envelope.reply.send(reply);
        }
    });

    (ControlHandle { tx }, task)
}
