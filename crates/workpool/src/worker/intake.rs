//! Rendezvous hand-off between submitters and executors
//!
//! The channel buffer holds a single envelope, and a submitter does not return
//! until an executor acknowledged it. From the caller's point of view this is
//! an unbuffered hand-off: `submit` completes only once a task is in an
//! executor's hands.
//!
//! Executors share the receiving half behind an async mutex. Only the
//! executor currently holding the lock waits on `recv()`; the others wait
//! for the lock.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, Mutex};
use uuid::Uuid;

use crate::task::Task;

/// A task in transit plus the acknowledgement the submitter waits on
pub(crate) struct Envelope {
    pub(crate) task_id: Uuid,
    pub(crate) task: Box<dyn Task>,
    accepted: oneshot::Sender<()>,
}

impl Envelope {
    /// Tell the submitter an executor took the task
    pub(crate) fn accept(self) -> (Uuid, Box<dyn Task>) {
        // The submitter may have been dropped mid-await; the task still runs.
        let _ = self.accepted.send(());
        (self.task_id, self.task)
    }
}

/// Why a hand-off did not complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HandOffError {
    /// Every receiver is gone; the task was not delivered
    Closed,
}

/// Submitting half of the intake
#[derive(Clone)]
pub(crate) struct IntakeSender {
    tx: mpsc::Sender<Envelope>,
}

impl IntakeSender {
    /// Hand `task` to an executor, waiting until one accepts it
    pub(crate) async fn hand_off(
        &self,
        task_id: Uuid,
        task: Box<dyn Task>,
    ) -> Result<(), HandOffError> {
        let (accepted, ack) = oneshot::channel();
        let envelope = Envelope {
            task_id,
            task,
            accepted,
        };

        self.tx
            .send(envelope)
            .await
            .map_err(|_| HandOffError::Closed)?;

        // Dropped without an ack only if every executor went away while the
        // envelope sat in the buffer.
        ack.await.map_err(|_| HandOffError::Closed)
    }
}

/// Receiving half of the intake, shared by all executors
#[derive(Clone)]
pub(crate) struct IntakeReceiver {
    rx: Arc<Mutex<mpsc::Receiver<Envelope>>>,
}

impl IntakeReceiver {
    /// Wait for the next envelope
    ///
    /// Returns `None` once every sender is dropped and the buffer is empty.
    pub(crate) async fn next(&self) -> Option<Envelope> {
        let mut rx = self.rx.lock().await;
        rx.recv().await
    }
}

/// Create a rendezvous intake
pub(crate) fn intake() -> (IntakeSender, IntakeReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (
        IntakeSender { tx },
        IntakeReceiver {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::task_fn;
    use std::time::Duration;

    fn noop() -> Box<dyn Task> {
        Box::new(task_fn("noop", || async { Ok(()) }))
    }

    #[tokio::test]
    async fn test_hand_off_waits_for_acceptance() {
        let (tx, rx) = intake();

        let submit = tokio::spawn(async move { tx.hand_off(Uuid::now_v7(), noop()).await });

        // Envelope is buffered but not yet accepted
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!submit.is_finished());

        let envelope = rx.next().await.unwrap();
        let (_, task) = envelope.accept();
        assert_eq!(task.name(), "noop");

        assert_eq!(submit.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn test_next_returns_none_when_senders_dropped() {
        let (tx, rx) = intake();
        drop(tx);
        assert!(rx.next().await.is_none());
    }

    #[tokio::test]
    async fn test_hand_off_fails_without_receivers() {
        let (tx, rx) = intake();
        drop(rx);

        let result = tx.hand_off(Uuid::now_v7(), noop()).await;
        assert_eq!(result, Err(HandOffError::Closed));
    }

    #[tokio::test]
    async fn test_hand_off_fails_when_envelope_dropped() {
        let (tx, rx) = intake();

        let submit = tokio::spawn(async move { tx.hand_off(Uuid::now_v7(), noop()).await });

        // Receive and drop without accepting
        let envelope = rx.next().await.unwrap();
        drop(envelope);

        assert_eq!(submit.await.unwrap(), Err(HandOffError::Closed));
    }
}
