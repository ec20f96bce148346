use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::{Disposition, InboundMessage, MessageDispatcher};
use crate::store::CourtDataStore;

/// Messages buffered per worker before `submit` applies backpressure.
const QUEUE_DEPTH_PER_WORKER: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("consumer pool is shut down")]
    Closed,
}

struct Job {
    message: InboundMessage,
    reply: oneshot::Sender<Disposition>,
}

/// Fixed set of workers draining one inbound channel. Each message is handled to completion on
/// the blocking thread pool.
pub struct ConsumerPool {
    sender: mpsc::Sender<Job>,
    workers: Vec<JoinHandle<()>>,
}

impl ConsumerPool {
    pub fn start<S>(dispatcher: Arc<MessageDispatcher<S>>, workers: NonZeroUsize) -> Self
    where
        S: CourtDataStore + 'static,
    {
        let (sender, receiver) = mpsc::channel(workers.get() * QUEUE_DEPTH_PER_WORKER);
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..workers.get())
            .map(|worker| {
                let receiver = Arc::clone(&receiver);
                let dispatcher = Arc::clone(&dispatcher);
                tokio::spawn(run_worker(worker, receiver, dispatcher))
            })
            .collect();

        Self { sender, workers }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queues `message` and waits for its disposition.
    pub async fn submit(&self, message: InboundMessage) -> Result<Disposition, PoolError> {
        let (reply, disposition) = oneshot::channel();
        self.sender
            .send(Job { message, reply })
            .await
            .map_err(|_| PoolError::Closed)?;
        disposition.await.map_err(|_| PoolError::Closed)
    }

    /// Stops accepting messages and waits for in-flight ones to finish.
    pub async fn shutdown(self) {
        let Self { sender, workers } = self;
        drop(sender);
        for worker in workers {
            if let Err(err) = worker.await {
                error!(error = %err, "consumer worker terminated abnormally");
            }
        }
    }
}

async fn run_worker<S>(
    worker: usize,
    receiver: Arc<Mutex<mpsc::Receiver<Job>>>,
    dispatcher: Arc<MessageDispatcher<S>>,
) where
    S: CourtDataStore + 'static,
{
    loop {
        let job = receiver.lock().await.recv().await;
        let Some(Job { message, reply }) = job else {
            debug!(worker, "inbound channel closed, worker stopping");
            return;
        };

        let kind = message.kind;
        let dispatcher = Arc::clone(&dispatcher);
        let disposition =
            match tokio::task::spawn_blocking(move || dispatcher.handle(&message)).await {
                Ok(disposition) => disposition,
                Err(err) => {
                    error!(worker, queue = %kind, error = %err, "message handler panicked");
                    Disposition::Redeliver
                }
            };

        if reply.send(disposition).is_err() {
            debug!(worker, queue = %kind, "submitter went away before the disposition");
        }
    }
}
