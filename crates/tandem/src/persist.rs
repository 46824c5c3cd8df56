//! History persistence: the trait the host's storage backend implements and
//! the queue that keeps concurrent writes in monotonic order.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use crate::models::message::Message;

#[async_trait]
pub trait HistoryPersister: Send + Sync {
    /// Store the full conversation. Fails by returning `Err`; the caller
    /// surfaces the failure to the user and moves on.
    async fn store(&self, messages: &[Message]) -> Result<()>;
}

#[derive(Default)]
struct SlotState {
    in_flight: bool,
    queued: Option<Vec<Message>>,
}

/// Serializes persistence calls through a single slot: at most one write is
/// in flight, and a request arriving while one is queued supersedes it. This
/// keeps write order monotonic even when channel updates arrive faster than
/// the backend can store them.
#[derive(Clone)]
pub struct PersistQueue {
    persister: Arc<dyn HistoryPersister>,
    state: Arc<Mutex<SlotState>>,
}

impl PersistQueue {
    pub fn new(persister: Arc<dyn HistoryPersister>) -> Self {
        PersistQueue {
            persister,
            state: Arc::new(Mutex::new(SlotState::default())),
        }
    }

    /// Store the given conversation, or park it for the in-flight write to
    /// pick up. Returns the error of any write this call performed itself;
    /// parked requests report success to their caller.
    pub async fn store(&self, messages: Vec<Message>) -> Result<()> {
        {
            let mut state = self.state.lock().unwrap();
            if state.in_flight {
                state.queued = Some(messages);
                return Ok(());
            }
            state.in_flight = true;
        }

        let mut next = Some(messages);
        while let Some(batch) = next {
            if let Err(error) = self.persister.store(&batch).await {
                let mut state = self.state.lock().unwrap();
                state.in_flight = false;
                state.queued = None;
                return Err(error);
            }
            let mut state = self.state.lock().unwrap();
            next = state.queued.take();
            if next.is_none() {
                state.in_flight = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::time::Duration;

    struct RecordingPersister {
        delay: Duration,
        batches: Mutex<Vec<Vec<Message>>>,
    }

    impl RecordingPersister {
        fn new(delay: Duration) -> Self {
            RecordingPersister {
                delay,
                batches: Mutex::new(Vec::new()),
            }
        }

        fn batch_lengths(&self) -> Vec<usize> {
            self.batches
                .lock()
                .unwrap()
                .iter()
                .map(|batch| batch.len())
                .collect()
        }
    }

    #[async_trait]
    impl HistoryPersister for RecordingPersister {
        async fn store(&self, messages: &[Message]) -> Result<()> {
            tokio::time::sleep(self.delay).await;
            self.batches.lock().unwrap().push(messages.to_vec());
            Ok(())
        }
    }

    struct FailingPersister;

    #[async_trait]
    impl HistoryPersister for FailingPersister {
        async fn store(&self, _messages: &[Message]) -> Result<()> {
            Err(anyhow!("disk full"))
        }
    }

    fn conversation(len: usize) -> Vec<Message> {
        (0..len).map(|i| Message::user(format!("m{}", i))).collect()
    }

    #[tokio::test]
    async fn test_sequential_stores_all_land() {
        let persister = Arc::new(RecordingPersister::new(Duration::ZERO));
        let queue = PersistQueue::new(Arc::clone(&persister) as Arc<dyn HistoryPersister>);

        queue.store(conversation(1)).await.unwrap();
        queue.store(conversation(2)).await.unwrap();

        assert_eq!(persister.batch_lengths(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_request_supersedes_parked_one() {
        let persister = Arc::new(RecordingPersister::new(Duration::from_millis(50)));
        let queue = PersistQueue::new(Arc::clone(&persister) as Arc<dyn HistoryPersister>);

        let first = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.store(conversation(1)).await })
        };
        tokio::task::yield_now().await;

        // Both arrive while the first write is in flight; only the newer
        // of the two should ever reach the backend.
        queue.store(conversation(2)).await.unwrap();
        queue.store(conversation(3)).await.unwrap();

        first.await.unwrap().unwrap();
        assert_eq!(persister.batch_lengths(), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_failure_clears_the_slot() {
        let queue = PersistQueue::new(Arc::new(FailingPersister));
        assert!(queue.store(conversation(1)).await.is_err());

        // The queue is usable again after a failed write.
        let persister = Arc::new(RecordingPersister::new(Duration::ZERO));
        let queue = PersistQueue::new(Arc::clone(&persister) as Arc<dyn HistoryPersister>);
        queue.store(conversation(1)).await.unwrap();
        assert_eq!(persister.batch_lengths(), vec![1]);
    }
}
