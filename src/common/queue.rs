//! Broadcast queue used to stream action results to live consumers.

use std::sync::Arc;

use tokio::sync::broadcast;

/// Broadcast queue for one-to-many message distribution.
///
/// Every subscriber receives every message sent after it subscribed. Sending
/// with no subscriber is not an error: results are still kept in the run log.
/// Backed by tokio's broadcast channel; slow subscribers observe
/// `RecvError::Lagged` rather than blocking the engine.
#[derive(Clone)]
pub struct BroadcastQueue<T> {
    sender: Arc<broadcast::Sender<T>>,
}

impl<T: Clone> BroadcastQueue<T> {
    /// create a new broadcast queue
    pub fn new(cap: usize) -> Arc<Self> {
        let (tx, _) = broadcast::channel(cap.max(1));

        Arc::new(Self {
            sender: Arc::new(tx),
        })
    }

    /// Publish a message; returns how many subscribers it reached.
    pub fn send(
        &self,
        msg: T,
    ) -> usize {
        self.sender.send(msg).unwrap_or(0)
    }

    /// subscribe to the queue
    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_without_subscribers() {
        let queue = BroadcastQueue::<u8>::new(8);
        assert_eq!(queue.send(1), 0);
    }

    #[tokio::test]
    async fn test_every_subscriber_receives() {
        let queue = BroadcastQueue::<u8>::new(8);
        let mut a = queue.subscribe();
        let mut b = queue.subscribe();
        assert_eq!(queue.receiver_count(), 2);

        assert_eq!(queue.send(7), 2);
        assert_eq!(a.recv().await.unwrap(), 7);
        assert_eq!(b.recv().await.unwrap(), 7);
    }
}
