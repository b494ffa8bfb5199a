use std::future::poll_fn;
use std::time::Duration;

use tokio_util::time::DelayQueue;

/// Timer queue for the `organizing -> organized` transition, keyed by record index.
#[derive(Debug)]
pub struct SettleQueue {
    delay: Duration,
    queue: DelayQueue<usize>,
}

impl SettleQueue {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            queue: DelayQueue::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `index` to settle one settle-delay from now.
    pub fn schedule(&mut self, index: usize) {
        self.queue.insert(index, self.delay);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Next index whose delay has elapsed. `None` once the queue is empty.
    pub async fn next_due(&mut self) -> Option<usize> {
        poll_fn(|cx| self.queue.poll_expired(cx))
            .await
            .map(|expired| expired.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_entries_fire_after_delay_in_schedule_order() {
        let mut queue = SettleQueue::new(Duration::from_millis(400));
        let start = Instant::now();

        queue.schedule(3);
        tokio::time::sleep(Duration::from_millis(100)).await;
        queue.schedule(1);
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.next_due().await, Some(3));
        let first = Instant::now() - start;
        assert!(first >= Duration::from_millis(400) && first < Duration::from_millis(450));

        assert_eq!(queue.next_due().await, Some(1));
        let second = Instant::now() - start;
        assert!(second >= Duration::from_millis(500) && second < Duration::from_millis(550));

        assert!(queue.is_empty());
        assert_eq!(queue.next_due().await, None);
    }
}
