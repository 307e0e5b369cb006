//! Hand-off queue between the audio callback and the drain thread.
//!
//! A bounded crossbeam channel carries whole sample blocks across the
//! real-time boundary. The sender side never blocks: when the queue is full
//! the incoming block is dropped (drop-newest), so already-queued blocks keep
//! their arrival order. Drops are counted, not treated as errors; sustained
//! backpressure degrades waveform smoothness, nothing else.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Queue capacity in blocks. A handful of device callbacks of slack is
/// enough for the drain thread to be scheduled.
pub const HANDOFF_CAPACITY: usize = 8;

/// Sending half of the hand-off queue, owned by the audio callback.
#[derive(Clone)]
pub struct BlockSender {
    sender: Sender<Vec<f32>>,
    dropped: Arc<AtomicUsize>,
}

impl BlockSender {
    /// Enqueues a block without blocking. On a full queue the block is
    /// dropped and counted; on a disconnected queue it is discarded silently
    /// (the session is tearing down).
    pub fn send(&self, block: Vec<f32>) {
        if let Err(err) = self.sender.try_send(block) {
            match err {
                TrySendError::Full(_) => {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                }
                TrySendError::Disconnected(_) => {}
            }
        }
    }
}

/// Creates the hand-off queue. `dropped` is shared with the session so the
/// UI can surface the drop count.
pub fn handoff_channel(
    capacity: usize,
    dropped: Arc<AtomicUsize>,
) -> (BlockSender, Receiver<Vec<f32>>) {
    let (sender, receiver) = bounded(capacity.max(1));
    (BlockSender { sender, dropped }, receiver)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(capacity: usize) -> (BlockSender, Receiver<Vec<f32>>, Arc<AtomicUsize>) {
        let dropped = Arc::new(AtomicUsize::new(0));
        let (sender, receiver) = handoff_channel(capacity, dropped.clone());
        (sender, receiver, dropped)
    }

    #[test]
    fn full_queue_drops_newest_and_counts() {
        let (sender, receiver, dropped) = channel(2);

        sender.send(vec![1.0]);
        sender.send(vec![2.0]);
        sender.send(vec![3.0]); // queue full, dropped

        assert_eq!(dropped.load(Ordering::Relaxed), 1);
        assert_eq!(receiver.recv().unwrap(), vec![1.0]);
        assert_eq!(receiver.recv().unwrap(), vec![2.0]);
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn accepted_blocks_keep_arrival_order_across_drops() {
        let (sender, receiver, dropped) = channel(2);

        sender.send(vec![1.0]);
        sender.send(vec![2.0]);
        sender.send(vec![3.0]); // dropped
        assert_eq!(receiver.recv().unwrap(), vec![1.0]);
        sender.send(vec![4.0]);

        let drained: Vec<Vec<f32>> = receiver.try_iter().collect();
        assert_eq!(drained, vec![vec![2.0], vec![4.0]]);
        assert_eq!(dropped.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn disconnected_receiver_discards_without_counting() {
        let (sender, receiver, dropped) = channel(2);
        drop(receiver);

        sender.send(vec![1.0]);
        assert_eq!(dropped.load(Ordering::Relaxed), 0);
    }
}
