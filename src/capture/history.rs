//! Bounded history of downsampled samples for the scrolling waveform.
//!
//! A fixed-capacity ring indexed by a monotonically increasing write cursor.
//! Only the most recent `capacity` samples are retained; nothing ever reads
//! further back than the render window, so older history is discarded on
//! wrap. Appends and reads are whole-call atomic: the session wraps the
//! buffer in a `Mutex`, and the audio callback never touches it.

/// Ring buffer of the most recent `capacity` samples.
pub struct HistoryBuffer {
    samples: Box<[f32]>,
    /// Total samples appended since the last reset. Monotonic while a
    /// session is capturing; `cursor % capacity` is the next write slot.
    cursor: u64,
}

impl HistoryBuffer {
    /// Creates a buffer retaining the last `capacity` samples. `capacity`
    /// must be >= 1; it is validated at configuration load.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity >= 1);
        Self {
            samples: vec![0.0; capacity].into_boxed_slice(),
            cursor: 0,
        }
    }

    /// Appends a downsampled block, overwriting the oldest samples once the
    /// ring is full. Amortized O(block length).
    pub fn append(&mut self, block: &[f32]) {
        let capacity = self.samples.len();
        for &s in block {
            self.samples[(self.cursor % capacity as u64) as usize] = s;
            self.cursor += 1;
        }
    }

    /// Clears the buffer. Called exactly once per new capture session.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Total samples appended since the last reset.
    pub fn len(&self) -> u64 {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// Returns the last `min(len, max_count)` samples in arrival order.
    /// O(max_count) to materialize.
    pub fn visible(&self, max_count: usize) -> Vec<f32> {
        let capacity = self.samples.len() as u64;
        let retained = self.cursor.min(capacity);
        let count = retained.min(max_count as u64);

        let mut out = Vec::with_capacity(count as usize);
        let start = self.cursor - count;
        for i in start..self.cursor {
            out.push(self.samples[(i % capacity) as usize]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_preserve_arrival_order() {
        let mut history = HistoryBuffer::new(100);
        history.append(&[1.0, 2.0]);
        history.append(&[3.0]);
        history.append(&[4.0, 5.0, 6.0]);

        assert_eq!(history.len(), 6);
        assert_eq!(history.visible(100), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn visible_returns_tail_window() {
        let mut history = HistoryBuffer::new(100);
        let block: Vec<f32> = (0..10).map(|i| i as f32).collect();
        history.append(&block);

        assert_eq!(history.visible(4), vec![6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn ring_discards_oldest_beyond_capacity() {
        // 6000 samples into a 5000-slot ring: the window is indices 1000..
        let mut history = HistoryBuffer::new(5000);
        let block: Vec<f32> = (0..6000).map(|i| i as f32).collect();
        history.append(&block);

        assert_eq!(history.len(), 6000);
        let visible = history.visible(5000);
        assert_eq!(visible.len(), 5000);
        assert_eq!(visible[0], 1000.0);
        assert_eq!(*visible.last().unwrap(), 5999.0);
    }

    #[test]
    fn visible_spans_the_wrap_point() {
        let mut history = HistoryBuffer::new(4);
        history.append(&[1.0, 2.0, 3.0]);
        history.append(&[4.0, 5.0, 6.0]);

        assert_eq!(history.visible(4), vec![3.0, 4.0, 5.0, 6.0]);
        assert_eq!(history.visible(2), vec![5.0, 6.0]);
    }

    #[test]
    fn reset_empties_regardless_of_prior_contents() {
        let mut history = HistoryBuffer::new(8);
        history.append(&[1.0; 20]);
        history.reset();

        assert_eq!(history.len(), 0);
        assert!(history.visible(8).is_empty());
        assert!(history.visible(0).is_empty());
    }

    #[test]
    fn empty_buffer_has_no_visible_samples() {
        let history = HistoryBuffer::new(8);
        assert!(history.is_empty());
        assert!(history.visible(8).is_empty());
    }
}
