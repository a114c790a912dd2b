use std::collections::VecDeque;

/// FIFO of pending receiver samples.
///
/// Windows are copied out from the front and consumed explicitly; retention
/// trimming drops the oldest samples first. Backed by a `VecDeque` so both
/// ends are amortized O(1).
#[derive(Debug, Default, Clone)]
pub struct SampleBuffer {
    samples: VecDeque<f32>,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn extend(&mut self, samples: &[f32]) {
        self.samples.extend(samples.iter().copied());
    }

    /// Copy `len` samples starting `offset` samples from the front.
    /// Returns `None` if the buffer does not hold them yet.
    pub fn window(&self, offset: usize, len: usize) -> Option<Vec<f32>> {
        if offset + len > self.samples.len() {
            return None;
        }
        Some(self.samples.range(offset..offset + len).copied().collect())
    }

    /// Drop up to `count` samples from the front
    pub fn consume(&mut self, count: usize) {
        let count = count.min(self.samples.len());
        self.samples.drain(..count);
    }

    /// Once the buffer holds more than `limit` samples, keep only the
    /// newest `retain`. Returns the number of samples dropped.
    pub fn trim(&mut self, limit: usize, retain: usize) -> usize {
        if self.samples.len() <= limit {
            return 0;
        }
        let dropped = self.samples.len() - retain.min(self.samples.len());
        self.consume(dropped);
        dropped
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
