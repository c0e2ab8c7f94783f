//! The cross-thread audio sample hand-off (§5): the APU pushes under a
//! mutex, the host's audio callback pops under the same mutex. Bounded,
//! drop-oldest on overflow.

use std::collections::VecDeque;

const CAPACITY: usize = 65_536;

#[derive(Debug)]
pub struct AudioBuffer {
    left: VecDeque<f32>,
    right: VecDeque<f32>,
}

impl AudioBuffer {
    pub fn new() -> Self {
        AudioBuffer {
            left: VecDeque::with_capacity(CAPACITY),
            right: VecDeque::with_capacity(CAPACITY),
        }
    }

    pub fn push(&mut self, left: f32, right: f32) {
        if self.left.len() >= CAPACITY {
            self.left.pop_front();
            self.right.pop_front();
        }
        self.left.push_back(left);
        self.right.push_back(right);
    }

    /// Drains up to `n` samples per channel, in push order.
    pub fn pull(&mut self, n: usize) -> (Vec<f32>, Vec<f32>) {
        let count = n.min(self.left.len());
        let left = self.left.drain(..count).collect();
        let right = self.right.drain(..count).collect();
        (left, right)
    }

    pub fn len(&self) -> usize {
        self.left.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_drops_oldest_sample() {
        let mut buf = AudioBuffer::new();
        for i in 0..(CAPACITY + 10) {
            buf.push(i as f32, -(i as f32));
        }
        assert_eq!(buf.len(), CAPACITY);
        let (left, _right) = buf.pull(1);
        assert_eq!(left[0], 10.0);
    }

    #[test]
    fn pull_drains_in_push_order() {
        let mut buf = AudioBuffer::new();
        buf.push(1.0, -1.0);
        buf.push(2.0, -2.0);
        let (left, right) = buf.pull(2);
        assert_eq!(left, vec![1.0, 2.0]);
        assert_eq!(right, vec![-1.0, -2.0]);
    }
}
