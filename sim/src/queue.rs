//! Pending request queue

use std::collections::VecDeque;

/// FIFO of arrival timestamps waiting for a worker
#[derive(Debug, Clone, Default)]
pub struct PendingQueue {
    arrivals: VecDeque<f64>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, arrival_time: f64) {
        self.arrivals.push_back(arrival_time);
    }

    /// Remove the oldest arrival
    pub fn pop_oldest(&mut self) -> Option<f64> {
        self.arrivals.pop_front()
    }

    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
    }
}
