//! Worker slots

use std::ops::{Index, IndexMut};

/// Departure sentinel of an idle worker
pub const IDLE: f64 = f64::INFINITY;

/// Worker state
#[derive(Debug, Clone, PartialEq)]
pub struct Worker {
    pub id: usize,
    /// Completion time of the current job, `IDLE` when idle
    pub next_departure: f64,
    pub idle_since: f64,
    pub cpu_demand: f64,
    pub service_time: f64,
    /// Arrival time of the request in service
    pub assigned_arrival: Option<f64>,
}

impl Worker {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            next_departure: IDLE,
            idle_since: 0.0,
            cpu_demand: 0.0,
            service_time: 0.0,
            assigned_arrival: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.next_departure == IDLE
    }

    /// Mark idle at `now`
    pub fn release(&mut self, now: f64) {
        self.next_departure = IDLE;
        self.idle_since = now;
        self.assigned_arrival = None;
    }
}

/// Fixed set of `CW` workers.
///
/// Selection is a linear scan keeping the first index on ties, so the run is
/// reproducible for a given draw sequence.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    workers: Vec<Worker>,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        Self {
            workers: (0..size).map(Worker::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn as_slice(&self) -> &[Worker] {
        &self.workers
    }

    /// Worker with the earliest departure, and that departure
    pub fn next_departure(&self) -> (usize, f64) {
        let mut best = (0, self.workers[0].next_departure);
        for (i, w) in self.workers.iter().enumerate().skip(1) {
            if w.next_departure < best.1 {
                best = (i, w.next_departure);
            }
        }
        best
    }

    /// Worker with the latest departure.
    ///
    /// Idle workers all hold the `IDLE` sentinel, so when one exists this is
    /// the lowest-indexed idle worker rather than the longest idle one.
    pub fn most_idle(&self) -> usize {
        let mut best = (0, self.workers[0].next_departure);
        for (i, w) in self.workers.iter().enumerate().skip(1) {
            if w.next_departure > best.1 {
                best = (i, w.next_departure);
            }
        }
        best.0
    }

    pub fn total_cpu_demand(&self) -> f64 {
        self.workers.iter().map(|w| w.cpu_demand).sum()
    }

    pub fn busy_count(&self) -> usize {
        self.workers.iter().filter(|w| !w.is_idle()).count()
    }
}

impl Index<usize> for WorkerPool {
    type Output = Worker;

    fn index(&self, i: usize) -> &Worker {
        &self.workers[i]
    }
}

impl IndexMut<usize> for WorkerPool {
    fn index_mut(&mut self, i: usize) -> &mut Worker {
        &mut self.workers[i]
    }
}
