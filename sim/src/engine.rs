//! Event Loop
//!
//! Advances a logical clock from event to event: the next arrival or the
//! earliest worker departure, whichever comes first.

use report::{EventKind, SimulationReport, TraceEvent};
use tracing::{debug, info, trace};
use variates::{RandomVariateSource, ReferenceVariates};

use crate::config::{SimConfig, Variant};
use crate::error::Result;
use crate::policy::{AssignmentPolicy, CancellationPolicy};
use crate::queue::PendingQueue;
use crate::stats::StatisticsAccumulator;
use crate::worker::{Worker, WorkerPool};

/// Run state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    /// Horizon passed and the system emptied
    Drained,
}

/// Receives every engine event
pub trait EventSink {
    fn record(&mut self, event: TraceEvent);
}

/// Discards events
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _event: TraceEvent) {}
}

/// Keeps every event in order
#[derive(Debug, Clone, Default)]
pub struct TraceRecorder {
    pub events: Vec<TraceEvent>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for TraceRecorder {
    fn record(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

/// Worker pool simulator
pub struct Simulation<V: RandomVariateSource, S: EventSink = NullSink> {
    horizon: f64,
    clock: f64,
    next_arrival: f64,
    pool: WorkerPool,
    queue: PendingQueue,
    stats: StatisticsAccumulator,
    assignment: AssignmentPolicy,
    cancellation: Option<CancellationPolicy>,
    variates: V,
    sink: S,
    phase: Phase,
}

impl Simulation<ReferenceVariates> {
    /// Simulator drawing from the calibrated distributions, seeded from the
    /// config when it carries a seed
    pub fn with_reference_variates(config: &SimConfig) -> Result<Self> {
        let variates = match config.seed {
            Some(seed) => ReferenceVariates::seeded(seed)?,
            None => ReferenceVariates::from_entropy()?,
        };
        Self::new(config, variates)
    }
}

impl<V: RandomVariateSource> Simulation<V> {
    pub fn new(config: &SimConfig, variates: V) -> Result<Self> {
        config.validate()?;

        let cancellation = match config.variant {
            Variant::Basic => None,
            Variant::Extended => Some(CancellationPolicy::from_config(config)),
        };

        Ok(Self {
            horizon: config.horizon_ms(),
            clock: 0.0,
            // First request arrives at time zero
            next_arrival: 0.0,
            pool: WorkerPool::new(config.workers),
            queue: PendingQueue::new(),
            stats: StatisticsAccumulator::new(),
            assignment: AssignmentPolicy::from_config(config),
            cancellation,
            variates,
            sink: NullSink,
            phase: Phase::Running,
        })
    }
}

impl<V: RandomVariateSource, S: EventSink> Simulation<V, S> {
    /// Replace the event sink
    pub fn with_sink<T: EventSink>(self, sink: T) -> Simulation<V, T> {
        Simulation {
            horizon: self.horizon,
            clock: self.clock,
            next_arrival: self.next_arrival,
            pool: self.pool,
            queue: self.queue,
            stats: self.stats,
            assignment: self.assignment,
            cancellation: self.cancellation,
            variates: self.variates,
            sink,
            phase: self.phase,
        }
    }

    /// Step until drained and return the final statistics
    pub fn run(&mut self) -> SimulationReport {
        while self.step() == Phase::Running {}
        self.report()
    }

    /// Process at most one event
    pub fn step(&mut self) -> Phase {
        if self.phase == Phase::Drained {
            return Phase::Drained;
        }

        let (next_worker, next_departure) = self.pool.next_departure();
        if self.next_arrival < next_departure {
            self.arrive();
        } else if self.stats.requests_in_system > 0 {
            self.depart(next_worker);
        }

        if self.clock > self.horizon && self.next_arrival.is_finite() {
            debug!(time = self.clock, horizon = self.horizon, "horizon reached, closing admissions");
            self.next_arrival = f64::INFINITY;
        }
        if self.next_arrival.is_infinite() && self.stats.requests_in_system == 0 {
            self.phase = Phase::Drained;
            info!(
                time = self.clock,
                arrivals = self.stats.total_arrivals,
                penalized = self.stats.penalized_assignments,
                lost = self.stats.lost_requests,
                "simulation drained"
            );
        }

        self.phase
    }

    fn arrive(&mut self) {
        self.clock = self.next_arrival;
        self.stats.record_arrival(self.clock);
        self.next_arrival = self.clock + self.variates.next_interarrival_time();
        self.queue.push(self.clock);

        trace!(
            time = self.clock,
            in_system = self.stats.requests_in_system,
            total = self.stats.total_arrivals,
            next_arrival = self.next_arrival,
            "arrival"
        );
        self.emit(EventKind::Arrival, None, self.next_arrival, false);

        if self.stats.requests_in_system <= self.pool.len() as u64 {
            let i = self.pool.most_idle();
            self.stats.record_idle(self.clock - self.pool[i].idle_since);
            self.assign(i);
        }
    }

    fn depart(&mut self, i: usize) {
        self.clock = self.pool[i].next_departure;
        self.stats.record_departure(self.clock);

        let response_time = self.pool[i]
            .assigned_arrival
            .map_or(0.0, |arrival| self.clock - arrival);
        let lost = match &self.cancellation {
            Some(policy) => policy.abandons(response_time, &mut self.variates),
            None => false,
        };
        if lost {
            self.stats.record_lost();
        }
        self.pool[i].cpu_demand = 0.0;

        trace!(
            time = self.clock,
            worker = i,
            in_system = self.stats.requests_in_system,
            response_time,
            lost,
            "departure"
        );
        self.emit(EventKind::Departure, Some(i), response_time, lost);

        if self.stats.requests_in_system >= self.pool.len() as u64 && !self.queue.is_empty() {
            self.assign(i);
        } else {
            self.pool[i].release(self.clock);
        }
    }

    fn assign(&mut self, i: usize) {
        let cpu_demand = self.variates.next_cpu_demand();
        let service_time = self.variates.next_service_time();
        let arrival = self.queue.pop_oldest();

        let worker = &mut self.pool[i];
        worker.cpu_demand = cpu_demand;
        worker.service_time = service_time;
        worker.assigned_arrival = arrival;

        let decision = self.assignment.decide(self.pool.total_cpu_demand(), service_time);
        let completion = self.clock + decision.duration;
        self.pool[i].next_departure = completion;
        self.stats.record_service(decision.duration, decision.penalized);

        trace!(
            time = self.clock,
            worker = i,
            service_time,
            cpu_demand,
            penalized = decision.penalized,
            "assign"
        );
        self.emit(EventKind::Assign, Some(i), completion, decision.penalized);
    }

    fn emit(&mut self, kind: EventKind, worker: Option<usize>, value_ms: f64, flag: bool) {
        self.sink.record(TraceEvent {
            kind,
            time_ms: self.clock,
            worker,
            in_system: self.stats.requests_in_system,
            queued: self.queue.len(),
            value_ms,
            flag,
        });
    }

    /// Statistics snapshot at the current clock
    pub fn report(&self) -> SimulationReport {
        self.stats
            .finalize(self.clock, self.pool.len(), self.cancellation.is_some())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn next_arrival_time(&self) -> f64 {
        self.next_arrival
    }

    pub fn horizon_ms(&self) -> f64 {
        self.horizon
    }

    pub fn requests_in_system(&self) -> u64 {
        self.stats.requests_in_system
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    pub fn busy_workers(&self) -> usize {
        self.pool.busy_count()
    }

    pub fn workers(&self) -> &[Worker] {
        self.pool.as_slice()
    }

    pub fn stats(&self) -> &StatisticsAccumulator {
        &self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
