//! Worker Pool Simulator
//!
//! Discrete-event simulation of a fixed pool of workers serving CPU-bound
//! requests. Estimates mean queueing delay, CPU-overload penalty rate, worker
//! idle percentage, and request abandonment.

pub mod config;
pub mod engine;
pub mod error;
pub mod policy;
pub mod queue;
pub mod stats;
pub mod worker;

pub use config::{SimConfig, Variant};
pub use engine::{EventSink, NullSink, Phase, Simulation, TraceRecorder};
pub use error::{Result, SimError};
pub use report::{EventKind, ReplicationSummary, SimulationReport, SweepRow, TraceEvent};
pub use variates::{RandomVariateSource, ReferenceVariates, ScriptedVariates};

/// Run one fresh simulation per seed
pub fn run_replications(config: &SimConfig, seeds: &[u64]) -> Result<Vec<SimulationReport>> {
    seeds
        .iter()
        .map(|&seed| -> Result<SimulationReport> {
            let mut sim = Simulation::new(config, ReferenceVariates::seeded(seed)?)?;
            Ok(sim.run())
        })
        .collect()
}
