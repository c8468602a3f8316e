//! Random Variate Sources
//!
//! The draws that drive the worker pool simulation: request inter-arrival
//! times, service times, CPU demand, and the abandonment coin.

mod kappa4;

pub use kappa4::Kappa4;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Gamma};
use thiserror::Error;

/// Exponential inter-arrival scale (ms)
pub const INTERARRIVAL_SCALE_MS: f64 = 74.34144;

/// Kappa4 service-time parameters (ms)
pub const SERVICE_H: f64 = 1.0007386965056315;
pub const SERVICE_K: f64 = 1.0003493448869198;
pub const SERVICE_LOC: f64 = 0.6312614866274571;
pub const SERVICE_SCALE: f64 = 499.5433767462339;

/// Erlang CPU-demand parameters (MIPS)
pub const CPU_SHAPE: f64 = 2524468.3663236685;
pub const CPU_LOC: f64 = -4699.859387148292;
pub const CPU_SCALE: f64 = 0.001885497347450249;

#[derive(Debug, Error)]
pub enum VariateError {
    #[error("invalid {distribution} parameters: {reason}")]
    InvalidParameters {
        distribution: &'static str,
        reason: String,
    },
}

/// Source of the independent draws consumed by the simulation engine.
///
/// Each call returns one fresh sample; the engine never asks for a value it
/// does not use, so a scripted source replays a run exactly.
pub trait RandomVariateSource {
    /// Time until the next request arrives (ms)
    fn next_interarrival_time(&mut self) -> f64;

    /// Nominal duration of a request's job (ms)
    fn next_service_time(&mut self) -> f64;

    /// CPU requirement of a request's job (MIPS)
    fn next_cpu_demand(&mut self) -> f64;

    /// Uniform draw in [0, 1) for the abandonment decision
    fn next_cancellation_draw(&mut self) -> f64;
}

impl<S: RandomVariateSource + ?Sized> RandomVariateSource for &mut S {
    fn next_interarrival_time(&mut self) -> f64 {
        (**self).next_interarrival_time()
    }

    fn next_service_time(&mut self) -> f64 {
        (**self).next_service_time()
    }

    fn next_cpu_demand(&mut self) -> f64 {
        (**self).next_cpu_demand()
    }

    fn next_cancellation_draw(&mut self) -> f64 {
        (**self).next_cancellation_draw()
    }
}

/// Calibrated distributions fitted to the reference workload
#[derive(Debug, Clone)]
pub struct ReferenceVariates<R: Rng = StdRng> {
    interarrival: Exp<f64>,
    service: Kappa4,
    cpu: Gamma<f64>,
    rng: R,
}

impl ReferenceVariates<StdRng> {
    /// Deterministic source; the same seed yields the same draw sequence
    pub fn seeded(seed: u64) -> Result<Self, VariateError> {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Result<Self, VariateError> {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl<R: Rng> ReferenceVariates<R> {
    pub fn with_rng(rng: R) -> Result<Self, VariateError> {
        let interarrival = Exp::new(1.0 / INTERARRIVAL_SCALE_MS).map_err(|e| {
            VariateError::InvalidParameters {
                distribution: "exponential",
                reason: e.to_string(),
            }
        })?;
        let service = Kappa4::new(SERVICE_H, SERVICE_K, SERVICE_LOC, SERVICE_SCALE)?;
        let cpu = Gamma::new(CPU_SHAPE, CPU_SCALE).map_err(|e| VariateError::InvalidParameters {
            distribution: "erlang",
            reason: e.to_string(),
        })?;

        Ok(Self {
            interarrival,
            service,
            cpu,
            rng,
        })
    }
}

impl<R: Rng> RandomVariateSource for ReferenceVariates<R> {
    fn next_interarrival_time(&mut self) -> f64 {
        self.interarrival.sample(&mut self.rng)
    }

    fn next_service_time(&mut self) -> f64 {
        self.service.sample(&mut self.rng)
    }

    fn next_cpu_demand(&mut self) -> f64 {
        CPU_LOC + self.cpu.sample(&mut self.rng)
    }

    fn next_cancellation_draw(&mut self) -> f64 {
        self.rng.gen()
    }
}

/// One replayed stream of a scripted source
#[derive(Debug, Clone, Default)]
struct Script {
    values: Vec<f64>,
    cursor: usize,
    fallback: f64,
}

impl Script {
    fn new(values: Vec<f64>, fallback: f64) -> Self {
        Self {
            values,
            cursor: 0,
            fallback,
        }
    }

    fn next(&mut self) -> f64 {
        if self.values.is_empty() {
            return self.fallback;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

/// Deterministic source replaying fixed sequences.
///
/// Each stream cycles once exhausted. An empty stream returns its fallback:
/// `f64::INFINITY` for inter-arrival times (no further arrivals), `0.0` for
/// the others, and `1.0` for the cancellation draw (never abandons).
#[derive(Debug, Clone)]
pub struct ScriptedVariates {
    interarrival: Script,
    service: Script,
    cpu: Script,
    cancellation: Script,
}

impl ScriptedVariates {
    pub fn new(interarrival: Vec<f64>, service: Vec<f64>, cpu_demand: Vec<f64>) -> Self {
        Self {
            interarrival: Script::new(interarrival, f64::INFINITY),
            service: Script::new(service, 0.0),
            cpu: Script::new(cpu_demand, 0.0),
            cancellation: Script::new(Vec::new(), 1.0),
        }
    }

    pub fn with_cancellation_draws(mut self, draws: Vec<f64>) -> Self {
        self.cancellation = Script::new(draws, 1.0);
        self
    }

    /// Number of cancellation draws handed out so far
    pub fn cancellation_draws_used(&self) -> usize {
        self.cancellation.cursor
    }
}

impl RandomVariateSource for ScriptedVariates {
    fn next_interarrival_time(&mut self) -> f64 {
        self.interarrival.next()
    }

    fn next_service_time(&mut self) -> f64 {
        self.service.next()
    }

    fn next_cpu_demand(&mut self) -> f64 {
        self.cpu.next()
    }

    fn next_cancellation_draw(&mut self) -> f64 {
        self.cancellation.next()
    }
}
