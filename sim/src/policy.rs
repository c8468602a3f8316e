//! Assignment and cancellation policies

use variates::RandomVariateSource;

use crate::config::SimConfig;

/// Outcome of binding a job to a worker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignmentDecision {
    /// Time the job occupies the worker, penalty included (ms)
    pub duration: f64,
    pub penalized: bool,
}

/// CPU-threshold penalization.
///
/// The check is pool-wide: the demand of every busy worker, including the
/// one being assigned, is summed at assignment time. Running jobs are never
/// re-evaluated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignmentPolicy {
    cpu_threshold: f64,
    penalty: f64,
}

impl AssignmentPolicy {
    pub fn new(cpu_threshold: f64, penalty: f64) -> Self {
        Self {
            cpu_threshold,
            penalty,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.cpu_threshold_mips, config.penalty_ms)
    }

    pub fn decide(&self, total_cpu_demand: f64, service_time: f64) -> AssignmentDecision {
        if total_cpu_demand <= self.cpu_threshold {
            AssignmentDecision {
                duration: service_time,
                penalized: false,
            }
        } else {
            AssignmentDecision {
                duration: service_time + self.penalty,
                penalized: true,
            }
        }
    }
}

/// Probabilistic abandonment of slow requests.
///
/// Only labels the request as lost for statistics; its worker still runs the
/// job to completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CancellationPolicy {
    response_time_threshold: f64,
    probability: f64,
}

impl CancellationPolicy {
    pub fn new(response_time_threshold: f64, probability: f64) -> Self {
        Self {
            response_time_threshold,
            probability,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(
            config.response_time_threshold_ms,
            config.cancellation_probability,
        )
    }

    /// Draws only when the response time is over the threshold
    pub fn abandons<V: RandomVariateSource>(&self, response_time: f64, variates: &mut V) -> bool {
        if response_time <= self.response_time_threshold {
            return false;
        }
        variates.next_cancellation_draw() < self.probability
    }
}
