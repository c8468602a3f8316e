//! Statistics accumulator

use report::SimulationReport;

/// Running counters and sums of one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatisticsAccumulator {
    pub total_arrivals: u64,
    /// Requests in service or queued
    pub requests_in_system: u64,
    pub penalized_assignments: u64,
    pub lost_requests: u64,
    pub arrival_time_sum: f64,
    pub idle_time_sum: f64,
    pub departure_time_sum: f64,
    /// Service plus penalty actually consumed
    pub service_time_sum: f64,
}

impl StatisticsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_arrival(&mut self, time: f64) {
        self.arrival_time_sum += time;
        self.total_arrivals += 1;
        self.requests_in_system += 1;
    }

    pub fn record_departure(&mut self, time: f64) {
        self.departure_time_sum += time;
        self.requests_in_system -= 1;
    }

    pub fn record_idle(&mut self, interval: f64) {
        self.idle_time_sum += interval;
    }

    pub fn record_service(&mut self, duration: f64, penalized: bool) {
        self.service_time_sum += duration;
        if penalized {
            self.penalized_assignments += 1;
        }
    }

    pub fn record_lost(&mut self) {
        self.lost_requests += 1;
    }

    /// Final metrics at clock `end_time` for a pool of `workers`.
    ///
    /// Zero denominators yield zero metrics.
    pub fn finalize(&self, end_time: f64, workers: usize, with_abandonment: bool) -> SimulationReport {
        let n = self.total_arrivals as f64;
        let per_arrival = |x: f64| if self.total_arrivals > 0 { x / n } else { 0.0 };

        let tper_ms = per_arrival(self.departure_time_sum - self.arrival_time_sum - self.service_time_sum);
        let ppcmcpu = per_arrival(self.penalized_assignments as f64);
        let pto_pct = if end_time != 0.0 {
            (self.idle_time_sum * 100.0) / (end_time * workers as f64)
        } else {
            0.0
        };
        let ppp_pct = with_abandonment.then(|| per_arrival(self.lost_requests as f64) * 100.0);

        SimulationReport {
            tper_ms,
            ppcmcpu,
            pto_pct,
            ppp_pct,
            total_arrivals: self.total_arrivals,
            penalized_assignments: self.penalized_assignments,
            lost_requests: self.lost_requests,
            end_time_ms: end_time,
        }
    }
}
