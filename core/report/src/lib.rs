//! Simulation Report Schema
//!
//! Output records of a worker pool run: the final statistics snapshot, the
//! per-event trace, and sweep tables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;

/// Final statistics of one drained run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Mean per-request non-service wait
    #[serde(rename = "TPER (ms)")]
    pub tper_ms: f64,
    /// Fraction of assignments penalized for CPU overload
    #[serde(rename = "PPCMCPU")]
    pub ppcmcpu: f64,
    /// Pool-wide idle time percentage
    #[serde(rename = "PTO (%)")]
    pub pto_pct: f64,
    /// Percentage of requests abandoned (extended variant only)
    #[serde(rename = "PPP (%)", default, skip_serializing_if = "Option::is_none")]
    pub ppp_pct: Option<f64>,
    pub total_arrivals: u64,
    pub penalized_assignments: u64,
    pub lost_requests: u64,
    pub end_time_ms: f64,
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Average queue time (TPER): {:.2} ms", self.tper_ms)?;
        writeln!(f, "Penalty rate (PPCMCPU): {:.2}%", self.ppcmcpu * 100.0)?;
        write!(f, "CPU idle percentage (PTO): {:.2}%", self.pto_pct)?;
        if let Some(ppp) = self.ppp_pct {
            write!(f, "\nAbandoned requests (PPP): {:.2}%", ppp)?;
        }
        Ok(())
    }
}

/// Kind of simulation event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Arrival,
    Assign,
    Departure,
}

/// One engine event, flat for CSV export.
///
/// `value_ms` is the next arrival time for arrivals, the scheduled completion
/// for assignments, and the response time for departures. `flag` marks a
/// penalized assignment or an abandoned departure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub kind: EventKind,
    pub time_ms: f64,
    pub worker: Option<usize>,
    pub in_system: u64,
    pub queued: usize,
    pub value_ms: f64,
    pub flag: bool,
}

/// Mean of each metric over several replications
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplicationSummary {
    pub replications: usize,
    pub mean_tper_ms: f64,
    pub mean_ppcmcpu: f64,
    pub mean_pto_pct: f64,
    pub mean_ppp_pct: Option<f64>,
}

impl ReplicationSummary {
    pub fn from_reports(reports: &[SimulationReport]) -> Self {
        let n = reports.len();
        let mean = |f: fn(&SimulationReport) -> f64| {
            if n == 0 {
                0.0
            } else {
                reports.iter().map(f).sum::<f64>() / n as f64
            }
        };

        // PPP only when every replication reported it
        let ppp: Option<Vec<f64>> = reports.iter().map(|r| r.ppp_pct).collect();
        let mean_ppp_pct = match ppp {
            Some(values) if !values.is_empty() => {
                Some(values.iter().sum::<f64>() / values.len() as f64)
            }
            _ => None,
        };

        Self {
            replications: n,
            mean_tper_ms: mean(|r| r.tper_ms),
            mean_ppcmcpu: mean(|r| r.ppcmcpu),
            mean_pto_pct: mean(|r| r.pto_pct),
            mean_ppp_pct,
        }
    }
}

/// Row of a worker-count sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    pub workers: usize,
    pub replication: usize,
    pub seed: u64,
    pub tper_ms: f64,
    pub ppcmcpu: f64,
    pub pto_pct: f64,
    pub ppp_pct: Option<f64>,
    pub total_arrivals: u64,
}

impl SweepRow {
    pub fn new(workers: usize, replication: usize, seed: u64, report: &SimulationReport) -> Self {
        Self {
            workers,
            replication,
            seed,
            tper_ms: report.tper_ms,
            ppcmcpu: report.ppcmcpu,
            pto_pct: report.pto_pct,
            ppp_pct: report.ppp_pct,
            total_arrivals: report.total_arrivals,
        }
    }
}

pub fn write_report_json<W: io::Write>(writer: W, report: &SimulationReport) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, report)
}

pub fn write_trace_csv<W: io::Write>(writer: W, events: &[TraceEvent]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for event in events {
        wtr.serialize(event)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_sweep_csv<W: io::Write>(writer: W, rows: &[SweepRow]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(ppp_pct: Option<f64>) -> SimulationReport {
        SimulationReport {
            tper_ms: 12.5,
            ppcmcpu: 0.25,
            pto_pct: 40.0,
            ppp_pct,
            total_arrivals: 4,
            penalized_assignments: 1,
            lost_requests: 0,
            end_time_ms: 250.0,
        }
    }

    #[test]
    fn test_report_json_keys() {
        let json = serde_json::to_value(report(Some(5.0))).unwrap();
        assert_eq!(json["TPER (ms)"], 12.5);
        assert_eq!(json["PPCMCPU"], 0.25);
        assert_eq!(json["PTO (%)"], 40.0);
        assert_eq!(json["PPP (%)"], 5.0);

        let basic = serde_json::to_value(report(None)).unwrap();
        assert!(basic.get("PPP (%)").is_none());
    }

    #[test]
    fn test_report_display() {
        let text = report(None).to_string();
        assert!(text.contains("Average queue time (TPER): 12.50 ms"));
        assert!(text.contains("Penalty rate (PPCMCPU): 25.00%"));
        assert!(!text.contains("PPP"));
        assert!(report(Some(1.0)).to_string().contains("Abandoned requests (PPP): 1.00%"));
    }

    #[test]
    fn test_summary_means() {
        let mut second = report(Some(15.0));
        second.tper_ms = 7.5;
        let summary = ReplicationSummary::from_reports(&[report(Some(5.0)), second]);

        assert_eq!(summary.replications, 2);
        assert_eq!(summary.mean_tper_ms, 10.0);
        assert_eq!(summary.mean_ppp_pct, Some(10.0));

        let empty = ReplicationSummary::from_reports(&[]);
        assert_eq!(empty.mean_tper_ms, 0.0);
        assert_eq!(empty.mean_ppp_pct, None);
    }

    #[test]
    fn test_trace_csv() {
        let events = [
            TraceEvent {
                kind: EventKind::Arrival,
                time_ms: 0.0,
                worker: None,
                in_system: 1,
                queued: 1,
                value_ms: 100.0,
                flag: false,
            },
            TraceEvent {
                kind: EventKind::Assign,
                time_ms: 0.0,
                worker: Some(0),
                in_system: 1,
                queued: 0,
                value_ms: 50.0,
                flag: true,
            },
        ];

        let mut buf = Vec::new();
        write_trace_csv(&mut buf, &events).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some("kind,time_ms,worker,in_system,queued,value_ms,flag")
        );
        assert_eq!(lines.next(), Some("arrival,0.0,,1,1,100.0,false"));
        assert_eq!(lines.next(), Some("assign,0.0,0,1,0,50.0,true"));
    }
}
