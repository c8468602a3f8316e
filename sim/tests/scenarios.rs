use poolsim::config::MS_PER_HOUR;
use poolsim::{EventKind, Phase, ScriptedVariates, SimConfig, Simulation, TraceRecorder, Variant};

fn config(workers: usize, cpu_threshold: f64, horizon_ms: f64, variant: Variant) -> SimConfig {
    SimConfig::new(workers, cpu_threshold, horizon_ms / MS_PER_HOUR).with_variant(variant)
}

/// CW=1, arrivals every 100 ms, 50 ms jobs, horizon admitting exactly three requests
fn three_requests(cpu_threshold: f64, cpu_demand: f64) -> Simulation<ScriptedVariates, TraceRecorder> {
    let variates = ScriptedVariates::new(vec![100.0], vec![50.0], vec![cpu_demand]);
    Simulation::new(&config(1, cpu_threshold, 220.0, Variant::Basic), variates)
        .unwrap()
        .with_sink(TraceRecorder::new())
}

#[test]
fn test_unsaturated_pool_has_no_wait_or_penalty() {
    let mut sim = three_requests(1000.0, 0.0);
    let report = sim.run();

    assert_eq!(report.total_arrivals, 3);
    assert_eq!(report.penalized_assignments, 0);
    assert_eq!(report.ppcmcpu, 0.0);
    assert_eq!(report.tper_ms, 0.0);
    assert_eq!(report.end_time_ms, 250.0);
    // Idle 0 + 50 + 50 ms over 250 ms
    assert!((report.pto_pct - 40.0).abs() < 1e-9);
    assert_eq!(report.ppp_pct, None);

    // Every request starts service the moment it arrives
    let events = &sim.sink().events;
    for pair in events.windows(2) {
        if pair[0].kind == EventKind::Arrival {
            assert_eq!(pair[1].kind, EventKind::Assign);
            assert_eq!(pair[1].time_ms, pair[0].time_ms);
        }
    }
}

#[test]
fn test_zero_threshold_penalizes_every_assignment() {
    let mut sim = three_requests(0.0, 5.0);
    let report = sim.run();

    assert_eq!(report.total_arrivals, 3);
    assert_eq!(report.penalized_assignments, 3);
    assert_eq!(report.ppcmcpu, 1.0);
    assert_eq!(report.tper_ms, 0.0);

    let completions: Vec<f64> = sim
        .sink()
        .events
        .iter()
        .filter(|e| e.kind == EventKind::Assign)
        .map(|e| {
            assert!(e.flag);
            e.value_ms - e.time_ms
        })
        .collect();
    assert_eq!(completions, vec![70.0, 70.0, 70.0]);
    assert_eq!(report.end_time_ms, 270.0);
}

#[test]
fn test_threshold_comparison_is_inclusive() {
    // Zero demand against a zero threshold does not exceed it
    let mut sim = three_requests(0.0, 0.0);
    assert_eq!(sim.run().penalized_assignments, 0);
}

fn slow_request(draw: f64) -> Simulation<ScriptedVariates> {
    let variates = ScriptedVariates::new(vec![1000.0], vec![600.0], vec![0.0])
        .with_cancellation_draws(vec![draw]);
    Simulation::new(&config(1, 1000.0, 100.0, Variant::Extended), variates).unwrap()
}

#[test]
fn test_slow_request_abandoned_on_low_draw() {
    let mut sim = slow_request(0.1);
    let report = sim.run();

    assert_eq!(report.total_arrivals, 1);
    assert_eq!(report.lost_requests, 1);
    assert_eq!(report.ppp_pct, Some(100.0));
    // The worker still ran the job to completion
    assert_eq!(report.end_time_ms, 600.0);
    assert!(sim.workers()[0].is_idle());
}

#[test]
fn test_slow_request_kept_on_high_draw() {
    let mut sim = slow_request(0.9);
    let report = sim.run();

    assert_eq!(report.lost_requests, 0);
    assert_eq!(report.ppp_pct, Some(0.0));
}

#[test]
fn test_fast_requests_consume_no_cancellation_draws() {
    let mut variates = ScriptedVariates::new(vec![100.0], vec![50.0], vec![0.0])
        .with_cancellation_draws(vec![0.0]);
    let report = Simulation::new(&config(1, 1000.0, 220.0, Variant::Extended), &mut variates)
        .unwrap()
        .run();

    assert_eq!(report.total_arrivals, 3);
    assert_eq!(report.lost_requests, 0);
    assert_eq!(variates.cancellation_draws_used(), 0);
}

#[test]
fn test_basic_variant_never_abandons() {
    let variates = ScriptedVariates::new(vec![1000.0], vec![600.0], vec![0.0])
        .with_cancellation_draws(vec![0.0]);
    let mut sim = Simulation::new(&config(1, 1000.0, 100.0, Variant::Basic), variates).unwrap();
    let report = sim.run();

    assert_eq!(report.lost_requests, 0);
    assert_eq!(report.ppp_pct, None);
}

#[test]
fn test_drains_only_after_horizon() {
    let mut sim = three_requests(1000.0, 0.0);

    // arrival 0, departure 50, arrival 100, departure 150, arrival 200
    for _ in 0..5 {
        assert_eq!(sim.step(), Phase::Running);
    }
    // System emptied at 50 and 150, but the horizon had not passed
    assert_eq!(sim.clock(), 200.0);

    // Departure at 250 crosses the horizon with an empty system
    assert_eq!(sim.step(), Phase::Drained);
    assert_eq!(sim.clock(), 250.0);
    assert_eq!(sim.requests_in_system(), 0);
    assert!(sim.next_arrival_time().is_infinite());

    // Further steps are no-ops
    assert_eq!(sim.step(), Phase::Drained);
    assert_eq!(sim.clock(), 250.0);
}

#[test]
fn test_in_flight_work_drains_after_horizon() {
    // Three back-to-back arrivals onto two workers with long jobs
    let variates = ScriptedVariates::new(vec![1.0, 1.0, 10_000.0], vec![100.0], vec![0.0]);
    let mut sim = Simulation::new(&config(2, 1000.0, 1.5, Variant::Basic), variates).unwrap();

    sim.step();
    sim.step();
    assert_eq!(sim.clock(), 1.0);
    sim.step();
    assert_eq!(sim.clock(), 2.0);
    assert_eq!(sim.pending_len(), 1);
    assert!(sim.next_arrival_time().is_infinite());
    assert_eq!(sim.phase(), Phase::Running);

    let report = sim.run();
    assert_eq!(report.total_arrivals, 3);
    // Third request waited from 2 until worker 0 freed at 100
    assert_eq!(report.end_time_ms, 200.0);
    assert!((report.tper_ms - 98.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_identical_draws_replay_identically() {
    let config = SimConfig::new(3, 150.0, 0.005).with_seed(99);

    let run = || {
        let mut sim = Simulation::with_reference_variates(&config)
            .unwrap()
            .with_sink(TraceRecorder::new());
        let report = sim.run();
        (report, sim.into_sink().events)
    };

    let (first_report, first_trace) = run();
    let (second_report, second_trace) = run();

    assert!(!first_trace.is_empty());
    assert_eq!(first_report, second_report);
    assert_eq!(first_trace, second_trace);
}
