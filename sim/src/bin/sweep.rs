//! Worker Count Sweep
//!
//! Runs replications across a list of pool sizes for one CPU threshold and
//! horizon, writes every run as a CSV row, and prints the per-size means.

use clap::Parser;
use poolsim::{run_replications, ReplicationSummary, Result, SimConfig, SweepRow, Variant};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sweep", about = "Sweep worker counts for the pool simulator")]
struct Args {
    /// Pool sizes to simulate
    #[arg(long, value_delimiter = ',', default_value = "1,2,4,8,16,32")]
    workers: Vec<usize>,

    /// TMCPU [MIPS]
    #[arg(long)]
    cpu_threshold: f64,

    /// TF [hours]
    #[arg(long, default_value_t = 1.0)]
    hours: f64,

    #[arg(long, default_value_t = 5)]
    replications: usize,

    /// Seed of the first replication; replication r uses seed + r
    #[arg(long)]
    seed: Option<u64>,

    /// Drop the abandonment statistic
    #[arg(long)]
    basic: bool,

    /// CSV output file (stdout when absent)
    #[arg(long)]
    out: Option<PathBuf>,
}

fn run(args: Args) -> Result<()> {
    let base_seed = args.seed.unwrap_or_else(rand::random);
    let seeds: Vec<u64> = (0..args.replications as u64)
        .map(|r| base_seed.wrapping_add(r))
        .collect();
    let variant = if args.basic { Variant::Basic } else { Variant::Extended };

    tracing::info!(
        sizes = ?args.workers,
        replications = args.replications,
        base_seed,
        "starting sweep"
    );

    let mut rows = Vec::new();
    let mut summaries = Vec::new();
    for &workers in &args.workers {
        let config = SimConfig::new(workers, args.cpu_threshold, args.hours).with_variant(variant);
        let reports = run_replications(&config, &seeds)?;

        for (r, (report, &seed)) in reports.iter().zip(&seeds).enumerate() {
            rows.push(SweepRow::new(workers, r, seed, report));
        }
        summaries.push((workers, ReplicationSummary::from_reports(&reports)));
    }

    match &args.out {
        Some(path) => report::write_sweep_csv(BufWriter::new(File::create(path)?), &rows)?,
        None => report::write_sweep_csv(io::stdout().lock(), &rows)?,
    }

    // Table goes to stderr so stdout stays machine-readable
    eprintln!(
        "{:<10} {:>12} {:>12} {:>12} {:>12}",
        "Workers", "TPER (ms)", "PPCMCPU", "PTO (%)", "PPP (%)"
    );
    eprintln!("{:-<62}", "");
    for (workers, s) in &summaries {
        let ppp = s
            .mean_ppp_pct
            .map_or_else(|| "-".to_string(), |p| format!("{:.2}", p));
        eprintln!(
            "{:<10} {:>12.2} {:>12.4} {:>12.2} {:>12}",
            workers, s.mean_tper_ms, s.mean_ppcmcpu, s.mean_pto_pct, ppp
        );
    }

    if let Some((workers, best)) = summaries
        .iter()
        .min_by(|a, b| a.1.mean_tper_ms.total_cmp(&b.1.mean_tper_ms))
    {
        eprintln!("\nLowest mean TPER: {} workers ({:.2} ms)", workers, best.mean_tper_ms);
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
