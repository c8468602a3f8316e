//! Single simulation run
//!
//! Reads CW, TMCPU and TF from the command line, a JSON config, or
//! interactive prompts, runs the pool to drain, and prints the statistics.

use clap::{Parser, ValueEnum};
use poolsim::{Result, SimConfig, SimError, Simulation, TraceRecorder, Variant};
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "poolsim", about = "Worker pool discrete-event simulator")]
struct Args {
    /// JSON config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Max concurrent CPU jobs (CW) [workers]
    #[arg(long)]
    workers: Option<usize>,

    /// Max aggregate CPU usage before penalty (TMCPU) [MIPS]
    #[arg(long)]
    cpu_threshold: Option<f64>,

    /// Simulation end time (TF) [hours]
    #[arg(long)]
    hours: Option<f64>,

    /// Engine variant
    #[arg(long, value_parser = parse_variant)]
    variant: Option<Variant>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value = "text")]
    format: Format,

    /// Write the event trace as CSV
    #[arg(long)]
    trace: Option<PathBuf>,
}

fn parse_variant(s: &str) -> std::result::Result<Variant, String> {
    match s {
        "basic" => Ok(Variant::Basic),
        "extended" => Ok(Variant::Extended),
        _ => Err(format!("unknown variant '{}' (expected basic or extended)", s)),
    }
}

fn prompt<T: FromStr>(label: &str) -> Result<T> {
    let stdin = io::stdin();
    loop {
        print!("{}: ", label);
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Err(SimError::InvalidConfig(format!("no value given for {}", label)));
        }
        match line.trim().parse() {
            Ok(value) => return Ok(value),
            Err(_) => eprintln!("Invalid value '{}', try again", line.trim()),
        }
    }
}

fn build_config(args: &Args) -> Result<SimConfig> {
    let (mut config, from_file) = match &args.config {
        Some(path) => (SimConfig::from_json_file(path)?, true),
        None => (SimConfig::default(), false),
    };

    let interactive = !from_file
        && (args.workers.is_none() || args.cpu_threshold.is_none() || args.hours.is_none());
    if interactive {
        println!("=== SIMULATION CONFIGURATION ===");
    }

    config.workers = match args.workers {
        Some(v) => v,
        None if !from_file => prompt("Enter CW (Max concurrent CPU jobs) [units: workers]")?,
        None => config.workers,
    };
    config.cpu_threshold_mips = match args.cpu_threshold {
        Some(v) => v,
        None if !from_file => prompt("Enter TMCPU (Max CPU usage before penalty) [units: MIPS]")?,
        None => config.cpu_threshold_mips,
    };
    config.horizon_hours = match args.hours {
        Some(v) => v,
        None if !from_file => prompt("Enter TF (Simulation end time) [units: hours]")?,
        None => config.horizon_hours,
    };
    if let Some(variant) = args.variant {
        config.variant = variant;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    config.validate()?;
    Ok(config)
}

fn run(args: Args) -> Result<()> {
    let config = build_config(&args)?;
    tracing::info!(
        workers = config.workers,
        cpu_threshold = config.cpu_threshold_mips,
        hours = config.horizon_hours,
        variant = ?config.variant,
        seed = ?config.seed,
        "starting simulation"
    );

    let sim = Simulation::with_reference_variates(&config)?;
    let results = match &args.trace {
        Some(path) => {
            let mut sim = sim.with_sink(TraceRecorder::new());
            let results = sim.run();
            let events = &sim.sink().events;
            report::write_trace_csv(BufWriter::new(File::create(path)?), events)?;
            tracing::info!(path = %path.display(), events = events.len(), "trace written");
            results
        }
        None => {
            let mut sim = sim;
            sim.run()
        }
    };

    match args.format {
        Format::Text => {
            println!("\n=== SIMULATION RESULTS ===");
            println!("{}", results);
        }
        Format::Json => {
            report::write_report_json(io::stdout().lock(), &results)?;
            println!();
        }
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
