use anyhow::{Context, Result};
use bacterio::persistence::{load_state, save_state, SnapshotFormat};
use bacterio::trace::{CsvTraceWriter, TraceRecord, TraceSink};
use bacterio::{generate_population, BacterioConfig, HexField, Simulation};
use clap::Parser;
use log::{debug, error, info, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Runs the bacteria/predator simulation without a display.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML config file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of ticks (overrides [run].max_steps)
    #[arg(short, long)]
    steps: Option<u64>,

    /// RNG seed for a reproducible run (overrides [run].seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Start from a saved state instead of generating one
    #[arg(long)]
    state: Option<PathBuf>,

    /// Save the final state here (.json, .bin or .msgpack)
    #[arg(long)]
    save_state: Option<PathBuf>,

    /// Write a CSV population trace named <PREFIX>_<timestamp>.csv
    #[arg(long, value_name = "PREFIX")]
    trace: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::init();
    run_with_args(args)
}

fn run_with_args(args: Args) -> Result<()> {
    info!("Starting bacterio...");

    // --- Load Configuration ---
    let config = match &args.config {
        Some(path) => BacterioConfig::load(path).with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => {
            info!("No config file given, using built-in defaults.");
            BacterioConfig::default()
        }
    };
    let params = config.get_sim_params();
    debug!("Simulation Parameters: {:#?}", params);

    let seed = args.seed.or(config.run.seed);
    let max_steps = args.steps.unwrap_or(config.run.max_steps as u64);
    let output_format = config
        .output
        .format
        .as_deref()
        .map(str::parse::<SnapshotFormat>)
        .transpose()?;

    // --- Initialize Simulation ---
    let sim = match args.state.as_ref().or(config.field.state_file.as_ref()) {
        Some(path) => {
            let snapshot = load_state(path, None)?;
            Simulation::from_snapshot(params, &snapshot)
                .with_context(|| format!("State file '{}' is inconsistent", path.display()))?
        }
        None => {
            let field = Arc::new(HexField::circle(config.field.radius));
            let mut rng = match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_os_rng(),
            };
            let population = generate_population(
                &field,
                config.field.init_bacteria,
                config.field.init_predators,
                params.pr_init_energy,
                &mut rng,
            );
            Simulation::new(params, field, population)?
        }
    };
    let mut sim = match seed {
        Some(s) => sim.with_seed(s),
        None => sim,
    };
    info!(
        "Field of {} cells with {} bacteria and {} predators.",
        sim.field().len(),
        sim.count_bacteria(),
        sim.count_predators()
    );

    // --- Trace ---
    let trace_prefix = args
        .trace
        .clone()
        .or_else(|| config.output.write_trace.then(|| config.output.trace_file_prefix.clone()));
    let mut field_settings = config.field.clone();
    if let Some(path) = &args.state {
        field_settings.state_file = Some(path.clone());
    }
    let mut sink = trace_prefix
        .map(|prefix| CsvTraceWriter::create(&prefix, &field_settings, sim.params()))
        .transpose()?;
    if let Some(sink) = sink.as_mut() {
        sink.record(&TraceRecord {
            step: 0,
            bacteria: sim.count_bacteria(),
            predators: sim.count_predators(),
        })?;
    }

    // --- Simulation Loop ---
    info!("Starting simulation loop for up to {} steps...", max_steps);
    let start_time = Instant::now();
    let mut previous_print_time = start_time;
    let print_interval_secs = 5.0;
    let mut sink_error = None;

    let outcome = sim.run(max_steps, |summary| {
        if let Some(sink) = sink.as_mut() {
            if let Err(e) = sink.record(&TraceRecord::from(summary)) {
                error!("Error writing trace at step {}: {}", summary.tick, e);
                sink_error = Some(e);
                return ControlFlow::Break(());
            }
        }
        let now = Instant::now();
        if now.duration_since(previous_print_time).as_secs_f64() >= print_interval_secs {
            info!(
                "Step [{}/{}] | Bacteria: {} | Predators: {} | Elapsed: {:.2} s",
                summary.tick,
                max_steps,
                summary.bacteria,
                summary.predators,
                start_time.elapsed().as_secs_f64()
            );
            previous_print_time = now;
        } else {
            trace!("Step [{}/{}] completed", summary.tick, max_steps);
        }
        ControlFlow::Continue(())
    });
    if let Some(e) = sink_error {
        return Err(e.context("Trace output failed"));
    }
    if let Some(sink) = sink.as_mut() {
        sink.finish()?;
    }
    info!(
        "Simulation finished after {} steps in {:.3} seconds: {}.",
        outcome.steps,
        start_time.elapsed().as_secs_f64(),
        outcome.halt
    );

    // --- Save Final State ---
    let state_path = args.save_state.clone().or_else(|| {
        config.output.save_final_state.then(|| {
            let format = output_format.unwrap_or_default();
            PathBuf::from(format!("{}.{}", config.output.state_output, format.extension()))
        })
    });
    match state_path {
        Some(path) => save_state(&path, &sim.snapshot(), output_format.filter(|_| args.save_state.is_none()))?,
        None => info!("Skipping saving final state."),
    }

    println!(
        "steps={} bacteria={} predators={} halt={:?}",
        outcome.steps,
        sim.count_bacteria(),
        sim.count_predators(),
        outcome.halt
    );
    Ok(())
}
