// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Host-side training run.
//!
//! Loads `gng_configuration.toml`, reads a JSON sample file of `[[x, y], ...]`
//! pairs, trains a 40-node 2-D engine and streams graph snapshots as JSON
//! lines to stdout (or `--output`). A quality summary is logged at the end.

use std::collections::HashMap;
use std::env;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use gng::config::{load_config, validate_config, GngConfig};
use gng::metrics::evaluate;
use gng::observability::{debug_flags_help, init_logging, parse_debug_flags, LogFormat, LoggingConfig};
use gng::{CyclicSamples, GngEngine, JsonSnapshotWriter, Point2, SnapshotPolicy, TrainingLoop};

/// Compiled arena capacity; `[engine] max_nodes / max_edges` must agree.
const MAX_NODES: usize = 40;
const MAX_EDGES: usize = MAX_NODES * (MAX_NODES - 1) / 2;

struct Args {
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
    overrides: HashMap<String, String>,
}

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: gng_train [--config <path>] [--samples <path>] [--steps <n>] \
         [--output <path>] [--set <key>=<value>]...\n\n\
         Defaults:\n\
         - config: gng_configuration.toml (searched upward from the current directory)\n\
         - output: stdout\n\n{}",
        debug_flags_help()
    );
    process::exit(2);
}

fn parse_args() -> Args {
    let mut parsed = Args {
        config_path: None,
        output: None,
        overrides: HashMap::new(),
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                parsed.config_path = Some(PathBuf::from(v));
            }
            "--output" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                parsed.output = Some(PathBuf::from(v));
            }
            "--samples" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                parsed.overrides.insert("samples_path".to_string(), v);
            }
            "--steps" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                parsed.overrides.insert("max_steps".to_string(), v);
            }
            "--set" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                let Some((key, value)) = v.split_once('=') else {
                    eprintln!("Expected key=value after --set, got: {v}");
                    usage_and_exit();
                };
                parsed.overrides.insert(key.trim().to_string(), value.trim().to_string());
            }
            "-h" | "--help" => usage_and_exit(),
            other if other.starts_with("--debug-") => {}
            other => {
                eprintln!("Unknown argument: {other}");
                usage_and_exit();
            }
        }
    }

    parsed
}

/// Read `[[x, y], ...]` and convert to Q16.16, counting clamped points.
fn load_samples(path: &Path) -> Result<Vec<Point2>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read samples file {}", path.display()))?;
    let pairs: Vec<[f64; 2]> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse samples file {}", path.display()))?;
    if pairs.is_empty() {
        bail!("Samples file {} contains no samples", path.display());
    }

    let mut clamped = 0usize;
    let samples: Vec<Point2> = pairs
        .into_iter()
        .map(|axes| {
            let (point, saturated) = Point2::from_f64_checked(axes);
            if saturated {
                clamped += 1;
            }
            point
        })
        .collect();
    if clamped > 0 {
        warn!("{} of {} samples were clamped to the Q16.16 range", clamped, samples.len());
    }
    Ok(samples)
}

fn logging_config(config: &GngConfig) -> Result<LoggingConfig> {
    let format: LogFormat = config.logging.format.parse()?;
    Ok(LoggingConfig::new(&config.logging.level, format))
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    })
}

fn run() -> Result<()> {
    let args = parse_args();
    let debug_flags = parse_debug_flags();

    let config = load_config(args.config_path.as_deref(), Some(&args.overrides))
        .context("Failed to load configuration")?;
    validate_config(&config)?;
    init_logging(&debug_flags, &logging_config(&config)?)?;

    config.engine.check_capacity::<MAX_NODES, MAX_EDGES>()?;
    let params = config.engine.to_params::<2>()?;
    let engine = GngEngine::<MAX_NODES, MAX_EDGES, 2>::new(params)?;

    let samples = load_samples(&config.training.samples_path)?;
    info!(
        "Training on {} samples from {} for up to {} steps",
        samples.len(),
        config.training.samples_path.display(),
        config.training.max_steps
    );

    let policy = match config.snapshot.every_n_steps {
        0 => SnapshotPolicy::disabled(),
        n => SnapshotPolicy::every(n),
    };
    let mut writer = JsonSnapshotWriter::new(
        open_output(args.output.as_deref())?,
        config.snapshot.is_pretty(),
    );

    let mut training = TrainingLoop::new(engine, CyclicSamples::new(&samples), policy);
    let summary = training.run(config.training.max_steps, &mut writer);
    if let Some(err) = writer.take_error() {
        return Err(err).context("Failed to write snapshots");
    }

    let engine = training.into_engine();
    let counters = engine.counters();
    info!(
        "Finished {} steps: {} nodes, {} edges, {} insertions, {} edges pruned, {} nodes removed, {} snapshots",
        summary.steps,
        summary.final_active_nodes,
        summary.final_active_edges,
        counters.insertions,
        counters.edges_pruned,
        counters.nodes_removed,
        writer.written()
    );
    if counters.faults.total() > 0 {
        warn!("Soft faults during training: {:?}", counters.faults);
    }

    match evaluate(engine.arena(), &samples) {
        Some(report) => info!(
            "Quality: quantization error {:.5}, topological error {:.4}, utilization {:.4}, edge density {:.3}, {} bytes",
            report.quantization_error.to_f64(),
            report.topological_error.to_f64(),
            report.node_utilization.to_f64(),
            report.edge_density.to_f64(),
            report.memory_bytes
        ),
        None => warn!("Quality metrics unavailable: fewer than two active nodes"),
    }

    writer
        .into_inner()
        .flush()
        .context("Failed to flush snapshot output")?;
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("gng_train: {err:#}");
        process::exit(1);
    }
}
