use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use rdtw_core::{Alignment, DistanceMethod, Dtw, Normalization, StepPattern, Window};
use rdtw_io::{AlignmentWriter, ExperimentName, MatrixReader};

#[derive(Parser)]
#[command(name = "rdtw")]
#[command(about = "Dynamic Time Warping alignment with configurable step patterns and windows")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,
}

/// Shared alignment parameters.
#[derive(Args, Debug, Clone)]
struct AlignArgs {
    /// Step pattern name (see `rdtw patterns`)
    #[arg(long, default_value = "symmetric2")]
    step_pattern: String,

    /// Window type: none, sakoechiba, itakura, or slantedband
    #[arg(long, default_value = "none")]
    window: String,

    /// Window size for sakoechiba and slantedband
    #[arg(long)]
    window_size: Option<usize>,

    /// Let the alignment end at any reference column
    #[arg(long, default_value_t = false)]
    open_end: bool,

    /// Let the alignment start at any reference column (requires an "N" pattern)
    #[arg(long, default_value_t = false)]
    open_begin: bool,

    /// Skip backtracking; report the distance only
    #[arg(long, default_value_t = false)]
    distance_only: bool,

    /// Input CSV files start with a header row
    #[arg(long, default_value_t = false)]
    headers: bool,

    /// Experiment name for the JSON artifact (must match [a-zA-Z0-9_-]+)
    #[arg(long)]
    experiment: Option<String>,

    /// Output directory for the JSON artifact
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Align a query sequence to a reference sequence
    Align {
        /// Path to the query CSV (one time step per row)
        #[arg(long)]
        query: PathBuf,

        /// Path to the reference CSV (one time step per row)
        #[arg(long)]
        reference: PathBuf,

        /// Local distance between time steps
        #[arg(long, default_value = "euclidean")]
        dist_method: String,

        #[command(flatten)]
        args: AlignArgs,
    },

    /// Align a precomputed query-by-reference local cost matrix
    Warp {
        /// Path to the local cost matrix CSV
        #[arg(long)]
        local_cost: PathBuf,

        #[command(flatten)]
        args: AlignArgs,
    },

    /// List predefined step patterns, or print one in detail
    Patterns {
        /// Pattern to print
        #[arg(long)]
        name: Option<String>,
    },
}

// --- Stdout summary structs ---

#[derive(Serialize)]
struct AlignOutput {
    experiment: Option<String>,
    step_pattern: String,
    window: String,
    distance: f64,
    normalized_distance: Option<f64>,
    query_len: usize,
    reference_len: usize,
    end_column: usize,
    path_length: Option<usize>,
    artifact: Option<PathBuf>,
}

#[derive(Serialize)]
struct PatternEntry {
    name: &'static str,
    hint: Normalization,
    n_transitions: usize,
}

fn build_config(args: &AlignArgs) -> Result<Dtw> {
    let step_pattern = StepPattern::named(&args.step_pattern)
        .with_context(|| format!("invalid --step-pattern {}", args.step_pattern))?;
    let window = Window::from_name(&args.window, args.window_size)
        .with_context(|| format!("invalid --window {}", args.window))?;
    Ok(Dtw::new()
        .with_step_pattern(step_pattern)
        .with_window(window)
        .with_open_end(args.open_end)
        .with_open_begin(args.open_begin)
        .with_distance_only(args.distance_only))
}

/// Write the artifact when an experiment is given, then print the summary.
fn report(alignment: &Alignment, dtw: &Dtw, args: &AlignArgs) -> Result<()> {
    let artifact = match &args.experiment {
        Some(experiment) => {
            let experiment_name = ExperimentName::new(experiment.clone())?;
            let writer = AlignmentWriter::new(&args.output_dir, experiment_name)?;
            Some(writer.write(alignment, &args.step_pattern)?)
        }
        None => None,
    };

    let output = AlignOutput {
        experiment: args.experiment.clone(),
        step_pattern: args.step_pattern.clone(),
        window: dtw.window().to_string(),
        distance: alignment.distance,
        normalized_distance: alignment.normalized_distance,
        query_len: alignment.query_len,
        reference_len: alignment.reference_len,
        end_column: alignment.end_column,
        path_length: alignment.path.as_ref().map(|p| p.len()),
        artifact,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Align {
            query,
            reference,
            dist_method,
            args,
        } => {
            let method: DistanceMethod = dist_method
                .parse()
                .with_context(|| format!("invalid --dist-method {dist_method}"))?;
            let dtw = build_config(&args)?.with_distance_method(method);

            // 1. Read sequences
            let query_seq = MatrixReader::new(&query)
                .with_headers(args.headers)
                .read_sequence()
                .context("failed to read query CSV")?;
            let reference_seq = MatrixReader::new(&reference)
                .with_headers(args.headers)
                .read_sequence()
                .context("failed to read reference CSV")?;
            info!(
                query_len = query_seq.len(),
                reference_len = reference_seq.len(),
                n_features = query_seq.n_features(),
                "sequences loaded"
            );

            // 2. Align
            let alignment = dtw
                .align(&query_seq, &reference_seq)
                .context("alignment failed")?;

            // 3. Write artifact and summary
            report(&alignment, &dtw, &args)?;
        }

        Command::Warp { local_cost, args } => {
            let dtw = build_config(&args)?;

            let local = MatrixReader::new(&local_cost)
                .with_headers(args.headers)
                .read_local_cost()
                .context("failed to read local cost CSV")?;
            info!(
                n_rows = local.n_rows(),
                n_cols = local.n_cols(),
                "local cost matrix loaded"
            );

            let alignment = dtw
                .align_local_cost(&local)
                .context("alignment failed")?;

            report(&alignment, &dtw, &args)?;
        }

        Command::Patterns { name } => match name {
            Some(name) => {
                let pattern = StepPattern::named(&name)?;
                println!("{pattern}");
            }
            None => {
                let entries = StepPattern::names()
                    .map(|name| {
                        StepPattern::named(name).map(|p| PatternEntry {
                            name,
                            hint: p.hint(),
                            n_transitions: p.n_patterns(),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                println!("{}", serde_json::to_string_pretty(&entries)?);
            }
        },
    }

    Ok(())
}
