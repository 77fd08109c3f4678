//! Command-line projectile tracker
//!
//! Reads a measurement CSV (`time,x,y` with a header row), runs the extended
//! Kalman filter over every sample, and writes one estimate row per step:
//! `time, px, py, vx, vy` followed by the covariance diagonal. Recoveries
//! (singular updates, NaN in the state) are logged and counted, never fatal.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use arctrack_core::filter::models::Projectile2d;
use arctrack_core::runner::{StepOutcome, Tracker};
use arctrack_core::stream::CsvStream;

#[derive(Parser, Debug)]
#[command(name = "arctrack", version, about = "Track a projectile from noisy position measurements")]
struct Args {
    /// Measurement CSV file (time,x,y with a header row)
    #[arg(short, long, default_value = "measurements.csv")]
    input: PathBuf,

    /// Write per-step estimates to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Echo each estimate to stdout
    #[arg(short, long)]
    verbose: bool,

    /// Quadratic drag coefficient (per metre); omit for drag-free flight
    #[arg(long)]
    drag: Option<f64>,

    /// Tick length in seconds
    #[arg(long, default_value_t = 0.1)]
    dt: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut model = Projectile2d::new();
    if let Some(drag) = args.drag {
        model = model.with_drag(drag);
    }

    let mut tracker = Tracker::new(model, Projectile2d::seed_config(args.dt), args.dt);

    let mut stream = CsvStream::<2>::open(&args.input)
        .map_err(|e| anyhow::anyhow!("opening {}: {}", args.input.display(), e))?
        .with_skip_lines(1);

    let mut writer = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            Some(BufWriter::new(file))
        }
        None => None,
    };

    let mut recoveries = 0u32;
    let mut rows = Vec::new();

    let processed = tracker
        .run(&mut stream, |outcome| match outcome {
            StepOutcome::Estimate(est) => {
                let row = format!(
                    "{:.2}, {:.2}, {:.2}, {:.2}, {:.2},    {:.4}, {:.4}, {:.4}, {:.4}",
                    est.time,
                    est.state[0],
                    est.state[1],
                    est.state[2],
                    est.state[3],
                    est.variances[0],
                    est.variances[1],
                    est.variances[2],
                    est.variances[3],
                );
                if args.verbose {
                    println!("{}", row);
                }
                rows.push(row);
            }
            StepOutcome::Recovered { .. } => {
                recoveries += 1;
            }
        })
        .map_err(|e| anyhow::anyhow!("reading {}: {}", args.input.display(), e))?;

    if let Some(writer) = writer.as_mut() {
        for row in &rows {
            writeln!(writer, "{}", row).context("writing estimates")?;
        }
        writer.flush().context("flushing estimates")?;
    }

    let stats = stream.stats();
    info!(
        "processed {} samples ({} lines, {} malformed), {} recoveries",
        processed, stats.lines_processed, stats.parse_errors, recoveries
    );

    if args.verbose {
        println!(
            "\n{} samples, {} recoveries, {} malformed lines skipped",
            processed, recoveries, stats.parse_errors
        );
    }

    Ok(())
}
