use anyhow::Context;
use clap::Parser;
use generator::profile::{build_frame_pair, GeneratorConfig};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

use blinkcore::ephemeris::{filter_by_magnitude, load_catalog, OrbitalElements};

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Offline driver for the Rust blink-survey core")]
struct Args {
    /// Run one synthetic new/old pair through the full pipeline
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Orbital-element catalog for known-object suppression
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Write the observation report here instead of stdout
    #[arg(long)]
    report: Option<PathBuf>,
    #[arg(long, default_value_t = 256)]
    width: usize,
    #[arg(long, default_value_t = 256)]
    height: usize,
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

#[derive(Serialize)]
struct SurveySummary {
    name: String,
    dx: f64,
    dy: f64,
    peak_response: f64,
    low_confidence: bool,
    candidates: usize,
    known_matches: usize,
    report_records: usize,
}

fn load_elements(args: &Args, config: &WorkflowConfig) -> anyhow::Result<Vec<OrbitalElements>> {
    let path = match &args.catalog {
        Some(path) => path,
        None => return Ok(Vec::new()),
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading element catalog {}", path.display()))?;
    let load = load_catalog(&text);
    if !load.skipped.is_empty() {
        log::warn!(
            "catalog {}: skipped {} malformed lines",
            path.display(),
            load.skipped.len()
        );
    }
    Ok(filter_by_magnitude(&load.elements, config.limit_magnitude))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::default()
    };

    let catalog = load_elements(&args, &config)?;
    let runner = Runner::new(config, catalog);

    if args.offline {
        let generator_config = GeneratorConfig {
            width: args.width,
            height: args.height,
            seed: args.seed,
            ..Default::default()
        };
        let pair = build_frame_pair(&generator_config)?;
        let outcome = runner.execute(&pair)?;

        let summary = SurveySummary {
            name: outcome.name.clone(),
            dx: outcome.dx,
            dy: outcome.dy,
            peak_response: outcome.peak_response,
            low_confidence: outcome.low_confidence,
            candidates: outcome.candidates.len(),
            known_matches: outcome.known_matches,
            report_records: outcome.report.lines().count(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);

        if outcome.report.is_empty() {
            log::info!("no report records (no suspect designation configured or no candidates)");
        } else if let Some(path) = &args.report {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, format!("{}\n", outcome.report))
                .with_context(|| format!("writing report {}", path.display()))?;
        } else {
            println!("{}", outcome.report);
        }
    }

    Ok(())
}
