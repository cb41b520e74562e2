/// Hazard analysis tool: runs the zonal aggregation for one hazard (or the
/// full set), prints the resulting table, and exports it as CSV.
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use hazex_core::{run_analysis, Hazard, PipelineConfig};

#[derive(Parser, Debug)]
#[command(
    name = "analyze",
    about = "Compute per-admin-region hazard exposure tables"
)]
struct Args {
    /// Pipeline config JSON (defaults to the conventional data layout)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Hazard to analyse (flood, earthquake, landslide, cyclone,
    /// coastal_erosion, deforestation)
    #[arg(long, conflicts_with = "all")]
    hazard: Option<String>,

    /// Run every hazard analysis in sequence
    #[arg(long)]
    all: bool,

    /// Skip writing the CSV export
    #[arg(long)]
    no_export: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    let hazards: Vec<Hazard> = if args.all {
        Hazard::ALL.to_vec()
    } else if let Some(name) = &args.hazard {
        vec![name.parse()?]
    } else {
        bail!("specify --hazard <name> or --all");
    };

    for hazard in hazards {
        let mut table =
            run_analysis(hazard, &config).with_context(|| format!("analysing {hazard}"))?;
        table.sort_rows();

        print!("{}", table.to_csv_string()?);

        if !args.no_export {
            let path = config.output_path(hazard);
            table
                .write_csv(&path)
                .with_context(|| format!("exporting {}", path.display()))?;
            eprintln!("{}", path.display());
        }
    }
    Ok(())
}
