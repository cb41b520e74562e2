/// Hazard mask preparation tool: regrids each hazard raster onto the
/// population grid, thresholds it into a binary exposure mask, multiplies
/// by population, and writes the exposed-population raster to the prep
/// directory.
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use hazex_core::{mask, Hazard, PipelineConfig};

#[derive(Parser, Debug)]
#[command(
    name = "prepare",
    about = "Prepare exposed-population rasters for the mask hazards (flood, earthquake, landslide)"
)]
struct Args {
    /// Pipeline config JSON (defaults to the conventional data layout)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Restrict to one hazard instead of all three
    #[arg(long)]
    hazard: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    let hazards: Vec<Hazard> = match &args.hazard {
        Some(name) => {
            let hazard: Hazard = name.parse()?;
            anyhow::ensure!(
                hazard.uses_prepared_mask(),
                "{hazard} does not use a prepared mask (only flood, earthquake, landslide do)"
            );
            vec![hazard]
        }
        None => Hazard::MASKED.to_vec(),
    };

    for hazard in hazards {
        let path = mask::prepare_hazard(&config, hazard)
            .with_context(|| format!("preparing {hazard} mask"))?;
        eprintln!("{hazard} hazard prep completed -> {}", path.display());
    }
    eprintln!("Hazard mask preparation complete!");
    Ok(())
}
