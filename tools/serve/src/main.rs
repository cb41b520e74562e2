/// Visualisation service: a thin HTTP API over the exported hazard tables
/// and the population raster. Boundaries and the population grid are loaded
/// once at startup; hazard tables are served from the CSV exports written
/// by the analyze tool.
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use clap::Parser;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hazex_core::io::{geotiff, vector};
use hazex_core::{AdminBoundaries, Grid, PipelineConfig};

mod routes;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PipelineConfig>,
    pub boundaries: Arc<AdminBoundaries>,
    pub population: Arc<Grid>,
}

#[derive(Parser, Debug)]
#[command(name = "serve", about = "Hazard exposure visualisation service")]
struct Args {
    /// Pipeline config JSON (defaults to the conventional data layout)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen port (HAZEX_PORT overrides)
    #[arg(short, long, default_value = "8000")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "serve=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    let boundaries = vector::read_admin_boundaries(&config.admin_boundaries)
        .context("loading admin boundaries")?;
    let mut population =
        geotiff::read_geotiff(&config.population_raster).context("loading population raster")?;
    if population.nodata.is_none() {
        population.nodata = Some(config.population_nodata);
    }
    tracing::info!(
        zones = boundaries.len(),
        width = population.width,
        height = population.height,
        "inputs loaded"
    );

    let state = AppState {
        config: Arc::new(config),
        boundaries: Arc::new(boundaries),
        population: Arc::new(population),
    };

    let app = Router::new()
        .route("/health", get(routes::health))
        .route("/countries/", get(routes::country_list))
        .route("/population/", get(routes::population_totals))
        .route("/:country/hazard/:hazard/:admin_level/", get(routes::hazard_table))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let port = std::env::var("HAZEX_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(args.port);
    let addr = format!("0.0.0.0:{port}");
    tracing::info!("visualisation service listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
