//! Per-administrative-region hazard exposure metrics.
//!
//! Combines a gridded population raster with hazard rasters/vectors:
//! hazard rasters are regridded onto the population grid, thresholded into
//! binary exposure masks, multiplied by population, and aggregated per
//! administrative polygon via zonal statistics.
pub mod boundaries;
pub mod config;
pub mod error;
pub mod grid;
pub mod hazards;
pub mod io;
pub mod mask;
pub mod table;
pub mod zonal;

pub use boundaries::AdminBoundaries;
pub use config::PipelineConfig;
pub use error::{HazexError, Result};
pub use grid::Grid;
pub use hazards::{run_analysis, Hazard};
pub use table::ResultTable;
pub use zonal::{zonal_stats, ZonalAggregate};
