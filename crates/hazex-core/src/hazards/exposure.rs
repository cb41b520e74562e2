//! Population exposure for the raster-mask hazards (flood, earthquake,
//! landslide): zonal sums of the exposed-population and total-population
//! rasters, plus their ratio.
use crate::boundaries::AdminBoundaries;
use crate::error::Result;
use crate::grid::Grid;
use crate::table::ResultTable;
use crate::zonal::{zonal_stats, ZonalAggregate};

use super::ratio_column;

/// Columns: pop_exp (exposed population), pop_tot (total population),
/// exp_ratio (their quotient, None where pop_tot is missing or 0).
pub fn population_exposure_table(
    boundaries: &AdminBoundaries,
    population: &Grid,
    pop_exp: &Grid,
) -> Result<ResultTable> {
    let exposed = zonal_stats(pop_exp, &boundaries.zones, ZonalAggregate::Sum);
    let total = zonal_stats(population, &boundaries.zones, ZonalAggregate::Sum);
    let ratio = ratio_column(&exposed, &total);

    let mut table = ResultTable::from_boundaries(boundaries);
    table.push_column("pop_exp", exposed)?;
    table.push_column("pop_tot", total)?;
    table.push_column("exp_ratio", ratio)?;
    Ok(table)
}
