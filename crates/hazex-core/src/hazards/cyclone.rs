//! Cyclone hazard: maximum wind speed for a fixed return period per admin
//! zone. No mask preparation; the zonal Max runs on the raw raster.
use crate::boundaries::AdminBoundaries;
use crate::error::Result;
use crate::grid::Grid;
use crate::table::ResultTable;
use crate::zonal::{zonal_stats, ZonalAggregate};

pub fn max_wind_table(boundaries: &AdminBoundaries, wind: &Grid) -> Result<ResultTable> {
    let max_speed = zonal_stats(wind, &boundaries.zones, ZonalAggregate::Max);
    let mut table = ResultTable::from_boundaries(boundaries);
    table.push_column("max_speed", max_speed)?;
    Ok(table)
}
