//! Deforestation hazard: ratio between tree-cover loss and initial tree
//! cover per admin zone. Both rasters are binarised (any positive value
//! counts as a loss / cover cell) before the zonal sums.
use crate::boundaries::AdminBoundaries;
use crate::error::Result;
use crate::grid::Grid;
use crate::mask::threshold_mask;
use crate::table::ResultTable;
use crate::zonal::{zonal_stats, ZonalAggregate};

use super::ratio_column;

/// Columns: loss (cells with any loss), cover (cells with any tree cover),
/// deforestation (loss / cover, None where cover is missing or 0).
pub fn deforestation_table(
    boundaries: &AdminBoundaries,
    loss: &Grid,
    cover: &Grid,
) -> Result<ResultTable> {
    let loss_mask = threshold_mask(loss, 0.0);
    let cover_mask = threshold_mask(cover, 0.0);

    let loss_cells = zonal_stats(&loss_mask, &boundaries.zones, ZonalAggregate::Sum);
    let cover_cells = zonal_stats(&cover_mask, &boundaries.zones, ZonalAggregate::Sum);
    let deforestation = ratio_column(&loss_cells, &cover_cells);

    let mut table = ResultTable::from_boundaries(boundaries);
    table.push_column("loss", loss_cells)?;
    table.push_column("cover", cover_cells)?;
    table.push_column("deforestation", deforestation)?;
    Ok(table)
}
