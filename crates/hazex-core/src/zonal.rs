/// Zonal statistics: aggregate raster cell values by polygon zone.
///
/// A cell belongs to a zone when its center falls inside the polygon under
/// the even-odd rule (vector boundaries partially covering a cell do not
/// claim it). Containment is evaluated per scanline: for each raster row
/// overlapping the zone bbox, edge crossings with the row's center latitude
/// are sorted and paired into inside spans.
use crate::boundaries::Zone;
use crate::grid::Grid;

#[cfg(feature = "threading")]
use rayon::prelude::*;

/// Aggregation function applied to the cells of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZonalAggregate {
    Sum,
    Max,
    Mean,
}

/// Aggregate `grid` per zone. NaN and declared-nodata cells are excluded;
/// a zone with no valid cell yields None (never 0).
pub fn zonal_stats(grid: &Grid, zones: &[Zone], agg: ZonalAggregate) -> Vec<Option<f64>> {
    #[cfg(feature = "threading")]
    {
        zones.par_iter().map(|z| zone_stat(grid, z, agg)).collect()
    }
    #[cfg(not(feature = "threading"))]
    {
        zones.iter().map(|z| zone_stat(grid, z, agg)).collect()
    }
}

fn zone_stat(grid: &Grid, zone: &Zone, agg: ZonalAggregate) -> Option<f64> {
    let lat_res = grid.lat_res();
    let lon_res = grid.lon_res();
    if lat_res <= 0.0 || lon_res <= 0.0 || grid.width == 0 || grid.height == 0 {
        return None;
    }

    // Raster rows whose center latitude falls within the zone bbox.
    let row_min = ((grid.max_lat - zone.bbox.max_lat) / lat_res - 0.5).ceil().max(0.0) as usize;
    let row_max_f = ((grid.max_lat - zone.bbox.min_lat) / lat_res - 0.5).floor();
    if row_max_f < row_min as f64 {
        return None;
    }
    let row_max = (row_max_f as usize).min(grid.height - 1);

    let mut sum = 0.0f64;
    let mut max = f64::NEG_INFINITY;
    let mut count = 0usize;
    let mut crossings: Vec<f64> = Vec::new();

    for row in row_min..=row_max {
        let lat = grid.max_lat - (row as f64 + 0.5) * lat_res;

        crossings.clear();
        for ring in &zone.rings {
            let n = ring.len();
            if n < 3 {
                continue;
            }
            let mut j = n - 1;
            for i in 0..n {
                let pi = ring[i];
                let pj = ring[j];
                if (pi[1] > lat) != (pj[1] > lat) {
                    crossings.push(pi[0] + (lat - pi[1]) / (pj[1] - pi[1]) * (pj[0] - pi[0]));
                }
                j = i;
            }
        }
        if crossings.len() < 2 {
            continue;
        }
        crossings.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        for span in crossings.chunks_exact(2) {
            let (x0, x1) = (span[0], span[1]);
            // Columns whose center longitude lies inside [x0, x1). The
            // upper edge is exclusive, matching the strict `lon < x`
            // crossing rule in Zone::contains.
            let col_min = ((x0 - grid.min_lon) / lon_res - 0.5).ceil().max(0.0) as usize;
            let mut col_max_f = ((x1 - grid.min_lon) / lon_res - 0.5).floor();
            if grid.min_lon + (col_max_f + 0.5) * lon_res >= x1 {
                col_max_f -= 1.0;
            }
            if col_max_f < col_min as f64 {
                continue;
            }
            let col_max = (col_max_f as usize).min(grid.width - 1);

            for col in col_min..=col_max {
                let v = grid.get(row, col);
                if grid.is_nodata(v) {
                    continue;
                }
                let v = f64::from(v);
                sum += v;
                if v > max {
                    max = v;
                }
                count += 1;
            }
        }
    }

    if count == 0 {
        return None;
    }
    Some(match agg {
        ZonalAggregate::Sum => sum,
        ZonalAggregate::Max => max,
        ZonalAggregate::Mean => sum / count as f64,
    })
}
