//! Coastal erosion hazard: mean erosion rate over the coastline features
//! joined to each admin zone.
//!
//! The join tolerates a small offset between admin polygons and coastline
//! geometry: a feature counts as joined when any of its vertices is inside
//! the zone or within `tolerance_deg` of the zone boundary. Joined rates
//! are grouped by the deepest admin source column and averaged, then
//! left-joined back onto the zones (zones with no coastline stay empty).
use std::collections::HashMap;

use crate::boundaries::{AdminBoundaries, Zone};
use crate::error::Result;
use crate::io::vector::RateFeature;
use crate::table::ResultTable;

fn feature_joins_zone(feature: &RateFeature, zone: &Zone, tolerance_deg: f64) -> bool {
    let expanded = zone.bbox.expanded(tolerance_deg);
    feature.vertices.iter().any(|&[lon, lat]| {
        expanded.contains(lon, lat)
            && (zone.contains(lon, lat) || zone.distance_to_boundary(lon, lat) <= tolerance_deg)
    })
}

/// Column: rate_time (mean erosion rate of the joined features, grouped by
/// the deepest admin source column).
pub fn coastal_erosion_table(
    boundaries: &AdminBoundaries,
    features: &[RateFeature],
    tolerance_deg: f64,
) -> Result<ResultTable> {
    let group_col = boundaries.deepest_src_column();

    // One (zone, feature) join row per hit, accumulated per admin group.
    let mut groups: HashMap<&str, (f64, usize)> = HashMap::new();
    for (zi, zone) in boundaries.zones.iter().enumerate() {
        let Some(key) = boundaries.attribute(zi, group_col) else {
            continue;
        };
        for feature in features {
            if feature_joins_zone(feature, zone, tolerance_deg) {
                let entry = groups.entry(key).or_insert((0.0, 0));
                entry.0 += feature.rate_time;
                entry.1 += 1;
            }
        }
    }

    let rates: Vec<Option<f64>> = (0..boundaries.len())
        .map(|zi| {
            boundaries
                .attribute(zi, group_col)
                .and_then(|key| groups.get(key))
                .map(|&(sum, count)| sum / count as f64)
        })
        .collect();

    let mut table = ResultTable::from_boundaries(boundaries);
    table.push_column("rate_time", rates)?;
    Ok(table)
}
