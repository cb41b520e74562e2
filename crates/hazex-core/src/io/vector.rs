//! GeoJSON vector inputs: admin boundary polygons and erosion-rate
//! features.
use std::fs;
use std::path::Path;

use geojson::{FeatureCollection, GeoJson, Value};

use crate::boundaries::{AdminBoundaries, Ring, Zone, ADMIN_COLUMNS};
use crate::error::{HazexError, Result};

/// A hazard vector feature carrying an erosion rate. Geometry is reduced to
/// its vertices; the coastal join tests vertices against zone polygons.
#[derive(Debug, Clone)]
pub struct RateFeature {
    pub vertices: Vec<[f64; 2]>,
    pub rate_time: f64,
}

fn parse_collection(path: &Path) -> Result<FeatureCollection> {
    let text = fs::read_to_string(path).map_err(|e| HazexError::io(path, e))?;
    let geojson: GeoJson = text.parse().map_err(|e| HazexError::GeoJson {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;
    FeatureCollection::try_from(geojson).map_err(|e| HazexError::GeoJson {
        path: path.to_path_buf(),
        source: Box::new(e),
    })
}

fn ring_from_positions(positions: &[Vec<f64>]) -> Ring {
    positions.iter().map(|p| [p[0], p[1]]).collect()
}

/// Load admin boundary polygons plus the admin attribute columns present in
/// the file. Only the six adm{0,1,2}_{src,name} columns are recognised;
/// their order is fixed regardless of the file's property order.
pub fn read_admin_boundaries(path: &Path) -> Result<AdminBoundaries> {
    let collection = parse_collection(path)?;

    let columns: Vec<String> = ADMIN_COLUMNS
        .iter()
        .filter(|&&col| {
            collection
                .features
                .iter()
                .any(|f| f.property(col).is_some())
        })
        .map(|&col| col.to_string())
        .collect();

    let mut attributes = Vec::with_capacity(collection.features.len());
    let mut zones = Vec::with_capacity(collection.features.len());

    for feature in &collection.features {
        let row: Vec<String> = columns
            .iter()
            .map(|col| match feature.property(col) {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(serde_json::Value::Number(n)) => n.to_string(),
                _ => String::new(),
            })
            .collect();

        let geometry = feature.geometry.as_ref().ok_or_else(|| HazexError::Geometry {
            path: path.to_path_buf(),
            detail: "admin feature without geometry".to_string(),
        })?;
        let rings: Vec<Ring> = match &geometry.value {
            Value::Polygon(rings) => rings.iter().map(|r| ring_from_positions(r)).collect(),
            Value::MultiPolygon(parts) => parts
                .iter()
                .flat_map(|rings| rings.iter().map(|r| ring_from_positions(r)))
                .collect(),
            other => {
                return Err(HazexError::Geometry {
                    path: path.to_path_buf(),
                    detail: format!("admin geometry must be polygonal, got {}", other.type_name()),
                })
            }
        };

        attributes.push(row);
        zones.push(Zone::from_rings(rings));
    }

    Ok(AdminBoundaries {
        columns,
        attributes,
        zones,
    })
}

fn collect_vertices(value: &Value, out: &mut Vec<[f64; 2]>) {
    match value {
        Value::Point(p) => out.push([p[0], p[1]]),
        Value::MultiPoint(ps) => out.extend(ps.iter().map(|p| [p[0], p[1]])),
        Value::LineString(ps) => out.extend(ps.iter().map(|p| [p[0], p[1]])),
        Value::MultiLineString(lines) => {
            for line in lines {
                out.extend(line.iter().map(|p| [p[0], p[1]]));
            }
        }
        Value::Polygon(rings) => {
            for ring in rings {
                out.extend(ring.iter().map(|p| [p[0], p[1]]));
            }
        }
        Value::MultiPolygon(parts) => {
            for rings in parts {
                for ring in rings {
                    out.extend(ring.iter().map(|p| [p[0], p[1]]));
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_vertices(&g.value, out);
            }
        }
    }
}

/// Load erosion-rate features. Features missing geometry or a numeric
/// `rate_time` property are skipped (they cannot contribute to the mean).
pub fn read_rate_features(path: &Path) -> Result<Vec<RateFeature>> {
    let collection = parse_collection(path)?;
    let mut features = Vec::new();

    for feature in &collection.features {
        let rate_time = match feature.property("rate_time") {
            Some(serde_json::Value::Number(n)) => match n.as_f64() {
                Some(v) => v,
                None => continue,
            },
            Some(serde_json::Value::String(s)) => match s.parse::<f64>() {
                Ok(v) => v,
                Err(_) => continue,
            },
            _ => continue,
        };
        let Some(geometry) = feature.geometry.as_ref() else {
            continue;
        };
        let mut vertices = Vec::new();
        collect_vertices(&geometry.value, &mut vertices);
        if vertices.is_empty() {
            continue;
        }
        features.push(RateFeature {
            vertices,
            rate_time,
        });
    }

    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    const ADMIN_GEOJSON: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"adm0_src": "ZWE", "adm0_name": "Zimbabwe", "adm1_src": "ZW-MA", "adm1_name": "Manicaland"},
                "geometry": {"type": "Polygon", "coordinates": [[[30, -20], [33, -20], [33, -17], [30, -17], [30, -20]]]}
            },
            {
                "type": "Feature",
                "properties": {"adm0_src": "MOZ", "adm0_name": "Mozambique", "adm1_src": "MZ-S", "adm1_name": "Sofala"},
                "geometry": {"type": "MultiPolygon", "coordinates": [
                    [[[33, -20], [36, -20], [36, -17], [33, -17], [33, -20]]],
                    [[[36, -20], [37, -20], [37, -19], [36, -19], [36, -20]]]
                ]}
            }
        ]
    }"#;

    #[test]
    fn admin_columns_follow_fixed_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "adm.geojson", ADMIN_GEOJSON);
        let b = read_admin_boundaries(&path).unwrap();
        assert_eq!(b.columns, ["adm0_src", "adm0_name", "adm1_src", "adm1_name"]);
        assert_eq!(b.len(), 2);
        assert_eq!(b.attribute(0, "adm1_name"), Some("Manicaland"));
        assert_eq!(b.attribute(1, "adm0_src"), Some("MOZ"));
    }

    #[test]
    fn multipolygon_flattens_into_one_zone() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "adm.geojson", ADMIN_GEOJSON);
        let b = read_admin_boundaries(&path).unwrap();
        assert_eq!(b.zones[1].rings.len(), 2);
        assert!(b.zones[1].contains(34.0, -18.0));
        assert!(b.zones[1].contains(36.5, -19.5));
    }

    #[test]
    fn non_polygon_admin_geometry_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let body = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"adm0_src": "X"},
                "geometry": {"type": "Point", "coordinates": [1, 2]}
            }]
        }"#;
        let path = write_temp(&dir, "bad.geojson", body);
        assert!(matches!(
            read_admin_boundaries(&path).unwrap_err(),
            HazexError::Geometry { .. }
        ));
    }

    #[test]
    fn rate_features_skip_missing_rate_time() {
        let dir = tempfile::tempdir().unwrap();
        let body = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"rate_time": -1.5},
                    "geometry": {"type": "LineString", "coordinates": [[34, -19], [34.1, -19.1]]}
                },
                {
                    "type": "Feature",
                    "properties": {"other": 1},
                    "geometry": {"type": "LineString", "coordinates": [[35, -19]]}
                },
                {
                    "type": "Feature",
                    "properties": {"rate_time": "2.5"},
                    "geometry": {"type": "Point", "coordinates": [36, -18]}
                }
            ]
        }"#;
        let path = write_temp(&dir, "rates.geojson", body);
        let feats = read_rate_features(&path).unwrap();
        assert_eq!(feats.len(), 2);
        assert_eq!(feats[0].rate_time, -1.5);
        assert_eq!(feats[0].vertices.len(), 2);
        assert_eq!(feats[1].rate_time, 2.5);
    }
}
