/// Administrative boundary zones used for aggregation.
///
/// Zones come from a GeoJSON FeatureCollection (see `io::vector`). Each zone
/// stores its rings flat: outer shells and holes alike, because the even-odd
/// fill rule used for containment and rasterization treats them uniformly.
use serde::{Deserialize, Serialize};

/// Admin attribute columns recognised in boundary files, in output order.
pub const ADMIN_COLUMNS: [&str; 6] = [
    "adm0_src",
    "adm0_name",
    "adm1_src",
    "adm1_name",
    "adm2_src",
    "adm2_name",
];

/// Closed ring of (lon, lat) vertices. First and last vertex may or may not
/// coincide; the edge iteration closes the ring either way.
pub type Ring = Vec<[f64; 2]>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bounds {
    pub fn empty() -> Self {
        Self {
            min_lon: f64::INFINITY,
            min_lat: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            max_lat: f64::NEG_INFINITY,
        }
    }

    pub fn include(&mut self, p: [f64; 2]) {
        self.min_lon = self.min_lon.min(p[0]);
        self.max_lon = self.max_lon.max(p[0]);
        self.min_lat = self.min_lat.min(p[1]);
        self.max_lat = self.max_lat.max(p[1]);
    }

    /// Bounds grown by `tol` degrees on every side.
    pub fn expanded(&self, tol: f64) -> Self {
        Self {
            min_lon: self.min_lon - tol,
            min_lat: self.min_lat - tol,
            max_lon: self.max_lon + tol,
            max_lat: self.max_lat + tol,
        }
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

/// One aggregation zone: a polygon (possibly multi-part, possibly holed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub rings: Vec<Ring>,
    pub bbox: Bounds,
}

impl Zone {
    pub fn from_rings(rings: Vec<Ring>) -> Self {
        let mut bbox = Bounds::empty();
        for ring in &rings {
            for &p in ring {
                bbox.include(p);
            }
        }
        Self { rings, bbox }
    }

    /// Even-odd containment test across all rings. Holes flip the parity a
    /// second time, so they are excluded without special-casing.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        if !self.bbox.contains(lon, lat) {
            return false;
        }
        let mut inside = false;
        for ring in &self.rings {
            let n = ring.len();
            if n < 3 {
                continue;
            }
            let mut j = n - 1;
            for i in 0..n {
                let pi = ring[i];
                let pj = ring[j];
                if (pi[1] > lat) != (pj[1] > lat) {
                    let x = pi[0] + (lat - pi[1]) / (pj[1] - pi[1]) * (pj[0] - pi[0]);
                    if lon < x {
                        inside = !inside;
                    }
                }
                j = i;
            }
        }
        inside
    }

    /// Shortest distance in degrees from (lon, lat) to any ring edge.
    /// Used by the coastal-erosion join as a stand-in for buffering the
    /// zone geometry: a feature vertex within `tol` of the boundary counts
    /// as joined even when it lies just offshore.
    pub fn distance_to_boundary(&self, lon: f64, lat: f64) -> f64 {
        let mut best = f64::INFINITY;
        for ring in &self.rings {
            let n = ring.len();
            if n < 2 {
                continue;
            }
            let mut j = n - 1;
            for i in 0..n {
                let d = point_segment_distance([lon, lat], ring[j], ring[i]);
                if d < best {
                    best = d;
                }
                j = i;
            }
        }
        best
    }
}

fn point_segment_distance(p: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    let abx = b[0] - a[0];
    let aby = b[1] - a[1];
    let len2 = abx * abx + aby * aby;
    let t = if len2 > 0.0 {
        (((p[0] - a[0]) * abx + (p[1] - a[1]) * aby) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let cx = a[0] + t * abx;
    let cy = a[1] + t * aby;
    ((p[0] - cx).powi(2) + (p[1] - cy).powi(2)).sqrt()
}

/// Admin boundary table: zones plus the admin attribute columns present in
/// the source file (subset of `ADMIN_COLUMNS`, original order preserved).
#[derive(Debug, Clone)]
pub struct AdminBoundaries {
    pub columns: Vec<String>,
    /// Per-zone attribute values, aligned with `columns`.
    pub attributes: Vec<Vec<String>>,
    pub zones: Vec<Zone>,
}

impl AdminBoundaries {
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn attribute(&self, zone: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.attributes.get(zone).map(|row| row[idx].as_str())
    }

    /// The deepest admin source-code column present: adm2_src, else
    /// adm1_src, else adm0_src.
    pub fn deepest_src_column(&self) -> &'static str {
        if self.has_column("adm2_src") {
            "adm2_src"
        } else if self.has_column("adm1_src") {
            "adm1_src"
        } else {
            "adm0_src"
        }
    }

    /// The deepest admin name column present, falling back to the deepest
    /// source column when no name column exists.
    pub fn deepest_name_column(&self) -> &'static str {
        if self.has_column("adm2_name") {
            "adm2_name"
        } else if self.has_column("adm1_name") {
            "adm1_name"
        } else if self.has_column("adm0_name") {
            "adm0_name"
        } else {
            self.deepest_src_column()
        }
    }
}
