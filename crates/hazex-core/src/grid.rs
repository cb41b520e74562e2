use serde::{Deserialize, Serialize};

/// A single-band raster storing f32 values in row-major order with
/// geographic (EPSG:4326) bounds. Row 0 is the northern edge, matching
/// GeoTIFF storage order. Coordinate math uses f64; cell values use f32.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    /// Row-major cell values. NaN marks missing data.
    pub data: Vec<f32>,
    pub width: usize,
    pub height: usize,
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
    /// Declared nodata sentinel, if the source raster carries one.
    pub nodata: Option<f32>,
}

impl Grid {
    /// Create a new Grid filled with the given value.
    pub fn new(
        width: usize,
        height: usize,
        min_lon: f64,
        max_lon: f64,
        min_lat: f64,
        max_lat: f64,
        fill: f32,
    ) -> Self {
        Self {
            data: vec![fill; width * height],
            width,
            height,
            min_lon,
            max_lon,
            min_lat,
            max_lat,
            nodata: None,
        }
    }

    /// Create a Grid with the same geometry as `other`, filled with `fill`.
    pub fn like(other: &Grid, fill: f32) -> Self {
        Self {
            data: vec![fill; other.width * other.height],
            width: other.width,
            height: other.height,
            min_lon: other.min_lon,
            max_lon: other.max_lon,
            min_lat: other.min_lat,
            max_lat: other.max_lat,
            nodata: None,
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: f32) {
        self.data[row * self.width + col] = val;
    }

    /// Longitude extent of one cell in degrees.
    #[inline]
    pub fn lon_res(&self) -> f64 {
        (self.max_lon - self.min_lon) / self.width as f64
    }

    /// Latitude extent of one cell in degrees.
    #[inline]
    pub fn lat_res(&self) -> f64 {
        (self.max_lat - self.min_lat) / self.height as f64
    }

    /// Geographic center of the cell at (row, col). Row 0 is the north edge.
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        let lon = self.min_lon + (col as f64 + 0.5) * self.lon_res();
        let lat = self.max_lat - (row as f64 + 0.5) * self.lat_res();
        (lon, lat)
    }

    /// True for NaN or the declared nodata sentinel.
    #[inline]
    pub fn is_nodata(&self, v: f32) -> bool {
        v.is_nan() || self.nodata.is_some_and(|nd| v == nd)
    }

    /// Nearest-neighbour lookup at (lon, lat). Returns None outside the
    /// grid bounds; nodata values are returned as-is (callers decide).
    pub fn sample_nearest(&self, lon: f64, lat: f64) -> Option<f32> {
        if lon < self.min_lon || lon >= self.max_lon || lat <= self.min_lat || lat > self.max_lat {
            return None;
        }
        let col = ((lon - self.min_lon) / self.lon_res()) as usize;
        let row = ((self.max_lat - lat) / self.lat_res()) as usize;
        let col = col.min(self.width - 1);
        let row = row.min(self.height - 1);
        Some(self.get(row, col))
    }

    /// Resample this grid onto the geometry of `target` by nearest-neighbour
    /// lookup at each target cell center. Cells that fall outside this grid,
    /// or that hit nodata, become NaN. Both grids are geographic, so this is
    /// the regridding step of reproject-match.
    pub fn regrid_to(&self, target: &Grid) -> Grid {
        let mut out = Grid::like(target, f32::NAN);
        for row in 0..target.height {
            for col in 0..target.width {
                let (lon, lat) = target.cell_center(row, col);
                let v = match self.sample_nearest(lon, lat) {
                    Some(v) if !self.is_nodata(v) => v,
                    _ => f32::NAN,
                };
                out.set(row, col, v);
            }
        }
        out
    }

    /// True when both grids have identical shape and bounds.
    pub fn same_geometry(&self, other: &Grid) -> bool {
        self.width == other.width
            && self.height == other.height
            && (self.min_lon - other.min_lon).abs() < 1e-9
            && (self.max_lon - other.max_lon).abs() < 1e-9
            && (self.min_lat - other.min_lat).abs() < 1e-9
            && (self.max_lat - other.max_lat).abs() < 1e-9
    }
}
