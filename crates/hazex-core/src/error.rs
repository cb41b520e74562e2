use std::path::PathBuf;

use thiserror::Error;

/// Error type for the hazard exposure pipeline. Binaries wrap this in
/// anyhow; the library propagates it with `?`.
#[derive(Debug, Error)]
pub enum HazexError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TIFF error in {path}: {source}")]
    Tiff {
        path: PathBuf,
        #[source]
        source: tiff::TiffError,
    },

    #[error("{path} has no geo-referencing tags (ModelPixelScale + ModelTiepoint)")]
    MissingGeoTags { path: PathBuf },

    #[error("GeoJSON error in {path}: {source}")]
    GeoJson {
        path: PathBuf,
        #[source]
        source: Box<geojson::Error>,
    },

    #[error("unsupported geometry in {path}: {detail}")]
    Geometry { path: PathBuf, detail: String },

    #[error("unknown hazard name: {0}")]
    UnknownHazard(String),

    #[error("config error in {path}: {detail}")]
    Config { path: PathBuf, detail: String },

    #[error("grid shape mismatch: {left_width}x{left_height} vs {right_width}x{right_height}")]
    ShapeMismatch {
        left_width: usize,
        left_height: usize,
        right_width: usize,
        right_height: usize,
    },

    #[error("metric column {column} has {got} rows, expected {expected}")]
    ColumnLength {
        column: String,
        got: usize,
        expected: usize,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl HazexError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, HazexError>;
