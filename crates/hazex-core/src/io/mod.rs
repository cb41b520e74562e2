pub mod geotiff;
pub mod vector;

pub use geotiff::{read_geotiff, write_geotiff};
pub use vector::{read_admin_boundaries, read_rate_features, RateFeature};
