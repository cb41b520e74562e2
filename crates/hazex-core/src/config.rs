/// Pipeline configuration: input rasters/vectors, thresholds, and output
/// locations. Loaded from a JSON file; `Default` mirrors the conventional
/// data layout (`pop_data/`, `hazard_data/`, `prep_data/`, `output_data/`).
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HazexError, Result};
use crate::hazards::Hazard;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Population count raster, the reference grid for mask preparation.
    pub population_raster: PathBuf,
    /// Admin boundary polygons (GeoJSON FeatureCollection).
    pub admin_boundaries: PathBuf,
    pub hazard_inputs: HazardInputs,
    /// Directory for prepared exposed-population rasters.
    pub prep_dir: PathBuf,
    /// Directory for exported per-hazard CSV tables.
    pub output_dir: PathBuf,
    pub thresholds: Thresholds,
    /// Nodata sentinel assumed for the population raster when the file
    /// declares none.
    pub population_nodata: f32,
    /// Join tolerance in degrees for the coastal-erosion spatial join
    /// (stand-in for buffering the admin geometry).
    pub coastal_join_tolerance_deg: f64,
    /// Path this config was loaded from; not part of the file itself.
    #[serde(skip)]
    source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardInputs {
    pub flood: PathBuf,
    pub earthquake: PathBuf,
    pub landslide: PathBuf,
    /// Maximum wind speed for a fixed (100-year) return period.
    pub cyclone: PathBuf,
    /// Erosion-rate features with a `rate_time` property.
    pub coastal_erosion: PathBuf,
    pub deforestation_loss: PathBuf,
    pub deforestation_cover: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub flood: f32,
    /// 0.115 g: acceleration for strong perceived shaking (MMI level VI).
    pub earthquake: f32,
    /// Risk code between 3 (medium) and 4 (high).
    pub landslide: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            flood: 0.0,
            earthquake: 0.115,
            landslide: 2.5,
        }
    }
}

impl Default for HazardInputs {
    fn default() -> Self {
        Self {
            flood: "hazard_data/flood/sadc_flood.tif".into(),
            earthquake: "hazard_data/earthquake/sadc_earthquake.tif".into(),
            landslide: "hazard_data/landslide/sadc_landslide.tif".into(),
            cyclone: "hazard_data/cyclone/STORM_FIXED_RETURN_PERIODS_SI_100_YR_RP.tif".into(),
            coastal_erosion: "hazard_data/coastal_erosion/sadc_coastal_erosion.geojson".into(),
            deforestation_loss: "hazard_data/deforestation/sadc_lossyear.tif".into(),
            deforestation_cover: "hazard_data/deforestation/sadc_treecover.tif".into(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            population_raster: "pop_data/sadc_pop_1km.tif".into(),
            admin_boundaries: "admin_data/sadc_adm1.geojson".into(),
            hazard_inputs: HazardInputs::default(),
            prep_dir: "prep_data".into(),
            output_dir: "output_data".into(),
            thresholds: Thresholds::default(),
            population_nodata: -99999.0,
            coastal_join_tolerance_deg: 0.01,
            source: None,
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| HazexError::io(path, e))?;
        let mut config: PipelineConfig =
            serde_json::from_str(&text).map_err(|e| HazexError::Config {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// The path the config was loaded from, for error reporting.
    pub fn source_path(&self) -> PathBuf {
        self.source.clone().unwrap_or_else(|| "<default config>".into())
    }

    /// Raw input path for a hazard (prepared-mask hazards point at the
    /// unprocessed hazard raster here; see `prep_path`).
    pub fn hazard_input(&self, hazard: Hazard) -> &Path {
        match hazard {
            Hazard::Flood => &self.hazard_inputs.flood,
            Hazard::Earthquake => &self.hazard_inputs.earthquake,
            Hazard::Landslide => &self.hazard_inputs.landslide,
            Hazard::Cyclone => &self.hazard_inputs.cyclone,
            Hazard::CoastalErosion => &self.hazard_inputs.coastal_erosion,
            // Deforestation has two inputs; loss is the primary one.
            Hazard::Deforestation => &self.hazard_inputs.deforestation_loss,
        }
    }

    /// Mask threshold for hazards that go through mask preparation.
    pub fn threshold(&self, hazard: Hazard) -> Option<f32> {
        match hazard {
            Hazard::Flood => Some(self.thresholds.flood),
            Hazard::Earthquake => Some(self.thresholds.earthquake),
            Hazard::Landslide => Some(self.thresholds.landslide),
            _ => None,
        }
    }

    /// Where the prepared exposed-population raster for `hazard` lives.
    pub fn prep_path(&self, hazard: Hazard) -> PathBuf {
        self.prep_dir.join(format!("sadc_{}_prep.tif", hazard.name()))
    }

    /// Where the exported CSV table for `hazard` lives.
    pub fn output_path(&self, hazard: Hazard) -> PathBuf {
        self.output_dir.join(format!("{}.csv", hazard.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_match_documented_values() {
        let t = Thresholds::default();
        assert_eq!(t.flood, 0.0);
        assert_eq!(t.earthquake, 0.115);
        assert_eq!(t.landslide, 2.5);
    }

    #[test]
    fn threshold_only_for_masked_hazards() {
        let c = PipelineConfig::default();
        assert!(c.threshold(Hazard::Flood).is_some());
        assert!(c.threshold(Hazard::Cyclone).is_none());
        assert!(c.threshold(Hazard::Deforestation).is_none());
    }

    #[test]
    fn derived_paths_use_hazard_names() {
        let c = PipelineConfig::default();
        assert_eq!(c.prep_path(Hazard::Flood), PathBuf::from("prep_data/sadc_flood_prep.tif"));
        assert_eq!(
            c.output_path(Hazard::CoastalErosion),
            PathBuf::from("output_data/coastal_erosion.csv")
        );
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let json = r#"{ "population_raster": "custom/pop.tif" }"#;
        let c: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(c.population_raster, PathBuf::from("custom/pop.tif"));
        assert_eq!(c.thresholds.earthquake, 0.115);
        assert_eq!(c.population_nodata, -99999.0);
    }
}
