/// Per-hazard analyses: each hazard type loads its raster/vector input,
/// applies the appropriate zonal aggregation, joins back to the admin
/// boundaries, and produces a result table.
pub mod coastal;
pub mod cyclone;
pub mod deforestation;
pub mod exposure;

use std::fmt;
use std::str::FromStr;

use crate::config::PipelineConfig;
use crate::error::{HazexError, Result};
use crate::io::{geotiff, vector};
use crate::table::ResultTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hazard {
    Flood,
    Earthquake,
    Landslide,
    Cyclone,
    CoastalErosion,
    Deforestation,
}

impl Hazard {
    pub const ALL: [Hazard; 6] = [
        Hazard::Flood,
        Hazard::Earthquake,
        Hazard::Landslide,
        Hazard::Cyclone,
        Hazard::CoastalErosion,
        Hazard::Deforestation,
    ];

    /// Hazards that go through exposed-population mask preparation.
    pub const MASKED: [Hazard; 3] = [Hazard::Flood, Hazard::Earthquake, Hazard::Landslide];

    /// The snake_case name used in paths, the CLI, and the API.
    pub fn name(self) -> &'static str {
        match self {
            Hazard::Flood => "flood",
            Hazard::Earthquake => "earthquake",
            Hazard::Landslide => "landslide",
            Hazard::Cyclone => "cyclone",
            Hazard::CoastalErosion => "coastal_erosion",
            Hazard::Deforestation => "deforestation",
        }
    }

    pub fn uses_prepared_mask(self) -> bool {
        matches!(self, Hazard::Flood | Hazard::Earthquake | Hazard::Landslide)
    }
}

impl fmt::Display for Hazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Hazard {
    type Err = HazexError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "flood" => Ok(Hazard::Flood),
            "earthquake" => Ok(Hazard::Earthquake),
            "landslide" => Ok(Hazard::Landslide),
            "cyclone" => Ok(Hazard::Cyclone),
            "coastal_erosion" => Ok(Hazard::CoastalErosion),
            "deforestation" => Ok(Hazard::Deforestation),
            other => Err(HazexError::UnknownHazard(other.to_string())),
        }
    }
}

/// Run the analysis for one hazard type: load the admin boundaries and the
/// relevant inputs, aggregate, and return the joined table (unsorted; see
/// `ResultTable::sort_rows`).
pub fn run_analysis(hazard: Hazard, config: &PipelineConfig) -> Result<ResultTable> {
    let boundaries = vector::read_admin_boundaries(&config.admin_boundaries)?;

    match hazard {
        Hazard::Flood | Hazard::Earthquake | Hazard::Landslide => {
            let mut population = geotiff::read_geotiff(&config.population_raster)?;
            if population.nodata.is_none() {
                population.nodata = Some(config.population_nodata);
            }
            let pop_exp = geotiff::read_geotiff(&config.prep_path(hazard))?;
            exposure::population_exposure_table(&boundaries, &population, &pop_exp)
        }
        Hazard::Cyclone => {
            let wind = geotiff::read_geotiff(&config.hazard_inputs.cyclone)?;
            cyclone::max_wind_table(&boundaries, &wind)
        }
        Hazard::Deforestation => {
            let loss = geotiff::read_geotiff(&config.hazard_inputs.deforestation_loss)?;
            let cover = geotiff::read_geotiff(&config.hazard_inputs.deforestation_cover)?;
            deforestation::deforestation_table(&boundaries, &loss, &cover)
        }
        Hazard::CoastalErosion => {
            let features = vector::read_rate_features(&config.hazard_inputs.coastal_erosion)?;
            coastal::coastal_erosion_table(&boundaries, &features, config.coastal_join_tolerance_deg)
        }
    }
}

/// Element-wise ratio of two metric columns. None when either side is
/// missing or the denominator is 0.
pub(crate) fn ratio_column(num: &[Option<f64>], den: &[Option<f64>]) -> Vec<Option<f64>> {
    num.iter()
        .zip(den)
        .map(|(n, d)| match (n, d) {
            (Some(n), Some(d)) if *d != 0.0 => Some(n / d),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_parse() {
        for hazard in Hazard::ALL {
            assert_eq!(hazard.name().parse::<Hazard>().unwrap(), hazard);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!(matches!(
            "volcano".parse::<Hazard>(),
            Err(HazexError::UnknownHazard(_))
        ));
    }

    #[test]
    fn only_raster_mask_hazards_use_preparation() {
        assert!(Hazard::Flood.uses_prepared_mask());
        assert!(Hazard::Landslide.uses_prepared_mask());
        assert!(!Hazard::Cyclone.uses_prepared_mask());
        assert!(!Hazard::CoastalErosion.uses_prepared_mask());
    }

    #[test]
    fn ratio_column_handles_missing_and_zero() {
        let num = vec![Some(2.0), Some(1.0), None, Some(1.0)];
        let den = vec![Some(4.0), Some(0.0), Some(3.0), None];
        assert_eq!(ratio_column(&num, &den), vec![Some(0.5), None, None, None]);
    }
}
