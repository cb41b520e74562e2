/// Hazard mask preparation: regrid a hazard raster onto the population
/// grid, threshold it into a binary exposure mask, multiply by population,
/// and write the exposed-population raster to disk.
use std::fs;
use std::path::PathBuf;

use crate::config::PipelineConfig;
use crate::error::{HazexError, Result};
use crate::grid::Grid;
use crate::hazards::Hazard;
use crate::io::geotiff;

/// Threshold a grid into a binary mask. NaN counts as not exposed, and the
/// comparison is strictly-greater: value > threshold -> 1, else 0.
pub fn threshold_mask(grid: &Grid, threshold: f32) -> Grid {
    let mut out = Grid::like(grid, 0.0);
    for (i, &v) in grid.data.iter().enumerate() {
        let v = if grid.is_nodata(v) { 0.0 } else { v };
        out.data[i] = if v > threshold { 1.0 } else { 0.0 };
    }
    out
}

/// Regrid the hazard raster onto the population grid and threshold it into
/// a binary exposure mask following the population grid geometry.
pub fn hazard_mask(hazard: &Grid, population: &Grid, threshold: f32) -> Grid {
    let regridded = hazard.regrid_to(population);
    threshold_mask(&regridded, threshold)
}

/// Per-cell product of the binary mask and the population raster: equal to
/// the population where exposed, 0 where not. Population nodata cells stay
/// missing (NaN) so that zonal sums exclude them on both the exposed and
/// total side.
pub fn population_exposure(mask: &Grid, population: &Grid) -> Result<Grid> {
    if !mask.same_geometry(population) {
        return Err(HazexError::ShapeMismatch {
            left_width: mask.width,
            left_height: mask.height,
            right_width: population.width,
            right_height: population.height,
        });
    }
    let mut out = Grid::like(population, 0.0);
    for i in 0..out.data.len() {
        let pop = population.data[i];
        out.data[i] = if population.is_nodata(pop) {
            f32::NAN
        } else {
            pop * mask.data[i]
        };
    }
    Ok(out)
}

/// Prepare the exposed-population raster for one hazard and write it to the
/// configured prep path. Returns the written path.
pub fn prepare_hazard(config: &PipelineConfig, hazard: Hazard) -> Result<PathBuf> {
    let threshold = config.threshold(hazard).ok_or_else(|| HazexError::Config {
        path: config.source_path(),
        detail: format!("{} has no mask threshold", hazard.name()),
    })?;

    let hazard_grid = geotiff::read_geotiff(config.hazard_input(hazard))?;
    let mut population = geotiff::read_geotiff(&config.population_raster)?;
    if population.nodata.is_none() {
        population.nodata = Some(config.population_nodata);
    }

    let mask = hazard_mask(&hazard_grid, &population, threshold);
    let exposure = population_exposure(&mask, &population)?;

    let out_path = config.prep_path(hazard);
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent).map_err(|e| HazexError::io(parent, e))?;
    }
    geotiff::write_geotiff(&out_path, &exposure)?;
    Ok(out_path)
}

/// Prepare masks for every raster-mask hazard (flood, earthquake,
/// landslide). Returns the written paths in hazard order.
pub fn prepare_all(config: &PipelineConfig) -> Result<Vec<PathBuf>> {
    Hazard::MASKED.iter().map(|&h| prepare_hazard(config, h)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_strictly_greater() {
        let mut g = Grid::new(3, 1, 0.0, 3.0, 0.0, 1.0, 0.0);
        g.data = vec![0.115, 0.1151, 0.0];
        let m = threshold_mask(&g, 0.115);
        assert_eq!(m.data, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn threshold_treats_nan_as_not_exposed() {
        let mut g = Grid::new(2, 1, 0.0, 2.0, 0.0, 1.0, 0.0);
        g.data = vec![f32::NAN, 5.0];
        let m = threshold_mask(&g, 0.0);
        assert_eq!(m.data, vec![0.0, 1.0]);
    }

    #[test]
    fn negative_values_pass_a_negative_threshold() {
        let mut g = Grid::new(2, 1, 0.0, 2.0, 0.0, 1.0, 0.0);
        g.data = vec![-0.5, -2.0];
        let m = threshold_mask(&g, -1.0);
        assert_eq!(m.data, vec![1.0, 0.0]);
    }

    #[test]
    fn exposure_is_population_where_exposed() {
        let mut pop = Grid::new(2, 2, 0.0, 2.0, 0.0, 2.0, 0.0);
        pop.data = vec![10.0, 20.0, 30.0, 40.0];
        let mut mask = Grid::new(2, 2, 0.0, 2.0, 0.0, 2.0, 0.0);
        mask.data = vec![1.0, 0.0, 1.0, 0.0];
        let exp = population_exposure(&mask, &pop).unwrap();
        assert_eq!(exp.data, vec![10.0, 0.0, 30.0, 0.0]);
    }

    #[test]
    fn exposure_keeps_population_nodata_missing() {
        let mut pop = Grid::new(2, 1, 0.0, 2.0, 0.0, 1.0, 0.0);
        pop.nodata = Some(-99999.0);
        pop.data = vec![-99999.0, 20.0];
        let mask = Grid::new(2, 1, 0.0, 2.0, 0.0, 1.0, 1.0);
        let exp = population_exposure(&mask, &pop).unwrap();
        assert!(exp.data[0].is_nan());
        assert_eq!(exp.data[1], 20.0);
    }

    #[test]
    fn exposure_rejects_mismatched_grids() {
        let pop = Grid::new(2, 2, 0.0, 2.0, 0.0, 2.0, 1.0);
        let mask = Grid::new(3, 3, 0.0, 3.0, 0.0, 3.0, 1.0);
        assert!(population_exposure(&mask, &pop).is_err());
    }

    #[test]
    fn hazard_mask_follows_population_grid() {
        // Hazard on a coarser grid than population: mask geometry must
        // match the population grid, with regridded values thresholded.
        let mut hazard = Grid::new(2, 2, 0.0, 4.0, 0.0, 4.0, 0.0);
        hazard.data = vec![2.0, 0.0, 0.0, 2.0];
        let population = Grid::new(4, 4, 0.0, 4.0, 0.0, 4.0, 1.0);
        let m = hazard_mask(&hazard, &population, 1.0);
        assert!(m.same_geometry(&population));
        // North-west quarter of the population grid maps to hazard (0,0).
        assert_eq!(m.get(0, 0), 1.0);
        assert_eq!(m.get(0, 3), 0.0);
        assert_eq!(m.get(3, 0), 0.0);
        assert_eq!(m.get(3, 3), 1.0);
    }
}
