//! Single-band GeoTIFF reading and writing on top of the pure-Rust tiff
//! decoder/encoder. Geo-referencing uses the ModelPixelScale and
//! ModelTiepoint tags; rotated/sheared transforms are not supported.
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

use crate::error::{HazexError, Result};
use crate::grid::Grid;

/// GeoTIFF ModelPixelScaleTag: (sx, sy, sz) in CRS units per pixel.
const MODEL_PIXEL_SCALE: Tag = Tag::ModelPixelScaleTag;
/// GeoTIFF ModelTiepointTag: (i, j, k, x, y, z) raster->model anchor.
const MODEL_TIEPOINT: Tag = Tag::ModelTiepointTag;
/// GDAL_NODATA: nodata sentinel as an ASCII string.
const GDAL_NODATA: Tag = Tag::GdalNodata;

fn tiff_err(path: &Path, source: tiff::TiffError) -> HazexError {
    HazexError::Tiff {
        path: path.to_path_buf(),
        source,
    }
}

/// Read band 1 of a GeoTIFF into a Grid. Integer and float sample formats
/// are converted to f32; the nodata sentinel is taken from GDAL_NODATA when
/// present (values are kept as stored, `Grid::is_nodata` interprets them).
pub fn read_geotiff(path: &Path) -> Result<Grid> {
    let file = File::open(path).map_err(|e| HazexError::io(path, e))?;
    let mut decoder = Decoder::new(BufReader::new(file)).map_err(|e| tiff_err(path, e))?;

    let (width, height) = decoder.dimensions().map_err(|e| tiff_err(path, e))?;
    let (width, height) = (width as usize, height as usize);

    let scale = decoder.get_tag_f64_vec(MODEL_PIXEL_SCALE).ok();
    let tiepoint = decoder.get_tag_f64_vec(MODEL_TIEPOINT).ok();
    let (scale, tiepoint) = match (scale, tiepoint) {
        (Some(s), Some(t)) if s.len() >= 2 && t.len() >= 6 => (s, t),
        _ => {
            return Err(HazexError::MissingGeoTags {
                path: path.to_path_buf(),
            })
        }
    };
    // Anchor pixel (i, j) sits at model position (x, y); pixel scale is
    // (sx, sy) with y decreasing downward (north-up raster).
    let (sx, sy) = (scale[0], scale[1]);
    let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
    let min_lon = x - i * sx;
    let max_lat = y + j * sy;
    let max_lon = min_lon + sx * width as f64;
    let min_lat = max_lat - sy * height as f64;

    let nodata = decoder
        .get_tag_ascii_string(GDAL_NODATA)
        .ok()
        .and_then(|s| s.trim_end_matches('\0').trim().parse::<f32>().ok());

    let image = decoder.read_image().map_err(|e| tiff_err(path, e))?;
    let data: Vec<f32> = match image {
        DecodingResult::F32(v) => v,
        DecodingResult::F64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(|x| x as f32).collect(),
        _ => {
            return Err(HazexError::Geometry {
                path: path.to_path_buf(),
                detail: "unsupported TIFF sample format".to_string(),
            })
        }
    };
    if data.len() != width * height {
        return Err(HazexError::Geometry {
            path: path.to_path_buf(),
            detail: format!(
                "expected {} samples for a single band, got {} (multi-band rasters are not supported)",
                width * height,
                data.len()
            ),
        });
    }

    Ok(Grid {
        data,
        width,
        height,
        min_lon,
        max_lon,
        min_lat,
        max_lat,
        nodata,
    })
}

/// Write a Grid as a Float32 GeoTIFF with pixel-scale and tiepoint tags.
/// NaN cells are written as the grid's nodata sentinel when one is set.
pub fn write_geotiff(path: &Path, grid: &Grid) -> Result<()> {
    let file = File::create(path).map_err(|e| HazexError::io(path, e))?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file)).map_err(|e| tiff_err(path, e))?;

    let mut image = encoder
        .new_image::<colortype::Gray32Float>(grid.width as u32, grid.height as u32)
        .map_err(|e| tiff_err(path, e))?;

    let scale = [grid.lon_res(), grid.lat_res(), 0.0];
    let tiepoint = [0.0, 0.0, 0.0, grid.min_lon, grid.max_lat, 0.0];
    image
        .encoder()
        .write_tag(MODEL_PIXEL_SCALE, &scale[..])
        .map_err(|e| tiff_err(path, e))?;
    image
        .encoder()
        .write_tag(MODEL_TIEPOINT, &tiepoint[..])
        .map_err(|e| tiff_err(path, e))?;
    if let Some(nodata) = grid.nodata {
        image
            .encoder()
            .write_tag(GDAL_NODATA, format!("{nodata}").as_str())
            .map_err(|e| tiff_err(path, e))?;
    }

    match grid.nodata {
        Some(nodata) => {
            let data: Vec<f32> = grid
                .data
                .iter()
                .map(|&v| if v.is_nan() { nodata } else { v })
                .collect();
            image.write_data(&data).map_err(|e| tiff_err(path, e))?;
        }
        None => {
            image.write_data(&grid.data).map_err(|e| tiff_err(path, e))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn written_grid_reads_back_with_geometry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.tif");

        let mut grid = Grid::new(6, 4, 20.0, 26.0, -12.0, -8.0, 0.0);
        for (i, v) in grid.data.iter_mut().enumerate() {
            *v = i as f32 * 0.5;
        }
        grid.nodata = Some(-99999.0);
        write_geotiff(&path, &grid).unwrap();

        let back = read_geotiff(&path).unwrap();
        assert_eq!(back.width, 6);
        assert_eq!(back.height, 4);
        assert_relative_eq!(back.min_lon, 20.0, epsilon = 1e-9);
        assert_relative_eq!(back.max_lat, -8.0, epsilon = 1e-9);
        assert_relative_eq!(back.min_lat, -12.0, epsilon = 1e-9);
        assert_eq!(back.nodata, Some(-99999.0));
        assert_eq!(back.data, grid.data);
    }

    #[test]
    fn nan_cells_round_trip_through_nodata_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodata.tif");

        let mut grid = Grid::new(2, 2, 0.0, 2.0, 0.0, 2.0, 1.0);
        grid.nodata = Some(-99999.0);
        grid.set(0, 1, f32::NAN);
        write_geotiff(&path, &grid).unwrap();

        let back = read_geotiff(&path).unwrap();
        assert_eq!(back.get(0, 1), -99999.0);
        assert!(back.is_nodata(back.get(0, 1)));
        assert_eq!(back.get(0, 0), 1.0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_geotiff(Path::new("does/not/exist.tif")).unwrap_err();
        assert!(matches!(err, HazexError::Io { .. }));
    }
}
