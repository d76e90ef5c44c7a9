use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::{Processing, RegressionSetup};
use crate::data::model::RegressionResult;
use crate::util::round_to_first;

// ---------------------------------------------------------------------------
// Regression maps → CSV
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct MapRow {
    lat: f64,
    lon: f64,
    slope: Option<f64>,
    intercept: Option<f64>,
    correlation: Option<f64>,
    t_statistic: Option<f64>,
    std_err: Option<f64>,
}

fn cell(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// Write one row per grid point. Missing (or infinite) values are empty cells.
pub fn write_maps_csv(path: &Path, result: &RegressionResult) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV output")?;
    for ((i, j), &slope) in result.slope.indexed_iter() {
        writer
            .serialize(MapRow {
                lat: result.lat[i],
                lon: result.lon[j],
                slope: cell(slope),
                intercept: cell(result.intercept[[i, j]]),
                correlation: cell(result.correlation[[i, j]]),
                t_statistic: cell(result.t_statistic[[i, j]]),
                std_err: cell(result.std_err[[i, j]]),
            })
            .with_context(|| format!("writing CSV row ({i}, {j})"))?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Run summary → JSON
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub casename: String,
    pub field: String,
    pub field_season: String,
    pub field_region: String,
    pub index: String,
    pub index_season: String,
    pub index_region: String,
    pub processing: Processing,
    pub begin_yr: i32,
    pub end_yr: i32,
    pub n_samples: usize,
    pub n_lat: usize,
    pub n_lon: usize,
    pub missing_points: usize,
    pub units: String,
    pub slope_min: Option<f64>,
    pub slope_max: Option<f64>,
    /// Largest |slope| rounded to one significant digit (map legend scale).
    pub slope_scale: Option<f64>,
    pub index_climatology: Option<f64>,
}

impl RunSummary {
    pub fn new(setup: &RegressionSetup, result: &RegressionResult, index_climatology: f64) -> Self {
        let finite = || result.slope.iter().copied().filter(|v| v.is_finite());
        let slope_min = finite().reduce(f64::min);
        let slope_max = finite().reduce(f64::max);
        let slope_scale = finite().map(f64::abs).reduce(f64::max).map(round_to_first);
        let (n_lat, n_lon) = result.spatial_shape();

        RunSummary {
            casename: setup.field.casename.clone(),
            field: setup.field.field_name.clone(),
            field_season: setup.field.season.name(),
            field_region: setup.field.region.name.to_string(),
            index: setup.index.field_name.clone(),
            index_season: setup.index.season.name(),
            index_region: setup.index.region.name.to_string(),
            processing: setup.processing,
            begin_yr: setup.field.begin_yr,
            end_yr: setup.field.end_yr,
            n_samples: result.n_samples,
            n_lat,
            n_lon,
            missing_points: result.missing_points(),
            units: result.units.clone(),
            slope_min,
            slope_max,
            slope_scale,
            index_climatology: cell(index_climatology),
        }
    }

    /// Base name for output files, e.g. `case.PSL_DJF.regr.TS_Nino3.4_DJF`.
    pub fn file_stem(&self) -> String {
        format!(
            "{}.{}_{}.regr.{}_{}_{}",
            self.casename, self.field, self.field_season, self.index, self.index_region, self.index_season
        )
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path).context("creating summary file")?;
        serde_json::to_writer_pretty(file, self).context("writing summary JSON")?;
        Ok(())
    }
}
