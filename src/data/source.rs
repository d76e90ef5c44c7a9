use std::path::PathBuf;

use super::loader::{self, SUPPORTED_EXTENSIONS};
use super::model::MonthlyField;
use super::select;
use crate::error::{RegressError, Result};
use crate::region::RegionSpec;
use crate::season::SeasonSpec;

// ---------------------------------------------------------------------------
// FieldRequest
// ---------------------------------------------------------------------------

/// Everything needed to locate and subset one model field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRequest {
    pub casename: String,
    pub field_name: String,
    pub interp_grid: String,
    pub interp_method: String,
    pub begin_yr: i32,
    pub end_yr: i32,
    pub season: SeasonSpec,
    pub region: RegionSpec,
}

impl FieldRequest {
    pub fn not_found(&self) -> RegressError {
        RegressError::DataNotFound {
            casename: self.casename.clone(),
            field: self.field_name.clone(),
            grid: self.interp_grid.clone(),
            method: self.interp_method.clone(),
            begin_yr: self.begin_yr,
            end_yr: self.end_yr,
            begin_month: self.season.begin(),
            end_month: self.season.end(),
        }
    }

    /// `{casename}.{field}.{grid}.{method}` – the file stem for this request.
    pub fn file_stem(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.casename, self.field_name, self.interp_grid, self.interp_method
        )
    }
}

// ---------------------------------------------------------------------------
// DataSource
// ---------------------------------------------------------------------------

/// Supplies monthly fields restricted to a request's years, season months and
/// region.
pub trait DataSource {
    /// The returned field holds only complete season instances, in
    /// chronological order, and only cells inside the request's region.
    fn read_monthly(&self, request: &FieldRequest) -> Result<MonthlyField>;
}

/// Apply a request's time and space selection to a full monthly field.
pub fn select_request(monthly: &MonthlyField, request: &FieldRequest) -> Result<MonthlyField> {
    let time_idx = select::season_time_indices(
        &monthly.times,
        &request.season,
        request.begin_yr,
        request.end_yr,
    );
    if time_idx.is_empty() {
        return Err(request.not_found());
    }

    let (lat_idx, lon_idx) = select::region_indices(&monthly.field, &request.region);
    if lat_idx.is_empty() || lon_idx.is_empty() {
        return Err(RegressError::EmptyRegion {
            region: request.region.name.to_string(),
        });
    }

    let selected = select::subset(monthly, &time_idx, &lat_idx, &lon_idx);
    log::debug!(
        "{}: selected {} steps on a {}x{} grid in {}",
        request.file_stem(),
        selected.times.len(),
        lat_idx.len(),
        lon_idx.len(),
        request.region
    );
    Ok(selected)
}

// ---------------------------------------------------------------------------
// FileSource
// ---------------------------------------------------------------------------

/// Reads `{indir}/{casename}.{field}.{grid}.{method}.{ext}` files.
#[derive(Debug, Clone)]
pub struct FileSource {
    indir: PathBuf,
}

impl FileSource {
    pub fn new(indir: impl Into<PathBuf>) -> Self {
        FileSource {
            indir: indir.into(),
        }
    }

    /// First existing file for the request, trying each supported extension.
    pub fn resolve(&self, request: &FieldRequest) -> Option<PathBuf> {
        let stem = request.file_stem();
        SUPPORTED_EXTENSIONS
            .iter()
            .map(|ext| self.indir.join(format!("{stem}.{ext}")))
            .find(|p| p.is_file())
    }
}

impl DataSource for FileSource {
    fn read_monthly(&self, request: &FieldRequest) -> Result<MonthlyField> {
        let path = self.resolve(request).ok_or_else(|| request.not_found())?;
        log::info!("reading {}", path.display());

        let monthly = loader::load_file(&path).map_err(|e| RegressError::Load {
            path: path.clone(),
            message: format!("{e:#}"),
        })?;
        select_request(&monthly, request)
    }
}
