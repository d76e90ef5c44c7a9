use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::data::source::FieldRequest;
use crate::error::{RegressError, Result};
use crate::region;
use crate::season::SeasonSpec;

// ---------------------------------------------------------------------------
// Processing mode
// ---------------------------------------------------------------------------

/// How the index and the field are reduced in time before regressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// One day-weighted average per season instance.
    Seasonal,
    /// Keep every month of the season; optionally subtract the mean
    /// seasonal cycle from the index.
    Monthly { remove_annual_cycle: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Processing {
    pub aggregation: Aggregation,
    /// Rescale the index to zero mean and unit variance.
    #[serde(default)]
    pub standardize: bool,
}

impl Processing {
    /// Build from the legacy `aggregate` / `no_ann` / `stdize` 0-1 flags.
    ///
    /// Cycle removal only applies to monthly data, so `aggregate=1, no_ann=1`
    /// is rejected.
    pub fn from_flags(aggregate: u8, no_ann: u8, stdize: u8) -> Result<Self> {
        let flag = |name: &str, v: u8| match v {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(RegressError::InvalidConfig(format!(
                "{name} must be 0 or 1, got {other}"
            ))),
        };
        let aggregate = flag("aggregate", aggregate)?;
        let no_ann = flag("no_ann", no_ann)?;
        let standardize = flag("stdize", stdize)?;

        let aggregation = match (aggregate, no_ann) {
            (true, true) => {
                return Err(RegressError::InvalidConfig(
                    "annual-cycle removal requires monthly (non-aggregated) data".to_string(),
                ));
            }
            (true, false) => Aggregation::Seasonal,
            (false, remove_annual_cycle) => Aggregation::Monthly {
                remove_annual_cycle,
            },
        };
        Ok(Processing {
            aggregation,
            standardize,
        })
    }

    pub fn is_seasonal(&self) -> bool {
        self.aggregation == Aggregation::Seasonal
    }

    pub fn removes_annual_cycle(&self) -> bool {
        matches!(
            self.aggregation,
            Aggregation::Monthly {
                remove_annual_cycle: true
            }
        )
    }
}

// ---------------------------------------------------------------------------
// Run configuration (JSON)
// ---------------------------------------------------------------------------

/// Which field to read and how to subset it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub interp_grid: String,
    pub interp_method: String,
    pub begin_month: u32,
    pub end_month: u32,
    pub region: String,
}

/// Everything a regression run needs, as written in `regress.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub indir: PathBuf,
    pub casename: String,
    pub begin_yr: i32,
    pub end_yr: i32,
    /// The regressand.
    pub field: FieldSpec,
    /// The field the climate index is built from.
    pub index: FieldSpec,
    pub processing: Processing,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("regression_output")
}

impl RunConfig {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        let text = serde_json::to_string_pretty(self).context("serializing config")?;
        std::fs::write(path, text).with_context(|| format!("writing config {}", path.display()))
    }

    /// Resolve region names and month pairs into typed requests.
    pub fn validate(&self) -> Result<RegressionSetup> {
        if self.begin_yr > self.end_yr {
            return Err(RegressError::InvalidConfig(format!(
                "begin_yr {} is after end_yr {}",
                self.begin_yr, self.end_yr
            )));
        }
        Ok(RegressionSetup {
            field: self.request(&self.field)?,
            index: self.request(&self.index)?,
            processing: self.processing,
        })
    }

    fn request(&self, spec: &FieldSpec) -> Result<FieldRequest> {
        Ok(FieldRequest {
            casename: self.casename.clone(),
            field_name: spec.name.clone(),
            interp_grid: spec.interp_grid.clone(),
            interp_method: spec.interp_method.clone(),
            begin_yr: self.begin_yr,
            end_yr: self.end_yr,
            season: SeasonSpec::new(spec.begin_month, spec.end_month)?,
            region: region::region(&spec.region)?,
        })
    }
}

/// A validated run: one request for the regressand, one for the index.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionSetup {
    pub field: FieldRequest,
    pub index: FieldRequest,
    pub processing: Processing,
}
