use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the regression pipeline and its collaborators.
///
/// None of these are retried; each carries enough context (case, field,
/// years, months) to diagnose the request that produced it.
#[derive(Debug, Error)]
pub enum RegressError {
    #[error(
        "no data for case '{casename}', field '{field}' on grid {grid}/{method}, \
         years {begin_yr}-{end_yr}, months {begin_month}-{end_month}"
    )]
    DataNotFound {
        casename: String,
        field: String,
        grid: String,
        method: String,
        begin_yr: i32,
        end_yr: i32,
        begin_month: u32,
        end_month: u32,
    },

    #[error("index has {index_len} time steps but field has {field_len}")]
    ShapeMismatch { index_len: usize, field_len: usize },

    #[error("{what} has zero or undefined variance")]
    DegenerateSeries { what: String },

    #[error("unknown region '{0}'")]
    UnknownRegion(String),

    #[error("invalid season {begin}-{end}: months must lie in 1..=12")]
    InvalidSeason { begin: u32, end: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("series of length {len} does not split into seasons of {months_per_season} months")]
    IncompleteSeasons {
        len: usize,
        months_per_season: usize,
    },

    #[error("regression needs at least 3 time steps, got {n}")]
    InsufficientSamples { n: usize },

    #[error("index series has {count} missing values")]
    MissingIndexValues { count: usize },

    #[error("index {index} and field {field} share no season years")]
    DisjointYears { index: String, field: String },

    #[error("region '{region}' contains no grid cells")]
    EmptyRegion { region: String },

    #[error("failed to load {path:?}: {message}")]
    Load { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, RegressError>;
