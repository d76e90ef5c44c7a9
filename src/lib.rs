//! Regression of gridded climate-model fields onto regional climate indices.
//!
//! A run reads two monthly fields for one model case: the *index* field,
//! reduced to a regional (optionally seasonal, de-cycled, standardized) time
//! series, and the *regressand* field, optionally reduced to day-weighted
//! seasonal means. Every grid point of the regressand is then regressed on
//! the index by ordinary least squares.

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod region;
pub mod season;
pub mod util;

pub use config::{Aggregation, Processing, RegressionSetup, RunConfig};
pub use data::model::{Field, RegressionResult, TimeSeries};
pub use data::source::{DataSource, FieldRequest, FileSource};
pub use error::{RegressError, Result};
pub use pipeline::regress_field_on_index;
pub use region::get_reg_box;
pub use util::round_to_first;
