//! Numeric stages of the index-regression pipeline.
//!
//! ```text
//!  Field ──area──▶ TimeSeries ──aggregate──▶ seasonal index
//!                                  │
//!                       anomaly (cycle removal, standardize)
//!                                  │
//!  Field ──aggregate──▶ seasonal field ──regress──▶ RegressionResult
//! ```

pub mod aggregate;
pub mod anomaly;
pub mod area;
pub mod regress;
