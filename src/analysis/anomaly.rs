use ndarray::Axis;

use crate::data::model::TimeSeries;
use crate::error::{RegressError, Result};

/// Unit label of a standardized series.
pub const DIMENSIONLESS: &str = "1";

/// Subtract the mean seasonal cycle from a monthly series.
///
/// The series is read as consecutive seasons of `months_per_season` steps;
/// each month position has its own long-run mean removed.
pub fn remove_seasonal_cycle(series: &TimeSeries, months_per_season: usize) -> Result<TimeSeries> {
    let len = series.len();
    if months_per_season == 0 || len == 0 || len % months_per_season != 0 {
        return Err(RegressError::IncompleteSeasons {
            len,
            months_per_season,
        });
    }

    let by_season = series
        .values
        .view()
        .into_shape((len / months_per_season, months_per_season))
        .map_err(|_| RegressError::IncompleteSeasons {
            len,
            months_per_season,
        })?;
    let cycle = by_season.mean_axis(Axis(0)).ok_or(RegressError::IncompleteSeasons {
        len,
        months_per_season,
    })?;
    log::debug!("removing seasonal cycle {cycle}");

    let anomalies = &by_season - &cycle;
    let values = anomalies.into_shape(len).map_err(|_| RegressError::IncompleteSeasons {
        len,
        months_per_season,
    })?;
    Ok(TimeSeries::new(values, series.units.clone()))
}

/// Rescale to zero mean and unit (population) standard deviation.
///
/// A constant or incomplete series has no defined scale and is rejected with
/// [`RegressError::DegenerateSeries`].
pub fn standardize(series: &TimeSeries) -> Result<TimeSeries> {
    let degenerate = || RegressError::DegenerateSeries {
        what: "index series".to_string(),
    };
    let mean = series.values.mean().ok_or_else(degenerate)?;
    let std = series.values.std(0.0);
    if !(std.is_finite() && std > 0.0) {
        return Err(degenerate());
    }
    let values = series.values.mapv(|v| (v - mean) / std);
    Ok(TimeSeries::new(values, DIMENSIONLESS))
}
