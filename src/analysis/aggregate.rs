use ndarray::{Array, ArrayView, Axis, Dimension, RemoveAxis};

use crate::data::model::{Field, TimeSeries};
use crate::error::{RegressError, Result};

/// Collapse consecutive runs of `weights.len()` steps along axis 0 into their
/// weighted mean, Σ wᵢvᵢ / Σ wᵢ.
///
/// A missing month makes its season missing.
pub fn weighted_season_means<D>(values: ArrayView<'_, f64, D>, weights: &[f64]) -> Result<Array<f64, D>>
where
    D: Dimension + RemoveAxis,
{
    let n_months = weights.len();
    let len = values.len_of(Axis(0));
    if n_months == 0 || len % n_months != 0 {
        return Err(RegressError::IncompleteSeasons {
            len,
            months_per_season: n_months,
        });
    }
    let wsum: f64 = weights.iter().sum();

    let mut shape = values.raw_dim();
    shape[0] = len / n_months;
    let mut out = Array::<f64, D>::zeros(shape);

    for (mut season, chunk) in out
        .axis_iter_mut(Axis(0))
        .zip(values.axis_chunks_iter(Axis(0), n_months))
    {
        for (&w, month) in weights.iter().zip(chunk.axis_iter(Axis(0))) {
            season.scaled_add(w, &month);
        }
        season /= wsum;
    }
    Ok(out)
}

/// Day-weighted seasonal means of a monthly series.
pub fn aggregate_series(series: &TimeSeries, day_weights: &[f64]) -> Result<TimeSeries> {
    let values = weighted_season_means(series.values.view(), day_weights)?;
    Ok(TimeSeries::new(values, series.units.clone()))
}

/// Day-weighted seasonal means of a monthly field, cell by cell.
pub fn aggregate_field(field: &Field, day_weights: &[f64]) -> Result<Field> {
    let values = weighted_season_means(field.values.view(), day_weights)?;
    log::debug!(
        "aggregated {} monthly steps into {} seasons",
        field.n_time(),
        values.shape()[0]
    );
    Ok(Field {
        values,
        lat: field.lat.clone(),
        lon: field.lon.clone(),
        units: field.units.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array1, Array3, array};

    #[test]
    fn day_weighted_not_plain_mean() {
        let ts = TimeSeries::new(array![10.0, 20.0], "K");
        let agg = aggregate_series(&ts, &[30.0, 31.0]).unwrap();
        assert_eq!(agg.len(), 1);
        assert_abs_diff_eq!(agg.values[0], (10.0 * 30.0 + 20.0 * 31.0) / 61.0, epsilon = 1e-12);
        assert!((agg.values[0] - 15.0).abs() > 0.05);
    }

    #[test]
    fn splits_into_consecutive_seasons() {
        let ts = TimeSeries::new(array![1.0, 1.0, 1.0, 4.0, 4.0, 4.0], "K");
        let agg = aggregate_series(&ts, &[31.0, 31.0, 28.0]).unwrap();
        assert_eq!(agg.values.to_vec(), vec![1.0, 4.0]);
    }

    #[test]
    fn rejects_partial_season() {
        let ts = TimeSeries::new(array![1.0, 2.0, 3.0], "K");
        assert!(matches!(
            aggregate_series(&ts, &[31.0, 28.0]),
            Err(RegressError::IncompleteSeasons { len: 3, months_per_season: 2 })
        ));
    }

    #[test]
    fn missing_month_propagates() {
        let ts = TimeSeries::new(array![1.0, f64::NAN, 3.0, 3.0], "K");
        let agg = aggregate_series(&ts, &[31.0, 30.0]).unwrap();
        assert!(agg.values[0].is_nan());
        assert_abs_diff_eq!(agg.values[1], 3.0);
    }

    #[test]
    fn field_aggregates_per_cell() {
        let mut values = Array3::zeros((2, 1, 2));
        values[[0, 0, 0]] = 10.0;
        values[[1, 0, 0]] = 20.0;
        values[[0, 0, 1]] = 1.0;
        values[[1, 0, 1]] = 1.0;
        let field = Field {
            values,
            lat: array![0.0],
            lon: Array1::from(vec![0.0, 1.0]),
            units: "Pa".into(),
        };
        let agg = aggregate_field(&field, &[30.0, 31.0]).unwrap();
        assert_eq!(agg.values.dim(), (1, 1, 2));
        assert_abs_diff_eq!(agg.values[[0, 0, 0]], 920.0 / 61.0, epsilon = 1e-12);
        assert_abs_diff_eq!(agg.values[[0, 0, 1]], 1.0, epsilon = 1e-12);
    }
}
