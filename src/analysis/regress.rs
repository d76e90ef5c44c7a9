use ndarray::{Array2, ArrayView1, Axis, Zip};

use crate::data::model::{Field, RegressionResult, TimeSeries};
use crate::error::{RegressError, Result};

/// Output unit of a regression map.
pub fn combined_units(field_units: &str, index_units: &str, standardized: bool) -> String {
    if standardized {
        field_units.to_string()
    } else {
        format!("{field_units}/{index_units}")
    }
}

/// The index, centered once and shared by every grid point.
struct Predictor {
    mean: f64,
    anomalies: Vec<f64>,
    sxx: f64,
}

impl Predictor {
    fn new(index: &TimeSeries) -> Result<Self> {
        let missing = index.missing_count();
        if missing > 0 {
            return Err(RegressError::MissingIndexValues { count: missing });
        }
        let n = index.len() as f64;
        let mean = index.values.sum() / n;
        let anomalies: Vec<f64> = index.values.iter().map(|x| x - mean).collect();
        let sxx: f64 = anomalies.iter().map(|d| d * d).sum();
        if !(sxx > 0.0) {
            return Err(RegressError::DegenerateSeries {
                what: "regression index".to_string(),
            });
        }
        Ok(Predictor {
            mean,
            anomalies,
            sxx,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PointFit {
    slope: f64,
    intercept: f64,
    correlation: f64,
    t_statistic: f64,
    std_err: f64,
}

impl PointFit {
    const MISSING: PointFit = PointFit {
        slope: f64::NAN,
        intercept: f64::NAN,
        correlation: f64::NAN,
        t_statistic: f64::NAN,
        std_err: f64::NAN,
    };
}

/// OLS of one grid point's series on the index.
fn fit_point(x: &Predictor, y: ArrayView1<'_, f64>) -> PointFit {
    if y.iter().any(|v| !v.is_finite()) {
        return PointFit::MISSING;
    }
    let n = y.len() as f64;
    let y_mean = y.sum() / n;
    let (sxy, syy) = x
        .anomalies
        .iter()
        .zip(y.iter())
        .fold((0.0, 0.0), |(sxy, syy), (dx, &v)| {
            let dy = v - y_mean;
            (sxy + dx * dy, syy + dy * dy)
        });

    let slope = sxy / x.sxx;
    let intercept = y_mean - slope * x.mean;
    let correlation = if syy > 0.0 {
        (sxy / (x.sxx * syy).sqrt()).clamp(-1.0, 1.0)
    } else {
        0.0
    };
    let ss_res = (syy - slope * sxy).max(0.0);
    let std_err = (ss_res / (n - 2.0) / x.sxx).sqrt();
    let t_statistic = if std_err > 0.0 {
        slope / std_err
    } else if slope == 0.0 {
        0.0
    } else {
        slope.signum() * f64::INFINITY
    };

    PointFit {
        slope,
        intercept,
        correlation,
        t_statistic,
        std_err,
    }
}

/// Regress every grid point of `field` on `index`.
///
/// Grid points with any missing step are missing (NaN) in all five outputs.
/// `units` is the caller-computed output unit, see [`combined_units`].
pub fn regress_index_field(index: &TimeSeries, field: &Field, units: String) -> Result<RegressionResult> {
    let n = index.len();
    if n != field.n_time() {
        return Err(RegressError::ShapeMismatch {
            index_len: n,
            field_len: field.n_time(),
        });
    }
    if n < 3 {
        return Err(RegressError::InsufficientSamples { n });
    }
    let predictor = Predictor::new(index)?;

    let shape = field.spatial_shape();
    let mut slope = Array2::from_elem(shape, f64::NAN);
    let mut intercept = Array2::from_elem(shape, f64::NAN);
    let mut correlation = Array2::from_elem(shape, f64::NAN);
    let mut t_statistic = Array2::from_elem(shape, f64::NAN);
    let mut std_err = Array2::from_elem(shape, f64::NAN);

    Zip::from(field.values.lanes(Axis(0)))
        .and(&mut slope)
        .and(&mut intercept)
        .and(&mut correlation)
        .and(&mut t_statistic)
        .and(&mut std_err)
        .for_each(|y, b, a, r, t, se| {
            let fit = fit_point(&predictor, y);
            *b = fit.slope;
            *a = fit.intercept;
            *r = fit.correlation;
            *t = fit.t_statistic;
            *se = fit.std_err;
        });

    let result = RegressionResult {
        slope,
        intercept,
        correlation,
        t_statistic,
        std_err,
        lat: field.lat.clone(),
        lon: field.lon.clone(),
        units,
        n_samples: n,
    };
    log::debug!(
        "regressed {}x{} points over {n} steps, {} missing",
        shape.0,
        shape.1,
        result.missing_points()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array1, Array3, array};

    fn index() -> TimeSeries {
        TimeSeries::new(array![-1.3, 0.4, 2.2, -0.7, 1.5, 0.1, -2.0, 0.9], "K")
    }

    fn field_from(values: Array3<f64>) -> Field {
        let (_, n_lat, n_lon) = values.dim();
        Field {
            values,
            lat: Array1::linspace(-10.0, 10.0, n_lat),
            lon: Array1::linspace(0.0, 30.0, n_lon),
            units: "Pa".into(),
        }
    }

    #[test]
    fn exact_linear_relation() {
        let idx = index();
        let values = Array3::from_shape_fn((idx.len(), 3, 4), |(t, _, _)| 2.0 * idx.values[t] + 3.0);
        let result = regress_index_field(&idx, &field_from(values), "Pa/K".into()).unwrap();

        assert_eq!(result.spatial_shape(), (3, 4));
        for &b in result.slope.iter() {
            assert_abs_diff_eq!(b, 2.0, epsilon = 1e-9);
        }
        for &a in result.intercept.iter() {
            assert_abs_diff_eq!(a, 3.0, epsilon = 1e-9);
        }
        for &r in result.correlation.iter() {
            assert_abs_diff_eq!(r, 1.0, epsilon = 1e-9);
        }
        for &se in result.std_err.iter() {
            assert_abs_diff_eq!(se, 0.0, epsilon = 1e-6);
        }
        assert_eq!(result.n_samples, 8);
    }

    #[test]
    fn matches_hand_computed_fit() {
        // x = 1..5, y = [2, 4, 5, 4, 5]: slope 0.6, intercept 2.2, r ≈ 0.7746.
        let idx = TimeSeries::new(array![1.0, 2.0, 3.0, 4.0, 5.0], "K");
        let mut values = Array3::zeros((5, 1, 1));
        for (t, v) in [2.0, 4.0, 5.0, 4.0, 5.0].into_iter().enumerate() {
            values[[t, 0, 0]] = v;
        }
        let r = regress_index_field(&idx, &field_from(values), "Pa/K".into()).unwrap();

        assert_abs_diff_eq!(r.slope[[0, 0]], 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(r.intercept[[0, 0]], 2.2, epsilon = 1e-12);
        // sxy = 6, sxx = 10, syy = 6
        assert_abs_diff_eq!(r.correlation[[0, 0]], 6.0 / 60f64.sqrt(), epsilon = 1e-12);
        // SSres = 2.4 → se = sqrt(2.4 / 3 / 10)
        let se = (2.4f64 / 3.0 / 10.0).sqrt();
        assert_abs_diff_eq!(r.std_err[[0, 0]], se, epsilon = 1e-12);
        assert_abs_diff_eq!(r.t_statistic[[0, 0]], 0.6 / se, epsilon = 1e-9);
    }

    #[test]
    fn missing_step_marks_point_missing() {
        let idx = index();
        let mut values = Array3::from_shape_fn((idx.len(), 1, 2), |(t, _, _)| idx.values[t]);
        values[[3, 0, 1]] = f64::NAN;
        let r = regress_index_field(&idx, &field_from(values), "Pa/K".into()).unwrap();

        assert_abs_diff_eq!(r.slope[[0, 0]], 1.0, epsilon = 1e-12);
        assert!(r.slope[[0, 1]].is_nan());
        assert!(r.intercept[[0, 1]].is_nan());
        assert!(r.correlation[[0, 1]].is_nan());
        assert!(r.t_statistic[[0, 1]].is_nan());
        assert!(r.std_err[[0, 1]].is_nan());
        assert_eq!(r.missing_points(), 1);
    }

    #[test]
    fn constant_point_has_zero_slope_and_correlation() {
        let idx = index();
        let values = Array3::from_elem((idx.len(), 1, 1), 7.0);
        let r = regress_index_field(&idx, &field_from(values), "Pa/K".into()).unwrap();
        assert_eq!(r.slope[[0, 0]], 0.0);
        assert_abs_diff_eq!(r.intercept[[0, 0]], 7.0, epsilon = 1e-12);
        assert_eq!(r.correlation[[0, 0]], 0.0);
        assert_eq!(r.t_statistic[[0, 0]], 0.0);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let idx = index();
        let values = Array3::zeros((idx.len() - 1, 2, 2));
        match regress_index_field(&idx, &field_from(values), "Pa/K".into()) {
            Err(RegressError::ShapeMismatch { index_len, field_len }) => {
                assert_eq!(index_len, 8);
                assert_eq!(field_len, 7);
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        let flat = TimeSeries::new(array![1.0, 1.0, 1.0, 1.0], "K");
        let values = Array3::zeros((4, 1, 1));
        assert!(matches!(
            regress_index_field(&flat, &field_from(values.clone()), String::new()),
            Err(RegressError::DegenerateSeries { .. })
        ));

        let gappy = TimeSeries::new(array![1.0, f64::NAN, 2.0, 3.0], "K");
        assert!(matches!(
            regress_index_field(&gappy, &field_from(values), String::new()),
            Err(RegressError::MissingIndexValues { count: 1 })
        ));

        let short = TimeSeries::new(array![1.0, 2.0], "K");
        assert!(matches!(
            regress_index_field(&short, &field_from(Array3::zeros((2, 1, 1))), String::new()),
            Err(RegressError::InsufficientSamples { n: 2 })
        ));
    }

    #[test]
    fn units() {
        assert_eq!(combined_units("Pa", "K", false), "Pa/K");
        assert_eq!(combined_units("Pa", "1", true), "Pa");
    }
}
