use std::fmt;

use ndarray::{Array1, Array2, Array3};

// ---------------------------------------------------------------------------
// YearMonth – one monthly time step
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    /// 1..=12
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        YearMonth { year, month }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// ---------------------------------------------------------------------------
// TimeSeries
// ---------------------------------------------------------------------------

/// A scalar series over monthly or seasonal steps. Missing values are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub values: Array1<f64>,
    pub units: String,
}

impl TimeSeries {
    pub fn new(values: Array1<f64>, units: impl Into<String>) -> Self {
        TimeSeries {
            values,
            units: units.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_finite()).count()
    }
}

// ---------------------------------------------------------------------------
// Field – time × lat × lon
// ---------------------------------------------------------------------------

/// A gridded field. `values` has shape `(time, lat.len(), lon.len())`;
/// missing cells are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub values: Array3<f64>,
    pub lat: Array1<f64>,
    pub lon: Array1<f64>,
    pub units: String,
}

impl Field {
    pub fn n_time(&self) -> usize {
        self.values.shape()[0]
    }

    /// `(n_lat, n_lon)`.
    pub fn spatial_shape(&self) -> (usize, usize) {
        (self.values.shape()[1], self.values.shape()[2])
    }
}

/// A field still on monthly steps, with the calendar month of each step.
#[derive(Debug, Clone)]
pub struct MonthlyField {
    pub field: Field,
    pub times: Vec<YearMonth>,
}

// ---------------------------------------------------------------------------
// RegressionResult
// ---------------------------------------------------------------------------

/// Per-grid-point OLS statistics, each shaped `(lat, lon)`.
#[derive(Debug, Clone)]
pub struct RegressionResult {
    pub slope: Array2<f64>,
    pub intercept: Array2<f64>,
    pub correlation: Array2<f64>,
    pub t_statistic: Array2<f64>,
    pub std_err: Array2<f64>,
    pub lat: Array1<f64>,
    pub lon: Array1<f64>,
    /// `field/index`, or the field unit alone for a standardized index.
    pub units: String,
    /// Time steps that entered each regression.
    pub n_samples: usize,
}

impl RegressionResult {
    pub fn spatial_shape(&self) -> (usize, usize) {
        self.slope.dim()
    }

    /// Grid points whose output is missing.
    pub fn missing_points(&self) -> usize {
        self.slope.iter().filter(|v| v.is_nan()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn year_month_orders_chronologically() {
        let mut times = vec![
            YearMonth::new(1981, 1),
            YearMonth::new(1980, 12),
            YearMonth::new(1980, 2),
        ];
        times.sort();
        assert_eq!(times[0], YearMonth::new(1980, 2));
        assert_eq!(times[2], YearMonth::new(1981, 1));
        assert_eq!(times[1].to_string(), "1980-12");
    }

    #[test]
    fn field_shapes() {
        let field = Field {
            values: Array3::zeros((4, 2, 3)),
            lat: array![-1.0, 1.0],
            lon: array![0.0, 1.0, 2.0],
            units: "K".into(),
        };
        assert_eq!(field.n_time(), 4);
        assert_eq!(field.spatial_shape(), (2, 3));
    }

    #[test]
    fn counts_missing() {
        let ts = TimeSeries::new(array![1.0, f64::NAN, 3.0], "K");
        assert_eq!(ts.missing_count(), 1);
        assert_eq!(ts.len(), 3);
    }
}
