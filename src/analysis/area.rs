use ndarray::{Array1, Axis};

use crate::data::model::{Field, TimeSeries};

/// Area weight of each latitude row: cos(latitude).
pub fn lat_weights(lat: &Array1<f64>) -> Array1<f64> {
    lat.mapv(|l| l.to_radians().cos().max(0.0))
}

/// Area-weighted mean over all cells of each time step.
///
/// Missing cells are left out of both numerator and weight sum; a step with
/// no valid cell is missing.
pub fn region_average(field: &Field) -> TimeSeries {
    let weights = lat_weights(&field.lat);
    let values = field
        .values
        .axis_iter(Axis(0))
        .map(|step| {
            let mut sum = 0.0;
            let mut wsum = 0.0;
            for (row, &w) in step.outer_iter().zip(weights.iter()) {
                for &v in row.iter().filter(|v| v.is_finite()) {
                    sum += w * v;
                    wsum += w;
                }
            }
            if wsum > 0.0 {
                sum / wsum
            } else {
                f64::NAN
            }
        })
        .collect::<Array1<f64>>();
    TimeSeries::new(values, field.units.clone())
}
