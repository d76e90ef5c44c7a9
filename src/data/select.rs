use std::collections::BTreeMap;

use ndarray::Axis;

use super::model::{Field, MonthlyField, YearMonth};
use crate::region::RegionSpec;
use crate::season::SeasonSpec;

// ---------------------------------------------------------------------------
// Time selection: complete season instances inside a year range
// ---------------------------------------------------------------------------

/// Indices into `times` of every complete season instance whose first month
/// falls in `begin_yr..=end_yr` and whose months all fall inside that range,
/// in chronological order.
///
/// An instance is skipped when any of its months is absent from `times`.
pub fn season_time_indices(
    times: &[YearMonth],
    season: &SeasonSpec,
    begin_yr: i32,
    end_yr: i32,
) -> Vec<usize> {
    let position: BTreeMap<YearMonth, usize> =
        times.iter().enumerate().map(|(i, t)| (*t, i)).collect();
    let months = season.months();
    let offsets = season.year_offsets();

    let mut indices = Vec::with_capacity(months.len() * (end_yr - begin_yr + 1).max(0) as usize);
    for year in begin_yr..=end_yr {
        let steps: Vec<YearMonth> = months
            .iter()
            .zip(&offsets)
            .map(|(&m, &dy)| YearMonth::new(year + dy, m))
            .collect();
        if steps.iter().any(|s| s.year > end_yr) {
            continue;
        }
        let found: Vec<usize> = steps.iter().filter_map(|s| position.get(s).copied()).collect();
        if found.len() != steps.len() {
            log::warn!(
                "skipping incomplete {} season starting {year}: {} of {} months present",
                season,
                found.len(),
                steps.len()
            );
            continue;
        }
        indices.extend(found);
    }
    indices
}

/// Start year of each season instance in a selection made by
/// [`season_time_indices`], i.e. times grouped in runs of `months_per_season`.
pub fn season_years(times: &[YearMonth], months_per_season: usize) -> Vec<i32> {
    times
        .chunks(months_per_season.max(1))
        .map(|instance| instance[0].year)
        .collect()
}

/// Keep only the season instances whose start year is in `years`.
pub fn keep_season_years(monthly: &MonthlyField, months_per_season: usize, years: &[i32]) -> MonthlyField {
    let n = months_per_season.max(1);
    let time_idx: Vec<usize> = season_years(&monthly.times, n)
        .into_iter()
        .enumerate()
        .filter(|(_, year)| years.contains(year))
        .flat_map(|(k, _)| k * n..((k + 1) * n).min(monthly.times.len()))
        .collect();
    let (n_lat, n_lon) = monthly.field.spatial_shape();
    let lat_idx: Vec<usize> = (0..n_lat).collect();
    let lon_idx: Vec<usize> = (0..n_lon).collect();
    subset(monthly, &time_idx, &lat_idx, &lon_idx)
}

// ---------------------------------------------------------------------------
// Space selection: region box
// ---------------------------------------------------------------------------

/// Latitude and longitude indices of the cells inside `region`.
pub fn region_indices(field: &Field, region: &RegionSpec) -> (Vec<usize>, Vec<usize>) {
    let lat_idx = field
        .lat
        .iter()
        .enumerate()
        .filter(|&(_, &lat)| region.contains_lat(lat))
        .map(|(i, _)| i)
        .collect();
    let lon_idx = field
        .lon
        .iter()
        .enumerate()
        .filter(|&(_, &lon)| region.contains_lon(lon))
        .map(|(i, _)| i)
        .collect();
    (lat_idx, lon_idx)
}

/// Restrict a monthly field to the given time, latitude and longitude indices.
pub fn subset(monthly: &MonthlyField, time_idx: &[usize], lat_idx: &[usize], lon_idx: &[usize]) -> MonthlyField {
    let f = &monthly.field;
    let values = f
        .values
        .select(Axis(0), time_idx)
        .select(Axis(1), lat_idx)
        .select(Axis(2), lon_idx);
    MonthlyField {
        field: Field {
            values,
            lat: f.lat.select(Axis(0), lat_idx),
            lon: f.lon.select(Axis(0), lon_idx),
            units: f.units.clone(),
        },
        times: time_idx.iter().map(|&i| monthly.times[i]).collect(),
    }
}
