use crate::analysis::{aggregate, anomaly, area, regress};
use crate::config::{Aggregation, RegressionSetup};
use crate::data::model::{MonthlyField, RegressionResult, TimeSeries};
use crate::data::select;
use crate::data::source::{DataSource, FieldRequest};
use crate::error::{RegressError, Result};

/// A regional index series and the season length it was built with.
#[derive(Debug, Clone)]
pub struct SeasonalIndex {
    pub series: TimeSeries,
    /// Months per season instance; the series is monthly unless aggregated.
    pub months_per_season: usize,
    /// Start year of each season instance.
    pub years: Vec<i32>,
}

/// Region-averaged index for `request`, either monthly or reduced to one
/// day-weighted value per season instance.
pub fn seasonal_index(
    source: &dyn DataSource,
    request: &FieldRequest,
    aggregation: Aggregation,
) -> Result<SeasonalIndex> {
    let monthly = source.read_monthly(request)?;
    index_from_monthly(&monthly, request, aggregation)
}

fn index_from_monthly(
    monthly: &MonthlyField,
    request: &FieldRequest,
    aggregation: Aggregation,
) -> Result<SeasonalIndex> {
    log::info!(
        "{}: {} index over {} ({}, {}-{})",
        request.casename,
        request.field_name,
        request.region.name,
        request.season,
        request.begin_yr,
        request.end_yr
    );
    let months_per_season = request.season.n_months();
    let series = area::region_average(&monthly.field);

    let series = match aggregation {
        Aggregation::Seasonal => aggregate::aggregate_series(&series, &request.season.day_weights())?,
        Aggregation::Monthly { .. } => series,
    };
    Ok(SeasonalIndex {
        series,
        months_per_season,
        years: select::season_years(&monthly.times, months_per_season),
    })
}

/// Restrict index and field to the season years present in both, so that
/// samples pair up by year rather than by position.
pub fn align_season_years(
    index: MonthlyField,
    index_request: &FieldRequest,
    field: MonthlyField,
    field_request: &FieldRequest,
) -> Result<(MonthlyField, MonthlyField)> {
    let index_n = index_request.season.n_months();
    let field_n = field_request.season.n_months();
    let index_years = select::season_years(&index.times, index_n);
    let field_years = select::season_years(&field.times, field_n);
    if index_years == field_years {
        return Ok((index, field));
    }

    let common: Vec<i32> = index_years
        .iter()
        .copied()
        .filter(|y| field_years.contains(y))
        .collect();
    if common.is_empty() {
        return Err(RegressError::DisjointYears {
            index: index_request.file_stem(),
            field: field_request.file_stem(),
        });
    }
    let only_index: Vec<i32> = index_years.iter().copied().filter(|y| !common.contains(y)).collect();
    let only_field: Vec<i32> = field_years.iter().copied().filter(|y| !common.contains(y)).collect();
    log::warn!(
        "dropping season years without a partner: index {} {:?}, field {} {:?}",
        index_request.field_name,
        only_index,
        field_request.field_name,
        only_field
    );

    Ok((
        select::keep_season_years(&index, index_n, &common),
        select::keep_season_years(&field, field_n, &common),
    ))
}

/// Long-run mean of the day-weighted seasonal regional average.
///
/// Seasons with missing values are left out; NaN when none remain.
pub fn regional_climatology(source: &dyn DataSource, request: &FieldRequest) -> Result<f64> {
    let index = seasonal_index(source, request, Aggregation::Seasonal)?;
    let valid: Vec<f64> = index
        .series
        .values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    if valid.is_empty() {
        return Ok(f64::NAN);
    }
    Ok(valid.iter().sum::<f64>() / valid.len() as f64)
}

/// Regress `setup.field` on the index built from `setup.index`.
///
/// Stages: year alignment → seasonal index → optional cycle removal → optional
/// standardization → optional field aggregation → per-point OLS.
pub fn regress_field_on_index(source: &dyn DataSource, setup: &RegressionSetup) -> Result<RegressionResult> {
    let processing = setup.processing;
    log::info!(
        "{}: regressing {} ({}) on {} index, {:?}",
        setup.field.casename,
        setup.field.field_name,
        setup.field.season,
        setup.index.field_name,
        processing
    );

    let (index_monthly, monthly) = align_season_years(
        source.read_monthly(&setup.index)?,
        &setup.index,
        source.read_monthly(&setup.field)?,
        &setup.field,
    )?;
    let SeasonalIndex {
        mut series,
        months_per_season,
        ..
    } = index_from_monthly(&index_monthly, &setup.index, processing.aggregation)?;
    let index_units = series.units.clone();

    if processing.removes_annual_cycle() {
        series = anomaly::remove_seasonal_cycle(&series, months_per_season)?;
    }
    if processing.standardize {
        series = anomaly::standardize(&series)?;
    }

    let field = if processing.is_seasonal() {
        let day_weights = setup.field.season.day_weights();
        log::debug!("day weights: {day_weights:?}");
        aggregate::aggregate_field(&monthly.field, &day_weights)?
    } else {
        monthly.field
    };

    let units = regress::combined_units(&field.units, &index_units, processing.standardize);
    regress::regress_index_field(&series, &field, units)
}
