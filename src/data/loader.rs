use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray,
    StringArray,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use ndarray::{Array1, Array3};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{Field, MonthlyField, YearMonth};

/// Extensions tried, in order, when resolving a data file.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["parquet", "pq", "json", "csv"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a long-format monthly field from a file.  Dispatch by extension.
///
/// Every format carries one row per (time step, grid cell) with columns
/// `year`, `month`, `lat`, `lon`, `value` (nullable) and `units`.
pub fn load_file(path: &Path) -> Result<MonthlyField> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        "csv" => load_csv(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };
    log::debug!("{}: {} records", path.display(), records.rows.len());
    records.into_grid()
}

// ---------------------------------------------------------------------------
// Record collection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
struct Record {
    time: YearMonth,
    lat: f64,
    lon: f64,
    value: f64,
}

#[derive(Debug, Default)]
struct Records {
    rows: Vec<Record>,
    units: Option<String>,
}

impl Records {
    fn push(&mut self, row: usize, year: i64, month: i64, lat: f64, lon: f64, value: f64) -> Result<()> {
        if !(1..=12).contains(&month) {
            bail!("Row {row}: month {month} outside 1..=12");
        }
        let year = i32::try_from(year).with_context(|| format!("Row {row}: year {year} out of range"))?;
        if !lat.is_finite() || !lon.is_finite() {
            bail!("Row {row}: non-finite coordinate ({lat}, {lon})");
        }
        self.rows.push(Record {
            time: YearMonth::new(year, month as u32),
            lat: unsigned_zero(lat),
            lon: unsigned_zero(lon),
            value,
        });
        Ok(())
    }

    fn note_units(&mut self, units: Option<&str>) {
        if self.units.is_none() {
            if let Some(u) = units.filter(|u| !u.is_empty()) {
                self.units = Some(u.to_string());
            }
        }
    }

    /// Scatter the rows into a dense time × lat × lon grid.
    fn into_grid(self) -> Result<MonthlyField> {
        if self.rows.is_empty() {
            bail!("file contains no records");
        }

        let mut times: Vec<YearMonth> = self.rows.iter().map(|r| r.time).collect();
        times.sort();
        times.dedup();
        let lat = sorted_unique(self.rows.iter().map(|r| r.lat));
        let lon = sorted_unique(self.rows.iter().map(|r| r.lon));

        let mut values = Array3::from_elem((times.len(), lat.len(), lon.len()), f64::NAN);
        let mut seen = Array3::from_elem(values.raw_dim(), false);

        for rec in &self.rows {
            // Every coordinate was collected above, so the searches cannot miss.
            let t = times.binary_search(&rec.time).unwrap_or_default();
            let i = lat.binary_search_by(|p| p.total_cmp(&rec.lat)).unwrap_or_default();
            let j = lon.binary_search_by(|p| p.total_cmp(&rec.lon)).unwrap_or_default();
            if std::mem::replace(&mut seen[[t, i, j]], true) {
                bail!(
                    "duplicate record for {} at lat {}, lon {}",
                    rec.time,
                    rec.lat,
                    rec.lon
                );
            }
            values[[t, i, j]] = rec.value;
        }

        Ok(MonthlyField {
            field: Field {
                values,
                lat: Array1::from(lat),
                lon: Array1::from(lon),
                units: self.units.unwrap_or_default(),
            },
            times,
        })
    }
}

/// `-0.0` and `0.0` name the same meridian or parallel.
fn unsigned_zero(x: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        x
    }
}

fn sorted_unique(iter: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut v: Vec<f64> = iter.collect();
    v.sort_by(|a, b| a.total_cmp(b));
    v.dedup_by(|a, b| a.total_cmp(b).is_eq());
    v
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct JsonRecord {
    year: i64,
    month: i64,
    lat: f64,
    lon: f64,
    value: Option<f64>,
    #[serde(default)]
    units: Option<String>,
}

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "year": 1980, "month": 1, "lat": -2.5, "lon": 190.0, "value": 299.1, "units": "K" },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Records> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let rows: Vec<JsonRecord> = serde_json::from_str(&text).context("parsing JSON")?;

    let mut records = Records::default();
    for (i, rec) in rows.into_iter().enumerate() {
        records.note_units(rec.units.as_deref());
        records.push(
            i,
            rec.year,
            rec.month,
            rec.lat,
            rec.lon,
            rec.value.unwrap_or(f64::NAN),
        )?;
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRecord {
    year: i64,
    month: i64,
    lat: f64,
    lon: f64,
    #[serde(deserialize_with = "csv::invalid_option")]
    value: Option<f64>,
    #[serde(default)]
    units: Option<String>,
}

/// CSV layout: header row `year,month,lat,lon,value,units`.
/// An empty `value` cell is a missing value.
fn load_csv(path: &Path) -> Result<Records> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;

    let mut records = Records::default();
    for (row_no, result) in reader.deserialize::<CsvRecord>().enumerate() {
        let rec = result.with_context(|| format!("CSV row {row_no}"))?;
        records.note_units(rec.units.as_deref());
        records.push(
            row_no,
            rec.year,
            rec.month,
            rec.lat,
            rec.lon,
            rec.value.unwrap_or(f64::NAN),
        )?;
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of monthly records.
///
/// Expected schema:
/// - `year`, `month`: Int32 or Int64
/// - `lat`, `lon`, `value`: Float32 or Float64 (`value` nullable)
/// - `units`: Utf8 or LargeUtf8
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Records> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Records::default();
    let mut offset = 0usize;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let n_rows = batch.num_rows();

        let year = column(&batch, "year")?;
        let month = column(&batch, "month")?;
        let lat = column(&batch, "lat")?;
        let lon = column(&batch, "lon")?;
        let value = column(&batch, "value")?;
        let units = batch.schema().index_of("units").ok().map(|i| batch.column(i).clone());

        for row in 0..n_rows {
            let global_row = offset + row;
            if let Some(col) = &units {
                records.note_units(extract_str(col, row)?);
            }
            records.push(
                global_row,
                extract_i64(year, row).with_context(|| format!("Row {global_row}: 'year'"))?,
                extract_i64(month, row).with_context(|| format!("Row {global_row}: 'month'"))?,
                extract_f64(lat, row).with_context(|| format!("Row {global_row}: 'lat'"))?,
                extract_f64(lon, row).with_context(|| format!("Row {global_row}: 'lon'"))?,
                extract_f64(value, row).with_context(|| format!("Row {global_row}: 'value'"))?,
            )?;
        }
        offset += n_rows;
    }

    Ok(records)
}

// -- Parquet / Arrow helpers --

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Arc<dyn Array>> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(idx))
}

fn extract_i64(col: &Arc<dyn Array>, row: usize) -> Result<i64> {
    if col.is_null(row) {
        bail!("null value in integer column");
    }
    match col.data_type() {
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            Ok(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            Ok(arr.value(row))
        }
        other => bail!("Expected Int32 or Int64 column, got {other:?}"),
    }
}

/// Nulls read as NaN (missing).
fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        return Ok(f64::NAN);
    }
    if let Some(arr) = col.as_any().downcast_ref::<Float64Array>() {
        Ok(arr.value(row))
    } else if let Some(arr) = col.as_any().downcast_ref::<Float32Array>() {
        Ok(arr.value(row) as f64)
    } else {
        bail!("Expected Float64 or Float32 column, got {:?}", col.data_type())
    }
}

fn extract_str(col: &Arc<dyn Array>, row: usize) -> Result<Option<&str>> {
    if col.is_null(row) {
        return Ok(None);
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(Some(arr.value(row)))
        }
        DataType::LargeUtf8 => {
            let arr: &LargeStringArray = col.as_string::<i64>();
            Ok(Some(arr.value(row)))
        }
        other => bail!("Expected Utf8 'units' column, got {other:?}"),
    }
}
