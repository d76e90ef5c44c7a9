/// Data layer: core types, loading, and selection.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv   (long format: year, month, lat, lon, value, units)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → MonthlyField (dense time × lat × lon grid)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  select   │  complete season instances in the year range, region box
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  source   │  DataSource::read_monthly(FieldRequest)
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod select;
pub mod source;
