use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use index_regression::config::{Aggregation, FieldSpec, Processing, RunConfig};
use index_regression::season::DAYS_IN_MONTH;

const CASENAME: &str = "sample_case";
const GRID: &str = "5x5";
const METHOD: &str = "bilinear";
const FIRST_YEAR: i32 = 1980;
const LAST_YEAR: i32 = 2009;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Long-format columns for one field.
#[derive(Default)]
struct Columns {
    year: Vec<i32>,
    month: Vec<i32>,
    lat: Vec<f64>,
    lon: Vec<f64>,
    value: Vec<Option<f64>>,
}

impl Columns {
    fn push(&mut self, year: i32, month: u32, lat: f64, lon: f64, value: Option<f64>) {
        self.year.push(year);
        self.month.push(month as i32);
        self.lat.push(lat);
        self.lon.push(lon);
        self.value.push(value);
    }

    fn write_parquet(self, path: &Path, units: &str) -> Result<()> {
        let n = self.year.len();
        let schema = Arc::new(Schema::new(vec![
            Field::new("year", DataType::Int32, false),
            Field::new("month", DataType::Int32, false),
            Field::new("lat", DataType::Float64, false),
            Field::new("lon", DataType::Float64, false),
            Field::new("value", DataType::Float64, true),
            Field::new("units", DataType::Utf8, false),
        ]));

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int32Array::from(self.year)),
                Arc::new(Int32Array::from(self.month)),
                Arc::new(Float64Array::from(self.lat)),
                Arc::new(Float64Array::from(self.lon)),
                Arc::new(Float64Array::from(self.value)),
                Arc::new(StringArray::from(vec![units; n])),
            ],
        )
        .context("building record batch")?;

        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
        writer.write(&batch).context("writing batch")?;
        writer.close().context("closing writer")?;
        println!("Wrote {n} records to {}", path.display());
        Ok(())
    }
}

/// ENSO-like index: a few incommensurate oscillations, peaking in boreal winter.
fn enso(year: i32, month: u32, rng: &mut SimpleRng) -> f64 {
    let t = (year - FIRST_YEAR) as f64 + (month as f64 - 0.5) / 12.0;
    let winter_peak = 0.6 + 0.4 * (2.0 * std::f64::consts::PI * (month as f64 - 12.0) / 12.0).cos();
    let slow = (t * 2.0 * std::f64::consts::PI / 3.7).sin() + 0.5 * (t * 2.0 * std::f64::consts::PI / 5.3).sin();
    winter_peak * slow + rng.gauss(0.0, 0.2)
}

fn main() -> Result<()> {
    env_logger::init();

    let outdir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));
    std::fs::create_dir_all(&outdir).with_context(|| format!("creating {}", outdir.display()))?;

    let mut rng = SimpleRng::new(42);

    // 5° grid, cell centres.
    let lats: Vec<f64> = (0..36).map(|i| -87.5 + 5.0 * i as f64).collect();
    let lons: Vec<f64> = (0..72).map(|j| 2.5 + 5.0 * j as f64).collect();

    let mut ts = Columns::default();
    let mut psl = Columns::default();

    for year in FIRST_YEAR..=LAST_YEAR {
        for month in 1..=12u32 {
            let index = enso(year, month, &mut rng);
            let cycle = (2.0 * std::f64::consts::PI * (month as f64 - 1.0) / 12.0).cos();
            let days = DAYS_IN_MONTH[(month - 1) as usize] as f64;

            for &lat in &lats {
                for &lon in &lons {
                    let tropical = (-(lat / 15.0).powi(2)).exp();
                    let pacific = if (150.0..=280.0).contains(&lon) { 1.0 } else { 0.2 };

                    // Surface temperature: missing over a block standing in for land.
                    let land = (lat > 30.0 && lat < 60.0 && lon > 240.0 && lon < 290.0)
                        || (lat < -80.0);
                    let ts_value = (!land).then(|| {
                        273.15 + 30.0 * lat.to_radians().cos()
                            - 8.0 * cycle * lat.to_radians().sin()
                            + 1.5 * index * tropical * pacific
                            + rng.gauss(0.0, 0.3)
                    });
                    ts.push(year, month, lat, lon, ts_value);

                    // Sea-level pressure: a dipole responding to the index.
                    let dipole = if lon < 180.0 { 1.0 } else { -1.0 };
                    let psl_value = 101_325.0 + 150.0 * dipole * tropical * index
                        - 0.5 * days
                        + rng.gauss(0.0, 40.0);
                    psl.push(year, month, lat, lon, Some(psl_value));
                }
            }
        }
    }

    let stem = |field: &str| outdir.join(format!("{CASENAME}.{field}.{GRID}.{METHOD}.parquet"));
    ts.write_parquet(&stem("TS"), "K")?;
    psl.write_parquet(&stem("PSL"), "Pa")?;

    let field_spec = |name: &str, region: &str| FieldSpec {
        name: name.into(),
        interp_grid: GRID.into(),
        interp_method: METHOD.into(),
        begin_month: 12,
        end_month: 2,
        region: region.into(),
    };
    let config = RunConfig {
        indir: outdir.clone(),
        casename: CASENAME.into(),
        begin_yr: FIRST_YEAR,
        end_yr: LAST_YEAR,
        field: field_spec("PSL", "global"),
        index: field_spec("TS", "Nino3.4"),
        processing: Processing {
            aggregation: Aggregation::Seasonal,
            standardize: true,
        },
        output_dir: outdir.join("regression_output"),
    };
    let config_path = outdir.join("regress.json");
    config.write(&config_path)?;
    println!("Wrote run configuration to {}", config_path.display());
    Ok(())
}
