use std::fmt::Write as _;
use std::path::Path;

use approx::assert_abs_diff_eq;
use index_regression::export::{self, RunSummary};
use index_regression::pipeline;
use index_regression::{FileSource, RegressError, RunConfig};
use tempfile::tempdir;

const LATS: [f64; 3] = [-2.5, 2.5, 45.0];
const LONS: [f64; 2] = [200.0, 230.0];

fn index_value(year: i32, month: u32) -> f64 {
    let t = (year - 1990) as f64 * 12.0 + month as f64;
    299.0 + (t * 0.37).sin() * 1.5 + (t * 0.05).cos()
}

/// TS (K) and PSL (Pa) files where PSL = 2·TS + 3 at every cell,
/// except one PSL cell that is missing in a single month.
fn write_case(dir: &Path) {
    let mut ts = String::from("year,month,lat,lon,value,units\n");
    let mut psl = String::from("year,month,lat,lon,value,units\n");
    for year in 1990..=1995 {
        for month in 1..=12 {
            let x = index_value(year, month);
            for lat in LATS {
                for lon in LONS {
                    writeln!(ts, "{year},{month},{lat},{lon},{x},K").unwrap();
                    let y = if lat == 45.0 && lon == 230.0 && year == 1993 && month == 1 {
                        String::new()
                    } else {
                        (2.0 * x + 3.0).to_string()
                    };
                    writeln!(psl, "{year},{month},{lat},{lon},{y},Pa").unwrap();
                }
            }
        }
    }
    std::fs::write(dir.join("case.TS.2x2.bilinear.csv"), ts).unwrap();
    std::fs::write(dir.join("case.PSL.2x2.bilinear.csv"), psl).unwrap();
}

/// Drop every record of one month from a written CSV file.
fn drop_month(path: &Path, year: i32, month: u32) {
    let prefix = format!("{year},{month},");
    let text = std::fs::read_to_string(path).unwrap();
    let kept: String = text
        .lines()
        .filter(|line| !line.starts_with(&prefix))
        .map(|line| format!("{line}\n"))
        .collect();
    std::fs::write(path, kept).unwrap();
}

fn config(dir: &Path, processing: &str) -> RunConfig {
    let text = format!(
        r#"{{
            "indir": {indir:?},
            "casename": "case",
            "begin_yr": 1990,
            "end_yr": 1995,
            "field": {{ "name": "PSL", "interp_grid": "2x2", "interp_method": "bilinear",
                        "begin_month": 12, "end_month": 2, "region": "global" }},
            "index": {{ "name": "TS", "interp_grid": "2x2", "interp_method": "bilinear",
                        "begin_month": 12, "end_month": 2, "region": "Nino3.4" }},
            "processing": {processing},
            "output_dir": {out:?}
        }}"#,
        indir = dir.display().to_string(),
        out = dir.join("out").display().to_string(),
    );
    let path = dir.join("regress.json");
    std::fs::write(&path, text).unwrap();
    RunConfig::from_path(&path).unwrap()
}

#[test]
fn seasonal_regression_from_files() {
    let dir = tempdir().unwrap();
    write_case(dir.path());
    let config = config(dir.path(), r#"{ "aggregation": "seasonal" }"#);
    let setup = config.validate().unwrap();
    let source = FileSource::new(&config.indir);

    let result = pipeline::regress_field_on_index(&source, &setup).unwrap();
    assert_eq!(result.units, "Pa/K");
    assert_eq!(result.spatial_shape(), (LATS.len(), LONS.len()));
    // DJF 1990/91 .. 1994/95
    assert_eq!(result.n_samples, 5);
    for ((i, j), &slope) in result.slope.indexed_iter() {
        if i == 2 && j == 1 {
            assert!(slope.is_nan(), "gappy cell should be missing");
            continue;
        }
        assert_abs_diff_eq!(slope, 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.intercept[[i, j]], 3.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.correlation[[i, j]], 1.0, epsilon = 1e-9);
    }

    let clim = pipeline::regional_climatology(&source, &setup.index).unwrap();
    assert!(clim > 296.0 && clim < 302.0);

    let summary = RunSummary::new(&setup, &result, clim);
    assert_eq!(summary.missing_points, 1);
    std::fs::create_dir_all(&config.output_dir).unwrap();
    let maps = config.output_dir.join(format!("{}.csv", summary.file_stem()));
    export::write_maps_csv(&maps, &result).unwrap();
    assert_eq!(std::fs::read_to_string(&maps).unwrap().lines().count(), 1 + 6);
}

#[test]
fn standardized_monthly_regression_from_files() {
    let dir = tempdir().unwrap();
    write_case(dir.path());
    let config = config(
        dir.path(),
        r#"{ "aggregation": { "monthly": { "remove_annual_cycle": false } }, "standardize": true }"#,
    );
    let setup = config.validate().unwrap();
    let source = FileSource::new(&config.indir);

    let result = pipeline::regress_field_on_index(&source, &setup).unwrap();
    assert_eq!(result.units, "Pa");
    assert_eq!(result.n_samples, 15);
    assert_abs_diff_eq!(result.correlation[[0, 0]], 1.0, epsilon = 1e-9);
}

#[test]
fn files_with_gaps_in_different_winters_pair_by_year() {
    let dir = tempdir().unwrap();
    write_case(dir.path());
    // TS loses winter 1990/91, PSL loses winter 1992/93 (and its gappy cell).
    drop_month(&dir.path().join("case.TS.2x2.bilinear.csv"), 1991, 1);
    drop_month(&dir.path().join("case.PSL.2x2.bilinear.csv"), 1993, 2);
    let config = config(dir.path(), r#"{ "aggregation": "seasonal" }"#);
    let setup = config.validate().unwrap();
    let source = FileSource::new(&config.indir);

    let result = pipeline::regress_field_on_index(&source, &setup).unwrap();
    assert_eq!(result.n_samples, 3);
    assert_eq!(result.missing_points(), 0);
    for ((i, j), &slope) in result.slope.indexed_iter() {
        assert_abs_diff_eq!(slope, 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.correlation[[i, j]], 1.0, epsilon = 1e-9);
    }
}

#[test]
fn missing_case_reports_request() {
    let dir = tempdir().unwrap();
    write_case(dir.path());
    let mut config = config(dir.path(), r#"{ "aggregation": "seasonal" }"#);
    config.casename = "other_case".into();
    let setup = config.validate().unwrap();
    let source = FileSource::new(&config.indir);

    let err = pipeline::regress_field_on_index(&source, &setup).unwrap_err();
    assert!(matches!(err, RegressError::DataNotFound { .. }));
    let message = err.to_string();
    assert!(message.contains("other_case"));
    assert!(message.contains("TS"));
    assert!(message.contains("1990-1995"));
}
