use std::path::PathBuf;

use anyhow::{Context, Result};

use index_regression::data::source::FileSource;
use index_regression::export::{self, RunSummary};
use index_regression::pipeline;
use index_regression::RunConfig;

fn main() -> Result<()> {
    env_logger::init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("regress.json"));
    let config = RunConfig::from_path(&config_path)?;
    let setup = config.validate()?;

    let source = FileSource::new(&config.indir);
    let result = pipeline::regress_field_on_index(&source, &setup)?;
    let climatology = pipeline::regional_climatology(&source, &setup.index)?;

    let summary = RunSummary::new(&setup, &result, climatology);
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;

    let stem = summary.file_stem();
    let maps_path = config.output_dir.join(format!("{stem}.csv"));
    let summary_path = config.output_dir.join(format!("{stem}.json"));
    export::write_maps_csv(&maps_path, &result)?;
    summary.write_json(&summary_path)?;

    log::info!(
        "wrote {} and {} ({} samples, units {}, {} missing points)",
        maps_path.display(),
        summary_path.display(),
        result.n_samples,
        result.units,
        result.missing_points()
    );
    Ok(())
}
