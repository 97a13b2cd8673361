use anyhow::Context;
use chrono::Local;
use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, Level};
use validator::Validate;

use crate::cli::args::{Cli, Commands, RunOverrides};
use crate::models::{Dataset, DatasetMetadata};
use crate::processors::{GridProcessor, GridRun};
use crate::readers::{PointCache, PowerClient, TemperatureSource};
use crate::settings::Settings;
use crate::utils::constants::WI_METHOD;
use crate::utils::progress::{ProgressObserver, ProgressReporter};
use crate::writers::{DatasetWriter, FailureLog};

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Generate { overrides } => {
            let settings = load_settings(cli.config.as_deref(), &overrides, false)?;
            generate(&settings).await?;
        }

        Commands::Preview { overrides } => {
            let settings = load_settings(cli.config.as_deref(), &overrides, true)?;

            println!("Preview region: {}", settings.region);
            println!("Years: {}", settings.years());
            print_points(&settings);

            let (dataset, size) = generate(&settings).await?;

            println!("\n{}", dataset.summary().report());
            println!(
                "File size: {} bytes ({:.2} KB)",
                size,
                size as f64 / 1024.0
            );
            println!("Check this file before running the full grid.");
        }

        Commands::Points { overrides } => {
            let settings = load_settings(cli.config.as_deref(), &overrides, false)?;
            print_points(&settings);
        }

        Commands::Info { file } => {
            println!("Analyzing dataset file: {}", file.display());

            let dataset = DatasetWriter::new()
                .read(&file)
                .with_context(|| format!("Failed to read dataset {}", file.display()))?;
            let meta = &dataset.metadata;

            println!("\nMetadata:");
            println!("  Region: {}", meta.region);
            println!("  Test mode: {}", meta.test_mode);
            println!("  Resolution: {}°", meta.resolution);
            println!("  Years: {}", meta.years_range);
            println!("  Grid points: {}", meta.total_points);
            println!("  Failed points: {}", meta.failed_points);
            println!("  Year policy: {}", meta.year_policy);
            println!("  Generated at: {}", meta.generated_at.to_rfc3339());
            println!("  Source: {}", meta.source);
            println!("  Method: {}", meta.wi_method);
            println!("  Fail log: {}", meta.fail_log);
            println!("  Records: {}", dataset.record_count());

            println!("\n{}", dataset.summary().report());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    let result = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

fn load_settings(
    config_file: Option<&Path>,
    overrides: &RunOverrides,
    preview: bool,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::load(config_file).context("Failed to load settings")?;
    if preview {
        settings = settings.preview();
    }
    overrides.apply_to(&mut settings);
    settings.validate().context("Invalid settings")?;
    Ok(settings)
}

fn print_points(settings: &Settings) {
    let points = settings.bounds().points();
    println!("Grid points: {} ({})", points.len(), settings.bounds());
    for (i, point) in points.iter().enumerate() {
        println!("  {}: {}", i + 1, point);
    }
}

/// Run the grid against NASA POWER and write the dataset.
async fn generate(settings: &Settings) -> anyhow::Result<(Dataset, u64)> {
    let client = PowerClient::new(settings.timeout())?;
    let mut progress = ProgressReporter::new(
        settings.bounds().point_count() as u64,
        "Processing grid points...",
        false,
    );

    let (dataset, size) = build_dataset(settings, &client, &mut progress).await?;

    let output = fs::canonicalize(&settings.output_path)
        .unwrap_or_else(|_| settings.output_path.clone());
    println!("Written: {}", output.display());
    println!(
        "Years: {}  Resolution: {}°  Points: {}",
        dataset.metadata.years_range, dataset.metadata.resolution, dataset.metadata.total_points
    );
    println!("Fail log: {}", dataset.metadata.fail_log);

    Ok((dataset, size))
}

/// Run the grid against `source` and write the dataset.
///
/// The cache, the output directory and the failure log are all set up before
/// the first point is visited, so an unusable path aborts the run up front.
pub async fn build_dataset<S, O>(
    settings: &Settings,
    source: &S,
    observer: &mut O,
) -> anyhow::Result<(Dataset, u64)>
where
    S: TemperatureSource + Sync + ?Sized,
    O: ProgressObserver + ?Sized,
{
    let cache = PointCache::open(&settings.cache_dir, source.parameter())?;
    let writer = DatasetWriter::new().with_pretty(settings.pretty);
    writer
        .prepare(&settings.output_path)
        .context("Output location is not writable")?;
    let mut failure_log = FailureLog::create(&settings.fail_log)?;

    let processor = GridProcessor::from_settings(settings).with_parameter(source.parameter());

    info!(
        "Cache: {} | Failure log: {} | Policy: {}",
        cache.dir().display(),
        failure_log.path().display(),
        settings.year_policy
    );

    let run = processor
        .run(source, &cache, &mut failure_log, observer)
        .await
        .context("Grid run aborted")?;
    info!("{}", run.summary());

    let metadata = build_metadata(settings, &run, source.source_name(), failure_log.path());
    let dataset = Dataset::new(metadata, settings.years(), run.results);

    let size = writer
        .write(&dataset, &settings.output_path)
        .context("Failed to write dataset")?;

    Ok((dataset, size))
}

fn build_metadata(
    settings: &Settings,
    run: &GridRun,
    source: &str,
    fail_log: &Path,
) -> DatasetMetadata {
    let fail_log = fs::canonicalize(fail_log).unwrap_or_else(|_| fail_log.to_path_buf());

    DatasetMetadata {
        test_mode: settings.test_mode,
        region: settings.region.clone(),
        resolution: settings.step,
        years_range: settings.years().to_string(),
        total_points: run.total_points,
        failed_points: run.failures.len(),
        year_policy: settings.year_policy.to_string(),
        generated_at: Local::now(),
        source: source.to_string(),
        wi_method: WI_METHOD.to_string(),
        fail_log: fail_log.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    use crate::error::ProcessingError;
    use crate::models::GridPoint;
    use crate::readers::FetchError;
    use crate::utils::progress::ProgressSnapshot;

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TemperatureSource for CountingSource {
        fn source_name(&self) -> &str {
            "counting"
        }

        async fn fetch(
            &self,
            _point: GridPoint,
            _start_year: i32,
            _end_year: i32,
        ) -> std::result::Result<Value, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({"properties": {"parameter": {"T2M": {
                "202201": 2.0, "202202": 3.0, "202203": 7.0, "202204": 12.0,
                "202205": 17.0, "202206": 21.0, "202207": 25.0, "202208": 26.0,
                "202209": 22.0, "202210": 16.0, "202211": 10.0, "202212": 4.0
            }}}}))
        }
    }

    struct Quiet;

    impl ProgressObserver for Quiet {
        fn on_progress(&mut self, _snapshot: &ProgressSnapshot) {}
    }

    fn single_point_settings(dir: &Path) -> Settings {
        Settings {
            region: "Tokyo_test".to_string(),
            lat_min: 35.0,
            lat_max: 35.0,
            lon_min: 139.0,
            lon_max: 139.0,
            step: 1.0,
            start_year: 2022,
            end_year: 2022,
            request_delay_ms: 0,
            cache_dir: dir.join("cache"),
            output_path: dir.join("public").join("grid.json"),
            fail_log: dir.join("failures.csv"),
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn test_unwritable_output_aborts_before_any_fetch() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let mut settings = single_point_settings(dir.path());
        settings.output_path = blocker.join("out").join("grid.json");
        fs::write(&settings.fail_log, "lat,lon,reason\n35.0,139.0,error:Timeout\n").unwrap();

        let source = CountingSource {
            calls: AtomicUsize::new(0),
        };
        let result = build_dataset(&settings, &source, &mut Quiet).await;

        let error = result.unwrap_err();
        assert!(error.chain().any(|cause| matches!(
            cause.downcast_ref::<ProcessingError>(),
            Some(ProcessingError::Persistence { .. })
        )));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        // Previous failure log is left as it was
        assert_eq!(
            fs::read_to_string(&settings.fail_log).unwrap(),
            "lat,lon,reason\n35.0,139.0,error:Timeout\n"
        );
    }

    #[tokio::test]
    async fn test_build_dataset_writes_artifact() {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            test_mode: true,
            ..single_point_settings(dir.path())
        };
        let source = CountingSource {
            calls: AtomicUsize::new(0),
        };

        let (dataset, size) = build_dataset(&settings, &source, &mut Quiet).await.unwrap();

        assert!(size > 0);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(dataset.metadata.test_mode);
        assert_eq!(dataset.metadata.region, "Tokyo_test");
        assert_eq!(dataset.metadata.source, "counting");
        assert!(Path::new(&dataset.metadata.fail_log).is_absolute());
        assert_eq!(dataset.data["2022"].len(), 1);
        // 2+7+12+16+20+21+17+11+5 over the 5 °C baseline
        assert_eq!(dataset.data["2022"][0].wi, 111.0);

        let written = DatasetWriter::new().read(&settings.output_path).unwrap();
        assert!(written.metadata.test_mode);
        assert_eq!(written.data, dataset.data);
    }
}
