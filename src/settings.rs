use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use validator::{Validate, ValidationError};

use crate::error::Result;
use crate::models::{GridBounds, YearRange};
use crate::processors::YearPolicy;
use crate::utils::constants::*;

const ENV_PREFIX: &str = "WARMTH_GRID";

/// Run parameters, fixed at startup.
///
/// Layered as built-in defaults, then an optional config file, then
/// `WARMTH_GRID_*` environment variables. CLI flags are applied on top by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_ordering"))]
pub struct Settings {
    #[validate(length(min = 1))]
    pub region: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub lat_min: f64,

    #[validate(range(min = -90.0, max = 90.0))]
    pub lat_max: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub lon_min: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub lon_max: f64,

    // Points are rounded to 0.1°, a finer step would only produce duplicates
    #[validate(range(min = 0.1, max = 90.0))]
    pub step: f64,

    #[validate(range(min = 1981, max = 2100))]
    pub start_year: i32,

    #[validate(range(min = 1981, max = 2100))]
    pub end_year: i32,

    pub request_delay_ms: u64,

    #[validate(range(min = 1))]
    pub timeout_secs: u64,

    pub cache_dir: PathBuf,
    pub output_path: PathBuf,
    pub fail_log: PathBuf,
    pub year_policy: YearPolicy,

    #[validate(range(min = 1))]
    pub progress_every: usize,

    pub pretty: bool,

    /// Marks the artifact as a small preview rather than a full map
    pub test_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            lat_min: DEFAULT_LAT_MIN,
            lat_max: DEFAULT_LAT_MAX,
            lon_min: DEFAULT_LON_MIN,
            lon_max: DEFAULT_LON_MAX,
            step: DEFAULT_STEP,
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            fail_log: PathBuf::from(DEFAULT_FAIL_LOG),
            year_policy: YearPolicy::AnyMonth,
            progress_every: DEFAULT_PROGRESS_EVERY,
            pretty: false,
            test_mode: false,
        }
    }
}

impl Settings {
    /// Load settings from defaults, an optional file and the environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let defaults = Settings::default();

        let mut builder = Config::builder()
            .set_default("region", defaults.region.as_str())?
            .set_default("lat_min", defaults.lat_min)?
            .set_default("lat_max", defaults.lat_max)?
            .set_default("lon_min", defaults.lon_min)?
            .set_default("lon_max", defaults.lon_max)?
            .set_default("step", defaults.step)?
            .set_default("start_year", defaults.start_year as i64)?
            .set_default("end_year", defaults.end_year as i64)?
            .set_default("request_delay_ms", defaults.request_delay_ms as i64)?
            .set_default("timeout_secs", defaults.timeout_secs as i64)?
            .set_default("cache_dir", DEFAULT_CACHE_DIR)?
            .set_default("output_path", DEFAULT_OUTPUT_PATH)?
            .set_default("fail_log", DEFAULT_FAIL_LOG)?
            .set_default("year_policy", defaults.year_policy.as_str())?
            .set_default("progress_every", defaults.progress_every as i64)?
            .set_default("pretty", defaults.pretty)?
            .set_default("test_mode", defaults.test_mode)?;

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Small strict run over Kanto used to check the pipeline before a full run.
    ///
    /// Keeps the cache location and timeout of `self`.
    pub fn preview(self) -> Self {
        Self {
            region: PREVIEW_REGION.to_string(),
            lat_min: PREVIEW_LAT_MIN,
            lat_max: PREVIEW_LAT_MAX,
            lon_min: PREVIEW_LON_MIN,
            lon_max: PREVIEW_LON_MAX,
            step: PREVIEW_STEP,
            start_year: PREVIEW_START_YEAR,
            end_year: PREVIEW_END_YEAR,
            request_delay_ms: PREVIEW_REQUEST_DELAY_MS,
            output_path: PathBuf::from(PREVIEW_OUTPUT_PATH),
            fail_log: PathBuf::from(PREVIEW_FAIL_LOG),
            year_policy: YearPolicy::FullYear,
            progress_every: 1,
            pretty: true,
            test_mode: true,
            ..self
        }
    }

    pub fn bounds(&self) -> GridBounds {
        GridBounds::new(
            self.lat_min,
            self.lat_max,
            self.lon_min,
            self.lon_max,
            self.step,
        )
    }

    pub fn years(&self) -> YearRange {
        YearRange::new(self.start_year, self.end_year)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn validate_ordering(settings: &Settings) -> std::result::Result<(), ValidationError> {
    if settings.lat_min > settings.lat_max {
        return Err(ValidationError::new("lat_min_exceeds_lat_max"));
    }
    if settings.lon_min > settings.lon_max {
        return Err(ValidationError::new("lon_min_exceeds_lon_max"));
    }
    if settings.start_year > settings.end_year {
        return Err(ValidationError::new("start_year_exceeds_end_year"));
    }
    Ok(())
}
