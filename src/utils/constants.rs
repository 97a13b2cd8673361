/// NASA POWER monthly point endpoint
pub const POWER_BASE_URL: &str = "https://power.larc.nasa.gov/api/temporal/monthly/point";
pub const POWER_PARAMETER: &str = "T2M";
pub const POWER_COMMUNITY: &str = "SB";
pub const POWER_FORMAT: &str = "JSON";
/// POWER encodes missing observations with this fill value
pub const POWER_FILL_VALUE: f64 = -999.0;
pub const USER_AGENT: &str = concat!("warmth-grid/", env!("CARGO_PKG_VERSION"));

/// Warmth index
pub const WARMTH_BASELINE: f64 = 5.0;
pub const MONTHS_PER_YEAR: usize = 12;
pub const WI_METHOD: &str = "sum(max(T_month-5,0)) using NASA POWER T2M (monthly)";

/// Zone lower bounds (left-closed)
pub const ZONE_II_MIN: f64 = 15.0;
pub const ZONE_III_MIN: f64 = 45.0;
pub const ZONE_IV_MIN: f64 = 85.0;
pub const ZONE_V_MIN: f64 = 180.0;
pub const ZONE_VI_MIN: f64 = 240.0;

/// Grid enumeration
pub const COORD_EPSILON: f64 = 1e-9;
/// Points are rounded to 0.1°, finer steps only repeat coordinates
pub const MIN_GRID_STEP: f64 = 0.1;

/// Japan bounds (Okinawa to Hokkaido)
pub const DEFAULT_REGION: &str = "Japan_0.5deg";
pub const DEFAULT_LAT_MIN: f64 = 24.0;
pub const DEFAULT_LAT_MAX: f64 = 46.0;
pub const DEFAULT_LON_MIN: f64 = 123.0;
pub const DEFAULT_LON_MAX: f64 = 146.0;
pub const DEFAULT_STEP: f64 = 0.5;
pub const DEFAULT_START_YEAR: i32 = 1992;
pub const DEFAULT_END_YEAR: i32 = 2024;

/// Processing defaults
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 500;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PROGRESS_EVERY: usize = 50;
pub const DEFAULT_CACHE_DIR: &str = "cache/power_T2M";
pub const DEFAULT_OUTPUT_PATH: &str = "output/climate-grid.json";
pub const DEFAULT_FAIL_LOG: &str = "fetch_failures.csv";

/// Kanto preview preset
pub const PREVIEW_REGION: &str = "Kanto_test";
pub const PREVIEW_LAT_MIN: f64 = 35.0;
pub const PREVIEW_LAT_MAX: f64 = 37.0;
pub const PREVIEW_LON_MIN: f64 = 139.0;
pub const PREVIEW_LON_MAX: f64 = 141.0;
pub const PREVIEW_STEP: f64 = 1.0;
pub const PREVIEW_START_YEAR: i32 = 2022;
pub const PREVIEW_END_YEAR: i32 = 2024;
pub const PREVIEW_REQUEST_DELAY_MS: u64 = 1000;
pub const PREVIEW_OUTPUT_PATH: &str = "test_climate_data.json";
pub const PREVIEW_FAIL_LOG: &str = "fetch_failures_preview.csv";

/// Failure reasons
pub const REASON_NO_MONTHS: &str = "no_months";
pub const REASON_NO_VALID_YEARS: &str = "no_valid_years";
pub const REASON_ERROR_PREFIX: &str = "error:";
