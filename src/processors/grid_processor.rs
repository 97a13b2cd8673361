use serde_json::Value;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::error::Result;
use crate::models::{
    ClimateZone, FailureRecord, GridBounds, GridPoint, GridRecord, MonthlyTemperatureSeries,
    YearRange, YearlyResults,
};
use crate::processors::warmth_index::{yearly_index, YearPolicy};
use crate::readers::{PointCache, TemperatureSource};
use crate::settings::Settings;
use crate::utils::constants::{
    DEFAULT_PROGRESS_EVERY, POWER_PARAMETER, REASON_ERROR_PREFIX, REASON_NO_MONTHS,
    REASON_NO_VALID_YEARS,
};
use crate::utils::progress::{ProgressObserver, ProgressSnapshot};
use crate::writers::FailureLog;

/// Why a point that was retrieved still yields nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoDataReason {
    /// Payload lacks the parameter series, or the series has no observed month
    NoMonths,
    /// Months were observed but no year in range passes the year policy
    NoValidYears,
}

impl NoDataReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoDataReason::NoMonths => REASON_NO_MONTHS,
            NoDataReason::NoValidYears => REASON_NO_VALID_YEARS,
        }
    }
}

/// Outcome of resolving a single grid point.
#[derive(Debug, Clone, PartialEq)]
pub enum PointStatus {
    /// Served from cache; year → warmth index
    Hit(BTreeMap<i32, f64>),
    /// Fetched from the remote source; year → warmth index
    FetchedOk(BTreeMap<i32, f64>),
    /// Remote call failed, carrying the error kind
    FetchFailed(&'static str),
    NoUsableData(NoDataReason),
}

impl PointStatus {
    pub fn indices(&self) -> Option<&BTreeMap<i32, f64>> {
        match self {
            PointStatus::Hit(indices) | PointStatus::FetchedOk(indices) => Some(indices),
            PointStatus::FetchFailed(_) | PointStatus::NoUsableData(_) => None,
        }
    }

    /// Failure-log reason for this outcome, `None` when the point produced data.
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            PointStatus::Hit(_) | PointStatus::FetchedOk(_) => None,
            PointStatus::FetchFailed(kind) => Some(format!("{}{}", REASON_ERROR_PREFIX, kind)),
            PointStatus::NoUsableData(reason) => Some(reason.as_str().to_string()),
        }
    }
}

/// Everything accumulated by one run over the grid.
#[derive(Debug, Clone)]
pub struct GridRun {
    pub results: YearlyResults,
    pub failures: Vec<FailureRecord>,
    pub total_points: usize,
    pub cached_points: usize,
    pub fetched_points: usize,
    pub elapsed: Duration,
}

impl GridRun {
    pub fn summary(&self) -> String {
        let records: usize = self.results.values().map(Vec::len).sum();
        format!(
            "Points: {} (cache {}, fetched {}, failed {})  Records: {}  Elapsed: {:.1}s",
            self.total_points,
            self.cached_points,
            self.fetched_points,
            self.failures.len(),
            records,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Drives cache, remote source, warmth index and zone classification over every
/// grid point, one point at a time.
pub struct GridProcessor {
    bounds: GridBounds,
    years: YearRange,
    policy: YearPolicy,
    parameter: String,
    request_delay: Duration,
    progress_every: usize,
}

impl GridProcessor {
    pub fn new(bounds: GridBounds, years: YearRange) -> Self {
        Self {
            bounds,
            years,
            policy: YearPolicy::default(),
            parameter: POWER_PARAMETER.to_string(),
            request_delay: Duration::ZERO,
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.bounds(), settings.years())
            .with_policy(settings.year_policy)
            .with_request_delay(settings.request_delay())
            .with_progress_every(settings.progress_every)
    }

    pub fn with_policy(mut self, policy: YearPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_parameter(mut self, parameter: &str) -> Self {
        self.parameter = parameter.to_string();
        self
    }

    /// Pause after every successful network call. Cache hits are never delayed.
    pub fn with_request_delay(mut self, request_delay: Duration) -> Self {
        self.request_delay = request_delay;
        self
    }

    pub fn with_progress_every(mut self, progress_every: usize) -> Self {
        self.progress_every = progress_every.max(1);
        self
    }

    /// Process every grid point and return the accumulated results.
    ///
    /// Per-point failures are recorded and never abort the run; only
    /// persistence errors (cache or failure log) are returned.
    pub async fn run<S, O>(
        &self,
        source: &S,
        cache: &PointCache,
        failure_log: &mut FailureLog,
        observer: &mut O,
    ) -> Result<GridRun>
    where
        S: TemperatureSource + Sync + ?Sized,
        O: ProgressObserver + ?Sized,
    {
        let points = self.bounds.points();
        let total = points.len();
        let started = Instant::now();

        info!(
            "Target bbox: {} | Years: {} | Total grid points: {}",
            self.bounds, self.years, total
        );

        let mut results: YearlyResults = self.years.years().map(|y| (y, Vec::new())).collect();
        let mut failures = Vec::new();
        let mut cached_points = 0;
        let mut fetched_points = 0;

        for (i, point) in points.into_iter().enumerate() {
            let status = self.resolve_point(source, cache, point).await?;

            match status {
                PointStatus::Hit(_) => cached_points += 1,
                PointStatus::FetchedOk(_) => fetched_points += 1,
                _ => {}
            }

            if let Some(indices) = status.indices() {
                for (year, wi) in indices {
                    results
                        .entry(*year)
                        .or_default()
                        .push(GridRecord::new(point, *wi, ClimateZone::classify(*wi)));
                }
            }

            if let Some(reason) = status.failure_reason() {
                let record = FailureRecord { point, reason };
                failure_log.append(&record)?;
                failures.push(record);
            }

            let processed = i + 1;
            if processed % self.progress_every == 0 || processed == total {
                observer.on_progress(&ProgressSnapshot::new(processed, total, started.elapsed()));
            }
        }

        let elapsed = started.elapsed();
        observer.on_finish(&ProgressSnapshot::new(total, total, elapsed));

        Ok(GridRun {
            results,
            failures,
            total_points: total,
            cached_points,
            fetched_points,
            elapsed,
        })
    }

    /// Resolve one point: cache lookup, then a single fetch on a miss.
    pub async fn resolve_point<S>(
        &self,
        source: &S,
        cache: &PointCache,
        point: GridPoint,
    ) -> Result<PointStatus>
    where
        S: TemperatureSource + Sync + ?Sized,
    {
        let (start, end) = (self.years.start, self.years.end);

        if let Some(payload) = cache.get(point, start, end) {
            return Ok(match self.derive(&payload, point) {
                Ok(indices) => PointStatus::Hit(indices),
                Err(reason) => PointStatus::NoUsableData(reason),
            });
        }

        let payload = match source.fetch(point, start, end).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("ERROR FETCH {}: {}", e.point(), e);
                return Ok(PointStatus::FetchFailed(e.kind()));
            }
        };

        cache.put(point, start, end, &payload)?;
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        Ok(match self.derive(&payload, point) {
            Ok(indices) => PointStatus::FetchedOk(indices),
            Err(reason) => PointStatus::NoUsableData(reason),
        })
    }

    fn derive(
        &self,
        payload: &Value,
        point: GridPoint,
    ) -> std::result::Result<BTreeMap<i32, f64>, NoDataReason> {
        let Some(series) = MonthlyTemperatureSeries::from_payload(payload, &self.parameter) else {
            let keys: Vec<&String> = payload
                .as_object()
                .map(|o| o.keys().collect())
                .unwrap_or_default();
            warn!("Invalid payload structure for {}: keys={:?}", point, keys);
            return Err(NoDataReason::NoMonths);
        };

        if series.observed_months() == 0 {
            return Err(NoDataReason::NoMonths);
        }

        let indices = yearly_index(&series, self.years, self.policy);
        if indices.is_empty() {
            return Err(NoDataReason::NoValidYears);
        }

        Ok(indices)
    }
}
