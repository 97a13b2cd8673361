use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{ClimateZone, GridPoint, YearRange};

/// One classified grid point for one year.
///
/// Field names are read by the map front end and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridRecord {
    pub lat: f64,
    pub lon: f64,
    pub wi: f64,
    pub zone: ClimateZone,
}

impl GridRecord {
    pub fn new(point: GridPoint, wi: f64, zone: ClimateZone) -> Self {
        Self {
            lat: point.lat,
            lon: point.lon,
            wi,
            zone,
        }
    }
}

/// A point that produced no usable data in this run.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureRecord {
    pub point: GridPoint,
    pub reason: String,
}

/// Per-year record sequences in grid enumeration order
pub type YearlyResults = BTreeMap<i32, Vec<GridRecord>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    /// Set for the small preview preset, so consumers can refuse it as a full map
    #[serde(default)]
    pub test_mode: bool,
    pub region: String,
    pub resolution: f64,
    pub years_range: String,
    pub total_points: usize,
    #[serde(default)]
    pub failed_points: usize,
    #[serde(default)]
    pub year_policy: String,
    pub generated_at: DateTime<Local>,
    pub source: String,
    pub wi_method: String,
    pub fail_log: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub metadata: DatasetMetadata,
    pub data: BTreeMap<String, Vec<GridRecord>>,
}

impl Dataset {
    /// Build the dataset, keeping a (possibly empty) entry for every year in `years`.
    pub fn new(metadata: DatasetMetadata, years: YearRange, mut results: YearlyResults) -> Self {
        let data = years
            .years()
            .map(|year| (year.to_string(), results.remove(&year).unwrap_or_default()))
            .collect();

        Self { metadata, data }
    }

    pub fn record_count(&self) -> usize {
        self.data.values().map(Vec::len).sum()
    }

    pub fn summary(&self) -> DatasetSummary {
        let years = self
            .data
            .iter()
            .map(|(year, records)| {
                let mut zones: BTreeMap<ClimateZone, usize> = BTreeMap::new();
                for record in records {
                    *zones.entry(record.zone).or_default() += 1;
                }
                YearSummary {
                    year: year.clone(),
                    points: records.len(),
                    zones,
                }
            })
            .collect();

        DatasetSummary { years }
    }
}

#[derive(Debug, Clone)]
pub struct YearSummary {
    pub year: String,
    pub points: usize,
    pub zones: BTreeMap<ClimateZone, usize>,
}

#[derive(Debug, Clone)]
pub struct DatasetSummary {
    pub years: Vec<YearSummary>,
}

impl DatasetSummary {
    pub fn report(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Dataset Summary ===\n");
        report.push_str(&format!(
            "Years: {}\n",
            self.years
                .iter()
                .map(|y| y.year.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));

        for year in &self.years {
            report.push_str(&format!("  {}: {} points\n", year.year, year.points));
            if !year.zones.is_empty() {
                let zones = year
                    .zones
                    .iter()
                    .map(|(zone, count)| format!("{}={}", zone, count))
                    .collect::<Vec<_>>()
                    .join(" ");
                report.push_str(&format!("    zones: {}\n", zones));
            }
        }

        report
    }
}
