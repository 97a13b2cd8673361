use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::utils::constants::{MONTHS_PER_YEAR, POWER_FILL_VALUE};

/// Month number (1..=12) to observed temperature; `None` marks a missing observation.
pub type MonthlyTemps = BTreeMap<u32, Option<f64>>;

/// Monthly mean temperatures keyed by `YYYYMM`, as delivered by the remote source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTemperatureSeries {
    values: BTreeMap<String, Option<f64>>,
}

impl MonthlyTemperatureSeries {
    pub fn new(values: BTreeMap<String, Option<f64>>) -> Self {
        Self { values }
    }

    /// Extract the series for `parameter` from a POWER point response.
    ///
    /// Returns `None` when the payload lacks `properties.parameter.<parameter>`.
    /// Nulls, non-numeric values and the POWER fill value become missing observations.
    pub fn from_payload(payload: &Value, parameter: &str) -> Option<Self> {
        let entries = payload
            .get("properties")?
            .get("parameter")?
            .get(parameter)?
            .as_object()?;

        let values = entries
            .iter()
            .map(|(key, value)| {
                let temp = value
                    .as_f64()
                    .filter(|t| t.is_finite() && *t != POWER_FILL_VALUE);
                (key.clone(), temp)
            })
            .collect();

        Some(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Count of calendar months (1..=12) carrying a value.
    pub fn observed_months(&self) -> usize {
        self.values
            .iter()
            .filter(|(key, temp)| temp.is_some() && parse_year_month(key).is_some())
            .count()
    }

    /// Group entries by calendar year.
    ///
    /// Keys that do not parse as `YYYYMM`, and month numbers outside 1..=12
    /// (POWER reports the annual mean as month 13), are dropped.
    pub fn by_year(&self) -> BTreeMap<i32, MonthlyTemps> {
        let mut grouped: BTreeMap<i32, MonthlyTemps> = BTreeMap::new();

        for (key, temp) in &self.values {
            let Some((year, month)) = parse_year_month(key) else {
                continue;
            };
            grouped.entry(year).or_default().insert(month, *temp);
        }

        grouped
    }
}

fn parse_year_month(key: &str) -> Option<(i32, u32)> {
    if key.len() != 6 || !key.is_ascii() {
        return None;
    }
    let year = key[..4].parse::<i32>().ok()?;
    let month = key[4..].parse::<u32>().ok()?;
    if month == 0 || month as usize > MONTHS_PER_YEAR {
        return None;
    }
    Some((year, month))
}
