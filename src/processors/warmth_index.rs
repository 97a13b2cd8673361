use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::models::{MonthlyTemperatureSeries, MonthlyTemps, YearRange};
use crate::utils::constants::{MONTHS_PER_YEAR, WARMTH_BASELINE};

/// How many observed months a year needs before it receives an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum YearPolicy {
    /// At least one observed month
    #[default]
    AnyMonth,
    /// All twelve months observed
    FullYear,
}

impl YearPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            YearPolicy::AnyMonth => "any-month",
            YearPolicy::FullYear => "full-year",
        }
    }

    pub fn accepts(&self, observed_months: usize) -> bool {
        match self {
            YearPolicy::AnyMonth => observed_months >= 1,
            YearPolicy::FullYear => observed_months >= MONTHS_PER_YEAR,
        }
    }
}

impl fmt::Display for YearPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Warmth index of one year: the sum of `max(t - 5, 0)` over observed months,
/// rounded to one decimal place.
///
/// Returns `None` when no month is observed; the year must then be left out
/// rather than reported as zero.
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
/// use warmth_grid::processors::compute_index;
///
/// let months = BTreeMap::from([(1, Some(7.0)), (2, None), (3, Some(4.0))]);
/// assert_eq!(compute_index(&months), Some(2.0));
/// ```
pub fn compute_index(monthly: &MonthlyTemps) -> Option<f64> {
    let mut observed = 0;
    let mut sum = 0.0;

    for temp in monthly.values().flatten() {
        observed += 1;
        sum += (temp - WARMTH_BASELINE).max(0.0);
    }

    if observed == 0 {
        return None;
    }

    Some((sum * 10.0).round() / 10.0)
}

/// Warmth index for every year in `years` that satisfies `policy`.
pub fn yearly_index(
    series: &MonthlyTemperatureSeries,
    years: YearRange,
    policy: YearPolicy,
) -> BTreeMap<i32, f64> {
    let grouped = series.by_year();

    let counts: BTreeMap<i32, usize> = grouped
        .iter()
        .filter(|(year, _)| years.contains(**year))
        .map(|(year, months)| (*year, months.values().flatten().count()))
        .collect();
    debug!("Observed months per year: {:?}", counts);

    grouped
        .iter()
        .filter(|(year, _)| years.contains(**year))
        .filter(|(year, _)| policy.accepts(counts[*year]))
        .filter_map(|(year, months)| compute_index(months).map(|wi| (*year, wi)))
        .collect()
}
