use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

use crate::utils::coordinates::{inclusive_steps, round_tenth};

/// A sample location on the grid, fixed to one decimal place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GridPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat: round_tenth(lat),
            lon: round_tenth(lon),
        }
    }

    /// Stable key fragment used for cache file names, e.g. `35.0_139.0`
    pub fn key(&self) -> String {
        format!("{:.1}_{:.1}", self.lat, self.lon)
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lat={:.1} lon={:.1}", self.lat, self.lon)
    }
}

/// Bounding box plus step size, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
    pub step: f64,
}

impl GridBounds {
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64, step: f64) -> Self {
        Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
            step,
        }
    }

    /// Enumerate every grid point, latitude-major and longitude-minor.
    pub fn points(&self) -> Vec<GridPoint> {
        let lats = inclusive_steps(self.lat_min, self.lat_max, self.step);
        let lons = inclusive_steps(self.lon_min, self.lon_max, self.step);

        let mut points = Vec::with_capacity(lats.len() * lons.len());
        for &lat in &lats {
            for &lon in &lons {
                points.push(GridPoint::new(lat, lon));
            }
        }
        points
    }

    pub fn point_count(&self) -> usize {
        inclusive_steps(self.lat_min, self.lat_max, self.step).len()
            * inclusive_steps(self.lon_min, self.lon_max, self.step).len()
    }
}

impl fmt::Display for GridBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lat {}..{}, lon {}..{}, step {}°",
            self.lat_min, self.lat_max, self.lon_min, self.lon_max, self.step
        )
    }
}

/// Inclusive span of calendar years requested from the remote source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.start..=self.end
    }

    pub fn contains(&self, year: i32) -> bool {
        self.years().contains(&year)
    }

    pub fn len(&self) -> usize {
        self.years().count()
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kanto_grid_enumeration() {
        let bounds = GridBounds::new(35.0, 37.0, 139.0, 141.0, 1.0);
        let points = bounds.points();

        assert_eq!(points.len(), 9);
        assert_eq!(bounds.point_count(), 9);
        assert_eq!(points[0], GridPoint::new(35.0, 139.0));
        assert_eq!(points[1], GridPoint::new(35.0, 140.0));
        assert_eq!(points[3], GridPoint::new(36.0, 139.0));
        assert_eq!(points[8], GridPoint::new(37.0, 141.0));
    }

    #[test]
    fn test_fine_grid_has_no_duplicates() {
        let bounds = GridBounds::new(35.0, 36.0, 139.0, 139.5, 0.1);
        let points = bounds.points();

        assert_eq!(points.len(), 11 * 6);
        for pair in points.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_point_rounding_and_key() {
        let point = GridPoint::new(35.04, 139.96);
        assert_eq!(point.key(), "35.0_140.0");
        assert_eq!(point.to_string(), "lat=35.0 lon=140.0");

        let equator = GridPoint::new(-0.01, -0.04);
        assert_eq!(equator.key(), "0.0_0.0");
    }

    #[test]
    fn test_year_range() {
        let range = YearRange::new(2022, 2024);
        assert_eq!(range.len(), 3);
        assert!(range.contains(2023));
        assert!(!range.contains(2021));
        assert_eq!(range.to_string(), "2022-2024");
        assert!(YearRange::new(2024, 2022).is_empty());
    }
}
