use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::constants::{ZONE_III_MIN, ZONE_II_MIN, ZONE_IV_MIN, ZONE_VI_MIN, ZONE_V_MIN};

/// Ordinal climate zone derived from the warmth index, I (coldest) to VI (warmest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClimateZone {
    I,
    II,
    III,
    IV,
    V,
    VI,
}

impl ClimateZone {
    pub const ALL: [ClimateZone; 6] = [
        ClimateZone::I,
        ClimateZone::II,
        ClimateZone::III,
        ClimateZone::IV,
        ClimateZone::V,
        ClimateZone::VI,
    ];

    /// Classify a warmth index. Bounds are left-closed, so `15.0` is already zone II.
    pub fn classify(index: f64) -> Self {
        if index < ZONE_II_MIN {
            ClimateZone::I
        } else if index < ZONE_III_MIN {
            ClimateZone::II
        } else if index < ZONE_IV_MIN {
            ClimateZone::III
        } else if index < ZONE_V_MIN {
            ClimateZone::IV
        } else if index < ZONE_VI_MIN {
            ClimateZone::V
        } else {
            ClimateZone::VI
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClimateZone::I => "I",
            ClimateZone::II => "II",
            ClimateZone::III => "III",
            ClimateZone::IV => "IV",
            ClimateZone::V => "V",
            ClimateZone::VI => "VI",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ClimateZone::I => "Subarctic",
            ClimateZone::II => "Cool temperate",
            ClimateZone::III => "Intermediate temperate",
            ClimateZone::IV => "Warm temperate",
            ClimateZone::V => "Subtropical",
            ClimateZone::VI => "Tropical",
        }
    }
}

impl fmt::Display for ClimateZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_are_left_closed() {
        assert_eq!(ClimateZone::classify(14.999), ClimateZone::I);
        assert_eq!(ClimateZone::classify(15.0), ClimateZone::II);
        assert_eq!(ClimateZone::classify(44.9), ClimateZone::II);
        assert_eq!(ClimateZone::classify(45.0), ClimateZone::III);
        assert_eq!(ClimateZone::classify(85.0), ClimateZone::IV);
        assert_eq!(ClimateZone::classify(179.9), ClimateZone::IV);
        assert_eq!(ClimateZone::classify(180.0), ClimateZone::V);
        assert_eq!(ClimateZone::classify(239.9), ClimateZone::V);
        assert_eq!(ClimateZone::classify(240.0), ClimateZone::VI);
    }

    #[test]
    fn test_negative_and_zero_are_coldest() {
        assert_eq!(ClimateZone::classify(0.0), ClimateZone::I);
        assert_eq!(ClimateZone::classify(-12.5), ClimateZone::I);
    }

    #[test]
    fn test_classification_is_monotonic() {
        let mut previous = ClimateZone::classify(-10.0);
        let mut index = -10.0;
        while index < 300.0 {
            let zone = ClimateZone::classify(index);
            assert!(zone >= previous, "zone decreased at index {}", index);
            previous = zone;
            index += 0.25;
        }
        assert_eq!(previous, ClimateZone::VI);
    }

    #[test]
    fn test_serializes_as_roman_label() {
        let json = serde_json::to_string(&ClimateZone::IV).unwrap();
        assert_eq!(json, "\"IV\"");
        let zone: ClimateZone = serde_json::from_str("\"VI\"").unwrap();
        assert_eq!(zone, ClimateZone::VI);
        assert_eq!(ClimateZone::III.to_string(), "III");
    }
}
