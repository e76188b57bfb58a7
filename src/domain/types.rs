//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - passed between pipeline stages without conversion
//! - exported to JSON for auditing a run
//! - fed straight into the model as a fixed-order vector

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Total quantity sold on one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyQty {
    pub date: NaiveDate,
    pub qty: f64,
}

/// A date's relation to the nearest listed public holiday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayType {
    PublicHoliday,
    DayBefore,
    DayAfter,
    Other,
}

impl DayType {
    pub fn as_str(self) -> &'static str {
        match self {
            DayType::PublicHoliday => "PublicHoliday",
            DayType::DayBefore => "DayBefore",
            DayType::DayAfter => "DayAfter",
            DayType::Other => "Other",
        }
    }
}

impl std::fmt::Display for DayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Forecast values for today, taken from the first forecast interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Max temperature in °C.
    pub max_temp: f64,
    /// Rain volume in mm over the interval (0 when the service omits it).
    pub rain_mm: f64,
    /// Cloud cover in percent.
    pub cloud_pct: f64,
}

/// Calendar flags for one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFlags {
    pub school_holiday: bool,
    pub day_type: DayType,
}

/// Number of fields in [`FeatureRecord`].
pub const FEATURE_COUNT: usize = 13;

/// Model input schema version. Bump whenever the field list or order changes.
pub const FEATURE_SCHEMA_VERSION: u32 = 1;

/// Field names in the exact order the model consumes them.
///
/// This is the interface contract with the model artifact: an artifact must
/// declare the same list (same names, same order) to be loadable.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "TempBand",
    "RainBand",
    "Sunny",
    "Cloudy",
    "Month",
    "DayOfWeek",
    "Season",
    "PublicHoliday",
    "DayBeforePH",
    "DayAfterPH",
    "SchoolHoliday",
    "prev_1",
    "avg_7",
];

/// The model's input row.
///
/// Field declaration order matches [`FEATURE_NAMES`] so the JSON export keeps
/// the schema order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    #[serde(rename = "TempBand")]
    pub temp_band: u8,
    #[serde(rename = "RainBand")]
    pub rain_band: u8,
    #[serde(rename = "Sunny")]
    pub sunny: u8,
    #[serde(rename = "Cloudy")]
    pub cloudy: u8,
    #[serde(rename = "Month")]
    pub month: u32,
    /// Monday = 0 .. Sunday = 6.
    #[serde(rename = "DayOfWeek")]
    pub day_of_week: u32,
    #[serde(rename = "Season")]
    pub season: u8,
    #[serde(rename = "PublicHoliday")]
    pub public_holiday: u8,
    #[serde(rename = "DayBeforePH")]
    pub day_before_ph: u8,
    #[serde(rename = "DayAfterPH")]
    pub day_after_ph: u8,
    #[serde(rename = "SchoolHoliday")]
    pub school_holiday: u8,
    pub prev_1: f64,
    /// NaN when there is no sales history at all.
    pub avg_7: f64,
}

impl FeatureRecord {
    /// Flatten into model input order.
    pub fn to_vector(&self) -> [f64; FEATURE_COUNT] {
        [
            f64::from(self.temp_band),
            f64::from(self.rain_band),
            f64::from(self.sunny),
            f64::from(self.cloudy),
            f64::from(self.month),
            f64::from(self.day_of_week),
            f64::from(self.season),
            f64::from(self.public_holiday),
            f64::from(self.day_before_ph),
            f64::from(self.day_after_ph),
            f64::from(self.school_holiday),
            self.prev_1,
            self.avg_7,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FeatureRecord {
        FeatureRecord {
            temp_band: 2,
            rain_band: 0,
            sunny: 1,
            cloudy: 0,
            month: 1,
            day_of_week: 3,
            season: 0,
            public_holiday: 0,
            day_before_ph: 1,
            day_after_ph: 0,
            school_holiday: 1,
            prev_1: 42.0,
            avg_7: 38.5,
        }
    }

    #[test]
    fn json_keys_follow_schema_order() {
        let json = serde_json::to_string(&sample()).unwrap();
        let mut last = 0;
        for name in FEATURE_NAMES {
            let needle = format!("\"{name}\":");
            let pos = json.find(&needle).unwrap_or_else(|| panic!("missing {name} in {json}"));
            assert!(pos >= last, "{name} out of order in {json}");
            last = pos;
        }
    }

    #[test]
    fn vector_matches_named_fields() {
        let v = sample().to_vector();
        assert_eq!(v[0], 2.0);
        assert_eq!(v[5], 3.0);
        assert_eq!(v[8], 1.0);
        assert_eq!(v[11], 42.0);
        assert_eq!(v[12], 38.5);
    }

    #[test]
    fn day_type_display_uses_variant_names() {
        assert_eq!(DayType::DayBefore.to_string(), "DayBefore");
        assert_eq!(DayType::Other.to_string(), "Other");
    }
}
