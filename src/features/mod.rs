//! Feature builder: turn sales history, calendar flags and weather into the
//! model's fixed input row.
//!
//! Every threshold here was fixed at training time. The comparison operators
//! (`>` vs `>=`) are part of the contract and must not be "tidied up".

use chrono::{Datelike, NaiveDate};

use crate::domain::{CalendarFlags, DailyQty, DayType, FeatureRecord, WeatherSnapshot};

/// Trailing window for `avg_7`.
pub const TRAILING_WINDOW: usize = 7;

/// Inputs to [`build_features`].
#[derive(Debug, Clone, Copy)]
pub struct FeatureInputs<'a> {
    pub date: NaiveDate,
    /// Daily aggregate sorted ascending by date.
    pub daily: &'a [DailyQty],
    pub weather: &'a WeatherSnapshot,
    pub calendar: CalendarFlags,
}

/// Build the single feature row for `inputs.date`.
pub fn build_features(inputs: &FeatureInputs<'_>) -> FeatureRecord {
    let month = inputs.date.month();
    let day_type = inputs.calendar.day_type;

    FeatureRecord {
        temp_band: temp_band(inputs.weather.max_temp),
        rain_band: rain_flag(inputs.weather.rain_mm),
        sunny: sunny_flag(inputs.weather.cloud_pct),
        cloudy: cloudy_flag(inputs.weather.cloud_pct),
        month,
        day_of_week: inputs.date.weekday().num_days_from_monday(),
        season: season_of_month(month),
        public_holiday: u8::from(day_type == DayType::PublicHoliday),
        day_before_ph: u8::from(day_type == DayType::DayBefore),
        day_after_ph: u8::from(day_type == DayType::DayAfter),
        school_holiday: u8::from(inputs.calendar.school_holiday),
        prev_1: previous_qty(inputs.daily),
        avg_7: trailing_mean(inputs.daily, TRAILING_WINDOW),
    }
}

/// Temperature band: `>38` → 3, `>28` → 2, `<20` → 0, else 1.
pub fn temp_band(max_temp: f64) -> u8 {
    if max_temp > 38.0 {
        3
    } else if max_temp > 28.0 {
        2
    } else if max_temp < 20.0 {
        0
    } else {
        1
    }
}

pub fn rain_flag(rain_mm: f64) -> u8 {
    u8::from(rain_mm >= 0.2)
}

pub fn sunny_flag(cloud_pct: f64) -> u8 {
    u8::from(cloud_pct < 3.0)
}

/// Cloud cover in `[3, 6)` is neither sunny nor cloudy.
pub fn cloudy_flag(cloud_pct: f64) -> u8 {
    u8::from(cloud_pct >= 6.0)
}

/// Southern-hemisphere season index: summer 0, autumn 1, winter 2, spring 3.
pub fn season_of_month(month: u32) -> u8 {
    match month {
        12 | 1 | 2 => 0,
        3..=5 => 1,
        6..=8 => 2,
        _ => 3,
    }
}

/// Most recent daily quantity, 0 with no history.
pub fn previous_qty(daily: &[DailyQty]) -> f64 {
    daily.last().map(|d| d.qty).unwrap_or(0.0)
}

/// Mean of the last `window` quantities, or of all of them if fewer exist.
///
/// Returns NaN for an empty history.
pub fn trailing_mean(daily: &[DailyQty], window: usize) -> f64 {
    let tail = &daily[daily.len().saturating_sub(window)..];
    if tail.is_empty() {
        return f64::NAN;
    }
    tail.iter().map(|d| d.qty).sum::<f64>() / tail.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(qtys: &[f64]) -> Vec<DailyQty> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        qtys.iter()
            .enumerate()
            .map(|(i, &qty)| DailyQty {
                date: start + chrono::Days::new(i as u64),
                qty,
            })
            .collect()
    }

    #[test]
    fn temp_band_boundaries_use_strict_comparisons() {
        assert_eq!(temp_band(45.0), 3);
        assert_eq!(temp_band(38.1), 3);
        assert_eq!(temp_band(38.0), 2);
        assert_eq!(temp_band(30.0), 2);
        assert_eq!(temp_band(28.0), 1);
        assert_eq!(temp_band(25.0), 1);
        assert_eq!(temp_band(20.0), 1);
        assert_eq!(temp_band(19.9), 0);
        assert_eq!(temp_band(15.0), 0);
    }

    #[test]
    fn rain_flag_threshold() {
        assert_eq!(rain_flag(0.0), 0);
        assert_eq!(rain_flag(0.19), 0);
        assert_eq!(rain_flag(0.2), 1);
        assert_eq!(rain_flag(5.0), 1);
    }

    #[test]
    fn sunny_and_cloudy_leave_a_gap() {
        assert_eq!((sunny_flag(2.0), cloudy_flag(2.0)), (1, 0));
        assert_eq!((sunny_flag(3.0), cloudy_flag(3.0)), (0, 0));
        assert_eq!((sunny_flag(4.0), cloudy_flag(4.0)), (0, 0));
        assert_eq!((sunny_flag(6.0), cloudy_flag(6.0)), (0, 1));
        assert_eq!((sunny_flag(100.0), cloudy_flag(100.0)), (0, 1));
    }

    #[test]
    fn seasons_cover_every_month() {
        let expected = [0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3, 0];
        for (i, want) in expected.iter().enumerate() {
            assert_eq!(season_of_month(i as u32 + 1), *want, "month {}", i + 1);
        }
    }

    #[test]
    fn trailing_mean_uses_last_seven() {
        let daily = history(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        assert!((trailing_mean(&daily, 7) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn trailing_mean_falls_back_to_all_days() {
        let daily = history(&[3.0, 4.0]);
        assert!((trailing_mean(&daily, 7) - 3.5).abs() < 1e-12);
    }

    #[test]
    fn empty_history_gives_zero_prev_and_nan_mean() {
        assert_eq!(previous_qty(&[]), 0.0);
        assert!(trailing_mean(&[], 7).is_nan());
    }

    #[test]
    fn build_features_assembles_all_fields() {
        let daily = history(&[10.0, 12.0, 14.0]);
        let weather = WeatherSnapshot {
            max_temp: 31.0,
            rain_mm: 0.0,
            cloud_pct: 1.0,
        };
        // 2025-12-24 is a Wednesday.
        let date = NaiveDate::from_ymd_opt(2025, 12, 24).unwrap();
        let record = build_features(&FeatureInputs {
            date,
            daily: &daily,
            weather: &weather,
            calendar: CalendarFlags {
                school_holiday: true,
                day_type: DayType::DayBefore,
            },
        });

        assert_eq!(record.temp_band, 2);
        assert_eq!(record.rain_band, 0);
        assert_eq!(record.sunny, 1);
        assert_eq!(record.cloudy, 0);
        assert_eq!(record.month, 12);
        assert_eq!(record.day_of_week, 2);
        assert_eq!(record.season, 0);
        assert_eq!(
            (record.public_holiday, record.day_before_ph, record.day_after_ph),
            (0, 1, 0)
        );
        assert_eq!(record.school_holiday, 1);
        assert_eq!(record.prev_1, 14.0);
        assert!((record.avg_7 - 12.0).abs() < 1e-12);
    }
}
