//! School-holiday and public-holiday calendar.
//!
//! Holiday dates are not derived from rules. They come from literal tables:
//!
//! - per-year entries in the config file (`[[calendar]]`), preferred
//! - a built-in Western Australia table applied to any year, as a fallback
//!
//! The built-in table has to be checked against the published school terms
//! each year; config entries exist so that doing so needs no rebuild.

use chrono::{Datelike, Days, NaiveDate};
use serde::Deserialize;

use crate::domain::{CalendarFlags, DayType};

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// One year's holidays as written in the config file.
///
/// ```toml
/// [[calendar]]
/// year = 2026
/// school_holidays = [["2026-04-03", "2026-04-19"]]
/// public_holidays = ["2026-01-01", "2026-01-26"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalendarYear {
    pub year: i32,
    #[serde(default)]
    pub school_holidays: Vec<(NaiveDate, NaiveDate)>,
    #[serde(default)]
    pub public_holidays: Vec<NaiveDate>,
}

/// School-holiday ranges plus public holidays in classification order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    pub school_holidays: Vec<DateRange>,
    pub public_holidays: Vec<NaiveDate>,
}

impl HolidayCalendar {
    /// Calendar for a single year: the config entry if present, else the
    /// built-in table.
    pub fn for_year(year: i32, table: &[CalendarYear]) -> Self {
        Self::configured(year, table).unwrap_or_else(|| {
            tracing::warn!(year, "no holiday calendar configured for year; using built-in table");
            Self::builtin(year)
        })
    }

    pub fn builtin(year: i32) -> Self {
        Self {
            school_holidays: compute_school_holidays(year),
            public_holidays: compute_public_holidays(year),
        }
    }

    fn configured(year: i32, table: &[CalendarYear]) -> Option<Self> {
        let entry = table.iter().find(|entry| entry.year == year)?;
        Some(Self {
            school_holidays: entry
                .school_holidays
                .iter()
                .map(|&(start, end)| DateRange::new(start, end))
                .collect(),
            public_holidays: entry.public_holidays.clone(),
        })
    }

    /// Calendar covering `date` and its neighbouring years.
    ///
    /// The summer break starts in December and runs into the next year, and
    /// Dec 31 sits next to the following New Year's Day, so a single year's
    /// table misses both. The date's own year goes first, so in-year
    /// classification order is unchanged.
    ///
    /// A model trained on single-year flags saw `SchoolHoliday = 0` in early
    /// January and `DayBeforePH = 0` on Dec 31; it gets 1 for both here.
    pub fn around(date: NaiveDate, table: &[CalendarYear]) -> Self {
        let year = date.year();
        let mut out = Self::for_year(year, table);
        for neighbour in [year - 1, year + 1] {
            let other = Self::configured(neighbour, table).unwrap_or_else(|| Self::builtin(neighbour));
            out.school_holidays.extend(other.school_holidays);
            out.public_holidays.extend(other.public_holidays);
        }
        out
    }

    pub fn classify(&self, date: NaiveDate) -> CalendarFlags {
        CalendarFlags {
            school_holiday: is_school_holiday(date, &self.school_holidays),
            day_type: get_day_type(date, &self.public_holidays),
        }
    }
}

/// Built-in school-holiday table (WA 2025 term dates) applied to `year`.
///
/// The last range is the summer break and ends in February of `year + 1`.
pub fn compute_school_holidays(year: i32) -> Vec<DateRange> {
    const RANGES: [((u32, u32), (i32, u32, u32)); 4] = [
        ((4, 12), (0, 4, 27)),
        ((7, 5), (0, 7, 20)),
        ((9, 27), (0, 10, 12)),
        ((12, 19), (1, 2, 1)),
    ];

    RANGES
        .iter()
        .filter_map(|&((sm, sd), (year_offset, em, ed))| {
            let start = NaiveDate::from_ymd_opt(year, sm, sd)?;
            let end = NaiveDate::from_ymd_opt(year + year_offset, em, ed)?;
            Some(DateRange::new(start, end))
        })
        .collect()
}

/// Built-in public-holiday table (WA 2025) applied to `year`.
pub fn compute_public_holidays(year: i32) -> Vec<NaiveDate> {
    const DAYS: [(u32, u32); 11] = [
        (1, 1),
        (1, 27),
        (3, 3),
        (4, 18),
        (4, 20),
        (4, 21),
        (4, 25),
        (6, 2),
        (9, 29),
        (12, 25),
        (12, 26),
    ];

    DAYS.iter()
        .filter_map(|&(m, d)| NaiveDate::from_ymd_opt(year, m, d))
        .collect()
}

/// True iff `date` lies within any inclusive range.
pub fn is_school_holiday(date: NaiveDate, ranges: &[DateRange]) -> bool {
    ranges.iter().any(|r| r.contains(date))
}

/// Classify `date` against the public holidays, first match in list order.
pub fn get_day_type(date: NaiveDate, public_holidays: &[NaiveDate]) -> DayType {
    for &holiday in public_holidays {
        if date == holiday {
            return DayType::PublicHoliday;
        }
        if holiday.checked_sub_days(Days::new(1)) == Some(date) {
            return DayType::DayBefore;
        }
        if holiday.checked_add_days(Days::new(1)) == Some(date) {
            return DayType::DayAfter;
        }
    }
    DayType::Other
}
