//! Sales CSV ingest and daily aggregation.
//!
//! This module turns a point-of-sale export into one quantity total per date
//! for a single product category.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear error, `Sales` kind)
//! - **Lenient rows**: unparseable dates are dropped, bad quantities are
//!   skipped and reported
//! - **Deterministic output**: ascending by date

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::domain::DailyQty;
use crate::error::AppError;

const COL_DATE: &str = "date";
const COL_CATEGORY: &str = "category";
const COL_QTY: &str = "qty";

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the daily aggregate plus bookkeeping about dropped rows.
#[derive(Debug, Clone, Default)]
pub struct SalesHistory {
    /// One entry per date, ascending.
    pub daily: Vec<DailyQty>,
    pub rows_read: usize,
    /// Rows whose category matched, before date/quantity checks.
    pub rows_matched: usize,
    /// Matching rows dropped because the date did not parse.
    pub rows_undated: usize,
    pub row_errors: Vec<RowError>,
}

/// Load the sales export at `path` and aggregate `category` rows by date.
pub fn load_daily_sales(path: &Path, category: &str) -> Result<SalesHistory, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::sales(format!("Failed to open sales CSV '{}': {e}", path.display())))?;

    let history = aggregate_daily_sales(file, category)?;

    tracing::info!(
        path = %path.display(),
        rows_read = history.rows_read,
        rows_matched = history.rows_matched,
        days = history.daily.len(),
        "loaded sales history"
    );
    if history.rows_undated > 0 {
        tracing::warn!(rows = history.rows_undated, "dropped rows with unparseable dates");
    }
    for err in &history.row_errors {
        tracing::warn!(line = err.line, "{}", err.message);
    }
    if history.daily.is_empty() {
        tracing::warn!(category, "no sales rows matched category; history is empty");
    }

    Ok(history)
}

/// Aggregate from any CSV reader. Split out from [`load_daily_sales`] so
/// in-memory data can be used directly.
pub fn aggregate_daily_sales<R: Read>(reader: R, category: &str) -> Result<SalesHistory, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::sales(format!("Failed to read sales CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    for required in [COL_DATE, COL_CATEGORY, COL_QTY] {
        if !header_map.contains_key(required) {
            return Err(AppError::sales(format!("Missing required column: `{required}`")));
        }
    }

    let needle = category.to_lowercase();
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut out = SalesHistory::default();

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1, records are 1-based.
        let line = idx + 2;
        out.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                out.row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let matches = get_field(&record, &header_map, COL_CATEGORY)
            .is_some_and(|c| c.to_lowercase().contains(&needle));
        if !matches {
            continue;
        }
        out.rows_matched += 1;

        let Some(date) = get_field(&record, &header_map, COL_DATE).and_then(parse_sale_date) else {
            out.rows_undated += 1;
            continue;
        };

        // A matched, dated row keeps its day in the history even when it
        // contributes no quantity.
        let total = totals.entry(date).or_insert(0.0);

        let qty = match get_field(&record, &header_map, COL_QTY) {
            None => continue,
            Some(raw) => match parse_qty(raw) {
                Some(q) => q,
                None => {
                    out.row_errors.push(RowError {
                        line,
                        message: format!("Invalid `Qty` value '{raw}'."),
                    });
                    continue;
                }
            },
        };

        *total += qty;
    }

    out.daily = totals
        .into_iter()
        .map(|(date, qty)| DailyQty { date, qty })
        .collect();

    Ok(out)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn get_field<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a sale date, returning `None` for anything unrecognized.
///
/// Slash dates are read month-first (`MM/DD/YYYY`), which is how the
/// point-of-sale export writes them. Date-times keep only the date part.
fn parse_sale_date(s: &str) -> Option<NaiveDate> {
    const DATE_FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];
    const DATETIME_FMTS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M",
    ];

    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    chrono::DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

fn parse_qty(s: &str) -> Option<f64> {
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
