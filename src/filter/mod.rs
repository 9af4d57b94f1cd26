//! Selection of the rows scheduled for the target date.

use chrono::{Datelike, DateTime, Days, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use tracing::{debug, info};

use crate::model::Table;

/// The day after `reference`, as a calendar date in the `offset` timezone.
pub fn target_date(reference: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    let local = reference.with_timezone(&offset).date_naive();
    local.checked_add_days(Days::new(1)).unwrap_or(local)
}

/// Labels that look like date columns, in column order.
pub fn date_columns(table: &Table) -> Vec<String> {
    table
        .columns()
        .iter()
        .filter(|label| label.to_lowercase().contains("date"))
        .cloned()
        .collect()
}

/// Keeps the rows whose date equals `target`.
///
/// Candidate date columns are tried left to right and the first one with at
/// least one matching row decides the result; later candidates are not
/// consulted. A table without candidate columns is returned as is, and a
/// table whose candidates never match comes back empty with its labels.
pub fn select_rows(table: Table, target: NaiveDate, day_first: bool) -> Table {
    let candidates = date_columns(&table);
    if candidates.is_empty() {
        info!("no date column detected, keeping every row");
        return table;
    }

    for column in &candidates {
        let Some(idx) = table.column_index(column) else {
            continue;
        };
        let matches = table
            .rows()
            .iter()
            .filter(|row| parse_date(&row[idx], day_first) == Some(target))
            .count();
        if matches > 0 {
            info!(column = %column, rows = matches, %target, "rows found for target date");
            return table.retain_rows(|row| parse_date(&row[idx], day_first) == Some(target));
        }
        debug!(column = %column, %target, "no rows for target date in column");
    }

    info!(%target, "no rows for target date in any date column");
    Table::empty(table.columns().to_vec())
}

const DATE_TIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const ISO_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

const NAMED_MONTH_FORMATS: [&str; 10] = [
    "%d-%b-%Y",
    "%d %b %Y",
    "%d-%B-%Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%d-%b-%y",
    "%d %b %y",
];

const MONTH_FIRST: [&str; 6] = [
    "%m/%d/%Y", "%m-%d-%Y", "%m.%d.%Y", "%m/%d/%y", "%m-%d-%y", "%m.%d.%y",
];
const DAY_FIRST: [&str; 6] = [
    "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d/%m/%y", "%d-%m-%y", "%d.%m.%y",
];

/// Best-effort date parsing that never fails: anything unrecognised is
/// `None`.
///
/// Numeric dates are read month first unless `day_first` is set; when the
/// preferred reading is not a valid date the other order is tried.
pub fn parse_date(value: &str, day_first: bool) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(moment) = DateTime::parse_from_rfc3339(value) {
        return Some(moment.naive_local().date());
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(moment) = NaiveDateTime::parse_from_str(value, format) {
            return Some(moment.date());
        }
    }

    let (preferred, fallback) = if day_first {
        (DAY_FIRST, MONTH_FIRST)
    } else {
        (MONTH_FIRST, DAY_FIRST)
    };

    // A time suffix on a numeric date is ignored.
    let date_part = value.split_whitespace().next().unwrap_or(value);

    ISO_DATE_FORMATS
        .iter()
        .chain(preferred.iter())
        .chain(fallback.iter())
        .find_map(|format| parse_plausible(date_part, format))
        .or_else(|| {
            NAMED_MONTH_FORMATS
                .iter()
                .find_map(|format| parse_plausible(value, format))
        })
}

/// Parses with `format`, rejecting four-digit-year formats that swallowed a
/// two-digit year.
fn parse_plausible(value: &str, format: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(value, format).ok()?;
    if format.contains("%Y") && !(1000..=9999).contains(&date.year()) {
        return None;
    }
    Some(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn parses_common_shapes() {
        assert_eq!(parse_date("2024-06-02", false), ymd(2024, 6, 2));
        assert_eq!(parse_date("2024-06-02 00:00:00", false), ymd(2024, 6, 2));
        assert_eq!(parse_date("2024-06-02T08:30:00+05:30", false), ymd(2024, 6, 2));
        assert_eq!(parse_date("02-Jun-2024", false), ymd(2024, 6, 2));
        assert_eq!(parse_date("June 2, 2024", false), ymd(2024, 6, 2));
        assert_eq!(parse_date("06/02/24", false), ymd(2024, 6, 2));
    }

    #[test]
    fn numeric_dates_follow_preferred_order_then_fall_back() {
        assert_eq!(parse_date("06/02/2024", false), ymd(2024, 6, 2));
        assert_eq!(parse_date("06/02/2024", true), ymd(2024, 2, 6));
        assert_eq!(parse_date("25/06/2024", false), ymd(2024, 6, 25));
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_date("", false), None);
        assert_eq!(parse_date("tomorrow", false), None);
        assert_eq!(parse_date("13/13/2024", false), None);
    }

    #[test]
    fn target_is_next_day_in_offset() {
        let offset = FixedOffset::east_opt(330 * 60).expect("valid offset");
        let reference = DateTime::parse_from_rfc3339("2024-06-01T20:00:00Z")
            .expect("timestamp")
            .with_timezone(&Utc);
        // 20:00 UTC is already 01:30 on June 2nd in UTC+05:30.
        assert_eq!(target_date(reference, offset), ymd(2024, 6, 3).unwrap());
    }
}
