//! Spreadsheet date normalization
//!
//! Exports encode dates two ways: as a numeric day serial (1900 date system,
//! serial 1 = 1899-12-31) or as a `DD/MM/YYYY` string. Both normalize to a
//! calendar [`NaiveDate`]. Anything else is "no date", never an error.
//!
//! OpenDocument files carry ISO dates instead; decoders turn those into
//! serials with [`parse_iso`] and [`to_serial`] before they reach a cell.
//!
//! Formatting helpers produce the labels used throughout the report:
//!
//! | Helper           | Example      |
//! |------------------|--------------|
//! | [`month_label`]  | `Jan/26`     |
//! | [`month_key`]    | `2026-01`    |
//! | [`display_date`] | `15/01/2026` |

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};

use crate::Cell;

/// Serial of 1970-01-01 in the 1900 date system
const SERIAL_UNIX_EPOCH: f64 = 25569.0;

const MS_PER_DAY: i64 = 86_400_000;

/// Largest millisecond offset a JavaScript `Date` accepts
const MAX_MS: f64 = 8.64e15;

/// Day offsets beyond this are treated as garbage rather than dates
const MAX_DAY_OFFSET: i64 = 100_000_000;

/// pt-BR short month names, capitalized, without the trailing period
const MONTHS_PT_BR: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Normalize a cell into a calendar date.
///
/// - Blank cells (including the serial `0`) → `None`
/// - Numbers → spreadsheet day serial
/// - Strings → `DD/MM/YYYY`
/// - Anything else → `None`
pub fn parse_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Number(serial) => from_serial(*serial),
        Cell::String(text) => parse_day_month_year(text),
        Cell::Empty | Cell::Bool(_) => None,
    }
}

/// Convert a day serial to its calendar date.
///
/// The serial is converted to milliseconds since the Unix epoch and rounded
/// before the day is taken, so a time-of-day fraction never moves the date
/// backwards.
pub fn from_serial(serial: f64) -> Option<NaiveDate> {
    if serial == 0.0 || !serial.is_finite() {
        return None;
    }

    let ms = ((serial - SERIAL_UNIX_EPOCH) * MS_PER_DAY as f64).round();
    if ms.abs() > MAX_MS {
        return None;
    }

    let days = (ms as i64).div_euclid(MS_PER_DAY);
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(Duration::days(days))
}

/// Day serial of a calendar date, the inverse of [`from_serial`]
pub fn to_serial(date: NaiveDate) -> f64 {
    let unix_epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    (date - unix_epoch).num_days() as f64 + SERIAL_UNIX_EPOCH
}

/// Parse an ISO 8601 date or date-time (`2026-02-15`, `2026-02-15T10:30:00`).
///
/// The time of day is dropped.
pub fn parse_iso(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.date())
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
        .ok()
}

/// Parse `DD/MM/YYYY`.
///
/// Each part is read like a leading integer (`"15 "`, `"+3"` and `"2026 10:00"`
/// are accepted). Out-of-range days and months roll over into neighbouring
/// months, so `31/04/2026` is `2026-05-01`. A year written with one or two
/// digits is in the 2000s: `15/02/26` is `2026-02-15`.
pub fn parse_day_month_year(text: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = text.split('/').collect();
    if parts.len() != 3 {
        return None;
    }

    let day = leading_int(parts[0])?;
    let month = leading_int(parts[1])?;
    let mut year = leading_int(parts[2])?;
    if (0..100).contains(&year) && leading_digits(parts[2]).len() <= 2 {
        year += 2000;
    }
    from_parts(year, month, day)
}

/// Build a date from possibly out-of-range parts using calendar rollover
fn from_parts(year: i64, month: i64, day: i64) -> Option<NaiveDate> {
    if day.abs() > MAX_DAY_OFFSET || month.abs() > MAX_DAY_OFFSET {
        return None;
    }

    let month0 = month - 1;
    let year = i32::try_from(year.checked_add(month0.div_euclid(12))?).ok()?;
    let month = u32::try_from(month0.rem_euclid(12) + 1).ok()?;

    NaiveDate::from_ymd_opt(year, month, 1)?.checked_add_signed(Duration::days(day - 1))
}

fn leading_int(part: &str) -> Option<i64> {
    let negative = part.trim_start().starts_with('-');
    let digits = leading_digits(part);
    if digits.is_empty() {
        return None;
    }

    let value: i64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Digits after optional leading whitespace and sign
fn leading_digits(part: &str) -> &str {
    let trimmed = part.trim_start();
    let rest = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('+'))
        .unwrap_or(trimmed);
    &rest[..rest.bytes().take_while(u8::is_ascii_digit).count()]
}

// ============================================================================
// Month arithmetic
// ============================================================================

/// First day of the date's month
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

/// Last day of the date's month
pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// Same calendar month and year
pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

// ============================================================================
// Formatting
// ============================================================================

/// `"Mon/YY"` label with the pt-BR month abbreviation, e.g. `"Fev/26"`
pub fn month_label(date: NaiveDate) -> String {
    format!(
        "{}/{:02}",
        MONTHS_PT_BR[date.month0() as usize],
        date.year().rem_euclid(100)
    )
}

/// `"YYYY-MM"` key used for phase date ranges
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// pt-BR short date, `"DD/MM/YYYY"`
pub fn display_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
