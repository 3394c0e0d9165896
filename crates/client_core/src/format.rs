//! Parsing of form input and display formatting for the bill list.

use std::cmp::Reverse;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use shared::domain::Bill;

const BILL_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const SHORT_MONTHS: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Jui", "Jui", "Aoû", "Sep", "Oct", "Nov", "Déc",
];

/// Leading-integer parse: skips leading whitespace, accepts a sign, stops at
/// the first non-digit. `"12.5"` is 12, `"abc"` and `""` are `None`.
pub fn parse_int_prefix(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let value = rest[..digits_len].parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}

pub fn parse_bill_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    BILL_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// `2004-04-04` becomes `4 Avr. 04`.
pub fn format_date(raw: &str) -> Option<String> {
    let date = parse_bill_date(raw)?;
    Some(format!(
        "{} {}. {:02}",
        date.day(),
        SHORT_MONTHS[date.month0() as usize],
        date.year().rem_euclid(100)
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrdering {
    /// Parsed dates, newest first; unparsable dates sink to the end.
    #[default]
    Calendar,
    /// Raw date text compared as opaque strings, greatest first.
    Lexical,
}

pub fn sort_newest_first(bills: &mut [Bill], ordering: DateOrdering) {
    match ordering {
        DateOrdering::Lexical => bills.sort_by(|a, b| b.date.cmp(&a.date)),
        DateOrdering::Calendar => bills.sort_by_cached_key(|bill| {
            (
                Reverse(parse_bill_date(&bill.date)),
                Reverse(bill.date.clone()),
            )
        }),
    }
}
