//! ISO 8601 parsing shared by reading submissions and list queries.

use std::str::FromStr;

use chrono::{
    DateTime, Days, FixedOffset, NaiveDate, NaiveTime, SubsecRound, TimeZone, Utc, Weekday,
};

use crate::types::Timestamp;

/// Clock layouts accepted after the `T`, in extended and basic form.
const TIME_FORMATS: &[&str] = &[
    "%H:%M:%S%.f",
    "%H:%M:%S",
    "%H:%M",
    "%H%M%S%.f",
    "%H%M%S",
    "%H%M",
];

/// Parse an ISO 8601 date or date-time into a UTC timestamp.
///
/// Accepts extended and basic forms: calendar dates (`2024-03-15`,
/// `20240315`), reduced precision (`2024-03`, `2024`), ordinal and week
/// dates, with an optional time of day down to the hour. Offsets may be
/// `Z`, `+hh`, `+hhmm` or `+hh:mm`. Without an offset the value is taken as
/// UTC, and a bare date is midnight UTC. The result is truncated to
/// millisecond precision, which is the precision readings are stored with.
pub fn parse_iso8601(input: &str) -> Option<Timestamp> {
    let input = input.trim();
    if input.is_empty() || !input.is_ascii() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(to_stored_precision(dt.with_timezone(&Utc)));
    }

    let (date_part, time_part) = match input.find(|c: char| c == 'T' || c == ' ') {
        Some(i) => (&input[..i], Some(&input[i + 1..])),
        None => (input, None),
    };
    let date = parse_date(date_part)?;

    let Some(time_part) = time_part else {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    };
    let (clock, offset) = split_offset(time_part)?;
    let local = date.and_time(parse_time(clock)?);
    let utc = offset.from_local_datetime(&local).single()?.with_timezone(&Utc);
    Some(to_stored_precision(utc))
}

/// Truncate a timestamp to the millisecond precision used in storage.
pub fn to_stored_precision(ts: Timestamp) -> Timestamp {
    ts.trunc_subsecs(3)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Some((year, week)) = raw.split_once('W') {
        let year = year.strip_suffix('-').unwrap_or(year);
        return parse_week_date(year, week);
    }

    let bytes = raw.as_bytes();
    match raw.len() {
        4 => NaiveDate::from_ymd_opt(number(raw)?, 1, 1),
        // YYYY-MM
        7 if bytes[4] == b'-' => {
            NaiveDate::from_ymd_opt(number(&raw[..4])?, number(&raw[5..])?, 1)
        }
        // YYYYDDD
        7 => NaiveDate::from_yo_opt(number(&raw[..4])?, number(&raw[4..])?),
        // YYYY-DDD
        8 if bytes[4] == b'-' => {
            NaiveDate::from_yo_opt(number(&raw[..4])?, number(&raw[5..])?)
        }
        // YYYYMMDD
        8 => NaiveDate::from_ymd_opt(
            number(&raw[..4])?,
            number(&raw[4..6])?,
            number(&raw[6..])?,
        ),
        10 if bytes[4] == b'-' && bytes[7] == b'-' => NaiveDate::from_ymd_opt(
            number(&raw[..4])?,
            number(&raw[5..7])?,
            number(&raw[8..])?,
        ),
        _ => None,
    }
}

/// `YYYY-Www[-D]` or `YYYYWww[D]`, split at the `W`.
fn parse_week_date(year: &str, week: &str) -> Option<NaiveDate> {
    let (week, day) = match week.len() {
        2 => (week, "1"),
        3 => (&week[..2], &week[2..]),
        4 if week.as_bytes()[2] == b'-' => (&week[..2], &week[3..]),
        _ => return None,
    };
    let day: u64 = number(day)?;
    if !(1..=7).contains(&day) {
        return None;
    }
    NaiveDate::from_isoywd_opt(number(year)?, number(week)?, Weekday::Mon)?
        .checked_add_days(Days::new(day - 1))
}

/// Split a trailing UTC offset off the time of day. No offset means UTC.
fn split_offset(time: &str) -> Option<(&str, FixedOffset)> {
    let utc = FixedOffset::east_opt(0)?;
    if let Some(clock) = time.strip_suffix('Z').or_else(|| time.strip_suffix('z')) {
        return Some((clock, utc));
    }
    match time.rfind(|c: char| c == '+' || c == '-') {
        Some(i) => Some((&time[..i], parse_offset(&time[i..])?)),
        None => Some((time, utc)),
    }
}

/// `+hh`, `+hhmm` or `+hh:mm`, and the same with `-`.
fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let sign = if raw.starts_with('-') { -1 } else { 1 };
    let body = &raw[1..];
    let (hours, minutes) = match body.len() {
        2 => (body, "00"),
        4 => (&body[..2], &body[2..]),
        5 if body.as_bytes()[2] == b':' => (&body[..2], &body[3..]),
        _ => return None,
    };
    let hours: i32 = number(hours)?;
    let minutes: i32 = number(minutes)?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn parse_time(clock: &str) -> Option<NaiveTime> {
    if clock.len() == 2 {
        return NaiveTime::from_hms_opt(number(clock)?, 0, 0);
    }
    // ISO 8601 allows a comma as the decimal sign.
    let clock = clock.replace(',', ".");
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(&clock, format).ok())
}

fn number<T: FromStr>(digits: &str) -> Option<T> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
