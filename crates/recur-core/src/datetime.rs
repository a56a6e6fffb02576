//! Date and time helpers.
//!
//! Stored instants are UTC. The local calendar only enters in two places:
//! rendering dates for people, and computing the end-of-day boundary used
//! by the due query.

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

use crate::error::CoreError;

const DAY_END: NaiveTime = match NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999) {
    Some(t) => t,
    None => panic!("invalid end-of-day constant"),
};

const SECS_PER_DAY: i64 = 86_400;

/// Whole days `actual` landed after `scheduled`, floored at zero.
/// Early and on-time completions are never penalized.
#[must_use]
pub fn days_late(scheduled: DateTime<Utc>, actual: DateTime<Utc>) -> i64 {
    (actual - scheduled).num_days().max(0)
}

/// Whole days between two instants (negative when `end` precedes `start`).
#[must_use]
pub fn days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_days()
}

/// Parse a calendar date in any of the accepted input formats.
///
/// # Errors
///
/// Returns [`CoreError::InvalidArgument`] when no format matches.
pub fn parse_date(input: &str) -> Result<NaiveDate, CoreError> {
    const FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y"];

    let trimmed = input.trim();
    for format in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }
    Err(CoreError::InvalidArgument(format!(
        "unable to parse date '{input}': expected YYYY-MM-DD, YYYY/MM/DD, MM/DD/YYYY, or MM-DD-YYYY"
    )))
}

/// Midnight UTC at the start of `date`.
#[must_use]
pub fn utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Inclusive start and exclusive end of the UTC calendar day containing
/// `date`, used for same-day duplicate checks.
#[must_use]
pub fn utc_day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = utc_midnight(date);
    (start, start + chrono::Duration::days(1))
}

/// End of the **local** calendar day containing `reference`, expressed in
/// UTC for storage comparison.
///
/// The local timezone is resolved once per call. An ambiguous wall-clock
/// end-of-day (DST fall-back) resolves to the earliest mapping; the gap
/// case cannot occur at 23:59:59 but falls back to the reference's own
/// offset.
#[must_use]
pub fn local_day_end_utc(reference: DateTime<Utc>) -> DateTime<Utc> {
    let local = reference.with_timezone(&Local);
    let end = local.date_naive().and_time(DAY_END);

    match end.and_local_timezone(Local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => local
            .offset()
            .fix()
            .from_local_datetime(&end)
            .single()
            .map_or(reference, |dt| dt.with_timezone(&Utc)),
    }
}

/// Render an instant as a local calendar date (`YYYY-MM-DD`).
#[must_use]
pub fn format_date_local(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&Local)
        .format("%Y-%m-%d")
        .to_string()
}

/// Render an instant relative to `now`, e.g. `in 3 days` or `2 hours ago`.
#[must_use]
pub fn format_relative(instant: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let total_seconds = (instant - now).num_seconds();
    let magnitude = total_seconds.abs();

    if magnitude < 3600 {
        let minutes = magnitude / 60;
        if minutes == 0 {
            return "just now".to_string();
        }
        let unit = if minutes == 1 { "minute" } else { "minutes" };
        return if total_seconds < 0 {
            format!("{minutes} {unit} ago")
        } else {
            format!("in {minutes} {unit}")
        };
    }

    if magnitude < SECS_PER_DAY {
        let hours = magnitude / 3600;
        let unit = if hours == 1 { "hour" } else { "hours" };
        return if total_seconds < 0 {
            format!("{hours} {unit} ago")
        } else {
            format!("in {hours} {unit}")
        };
    }

    let days = total_seconds.div_euclid(SECS_PER_DAY);
    match days {
        1 => "tomorrow".to_string(),
        -1 => "yesterday".to_string(),
        d if d > 1 => format!("in {d} days"),
        d => format!("{} days ago", -d),
    }
}
