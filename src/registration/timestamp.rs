use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use super::error::TimestampError;

/// Two-digit years at or above this value fall in the 1900s, the rest in the
/// 2000s: `69` → 1969, `68` → 2068.
pub const CENTURY_PIVOT: u32 = 69;

/// Hour-of-day and day-of-week of one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationSlot {
    /// 0..=23
    pub hour: u32,
    /// 0..=6, Sunday = 0
    pub weekday: u32,
}

/// Parse `MM/DD/YY HH:MM` into a full date-time. Month, day, hour and minute
/// may omit their leading zero (`1/1/17 9:05`); the year is always two digits.
pub fn parse_registration(value: &str) -> Result<NaiveDateTime, TimestampError> {
    let fail = |reason: &str| TimestampError {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let s = value.trim();
    let (date, time) = s
        .split_once(' ')
        .ok_or_else(|| fail("expected `MM/DD/YY HH:MM`"))?;

    let mut date_parts = date.split('/');
    let (Some(month), Some(day), Some(year), None) = (
        date_parts.next(),
        date_parts.next(),
        date_parts.next(),
        date_parts.next(),
    ) else {
        return Err(fail("date must be MM/DD/YY"));
    };
    let (hour, minute) = time
        .trim()
        .split_once(':')
        .ok_or_else(|| fail("time must be HH:MM"))?;

    if year.len() != 2 {
        return Err(fail("year must have two digits"));
    }
    let month = field(month).ok_or_else(|| fail("bad month"))?;
    let day = field(day).ok_or_else(|| fail("bad day"))?;
    let yy = field(year).ok_or_else(|| fail("bad year"))?;
    let hour = field(hour).ok_or_else(|| fail("bad hour"))?;
    let minute = field(minute).ok_or_else(|| fail("bad minute"))?;

    let year = if yy >= CENTURY_PIVOT { 1900 + yy } else { 2000 + yy };
    NaiveDate::from_ymd_opt(year as i32, month, day)
        .ok_or_else(|| fail("no such calendar date"))?
        .and_hms_opt(hour, minute, 0)
        .ok_or_else(|| fail("no such time of day"))
}

/// 1–2 ASCII digits.
fn field(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Split a registration timestamp into its hour-of-day and day-of-week.
pub fn extract_datetime(value: &str) -> Result<RegistrationSlot, TimestampError> {
    let dt = parse_registration(value)?;
    Ok(RegistrationSlot {
        hour: dt.hour(),
        weekday: dt.weekday().num_days_from_sunday(),
    })
}
