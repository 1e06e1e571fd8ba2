//! Task start and deadline computation.
//!
//! Deadlines fall on the next business day, Monday to Friday. Every function
//! here is pure; callers pass the current instant.

use chrono::{
    DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveTime, SecondsFormat, Utc, Weekday,
};

const END_OF_DAY: NaiveTime = match NaiveTime::from_hms_opt(23, 59, 59) {
    Some(time) => time,
    None => NaiveTime::MIN,
};

/// Returns the first Monday-to-Friday date after `date`.
#[must_use]
pub fn next_business_day(date: NaiveDate) -> NaiveDate {
    let days_ahead = match date.weekday() {
        Weekday::Fri => 3,
        Weekday::Sat => 2,
        _ => 1,
    };
    date.checked_add_days(Days::new(days_ahead))
        .unwrap_or(NaiveDate::MAX)
}

/// Start instant and deadline of a created task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskWindow {
    /// Task start, normally the submission instant.
    pub start: DateTime<Utc>,
    /// Task deadline.
    pub deadline: DateTime<Utc>,
}

impl TaskWindow {
    /// Deadline at midnight UTC opening the next business day.
    #[must_use]
    pub fn start_of_next_business_day(now: DateTime<Utc>) -> Self {
        let day = next_business_day(now.date_naive());
        Self {
            start: now,
            deadline: day.and_time(NaiveTime::MIN).and_utc(),
        }
    }

    /// Deadline at 23:59:59 of the next business day on the office calendar
    /// at `offset`, expressed in UTC.
    #[must_use]
    pub fn end_of_next_business_day(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let local_today = now.with_timezone(&offset).date_naive();
        let local_end = next_business_day(local_today).and_time(END_OF_DAY);
        let deadline = local_end
            .and_local_timezone(offset)
            .single()
            .map_or_else(|| local_end.and_utc(), |local| local.with_timezone(&Utc));
        Self {
            start: now,
            deadline,
        }
    }
}

/// Formats an instant the way the remote API expects: RFC 3339, whole
/// seconds, `Z` suffix.
#[must_use]
pub fn format_remote_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}
