//! Expiry selection for the short leg and the calendar-spread hedge leg.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;

use crate::error::ManagerError;

const SECONDS_PER_DAY: i64 = 86_400;

/// Elapsed whole days from `now` to the start of `expiry` (local midnight in
/// `now`'s time zone), truncated toward zero. Negative once expired.
///
/// A partial day counts for nothing, so at 10:00 an expiry seven calendar
/// days out is only six days away.
pub fn days_to_expiry(now: DateTime<Tz>, expiry: NaiveDate) -> i64 {
    let start = expiry.and_time(NaiveTime::MIN);
    let elapsed = match now.timezone().from_local_datetime(&start).earliest() {
        Some(instant) => instant.signed_duration_since(now),
        None => start.signed_duration_since(now.naive_local()),
    };
    elapsed.num_seconds() / SECONDS_PER_DAY
}

/// The closest expiry at least `min_days` away from `now`.
///
/// # Errors
///
/// Returns [`ManagerError::NoMatchingExpiry`] if every listed expiry is
/// nearer than `min_days`.
pub fn nearest_expiry_at_least(
    now: DateTime<Tz>,
    min_days: i64,
    expiries: &[NaiveDate],
) -> Result<NaiveDate, ManagerError> {
    let chosen = expiries
        .iter()
        .map(|&expiry| (expiry, days_to_expiry(now, expiry)))
        .filter(|&(_, days)| days >= min_days)
        .min_by_key(|&(_, days)| days);

    match chosen {
        Some((expiry, _)) => Ok(expiry),
        None => {
            let furthest = expiries
                .iter()
                .map(|&expiry| (expiry, days_to_expiry(now, expiry)))
                .max_by_key(|&(_, days)| days);
            Err(ManagerError::no_expiry_at_least(min_days, furthest))
        }
    }
}

/// The monthly expiry for the long leg of a calendar spread.
///
/// Among expiries strictly after `sell_expiry`, picks the last one in the
/// current month of `today`, falling back to the last one in the following
/// month.
///
/// # Errors
///
/// Returns [`ManagerError::NoMatchingExpiry`] if neither month has an expiry
/// after `sell_expiry`.
pub fn calendar_spread_expiry(
    today: NaiveDate,
    sell_expiry: NaiveDate,
    expiries: &[NaiveDate],
) -> Result<NaiveDate, ManagerError> {
    let current = (today.year(), today.month());
    let next = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };

    let mut sorted = expiries.to_vec();
    sorted.sort_unstable();

    let mut last_of_current = None;
    let mut last_of_next = None;
    for expiry in sorted.into_iter().filter(|&e| e > sell_expiry) {
        let month = (expiry.year(), expiry.month());
        if month == current {
            last_of_current = Some(expiry);
        } else if month == next {
            last_of_next = Some(expiry);
        } else if month > next {
            break;
        }
    }

    last_of_current.or(last_of_next).ok_or_else(|| {
        ManagerError::NoMatchingExpiry(format!(
            "no monthly expiry after {sell_expiry} in {}-{:02} or {}-{:02}",
            current.0, current.1, next.0, next.1
        ))
    })
}
