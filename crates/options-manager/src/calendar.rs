//! Trading-day arithmetic over weekends and exchange holidays.

use calspread_core::Holidays;
use chrono::NaiveDate;

/// The last trading day strictly before `date`.
///
/// Walks back one calendar day at a time, skipping weekends and holidays.
/// The holiday set is finite, so the walk always ends.
pub fn previous_trading_day(date: NaiveDate, holidays: &Holidays) -> NaiveDate {
    let mut candidate = date;
    loop {
        match candidate.pred_opt() {
            Some(previous) => candidate = previous,
            None => return candidate,
        }
        if holidays.is_trading_day(candidate) {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn monday_goes_back_to_friday() {
        // 2024-03-04 is a Monday
        assert_eq!(
            previous_trading_day(day(2024, 3, 4), &Holidays::default()),
            day(2024, 3, 1)
        );
    }

    #[test]
    fn midweek_goes_back_one_day() {
        assert_eq!(
            previous_trading_day(day(2024, 3, 6), &Holidays::default()),
            day(2024, 3, 5)
        );
    }

    #[test]
    fn skips_holidays_adjacent_to_weekend() {
        // Friday 2024-03-08 and Thursday 2024-03-07 closed
        let holidays = Holidays::from_strings(&["2024-03-08", "2024-03-07"]).unwrap();
        assert_eq!(previous_trading_day(day(2024, 3, 11), &holidays), day(2024, 3, 6));
    }

    #[test]
    fn sunday_goes_back_to_friday() {
        assert_eq!(
            previous_trading_day(day(2024, 3, 3), &Holidays::default()),
            day(2024, 3, 1)
        );
    }
}
