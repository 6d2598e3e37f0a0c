//! Fixed US stock market holiday rules.
//!
//! This ruleset matches exchange closures, not the federal calendar:
//! Good Friday is included though it is not a federal holiday, Columbus Day
//! and Veterans Day are excluded because markets stay open, and Juneteenth
//! is observed only from 2022 onward. Fixed-date holidays falling on a
//! Saturday are observed the preceding Friday; on a Sunday, the following
//! Monday.

use chrono::{Datelike, NaiveDate, TimeDelta, Weekday};

/// Returns true if `date` is a US stock market holiday under the fixed
/// ruleset.
pub(crate) fn is_market_holiday(date: NaiveDate) -> bool {
    let year = date.year();

    // New Year's observance can shift into the last days of the prior year,
    // so check the upcoming year's holiday too.
    if date == observed(new_years_day(year)) || date == observed(new_years_day(year + 1)) {
        return true;
    }

    date == nth_weekday(year, 1, Weekday::Mon, 3)          // MLK Day
        || date == nth_weekday(year, 2, Weekday::Mon, 3)   // Presidents Day
        || date == good_friday(year)
        || date == last_weekday(year, 5, Weekday::Mon)     // Memorial Day
        || (year >= 2022 && date == observed(juneteenth(year)))
        || date == observed(independence_day(year))
        || date == nth_weekday(year, 9, Weekday::Mon, 1)   // Labor Day
        || date == thanksgiving(year)
        || date == observed(christmas_day(year))
}

/// Returns true if `date` is a scheduled early close (1:00 PM Eastern).
pub(crate) fn is_half_day(date: NaiveDate) -> bool {
    let year = date.year();

    // Day after Thanksgiving.
    if date == thanksgiving(year) + TimeDelta::days(1) {
        return true;
    }

    // Christmas Eve, when it lands on a weekday and is not itself an
    // observed holiday.
    let christmas_eve = NaiveDate::from_ymd_opt(year, 12, 24).expect("valid date");
    if date == christmas_eve && is_weekday(date) && !is_market_holiday(date) {
        return true;
    }

    // July 3rd, when both it and July 4th are weekdays. If July 4th falls
    // on a weekend the observance rule absorbs July 3rd as a full holiday.
    let july_third = NaiveDate::from_ymd_opt(year, 7, 3).expect("valid date");
    date == july_third
        && is_weekday(july_third)
        && is_weekday(independence_day(year))
        && !is_market_holiday(july_third)
}

fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Thanksgiving Day: the 4th Thursday of November.
pub(crate) fn thanksgiving(year: i32) -> NaiveDate {
    nth_weekday(year, 11, Weekday::Thu, 4)
}

/// Good Friday: two days before Easter Sunday.
pub(crate) fn good_friday(year: i32) -> NaiveDate {
    easter_sunday(year) - TimeDelta::days(2)
}

fn new_years_day(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).expect("valid date")
}

fn juneteenth(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 6, 19).expect("valid date")
}

fn independence_day(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 7, 4).expect("valid date")
}

fn christmas_day(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 12, 25).expect("valid date")
}

/// NYSE observance: Saturday holidays shift to the preceding Friday, Sunday
/// holidays to the following Monday.
fn observed(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date - TimeDelta::days(1),
        Weekday::Sun => date + TimeDelta::days(1),
        _ => date,
    }
}

/// The `n`-th given weekday of a month (1-based).
fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> NaiveDate {
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("valid date");
    let offset = (7 + weekday.num_days_from_monday() - first.weekday().num_days_from_monday()) % 7;
    first + TimeDelta::days(i64::from(offset) + i64::from(n - 1) * 7)
}

/// The last given weekday of a month.
fn last_weekday(year: i32, month: u32, weekday: Weekday) -> NaiveDate {
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("valid date");
    let last = next_month - TimeDelta::days(1);
    let offset = (7 + last.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
    last - TimeDelta::days(i64::from(offset))
}

/// Easter Sunday for the given year (anonymous Gregorian computus).
fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32).expect("valid easter date")
}
