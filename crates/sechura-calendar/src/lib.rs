//! Trading calendar for the US equity market.
//!
//! Answers the questions validation and scheduling need: is a given date a
//! trading day, does it close early, how many candles of a timeframe a full
//! session should contain, and what UTC window the session occupies. Holiday
//! rules are computed from fixed rules rather than a bundled table, so the
//! calendar works for any year. An optional [`ExchangeCalendarFeed`] lets an
//! authoritative upstream schedule override the computed rules for dates it
//! knows about, such as unscheduled closures.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod holidays;

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc, Weekday};
use std::sync::Arc;

use sechura_types::{DateRange, MarketSession, Timeframe};

/// Session parameters the calendar computes with.
#[derive(Debug, Clone, Copy)]
pub struct CalendarConfig {
    /// Session window of the home market, in UTC.
    pub session: MarketSession,
    /// Tradable minutes on a regular day.
    pub full_day_minutes: u32,
    /// Tradable minutes on an early-close day.
    pub half_day_minutes: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            session: MarketSession::US_EQUITY,
            full_day_minutes: MarketSession::US_EQUITY.length_minutes(),
            half_day_minutes: 210,
        }
    }
}

/// Schedule of a single date as reported by an external feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySchedule {
    /// Whether the market is open at all on this date.
    pub trading: bool,
    /// Whether the session closes early.
    pub early_close: bool,
}

/// Source of authoritative per-date schedules.
///
/// The calendar consults the feed first and falls back to its computed rules
/// for dates the feed does not cover.
pub trait ExchangeCalendarFeed: Send + Sync {
    /// Returns the schedule for `date`, or `None` if the feed has no entry.
    fn schedule(&self, date: NaiveDate) -> Option<DaySchedule>;
}

/// US equity trading calendar.
#[derive(Clone)]
pub struct TradingCalendar {
    config: CalendarConfig,
    feed: Option<Arc<dyn ExchangeCalendarFeed>>,
}

impl std::fmt::Debug for TradingCalendar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradingCalendar")
            .field("config", &self.config)
            .field("feed", &self.feed.as_ref().map(|_| "<feed>"))
            .finish()
    }
}

impl Default for TradingCalendar {
    fn default() -> Self {
        Self::new(CalendarConfig::default())
    }
}

impl TradingCalendar {
    /// Creates a calendar with the given session configuration.
    #[must_use]
    pub const fn new(config: CalendarConfig) -> Self {
        Self { config, feed: None }
    }

    /// Attaches an external schedule feed consulted before the computed
    /// rules.
    #[must_use]
    pub fn with_feed(mut self, feed: Arc<dyn ExchangeCalendarFeed>) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Returns the session configuration.
    #[must_use]
    pub const fn config(&self) -> &CalendarConfig {
        &self.config
    }

    /// Returns true if the market is open on `date`.
    #[must_use]
    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        if let Some(schedule) = self.feed_schedule(date) {
            return schedule.trading;
        }
        is_weekday(date) && !holidays::is_market_holiday(date)
    }

    /// Returns true if `date` is a trading day with an early close.
    #[must_use]
    pub fn is_half_day(&self, date: NaiveDate) -> bool {
        if let Some(schedule) = self.feed_schedule(date) {
            return schedule.trading && schedule.early_close;
        }
        self.is_trading_day(date) && holidays::is_half_day(date)
    }

    /// Number of tradable minutes in the session on `date`, zero for
    /// non-trading days.
    #[must_use]
    pub fn session_minutes(&self, date: NaiveDate) -> u32 {
        if !self.is_trading_day(date) {
            0
        } else if self.is_half_day(date) {
            self.config.half_day_minutes
        } else {
            self.config.full_day_minutes
        }
    }

    /// Number of candles a complete session on `date` should contain for
    /// `timeframe`. Daily always expects one candle on a trading day.
    /// Partial intraday buckets at an early close round up, so a 210-minute
    /// half day expects two 4-hour candles' worth only when the division
    /// says so; integer division truncates and the close-boundary bucket is
    /// counted when any minutes fall inside it.
    #[must_use]
    pub fn expected_candle_count(&self, date: NaiveDate, timeframe: Timeframe) -> u32 {
        let minutes = self.session_minutes(date);
        if minutes == 0 {
            return 0;
        }
        if timeframe == Timeframe::Daily {
            return 1;
        }
        minutes.div_ceil(timeframe.minutes())
    }

    /// Session open and close instants on `date` in UTC, half-open
    /// `[open, close)`. Returns `None` on non-trading days.
    #[must_use]
    pub fn session_window(&self, date: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let minutes = self.session_minutes(date);
        if minutes == 0 {
            return None;
        }
        let session = self.config.session;
        let open = date
            .and_hms_opt(session.open_hour, session.open_minute, 0)?
            .and_utc();
        Some((open, open + TimeDelta::minutes(i64::from(minutes))))
    }

    /// Most recent trading day strictly before `date`.
    #[must_use]
    pub fn previous_trading_day(&self, date: NaiveDate) -> NaiveDate {
        let mut day = date - TimeDelta::days(1);
        while !self.is_trading_day(day) {
            day -= TimeDelta::days(1);
        }
        day
    }

    /// Next trading day strictly after `date`.
    #[must_use]
    pub fn next_trading_day(&self, date: NaiveDate) -> NaiveDate {
        let mut day = date + TimeDelta::days(1);
        while !self.is_trading_day(day) {
            day += TimeDelta::days(1);
        }
        day
    }

    /// Trading days within `range`, in ascending order.
    #[must_use]
    pub fn trading_days(&self, range: &DateRange) -> Vec<NaiveDate> {
        range.days().filter(|d| self.is_trading_day(*d)).collect()
    }

    fn feed_schedule(&self, date: NaiveDate) -> Option<DaySchedule> {
        self.feed.as_ref().and_then(|feed| feed.schedule(date))
    }
}

fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_regular_trading_day() {
        let cal = TradingCalendar::default();
        let date = d(2025, 1, 15); // Wednesday
        assert!(cal.is_trading_day(date));
        assert!(!cal.is_half_day(date));
        assert_eq!(cal.expected_candle_count(date, Timeframe::Minute1), 390);
        assert_eq!(cal.expected_candle_count(date, Timeframe::Minute5), 78);
        assert_eq!(cal.expected_candle_count(date, Timeframe::Hour1), 7);
        assert_eq!(cal.expected_candle_count(date, Timeframe::Daily), 1);
    }

    #[test]
    fn test_weekend_and_holiday_expect_zero() {
        let cal = TradingCalendar::default();
        assert!(!cal.is_trading_day(d(2025, 1, 18))); // Saturday
        assert!(!cal.is_trading_day(d(2025, 12, 25))); // Christmas
        assert_eq!(cal.expected_candle_count(d(2025, 12, 25), Timeframe::Minute1), 0);
        assert_eq!(cal.expected_candle_count(d(2025, 12, 25), Timeframe::Daily), 0);
    }

    #[test]
    fn test_half_day_counts() {
        let cal = TradingCalendar::default();
        let black_friday = d(2025, 11, 28);
        assert!(cal.is_half_day(black_friday));
        assert_eq!(cal.expected_candle_count(black_friday, Timeframe::Minute1), 210);
        assert_eq!(cal.expected_candle_count(black_friday, Timeframe::Minute5), 42);
        assert_eq!(cal.expected_candle_count(black_friday, Timeframe::Daily), 1);
    }

    #[test]
    fn test_session_window() {
        let cal = TradingCalendar::default();
        let (open, close) = cal.session_window(d(2025, 1, 15)).unwrap();
        assert_eq!(open, d(2025, 1, 15).and_hms_opt(13, 30, 0).unwrap().and_utc());
        assert_eq!(close, d(2025, 1, 15).and_hms_opt(20, 0, 0).unwrap().and_utc());

        let (open, close) = cal.session_window(d(2025, 11, 28)).unwrap();
        assert_eq!(close - open, TimeDelta::minutes(210));

        assert!(cal.session_window(d(2025, 1, 18)).is_none());
    }

    #[test]
    fn test_previous_and_next_trading_day() {
        let cal = TradingCalendar::default();
        // Monday January 20th 2025 is MLK Day, so the previous trading day
        // from Tuesday skips the holiday and the weekend back to Friday.
        assert_eq!(cal.previous_trading_day(d(2025, 1, 21)), d(2025, 1, 17));
        assert_eq!(cal.next_trading_day(d(2025, 1, 17)), d(2025, 1, 21));
    }

    #[test]
    fn test_trading_days_in_range() {
        let cal = TradingCalendar::default();
        let range = DateRange::new(d(2025, 1, 13), d(2025, 1, 24)).unwrap();
        let days = cal.trading_days(&range);
        // Two full weeks minus MLK Day.
        assert_eq!(days.len(), 9);
        assert!(!days.contains(&d(2025, 1, 20)));
    }

    struct MapFeed(HashMap<NaiveDate, DaySchedule>);

    impl ExchangeCalendarFeed for MapFeed {
        fn schedule(&self, date: NaiveDate) -> Option<DaySchedule> {
            self.0.get(&date).copied()
        }
    }

    #[test]
    fn test_feed_overrides_computed_rules() {
        // Unscheduled closure on an ordinary Wednesday.
        let mut map = HashMap::new();
        map.insert(d(2025, 1, 15), DaySchedule { trading: false, early_close: false });
        let cal = TradingCalendar::default().with_feed(Arc::new(MapFeed(map)));

        assert!(!cal.is_trading_day(d(2025, 1, 15)));
        assert_eq!(cal.expected_candle_count(d(2025, 1, 15), Timeframe::Minute1), 0);
        // Dates absent from the feed fall back to computed rules.
        assert!(cal.is_trading_day(d(2025, 1, 16)));
    }
}
