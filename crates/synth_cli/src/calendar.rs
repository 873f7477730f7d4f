//! Second-resolution trading calendar.
//!
//! A calendar is a sequence of sessions of equal length, one per trading
//! day. Each session opens at the configured time of day and yields one
//! timestamp per second until its close. After the close the calendar jumps
//! to the next weekday's open; weekends are skipped, holidays are not
//! modelled.
//!
//! Timestamp `k` labels row `k` of the simulated price matrix, so a calendar
//! with `n` timestamps drives `n - 1` simulation steps.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

use crate::config::{CalendarSettings, ConfigError};

/// Trading sessions at one-second resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct TradingCalendar {
    session_opens: Vec<NaiveDateTime>,
    seconds_per_day: u32,
}

impl TradingCalendar {
    /// Builds `trading_days` sessions of `hours_per_day` hours starting at `start`.
    ///
    /// A start falling on a weekend rolls forward to Monday. Fractional
    /// seconds of the session length are truncated.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidCalendar`] if `trading_days == 0`, if
    /// `hours_per_day` is not in `(0, 24]` or shorter than one second, or if
    /// the last session lies outside the representable date range.
    pub fn new(
        start: NaiveDateTime,
        trading_days: u32,
        hours_per_day: f64,
    ) -> Result<Self, ConfigError> {
        if trading_days == 0 {
            return Err(ConfigError::InvalidCalendar(
                "trading_days must be positive".to_string(),
            ));
        }
        if !hours_per_day.is_finite() || hours_per_day <= 0.0 || hours_per_day > 24.0 {
            return Err(ConfigError::InvalidCalendar(format!(
                "hours_per_day must be in (0, 24], got {}",
                hours_per_day
            )));
        }
        let seconds_per_day = (hours_per_day * 3600.0) as u32;
        if seconds_per_day == 0 {
            return Err(ConfigError::InvalidCalendar(format!(
                "a session of {} hours is shorter than one second",
                hours_per_day
            )));
        }

        let open_time = start.time();
        let mut date = following_weekday(start.date())?;
        let mut session_opens = Vec::with_capacity(trading_days as usize);
        for day in 0..trading_days {
            if day > 0 {
                date = next_weekday(date)?;
            }
            session_opens.push(date.and_time(open_time));
        }

        if let Some(&last_open) = session_opens.last() {
            last_open
                .checked_add_signed(Duration::seconds(i64::from(seconds_per_day)))
                .ok_or_else(|| out_of_range(last_open.date()))?;
        }

        Ok(Self {
            session_opens,
            seconds_per_day,
        })
    }

    /// Builds the calendar described by `settings`.
    pub fn from_settings(settings: &CalendarSettings) -> Result<Self, ConfigError> {
        Self::new(
            settings.start,
            settings.trading_days,
            settings.hours_per_day,
        )
    }

    #[inline]
    pub fn trading_days(&self) -> usize {
        self.session_opens.len()
    }

    #[inline]
    pub fn seconds_per_day(&self) -> u32 {
        self.seconds_per_day
    }

    /// Opening time of every session.
    pub fn session_opens(&self) -> &[NaiveDateTime] {
        &self.session_opens
    }

    /// Total number of timestamps.
    #[inline]
    pub fn len(&self) -> usize {
        self.session_opens.len() * self.seconds_per_day as usize
    }

    /// Always false; a calendar has at least one session of at least one second.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of simulation steps the calendar labels.
    #[inline]
    pub fn steps(&self) -> usize {
        self.len() - 1
    }

    /// Timestamp `k`, or `None` past the end.
    pub fn timestamp(&self, k: usize) -> Option<NaiveDateTime> {
        let per_day = self.seconds_per_day as usize;
        let open = self.session_opens.get(k / per_day)?;
        Some(*open + Duration::seconds((k % per_day) as i64))
    }

    /// Iterates over all timestamps in order.
    pub fn iter(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        let per_day = i64::from(self.seconds_per_day);
        self.session_opens
            .iter()
            .flat_map(move |&open| (0..per_day).map(move |s| open + Duration::seconds(s)))
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sat || date.weekday() == Weekday::Sun
}

fn following_weekday(mut date: NaiveDate) -> Result<NaiveDate, ConfigError> {
    while is_weekend(date) {
        date = date.succ_opt().ok_or_else(|| out_of_range(date))?;
    }
    Ok(date)
}

fn next_weekday(date: NaiveDate) -> Result<NaiveDate, ConfigError> {
    let next = date.succ_opt().ok_or_else(|| out_of_range(date))?;
    following_weekday(next)
}

fn out_of_range(date: NaiveDate) -> ConfigError {
    ConfigError::InvalidCalendar(format!("sessions run past {}", date))
}
