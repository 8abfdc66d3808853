// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`LocalCalendar`] over a `chrono` time zone.
//!
//! `chrono` is used without its `clock` feature here, so this module works
//! in `no_std` builds with any [`TimeZone`]: `Utc` and `FixedOffset` always,
//! `Local` when the host enables `chrono/clock`.

use chrono::{DateTime, Datelike as _, NaiveDate, TimeZone};

use crate::dev::LocalCalendar;
use crate::time::WallTime;

/// Calendar arithmetic in the time zone `Tz`.
#[derive(Clone, Debug)]
pub struct ChronoCalendar<Tz: TimeZone> {
    tz: Tz,
}

impl<Tz: TimeZone> ChronoCalendar<Tz> {
    /// A calendar for `tz`.
    #[must_use]
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    fn local(&self, instant: WallTime) -> Option<DateTime<Tz>> {
        DateTime::from_timestamp_millis(instant.millis()).map(|utc| utc.with_timezone(&self.tz))
    }

    /// First valid instant of `hour:minute` on `date`, or `None` inside a
    /// daylight-saving gap.
    fn at(&self, date: NaiveDate, hour: u8, minute: u8) -> Option<WallTime> {
        date.and_hms_opt(hour.into(), minute.into(), 0)?
            .and_local_timezone(self.tz.clone())
            .earliest()
            .map(|dt| WallTime(dt.timestamp_millis()))
    }
}

impl<Tz: TimeZone> LocalCalendar for ChronoCalendar<Tz> {
    fn next_new_year(&self, now: WallTime) -> WallTime {
        let Some(local) = self.local(now) else {
            return now;
        };
        NaiveDate::from_ymd_opt(local.year() + 1, 1, 1)
            .and_then(|date| {
                // Midnight skipped by DST: fall back to UTC midnight.
                self.at(date, 0, 0).or_else(|| {
                    date.and_hms_opt(0, 0, 0)
                        .map(|dt| WallTime(dt.and_utc().timestamp_millis()))
                })
            })
            .unwrap_or(now)
    }

    fn today_at(&self, now: WallTime, hour: u8, minute: u8) -> Option<WallTime> {
        let date = self.local(now)?.date_naive();
        self.at(date, hour, minute)
    }
}
