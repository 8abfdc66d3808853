// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Local-time arithmetic through the browser's `Date`.

use countdown_core::dev::LocalCalendar;
use countdown_core::time::WallTime;
use js_sys::Date;
use wasm_bindgen::JsValue;

/// [`LocalCalendar`] backed by `js_sys::Date`, so the browser's time-zone
/// database resolves local midnight and daylight-saving rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserCalendar;

impl BrowserCalendar {
    fn date_at(instant: WallTime) -> Date {
        #[expect(
            clippy::cast_precision_loss,
            reason = "epoch milliseconds stay far below 2^53"
        )]
        let ms = instant.millis() as f64;
        Date::new(&JsValue::from_f64(ms))
    }

    fn local(year: u32, month: i32, day: i32, hour: i32, minute: i32) -> Date {
        Date::new_with_year_month_day_hr_min_sec(year, month, day, hour, minute, 0)
    }
}

impl LocalCalendar for BrowserCalendar {
    fn next_new_year(&self, now: WallTime) -> WallTime {
        let today = Self::date_at(now);
        crate::wall_time(&Self::local(today.get_full_year() + 1, 0, 1, 0, 0))
    }

    fn today_at(&self, now: WallTime, hour: u8, minute: u8) -> Option<WallTime> {
        let today = Self::date_at(now);
        let at = Self::local(
            today.get_full_year(),
            today.get_month().cast_signed(),
            today.get_date().cast_signed(),
            hour.into(),
            minute.into(),
        );
        // `Date` rolls a local time skipped by a DST jump forward.
        if at.get_hours() != u32::from(hour) || at.get_minutes() != u32::from(minute) {
            return None;
        }
        Some(crate::wall_time(&at))
    }
}
