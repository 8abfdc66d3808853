// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM readout.
//!
//! Writes the countdown into three text slots (hours, minutes, seconds) and
//! the status line into an optional fourth element. Slots are only touched
//! when their text changes, so a 60 Hz tick loop costs one DOM write per
//! second.

use countdown_core::display::{Countdown, DisplaySurface, Status};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::{Document, HtmlElement};

/// [`DisplaySurface`] over live DOM elements.
pub struct DomDisplay {
    hours: HtmlElement,
    minutes: HtmlElement,
    seconds: HtmlElement,
    status: Option<HtmlElement>,
    last: Option<Countdown>,
}

impl core::fmt::Debug for DomDisplay {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomDisplay")
            .field("slots", &"HtmlElement x3")
            .field("has_status", &self.status.is_some())
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

impl DomDisplay {
    /// Creates a display over the three readout slots.
    #[must_use]
    pub fn new(hours: HtmlElement, minutes: HtmlElement, seconds: HtmlElement) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            status: None,
            last: None,
        }
    }

    /// Adds a status-line element.
    #[must_use]
    pub fn with_status(mut self, status: HtmlElement) -> Self {
        self.status = Some(status);
        self
    }

    /// Looks up the slots by element id.
    ///
    /// `status_id` is optional; a missing status element is not an error.
    pub fn from_ids(
        document: &Document,
        hours_id: &str,
        minutes_id: &str,
        seconds_id: &str,
        status_id: Option<&str>,
    ) -> Result<Self, JsValue> {
        let display = Self::new(
            element_by_id(document, hours_id)?,
            element_by_id(document, minutes_id)?,
            element_by_id(document, seconds_id)?,
        );
        Ok(match status_id.and_then(|id| element_by_id(document, id).ok()) {
            Some(status) => display.with_status(status),
            None => display,
        })
    }
}

impl DisplaySurface for DomDisplay {
    fn show(&mut self, countdown: &Countdown) {
        let last = self.last.replace(*countdown);
        let changed = |pick: fn(&Countdown) -> u64| last.is_none_or(|l| pick(&l) != pick(countdown));

        if changed(|c| c.hours) {
            self.hours.set_inner_text(&countdown.hours_text());
        }
        if changed(|c| c.minutes.into()) {
            self.minutes.set_inner_text(&countdown.minutes_text());
        }
        if changed(|c| c.seconds.into()) {
            self.seconds.set_inner_text(&countdown.seconds_text());
        }
    }

    fn status(&mut self, status: Status) {
        if let Some(el) = &self.status {
            el.set_inner_text(status.message());
        }
    }
}

pub(crate) fn element_by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("element #{id} has the wrong type")))
}
