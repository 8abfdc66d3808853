// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for countdown.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`RafLoop`]: `requestAnimationFrame` tick source
//! - [`DomDisplay`]: countdown readout in DOM text slots
//! - [`VideoPlayback`]: playback through an `HtmlVideoElement`
//! - [`BrowserCalendar`]: local-time arithmetic through `Date`
//! - [`CountdownSession`]: the pieces wired together, plus a JS-facing
//!   [`WebCountdown`] wrapper

mod calendar;
mod display;
mod raf;
mod session;
mod video;

pub use calendar::BrowserCalendar;
pub use display::DomDisplay;
pub use raf::RafLoop;
pub use session::{CountdownSession, WebEngine};
pub use video::{PlaySettled, VideoPlayback};

use countdown_core::clip::{ClipId, ClipRegistry};
use countdown_core::config::EngineConfig;
use countdown_core::dev::DevCommand;
use countdown_core::time::WallTime;
use wasm_bindgen::prelude::*;
use web_sys::HtmlVideoElement;

/// Returns the current wall-clock time from `Date.now()`.
#[must_use]
pub fn now() -> WallTime {
    from_epoch_ms(js_sys::Date::now())
}

pub(crate) fn wall_time(date: &js_sys::Date) -> WallTime {
    from_epoch_ms(date.get_time())
}

fn from_epoch_ms(ms: f64) -> WallTime {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "Date values are integral milliseconds within ±8.64e15"
    )]
    WallTime(ms as i64)
}

fn js_error(err: impl core::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// JavaScript entry point.
///
/// ```js
/// const countdown = new WebCountdown(registryJson, null, "video", "h", "m", "s", "status");
/// countdown.select(0);
/// ```
#[wasm_bindgen]
pub struct WebCountdown {
    session: CountdownSession,
    registry: ClipRegistry,
}

#[wasm_bindgen]
impl WebCountdown {
    /// Loads the clip registry, binds the DOM elements, and creates an idle
    /// session.
    ///
    /// `config_json` overrides [`EngineConfig`] fields; `null` keeps the
    /// defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        registry_json: &str,
        config_json: Option<String>,
        video_id: &str,
        hours_id: &str,
        minutes_id: &str,
        seconds_id: &str,
        status_id: Option<String>,
    ) -> Result<Self, JsValue> {
        let config = match config_json {
            Some(json) => serde_json::from_str::<EngineConfig>(&json).map_err(js_error)?,
            None => EngineConfig::standard(),
        };
        let load = ClipRegistry::from_json(registry_json).map_err(js_error)?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| js_error("no document"))?;
        let video: HtmlVideoElement = display::element_by_id(&document, video_id)?;
        let display = DomDisplay::from_ids(
            &document,
            hours_id,
            minutes_id,
            seconds_id,
            status_id.as_deref(),
        )?;

        Ok(Self {
            session: CountdownSession::new(config, video, display)?,
            registry: load.registry,
        })
    }

    /// Names of the loaded clips, in registry order.
    #[wasm_bindgen(js_name = clipNames)]
    pub fn clip_names(&self) -> Vec<String> {
        self.registry.iter().map(|c| c.name().to_owned()).collect()
    }

    /// Arms the clip at `index`.
    pub fn select(&self, index: usize) -> Result<(), JsValue> {
        let clip = self
            .registry
            .by_index(index)
            .ok_or_else(|| js_error(format!("no clip {}", ClipId::from_index(index))))?;
        self.session.arm(clip).map_err(js_error)
    }

    /// Cancels the armed clip.
    pub fn cancel(&self) {
        self.session.cancel();
    }

    /// Manual play; the retry path after a blocked auto-play.
    pub fn play(&self) -> Result<(), JsValue> {
        self.session.play().map_err(js_error)
    }

    /// Parses and applies a developer command such as `"target 23:59"`.
    pub fn dev(&self, line: &str) -> Result<(), JsValue> {
        let command = DevCommand::parse(line).map_err(js_error)?;
        self.session.apply(command).map_err(js_error)
    }

    /// Current status message.
    pub fn status(&self) -> String {
        self.session.status().message().to_owned()
    }

    /// Whether the status offers a manual play button.
    #[wasm_bindgen(js_name = offersManualPlay)]
    pub fn offers_manual_play(&self) -> bool {
        self.session.status().offers_manual_play()
    }
}

impl core::fmt::Debug for WebCountdown {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebCountdown")
            .field("session", &self.session)
            .field("clips", &self.registry.len())
            .finish_non_exhaustive()
    }
}
