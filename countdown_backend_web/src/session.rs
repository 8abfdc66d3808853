// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wiring between the engine, a `<video>` element, and the frame loop.
//!
//! A [`CountdownSession`] owns one engine and one [`RafLoop`]. Arming a clip
//! loads its media; the frame loop starts once the media reports ready (or
//! fails, in which case the countdown still runs). Media readiness is taken
//! from `canplaythrough`, with a one-second `readyState` check as a fallback
//! for browsers that never fire it for cached media.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use countdown_core::clip::Clip;
use countdown_core::config::EngineConfig;
use countdown_core::dev::{DevCommand, LocalCalendar as _};
use countdown_core::display::Status;
use countdown_core::engine::{Engine, EngineError};
use countdown_core::scheduler::{CancelToken, drive};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{Event, HtmlVideoElement};

use crate::calendar::BrowserCalendar;
use crate::display::DomDisplay;
use crate::raf::RafLoop;
use crate::video::{PlaySettled, VideoPlayback};

/// Engine type driven by the web backend.
pub type WebEngine = Engine<VideoPlayback, DomDisplay>;

const READY_FALLBACK_MS: i32 = 1_000;

type EventClosure = Closure<dyn FnMut(Event)>;

/// A countdown bound to live DOM elements.
///
/// Cheap to clone; clones share the same engine and loop.
#[derive(Clone)]
pub struct CountdownSession {
    inner: Rc<SessionInner>,
}

struct SessionInner {
    engine: Rc<RefCell<WebEngine>>,
    video: HtmlVideoElement,
    calendar: BrowserCalendar,
    raf: RefCell<RafLoop>,
    token: RefCell<Option<CancelToken>>,
    on_ready: EventClosure,
    on_error: EventClosure,
    on_fallback: Closure<dyn FnMut()>,
}

impl CountdownSession {
    /// Creates a session counting down to the next local New Year.
    ///
    /// Registers `canplaythrough` and `error` listeners on `video`; they are
    /// removed when the last clone is dropped.
    pub fn new(
        config: EngineConfig,
        video: HtmlVideoElement,
        display: DomDisplay,
    ) -> Result<Self, JsValue> {
        let calendar = BrowserCalendar;
        let target = calendar.next_new_year(crate::now());

        let engine = Rc::new_cyclic(|weak: &Weak<RefCell<WebEngine>>| {
            let weak = weak.clone();
            let on_settled: PlaySettled = Rc::new(move |result| {
                if let Some(engine) = weak.upgrade() {
                    engine.borrow_mut().playback_settled(result);
                }
            });
            RefCell::new(Engine::new(
                config,
                target,
                VideoPlayback::new(video.clone(), on_settled),
                display,
            ))
        });

        let inner = Rc::new_cyclic(|weak: &Weak<SessionInner>| {
            let ready = weak.clone();
            let failed = weak.clone();
            let fallback = weak.clone();
            SessionInner {
                engine,
                video: video.clone(),
                calendar,
                raf: RefCell::new(RafLoop::new()),
                token: RefCell::new(None),
                on_ready: Closure::wrap(Box::new(move |_event: Event| {
                    if let Some(inner) = ready.upgrade() {
                        inner.media_ready();
                    }
                }) as Box<dyn FnMut(Event)>),
                on_error: Closure::wrap(Box::new(move |_event: Event| {
                    if let Some(inner) = failed.upgrade() {
                        inner.media_failed("media element error");
                    }
                }) as Box<dyn FnMut(Event)>),
                on_fallback: Closure::wrap(Box::new(move || {
                    if let Some(inner) = fallback.upgrade() {
                        inner.check_ready();
                    }
                }) as Box<dyn FnMut()>),
            }
        });

        video.add_event_listener_with_callback(
            "canplaythrough",
            inner.on_ready.as_ref().unchecked_ref(),
        )?;
        video.add_event_listener_with_callback("error", inner.on_error.as_ref().unchecked_ref())?;

        Ok(Self { inner })
    }

    /// Arms `clip` and starts loading its media.
    pub fn arm(&self, clip: &Clip) -> Result<(), EngineError> {
        let inner = &self.inner;
        inner.engine.borrow_mut().arm(clip)?;
        inner.engine.borrow().playback().load(clip.path());

        if let Some(window) = web_sys::window() {
            let scheduled = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                inner.on_fallback.as_ref().unchecked_ref(),
                READY_FALLBACK_MS,
            );
            if let Err(err) = scheduled {
                tracing::debug!(?err, "could not schedule the readiness fallback");
            }
        }
        Ok(())
    }

    /// Cancels the armed clip and stops the frame loop.
    pub fn cancel(&self) {
        self.inner.stop();
    }

    /// Starts playback on viewer request.
    pub fn play(&self) -> Result<(), EngineError> {
        self.inner.engine.borrow_mut().play_manually()
    }

    /// Applies a developer command.
    pub fn apply(&self, command: DevCommand) -> Result<(), EngineError> {
        if command == DevCommand::Cancel {
            self.inner.stop();
            return Ok(());
        }
        let inner = &self.inner;
        inner
            .engine
            .borrow_mut()
            .apply(command, crate::now(), &inner.calendar)
    }

    /// Current status line.
    #[must_use]
    pub fn status(&self) -> Status {
        self.inner.engine.borrow().status()
    }
}

impl SessionInner {
    fn media_ready(&self) {
        self.engine.borrow_mut().media_ready();
        self.start_loop();
    }

    fn check_ready(&self) {
        let can_play = self.engine.borrow().playback().can_play();
        if can_play {
            self.media_ready();
        }
    }

    fn media_failed(&self, reason: &str) {
        self.engine.borrow_mut().media_failed(reason);
        self.start_loop();
    }

    /// Idempotent; a loop only runs while a clip is armed.
    fn start_loop(&self) {
        if !self.engine.borrow().is_active() || self.raf.borrow().is_running() {
            return;
        }
        let token = drive(&self.engine, &mut *self.raf.borrow_mut());
        tracing::debug!("frame loop started");
        *self.token.borrow_mut() = Some(token);
    }

    fn stop(&self) {
        self.engine.borrow_mut().cancel();
        if let Some(token) = self.token.borrow_mut().take() {
            token.cancel();
        }
        self.raf.borrow().stop();
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        let _ = self.video.remove_event_listener_with_callback(
            "canplaythrough",
            self.on_ready.as_ref().unchecked_ref(),
        );
        let _ = self
            .video
            .remove_event_listener_with_callback("error", self.on_error.as_ref().unchecked_ref());
    }
}

impl core::fmt::Debug for CountdownSession {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CountdownSession")
            .field("engine", &self.inner.engine.borrow())
            .field("raf", &self.inner.raf.borrow())
            .finish_non_exhaustive()
    }
}
