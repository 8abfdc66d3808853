// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tick-source abstraction.
//!
//! A [`TickSource`] takes a tick handler and returns a [`CancelToken`]. The
//! source calls the handler once per frame until the handler answers
//! [`LoopControl::Stop`] or the token is cancelled. Cancellation is
//! synchronous: once [`CancelToken::cancel`] returns, the handler is never
//! invoked again and no further frame is scheduled.
//!
//! Backends provide real sources (`requestAnimationFrame`, a timer
//! interval). [`ManualTickSource`] drives frames synchronously so the engine
//! loop can be exercised without real display timing.
//!
//! ```rust,ignore
//! let engine = Rc::new(RefCell::new(Engine::new(config, target, player, display)));
//! engine.borrow_mut().arm(&clip)?;
//! let token = drive(&engine, &mut source);
//! // ... later, from a user action:
//! engine.borrow_mut().cancel();
//! token.cancel();
//! ```

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::display::DisplaySurface;
use crate::engine::Engine;
use crate::playback::PlaybackHandle;
use crate::time::{Millis, WallTime};
use crate::timing::{FrameTick, LoopControl};

/// Per-frame callback registered with a [`TickSource`].
pub type TickHandler = Box<dyn FnMut(FrameTick) -> LoopControl>;

/// A source of frame ticks.
pub trait TickSource {
    /// Starts delivering ticks to `handler`.
    ///
    /// The returned token stops the loop when cancelled.
    fn start(&mut self, handler: TickHandler) -> CancelToken;
}

/// Shared flag that stops a tick loop.
#[derive(Clone, Default)]
pub struct CancelToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the loop. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.cancelled.get())
            .finish()
    }
}

/// A tick source advanced explicitly by the caller.
#[derive(Default)]
pub struct ManualTickSource {
    handler: Option<TickHandler>,
    token: CancelToken,
    frame_counter: u64,
}

impl ManualTickSource {
    /// Creates an idle source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while a handler is registered and not cancelled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handler.is_some() && !self.token.is_cancelled()
    }

    /// Delivers one frame sampled at `now`.
    ///
    /// Returns the handler's answer, or `None` if the loop is not running.
    pub fn advance(&mut self, now: WallTime) -> Option<LoopControl> {
        if self.token.is_cancelled() {
            self.handler = None;
            return None;
        }
        let handler = self.handler.as_mut()?;

        let tick = FrameTick {
            now,
            frame_index: self.frame_counter,
        };
        self.frame_counter += 1;

        let control = handler(tick);
        if !control.is_continue() || self.token.is_cancelled() {
            self.handler = None;
        }
        Some(control)
    }

    /// Delivers up to `frames` frames starting at `start`, `step` apart.
    ///
    /// Stops early if the loop stops. Returns the number of frames delivered.
    pub fn run(&mut self, start: WallTime, step: Millis, frames: u64) -> u64 {
        let mut delivered = 0;
        let mut now = start;
        while delivered < frames {
            if self.advance(now).is_none() {
                break;
            }
            delivered += 1;
            now = now + step;
        }
        delivered
    }
}

impl TickSource for ManualTickSource {
    fn start(&mut self, handler: TickHandler) -> CancelToken {
        self.token = CancelToken::new();
        self.handler = Some(handler);
        self.frame_counter = 0;
        self.token.clone()
    }
}

impl fmt::Debug for ManualTickSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualTickSource")
            .field("running", &self.is_running())
            .field("frame_counter", &self.frame_counter)
            .finish_non_exhaustive()
    }
}

/// Connects a shared engine to a tick source.
///
/// Each frame ticks the engine; the loop ends when the engine is no longer
/// armed or the returned token is cancelled.
pub fn drive<P, D, S>(engine: &Rc<RefCell<Engine<P, D>>>, source: &mut S) -> CancelToken
where
    P: PlaybackHandle + 'static,
    D: DisplaySurface + 'static,
    S: TickSource + ?Sized,
{
    let engine = Rc::clone(engine);
    source.start(Box::new(move |tick: FrameTick| {
        engine.borrow_mut().tick(tick.now).control
    }))
}
