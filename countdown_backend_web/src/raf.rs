// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestAnimationFrame` tick source.
//!
//! [`RafLoop`] implements [`TickSource`] on top of the browser's
//! `requestAnimationFrame` API. Each frame samples the wall clock with
//! `Date.now()` rather than using the callback's `DOMHighResTimeStamp`: the
//! countdown targets an absolute calendar instant, not a monotonic one.
//!
//! Frames stop being scheduled as soon as the handler answers
//! [`LoopControl::Stop`], the [`CancelToken`] is cancelled, or
//! [`stop`](RafLoop::stop) is called. A cancelled token is checked before the
//! handler runs, so the frame already queued at cancel time does no work.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use countdown_core::scheduler::{CancelToken, TickHandler, TickSource};
use countdown_core::timing::{FrameTick, LoopControl};

// Direct global bindings instead of `web_sys::Window` methods; avoids
// fetching (and unwrapping) the Window object on every frame.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

/// A `requestAnimationFrame` loop that delivers [`FrameTick`]s to a tick
/// handler.
///
/// Create with [`RafLoop::new`], then hand it to
/// [`drive`](countdown_core::scheduler::drive) or call
/// [`start`](TickSource::start) directly.
pub struct RafLoop {
    inner: Rc<RafInner>,
}

type RafClosure = Closure<dyn FnMut(f64)>;

struct RafInner {
    /// The JS closure registered with `requestAnimationFrame`.
    ///
    /// Stored in its own `RefCell` so we can set it once in `start()` and
    /// reference it from inside itself without conflicting with `handler`.
    closure: RefCell<Option<RafClosure>>,

    /// The tick handler for the current run.
    handler: RefCell<Option<TickHandler>>,

    /// Token handed out by the current `start()`.
    token: RefCell<CancelToken>,

    /// Frame counter (becomes `FrameTick::frame_index`), reset per run.
    frame_counter: Cell<u64>,

    /// Whether a frame is scheduled or being delivered.
    running: Cell<bool>,

    /// The ID returned by the most recent `requestAnimationFrame` call,
    /// used by [`cancel_animation_frame`] when stopping.
    raf_id: Cell<i32>,
}

impl RafInner {
    fn on_frame(&self) {
        if !self.running.get() {
            return;
        }
        if self.token.borrow().is_cancelled() {
            self.halt();
            return;
        }

        let frame_index = self.frame_counter.get();
        self.frame_counter.set(frame_index + 1);
        let tick = FrameTick {
            now: crate::now(),
            frame_index,
        };

        // The borrow is scoped so it doesn't overlap with the `closure`
        // RefCell.
        let control = match self.handler.borrow_mut().as_mut() {
            Some(handler) => handler(tick),
            None => LoopControl::Stop,
        };

        if control.is_continue() && self.running.get() && !self.token.borrow().is_cancelled() {
            if let Some(ref closure) = *self.closure.borrow() {
                let id = request_animation_frame(closure.as_ref().unchecked_ref());
                self.raf_id.set(id);
            }
        } else {
            self.halt();
        }
    }

    fn halt(&self) {
        self.running.set(false);
        self.handler.borrow_mut().take();
    }
}

impl RafLoop {
    /// Creates a loop that is **not yet running**.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RafInner {
                closure: RefCell::new(None),
                handler: RefCell::new(None),
                token: RefCell::new(CancelToken::new()),
                frame_counter: Cell::new(0),
                running: Cell::new(false),
                raf_id: Cell::new(0),
            }),
        }
    }

    /// Stops the loop and cancels its token.
    ///
    /// The pending `requestAnimationFrame` callback is cancelled. Can be
    /// restarted with another [`start`](TickSource::start).
    pub fn stop(&self) {
        self.inner.token.borrow().cancel();
        if !self.inner.running.get() {
            return;
        }
        cancel_animation_frame(self.inner.raf_id.get());
        self.inner.halt();
    }

    /// Returns `true` while frames are being scheduled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }
}

impl Default for RafLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for RafLoop {
    fn start(&mut self, handler: TickHandler) -> CancelToken {
        self.stop();

        let token = CancelToken::new();
        *self.inner.token.borrow_mut() = token.clone();
        *self.inner.handler.borrow_mut() = Some(handler);
        self.inner.frame_counter.set(0);
        self.inner.running.set(true);

        if self.inner.closure.borrow().is_none() {
            let inner = Rc::clone(&self.inner);
            let closure = Closure::wrap(Box::new(move |_timestamp_ms: f64| {
                inner.on_frame();
            }) as Box<dyn FnMut(f64)>);
            *self.inner.closure.borrow_mut() = Some(closure);
        }

        if let Some(ref closure) = *self.inner.closure.borrow() {
            let id = request_animation_frame(closure.as_ref().unchecked_ref());
            self.inner.raf_id.set(id);
        }
        token
    }
}

impl Drop for RafLoop {
    fn drop(&mut self) {
        self.stop();
        // Drop the JS closure so it doesn't leak (it holds an `Rc` to
        // `inner`).
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for RafLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RafLoop")
            .field("running", &self.inner.running.get())
            .field("frame_counter", &self.inner.frame_counter.get())
            .field("raf_id", &self.inner.raf_id.get())
            .finish()
    }
}
