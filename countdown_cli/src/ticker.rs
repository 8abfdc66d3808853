// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `tokio` interval tick source.

use std::time::Duration;

use countdown_core::scheduler::{CancelToken, TickHandler, TickSource};
use countdown_core::time::WallTime;
use countdown_core::timing::{FrameTick, LoopControl};
use tokio::time::{Interval, MissedTickBehavior, interval};

/// [`TickSource`] paced by a `tokio` interval.
///
/// Frames are pulled by the event loop with [`next_frame`](Self::next_frame)
/// so they can be multiplexed with other events in `select!`.
pub(crate) struct IntervalTicks {
    interval: Interval,
    clock: fn() -> WallTime,
    handler: Option<TickHandler>,
    token: CancelToken,
    frame_counter: u64,
}

impl IntervalTicks {
    /// Must be called inside a `tokio` runtime.
    pub(crate) fn new(period: Duration, clock: fn() -> WallTime) -> Self {
        let mut interval = interval(period);
        // A stalled terminal should not cause a burst of catch-up frames.
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            interval,
            clock,
            handler: None,
            token: CancelToken::new(),
            frame_counter: 0,
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.handler.is_some() && !self.token.is_cancelled()
    }

    /// Waits for the next period and delivers one frame.
    ///
    /// Returns `None` once the loop has stopped. Cancel-safe: a frame is
    /// only delivered after the interval has fired.
    pub(crate) async fn next_frame(&mut self) -> Option<LoopControl> {
        if !self.is_running() {
            self.handler = None;
            return None;
        }
        self.interval.tick().await;
        if self.token.is_cancelled() {
            self.handler = None;
            return None;
        }

        let handler = self.handler.as_mut()?;
        let tick = FrameTick {
            now: (self.clock)(),
            frame_index: self.frame_counter,
        };
        self.frame_counter += 1;

        let control = handler(tick);
        if !control.is_continue() || self.token.is_cancelled() {
            self.handler = None;
        }
        Some(control)
    }
}

impl TickSource for IntervalTicks {
    fn start(&mut self, handler: TickHandler) -> CancelToken {
        self.token.cancel();
        self.token = CancelToken::new();
        self.handler = Some(handler);
        self.frame_counter = 0;
        self.interval.reset();
        self.token.clone()
    }
}

impl std::fmt::Debug for IntervalTicks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntervalTicks")
            .field("period", &self.interval.period())
            .field("running", &self.is_running())
            .field("frame_counter", &self.frame_counter)
            .finish_non_exhaustive()
    }
}
