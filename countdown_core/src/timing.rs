// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-tick types.
//!
//! Hosts deliver a [`FrameTick`] once per display refresh (or per timer
//! interval on native hosts). The handler answers with a [`LoopControl`] that
//! tells the tick source whether to schedule another frame.

use crate::time::WallTime;

/// A frame opportunity delivered by the tick source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameTick {
    /// Wall-clock time sampled for this frame.
    pub now: WallTime,
    /// Monotonically increasing frame counter, reset when a loop starts.
    pub frame_index: u64,
}

/// Whether the tick source should schedule another frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoopControl {
    /// Schedule the next frame.
    Continue,
    /// Stop the loop; no further frames are delivered.
    Stop,
}

impl LoopControl {
    /// Returns `true` for [`LoopControl::Continue`].
    #[inline]
    #[must_use]
    pub const fn is_continue(self) -> bool {
        matches!(self, Self::Continue)
    }
}
