// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wall clock.

use countdown_core::time::WallTime;

/// Current wall-clock time.
pub(crate) fn now() -> WallTime {
    WallTime(chrono::Utc::now().timestamp_millis())
}
