// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Countdown readout and the display surface contract.
//!
//! [`Countdown`] splits the remaining time into hours, minutes and seconds by
//! integer division and is never negative. [`DisplaySurface`] is implemented
//! by hosts (DOM slots, a terminal line, a test recorder).

use alloc::string::String;
use core::fmt;

use crate::time::{MS_PER_HOUR, MS_PER_MINUTE, MS_PER_SECOND, Millis, WallTime};

/// Remaining time split into display fields.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Countdown {
    /// Whole hours (may exceed 99 for far-away targets).
    pub hours: u64,
    /// Minutes within the hour, `0..60`.
    pub minutes: u8,
    /// Seconds within the minute, `0..60`.
    pub seconds: u8,
}

impl Countdown {
    /// The readout once the target has passed.
    pub const ZERO: Self = Self {
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Readout for `target - now`, clamped to zero once the target passes.
    #[must_use]
    pub fn remaining(target: WallTime, now: WallTime) -> Self {
        Self::from_millis(target.since(now))
    }

    /// Readout for a remaining duration. Non-positive durations read zero.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "ms is positive here; minute and second fields are below 60"
    )]
    pub fn from_millis(remaining: Millis) -> Self {
        let ms = remaining.get();
        if ms <= 0 {
            return Self::ZERO;
        }
        Self {
            hours: (ms / MS_PER_HOUR) as u64,
            minutes: ((ms % MS_PER_HOUR) / MS_PER_MINUTE) as u8,
            seconds: ((ms % MS_PER_MINUTE) / MS_PER_SECOND) as u8,
        }
    }

    /// Returns `true` for the `00:00:00` readout.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }

    /// Hours, zero-padded to at least two digits.
    #[must_use]
    pub fn hours_text(&self) -> String {
        alloc::format!("{:02}", self.hours)
    }

    /// Minutes, zero-padded to two digits.
    #[must_use]
    pub fn minutes_text(&self) -> String {
        alloc::format!("{:02}", self.minutes)
    }

    /// Seconds, zero-padded to two digits.
    #[must_use]
    pub fn seconds_text(&self) -> String {
        alloc::format!("{:02}", self.seconds)
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

impl fmt::Debug for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Countdown({self})")
    }
}

/// Viewer-facing status line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Status {
    /// Nothing armed.
    #[default]
    Idle,
    /// Armed; media is still loading.
    Buffering,
    /// Media is buffered and the countdown is running.
    Ready,
    /// The media failed to load. The countdown keeps running.
    MediaError,
    /// Playback was requested and has not settled yet.
    Starting,
    /// Playback is running.
    Playing,
    /// The platform refused programmatic playback; a manual play is needed.
    PlaybackBlocked,
    /// The trigger instant passed before the engine could fire.
    MissedWindow,
}

impl Status {
    /// Short message for a status line.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Idle => "",
            Self::Buffering => "Buffering High-Res Content...",
            Self::Ready => "Ready for the Drop.",
            Self::MediaError => "Error loading video file.",
            Self::Starting => "Starting playback...",
            Self::Playing => "",
            Self::PlaybackBlocked => "Click to play.",
            Self::MissedWindow => "Missed the drop. Click to play.",
        }
    }

    /// Returns `true` when the host should offer a manual play control.
    #[must_use]
    pub const fn offers_manual_play(self) -> bool {
        matches!(self, Self::PlaybackBlocked | Self::MissedWindow)
    }
}

/// Receives the countdown readout every tick and status changes as they
/// happen.
pub trait DisplaySurface {
    /// Shows the current readout.
    fn show(&mut self, countdown: &Countdown);

    /// Shows a status change. The default implementation ignores it.
    fn status(&mut self, status: Status) {
        let _ = status;
    }
}
