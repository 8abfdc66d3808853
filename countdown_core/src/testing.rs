// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording collaborators for tests and headless simulations.

use alloc::string::{String, ToString as _};
use alloc::vec::Vec;

use crate::display::{Countdown, DisplaySurface, Status};
use crate::playback::PlaybackHandle;

/// One call made on a [`RecordingPlayer`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerCall {
    /// `seek(position)`.
    Seek(f64),
    /// `set_volume(volume)`.
    Volume(f64),
    /// `play()`.
    Play,
    /// `pause()`.
    Pause,
}

/// A [`PlaybackHandle`] that records every call.
#[derive(Clone, Debug, Default)]
pub struct RecordingPlayer {
    /// Calls in the order they were made.
    pub calls: Vec<PlayerCall>,
}

impl RecordingPlayer {
    /// Number of `play()` requests.
    #[must_use]
    pub fn plays(&self) -> usize {
        self.calls.iter().filter(|c| **c == PlayerCall::Play).count()
    }
}

impl PlaybackHandle for RecordingPlayer {
    fn seek(&mut self, position: f64) {
        self.calls.push(PlayerCall::Seek(position));
    }

    fn set_volume(&mut self, volume: f64) {
        self.calls.push(PlayerCall::Volume(volume));
    }

    fn play(&mut self) {
        self.calls.push(PlayerCall::Play);
    }

    fn pause(&mut self) {
        self.calls.push(PlayerCall::Pause);
    }
}

/// A [`DisplaySurface`] that records every readout and status change.
#[derive(Clone, Debug, Default)]
pub struct RecordingDisplay {
    /// Readouts as `HH:MM:SS`, one per tick.
    pub shown: Vec<String>,
    /// Status changes in order.
    pub statuses: Vec<Status>,
}

impl RecordingDisplay {
    /// The most recent readout.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.shown.last().map(String::as_str)
    }
}

impl DisplaySurface for RecordingDisplay {
    fn show(&mut self, countdown: &Countdown) {
        self.shown.push(countdown.to_string());
    }

    fn status(&mut self, status: Status) {
        self.statuses.push(status);
    }
}
