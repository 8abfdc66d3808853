// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Playback handle contract.
//!
//! Hosts implement [`PlaybackHandle`] over their media element. `play()` is
//! fire-and-forget: starting playback is asynchronous on every real platform,
//! so hosts report the outcome back through
//! [`Engine::playback_settled`](crate::engine::Engine::playback_settled)
//! once it is known.

use alloc::string::String;

use thiserror::Error;

/// Why the platform refused or failed to start playback.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// Programmatic playback was blocked (e.g. an auto-play policy).
    #[error("playback was blocked: {0}")]
    Blocked(String),
    /// The media could not be played.
    #[error("playback failed: {0}")]
    Failed(String),
}

/// Control surface over a single media resource.
pub trait PlaybackHandle {
    /// Seeks to `position` seconds from the start.
    fn seek(&mut self, position: f64);

    /// Sets the output volume in `0.0..=1.0`.
    fn set_volume(&mut self, volume: f64);

    /// Requests playback. Completion is reported asynchronously.
    fn play(&mut self);

    /// Pauses playback.
    fn pause(&mut self);
}
