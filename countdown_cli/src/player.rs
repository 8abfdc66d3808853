// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated media player.

use countdown_core::playback::{PlaybackError, PlaybackHandle};
use tokio::sync::mpsc;

/// Outcome of a play request, delivered back to the event loop.
pub(crate) type PlayOutcome = Result<(), PlaybackError>;

/// [`PlaybackHandle`] that logs what a real player would do.
///
/// Play outcomes go through a channel so the event loop reports them to the
/// engine after the current tick, like a browser resolving `play()`.
#[derive(Debug)]
pub(crate) struct SimulatedPlayer {
    outcomes: mpsc::UnboundedSender<PlayOutcome>,
    /// Number of upcoming play requests to reject as blocked.
    reject_remaining: u32,
    position: f64,
    volume: f64,
    playing: bool,
}

impl SimulatedPlayer {
    pub(crate) fn new(outcomes: mpsc::UnboundedSender<PlayOutcome>, reject_first: u32) -> Self {
        Self {
            outcomes,
            reject_remaining: reject_first,
            position: 0.0,
            volume: 1.0,
            playing: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_playing(&self) -> bool {
        self.playing
    }
}

impl PlaybackHandle for SimulatedPlayer {
    fn seek(&mut self, position: f64) {
        self.position = position;
        tracing::debug!(position, "seek");
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
        tracing::debug!(volume = self.volume, "volume");
    }

    fn play(&mut self) {
        let outcome = if self.reject_remaining > 0 {
            self.reject_remaining -= 1;
            Err(PlaybackError::Blocked(
                "simulated auto-play policy; retry with `play`".into(),
            ))
        } else {
            self.playing = true;
            tracing::info!(from = self.position, volume = self.volume, "simulated playback");
            Ok(())
        };
        if self.outcomes.send(outcome).is_err() {
            tracing::debug!("event loop gone; dropping play outcome");
        }
    }

    fn pause(&mut self) {
        self.playing = false;
        tracing::debug!("pause");
    }
}
