// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The countdown/trigger engine.
//!
//! [`Engine`] holds the target instant, a signed offset, and the armed clip's
//! lead-time. Each [`tick`](Engine::tick) pushes the remaining time to the
//! [`DisplaySurface`] and checks whether the trigger instant has been reached:
//!
//! ```text
//! effective_target = target + offset
//! trigger_instant  = effective_target - lead_time
//!
//!         pending          │   fire    │        missed
//! ─────────────────────────┼───────────┼──────────────────────▶ now
//!                   trigger_instant   +grace_window
//! ```
//!
//! A crossing observed inside the grace window fires playback once; a later
//! first observation is a missed window and playback stays off (the viewer
//! may still start it manually). Starting late from zero would put the
//! clip's climax after the target, so a late crossing is skipped rather than
//! clamped.
//!
//! # States
//!
//! ```text
//!          arm                 trigger / manual play
//!   Idle ───────▶ Armed ─────────────────────────────▶ Triggered
//!    ▲              │                                      │
//!    └── cancel ────┴────────────── cancel ────────────────┘
//! ```
//!
//! Ticks do no work in `Idle` and answer [`LoopControl::Stop`], so a
//! cancelled loop ends on its next frame even if the host did not cancel the
//! tick source itself.

use core::fmt;

use thiserror::Error;

use crate::clip::{Clip, ClipId};
use crate::config::EngineConfig;
use crate::dev::{DevCommand, LocalCalendar};
use crate::display::{Countdown, DisplaySurface, Status};
use crate::playback::{PlaybackError, PlaybackHandle};
use crate::time::{Millis, WallTime};
use crate::timing::LoopControl;

/// Engine lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum EngineState {
    /// Nothing armed; ticks are no-ops.
    #[default]
    Idle,
    /// A clip is armed and waiting for its trigger instant.
    Armed,
    /// Playback was initiated for this arm cycle.
    Triggered,
}

/// Result of the trigger check for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerCheck {
    /// The engine is idle; nothing was evaluated.
    Inactive,
    /// The trigger instant is still ahead by `remaining`.
    Pending {
        /// Time left until the trigger instant.
        remaining: Millis,
    },
    /// Playback was initiated on this tick.
    Fired {
        /// How far past the trigger instant this tick observed.
        late_by: Millis,
    },
    /// The trigger instant passed more than a grace window ago.
    Missed {
        /// How far past the trigger instant this tick observed.
        late_by: Millis,
    },
    /// Playback already started during this arm cycle.
    AlreadyTriggered,
    /// The armed clip has no usable lead-time; it never triggers.
    NoTrigger,
}

/// What a single tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// The readout pushed to the display, or `None` if the engine was idle.
    pub countdown: Option<Countdown>,
    /// Trigger evaluation for this tick.
    pub trigger: TriggerCheck,
    /// Whether the tick source should schedule another frame.
    pub control: LoopControl,
}

/// Errors from explicit engine actions.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    /// `arm` was called while a clip is already armed.
    #[error("already armed with {0}")]
    AlreadyArmed(ClipId),
    /// The action needs an armed clip.
    #[error("nothing is armed")]
    NotArmed,
    /// The requested local time does not exist today.
    #[error("local time {hour:02}:{minute:02} does not exist today")]
    NoSuchLocalTime {
        /// Requested hour.
        hour: u8,
        /// Requested minute.
        minute: u8,
    },
}

#[derive(Clone, Debug)]
struct ArmedClip {
    clip: Clip,
    /// `None` when the lead-time is malformed.
    lead: Option<Millis>,
}

/// Countdown/trigger engine over a playback handle `P` and display `D`.
pub struct Engine<P, D> {
    config: EngineConfig,
    target: WallTime,
    offset: Millis,
    state: EngineState,
    status: Status,
    armed: Option<ArmedClip>,
    miss_reported: bool,
    playback: P,
    display: D,
}

impl<P: PlaybackHandle, D: DisplaySurface> Engine<P, D> {
    /// Creates an idle engine counting down to `target`.
    #[must_use]
    pub fn new(config: EngineConfig, target: WallTime, playback: P, display: D) -> Self {
        Self {
            config,
            target,
            offset: Millis::ZERO,
            state: EngineState::Idle,
            status: Status::Idle,
            armed: None,
            miss_reported: false,
            playback,
            display,
        }
    }

    /// Arms `clip`. The host loads the clip's media and reports back with
    /// [`media_ready`](Self::media_ready) or
    /// [`media_failed`](Self::media_failed).
    pub fn arm(&mut self, clip: &Clip) -> Result<(), EngineError> {
        if let Some(armed) = &self.armed {
            return Err(EngineError::AlreadyArmed(armed.clip.id().clone()));
        }

        let lead = match clip.lead_time().millis() {
            Ok(lead) => Some(lead),
            Err(err) => {
                tracing::warn!(
                    clip = %clip.id(),
                    %err,
                    "lead-time unusable; this clip will not auto-start"
                );
                None
            }
        };

        self.armed = Some(ArmedClip {
            clip: clip.clone(),
            lead,
        });
        self.state = EngineState::Armed;
        self.miss_reported = false;
        self.set_status(Status::Buffering);
        tracing::info!(
            clip = %clip.id(),
            name = clip.name(),
            lead_ms = lead.map(Millis::get),
            "armed"
        );
        Ok(())
    }

    /// The armed clip's media is buffered.
    pub fn media_ready(&mut self) {
        if self.state == EngineState::Idle {
            return;
        }
        tracing::info!("media buffered and ready");
        if matches!(self.status, Status::Buffering | Status::MediaError) {
            self.set_status(Status::Ready);
        }
    }

    /// The armed clip's media failed to load. The countdown keeps running.
    pub fn media_failed(&mut self, reason: &str) {
        if self.state == EngineState::Idle {
            return;
        }
        tracing::warn!(reason, "media failed to load");
        self.set_status(Status::MediaError);
    }

    /// Cancels the armed clip, rewinds the player, and re-arms the one-shot
    /// guard. The next tick stops the loop.
    pub fn cancel(&mut self) {
        if self.state == EngineState::Idle {
            return;
        }
        self.playback.pause();
        self.playback.seek(0.0);
        self.state = EngineState::Idle;
        self.armed = None;
        self.miss_reported = false;
        self.set_status(Status::Idle);
        tracing::info!("cancelled");
    }

    /// Processes one frame sampled at `now`.
    pub fn tick(&mut self, now: WallTime) -> TickReport {
        if self.state == EngineState::Idle {
            return TickReport {
                countdown: None,
                trigger: TriggerCheck::Inactive,
                control: LoopControl::Stop,
            };
        }

        let countdown = self.countdown_at(now);
        self.display.show(&countdown);

        let trigger = self.check_trigger(now);

        TickReport {
            countdown: Some(countdown),
            trigger,
            control: LoopControl::Continue,
        }
    }

    fn check_trigger(&mut self, now: WallTime) -> TriggerCheck {
        match self.state {
            EngineState::Idle => return TriggerCheck::Inactive,
            EngineState::Triggered => return TriggerCheck::AlreadyTriggered,
            EngineState::Armed => {}
        }

        let Some(trigger) = self.trigger_instant() else {
            return TriggerCheck::NoTrigger;
        };

        let late_by = now.since(trigger);
        if late_by < Millis::ZERO {
            return TriggerCheck::Pending { remaining: -late_by };
        }

        if late_by < self.config.grace_window {
            tracing::info!(%late_by, at = now.millis(), "triggering drop");
            self.start_playback(true);
            TriggerCheck::Fired { late_by }
        } else {
            if !self.miss_reported {
                self.miss_reported = true;
                tracing::warn!(
                    %late_by,
                    grace = %self.config.grace_window,
                    "missed the trigger window; playback will not auto-start"
                );
                self.set_status(Status::MissedWindow);
            }
            TriggerCheck::Missed { late_by }
        }
    }

    fn start_playback(&mut self, rewind: bool) {
        if rewind {
            self.playback.seek(0.0);
        }
        self.playback.set_volume(self.config.volume);
        self.playback.play();
        self.state = EngineState::Triggered;
        self.set_status(Status::Starting);
    }

    /// Reports the outcome of the last [`PlaybackHandle::play`] request.
    ///
    /// Only a cycle that has requested playback can receive an outcome; one
    /// arriving after a cancel (or a cancel and re-arm) is dropped.
    pub fn playback_settled(&mut self, result: Result<(), PlaybackError>) {
        if self.state != EngineState::Triggered {
            tracing::debug!(?result, state = ?self.state, "ignoring stale playback outcome");
            return;
        }
        match result {
            Ok(()) => {
                tracing::info!("playback started");
                self.set_status(Status::Playing);
            }
            Err(err) => {
                tracing::warn!(%err, "playback did not start; waiting for a manual play");
                self.set_status(Status::PlaybackBlocked);
            }
        }
    }

    /// Starts playback on viewer request: the retry path after a blocked
    /// auto-play, or a late start after a missed window.
    ///
    /// Counts as this cycle's trigger, so a later crossing cannot restart
    /// the clip.
    pub fn play_manually(&mut self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Idle => Err(EngineError::NotArmed),
            EngineState::Armed => {
                tracing::info!("manual play");
                self.start_playback(true);
                Ok(())
            }
            EngineState::Triggered => {
                tracing::info!("manual play retry");
                self.start_playback(false);
                Ok(())
            }
        }
    }

    /// Replaces the target instant and clears the offset.
    pub fn set_target(&mut self, target: WallTime) {
        self.target = target;
        self.offset = Millis::ZERO;
        self.miss_reported = false;
        tracing::debug!(target = target.millis(), "target overridden");
    }

    /// Sets the signed offset added to the target.
    pub fn set_offset(&mut self, offset: Millis) {
        self.offset = offset;
        self.miss_reported = false;
        tracing::debug!(%offset, "offset overridden");
    }

    /// Sets the offset from signed whole seconds.
    pub fn set_offset_secs(&mut self, secs: i64) {
        self.set_offset(Millis::from_secs(secs));
    }

    /// Moves the target to `now` plus the configured dev lead.
    pub fn target_from_now(&mut self, now: WallTime) {
        self.set_target(now + self.config.dev_target_lead);
    }

    /// Applies a developer command.
    pub fn apply<C: LocalCalendar + ?Sized>(
        &mut self,
        command: DevCommand,
        now: WallTime,
        calendar: &C,
    ) -> Result<(), EngineError> {
        match command {
            DevCommand::TargetFromNow => self.target_from_now(now),
            DevCommand::TargetTimeOfDay { hour, minute } => {
                let target = calendar
                    .today_at(now, hour, minute)
                    .ok_or(EngineError::NoSuchLocalTime { hour, minute })?;
                self.set_target(target);
            }
            DevCommand::OffsetSecs(secs) => self.set_offset_secs(secs),
            DevCommand::Play => self.play_manually()?,
            DevCommand::Cancel => self.cancel(),
            DevCommand::Status => {
                tracing::info!(
                    state = ?self.state,
                    status = ?self.status,
                    target = self.effective_target().millis(),
                    trigger = self.trigger_instant().map(WallTime::millis),
                    remaining = %self.countdown_at(now),
                    "status"
                );
            }
        }
        Ok(())
    }

    fn set_status(&mut self, status: Status) {
        if self.status != status {
            self.status = status;
            self.display.status(status);
        }
    }
}

impl<P, D> Engine<P, D> {
    /// `target + offset`.
    #[must_use]
    pub fn effective_target(&self) -> WallTime {
        self.target + self.offset
    }

    /// The instant playback should start, or `None` if nothing is armed or
    /// the armed clip's lead-time is malformed.
    #[must_use]
    pub fn trigger_instant(&self) -> Option<WallTime> {
        let lead = self.armed.as_ref()?.lead?;
        Some(self.effective_target() - lead)
    }

    /// Readout for `now`.
    #[must_use]
    pub fn countdown_at(&self, now: WallTime) -> Countdown {
        Countdown::remaining(self.effective_target(), now)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Returns `true` once playback was initiated in this arm cycle.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.state == EngineState::Triggered
    }

    /// Returns `true` while a clip is armed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state != EngineState::Idle
    }

    /// Current status line.
    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    /// The armed clip, if any.
    #[must_use]
    pub fn armed_clip(&self) -> Option<&Clip> {
        self.armed.as_ref().map(|a| &a.clip)
    }

    /// The configured target instant, without the offset.
    #[must_use]
    pub fn target(&self) -> WallTime {
        self.target
    }

    /// The current offset.
    #[must_use]
    pub fn offset(&self) -> Millis {
        self.offset
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The playback handle.
    #[must_use]
    pub fn playback(&self) -> &P {
        &self.playback
    }

    /// The display surface.
    #[must_use]
    pub fn display(&self) -> &D {
        &self.display
    }
}

impl<P, D> fmt::Debug for Engine<P, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("target", &self.target)
            .field("offset", &self.offset)
            .field("state", &self.state)
            .field("status", &self.status)
            .field("armed", &self.armed.as_ref().map(|a| a.clip.id()))
            .field("miss_reported", &self.miss_reported)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::ChronoCalendar;
    use crate::clip::ClipId;
    use crate::testing::{PlayerCall, RecordingDisplay, RecordingPlayer};
    use alloc::string::ToString as _;

    const T: WallTime = WallTime(1_767_225_600_000);

    fn clip(lead: &str) -> Clip {
        Clip::new(ClipId::from_index(0), "Drop", 12, lead, "./clips/drop.mp4")
    }

    fn engine() -> Engine<RecordingPlayer, RecordingDisplay> {
        Engine::new(
            EngineConfig::standard(),
            T,
            RecordingPlayer::default(),
            RecordingDisplay::default(),
        )
    }

    fn armed(lead: &str) -> Engine<RecordingPlayer, RecordingDisplay> {
        let mut e = engine();
        e.arm(&clip(lead)).unwrap();
        e.media_ready();
        e
    }

    #[test]
    fn idle_tick_does_nothing_and_stops() {
        let mut e = engine();
        let report = e.tick(T - Millis(1_000));
        assert_eq!(report.control, LoopControl::Stop);
        assert_eq!(report.trigger, TriggerCheck::Inactive);
        assert!(e.display().shown.is_empty(), "no display work when idle");
    }

    #[test]
    fn fires_once_at_trigger_instant() {
        let mut e = armed("00:11");
        assert_eq!(e.trigger_instant(), Some(T - Millis(11_000)));

        let before = e.tick(T - Millis(11_001));
        assert_eq!(before.trigger, TriggerCheck::Pending { remaining: Millis(1) });
        assert_eq!(e.playback().plays(), 0);

        let at = e.tick(T - Millis(11_000));
        assert_eq!(at.trigger, TriggerCheck::Fired { late_by: Millis::ZERO });
        assert!(e.is_triggered());
        assert_eq!(
            e.playback().calls,
            [PlayerCall::Seek(0.0), PlayerCall::Volume(1.0), PlayerCall::Play]
        );

        let after = e.tick(T - Millis(10_000));
        assert_eq!(after.trigger, TriggerCheck::AlreadyTriggered);
        assert_eq!(e.playback().plays(), 1);
    }

    #[test]
    fn display_keeps_updating_after_trigger() {
        let mut e = armed("00:11");
        e.tick(T - Millis(11_000));
        let report = e.tick(T - Millis(2_500));
        assert_eq!(report.control, LoopControl::Continue);
        assert_eq!(report.countdown.unwrap().to_string(), "00:00:02");
        let report = e.tick(T + Millis(1));
        assert_eq!(report.countdown, Some(Countdown::ZERO));
    }

    #[test]
    fn grace_window_is_strict() {
        let mut inside = armed("00:11");
        let trigger = inside.trigger_instant().unwrap();
        assert!(matches!(
            inside.tick(trigger + Millis(4_999)).trigger,
            TriggerCheck::Fired { .. }
        ));

        let mut edge = armed("00:11");
        assert!(matches!(
            edge.tick(trigger + Millis(5_000)).trigger,
            TriggerCheck::Missed { .. }
        ));
        assert_eq!(edge.playback().plays(), 0);
    }

    #[test]
    fn missed_window_reports_once_and_keeps_ticking() {
        let mut e = armed("00:11");
        let trigger = e.trigger_instant().unwrap();
        let first = e.tick(trigger + Millis(60_000));
        let second = e.tick(trigger + Millis(60_016));
        assert!(matches!(first.trigger, TriggerCheck::Missed { .. }));
        assert!(matches!(second.trigger, TriggerCheck::Missed { .. }));
        assert_eq!(second.control, LoopControl::Continue);
        assert_eq!(e.status(), Status::MissedWindow);
        let missed = e
            .display()
            .statuses
            .iter()
            .filter(|s| **s == Status::MissedWindow)
            .count();
        assert_eq!(missed, 1, "miss surfaced once");
        assert_eq!(e.state(), EngineState::Armed);
    }

    #[test]
    fn manual_play_after_miss() {
        let mut e = armed("00:11");
        e.tick(T + Millis(60_000));
        e.play_manually().unwrap();
        assert!(e.is_triggered());
        assert_eq!(e.playback().plays(), 1);
        e.tick(T + Millis(60_016));
        assert_eq!(e.playback().plays(), 1);
    }

    #[test]
    fn malformed_lead_time_never_triggers() {
        let mut e = armed("abc");
        assert_eq!(e.trigger_instant(), None);
        for step in 0..100 {
            let report = e.tick(T - Millis(50_000) + Millis(step * 1_000));
            assert_eq!(report.trigger, TriggerCheck::NoTrigger);
            assert_eq!(report.control, LoopControl::Continue);
        }
        assert_eq!(e.playback().plays(), 0);
        assert_eq!(e.display().last().unwrap(), "00:00:00");
    }

    #[test]
    fn rejected_playback_offers_retry() {
        let mut e = armed("00:11");
        e.tick(T - Millis(11_000));
        e.playback_settled(Err(PlaybackError::Blocked("NotAllowedError".into())));
        assert_eq!(e.status(), Status::PlaybackBlocked);
        assert!(e.status().offers_manual_play());

        e.play_manually().unwrap();
        assert_eq!(e.status(), Status::Starting);
        assert_eq!(e.playback().plays(), 2);
        e.playback_settled(Ok(()));
        assert_eq!(e.status(), Status::Playing);
    }

    #[test]
    fn cancel_rearms_the_guard() {
        let mut e = armed("00:11");
        e.tick(T - Millis(11_000));
        assert!(e.is_triggered());

        e.cancel();
        assert!(!e.is_triggered());
        assert_eq!(e.state(), EngineState::Idle);
        assert_eq!(e.tick(T - Millis(10_990)).control, LoopControl::Stop);
        assert!(e.playback().calls.ends_with(&[PlayerCall::Pause, PlayerCall::Seek(0.0)]));

        e.arm(&clip("00:11")).unwrap();
        e.set_target(T + Millis(60_000));
        e.tick(T + Millis(49_000));
        assert_eq!(e.playback().plays(), 2);
    }

    #[test]
    fn outcome_after_cancel_is_ignored() {
        let mut e = armed("00:11");
        e.tick(T - Millis(11_000));
        e.cancel();
        e.playback_settled(Ok(()));
        assert_eq!(e.status(), Status::Idle);
    }

    #[test]
    fn arming_twice_is_an_error() {
        let mut e = armed("00:11");
        assert_eq!(
            e.arm(&clip("00:05")),
            Err(EngineError::AlreadyArmed(ClipId::from_index(0)))
        );
    }

    #[test]
    fn media_failure_keeps_counting_down() {
        let mut e = engine();
        e.arm(&clip("00:11")).unwrap();
        e.media_failed("404");
        assert_eq!(e.status(), Status::MediaError);
        let report = e.tick(T - Millis(90_000));
        assert_eq!(report.countdown.unwrap().to_string(), "00:01:30");
        assert_eq!(report.control, LoopControl::Continue);
    }

    #[test]
    fn offset_shifts_target_and_trigger() {
        let mut e = armed("00:10");
        e.set_offset_secs(-30);
        assert_eq!(e.effective_target(), T - Millis(30_000));
        assert_eq!(e.trigger_instant(), Some(T - Millis(40_000)));
        assert!(matches!(
            e.tick(T - Millis(40_000)).trigger,
            TriggerCheck::Fired { .. }
        ));
    }

    #[test]
    fn set_target_clears_offset() {
        let mut e = engine();
        e.set_offset_secs(5);
        e.set_target(WallTime(42));
        assert_eq!(e.offset(), Millis::ZERO);
        assert_eq!(e.effective_target(), WallTime(42));
    }

    #[test]
    fn moving_the_target_after_a_miss_can_fire_again() {
        let mut e = armed("00:11");
        e.tick(T + Millis(60_000));
        assert_eq!(e.status(), Status::MissedWindow);

        e.target_from_now(T + Millis(60_000));
        assert_eq!(e.effective_target(), T + Millis(70_000));
        assert!(matches!(
            e.tick(T + Millis(59_000)).trigger,
            TriggerCheck::Fired { .. }
        ));
    }

    #[test]
    fn outcome_from_a_previous_cycle_is_dropped() {
        let mut e = armed("00:11");
        e.tick(T - Millis(11_000));
        e.cancel();
        e.arm(&clip("00:11")).unwrap();
        e.media_ready();

        e.playback_settled(Err(PlaybackError::Blocked("NotAllowedError".into())));
        assert_eq!(e.status(), Status::Ready);
        assert!(!e.status().offers_manual_play());
        assert_eq!(e.state(), EngineState::Armed);
    }

    #[test]
    fn outcome_while_armed_is_ignored() {
        let mut e = armed("00:11");
        e.playback_settled(Ok(()));
        assert_eq!(e.status(), Status::Ready);
        e.playback_settled(Err(PlaybackError::Failed("decode".into())));
        assert_eq!(e.status(), Status::Ready);
        assert_eq!(e.state(), EngineState::Armed);
    }

    #[test]
    fn status_command_changes_nothing() {
        let calendar = ChronoCalendar::new(chrono::Utc);
        let mut e = armed("00:11");
        e.set_offset_secs(-5);
        let calls_before = e.playback().calls.len();
        let shown_before = e.display().shown.len();
        let statuses_before = e.display().statuses.len();

        e.apply(DevCommand::Status, T - Millis(60_000), &calendar)
            .unwrap();
        assert_eq!(e.state(), EngineState::Armed);
        assert_eq!(e.status(), Status::Ready);
        assert_eq!(e.offset(), Millis(-5_000));
        assert_eq!(e.playback().calls.len(), calls_before);
        assert_eq!(e.display().shown.len(), shown_before);
        assert_eq!(e.display().statuses.len(), statuses_before);
    }

    #[test]
    fn status_command_works_when_idle() {
        let calendar = ChronoCalendar::new(chrono::Utc);
        let mut e = engine();
        assert_eq!(e.apply(DevCommand::Status, T, &calendar), Ok(()));
        assert_eq!(e.state(), EngineState::Idle);
    }
}
