// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Developer overrides for exercising the trigger window without waiting for
//! the real target date.
//!
//! | Command | Effect |
//! |---|---|
//! | `now` / `midnight` | target = now + configured dev lead, offset = 0 |
//! | `target HH:MM` | target = today at `HH:MM` local time, offset = 0 |
//! | `offset <secs>` | offset = signed seconds (leading integer: `1.5` is 1) |
//! | `play` | manual play (retry affordance) |
//! | `cancel` | cancel the armed clip |
//! | `status` | report the engine state |
//!
//! Local-time arithmetic is host-specific, so it sits behind
//! [`LocalCalendar`].

use alloc::string::String;

use thiserror::Error;

use crate::time::WallTime;

/// Local-time calendar arithmetic supplied by the host.
pub trait LocalCalendar {
    /// January 1 of the year after `now`, 00:00:00 local time.
    fn next_new_year(&self, now: WallTime) -> WallTime;

    /// `hour:minute:00` local time on the calendar day containing `now`.
    ///
    /// Returns `None` if that local time does not exist (e.g. skipped by a
    /// daylight-saving transition).
    fn today_at(&self, now: WallTime, hour: u8, minute: u8) -> Option<WallTime>;
}

/// A parsed developer override.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DevCommand {
    /// Target the configured dev lead from now.
    TargetFromNow,
    /// Target a local time of day today.
    TargetTimeOfDay {
        /// Hour, `0..24`.
        hour: u8,
        /// Minute, `0..60`.
        minute: u8,
    },
    /// Shift the effective target by signed seconds.
    OffsetSecs(i64),
    /// Start playback manually.
    Play,
    /// Cancel the armed clip.
    Cancel,
    /// Report state.
    Status,
}

/// A developer command could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DevCommandError {
    /// Empty input.
    #[error("empty command")]
    Empty,
    /// Unrecognized command word.
    #[error("unknown command {0:?}")]
    Unknown(String),
    /// The argument is missing or unparsable.
    #[error("bad argument for `{command}`: {argument:?}")]
    BadArgument {
        /// Command word.
        command: &'static str,
        /// Argument text as given.
        argument: String,
    },
}

impl DevCommand {
    /// Parses a single command line.
    pub fn parse(line: &str) -> Result<Self, DevCommandError> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Err(DevCommandError::Empty);
        };
        let argument = words.next().unwrap_or("");

        match command.to_ascii_lowercase().as_str() {
            "now" | "midnight" => Ok(Self::TargetFromNow),
            "target" => {
                let (hour, minute) =
                    parse_time_of_day(argument).ok_or_else(|| DevCommandError::BadArgument {
                        command: "target",
                        argument: argument.into(),
                    })?;
                Ok(Self::TargetTimeOfDay { hour, minute })
            }
            "offset" => leading_integer(argument)
                .map(Self::OffsetSecs)
                .ok_or_else(|| DevCommandError::BadArgument {
                    command: "offset",
                    argument: argument.into(),
                }),
            "play" => Ok(Self::Play),
            "cancel" => Ok(Self::Cancel),
            "status" => Ok(Self::Status),
            _ => Err(DevCommandError::Unknown(command.into())),
        }
    }
}

/// Reads the integer at the start of `text`, ignoring anything after it.
///
/// `"1.5"` is 1 and `"10s"` is 10. Returns `None` when there are no digits
/// or the value does not fit in an `i64`.
#[must_use]
pub fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    rest[..digits].bytes().try_fold(0_i64, |acc, b| {
        let digit = i64::from(b - b'0');
        let acc = acc.checked_mul(10)?;
        if negative {
            acc.checked_sub(digit)
        } else {
            acc.checked_add(digit)
        }
    })
}

/// Parses `HH:MM` (24-hour clock).
#[must_use]
pub fn parse_time_of_day(text: &str) -> Option<(u8, u8)> {
    let (hour, minute) = text.trim().split_once(':')?;
    let hour: u8 = hour.parse().ok()?;
    let minute: u8 = minute.parse().ok()?;
    (hour < 24 && minute < 60).then_some((hour, minute))
}
