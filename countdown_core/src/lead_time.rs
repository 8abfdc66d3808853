// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clip lead-times.
//!
//! A lead-time says how long before the target instant a clip must start so
//! its climactic moment lands on zero. Registries carry it either as a number
//! of seconds or as `"MM:SS"` text:
//!
//! ```text
//! 30        → 30 s
//! "00:11"   → 11 s
//! "02:05"   → 125 s
//! "45"      → 45 s   (plain numeric text)
//! "abc"     → malformed
//! ```

use alloc::string::String;
use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::Millis;

/// Why a lead-time could not be turned into seconds.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LeadTimeError {
    /// The text is neither `MM:SS` nor a plain number.
    #[error("malformed lead-time {0:?}")]
    Malformed(String),
    /// The value parsed but is NaN or infinite.
    #[error("lead-time is not a finite number")]
    NotFinite,
}

/// A clip's declared lead-time before the target instant.
///
/// Uses untagged serde so registries can write either `30` or `"00:30"`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LeadTime {
    /// Numeric seconds.
    Seconds(f64),
    /// `"MM:SS"` or numeric text.
    Text(String),
}

impl LeadTime {
    /// Returns the lead-time in seconds.
    pub fn seconds(&self) -> Result<f64, LeadTimeError> {
        let secs = match self {
            Self::Seconds(secs) => *secs,
            Self::Text(text) => parse_text(text)?,
        };
        if secs.is_finite() {
            Ok(secs)
        } else {
            Err(LeadTimeError::NotFinite)
        }
    }

    /// Returns the lead-time as a millisecond duration.
    pub fn millis(&self) -> Result<Millis, LeadTimeError> {
        let secs = self.seconds()?;
        Millis::from_secs_f64(secs).ok_or(LeadTimeError::NotFinite)
    }
}

impl From<f64> for LeadTime {
    fn from(secs: f64) -> Self {
        Self::Seconds(secs)
    }
}

impl From<&str> for LeadTime {
    fn from(text: &str) -> Self {
        Self::Text(text.into())
    }
}

impl fmt::Debug for LeadTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seconds(secs) => write!(f, "LeadTime({secs}s)"),
            Self::Text(text) => write!(f, "LeadTime({text:?})"),
        }
    }
}

impl fmt::Display for LeadTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seconds(secs) => write!(f, "{secs}s"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Seconds for `lead_time`, or `f64::NAN` when it is malformed.
///
/// Callers that compare against the result must guard with
/// [`f64::is_nan`]; the engine uses [`LeadTime::millis`] instead.
#[must_use]
pub fn lead_time_secs(lead_time: &LeadTime) -> f64 {
    lead_time.seconds().unwrap_or(f64::NAN)
}

fn parse_text(text: &str) -> Result<f64, LeadTimeError> {
    let malformed = || LeadTimeError::Malformed(text.into());

    let mut parts = text.split(':');
    if let (Some(minutes), Some(seconds), None) = (parts.next(), parts.next(), parts.next()) {
        let minutes = number(minutes).ok_or_else(malformed)?;
        let seconds = number(seconds).ok_or_else(malformed)?;
        return Ok(minutes * 60.0 + seconds);
    }

    number(text).ok_or_else(malformed)
}

/// Lenient numeric coercion: surrounding whitespace is ignored and blank
/// text counts as zero.
fn number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0.0);
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}
