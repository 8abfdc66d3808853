// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine tuning.

use serde::Deserialize;

use crate::time::Millis;

/// Configuration for the [`Engine`](crate::engine::Engine).
///
/// Deserializes from partial documents; missing fields keep their
/// [`standard`](Self::standard) values.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How late a trigger may be observed and still fire playback. A crossing
    /// observed this late or later is a missed window.
    #[serde(rename = "grace_window_ms", with = "millis")]
    pub grace_window: Millis,
    /// How far ahead of "now" the target lands for a `now` dev override.
    #[serde(rename = "dev_target_lead_ms", with = "millis")]
    pub dev_target_lead: Millis,
    /// Volume applied right before the triggered playback starts.
    pub volume: f64,
}

impl EngineConfig {
    /// The stock configuration: a 5 s grace window, a 10 s dev lead, full
    /// volume.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            grace_window: Millis(5_000),
            dev_target_lead: Millis(10_000),
            volume: 1.0,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::standard()
    }
}

mod millis {
    use serde::{Deserialize, Deserializer};

    use crate::time::Millis;

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Millis, D::Error> {
        i64::deserialize(d).map(Millis)
    }
}
