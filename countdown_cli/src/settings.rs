// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration from a TOML file and command-line overrides.
//!
//! ```toml
//! grace_window_ms = 5000
//! dev_target_lead_ms = 10000
//! volume = 0.8
//! ```

use std::path::Path;

use anyhow::{Context as _, Result};
use countdown_core::config::EngineConfig;
use countdown_core::time::Millis;

/// Flag values that take precedence over the file.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) grace_ms: Option<i64>,
    pub(crate) dev_lead_ms: Option<i64>,
}

/// Reads `path` (if any) and applies `overrides`.
pub(crate) fn load(path: Option<&Path>, overrides: Overrides) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            parse(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => EngineConfig::standard(),
    };
    Ok(apply(config, overrides))
}

fn parse(text: &str) -> Result<EngineConfig, toml::de::Error> {
    toml::from_str(text)
}

fn apply(mut config: EngineConfig, overrides: Overrides) -> EngineConfig {
    if let Some(ms) = overrides.grace_ms {
        config.grace_window = Millis(ms);
    }
    if let Some(ms) = overrides.dev_lead_ms {
        config.dev_target_lead = Millis(ms);
    }
    config
}
