// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clip records and the clip registry.
//!
//! Registries arrive as a JSON array of loosely-shaped records. Each record is
//! validated on load into a fixed-shape [`Clip`]; records missing a required
//! field are rejected one by one and reported, so a single bad entry never
//! hides the rest of the registry. A record whose lead-time cannot be read is
//! kept, with a warning, and simply never auto-starts.
//!
//! ```json
//! [
//!   {
//!     "name": "Yeh Jawaani Hai Deewani",
//!     "duration": 12,
//!     "start_time_before_new_year": "00:11",
//!     "path": "./clips/yjhd.mp4"
//!   }
//! ]
//! ```

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::lead_time::LeadTime;

/// Stable identifier for a clip, derived from its registry position.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClipId(String);

impl ClipId {
    /// Identifier for the record at `index` in the source registry.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(format!("clip_{index}"))
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClipId({})", self.0)
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated, immutable clip.
#[derive(Clone, Debug, PartialEq)]
pub struct Clip {
    id: ClipId,
    name: String,
    duration_secs: u32,
    lead_time: LeadTime,
    path: String,
}

impl Clip {
    /// Creates a clip directly, bypassing registry validation.
    #[must_use]
    pub fn new(
        id: ClipId,
        name: impl Into<String>,
        duration_secs: u32,
        lead_time: impl Into<LeadTime>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            duration_secs,
            lead_time: lead_time.into(),
            path: path.into(),
        }
    }

    /// The clip's identifier.
    #[must_use]
    pub fn id(&self) -> &ClipId {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Clip length in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    /// Declared lead-time before the target instant.
    #[must_use]
    pub fn lead_time(&self) -> &LeadTime {
        &self.lead_time
    }

    /// Media locator.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// A registry record as written, before validation.
#[derive(Debug, Default, Deserialize)]
struct ClipRecord {
    name: Option<String>,
    duration: Option<u32>,
    #[serde(alias = "lead_time")]
    start_time_before_new_year: Option<LeadTime>,
    path: Option<String>,
}

impl ClipRecord {
    fn validate(self, index: usize) -> Result<Clip, ClipError> {
        let missing = |field| ClipError::MissingField { index, field };
        let name = self.name.ok_or_else(|| missing("name"))?;
        let duration_secs = self.duration.ok_or_else(|| missing("duration"))?;
        let lead_time = self
            .start_time_before_new_year
            .ok_or_else(|| missing("start_time_before_new_year"))?;
        let path = self.path.ok_or_else(|| missing("path"))?;
        if path.trim().is_empty() {
            return Err(ClipError::EmptyPath { index });
        }
        Ok(Clip {
            id: ClipId::from_index(index),
            name,
            duration_secs,
            lead_time,
            path,
        })
    }
}

/// A single registry record that was rejected.
#[derive(Debug, Error)]
pub enum ClipError {
    /// A required field is absent.
    #[error("clip #{index} is missing required field `{field}`")]
    MissingField {
        /// Position in the source registry.
        index: usize,
        /// Name of the missing field.
        field: &'static str,
    },
    /// The media locator is blank.
    #[error("clip #{index} has an empty path")]
    EmptyPath {
        /// Position in the source registry.
        index: usize,
    },
    /// A field has the wrong type.
    #[error("clip #{index} is malformed: {source}")]
    Malformed {
        /// Position in the source registry.
        index: usize,
        /// Underlying decode error.
        source: serde_json::Error,
    },
}

/// The registry document as a whole could not be read.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Not valid JSON, or not an array.
    #[error("clip registry is not a JSON array: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result of loading a registry: the accepted clips plus rejected records.
#[derive(Debug)]
pub struct RegistryLoad {
    /// Clips that passed validation, in source order.
    pub registry: ClipRegistry,
    /// Records that were rejected.
    pub rejected: Vec<ClipError>,
}

/// Ordered list of validated clips.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClipRegistry {
    clips: Vec<Clip>,
}

impl ClipRegistry {
    /// Parses and validates a JSON registry document.
    pub fn from_json(json: &str) -> Result<RegistryLoad, RegistryError> {
        let records: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let mut clips = Vec::with_capacity(records.len());
        let mut rejected = Vec::new();

        for (index, value) in records.into_iter().enumerate() {
            let outcome = ClipRecord::deserialize(value)
                .map_err(|source| ClipError::Malformed { index, source })
                .and_then(|record| record.validate(index));
            match outcome {
                Ok(clip) => {
                    if let Err(err) = clip.lead_time.millis() {
                        tracing::warn!(
                            clip = %clip.id,
                            %err,
                            "unusable lead-time; clip will not auto-start"
                        );
                    }
                    clips.push(clip);
                }
                Err(err) => {
                    tracing::warn!(%err, "rejected clip record");
                    rejected.push(err);
                }
            }
        }

        tracing::info!(
            loaded = clips.len(),
            rejected = rejected.len(),
            "loaded clip registry"
        );
        Ok(RegistryLoad {
            registry: Self { clips },
            rejected,
        })
    }

    /// Looks up a clip by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id.as_str() == id)
    }

    /// Returns the clip at `index` in registry order.
    #[must_use]
    pub fn by_index(&self, index: usize) -> Option<&Clip> {
        self.clips.get(index)
    }

    /// The default selection.
    #[must_use]
    pub fn first(&self) -> Option<&Clip> {
        self.clips.first()
    }

    /// Iterates clips in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Clip> {
        self.clips.iter()
    }

    /// Number of clips.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// Returns `true` if no clips were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY: &str = r#"[
        {
            "name": "Yeh Jawaani Hai Deewani",
            "duration": 12,
            "start_time_before_new_year": "00:11",
            "path": "./clips/yjhd.mp4"
        },
        { "name": "No path", "duration": 3, "lead_time": 3 },
        { "name": "Numeric", "duration": 30, "lead_time": 30, "path": "./clips/n.mp4" }
    ]"#;

    #[test]
    fn loads_valid_records_and_assigns_ids_by_position() {
        let load = ClipRegistry::from_json(REGISTRY).unwrap();
        let reg = &load.registry;
        assert_eq!(reg.len(), 2);

        let first = reg.first().unwrap();
        assert_eq!(first.id().as_str(), "clip_0");
        assert_eq!(first.name(), "Yeh Jawaani Hai Deewani");
        assert_eq!(first.duration_secs(), 12);
        assert_eq!(first.lead_time().seconds(), Ok(11.0));
        assert_eq!(first.path(), "./clips/yjhd.mp4");

        let numeric = reg.get("clip_2").expect("ids follow source position");
        assert_eq!(numeric.lead_time(), &LeadTime::Seconds(30.0));
        assert!(reg.get("clip_1").is_none());
    }

    #[test]
    fn missing_fields_are_reported_per_record() {
        let load = ClipRegistry::from_json(REGISTRY).unwrap();
        assert_eq!(load.rejected.len(), 1);
        assert!(matches!(
            load.rejected[0],
            ClipError::MissingField { index: 1, field: "path" }
        ));
    }

    #[test]
    fn wrong_field_types_are_rejected_not_fatal() {
        let load = ClipRegistry::from_json(
            r#"[{ "name": "Bad", "duration": "long", "lead_time": 1, "path": "x" }]"#,
        )
        .unwrap();
        assert!(load.registry.is_empty());
        assert!(matches!(load.rejected[0], ClipError::Malformed { index: 0, .. }));
    }

    #[test]
    fn blank_path_is_rejected() {
        let load = ClipRegistry::from_json(
            r#"[{ "name": "Blank", "duration": 1, "lead_time": 1, "path": "  " }]"#,
        )
        .unwrap();
        assert!(matches!(load.rejected[0], ClipError::EmptyPath { index: 0 }));
    }

    #[test]
    fn unusable_lead_time_is_kept_but_flagged() {
        let load = ClipRegistry::from_json(
            r#"[{ "name": "Odd", "duration": 5, "lead_time": "abc", "path": "./clips/odd.mp4" }]"#,
        )
        .unwrap();
        assert!(load.rejected.is_empty());
        let clip = load.registry.first().expect("record is kept");
        assert!(clip.lead_time().millis().is_err());
    }

    #[test]
    fn non_array_document_is_an_error() {
        assert!(ClipRegistry::from_json(r#"{ "name": "x" }"#).is_err());
        assert!(ClipRegistry::from_json("not json").is_err());
    }
}
