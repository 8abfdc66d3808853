// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Commands read from stdin.

use countdown_core::dev::{DevCommand, DevCommandError};

/// A line of terminal input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum HostCommand {
    /// An engine override.
    Dev(DevCommand),
    /// Arm a clip by registry index or id; `None` re-arms the default clip.
    Arm(Option<String>),
    /// List the registry.
    Clips,
    /// Leave the program.
    Quit,
}

impl HostCommand {
    pub(crate) fn parse(line: &str) -> Result<Self, DevCommandError> {
        let mut words = line.split_whitespace();
        match words.next().map(str::to_ascii_lowercase).as_deref() {
            Some("arm") => Ok(Self::Arm(words.next().map(str::to_owned))),
            Some("clips") => Ok(Self::Clips),
            Some("quit" | "exit" | "q") => Ok(Self::Quit),
            _ => DevCommand::parse(line).map(Self::Dev),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_words_take_precedence() {
        assert_eq!(HostCommand::parse("quit"), Ok(HostCommand::Quit));
        assert_eq!(HostCommand::parse("  Clips "), Ok(HostCommand::Clips));
        assert_eq!(HostCommand::parse("arm"), Ok(HostCommand::Arm(None)));
        assert_eq!(
            HostCommand::parse("arm clip_1"),
            Ok(HostCommand::Arm(Some("clip_1".into())))
        );
    }

    #[test]
    fn everything_else_is_a_dev_command() {
        assert_eq!(
            HostCommand::parse("offset -15"),
            Ok(HostCommand::Dev(DevCommand::OffsetSecs(-15)))
        );
        assert_eq!(HostCommand::parse(""), Err(DevCommandError::Empty));
        assert!(matches!(
            HostCommand::parse("jump"),
            Err(DevCommandError::Unknown(_))
        ));
    }
}
