// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Terminal readout.

use std::io::Write;

use countdown_core::display::{Countdown, DisplaySurface, Status};

/// [`DisplaySurface`] that redraws a single terminal line.
///
/// The countdown is rewritten in place with a carriage return whenever the
/// readout changes; status changes go on their own line.
#[derive(Debug)]
pub(crate) struct TerminalDisplay<W: Write> {
    out: W,
    last: Option<Countdown>,
}

impl<W: Write> TerminalDisplay<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out, last: None }
    }

    fn write(&mut self, args: std::fmt::Arguments<'_>) {
        let written = self.out.write_fmt(args).and_then(|()| self.out.flush());
        if let Err(err) = written {
            tracing::debug!(%err, "terminal write failed");
        }
    }

    #[cfg(test)]
    pub(crate) fn output(&self) -> &W {
        &self.out
    }
}

impl<W: Write> DisplaySurface for TerminalDisplay<W> {
    fn show(&mut self, countdown: &Countdown) {
        if self.last.replace(*countdown) == Some(*countdown) {
            return;
        }
        self.write(format_args!("\r  {countdown}  "));
    }

    fn status(&mut self, status: Status) {
        self.last = None;
        self.write(format_args!("\r\n[{}]\n", status.message()));
    }
}
