// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Terminal host for the countdown engine.
//!
//! Counts down to the next local New Year (or a target given on the command
//! line), prints the readout on one line, and "plays" the selected clip
//! through a simulated player when its lead-time is reached. Developer
//! commands are read from stdin, one per line:
//!
//! ```text
//! now | midnight      target = now + dev lead
//! target HH:MM        target = today at HH:MM
//! offset <secs>       shift the target
//! play | cancel       manual play / cancel the armed clip
//! status              log engine state
//! arm [index|id]      arm a clip (after a cancel)
//! clips | quit
//! ```

mod clock;
mod command;
mod player;
mod settings;
mod terminal;
mod ticker;

use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context as _, Result, bail};
use clap::Parser;
use chrono::Local;
use countdown_core::calendar::ChronoCalendar;
use countdown_core::clip::{Clip, ClipRegistry};
use countdown_core::dev::{DevCommand, DevCommandError, LocalCalendar, parse_time_of_day};
use countdown_core::engine::Engine;
use countdown_core::scheduler::{CancelToken, drive};
use countdown_core::time::{Millis, WallTime};
use countdown_core::timing::LoopControl;
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

use crate::command::HostCommand;
use crate::player::SimulatedPlayer;
use crate::settings::Overrides;
use crate::terminal::TerminalDisplay;
use crate::ticker::IntervalTicks;

/// Built-in clip list used when `--registry` is not given.
const DEFAULT_REGISTRY: &str = r#"[
  {
    "name": "Yeh Jawaani Hai Deewani",
    "duration": 12,
    "start_time_before_new_year": "00:11",
    "path": "./clips/yjhd.mp4"
  }
]"#;

type CliEngine = Engine<SimulatedPlayer, TerminalDisplay<io::Stdout>>;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "countdown")]
#[command(about = "Counts down to a target instant and starts a clip so its climax lands on zero")]
#[command(version)]
struct Args {
    /// JSON clip registry; the built-in registry is used if omitted
    #[arg(short, long, env = "COUNTDOWN_REGISTRY")]
    registry: Option<PathBuf>,

    /// Clip to arm, by registry index or id (default: the first clip)
    #[arg(short, long)]
    clip: Option<String>,

    /// Target this many seconds from now instead of the next New Year
    #[arg(long, conflicts_with = "target")]
    target_in: Option<i64>,

    /// Target HH:MM today (local time) instead of the next New Year
    #[arg(long, value_parser = parse_hhmm)]
    target: Option<(u8, u8)>,

    /// Signed offset in seconds added to the target
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    offset: i64,

    /// TOML engine configuration
    #[arg(long, env = "COUNTDOWN_CONFIG")]
    config: Option<PathBuf>,

    /// Grace window in milliseconds (overrides the config file)
    #[arg(long)]
    grace_ms: Option<i64>,

    /// Lead of the `now` dev command in milliseconds (overrides the config file)
    #[arg(long)]
    dev_lead_ms: Option<i64>,

    /// Reject this many play requests as blocked, to exercise the retry path
    #[arg(long, default_value_t = 0)]
    reject_plays: u32,

    /// Tick period in milliseconds
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,

    /// Exit once the countdown reaches zero
    #[arg(long)]
    exit_at_zero: bool,
}

fn parse_hhmm(text: &str) -> Result<(u8, u8), String> {
    parse_time_of_day(text).ok_or_else(|| format!("expected HH:MM, got {text:?}"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "countdown_core=info,countdown_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    run(args).await
}

async fn run(args: Args) -> Result<()> {
    let config = settings::load(
        args.config.as_deref(),
        Overrides {
            grace_ms: args.grace_ms,
            dev_lead_ms: args.dev_lead_ms,
        },
    )?;
    let registry = load_registry(args.registry.as_deref())?;
    let calendar = ChronoCalendar::new(Local);

    let now = clock::now();
    let target = initial_target(&args, now, &calendar)?;
    info!(
        target = target.millis(),
        offset_secs = args.offset,
        in_secs = target.since(now).get() / 1_000,
        "countdown target"
    );

    let (outcome_tx, mut outcomes) = mpsc::unbounded_channel();
    let engine = Rc::new(RefCell::new(Engine::new(
        config,
        target,
        SimulatedPlayer::new(outcome_tx, args.reject_plays),
        TerminalDisplay::new(io::stdout()),
    )));
    engine.borrow_mut().set_offset_secs(args.offset);

    let mut host = Host {
        engine,
        registry,
        calendar,
        ticks: IntervalTicks::new(Duration::from_millis(args.tick_ms.max(1)), clock::now),
        token: None,
    };
    let clip = select_clip(&host.registry, args.clip.as_deref())?.clone();
    host.arm(&clip)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            frame = host.ticks.next_frame(), if host.ticks.is_running() => {
                if frame != Some(LoopControl::Continue) {
                    info!("tick loop stopped");
                }
                if args.exit_at_zero && host.reached_zero() {
                    info!("countdown complete");
                    break;
                }
            }
            Some(outcome) = outcomes.recv() => {
                host.engine.borrow_mut().playback_settled(outcome);
            }
            line = lines.next_line(), if stdin_open => {
                match line.context("reading stdin")? {
                    Some(line) => {
                        if host.handle_line(&line) == Flow::Quit {
                            break;
                        }
                    }
                    None => stdin_open = false,
                }
            }
            _ = &mut ctrl_c => {
                info!("interrupted");
                break;
            }
        }

        if !stdin_open && !host.ticks.is_running() {
            break;
        }
    }

    host.cancel();
    println!();
    Ok(())
}

fn load_registry(path: Option<&Path>) -> Result<ClipRegistry> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading registry {}", path.display()))?,
        None => DEFAULT_REGISTRY.to_owned(),
    };
    let load = ClipRegistry::from_json(&text).context("loading clip registry")?;
    if load.registry.is_empty() {
        bail!("clip registry has no usable clips");
    }
    Ok(load.registry)
}

fn select_clip<'a>(registry: &'a ClipRegistry, selector: Option<&str>) -> Result<&'a Clip> {
    match selector {
        None => registry.first().context("clip registry is empty"),
        Some(selector) => match selector.parse::<usize>() {
            Ok(index) => registry.by_index(index),
            Err(_) => registry.get(selector),
        }
        .with_context(|| format!("no clip {selector:?}")),
    }
}

fn initial_target<C: LocalCalendar>(args: &Args, now: WallTime, calendar: &C) -> Result<WallTime> {
    if let Some(secs) = args.target_in {
        return Ok(now + Millis::from_secs(secs));
    }
    if let Some((hour, minute)) = args.target {
        return calendar
            .today_at(now, hour, minute)
            .with_context(|| format!("{hour:02}:{minute:02} does not exist today"));
    }
    Ok(calendar.next_new_year(now))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct Host {
    engine: Rc<RefCell<CliEngine>>,
    registry: ClipRegistry,
    calendar: ChronoCalendar<Local>,
    ticks: IntervalTicks,
    token: Option<CancelToken>,
}

impl Host {
    /// Arms `clip`, reports media readiness, and (re)starts the tick loop.
    fn arm(&mut self, clip: &Clip) -> Result<()> {
        self.engine.borrow_mut().arm(clip)?;

        let media = Path::new(clip.path());
        if media.is_file() {
            self.engine.borrow_mut().media_ready();
        } else {
            self.engine
                .borrow_mut()
                .media_failed(&format!("{} not found", media.display()));
        }

        if !self.ticks.is_running() {
            self.token = Some(drive(&self.engine, &mut self.ticks));
        }
        Ok(())
    }

    fn cancel(&mut self) {
        self.engine.borrow_mut().cancel();
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }

    fn reached_zero(&self) -> bool {
        let engine = self.engine.borrow();
        clock::now() >= engine.effective_target()
    }

    fn handle_line(&mut self, line: &str) -> Flow {
        let command = match HostCommand::parse(line) {
            Ok(command) => command,
            Err(DevCommandError::Empty) => return Flow::Continue,
            Err(err) => {
                warn!(%err, "ignoring input");
                return Flow::Continue;
            }
        };

        match command {
            HostCommand::Quit => return Flow::Quit,
            HostCommand::Clips => {
                for clip in self.registry.iter() {
                    info!(
                        id = %clip.id(),
                        name = clip.name(),
                        duration_secs = clip.duration_secs(),
                        path = clip.path(),
                        "clip"
                    );
                }
            }
            HostCommand::Arm(selector) => {
                let armed = select_clip(&self.registry, selector.as_deref())
                    .cloned()
                    .and_then(|clip| self.arm(&clip));
                if let Err(err) = armed {
                    warn!("arm failed: {err:#}");
                }
            }
            HostCommand::Dev(DevCommand::Cancel) => self.cancel(),
            HostCommand::Dev(command) => {
                let applied = self
                    .engine
                    .borrow_mut()
                    .apply(command, clock::now(), &self.calendar);
                if let Err(err) = applied {
                    warn!(%err, "command failed");
                }
            }
        }
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    /// 2027-01-01T00:00:00Z
    const T: WallTime = WallTime(1_798_761_600_000);

    fn args(extra: &[&str]) -> Args {
        Args::parse_from(std::iter::once("countdown").chain(extra.iter().copied()))
    }

    #[test]
    fn default_registry_has_the_bundled_clip() {
        let registry = load_registry(None).unwrap();
        let clip = select_clip(&registry, None).unwrap();
        assert_eq!(clip.name(), "Yeh Jawaani Hai Deewani");
        assert_eq!(clip.lead_time().millis(), Ok(Millis(11_000)));
    }

    #[test]
    fn clips_select_by_index_or_id() {
        let registry = load_registry(None).unwrap();
        assert_eq!(select_clip(&registry, Some("0")).unwrap().id().as_str(), "clip_0");
        assert!(select_clip(&registry, Some("clip_0")).is_ok());
        assert!(select_clip(&registry, Some("7")).is_err());
    }

    #[test]
    fn target_flags() {
        let calendar = ChronoCalendar::new(Utc);
        let now = T - Millis(3_600_000);

        assert_eq!(initial_target(&args(&[]), now, &calendar).unwrap(), T);
        assert_eq!(
            initial_target(&args(&["--target-in", "30"]), now, &calendar).unwrap(),
            now + Millis(30_000)
        );
        assert_eq!(
            initial_target(&args(&["--target", "23:15"]), now, &calendar).unwrap(),
            T - Millis(2_700_000)
        );
    }

    #[test]
    fn negative_offset_and_bad_time_of_day() {
        assert_eq!(args(&["--offset", "-90"]).offset, -90);
        assert!(Args::try_parse_from(["countdown", "--target", "25:00"]).is_err());
        assert!(
            Args::try_parse_from(["countdown", "--target", "10:00", "--target-in", "5"]).is_err()
        );
    }
}
