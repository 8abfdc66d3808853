// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Countdown timing and one-shot playback trigger.
//!
//! `countdown_core` counts down to a target instant and, a clip's lead-time
//! before that instant, starts the clip's playback exactly once so that its
//! climactic moment lands on zero. It is `no_std` compatible (with `alloc`);
//! platform glue lives in backend crates.
//!
//! # Architecture
//!
//! The crate is organized around a frame loop driven by the host:
//!
//! ```text
//!   ClipRegistry ──► Engine::arm(clip)
//!                         │
//!   TickSource ──► FrameTick ──► Engine::tick(now) ──► DisplaySurface::show()
//!       ▲                              │
//!       └──── LoopControl ◄────────────┤
//!                                      ▼ (once per arm cycle)
//!                          PlaybackHandle::{seek, set_volume, play}
//!                                      │
//!   host ──► Engine::playback_settled(result) ◄────────┘
//! ```
//!
//! **[`engine`]**: the countdown/trigger state machine.
//!
//! **[`scheduler`]**: [`TickSource`](scheduler::TickSource) abstraction,
//! cancellation tokens, and a manually driven source for tests.
//!
//! **[`clip`]** and **[`lead_time`]**: clip records, registry loading, and
//! lead-time parsing.
//!
//! **[`display`]**: countdown readout math and the
//! [`DisplaySurface`](display::DisplaySurface) contract.
//!
//! **[`playback`]**: the [`PlaybackHandle`](playback::PlaybackHandle)
//! contract.
//!
//! **[`dev`]** and **[`calendar`]**: developer overrides and local-time
//! arithmetic over `chrono` time zones.
//!
//! **[`testing`]**: recording collaborators.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod calendar;
pub mod clip;
pub mod config;
pub mod dev;
pub mod display;
pub mod engine;
pub mod lead_time;
pub mod playback;
pub mod scheduler;
pub mod testing;
pub mod time;
pub mod timing;
