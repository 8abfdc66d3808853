// Copyright 2026 the Countdown Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end trigger behavior through a manually driven tick loop.

use std::cell::RefCell;
use std::rc::Rc;

use countdown_core::calendar::ChronoCalendar;
use countdown_core::clip::{Clip, ClipId, ClipRegistry};
use countdown_core::config::EngineConfig;
use countdown_core::dev::{DevCommand, LocalCalendar as _};
use countdown_core::display::Status;
use countdown_core::engine::{Engine, EngineState};
use countdown_core::scheduler::{ManualTickSource, drive};
use countdown_core::testing::{RecordingDisplay, RecordingPlayer};
use countdown_core::time::{Millis, WallTime};
use countdown_core::timing::LoopControl;

type TestEngine = Engine<RecordingPlayer, RecordingDisplay>;

/// 2027-01-01T00:00:00Z
const T: WallTime = WallTime(1_798_761_600_000);
const FRAME: Millis = Millis(16);

fn shared_engine(config: EngineConfig) -> Rc<RefCell<TestEngine>> {
    Rc::new(RefCell::new(Engine::new(
        config,
        T,
        RecordingPlayer::default(),
        RecordingDisplay::default(),
    )))
}

fn yjhd() -> Clip {
    Clip::new(
        ClipId::from_index(0),
        "Yeh Jawaani Hai Deewani",
        12,
        "00:11",
        "./clips/yjhd.mp4",
    )
}

fn arm(engine: &Rc<RefCell<TestEngine>>, clip: &Clip) {
    let mut e = engine.borrow_mut();
    e.arm(clip).unwrap();
    e.media_ready();
}

#[test]
fn thousand_ticks_across_the_trigger_fire_once() {
    let engine = shared_engine(EngineConfig::standard());
    arm(&engine, &yjhd());

    let mut source = ManualTickSource::new();
    let _token = drive(&engine, &mut source);

    // 500 frames before and 500 after the trigger instant.
    let start = T - Millis(11_000) - Millis(500 * FRAME.get());
    let delivered = source.run(start, FRAME, 1_000);

    assert_eq!(delivered, 1_000);
    let e = engine.borrow();
    assert_eq!(e.playback().plays(), 1, "exactly one playback per arm cycle");
    assert_eq!(e.state(), EngineState::Triggered);
}

#[test]
fn starting_late_inside_grace_fires() {
    let engine = shared_engine(EngineConfig::standard());
    arm(&engine, &yjhd());
    let trigger = engine.borrow().trigger_instant().unwrap();

    let mut source = ManualTickSource::new();
    let _token = drive(&engine, &mut source);
    source.run(trigger + Millis(4_999), FRAME, 10);

    assert_eq!(engine.borrow().playback().plays(), 1);
}

#[test]
fn starting_late_past_grace_never_fires() {
    let engine = shared_engine(EngineConfig::standard());
    arm(&engine, &yjhd());
    let trigger = engine.borrow().trigger_instant().unwrap();

    let mut source = ManualTickSource::new();
    let _token = drive(&engine, &mut source);
    source.run(trigger + Millis(5_001), FRAME, 600);

    let e = engine.borrow();
    assert_eq!(e.playback().plays(), 0);
    assert_eq!(e.status(), Status::MissedWindow);
    assert_eq!(e.display().last(), Some("00:00:00"));
}

#[test]
fn grace_window_is_configurable() {
    let config = EngineConfig {
        grace_window: Millis(20_000),
        ..EngineConfig::standard()
    };
    let engine = shared_engine(config);
    arm(&engine, &yjhd());
    let trigger = engine.borrow().trigger_instant().unwrap();

    let mut source = ManualTickSource::new();
    let _token = drive(&engine, &mut source);
    source.run(trigger + Millis(15_000), FRAME, 3);

    assert_eq!(engine.borrow().playback().plays(), 1);
}

#[test]
fn display_reads_eleven_seconds_at_the_trigger() {
    let engine = shared_engine(EngineConfig::standard());
    arm(&engine, &yjhd());

    let mut source = ManualTickSource::new();
    let _token = drive(&engine, &mut source);

    source.advance(T - Millis(11_016));
    assert_eq!(engine.borrow().playback().plays(), 0);
    assert_eq!(engine.borrow().display().last(), Some("00:00:11"));

    source.advance(T - Millis(11_000));
    assert_eq!(engine.borrow().playback().plays(), 1);

    source.advance(T - Millis(1));
    assert_eq!(engine.borrow().display().last(), Some("00:00:00"));
    source.advance(T);
    assert_eq!(engine.borrow().display().last(), Some("00:00:00"));
    assert_eq!(engine.borrow().playback().plays(), 1);
}

#[test]
fn cancel_stops_the_loop_and_rearm_fires_again() {
    let engine = shared_engine(EngineConfig::standard());
    arm(&engine, &yjhd());

    let mut source = ManualTickSource::new();
    let _token = drive(&engine, &mut source);
    source.run(T - Millis(11_100), FRAME, 20);
    assert_eq!(engine.borrow().playback().plays(), 1);

    engine.borrow_mut().cancel();
    assert!(!engine.borrow().is_triggered());
    assert_eq!(source.advance(T - Millis(10_000)), Some(LoopControl::Stop));
    assert!(!source.is_running(), "the loop ends on the first tick after cancel");
    assert_eq!(source.advance(T - Millis(9_000)), None);

    arm(&engine, &yjhd());
    engine.borrow_mut().target_from_now(T);
    let _token = drive(&engine, &mut source);
    // New target is T + 10 s; the 11 s lead puts the trigger at T - 1 s.
    source.run(T - Millis(1_100), FRAME, 20);
    assert_eq!(engine.borrow().playback().plays(), 2);
}

#[test]
fn cancelling_the_token_stops_without_touching_the_engine() {
    let engine = shared_engine(EngineConfig::standard());
    arm(&engine, &yjhd());

    let mut source = ManualTickSource::new();
    let token = drive(&engine, &mut source);
    source.advance(T - Millis(60_000));
    token.cancel();
    source.run(T - Millis(11_000), FRAME, 100);

    let e = engine.borrow();
    assert_eq!(e.playback().plays(), 0);
    assert_eq!(e.display().shown.len(), 1);
    assert_eq!(e.state(), EngineState::Armed);
}

#[test]
fn registry_clip_with_numeric_lead_time() {
    let load = ClipRegistry::from_json(
        r#"[{ "name": "Thirty", "duration": 40, "lead_time": 30, "path": "./clips/30.mp4" }]"#,
    )
    .unwrap();
    let clip = load.registry.first().unwrap().clone();

    let engine = shared_engine(EngineConfig::standard());
    arm(&engine, &clip);
    assert_eq!(engine.borrow().trigger_instant(), Some(T - Millis(30_000)));
}

#[test]
fn malformed_registry_lead_time_runs_without_firing() {
    let load = ClipRegistry::from_json(
        r#"[{ "name": "Broken", "duration": 5, "lead_time": "abc", "path": "./b.mp4" }]"#,
    )
    .unwrap();
    let clip = load.registry.first().unwrap().clone();

    let engine = shared_engine(EngineConfig::standard());
    arm(&engine, &clip);
    let mut source = ManualTickSource::new();
    let _token = drive(&engine, &mut source);

    let delivered = source.run(T - Millis(20_000), Millis(100), 400);
    assert_eq!(delivered, 400, "the loop keeps running");
    assert_eq!(engine.borrow().playback().plays(), 0);
}

#[test]
fn dev_commands_drive_the_trigger() {
    let calendar = ChronoCalendar::new(chrono::Utc);
    let now = T - Millis(3_600_000);
    assert_eq!(calendar.next_new_year(now), T);

    let engine = shared_engine(EngineConfig::standard());
    arm(&engine, &yjhd());

    {
        let mut e = engine.borrow_mut();
        e.apply(DevCommand::parse("target 23:30").unwrap(), now, &calendar)
            .unwrap();
        assert_eq!(e.effective_target(), T - Millis(1_800_000));

        e.apply(DevCommand::parse("offset 60").unwrap(), now, &calendar)
            .unwrap();
        assert_eq!(e.effective_target(), T - Millis(1_740_000));

        e.apply(DevCommand::parse("now").unwrap(), now, &calendar)
            .unwrap();
        assert_eq!(e.effective_target(), now + Millis(10_000));
    }

    let mut source = ManualTickSource::new();
    let _token = drive(&engine, &mut source);
    // An 11 s lead before a 10 s target puts the trigger 1 s in the past,
    // still inside the grace window.
    source.run(now, FRAME, 120);
    assert_eq!(engine.borrow().playback().plays(), 1);

    engine
        .borrow_mut()
        .apply(DevCommand::Play, now, &calendar)
        .unwrap();
    assert_eq!(engine.borrow().playback().plays(), 2, "manual retry");

    engine
        .borrow_mut()
        .apply(DevCommand::Cancel, now, &calendar)
        .unwrap();
    assert!(
        engine
            .borrow_mut()
            .apply(DevCommand::Play, now, &calendar)
            .is_err(),
        "nothing armed after cancel"
    );
}
