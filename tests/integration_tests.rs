//! Integration tests for plotter-motion.
//!
//! These tests verify the complete workflow from TOML parsing through
//! planning, queueing, and tick-by-tick execution against the simulated
//! hardware backend.

use plotter_motion::config::{parse_config, MachineConstraints};
use plotter_motion::hal::sim::{SimBackend, SimPen, SimTimer};
use plotter_motion::motion::{SegmentConsumer, SegmentQueue, Tick};
use plotter_motion::storage::{
    CalibrationRecord, CalibrationSource, CalibrationStore, MemoryStorage, RECORD_LEN,
};
use plotter_motion::{
    ArcDirection, Error, Fault, Millimeters, PenState, Planner, StepEngine, Steps, StepsPerSec,
    TickScheduler,
};

// =============================================================================
// Test configuration data
// =============================================================================

const MACHINE_CONFIG: &str = r#"
[drive]
steps_per_turn = 400
microsteps = 16
min_feed_rate = 1
max_feed_rate = 10000

[timer]
clock_hz = 16000000
max_reload = 65535

[pen]
up_angle = 80
down_angle = 10
settle_ms = 250

[spools]
default_diameter_mm = 25.0

[planner]
max_chord_mm = 2.0
"#;

const HOMING_CONFIG: &str = r#"
[homing]
limit_switches = true
seek_feed_rate = 400
seek_travel_mm = 100.0
"#;

const AXES: usize = plotter_motion::NUM_AXES;
const DEPTH: usize = plotter_motion::MAX_SEGMENTS;

fn constraints_from(toml: &str) -> MachineConstraints<AXES> {
    let config = parse_config(toml).expect("config should parse");
    MachineConstraints::from_config(&config, [Millimeters(25.0), Millimeters(25.0)])
}

fn engine_from(toml: &str) -> StepEngine<AXES> {
    let config = parse_config(toml).expect("config should parse");
    StepEngine::new(
        TickScheduler::new(config.timer.clock_hz, config.timer.max_reload),
        config.homing.limit_switches,
    )
}

fn rig() -> (SimBackend<AXES>, SimPen, SimTimer) {
    (SimBackend::new(), SimPen::new(), SimTimer::new())
}

/// Drive the engine until it reports idle, with a runaway guard.
fn run_until_idle<const D: usize>(
    engine: &mut StepEngine<AXES>,
    consumer: &mut SegmentConsumer<'_, AXES, D>,
    backend: &mut SimBackend<AXES>,
    pen: &mut SimPen,
    timer: &mut SimTimer,
) -> u32 {
    let mut ticks = 0;
    loop {
        match engine.tick(consumer, backend, pen, timer) {
            Tick::Idle => return ticks,
            Tick::Halted => return ticks,
            _ => ticks += 1,
        }
        assert!(ticks < 1_000_000, "engine failed to go idle");
    }
}

// =============================================================================
// Configuration workflow
// =============================================================================

#[test]
fn config_to_constraints_workflow() {
    // Step 1: parse the machine description
    let config = parse_config(MACHINE_CONFIG).expect("config should parse");

    // Step 2: derive constraints from config plus calibrated spools
    let constraints =
        MachineConstraints::<AXES>::from_config(&config, [Millimeters(25.0), Millimeters(25.0)]);

    // 400 * 16 steps over a pi * 25 mm circumference
    assert!((constraints.steps_per_mm[0] - 81.487).abs() < 0.01);
    assert_eq!(constraints.max_feed_rate, StepsPerSec(10_000));
    assert_eq!(constraints.pen_settle_ticks, 250);

    // Step 3: the scheduler derived from the timer section produces the
    // documented reload for a nominal feed
    let scheduler = TickScheduler::new(config.timer.clock_hz, config.timer.max_reload);
    let reload = scheduler.reload_for(StepsPerSec(1_000));
    assert_eq!(reload.value, 16_000);
    assert!(!reload.clamped);
}

// =============================================================================
// Calibration boot workflow
// =============================================================================

#[test]
fn calibration_cold_boot_yields_defaults() {
    // A never-written medium reads version 0: defaults apply, no failure.
    let mut store = CalibrationStore::new(
        MemoryStorage::<RECORD_LEN>::new(),
        CalibrationRecord::defaults(25.0),
    );

    let (record, source) = store.load().expect("load should not fail");
    assert_eq!(source, CalibrationSource::Defaults);
    assert!((record.spool_diameter[0].0 - 25.0).abs() < 1e-6);
    assert!((record.spool_diameter[1].0 - 25.0).abs() < 1e-6);
}

#[test]
fn calibration_survives_power_cycle() {
    let mut medium = MemoryStorage::<RECORD_LEN>::new();

    {
        let mut store =
            CalibrationStore::new(medium.clone(), CalibrationRecord::defaults(25.0));
        store
            .save(&CalibrationRecord {
                uuid: 0xC0FF_EE00,
                spool_diameter: [Millimeters(27.0), Millimeters(26.5)],
            })
            .unwrap();
        medium = store.storage_mut().clone();
    }

    // "Power cycle": a fresh store over the same medium.
    let mut store = CalibrationStore::new(medium, CalibrationRecord::defaults(25.0));
    let (record, source) = store.load().unwrap();
    assert_eq!(source, CalibrationSource::Stored);
    assert_eq!(record.uuid, 0xC0FF_EE00);
    assert!((record.spool_diameter[0].0 - 27.0).abs() < 1e-6);
}

// =============================================================================
// Line execution end to end
// =============================================================================

#[test]
fn line_moves_reach_the_commanded_position() {
    let mut queue: SegmentQueue<AXES, DEPTH> = SegmentQueue::new();
    let (producer, mut consumer) = queue.split();
    let mut planner = Planner::new(producer, constraints_from(MACHINE_CONFIG));
    let mut engine = engine_from(MACHINE_CONFIG);
    let (mut backend, mut pen, mut timer) = rig();

    planner
        .move_line(
            [Millimeters(10.0), Millimeters(-4.0), Millimeters(0.0)],
            StepsPerSec(800),
        )
        .unwrap();
    planner
        .move_line(
            [Millimeters(3.0), Millimeters(2.0), Millimeters(0.0)],
            StepsPerSec(800),
        )
        .unwrap();

    run_until_idle(&mut engine, &mut consumer, &mut backend, &mut pen, &mut timer);

    // The engine's absolute position agrees with the planner's mirror, and
    // the simulated pins saw exactly those pulses.
    assert_eq!(engine.position(), planner.position());
    let expected = planner.position();
    assert_eq!(backend.position[0], expected[0].value());
    assert_eq!(backend.position[1], expected[1].value());
    assert_eq!(backend.position[2], 0);
}

#[test]
fn stepping_tick_count_equals_dominant_delta() {
    let mut queue: SegmentQueue<AXES, DEPTH> = SegmentQueue::new();
    let (producer, mut consumer) = queue.split();
    let mut planner = Planner::new(producer, constraints_from(MACHINE_CONFIG));
    let mut engine = engine_from(MACHINE_CONFIG);
    let (mut backend, mut pen, mut timer) = rig();

    planner
        .move_line(
            [Millimeters(5.0), Millimeters(1.0), Millimeters(0.0)],
            StepsPerSec(800),
        )
        .unwrap();
    let dominant = planner.position()[0].value() as u32;

    let mut stepping_ticks = 0;
    loop {
        match engine.tick(&mut consumer, &mut backend, &mut pen, &mut timer) {
            Tick::Stepped { .. } => stepping_ticks += 1,
            Tick::Idle => break,
            _ => {}
        }
    }

    assert_eq!(stepping_ticks, dominant);
}

// =============================================================================
// Arc execution end to end
// =============================================================================

#[test]
fn arc_lands_exactly_on_endpoint() {
    let mut queue: SegmentQueue<AXES, DEPTH> = SegmentQueue::new();
    let (producer, mut consumer) = queue.split();
    let mut planner = Planner::new(producer, constraints_from(MACHINE_CONFIG));
    let mut engine = engine_from(MACHINE_CONFIG);
    let (mut backend, mut pen, mut timer) = rig();

    // Move onto the circle, then sweep a quarter turn.
    planner
        .move_line(
            [Millimeters(20.0), Millimeters(0.0), Millimeters(0.0)],
            StepsPerSec(800),
        )
        .unwrap();
    run_until_idle(&mut engine, &mut consumer, &mut backend, &mut pen, &mut timer);

    let queued = planner
        .move_arc(
            [Millimeters(0.0), Millimeters(0.0)],
            [Millimeters(0.0), Millimeters(20.0)],
            ArcDirection::CounterClockwise,
            StepsPerSec(800),
        )
        .unwrap();
    assert!(queued >= 15, "quarter arc of r=20 should need many 2mm chords");

    run_until_idle(&mut engine, &mut consumer, &mut backend, &mut pen, &mut timer);

    let expected_x = planner.constraints().mm_to_steps(0, Millimeters(0.0));
    let expected_y = planner.constraints().mm_to_steps(1, Millimeters(20.0));
    assert_eq!(engine.position()[0], expected_x);
    assert_eq!(engine.position()[1], expected_y);
    assert_eq!(engine.position(), planner.position());
}

#[test]
fn degenerate_arc_is_reported_and_harmless() {
    let mut queue: SegmentQueue<AXES, DEPTH> = SegmentQueue::new();
    let (producer, consumer) = queue.split();
    let mut planner = Planner::new(producer, constraints_from(MACHINE_CONFIG));

    let result = planner.move_arc(
        [Millimeters(0.0), Millimeters(0.0)],
        [Millimeters(0.0), Millimeters(0.0)],
        ArcDirection::CounterClockwise,
        StepsPerSec(800),
    );

    assert!(matches!(
        result,
        Err(Error::Motion(plotter_motion::error::MotionError::DegenerateArc))
    ));
    assert!(consumer.is_empty());
    assert_eq!(planner.stats().degenerate_arcs, 1);
}

// =============================================================================
// Backpressure and occupancy
// =============================================================================

#[test]
fn backpressure_then_retry_succeeds() {
    let mut queue: SegmentQueue<AXES, 4> = SegmentQueue::new();
    let (producer, mut consumer) = queue.split();
    let mut planner = Planner::new(producer, constraints_from(MACHINE_CONFIG));
    let mut engine = engine_from(MACHINE_CONFIG);
    let (mut backend, mut pen, mut timer) = rig();

    // Fill the queue.
    let mut x = 0.0;
    while planner.ready() {
        x += 1.0;
        planner
            .move_line(
                [Millimeters(x), Millimeters(0.0), Millimeters(0.0)],
                StepsPerSec(800),
            )
            .unwrap();
    }

    // Producer must back off, state unchanged.
    let before = planner.position();
    let result = planner.move_line(
        [Millimeters(x + 1.0), Millimeters(0.0), Millimeters(0.0)],
        StepsPerSec(800),
    );
    assert!(result.is_err());
    assert_eq!(planner.position(), before);

    // The consumer frees a slot; the retry goes through verbatim.
    run_until_idle(&mut engine, &mut consumer, &mut backend, &mut pen, &mut timer);
    planner
        .move_line(
            [Millimeters(x + 1.0), Millimeters(0.0), Millimeters(0.0)],
            StepsPerSec(800),
        )
        .unwrap();
}

#[test]
fn occupancy_returns_to_prior_value_after_retire() {
    let mut queue: SegmentQueue<AXES, DEPTH> = SegmentQueue::new();
    let (producer, mut consumer) = queue.split();
    let mut planner = Planner::new(producer, constraints_from(MACHINE_CONFIG));
    let mut engine = engine_from(MACHINE_CONFIG);
    let (mut backend, mut pen, mut timer) = rig();

    let before = engine.status(consumer.len()).occupancy;
    planner
        .move_line(
            [Millimeters(1.0), Millimeters(0.0), Millimeters(0.0)],
            StepsPerSec(800),
        )
        .unwrap();
    assert_eq!(engine.status(consumer.len()).occupancy, before + 1);

    run_until_idle(&mut engine, &mut consumer, &mut backend, &mut pen, &mut timer);
    assert_eq!(engine.status(consumer.len()).occupancy, before);
}

// =============================================================================
// Pen workflow
// =============================================================================

#[test]
fn pen_change_settles_before_motion_resumes() {
    let mut queue: SegmentQueue<AXES, DEPTH> = SegmentQueue::new();
    let (producer, mut consumer) = queue.split();
    let mut planner = Planner::new(producer, constraints_from(MACHINE_CONFIG));
    let mut engine = engine_from(MACHINE_CONFIG);
    let (mut backend, mut pen, mut timer) = rig();

    planner.set_pen(PenState::Down).unwrap();
    planner
        .move_line(
            [Millimeters(1.0), Millimeters(0.0), Millimeters(0.0)],
            StepsPerSec(800),
        )
        .unwrap();

    // Activation applies the angle; then 250 dwell ticks pass before the
    // first motion pulse.
    assert_eq!(
        engine.tick(&mut consumer, &mut backend, &mut pen, &mut timer),
        Tick::Activated
    );
    assert_eq!(pen.current_angle(), Some(10));

    let mut dwell_ticks = 0;
    loop {
        match engine.tick(&mut consumer, &mut backend, &mut pen, &mut timer) {
            Tick::Dwell { .. } => {
                dwell_ticks += 1;
                assert_eq!(backend.total_pulses(), 0);
            }
            Tick::Activated => break,
            other => panic!("unexpected tick during settle: {:?}", other),
        }
    }
    assert_eq!(dwell_ticks, 250);

    run_until_idle(&mut engine, &mut consumer, &mut backend, &mut pen, &mut timer);
    assert!(backend.total_pulses() > 0);
}

// =============================================================================
// Homing workflow
// =============================================================================

#[test]
fn homing_seek_stops_on_limit_trip() {
    let mut queue: SegmentQueue<AXES, DEPTH> = SegmentQueue::new();
    let (producer, mut consumer) = queue.split();
    let mut planner = Planner::new(producer, constraints_from(HOMING_CONFIG));
    let mut engine = engine_from(HOMING_CONFIG);
    let (mut backend, mut pen, mut timer) = rig();

    assert_eq!(planner.home_axes().unwrap(), 2);

    // Let the first axis seek for a while, then trip its switch.
    for _ in 0..50 {
        engine.tick(&mut consumer, &mut backend, &mut pen, &mut timer);
    }
    assert!(backend.position[0] < 0, "axis 0 should be seeking reverse");
    backend.limit[0] = true;

    assert_eq!(
        engine.tick(&mut consumer, &mut backend, &mut pen, &mut timer),
        Tick::Halted
    );
    assert_eq!(engine.fault(), Some(Fault::LimitTripped { axis: 0 }));
    assert!(!timer.running, "hard stop must stop the tick timer");

    // The layer above observes the trip, aborts the remaining seeks, and
    // re-zeros both sides of the core.
    engine.abort(&mut consumer, &mut backend, &mut timer);
    assert!(consumer.is_empty());
    engine.zero();
    planner.zero_position();

    assert_eq!(engine.position(), [Steps(0); AXES]);
    assert_eq!(engine.fault(), None);

    // Motion works again after homing.
    backend.limit[0] = false;
    planner
        .move_line(
            [Millimeters(1.0), Millimeters(1.0), Millimeters(0.0)],
            StepsPerSec(800),
        )
        .unwrap();
    run_until_idle(&mut engine, &mut consumer, &mut backend, &mut pen, &mut timer);
    assert_eq!(engine.position(), planner.position());
}

// =============================================================================
// Diagnostics reporting
// =============================================================================

#[test]
fn clamps_are_reported_not_fatal() {
    let mut queue: SegmentQueue<AXES, DEPTH> = SegmentQueue::new();
    let (producer, mut consumer) = queue.split();
    let mut planner = Planner::new(producer, constraints_from(MACHINE_CONFIG));
    let mut engine = engine_from(MACHINE_CONFIG);
    let (mut backend, mut pen, mut timer) = rig();

    // Feed far above the window: clamped at plan time.
    planner
        .move_line(
            [Millimeters(1.0), Millimeters(0.0), Millimeters(0.0)],
            StepsPerSec(1_000_000),
        )
        .unwrap();
    assert_eq!(planner.stats().feed_clamps, 1);

    // Feed so slow the reload overflows the counter: clamped at activation.
    planner
        .move_line(
            [Millimeters(2.0), Millimeters(0.0), Millimeters(0.0)],
            StepsPerSec(10),
        )
        .unwrap();

    run_until_idle(&mut engine, &mut consumer, &mut backend, &mut pen, &mut timer);
    assert_eq!(engine.stats().timer_clamps, 1);
    assert_eq!(timer.current_reload(), Some(65_535));

    // Both moves completed despite the clamps.
    assert_eq!(engine.position(), planner.position());
}
