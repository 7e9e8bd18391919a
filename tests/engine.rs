//! Integration tests for the engine lifecycle.
//!
//! These drive [`Engine::frame`] with a synthetic clock and a recording
//! surface, so no window or GPU is needed.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use morph_particles::{
    CycleStep, Engine, EngineConfig, FrameOutcome, MorphTimings, ParticleBuffer, Shape, Stage,
    StageTiming, Surface, Vec2,
};

// ============================================================================
// Recording surface
// ============================================================================

#[derive(Default)]
struct Log {
    presented: Cell<usize>,
    requested: Cell<usize>,
    released: Cell<usize>,
    last: RefCell<Vec<f32>>,
}

struct Recording(Rc<Log>);

impl Surface for Recording {
    fn present(&mut self, buffer: &ParticleBuffer) {
        self.0.presented.set(self.0.presented.get() + 1);
        *self.0.last.borrow_mut() = buffer.positions().to_vec();
    }

    fn request_frame(&mut self) {
        self.0.requested.set(self.0.requested.get() + 1);
    }

    fn release(&mut self) {
        self.0.released.set(self.0.released.get() + 1);
    }
}

const FRAME: Duration = Duration::from_micros(16_700);

fn config() -> EngineConfig {
    EngineConfig {
        particle_count: Some(500),
        seed: Some(2024),
        cycle: vec![Shape::Torus, Shape::Sphere, Shape::Smiley],
        ..EngineConfig::default()
    }
}

fn mount(config: EngineConfig) -> (Engine<Recording>, Rc<Log>) {
    let log = Rc::new(Log::default());
    let engine = Engine::mount(Recording(Rc::clone(&log)), config, (1280, 720), || {})
        .expect("valid config");
    (engine, log)
}

/// Run `frames` frames starting at `*now`, advancing the clock by one frame each.
fn run(engine: &mut Engine<Recording>, now: &mut Duration, frames: usize) {
    for _ in 0..frames {
        engine.frame(*now);
        *now += FRAME;
    }
}

fn max_gap(engine: &Engine<Recording>) -> f32 {
    let buffer = engine.buffer().expect("mounted");
    buffer
        .points()
        .iter()
        .zip(buffer.original_points())
        .map(|(p, o)| p.distance(*o))
        .fold(0.0, f32::max)
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_mount_requests_first_frame() {
    let (engine, log) = mount(config());
    assert_eq!(log.requested.get(), 1);
    assert_eq!(log.presented.get(), 0);
    assert_eq!(engine.stage(), Stage::Init);
    assert_eq!(engine.positions().map(<[f32]>::len), Some(1500));
}

#[test]
fn test_every_frame_requests_the_next() {
    let (mut engine, log) = mount(config());
    let mut now = Duration::ZERO;
    run(&mut engine, &mut now, 30);
    assert_eq!(log.presented.get(), 30);
    assert_eq!(log.requested.get(), 31);
}

#[test]
fn test_hold_converges_to_baseline() {
    let config = EngineConfig {
        timings: MorphTimings {
            hold_primary: 60.0,
            ..MorphTimings::default()
        },
        ..config()
    };
    let (mut engine, _log) = mount(config);
    let mut now = Duration::ZERO;

    // Initial delay plus primary formation.
    while engine.stage() != Stage::HoldPrimary {
        run(&mut engine, &mut now, 1);
        assert!(now < Duration::from_secs(5), "never reached hold");
    }
    run(&mut engine, &mut now, 500);

    assert_eq!(engine.stage(), Stage::HoldPrimary);
    let gap = max_gap(&engine);
    assert!(gap < 1.0, "max distance to baseline {gap}");
}

#[test]
fn test_teardown_stops_all_writes() {
    let (mut engine, log) = mount(config());
    let mut now = Duration::ZERO;
    run(&mut engine, &mut now, 120);

    engine.teardown();
    engine.teardown();
    let presented = log.presented.get();
    let requested = log.requested.get();
    let last = log.last.borrow().clone();

    run(&mut engine, &mut now, 600);
    engine.pointer_moved(Vec2::new(640.0, 360.0));
    engine.resize(100, 100);

    assert_eq!(engine.frame(now), FrameOutcome::Stopped);
    assert_eq!(log.presented.get(), presented);
    assert_eq!(log.requested.get(), requested);
    assert_eq!(*log.last.borrow(), last);
    assert_eq!(log.released.get(), 1);
    assert!(engine.positions().is_none());
    assert_eq!(engine.stage(), Stage::Stopped);
}

#[test]
fn test_teardown_before_intro_skips_completion() {
    let log = Rc::new(Log::default());
    let fired = Rc::new(Cell::new(false));
    let flag = Rc::clone(&fired);
    let mut engine = Engine::mount(Recording(Rc::clone(&log)), config(), (1280, 720), move || {
        flag.set(true)
    })
    .expect("valid config");

    let mut now = Duration::ZERO;
    run(&mut engine, &mut now, 30);
    engine.teardown();
    run(&mut engine, &mut now, 600);
    assert!(!fired.get());
}

#[test]
fn test_completion_fires_exactly_once() {
    let log = Rc::new(Log::default());
    let fired = Rc::new(Cell::new(0));
    let counter = Rc::clone(&fired);
    let mut engine = Engine::mount(Recording(log), config(), (1280, 720), move || {
        counter.set(counter.get() + 1)
    })
    .expect("valid config");

    let mut now = Duration::ZERO;
    // 40 seconds covers the intro and several cycle rotations.
    run(&mut engine, &mut now, 2400);
    assert_eq!(fired.get(), 1);
}

// ============================================================================
// Cycle
// ============================================================================

#[test]
fn test_cycle_advances_one_step_and_wraps() {
    let quick = StageTiming::new(0.2, Default::default(), 0.1);
    let config = EngineConfig {
        timings: MorphTimings {
            initial_delay: 0.1,
            form_primary: quick,
            hold_primary: 0.1,
            burst: quick,
            form_secondary: quick,
            hold_secondary: 0.1,
            dissolve: quick,
            form_cycle: quick,
            hold_cycle: 0.1,
        },
        ..config()
    };
    let cycle = config.cycle.clone();
    let (mut engine, _log) = mount(config);

    let mut now = Duration::ZERO;
    let mut formed = Vec::new();
    let mut last = engine.stage();
    for _ in 0..900 {
        run(&mut engine, &mut now, 1);
        let stage = engine.stage();
        if stage != last && stage == Stage::Cycle(CycleStep::Form) {
            let morph = engine.morph().expect("mounted");
            formed.push((morph.cycle_index(), morph.shape().cloned()));
        }
        last = stage;
    }

    assert!(formed.len() > cycle.len(), "only {} cycle formations", formed.len());
    for (n, (index, shape)) in formed.iter().enumerate() {
        assert_eq!(*index, n + 1, "cycle index must advance by one");
        assert_eq!(shape.as_ref(), Some(&cycle[(n + 1) % cycle.len()]));
    }
}

// ============================================================================
// Pointer
// ============================================================================

#[test]
fn test_pointer_pushes_particles() {
    let (mut still, _) = mount(config());
    let (mut moved, _) = mount(config());
    moved.pointer_moved(Vec2::new(640.0, 360.0));

    let mut now = Duration::ZERO;
    let mut other = Duration::ZERO;
    run(&mut still, &mut now, 10);
    run(&mut moved, &mut other, 10);

    assert_ne!(still.positions(), moved.positions());
    assert!(moved.buffer().expect("mounted").is_finite());
}

#[test]
fn test_zero_viewport_ignores_pointer() {
    let (mut still, _) = mount(config());
    let (mut moved, _) = mount(config());
    moved.resize(0, 0);
    moved.pointer_moved(Vec2::new(640.0, 360.0));

    let mut now = Duration::ZERO;
    let mut other = Duration::ZERO;
    run(&mut still, &mut now, 10);
    run(&mut moved, &mut other, 10);

    assert_eq!(still.positions(), moved.positions());
}
