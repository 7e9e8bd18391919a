//! The morph sequence.
//!
//! ```text
//! Init ─delay─▶ FormPrimary(label) ─▶ HoldPrimary ─▶ Burst ─▶ FormSecondary(cycle[0])
//!                                                                   │
//!      ┌──────────────────────────── HoldSecondary ◀────────────────┘
//!      ▼
//!   Dissolve ─▶ Form(cycle[k]) ─▶ Hold ─▶ Dissolve ─▶ …
//! ```
//!
//! Every stage that moves particles computes its target buffer once, when
//! the stage begins, and owns it until the stage ends. Each frame the
//! positions move a fraction of the remaining distance toward the target:
//!
//! ```text
//! position += (target - position) * rate * ease(elapsed / duration)
//! ```
//!
//! Formation stages also replace the buffer's baseline with their target,
//! so the pointer field pulls particles back to the shape just formed.
//!
//! Stage changes are timers on a [`Timeline`]; [`MorphScheduler::teardown`]
//! cancels them all, after which the scheduler never touches a buffer again.

use crate::buffer::ParticleBuffer;
use crate::config::{secs, EngineConfig, MorphTimings, ScatterConfig, StageTiming};
use crate::random::RandomField;
use crate::shapes::Shape;
use crate::text::TextRasterizer;
use crate::timeline::Timeline;
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

/// Upper bound on stage changes handled in one frame.
///
/// Only reached when several consecutive stages have zero duration.
const MAX_STAGE_CHANGES_PER_FRAME: usize = 8;

/// Step inside the endless shape rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleStep {
    /// Scatter toward a random cloud.
    Dissolve,
    /// Form the next shape of the cycle.
    Form,
    /// Pause on the formed shape.
    Hold,
}

/// Stage of the morph sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Waiting for the initial delay.
    Init,
    FormPrimary,
    HoldPrimary,
    Burst,
    FormSecondary,
    HoldSecondary,
    Cycle(CycleStep),
    /// Torn down.
    Stopped,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Init => f.write_str("init"),
            Stage::FormPrimary => f.write_str("form-primary"),
            Stage::HoldPrimary => f.write_str("hold-primary"),
            Stage::Burst => f.write_str("burst"),
            Stage::FormSecondary => f.write_str("form-secondary"),
            Stage::HoldSecondary => f.write_str("hold-secondary"),
            Stage::Cycle(CycleStep::Dissolve) => f.write_str("cycle-dissolve"),
            Stage::Cycle(CycleStep::Form) => f.write_str("cycle-form"),
            Stage::Cycle(CycleStep::Hold) => f.write_str("cycle-hold"),
            Stage::Stopped => f.write_str("stopped"),
        }
    }
}

/// An active blend toward a target buffer.
struct Transition {
    target: Vec<f32>,
    timing: StageTiming,
    started: Duration,
}

impl Transition {
    /// Blend factor for the frame ending at `now`.
    fn factor(&self, now: Duration) -> f32 {
        let duration = self.timing.duration();
        let progress = if duration.is_zero() {
            1.0
        } else {
            (now.saturating_sub(self.started).as_secs_f32() / duration.as_secs_f32()).min(1.0)
        };
        self.timing.rate * self.timing.ease.apply(progress)
    }
}

type Completion = Box<dyn FnOnce()>;

/// Timed state machine sequencing the shape transitions.
pub struct MorphScheduler {
    label: String,
    cycle: Vec<Shape>,
    text_scale: f32,
    timings: MorphTimings,
    scatter: ScatterConfig,
    text: TextRasterizer,

    stage: Stage,
    shape: Option<Shape>,
    transition: Option<Transition>,
    cycle_index: usize,
    timeline: Timeline<Stage>,
    on_complete: Option<Completion>,
    rng: SmallRng,
}

impl MorphScheduler {
    /// Create a scheduler and arm the initial delay.
    ///
    /// `seed` drives the dissolve scatter; the shapes themselves come from
    /// the [`RandomField`] passed to [`advance`](Self::advance).
    pub fn new(config: &EngineConfig, seed: u64) -> Self {
        let mut timeline = Timeline::new();
        timeline.schedule(secs(config.timings.initial_delay), Stage::FormPrimary);

        Self {
            label: config.label.clone(),
            cycle: config.cycle.clone(),
            text_scale: config.text_scale,
            timings: config.timings.clone(),
            scatter: config.scatter.clone(),
            text: TextRasterizer::new(config.text.clone()),
            stage: Stage::Init,
            shape: None,
            transition: None,
            cycle_index: 0,
            timeline,
            on_complete: None,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Run `callback` once when the primary formation completes.
    pub fn on_complete(&mut self, callback: impl FnOnce() + 'static) {
        if self.stage != Stage::Stopped {
            self.on_complete = Some(Box::new(callback));
        }
    }

    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Shape currently formed or forming. `None` before the first formation.
    pub fn shape(&self) -> Option<&Shape> {
        self.shape.as_ref()
    }

    /// Number of cycle formations so far. Never decreases.
    #[inline]
    pub fn cycle_index(&self) -> usize {
        self.cycle_index
    }

    /// Position of the current shape in the cycle list.
    pub fn cycle_position(&self) -> usize {
        self.cycle_index % self.cycle.len().max(1)
    }

    /// Virtual time since the scheduler was created.
    pub fn elapsed(&self) -> Duration {
        self.timeline.now()
    }

    /// Whether pointer repulsion should be damped for legible text.
    pub fn is_text_formed(&self) -> bool {
        self.shape.as_ref().is_some_and(Shape::is_text)
    }

    /// Whether a blend toward a target is in progress.
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Whether any timer is still pending.
    pub fn has_pending_timers(&self) -> bool {
        self.timeline.pending() > 0
    }

    /// Advance the clock by `dt`, run due stage changes, then blend `buffer`
    /// toward the active target.
    ///
    /// Returns `true` when positions were written.
    pub fn advance(&mut self, dt: Duration, buffer: &mut ParticleBuffer, field: &RandomField) -> bool {
        if self.stage == Stage::Stopped {
            return false;
        }
        self.timeline.advance(dt);

        for _ in 0..MAX_STAGE_CHANGES_PER_FRAME {
            match self.timeline.pop_due() {
                Some(next) => self.enter(next, buffer, field),
                None => break,
            }
        }

        let Some(transition) = &self.transition else {
            return false;
        };
        let factor = transition.factor(self.timeline.now());
        if factor <= 0.0 {
            return false;
        }
        let target: &[Vec3] = bytemuck::cast_slice(&transition.target);
        for (p, t) in buffer.points_mut().iter_mut().zip(target) {
            *p += (*t - *p) * factor;
        }
        true
    }

    /// Cancel every pending stage change and drop the active target.
    ///
    /// Idempotent. A pending completion callback is dropped without running.
    pub fn teardown(&mut self) {
        self.timeline.cancel_all();
        self.transition = None;
        self.on_complete = None;
        if self.stage != Stage::Stopped {
            debug!(from = %self.stage, "morph stopped");
            self.stage = Stage::Stopped;
        }
    }

    fn enter(&mut self, stage: Stage, buffer: &mut ParticleBuffer, field: &RandomField) {
        debug!(from = %self.stage, to = %stage, "morph stage");
        self.stage = stage;
        self.transition = None;

        match stage {
            Stage::Init | Stage::Stopped => {}
            Stage::FormPrimary => {
                let shape = Shape::Text(self.label.clone());
                self.form(shape, self.timings.form_primary, buffer, field);
                self.schedule(self.timings.form_primary.seconds, Stage::HoldPrimary);
            }
            Stage::HoldPrimary => {
                if let Some(callback) = self.on_complete.take() {
                    info!(label = %self.label, "intro sequence complete");
                    callback();
                }
                self.schedule(self.timings.hold_primary, Stage::Burst);
            }
            Stage::Burst => {
                let target = burst_target(buffer, field, &self.scatter);
                self.begin(target, self.timings.burst);
                self.schedule(self.timings.burst.seconds, Stage::FormSecondary);
            }
            Stage::FormSecondary => {
                let shape = self.cycle_shape();
                self.form(shape, self.timings.form_secondary, buffer, field);
                self.schedule(self.timings.form_secondary.seconds, Stage::HoldSecondary);
            }
            Stage::HoldSecondary => {
                self.schedule(self.timings.hold_secondary, Stage::Cycle(CycleStep::Dissolve));
            }
            Stage::Cycle(CycleStep::Dissolve) => {
                let target = dissolve_target(buffer.count(), &self.scatter, &mut self.rng);
                self.begin(target, self.timings.dissolve);
                self.schedule(self.timings.dissolve.seconds, Stage::Cycle(CycleStep::Form));
            }
            Stage::Cycle(CycleStep::Form) => {
                self.cycle_index += 1;
                let shape = self.cycle_shape();
                self.form(shape, self.timings.form_cycle, buffer, field);
                self.schedule(self.timings.form_cycle.seconds, Stage::Cycle(CycleStep::Hold));
            }
            Stage::Cycle(CycleStep::Hold) => {
                self.schedule(self.timings.hold_cycle, Stage::Cycle(CycleStep::Dissolve));
            }
        }
    }

    /// Generate `shape`, make it the baseline and start blending toward it.
    fn form(&mut self, shape: Shape, timing: StageTiming, buffer: &mut ParticleBuffer, field: &RandomField) {
        let target = shape.generate_with(buffer.count(), field, &self.text, self.text_scale);
        debug!(shape = %shape, count = buffer.count(), cycle_index = self.cycle_index, "generated shape");
        buffer.rebaseline(&target);
        self.shape = Some(shape);
        self.begin(target, timing);
    }

    fn begin(&mut self, target: Vec<f32>, timing: StageTiming) {
        self.transition = Some(Transition {
            target,
            timing,
            started: self.timeline.now(),
        });
    }

    fn schedule(&mut self, seconds: f32, next: Stage) {
        self.timeline.schedule(secs(seconds), next);
    }

    fn cycle_shape(&self) -> Shape {
        self.cycle
            .get(self.cycle_position())
            .cloned()
            .unwrap_or(Shape::Sphere)
    }
}

impl fmt::Debug for MorphScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MorphScheduler")
            .field("stage", &self.stage)
            .field("shape", &self.shape)
            .field("cycle_index", &self.cycle_index)
            .field("elapsed", &self.timeline.now())
            .finish_non_exhaustive()
    }
}

/// Current positions pushed outward by field offsets.
///
/// The leading `burst_share` of particles move by `burst_strong`, the rest
/// by `burst_weak`.
pub fn burst_target(buffer: &ParticleBuffer, field: &RandomField, scatter: &ScatterConfig) -> Vec<f32> {
    let count = buffer.count();
    let strong = (count as f32 * scatter.burst_share) as usize;
    let extent = scatter.burst_extent;
    let mut target = buffer.positions().to_vec();

    for (i, p) in target.chunks_exact_mut(3).enumerate() {
        let factor = if i < strong { scatter.burst_strong } else { scatter.burst_weak };
        for (c, v) in p.iter_mut().enumerate() {
            *v += (field.sample(i, 10 + c) * extent - extent / 2.0) * factor;
        }
    }
    target
}

/// A fresh random cloud centered on the origin.
pub fn dissolve_target(count: usize, scatter: &ScatterConfig, rng: &mut impl Rng) -> Vec<f32> {
    let [ex, ey, ez] = scatter.dissolve_extent;
    let mut target = vec![0.0; count * 3];
    for p in target.chunks_exact_mut(3) {
        p[0] = (rng.gen::<f32>() - 0.5) * ex;
        p[1] = (rng.gen::<f32>() - 0.5) * ey;
        p[2] = (rng.gen::<f32>() - 0.5) * ez;
    }
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    const FRAME: Duration = Duration::from_millis(16);

    fn small_config() -> EngineConfig {
        EngineConfig {
            particle_count: Some(300),
            seed: Some(11),
            label: "HI".into(),
            cycle: vec![Shape::Sphere, Shape::Torus, Shape::Galaxy],
            ..EngineConfig::default()
        }
    }

    fn setup() -> (MorphScheduler, ParticleBuffer, RandomField) {
        let config = small_config();
        let field = RandomField::with_seed(300, 11);
        let buffer = ParticleBuffer::new(300, &field);
        (MorphScheduler::new(&config, 11), buffer, field)
    }

    fn run(
        scheduler: &mut MorphScheduler,
        buffer: &mut ParticleBuffer,
        field: &RandomField,
        total: Duration,
    ) {
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            scheduler.advance(FRAME, buffer, field);
            elapsed += FRAME;
        }
    }

    #[test]
    fn test_waits_for_initial_delay() {
        let (mut scheduler, mut buffer, field) = setup();
        let before = buffer.positions().to_vec();
        run(&mut scheduler, &mut buffer, &field, Duration::from_millis(900));
        assert_eq!(scheduler.stage(), Stage::Init);
        assert_eq!(buffer.positions(), &before[..]);
    }

    #[test]
    fn test_primary_formation_is_text() {
        let (mut scheduler, mut buffer, field) = setup();
        run(&mut scheduler, &mut buffer, &field, Duration::from_millis(1100));
        assert_eq!(scheduler.stage(), Stage::FormPrimary);
        assert!(scheduler.is_text_formed());
        assert!(scheduler.is_transitioning());
        // Baseline switched to the text target.
        assert!(buffer.original_positions().chunks_exact(3).all(|p| p[2] == 0.0));
    }

    #[test]
    fn test_sequence_order() {
        let (mut scheduler, mut buffer, field) = setup();
        let mut seen = vec![scheduler.stage()];
        for _ in 0..2000 {
            scheduler.advance(FRAME, &mut buffer, &field);
            let stage = scheduler.stage();
            // The label stays damped through the burst and no longer once a shape replaces it.
            let label_showing = matches!(stage, Stage::FormPrimary | Stage::HoldPrimary | Stage::Burst);
            assert_eq!(scheduler.is_text_formed(), label_showing, "at {stage}");
            if seen.last() != Some(&stage) {
                seen.push(stage);
            }
        }
        assert_eq!(
            &seen[..10],
            &[
                Stage::Init,
                Stage::FormPrimary,
                Stage::HoldPrimary,
                Stage::Burst,
                Stage::FormSecondary,
                Stage::HoldSecondary,
                Stage::Cycle(CycleStep::Dissolve),
                Stage::Cycle(CycleStep::Form),
                Stage::Cycle(CycleStep::Hold),
                Stage::Cycle(CycleStep::Dissolve),
            ]
        );
        assert!(buffer.is_finite());
    }

    #[test]
    fn test_text_in_cycle_is_damped() {
        let config = EngineConfig {
            cycle: vec![Shape::Text("DUY".into()), Shape::Sphere],
            ..small_config()
        };
        let field = RandomField::with_seed(300, 11);
        let mut buffer = ParticleBuffer::new(300, &field);
        let mut scheduler = MorphScheduler::new(&config, 11);

        let mut formed = Vec::new();
        let mut last = scheduler.stage();
        for _ in 0..(24_000 / 16) {
            scheduler.advance(FRAME, &mut buffer, &field);
            let stage = scheduler.stage();
            if stage != last && matches!(stage, Stage::FormSecondary | Stage::Cycle(CycleStep::Form)) {
                formed.push((scheduler.shape().cloned(), scheduler.is_text_formed()));
            }
            last = stage;
        }

        assert!(formed.len() >= 2);
        assert_eq!(formed[0], (Some(Shape::Text("DUY".into())), true));
        assert_eq!(formed[1], (Some(Shape::Sphere), false));
    }

    #[test]
    fn test_cycle_advances_and_wraps() {
        let (mut scheduler, mut buffer, field) = setup();
        let mut forms = Vec::new();
        let mut last = scheduler.stage();
        // Five full rotations at 10 s each, after the 11 s intro.
        for _ in 0..(62_000 / 16) {
            scheduler.advance(FRAME, &mut buffer, &field);
            let stage = scheduler.stage();
            if stage != last && stage == Stage::Cycle(CycleStep::Form) {
                forms.push((scheduler.cycle_index(), scheduler.shape().cloned()));
            }
            last = stage;
        }
        assert!(forms.len() >= 4);
        for (n, (index, shape)) in forms.iter().enumerate() {
            assert_eq!(*index, n + 1);
            let expected = [Shape::Sphere, Shape::Torus, Shape::Galaxy][(n + 1) % 3].clone();
            assert_eq!(shape.as_ref(), Some(&expected));
        }
    }

    #[test]
    fn test_completion_fires_once() {
        let (mut scheduler, mut buffer, field) = setup();
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        scheduler.on_complete(move || counter.set(counter.get() + 1));

        run(&mut scheduler, &mut buffer, &field, Duration::from_millis(2900));
        assert_eq!(fired.get(), 0);
        run(&mut scheduler, &mut buffer, &field, Duration::from_secs(30));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_teardown_before_completion() {
        let (mut scheduler, mut buffer, field) = setup();
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        scheduler.on_complete(move || flag.set(true));

        run(&mut scheduler, &mut buffer, &field, Duration::from_millis(1500));
        scheduler.teardown();
        scheduler.teardown();
        let frozen = buffer.positions().to_vec();

        run(&mut scheduler, &mut buffer, &field, Duration::from_secs(10));
        assert!(!fired.get());
        assert_eq!(scheduler.stage(), Stage::Stopped);
        assert!(!scheduler.has_pending_timers());
        assert_eq!(buffer.positions(), &frozen[..]);
    }

    #[test]
    fn test_formation_approaches_target() {
        let (mut scheduler, mut buffer, field) = setup();
        run(&mut scheduler, &mut buffer, &field, Duration::from_millis(2990));
        assert_eq!(scheduler.stage(), Stage::FormPrimary);
        let max_gap = buffer
            .points()
            .iter()
            .zip(buffer.original_points())
            .map(|(p, o)| p.distance(*o))
            .fold(0.0f32, f32::max);
        assert!(max_gap < 10.0, "gap {max_gap}");
    }

    #[test]
    fn test_burst_target_shares() {
        let field = RandomField::with_seed(100, 5);
        let buffer = ParticleBuffer::from_positions(vec![0.0; 300]);
        let scatter = ScatterConfig::default();
        let target = burst_target(&buffer, &field, &scatter);
        assert_eq!(target.len(), 300);
        // Strong particles reach up to 400 * 1.5, weak ones only 400 * 0.1.
        assert!(target[..210].iter().all(|v| v.abs() <= 600.0));
        assert!(target[210..].iter().all(|v| v.abs() <= 40.0));
    }

    #[test]
    fn test_dissolve_target_bounds() {
        let mut rng = SmallRng::seed_from_u64(1);
        let target = dissolve_target(500, &ScatterConfig::default(), &mut rng);
        for p in target.chunks_exact(3) {
            assert!(p[0].abs() <= 1500.0 && p[1].abs() <= 1500.0 && p[2].abs() <= 500.0);
        }
    }
}
