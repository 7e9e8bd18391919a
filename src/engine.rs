//! The engine instance: mount, per-frame update, teardown.
//!
//! An [`Engine`] owns everything one animation needs: the random field, the
//! particle buffer, the morph scheduler and the draw surface. The host
//! forwards three kinds of calls:
//!
//! - [`Engine::frame`] on every display refresh, with a monotonic timestamp.
//! - [`Engine::pointer_moved`] and [`Engine::resize`] from window events.
//!   These only record samples; particles are written in `frame` alone.
//! - [`Engine::teardown`] when the view goes away.
//!
//! # Example
//!
//! ```ignore
//! use morph_particles::{Engine, EngineConfig};
//!
//! let mut engine = Engine::mount(surface, EngineConfig::default(), (1280, 720), || {
//!     println!("intro done");
//! })?;
//!
//! // On every redraw:
//! engine.frame(start.elapsed());
//!
//! // On unmount:
//! engine.teardown();
//! ```

use crate::buffer::ParticleBuffer;
use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::input::{Input, Viewport};
use crate::morph::{MorphScheduler, Stage};
use crate::pointer::PointerField;
use crate::random::RandomField;
use crate::surface::Surface;
use crate::time::FrameThrottle;
use glam::Vec2;
use std::time::Duration;
use tracing::{info, trace};

/// What a call to [`Engine::frame`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Arrived before the frame interval elapsed; nothing was written.
    Skipped,
    /// Particles were updated and presented.
    Rendered,
    /// The engine was torn down.
    Stopped,
}

/// State released on teardown.
#[derive(Debug)]
struct Mounted {
    field: RandomField,
    buffer: ParticleBuffer,
    morph: MorphScheduler,
}

/// One running particle animation bound to a draw surface.
pub struct Engine<S: Surface> {
    config: EngineConfig,
    surface: Option<S>,
    mounted: Option<Mounted>,
    input: Input,
    pointer: PointerField,
    throttle: FrameThrottle,
}

impl<S: Surface> Engine<S> {
    /// Validate `config`, build the initial formation and request the first frame.
    ///
    /// `size` is the viewport in pixels; its width picks the particle count
    /// unless the config fixes one. `on_complete` runs once, when the
    /// primary formation finishes.
    pub fn mount(
        surface: S,
        config: EngineConfig,
        size: (u32, u32),
        on_complete: impl FnOnce() + 'static,
    ) -> Result<Self, ConfigError> {
        Self::mount_scaled(surface, config, size, 1.0, on_complete)
    }

    /// Like [`Engine::mount`], for a viewport of `size` physical pixels on a
    /// display with `scale_factor` physical pixels per logical pixel.
    ///
    /// The particle count is picked from the logical width. The surface and
    /// pointer input see physical pixels.
    pub fn mount_scaled(
        mut surface: S,
        config: EngineConfig,
        size: (u32, u32),
        scale_factor: f64,
        on_complete: impl FnOnce() + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let (width, height) = size;
        let scale = if scale_factor.is_finite() && scale_factor > 0.0 { scale_factor } else { 1.0 };
        let logical_width = (f64::from(width) / scale).round() as u32;
        let count = config.particle_count_for(logical_width);
        let seed = config.seed.unwrap_or_else(rand::random);
        let field = RandomField::with_seed(count, seed);
        let buffer = ParticleBuffer::new(count, &field);
        let mut morph = MorphScheduler::new(&config, seed.rotate_left(17) ^ 0x9e37_79b9_7f4a_7c15);
        morph.on_complete(on_complete);

        let mut input = Input::new();
        input.set_viewport(width, height);
        surface.resize(width, height);
        surface.request_frame();

        info!(count, seed, width, height, scale, label = %config.label, "engine mounted");

        Ok(Self {
            pointer: PointerField::new(config.pointer.clone()),
            throttle: FrameThrottle::new(config.frame.target_fps, config.frame.max_step()),
            config,
            surface: Some(surface),
            mounted: Some(Mounted { field, buffer, morph }),
            input,
        })
    }

    /// Run one frame at time `now`.
    ///
    /// Calls that arrive sooner than the target interval are skipped. After
    /// teardown every call returns [`FrameOutcome::Stopped`] without touching
    /// anything.
    pub fn frame(&mut self, now: Duration) -> FrameOutcome {
        let (Some(mounted), Some(surface)) = (self.mounted.as_mut(), self.surface.as_mut()) else {
            return FrameOutcome::Stopped;
        };

        let Some(step) = self.throttle.tick(now) else {
            trace!(?now, "frame skipped");
            surface.request_frame();
            return FrameOutcome::Skipped;
        };

        let Mounted { field, buffer, morph } = mounted;
        morph.advance(step, buffer, field);

        let pointer = self.input.viewport().and(self.input.pointer().get());
        self.pointer.apply(buffer, pointer, morph.is_text_formed());
        buffer.mark_dirty();

        surface.present(buffer);
        buffer.clear_dirty();
        surface.request_frame();
        FrameOutcome::Rendered
    }

    /// Record a cursor position in physical pixels.
    ///
    /// Ignored while the viewport is unavailable or after teardown.
    pub fn pointer_moved(&mut self, position: Vec2) {
        if self.mounted.is_some() {
            self.input.cursor_moved(position);
        }
    }

    /// Record a new viewport size in physical pixels.
    ///
    /// A zero-sized viewport disables pointer input until the next resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(surface) = self.surface.as_mut() {
            self.input.set_viewport(width, height);
            surface.resize(width, height);
        }
    }

    /// Stop the animation and release every resource. Idempotent.
    ///
    /// Pending stage changes are cancelled, the completion callback is
    /// dropped if it has not fired, and the surface is released.
    pub fn teardown(&mut self) {
        let Some(mut mounted) = self.mounted.take() else {
            return;
        };
        mounted.morph.teardown();
        drop(mounted);

        if let Some(mut surface) = self.surface.take() {
            surface.release();
        }
        info!(frames = self.throttle.frames(), skipped = self.throttle.skipped(), "engine torn down");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current viewport, if it has a non-zero area.
    pub fn viewport(&self) -> Option<Viewport> {
        self.input.viewport()
    }

    /// The particle buffer, `None` after teardown.
    pub fn buffer(&self) -> Option<&ParticleBuffer> {
        self.mounted.as_ref().map(|m| &m.buffer)
    }

    /// Current positions, `None` after teardown.
    pub fn positions(&self) -> Option<&[f32]> {
        self.buffer().map(ParticleBuffer::positions)
    }

    /// The morph scheduler, `None` after teardown.
    pub fn morph(&self) -> Option<&MorphScheduler> {
        self.mounted.as_ref().map(|m| &m.morph)
    }

    /// Current morph stage. [`Stage::Stopped`] after teardown.
    pub fn stage(&self) -> Stage {
        self.morph().map_or(Stage::Stopped, MorphScheduler::stage)
    }

    /// The draw surface, `None` after teardown.
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.throttle.frames()
    }
}

impl<S: Surface> Drop for Engine<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Shape;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Counting {
        presented: Rc<Cell<usize>>,
        released: Rc<Cell<usize>>,
        resized: Rc<Cell<Option<(u32, u32)>>>,
    }

    impl Surface for Counting {
        fn present(&mut self, buffer: &ParticleBuffer) {
            assert!(buffer.is_dirty());
            self.presented.set(self.presented.get() + 1);
        }

        fn request_frame(&mut self) {}

        fn resize(&mut self, width: u32, height: u32) {
            self.resized.set(Some((width, height)));
        }

        fn release(&mut self) {
            self.released.set(self.released.get() + 1);
        }
    }

    fn config() -> EngineConfig {
        EngineConfig {
            particle_count: Some(200),
            seed: Some(9),
            cycle: vec![Shape::Torus, Shape::Sphere],
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_mount_uses_viewport_width() {
        let narrow = EngineConfig {
            narrow_count: 120,
            wide_count: 240,
            seed: Some(1),
            ..EngineConfig::default()
        };
        let engine = Engine::mount(Counting::default(), narrow.clone(), (500, 800), || {}).unwrap();
        assert_eq!(engine.buffer().unwrap().count(), 120);
        let engine = Engine::mount(Counting::default(), narrow, (1400, 800), || {}).unwrap();
        assert_eq!(engine.buffer().unwrap().count(), 240);
    }

    #[test]
    fn test_mount_scaled_counts_logical_width() {
        let config = EngineConfig {
            narrow_count: 120,
            wide_count: 240,
            seed: Some(1),
            ..EngineConfig::default()
        };
        // 1400 physical pixels at 2x is 700 logical, below the narrow cutoff.
        let surface = Counting::default();
        let resized = Rc::clone(&surface.resized);
        let engine = Engine::mount_scaled(surface, config.clone(), (1400, 800), 2.0, || {}).unwrap();
        assert_eq!(engine.buffer().unwrap().count(), 120);
        assert_eq!(resized.get(), Some((1400, 800)));
        assert_eq!(engine.viewport(), Viewport::new(1400, 800));

        let engine = Engine::mount_scaled(Counting::default(), config, (1400, 800), 0.0, || {}).unwrap();
        assert_eq!(engine.buffer().unwrap().count(), 240);
    }

    #[test]
    fn test_mount_rejects_invalid_config() {
        let bad = EngineConfig {
            cycle: Vec::new(),
            ..config()
        };
        assert!(Engine::mount(Counting::default(), bad, (800, 600), || {}).is_err());
    }

    #[test]
    fn test_skips_early_frames() {
        let surface = Counting::default();
        let presented = Rc::clone(&surface.presented);
        let mut engine = Engine::mount(surface, config(), (800, 600), || {}).unwrap();

        assert_eq!(engine.frame(Duration::ZERO), FrameOutcome::Rendered);
        assert_eq!(engine.frame(Duration::from_millis(4)), FrameOutcome::Skipped);
        assert_eq!(engine.frame(Duration::from_millis(17)), FrameOutcome::Rendered);
        assert_eq!(presented.get(), 2);
    }

    #[test]
    fn test_teardown_releases_once() {
        let surface = Counting::default();
        let released = Rc::clone(&surface.released);
        let mut engine = Engine::mount(surface, config(), (800, 600), || {}).unwrap();
        engine.teardown();
        engine.teardown();
        drop(engine);
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn test_pointer_ignored_without_viewport() {
        let mut engine = Engine::mount(Counting::default(), config(), (0, 0), || {}).unwrap();
        engine.pointer_moved(Vec2::new(10.0, 10.0));
        assert!(engine.viewport().is_none());
        assert_eq!(engine.frame(Duration::ZERO), FrameOutcome::Rendered);
        assert!(engine.buffer().unwrap().is_finite());
    }
}
