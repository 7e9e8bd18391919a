//! # morph-particles
//!
//! Procedural particle animation: tens of thousands of points form text
//! and named 3-D shapes, morph from one to the next on a timed sequence,
//! and scatter away from the pointer.
//!
//! ## Quick Start
//!
//! ```ignore
//! use morph_particles::prelude::*;
//!
//! let config = EngineConfig {
//!     label: "HELLO".into(),
//!     cycle: vec![Shape::Galaxy, Shape::Torus, Shape::DoubleHelix],
//!     ..EngineConfig::default()
//! };
//!
//! let mut engine = Engine::mount(surface, config, (1280, 720), || {
//!     println!("intro finished");
//! })?;
//!
//! // Once per display refresh:
//! engine.frame(start.elapsed());
//! ```
//!
//! ## Core Concepts
//!
//! ### Shapes
//!
//! A [`Shape`] turns a particle count and a [`RandomField`] into a flat
//! buffer of `3 * count` floats. Generators are pure: the same field gives
//! the same layout every time. Text shapes are rasterized by
//! [`TextRasterizer`].
//!
//! ### The morph sequence
//!
//! [`MorphScheduler`] forms the label, holds it, bursts outward, forms the
//! first cycle shape, then dissolves and re-forms through the cycle list
//! forever. Every stage change is a cancelable timer; teardown cancels them
//! all.
//!
//! ### Frames
//!
//! [`Engine::frame`] is the render loop body. It is throttled to the target
//! rate, advances the morph sequence, applies the [`PointerField`] and hands
//! the buffer to the [`Surface`].
//!
//! ### Surfaces
//!
//! The engine draws through the [`Surface`] trait. [`gpu::GpuSurface`]
//! renders into a winit window with wgpu; tests use a recording double.
//!
//! ## Logging
//!
//! Everything logs through `tracing`. The `morph-viewer` binary installs a
//! subscriber filtered by `RUST_LOG` (default `info`).

pub mod buffer;
pub mod config;
pub mod easing;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod input;
pub mod morph;
pub mod pointer;
pub mod random;
pub mod shapes;
pub mod surface;
pub mod text;
pub mod time;
pub mod timeline;
pub mod viewer;

pub use buffer::ParticleBuffer;
pub use config::{
    EngineConfig, FrameConfig, MorphTimings, PointerConfig, ScatterConfig, StageTiming, TextConfig,
    Truncation,
};
pub use easing::Ease;
pub use engine::{Engine, FrameOutcome};
pub use error::{ConfigError, GpuError, ViewerError};
pub use glam::{Vec2, Vec3};
pub use input::{Input, Viewport};
pub use morph::{CycleStep, MorphScheduler, Stage};
pub use pointer::{PointerField, PointerSample};
pub use random::RandomField;
pub use shapes::Shape;
pub use surface::Surface;
pub use text::TextRasterizer;
pub use time::FrameThrottle;
pub use timeline::{Timeline, TimerId};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::engine::{Engine, FrameOutcome};
    pub use crate::random::RandomField;
    pub use crate::shapes::Shape;
    pub use crate::surface::Surface;
    pub use crate::ParticleBuffer;
    pub use glam::{Vec2, Vec3};
}
