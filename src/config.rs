//! Engine configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! {
//!   "label": "DUY",
//!   "particle_count": 20000,
//!   "cycle": ["galaxy", "torus", { "text": "HELLO" }],
//!   "pointer": { "falloff_radius": 150.0 }
//! }
//! ```

use crate::easing::Ease;
use crate::error::ConfigError;
use crate::shapes::{Shape, DEFAULT_TEXT_SCALE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration for an [`Engine`](crate::Engine).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Explicit particle count. When `None` the count follows the viewport width.
    pub particle_count: Option<usize>,
    /// Viewports narrower than this (in logical pixels) use `narrow_count`.
    pub narrow_width: u32,
    pub narrow_count: usize,
    pub wide_count: usize,
    /// Text formed first, before the shape rotation starts.
    pub label: String,
    /// Multiplier applied to rasterized text coordinates.
    pub text_scale: f32,
    /// Shapes visited in order, wrapping around.
    pub cycle: Vec<Shape>,
    /// Fixed seed for the random field. `None` draws a fresh seed per mount.
    pub seed: Option<u64>,
    pub timings: MorphTimings,
    pub pointer: PointerConfig,
    pub frame: FrameConfig,
    pub text: TextConfig,
    pub scatter: ScatterConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            particle_count: None,
            narrow_width: 768,
            narrow_count: 50_000,
            wide_count: 100_000,
            label: "AXESS".to_string(),
            text_scale: DEFAULT_TEXT_SCALE,
            cycle: Shape::default_cycle(),
            seed: None,
            timings: MorphTimings::default(),
            pointer: PointerConfig::default(),
            frame: FrameConfig::default(),
            text: TextConfig::default(),
            scatter: ScatterConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write the config as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Particle count for a viewport of the given logical width.
    pub fn particle_count_for(&self, viewport_width: u32) -> usize {
        self.particle_count.unwrap_or(if viewport_width < self.narrow_width {
            self.narrow_count
        } else {
            self.wide_count
        })
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == Some(0) || self.narrow_count == 0 || self.wide_count == 0 {
            return Err(invalid("particle count must be greater than zero"));
        }
        if self.cycle.is_empty() {
            return Err(invalid("cycle must name at least one shape"));
        }
        if !self.text_scale.is_finite() {
            return Err(invalid("text_scale must be finite"));
        }
        if !(self.frame.target_fps.is_finite() && self.frame.target_fps > 0.0) {
            return Err(invalid("frame.target_fps must be positive"));
        }
        self.timings.validate()?;
        self.pointer.validate()?;
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

/// Duration, easing and per-frame blend rate of one morph stage.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StageTiming {
    /// Stage length in seconds.
    pub seconds: f32,
    pub ease: Ease,
    /// Fraction of the remaining distance covered per frame at full ease.
    pub rate: f32,
}

impl Default for StageTiming {
    fn default() -> Self {
        Self::new(2.0, Ease::Power2InOut, 0.1)
    }
}

impl StageTiming {
    pub const fn new(seconds: f32, ease: Ease, rate: f32) -> Self {
        Self { seconds, ease, rate }
    }

    pub fn duration(&self) -> Duration {
        secs(self.seconds)
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if !(self.seconds.is_finite() && self.seconds >= 0.0) {
            return Err(invalid(format!("{name}.seconds must be a non-negative number")));
        }
        if !(self.rate.is_finite() && (0.0..=1.0).contains(&self.rate)) {
            return Err(invalid(format!("{name}.rate must be within [0, 1]")));
        }
        Ok(())
    }
}

/// Timing of every stage of the morph sequence.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MorphTimings {
    /// Pause before the first formation, in seconds.
    pub initial_delay: f32,
    pub form_primary: StageTiming,
    /// Pause while the label is shown, in seconds.
    pub hold_primary: f32,
    pub burst: StageTiming,
    pub form_secondary: StageTiming,
    pub hold_secondary: f32,
    pub dissolve: StageTiming,
    pub form_cycle: StageTiming,
    pub hold_cycle: f32,
}

impl Default for MorphTimings {
    fn default() -> Self {
        Self {
            initial_delay: 1.0,
            form_primary: StageTiming::new(2.0, Ease::Power2InOut, 0.1),
            hold_primary: 3.0,
            burst: StageTiming::new(1.0, Ease::Power2InOut, 0.1),
            form_secondary: StageTiming::new(2.0, Ease::Power2InOut, 0.1),
            hold_secondary: 2.0,
            dissolve: StageTiming::new(2.5, Ease::Power1InOut, 0.02),
            form_cycle: StageTiming::new(2.5, Ease::Power2Out, 0.05),
            hold_cycle: 5.0,
        }
    }
}

impl MorphTimings {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, seconds) in [
            ("initial_delay", self.initial_delay),
            ("hold_primary", self.hold_primary),
            ("hold_secondary", self.hold_secondary),
            ("hold_cycle", self.hold_cycle),
        ] {
            if !(seconds.is_finite() && seconds >= 0.0) {
                return Err(invalid(format!("timings.{name} must be a non-negative number")));
            }
        }
        self.form_primary.validate("timings.form_primary")?;
        self.burst.validate("timings.burst")?;
        self.form_secondary.validate("timings.form_secondary")?;
        self.dissolve.validate("timings.dissolve")?;
        self.form_cycle.validate("timings.form_cycle")?;
        Ok(())
    }
}

/// Pointer repulsion and baseline return.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PointerConfig {
    /// Distance at which repulsion reaches zero.
    pub falloff_radius: f32,
    /// Repulsion magnitude at zero distance.
    pub strength: f32,
    /// Fraction of the repulsion vector applied per frame.
    pub step: f32,
    /// Fraction of the distance to the baseline recovered per frame.
    pub return_speed: f32,
    /// Repulsion multiplier while text is formed.
    pub text_damping: f32,
    /// Maps normalized pointer coordinates into particle space.
    pub pointer_scale: f32,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            falloff_radius: 100.0,
            strength: 4.0,
            step: 0.01,
            return_speed: 0.005,
            text_damping: 0.3,
            pointer_scale: 100.0,
        }
    }
}

impl PointerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.falloff_radius.is_finite() && self.falloff_radius > 0.0) {
            return Err(invalid("pointer.falloff_radius must be positive"));
        }
        if !(self.return_speed.is_finite() && (0.0..=1.0).contains(&self.return_speed)) {
            return Err(invalid("pointer.return_speed must be within [0, 1]"));
        }
        let finite = [self.strength, self.step, self.text_damping, self.pointer_scale];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(invalid("pointer values must be finite"));
        }
        Ok(())
    }
}

/// Frame pacing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FrameConfig {
    pub target_fps: f32,
    /// Longest time step fed to the morph sequence in one frame, in seconds.
    pub max_step: f32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            target_fps: 60.0,
            max_step: 0.25,
        }
    }
}

impl FrameConfig {
    pub fn max_step(&self) -> Duration {
        secs(self.max_step)
    }
}

/// How text is chosen when it lights more pixels than there are particles.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Truncation {
    /// First pixels in raster order.
    #[default]
    ScanOrder,
    /// Even stride through all lit pixels.
    Uniform,
}

/// Offscreen canvas used for text rasterization.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Glyph height in canvas pixels.
    pub font_px: u32,
    /// Canvas pixel to particle unit.
    pub pixel_scale: f32,
    /// Side of the cube that unfilled slots are scattered in.
    pub fill_extent: f32,
    pub truncation: Truncation,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1024,
            canvas_height: 256,
            font_px: 150,
            pixel_scale: 0.1,
            fill_extent: 100.0,
            truncation: Truncation::ScanOrder,
        }
    }
}

/// Extents of the burst and dissolve scatter targets.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScatterConfig {
    /// Burst offsets are drawn from `[-extent / 2, extent / 2)` per axis.
    pub burst_extent: f32,
    /// Leading share of particles that burst strongly.
    pub burst_share: f32,
    pub burst_strong: f32,
    pub burst_weak: f32,
    /// Dissolve targets are drawn from a box of this size, centered on the origin.
    pub dissolve_extent: [f32; 3],
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            burst_extent: 800.0,
            burst_share: 0.7,
            burst_strong: 1.5,
            burst_weak: 0.1,
            dissolve_extent: [3000.0, 3000.0, 1000.0],
        }
    }
}

/// Seconds to `Duration`, treating negative or non-finite input as zero.
pub(crate) fn secs(seconds: f32) -> Duration {
    if seconds.is_finite() && seconds > 0.0 {
        Duration::from_secs_f32(seconds)
    } else {
        Duration::ZERO
    }
}
