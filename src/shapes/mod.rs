//! Named shape generators.
//!
//! Each [`Shape`] maps a particle index to a point with a closed-form
//! parametric layout, perturbed by values read from the shared
//! [`RandomField`] at offsets `i * 3 + c`. Generators are pure: the same
//! field and count always give the same buffer.
//!
//! Shapes that are drawn from distinct parts (a humanoid's head and limbs,
//! a tree's trunk and canopy) split the particles into index ranges by fixed
//! ratios, so the partition is reproducible rather than random.
//!
//! # Example
//!
//! ```ignore
//! use morph_particles::{RandomField, Shape};
//!
//! let field = RandomField::new(10_000);
//! let torus = Shape::Torus.generate(10_000, &field);
//! assert_eq!(torus.len(), 30_000);
//! ```

mod cosmic;
mod figures;
mod structures;

use crate::random::RandomField;
use crate::text::TextRasterizer;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Multiplier applied to rasterized text coordinates when text is used as a shape.
pub const DEFAULT_TEXT_SCALE: f32 = 9.0;

/// A named shape the particles can form.
///
/// The set is closed: dispatch is an exhaustive match, so an unknown name is
/// rejected when the config is parsed rather than producing an empty layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Polar spiral volume with scatter.
    Galaxy,
    /// Ring torus.
    Torus,
    /// Sphere shell with scatter.
    Sphere,
    /// Two interleaved helices joined by rungs.
    DoubleHelix,
    /// Lemniscate of Bernoulli.
    Infinity,
    /// Stack of radial rings.
    Blockchain,
    /// Four grid layers.
    NeuralNetwork,
    /// Spiral orbit with an oscillating elevation.
    Quantum,
    /// Head, body, arms and legs.
    Humanoid,
    /// Trunk and canopy.
    Tree,
    /// Face ring, eyes and a smile arc.
    Smiley,
    /// Two stacked arcs forming an "S".
    Glyph,
    /// Two verticals joined by a rising diagonal, an "N".
    GlyphN,
    /// Rasterized text.
    Text(String),
}

impl Shape {
    /// Every geometric shape in registration order.
    pub const GEOMETRIC: [Shape; 13] = [
        Shape::Glyph,
        Shape::Galaxy,
        Shape::Blockchain,
        Shape::NeuralNetwork,
        Shape::Quantum,
        Shape::GlyphN,
        Shape::Infinity,
        Shape::Torus,
        Shape::Sphere,
        Shape::DoubleHelix,
        Shape::Humanoid,
        Shape::Tree,
        Shape::Smiley,
    ];

    /// Default shape rotation.
    pub fn default_cycle() -> Vec<Shape> {
        Self::GEOMETRIC.to_vec()
    }

    /// Short name used in logs.
    pub fn name(&self) -> &str {
        match self {
            Shape::Galaxy => "galaxy",
            Shape::Torus => "torus",
            Shape::Sphere => "sphere",
            Shape::DoubleHelix => "double_helix",
            Shape::Infinity => "infinity",
            Shape::Blockchain => "blockchain",
            Shape::NeuralNetwork => "neural_network",
            Shape::Quantum => "quantum",
            Shape::Humanoid => "humanoid",
            Shape::Tree => "tree",
            Shape::Smiley => "smiley",
            Shape::Glyph => "glyph",
            Shape::GlyphN => "glyph_n",
            Shape::Text(text) => text,
        }
    }

    /// Whether this shape is rasterized text.
    pub fn is_text(&self) -> bool {
        matches!(self, Shape::Text(_))
    }

    /// Generate `3 * count` positions with the default text rasterizer and scale.
    pub fn generate(&self, count: usize, field: &RandomField) -> Vec<f32> {
        self.generate_with(count, field, &TextRasterizer::default(), DEFAULT_TEXT_SCALE)
    }

    /// Generate `3 * count` positions, rasterizing text shapes with `text` and
    /// multiplying their coordinates by `text_scale`.
    pub fn generate_with(
        &self,
        count: usize,
        field: &RandomField,
        text: &TextRasterizer,
        text_scale: f32,
    ) -> Vec<f32> {
        match self {
            Shape::Galaxy => build(count, |i| cosmic::galaxy(i, field)),
            Shape::Torus => build(count, |i| cosmic::torus(i, field)),
            Shape::Sphere => build(count, |i| cosmic::sphere(i, field)),
            Shape::DoubleHelix => build(count, |i| cosmic::double_helix(i, count, field)),
            Shape::Infinity => build(count, |i| cosmic::infinity(i, count, field)),
            Shape::Quantum => build(count, |i| cosmic::quantum(i, count, field)),
            Shape::Blockchain => build(count, |i| structures::blockchain(i, count, field)),
            Shape::NeuralNetwork => build(count, |i| structures::neural_network(i, count, field)),
            Shape::Humanoid => build(count, |i| figures::humanoid(i, count, field)),
            Shape::Tree => build(count, |i| figures::tree(i, count, field)),
            Shape::Smiley => build(count, |i| figures::smiley(i, count, field)),
            Shape::Glyph => build(count, |i| figures::glyph(i, count, field)),
            Shape::GlyphN => build(count, |i| figures::glyph_n(i, count, field)),
            Shape::Text(label) => {
                let mut positions = text.rasterize(label, count, field);
                positions.iter_mut().for_each(|v| *v *= text_scale);
                positions
            }
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Text(text) => write!(f, "text \"{}\"", text),
            other => f.write_str(other.name()),
        }
    }
}

/// Allocate `3 * count` floats and fill them point by point.
fn build(count: usize, mut point: impl FnMut(usize) -> Vec3) -> Vec<f32> {
    let mut positions = vec![0.0; count * 3];
    let points: &mut [Vec3] = bytemuck::cast_slice_mut(&mut positions);
    for (i, p) in points.iter_mut().enumerate() {
        *p = point(i);
    }
    positions
}

/// Progress of `index` through a range of `len` particles, in `[0, 1)`.
///
/// Empty ranges report zero instead of dividing by zero.
#[inline]
pub(crate) fn ratio(index: usize, len: usize) -> f32 {
    if len == 0 {
        0.0
    } else {
        index as f32 / len as f32
    }
}

/// Split `count` particles into consecutive ranges by fixed shares.
///
/// Returns the segment that `index` falls into and its position inside that
/// segment as `(segment, local_index, segment_len)`. The last segment absorbs
/// rounding so every index belongs somewhere.
pub(crate) fn partition(index: usize, count: usize, shares: &[f32]) -> (usize, usize, usize) {
    let mut start = 0;
    let mut acc = 0.0;
    for (segment, share) in shares.iter().enumerate() {
        acc += share;
        let end = if segment + 1 == shares.len() {
            count
        } else {
            ((count as f32 * acc).round() as usize).clamp(start, count)
        };
        if index < end {
            return (segment, index - start, end - start);
        }
        start = end;
    }
    (shares.len().saturating_sub(1), index.saturating_sub(start), count.saturating_sub(start))
}
