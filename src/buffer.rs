//! The particle buffer shared by every stage of a frame.
//!
//! Three flat arrays of `3 * count` floats: current positions (rewritten every
//! frame), baseline positions (the attractor the pointer field pulls back
//! to), and colors (assigned once at construction).
//!
//! The flat layout is what the draw surface uploads. Internally the buffer is
//! viewed as `[Vec3]` through `bytemuck`, so per-particle math reads like
//! vector math without copying.

use crate::random::RandomField;
use glam::Vec3;
use std::f32::consts::TAU;

const WHITE: Vec3 = Vec3::new(1.0, 1.0, 1.0);
const LIGHT_BLUE: Vec3 = Vec3::new(0.7, 0.9, 1.0);
const LIGHT_PURPLE: Vec3 = Vec3::new(0.8, 0.6, 1.0);

/// Position, baseline and color arrays for `count` particles.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleBuffer {
    count: usize,
    positions: Vec<f32>,
    original_positions: Vec<f32>,
    colors: Vec<f32>,
    dirty: bool,
}

impl ParticleBuffer {
    /// Build the initial spread-out formation and palette for `count` particles.
    ///
    /// Positions fill a loose spiral volume; the baseline starts equal to
    /// the positions so an idle buffer stays put.
    pub fn new(count: usize, field: &RandomField) -> Self {
        let mut positions = vec![0.0; count * 3];
        let mut colors = vec![0.0; count * 3];

        for (i, p) in as_points_mut(&mut positions).iter_mut().enumerate() {
            let radius = field.sample(i, 0) * 400.0 + field.sample(i, 1) * 200.0;
            let theta = field.sample(i, 2) * TAU;
            let phi = field.sample(i, 3) * TAU;
            let spiral = field.sample(i, 4) * 100.0;

            *p = Vec3::new(
                radius * phi.sin() * theta.cos() + spiral * theta.cos(),
                radius * phi.sin() * theta.sin() + spiral * theta.sin(),
                radius * phi.cos() * field.sample(i, 5),
            );
        }

        for (i, c) in as_points_mut(&mut colors).iter_mut().enumerate() {
            *c = palette_color(field.sample(i, 6), field.sample(i, 7));
        }

        Self {
            count,
            original_positions: positions.clone(),
            positions,
            colors,
            dirty: true,
        }
    }

    /// Build a buffer from explicit positions. Baseline equals positions and
    /// every particle is white.
    ///
    /// Trailing floats that do not form a full triple are dropped.
    pub fn from_positions(mut positions: Vec<f32>) -> Self {
        let count = positions.len() / 3;
        positions.truncate(count * 3);
        Self {
            count,
            original_positions: positions.clone(),
            colors: vec![1.0; count * 3],
            positions,
            dirty: true,
        }
    }

    /// Number of particles.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Current positions, `3 * count` floats.
    #[inline]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Baseline positions, `3 * count` floats.
    #[inline]
    pub fn original_positions(&self) -> &[f32] {
        &self.original_positions
    }

    /// Colors, `3 * count` floats in `[0, 1]`.
    #[inline]
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// Current positions as points.
    pub fn points(&self) -> &[Vec3] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Baseline positions as points.
    pub fn original_points(&self) -> &[Vec3] {
        bytemuck::cast_slice(&self.original_positions)
    }

    /// Mutable current positions together with the read-only baseline.
    ///
    /// This is the single write path used by the per-frame passes.
    pub fn points_and_baseline_mut(&mut self) -> (&mut [Vec3], &[Vec3]) {
        (
            as_points_mut(&mut self.positions),
            bytemuck::cast_slice(&self.original_positions),
        )
    }

    /// Mutable current positions.
    pub fn points_mut(&mut self) -> &mut [Vec3] {
        as_points_mut(&mut self.positions)
    }

    /// Replace the baseline with a formation target.
    ///
    /// Targets of the wrong length are ignored; the baseline length never
    /// changes.
    pub fn rebaseline(&mut self, target: &[f32]) {
        if target.len() == self.original_positions.len() {
            self.original_positions.copy_from_slice(target);
        }
    }

    /// Mark positions as changed since the last presentation.
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether positions changed since the last presentation.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag after the surface consumed the buffer.
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Whether every position, baseline and color value is finite.
    pub fn is_finite(&self) -> bool {
        self.positions
            .iter()
            .chain(&self.original_positions)
            .chain(&self.colors)
            .all(|v| v.is_finite())
    }
}

/// View a flat float array as points. The length must be a multiple of 3.
pub(crate) fn as_points_mut(values: &mut [f32]) -> &mut [Vec3] {
    bytemuck::cast_slice_mut(values)
}

/// Pick one of the three palette colors from two uniform draws.
fn palette_color(first: f32, second: f32) -> Vec3 {
    if first < 0.4 {
        WHITE
    } else if second < 0.7 {
        LIGHT_BLUE
    } else {
        LIGHT_PURPLE
    }
}
