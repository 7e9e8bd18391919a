//! Pointer repulsion and baseline return.
//!
//! Once per rendered frame every particle is pushed away from the pointer
//! in the xy plane and then pulled a small fraction of the way back to its
//! baseline. Without pointer movement the pull alone brings every particle
//! back to the formed shape.
//!
//! # Example
//!
//! ```ignore
//! use morph_particles::{PointerField, PointerSample};
//!
//! let field = PointerField::default();
//! let mut sample = PointerSample::default();
//! sample.record(glam::Vec2::new(0.2, -0.1));
//! field.apply(&mut buffer, sample.get(), false);
//! ```

use crate::buffer::ParticleBuffer;
use crate::config::PointerConfig;
use glam::{Vec2, Vec3};

/// Latest pointer position in normalized coordinates, `[-1, 1]` on both axes.
///
/// Input events only record into this; the frame reads it once.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerSample {
    ndc: Option<Vec2>,
}

impl PointerSample {
    /// Record a new position, clamped to the unit square.
    pub fn record(&mut self, ndc: Vec2) {
        if ndc.is_finite() {
            self.ndc = Some(ndc.clamp(Vec2::NEG_ONE, Vec2::ONE));
        }
    }

    /// Forget the pointer, e.g. when it leaves the window.
    pub fn clear(&mut self) {
        self.ndc = None;
    }

    /// Last recorded position, if any.
    #[inline]
    pub fn get(&self) -> Option<Vec2> {
        self.ndc
    }
}

/// Per-frame pointer forces.
#[derive(Clone, Debug, Default)]
pub struct PointerField {
    config: PointerConfig,
}

impl PointerField {
    pub fn new(config: PointerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PointerConfig {
        &self.config
    }

    /// Repulsion magnitude at `dist`.
    ///
    /// Linear falloff from `strength` at zero to exactly zero at the falloff
    /// radius and beyond.
    pub fn repulsion(&self, dist: f32) -> f32 {
        let radius = self.config.falloff_radius;
        if dist.is_nan() || dist >= radius {
            return 0.0;
        }
        (1.0 - dist.max(0.0) / radius) * self.config.strength
    }

    /// Map a normalized pointer position into particle space.
    pub fn to_world(&self, ndc: Vec2) -> Vec2 {
        ndc * self.config.pointer_scale
    }

    /// Apply one frame of repulsion from `pointer` and return toward the baseline.
    ///
    /// With no pointer sample only the return pull runs. `damped` scales the
    /// repulsion down while text is formed.
    pub fn apply(&self, buffer: &mut ParticleBuffer, pointer: Option<Vec2>, damped: bool) {
        let target = pointer.map(|ndc| self.to_world(ndc));
        let damping = if damped { self.config.text_damping } else { 1.0 };
        let step = self.config.step;
        let back = self.config.return_speed;

        let (points, baseline) = buffer.points_and_baseline_mut();
        for (p, origin) in points.iter_mut().zip(baseline) {
            if let Some(target) = target {
                let d = p.truncate() - target;
                let repel = self.repulsion(d.length()) * damping;
                if repel > 0.0 {
                    *p += Vec3::new(d.x, d.y, 0.0) * repel * step;
                }
            }
            *p += (*origin - *p) * back;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_at(points: &[[f32; 3]]) -> ParticleBuffer {
        ParticleBuffer::from_positions(points.iter().flatten().copied().collect())
    }

    #[test]
    fn test_repulsion_monotonic() {
        let field = PointerField::default();
        let mut last = f32::MAX;
        for step in 0..300 {
            let v = field.repulsion(step as f32 * 0.5);
            assert!(v <= last);
            last = v;
        }
    }

    #[test]
    fn test_repulsion_zero_at_radius() {
        let field = PointerField::default();
        assert_eq!(field.repulsion(100.0), 0.0);
        assert_eq!(field.repulsion(250.0), 0.0);
        assert_eq!(field.repulsion(f32::NAN), 0.0);
        assert_eq!(field.repulsion(0.0), 4.0);
    }

    #[test]
    fn test_pushes_away_from_pointer() {
        let field = PointerField::default();
        let mut buffer = buffer_at(&[[10.0, 0.0, 5.0]]);
        field.apply(&mut buffer, Some(Vec2::ZERO), false);
        let p = buffer.points()[0];
        assert!(p.x > 10.0);
        assert_eq!(p.y, 0.0);
        assert_eq!(p.z, 5.0);
    }

    #[test]
    fn test_damped_push_is_smaller() {
        let field = PointerField::default();
        let mut full = buffer_at(&[[10.0, 0.0, 0.0]]);
        let mut damped = full.clone();
        field.apply(&mut full, Some(Vec2::ZERO), false);
        field.apply(&mut damped, Some(Vec2::ZERO), true);
        assert!(damped.points()[0].x - 10.0 < full.points()[0].x - 10.0);
    }

    #[test]
    fn test_far_pointer_only_returns() {
        let field = PointerField::default();
        let mut buffer = buffer_at(&[[0.0, 0.0, 0.0]]);
        buffer.rebaseline(&[100.0, 0.0, 0.0]);
        // NDC (1, 1) maps to (100, 100): 100 units from the particle.
        field.apply(&mut buffer, Some(Vec2::ONE), false);
        assert!((buffer.points()[0].x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_converges_without_pointer() {
        let field = PointerField::default();
        let mut buffer = buffer_at(&[[200.0, -50.0, 30.0], [0.0, 0.0, 0.0]]);
        buffer.rebaseline(&[0.0, 0.0, 0.0, 10.0, 10.0, 10.0]);
        for _ in 0..2000 {
            field.apply(&mut buffer, None, false);
        }
        for (p, o) in buffer.points().iter().zip(buffer.original_points()) {
            assert!(p.distance(*o) < 1.0);
        }
    }

    #[test]
    fn test_sample_clamps() {
        let mut sample = PointerSample::default();
        assert_eq!(sample.get(), None);
        sample.record(Vec2::new(3.0, -0.5));
        assert_eq!(sample.get(), Some(Vec2::new(1.0, -0.5)));
        sample.record(Vec2::new(f32::NAN, 0.0));
        assert_eq!(sample.get(), Some(Vec2::new(1.0, -0.5)));
        sample.clear();
        assert_eq!(sample.get(), None);
    }
}
