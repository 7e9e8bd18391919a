//! Figurative silhouettes. Each splits the particles into parts by fixed index shares.

use super::{partition, ratio};
use crate::random::RandomField;
use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// Head, body, left arm, right arm, left leg, right leg.
const HUMANOID_SHARES: [f32; 6] = [0.2, 0.3, 0.1, 0.1, 0.15, 0.15];
/// Trunk, canopy.
const TREE_SHARES: [f32; 2] = [0.25, 0.75];
/// Face ring, left eye, right eye, smile.
const SMILEY_SHARES: [f32; 4] = [0.6, 0.1, 0.1, 0.2];

pub(super) fn humanoid(i: usize, count: usize, field: &RandomField) -> Vec3 {
    let (part, local, len) = partition(i, count, &HUMANOID_SHARES);
    let t = ratio(local, len);
    let jitter = Vec3::new(
        field.centered(i, 0) * 20.0,
        field.centered(i, 1) * 20.0,
        field.centered(i, 2) * 20.0,
    );

    match part {
        0 => {
            let theta = field.sample(i, 0) * TAU;
            let phi = (field.sample(i, 1) * 2.0 - 1.0).clamp(-1.0, 1.0).acos();
            Vec3::new(0.0, 170.0, 0.0) + spherical(45.0, theta, phi)
        }
        1 => Vec3::new(
            field.centered(i, 0) * 100.0,
            20.0 + field.sample(i, 1) * 110.0,
            field.centered(i, 2) * 40.0,
        ),
        2 => limb(Vec3::new(-55.0, 120.0, 0.0), Vec3::new(-150.0, 10.0, 0.0), t) + jitter,
        3 => limb(Vec3::new(55.0, 120.0, 0.0), Vec3::new(150.0, 10.0, 0.0), t) + jitter,
        4 => limb(Vec3::new(-30.0, 20.0, 0.0), Vec3::new(-50.0, -160.0, 0.0), t) + jitter,
        _ => limb(Vec3::new(30.0, 20.0, 0.0), Vec3::new(50.0, -160.0, 0.0), t) + jitter,
    }
}

pub(super) fn tree(i: usize, count: usize, field: &RandomField) -> Vec3 {
    let (part, local, len) = partition(i, count, &TREE_SHARES);

    if part == 0 {
        let angle = field.sample(i, 0) * TAU;
        let r = 25.0 * field.sample(i, 1).sqrt();
        let y = -220.0 + ratio(local, len) * 220.0 + field.centered(i, 2) * 10.0;
        Vec3::new(r * angle.cos(), y, r * angle.sin())
    } else {
        // Cube root keeps the canopy evenly filled rather than dense at the core.
        let r = 170.0 * field.sample(i, 0).cbrt();
        let theta = field.sample(i, 1) * TAU;
        let phi = (field.sample(i, 2) * 2.0 - 1.0).clamp(-1.0, 1.0).acos();
        let p = spherical(r, theta, phi);
        Vec3::new(p.x, 120.0 + p.y * 0.8, p.z)
    }
}

pub(super) fn smiley(i: usize, count: usize, field: &RandomField) -> Vec3 {
    let (part, local, len) = partition(i, count, &SMILEY_SHARES);
    let t = ratio(local, len);
    let depth = field.centered(i, 2) * 30.0;

    let eye = |center_x: f32| {
        let r = 25.0 * field.sample(i, 0).sqrt();
        let a = field.sample(i, 1) * TAU;
        Vec3::new(center_x + r * a.cos(), 70.0 + r * a.sin(), depth)
    };

    match part {
        0 => {
            let angle = t * TAU;
            let radius = 220.0 + field.centered(i, 0) * 12.0;
            Vec3::new(radius * angle.cos(), radius * angle.sin(), depth)
        }
        1 => eye(-75.0),
        2 => eye(75.0),
        _ => {
            let angle = (200.0 + t * 140.0).to_radians();
            let radius = 120.0 + field.centered(i, 0) * 10.0;
            Vec3::new(radius * angle.cos(), 10.0 + radius * angle.sin(), depth)
        }
    }
}

/// An "S": the first half traces an upper arc, the second half a lower arc.
pub(super) fn glyph(i: usize, count: usize, field: &RandomField) -> Vec3 {
    const RADIUS: f32 = 300.0;

    let half = (count / 2).max(1);
    let (x, y) = if i < half {
        let t = ratio(i, half) * PI * 1.5;
        (t.cos() * RADIUS * 0.4, t.sin() * RADIUS * 0.4 + RADIUS * 0.4)
    } else {
        let t = ratio(i - half, half) * PI * 1.5 + PI;
        (t.cos() * RADIUS * 0.4, t.sin() * RADIUS * 0.4 - RADIUS * 0.4)
    };

    Vec3::new(
        x + field.centered(i, 1) * 25.0,
        y + field.centered(i, 2) * 25.0,
        field.centered(i, 0) * 50.0,
    )
}

/// An "N": left vertical, rising diagonal, right vertical, one third each.
pub(super) fn glyph_n(i: usize, count: usize, field: &RandomField) -> Vec3 {
    const HEIGHT: f32 = 400.0;
    const WIDTH: f32 = 300.0;

    let third = count / 3;
    let (x, t) = if i < third {
        (-WIDTH / 2.0, ratio(i, third))
    } else if i < third * 2 {
        let t = ratio(i - third, third);
        (t * WIDTH - WIDTH / 2.0, t)
    } else {
        (WIDTH / 2.0, ratio(i - third * 2, count - third * 2))
    };
    let y = t * HEIGHT - HEIGHT / 2.0;

    Vec3::new(
        x + field.centered(i, 1) * 25.0,
        y + field.centered(i, 2) * 25.0,
        field.centered(i, 0) * 50.0,
    )
}

fn limb(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    from.lerp(to, t)
}

fn spherical(r: f32, theta: f32, phi: f32) -> Vec3 {
    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin(),
        r * phi.cos(),
    )
}
