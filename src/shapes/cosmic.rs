//! Curved and orbital layouts: galaxy, torus, sphere, helix, lemniscate, quantum orbit.

use super::{partition, ratio};
use crate::random::RandomField;
use glam::Vec3;
use std::f32::consts::{PI, TAU};

pub(super) fn galaxy(i: usize, field: &RandomField) -> Vec3 {
    let radius = field.sample(i, 0) * 800.0 + field.sample(i, 1) * 400.0;
    let theta = field.sample(i, 2) * TAU;
    let phi = field.sample(i, 3) * TAU;
    let spiral = field.sample(i, 4) * 250.0;

    Vec3::new(
        radius * phi.sin() * theta.cos() + spiral * theta.cos(),
        radius * phi.sin() * theta.sin() + spiral * theta.sin(),
        // Flattened so most of the volume sits near the camera plane.
        radius * phi.cos() * 0.3,
    )
}

pub(super) fn torus(i: usize, field: &RandomField) -> Vec3 {
    const RADIUS: f32 = 200.0;
    const TUBE: f32 = 80.0;

    let theta = field.sample(i, 0) * TAU;
    let phi = field.sample(i, 1) * TAU;
    let scatter = field.sample(i, 2) * 100.0 - 50.0;
    let ring = RADIUS + TUBE * phi.cos();

    Vec3::new(
        ring * theta.cos() + scatter,
        ring * theta.sin() + scatter,
        TUBE * phi.sin() + scatter,
    )
}

pub(super) fn sphere(i: usize, field: &RandomField) -> Vec3 {
    const RADIUS: f32 = 150.0;

    let theta = field.sample(i, 0) * TAU;
    // acos of a uniform value in [-1, 1] spreads points evenly over the shell.
    let phi = (field.sample(i, 1) * 2.0 - 1.0).clamp(-1.0, 1.0).acos();
    let scatter = field.sample(i, 2) * 100.0 - 50.0;

    Vec3::new(
        RADIUS * phi.sin() * theta.cos() + scatter,
        RADIUS * phi.sin() * theta.sin() + scatter,
        RADIUS * phi.cos() + scatter,
    )
}

/// Two strands half a turn apart, with the last tenth of particles as rungs.
pub(super) fn double_helix(i: usize, count: usize, field: &RandomField) -> Vec3 {
    const RADIUS: f32 = 150.0;
    const HEIGHT: f32 = 300.0;
    const PITCH: f32 = 40.0;

    let (segment, local, len) = partition(i, count, &[0.45, 0.45, 0.1]);
    let scatter = Vec3::new(
        field.centered(i, 0) * 30.0,
        field.centered(i, 1) * 30.0,
        field.centered(i, 2) * 30.0,
    );

    let strand = |t: f32, phase: f32| {
        let height = t * HEIGHT;
        let theta = height / PITCH * TAU + phase;
        Vec3::new(RADIUS * theta.cos(), height - HEIGHT / 2.0, RADIUS * theta.sin())
    };

    let point = match segment {
        0 => strand(ratio(local, len), 0.0),
        1 => strand(ratio(local, len), PI),
        _ => {
            // Rungs: evenly spaced along the height, each filled across from strand to strand.
            const RUNGS: usize = 24;
            let rung = local % RUNGS;
            let t = (rung as f32 + 0.5) / RUNGS as f32;
            let across = field.sample(i, 3);
            strand(t, 0.0).lerp(strand(t, PI), across)
        }
    };

    point + scatter
}

pub(super) fn infinity(i: usize, count: usize, field: &RandomField) -> Vec3 {
    const SIZE: f32 = 800.0;

    let t = ratio(i, count) * TAU;
    let spread = field.sample(i, 0) * 200.0;
    let a = SIZE / 2.0;
    let denom = 1.0 + t.sin() * t.sin();

    Vec3::new(
        a * t.cos() / denom + spread,
        a * t.sin() * t.cos() / denom + spread - 100.0,
        field.centered(i, 2) * 100.0,
    )
}

pub(super) fn quantum(i: usize, count: usize, field: &RandomField) -> Vec3 {
    const RADIUS: f32 = 300.0;

    let t = ratio(i, count);
    let spiral = t * 20.0 * PI;
    let elevation = (t * PI * 8.0).cos() * RADIUS * 0.5;

    Vec3::new(
        RADIUS * spiral.cos() + field.centered(i, 0) * 200.0,
        RADIUS * spiral.sin() + field.centered(i, 1) * 200.0,
        elevation + field.centered(i, 2) * 100.0,
    )
}
