//! Layered layouts: ring stack and layered grid.

use crate::random::RandomField;
use glam::Vec3;

/// Golden-angle step between consecutive ring particles, in degrees.
const GOLDEN_ANGLE_DEG: f32 = 137.5;

/// Every 144 steps of 137.5 degrees make 55 full turns.
const GOLDEN_PERIOD: usize = 144;

/// Angle of the `i`th ring particle in degrees, reduced to `[0, 360)`.
///
/// Exact for any index: the product stays below 2^24.
fn golden_angle(i: usize) -> f32 {
    ((i % GOLDEN_PERIOD) as f32 * GOLDEN_ANGLE_DEG) % 360.0
}

/// Eight rings stacked along z, particles placed by the golden angle.
pub(super) fn blockchain(i: usize, count: usize, field: &RandomField) -> Vec3 {
    const RADIUS: f32 = 450.0;
    const LAYERS: usize = 8;

    let layer = layer_of(i, count, LAYERS);
    let layer_offset = layer as f32 * (RADIUS / 2.0);
    let angle = golden_angle(i).to_radians();
    let spread = field.sample(i, 0) * 200.0;

    Vec3::new(
        (RADIUS + spread) * angle.cos(),
        (RADIUS + spread) * angle.sin(),
        layer_offset - RADIUS,
    )
}

/// Four horizontal layers of randomly placed nodes.
pub(super) fn neural_network(i: usize, count: usize, field: &RandomField) -> Vec3 {
    const LAYERS: usize = 4;
    const SPREAD: f32 = 500.0;

    let layer = layer_of(i, count, LAYERS);

    Vec3::new(
        field.centered(i, 0) * SPREAD,
        (layer as f32 / (LAYERS - 1) as f32 - 0.5) * SPREAD,
        field.centered(i, 2) * SPREAD * 0.3,
    )
}

/// Layer index of particle `i` when `count` particles are split evenly into `layers`.
fn layer_of(i: usize, count: usize, layers: usize) -> usize {
    if count == 0 {
        return 0;
    }
    (i * layers / count).min(layers - 1)
}
