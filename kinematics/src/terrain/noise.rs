//! Analytic reconstruction of procedurally displaced terrain.
//!
//! `procedural_height` is the same continuous function the terrain's visual
//! displacement evaluates:
//!
//! ```text
//! h(x, z) = max(base + noise(x', z') * elevation_scale * island_mask(d), sea_level)
//! ```
//!
//! where `(x', z')` are patch-local coordinates multiplied by the horizontal scale
//! and `d` is the planar distance from the patch center.

use crate::{constants::NOISE_OCTAVES, terrain::surface::ProceduralParams};

/// Sum of all octave amplitudes (1 + 1/2 + 1/4 for three octaves).
fn amplitude_sum() -> f32 {
    (0..NOISE_OCTAVES).map(|i| 0.5f32.powi(i as i32)).sum()
}

/// Smooth, bounded, deterministic noise in `[0, 1]`.
///
/// Each octave is `sin(x * f) * cos(z * f) * a`; the frequency `f` starts at
/// `base_frequency` and doubles per octave while the amplitude `a` starts at 1 and
/// halves.
pub fn octave_noise(x: f32, z: f32, base_frequency: f32) -> f32 {
    let mut sum = 0.0;
    let mut frequency = base_frequency;
    let mut amplitude = 1.0;
    for _ in 0..NOISE_OCTAVES {
        sum += (x * frequency).sin() * (z * frequency).cos() * amplitude;
        frequency *= 2.0;
        amplitude *= 0.5;
    }

    (0.5 + 0.5 * sum / amplitude_sum()).clamp(0.0, 1.0)
}

/// Radial falloff: 1 within `radius`, `exp(-(d - radius) / falloff)` beyond it.
///
/// Never negative. Degenerate inputs are clamped (negative radius to 0, falloff to a
/// small positive value).
pub fn island_mask(distance: f32, radius: f32, falloff: f32) -> f32 {
    let radius = radius.max(0.0);
    let falloff = falloff.max(1.0e-3);
    let beyond = distance - radius;
    if beyond <= 0.0 {
        1.0
    } else {
        (-beyond / falloff).exp()
    }
}

/// Noise value of `params` at world (x, z), before elevation scaling.
#[inline]
pub fn patch_noise(params: &ProceduralParams, x: f32, z: f32) -> f32 {
    let lx = (x - params.center.x) * params.horizontal_scale;
    let lz = (z - params.center.y) * params.horizontal_scale;
    octave_noise(lx, lz, params.roughness)
}

/// Elevation of a procedural patch at world (x, z).
pub fn procedural_height(params: &ProceduralParams, x: f32, z: f32) -> f32 {
    let dx = x - params.center.x;
    let dz = z - params.center.y;
    let distance = (dx * dx + dz * dz).sqrt();

    let mask = island_mask(distance, params.island_radius, params.coastal_falloff);
    let displaced = params.base + patch_noise(params, x, z) * params.elevation_scale * mask;
    displaced.max(params.sea_level)
}
