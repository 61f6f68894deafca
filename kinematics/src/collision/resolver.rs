use crate::{config::CollisionSettings, terrain::height::HeightProvider};

use super::{
    settings::DIST_EPS,
    types::{CollisionResult, CollisionVolume, Vec3, VolumeShape, up},
};

/// Anything that can answer "does this volume penetrate the world at `position`?".
pub trait Resolver {
    /// Resolve `volume` placed at `position`. The volume's own position field is ignored.
    fn resolve(&self, volume: &CollisionVolume, position: Vec3) -> CollisionResult;
}

/// Volume-vs-terrain resolver over a [`HeightProvider`].
///
/// Notes
/// - Boxes and spheres use a single-point test under their lowest point.
/// - Capsules are sampled at seven points. The deepest penetration supplies the
///   reported depth and normal; the corrected position clears every contact found.
/// - Every correction is offset by `contact_epsilon` along the contact normal.
#[derive(Debug)]
pub struct TerrainResolver<'a, H: HeightProvider + ?Sized> {
    heights: &'a H,
    settings: CollisionSettings,
}

impl<'a, H: HeightProvider + ?Sized> TerrainResolver<'a, H> {
    pub fn new(heights: &'a H, settings: CollisionSettings) -> Self {
        Self { heights, settings }
    }

    pub fn with_defaults(heights: &'a H) -> Self {
        Self::new(heights, CollisionSettings::default())
    }

    pub fn heights(&self) -> &'a H {
        self.heights
    }

    pub fn settings(&self) -> &CollisionSettings {
        &self.settings
    }

    /// Point test under the lowest point of a box or sphere.
    fn resolve_point(&self, support: f32, position: Vec3) -> CollisionResult {
        let ground = self.heights.height(position.x, position.z);
        let lowest = position.y - support;
        if lowest >= ground {
            return CollisionResult::none(position);
        }

        let mut corrected = position;
        corrected.y = ground + support + self.settings.contact_epsilon;
        CollisionResult {
            hit: true,
            depth: ground - lowest,
            normal: up(),
            corrected,
        }
    }

    fn resolve_capsule(&self, radius: f32, height: f32, p: Vec3) -> CollisionResult {
        let r = radius.max(0.0);
        let h = height.max(2.0 * r);
        let eps = self.settings.contact_epsilon;

        let bottom = p.y - r;
        // Axis of the cylinder section: lower sphere center to upper sphere center.
        let axis_low = p.y;
        let axis_high = p.y + h - 2.0 * r;

        let axis = [
            Vec3::new(p.x, bottom, p.z),
            Vec3::new(p.x, p.y + 0.5 * h - r, p.z),
            Vec3::new(p.x, p.y + h - r, p.z),
        ];
        let rim = [
            Vec3::new(p.x + r, p.y + 0.5 * h - r, p.z),
            Vec3::new(p.x - r, p.y + 0.5 * h - r, p.z),
            Vec3::new(p.x, p.y + 0.5 * h - r, p.z + r),
            Vec3::new(p.x, p.y + 0.5 * h - r, p.z - r),
        ];

        // Deepest penetration per contact normal.
        let mut slots = [0.0_f32; CONTACT_NORMALS];
        let mut consider = |slot: usize, depth: f32| {
            if depth > slots[slot] {
                slots[slot] = depth;
            }
        };

        // The three axis samples share (x, z) and so one elevation.
        let axis_ground = self.heights.height(p.x, p.z);
        consider(SLOT_GROUND, axis_ground - bottom);

        for sample in &rim {
            // A rise of more than the radius above the ground under the axis is a wall,
            // left to the proximity rays. The test ignores the capsule's own height, so
            // a vertical correction never turns a wall into a step.
            let ground = self.heights.height(sample.x, sample.z);
            if ground - axis_ground <= r {
                consider(SLOT_GROUND, ground - bottom);
            }
        }

        let reach = r + self.settings.wall_probe_distance;
        for sample in &axis {
            let origin = Vec3::new(sample.x, sample.y.clamp(axis_low, axis_high), sample.z);
            for (i, dir) in lateral_directions().iter().enumerate() {
                if let Some(t) = self.heights.cast_wall_ray(&origin, dir, reach) {
                    consider(SLOT_LATERAL + i, reach - t);
                }
            }
        }

        let crown = Vec3::new(p.x, axis_high, p.z);
        if let Some(t) = self.heights.cast_wall_ray(&crown, &up(), reach) {
            consider(SLOT_CEILING, reach - t);
        }

        // Ties keep the lowest slot, so ground wins over walls.
        let mut best: Option<(usize, f32)> = None;
        for (slot, &depth) in slots.iter().enumerate() {
            if depth > DIST_EPS && best.is_none_or(|(_, d)| depth > d) {
                best = Some((slot, depth));
            }
        }
        let Some((best_slot, depth)) = best else {
            return CollisionResult::none(p);
        };

        // Every active normal is corrected so the result never penetrates again.
        let mut corrected = p;
        for (slot, &d) in slots.iter().enumerate() {
            if d > DIST_EPS {
                corrected += slot_normal(slot) * (d + eps);
            }
        }

        CollisionResult {
            hit: true,
            depth,
            normal: slot_normal(best_slot),
            corrected,
        }
    }
}

const SLOT_GROUND: usize = 0;
const SLOT_LATERAL: usize = 1;
const SLOT_CEILING: usize = 5;
const CONTACT_NORMALS: usize = 6;

/// Directions of the horizontal proximity rays, in slot order.
#[inline]
fn lateral_directions() -> [Vec3; 4] {
    [Vec3::x(), -Vec3::x(), Vec3::z(), -Vec3::z()]
}

/// Outward contact normal for a slot: the opposite of the probe direction.
#[inline]
fn slot_normal(slot: usize) -> Vec3 {
    match slot {
        SLOT_GROUND => up(),
        SLOT_CEILING => -up(),
        lateral => -lateral_directions()[(lateral - SLOT_LATERAL) % 4],
    }
}

impl<H: HeightProvider + ?Sized> Resolver for TerrainResolver<'_, H> {
    fn resolve(&self, volume: &CollisionVolume, position: Vec3) -> CollisionResult {
        match volume.shape {
            VolumeShape::Box { .. } | VolumeShape::Sphere { .. } => {
                self.resolve_point(volume.shape.support_offset(), position)
            }
            VolumeShape::Capsule { radius, height } => {
                self.resolve_capsule(radius, height, position)
            }
        }
    }
}
