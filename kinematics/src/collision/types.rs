/*!
Core collision types and math aliases shared by the collision submodules.

This module contains no algorithms. It defines the data exchanged between the
terrain height service, the resolver, the object registry and the character
controller.

Position conventions
- Sphere and box volumes are positioned at their center.
- Capsules are positioned at the center of their lower hemisphere, so the lowest
  point of every volume sits `support_offset()` below its position and a volume
  resting on ground at elevation `e` has `position.y == e + support_offset()`.
*/

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec2 = na::Vector2<f32>;
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;

/// World up axis.
#[inline]
pub fn up() -> Vec3 {
    Vec3::new(0.0, 1.0, 0.0)
}

/// Per-kind dimensions of a collision volume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VolumeShape {
    /// Box with full extents along its local axes.
    Box { width: f32, height: f32, depth: f32 },
    Sphere { radius: f32 },
    /// Y-aligned capsule; `height` is the total height including both caps.
    Capsule { radius: f32, height: f32 },
}

impl VolumeShape {
    /// Distance from the volume's position down to its lowest point.
    #[inline]
    pub fn support_offset(&self) -> f32 {
        match *self {
            VolumeShape::Box { height, .. } => height.max(0.0) * 0.5,
            VolumeShape::Sphere { radius } => radius.max(0.0),
            VolumeShape::Capsule { radius, .. } => radius.max(0.0),
        }
    }
}

/// A collision volume carried by an entity. The core only reads it and corrects
/// its position; ownership stays with the entity.
#[derive(Clone, Copy, Debug)]
pub struct CollisionVolume {
    pub shape: VolumeShape,
    pub position: Vec3,
    /// Orientation of the volume. Terrain tests are axis-aligned and ignore it;
    /// it is kept for debug visualization.
    pub orientation: Quat,
}

impl CollisionVolume {
    pub fn new(shape: VolumeShape, position: Vec3) -> Self {
        Self {
            shape,
            position,
            orientation: Quat::identity(),
        }
    }

    pub fn capsule(radius: f32, height: f32, position: Vec3) -> Self {
        Self::new(VolumeShape::Capsule { radius, height }, position)
    }

    pub fn sphere(radius: f32, position: Vec3) -> Self {
        Self::new(VolumeShape::Sphere { radius }, position)
    }

    pub fn cuboid(width: f32, height: f32, depth: f32, position: Vec3) -> Self {
        Self::new(
            VolumeShape::Box {
                width,
                height,
                depth,
            },
            position,
        )
    }

    /// Copy of this volume moved to `position`.
    #[inline]
    pub fn at(&self, position: Vec3) -> Self {
        Self { position, ..*self }
    }

    /// Elevation of the volume's lowest point.
    #[inline]
    pub fn lowest_point(&self) -> f32 {
        self.position.y - self.shape.support_offset()
    }
}

/// Outcome of a collision query. Produced fresh per query, never stored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionResult {
    pub hit: bool,
    /// Penetration depth (meters, >= 0).
    pub depth: f32,
    /// Unit contact normal pointing out of the surface.
    pub normal: Vec3,
    /// Position that removes the penetration (equal to the query position on a miss).
    pub corrected: Vec3,
}

impl CollisionResult {
    /// A miss at `position`.
    #[inline]
    pub fn none(position: Vec3) -> Self {
        Self {
            hit: false,
            depth: 0.0,
            normal: up(),
            corrected: position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn support_offset_per_kind() {
        let b = VolumeShape::Box {
            width: 1.0,
            height: 3.0,
            depth: 1.0,
        };
        assert_eq!(b.support_offset(), 1.5);
        assert_eq!(VolumeShape::Sphere { radius: 0.25 }.support_offset(), 0.25);
        assert_eq!(
            VolumeShape::Capsule {
                radius: 0.5,
                height: 2.0
            }
            .support_offset(),
            0.5
        );
    }

    #[test]
    fn lowest_point_follows_position() {
        let v = CollisionVolume::capsule(0.5, 2.0, Vec3::new(1.0, 3.0, -2.0));
        assert_eq!(v.lowest_point(), 2.5);
        assert_eq!(v.at(Vec3::new(0.0, 1.0, 0.0)).lowest_point(), 0.5);
    }

    #[test]
    fn miss_keeps_position() {
        let p = Vec3::new(4.0, 5.0, 6.0);
        let r = CollisionResult::none(p);
        assert!(!r.hit);
        assert_eq!(r.corrected, p);
        assert_eq!(r.depth, 0.0);
    }
}
