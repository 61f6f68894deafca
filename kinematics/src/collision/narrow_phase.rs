use rapier3d::{
    na,
    parry::{
        bounding_volume::Aabb,
        query::{Ray, RayCast},
    },
};

use super::types::Vec3;

#[inline]
fn point(v: &Vec3) -> na::Point3<f32> {
    na::Point3::new(v.x, v.y, v.z)
}

#[inline]
fn vector(v: &Vec3) -> na::Vector3<f32> {
    na::Vector3::new(v.x, v.y, v.z)
}

/// Cast a ray against a world-space axis-aligned box and return the distance to the
/// first hit, if it lies within `max_distance`.
///
/// - `origin`: ray start in world space.
/// - `dir`: unit direction.
/// - `min`/`max`: box corners.
///
/// The cast is solid: an origin already inside the box hits at distance zero.
pub fn cast_ray_against_box(
    origin: &Vec3,
    dir: &Vec3,
    max_distance: f32,
    min: &Vec3,
    max: &Vec3,
) -> Option<f32> {
    if max_distance <= 0.0 {
        return None;
    }

    let aabb = Aabb::new(point(min), point(max));
    let ray = Ray::new(point(origin), vector(dir));
    aabb.cast_local_ray(&ray, max_distance, true)
}
