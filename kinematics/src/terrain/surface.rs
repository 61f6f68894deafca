//! Terrain surface descriptors.
//!
//! A surface is either exact geometry (a vertex cloud whose bounding box is its
//! collision shape) or a procedural displacement patch whose elevation is
//! reconstructed analytically. The descriptor is filled in once by the terrain
//! generator; the registry only recomputes the derived `bounds` and `priority`.

use crate::{
    collision::types::{Vec2, Vec3},
    constants::{PRIORITY_BASELINE, PRIORITY_LARGE, PRIORITY_PRIMARY},
    terrain::noise,
};

/// Stable identifier chosen by the terrain generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(pub u32);

/// Axis-aligned bounding volume (world space).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.inf(&max),
            max: min.sup(&max),
        }
    }

    /// Smallest box containing every point, or `None` for an empty set.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.inf(p), max.sup(p)));
        Some(Self { min, max })
    }

    /// Is (x, z) inside the box's horizontal footprint (edges inclusive)?
    #[inline]
    pub fn contains_xz(&self, x: f32, z: f32) -> bool {
        x >= self.min.x && x <= self.max.x && z >= self.min.z && z <= self.max.z
    }

    /// Is `p` inside the box (faces inclusive)?
    #[inline]
    pub fn contains(&self, p: &Vec3) -> bool {
        self.contains_xz(p.x, p.z) && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Squared planar (XZ) distance from (x, z) to the footprint; zero inside.
    #[inline]
    pub fn planar_distance_sq(&self, x: f32, z: f32) -> f32 {
        let dx = (self.min.x - x).max(0.0).max(x - self.max.x);
        let dz = (self.min.z - z).max(0.0).max(z - self.max.z);
        dx * dx + dz * dz
    }

    /// Largest horizontal extent (X or Z).
    #[inline]
    pub fn horizontal_extent(&self) -> f32 {
        (self.max.x - self.min.x).max(self.max.z - self.min.z)
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.max.y
    }
}

/// Minimum coastal falloff distance; smaller values would divide by zero.
const MIN_COASTAL_FALLOFF: f32 = 1.0e-3;

/// Minimum horizontal scale; zero would collapse the noise to a constant.
const MIN_HORIZONTAL_SCALE: f32 = 1.0e-4;

/// Parameters of a procedural displacement patch.
///
/// These are the values the terrain generator feeds its visual displacement, so
/// the physical and the visible ground agree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProceduralParams {
    /// Patch center (x, z). Island distance and local coordinates are measured from here.
    pub center: Vec2,
    /// Half size of the patch footprint along X (`x`) and Z (`y`).
    pub half_extents: Vec2,
    /// Elevation the displacement is added to.
    pub base: f32,
    /// Peak displacement at full noise and full island mask.
    pub elevation_scale: f32,
    /// Base frequency of the first noise octave.
    pub roughness: f32,
    /// Multiplier applied to local coordinates before sampling noise.
    pub horizontal_scale: f32,
    /// Distance from `center` within which the island mask is 1.
    pub island_radius: f32,
    /// Distance over which the mask decays by a factor of e beyond the island radius.
    pub coastal_falloff: f32,
    /// Elevation the surface never drops below.
    pub sea_level: f32,
}

impl Default for ProceduralParams {
    fn default() -> Self {
        Self {
            center: Vec2::zeros(),
            half_extents: Vec2::new(100.0, 100.0),
            base: 0.0,
            elevation_scale: 10.0,
            roughness: 0.05,
            horizontal_scale: 1.0,
            island_radius: 35.0,
            coastal_falloff: 8.0,
            sea_level: 0.0,
        }
    }
}

impl ProceduralParams {
    /// Clamp every parameter to its nearest valid value.
    ///
    /// Returns the sanitized copy and whether anything changed.
    pub fn sanitized(&self) -> (Self, bool) {
        let fix = |v: f32, min: f32, fallback: f32| {
            if v.is_nan() { fallback } else { v.max(min) }
        };
        let finite = |v: f32, fallback: f32| if v.is_finite() { v } else { fallback };

        let clean = Self {
            center: Vec2::new(finite(self.center.x, 0.0), finite(self.center.y, 0.0)),
            half_extents: Vec2::new(
                fix(self.half_extents.x, 0.0, 0.0),
                fix(self.half_extents.y, 0.0, 0.0),
            ),
            base: finite(self.base, 0.0),
            elevation_scale: fix(self.elevation_scale, 0.0, 0.0),
            roughness: fix(self.roughness, 0.0, 0.0),
            horizontal_scale: fix(self.horizontal_scale, MIN_HORIZONTAL_SCALE, 1.0),
            island_radius: fix(self.island_radius, 0.0, 0.0),
            coastal_falloff: fix(self.coastal_falloff, MIN_COASTAL_FALLOFF, MIN_COASTAL_FALLOFF),
            sea_level: finite(self.sea_level, 0.0),
        };
        let changed = clean != *self;
        (clean, changed)
    }

    /// Lowest elevation the patch can report.
    #[inline]
    pub fn floor(&self) -> f32 {
        self.base.max(self.sea_level)
    }

    /// Highest elevation the patch can report.
    #[inline]
    pub fn ceiling(&self) -> f32 {
        (self.base + self.elevation_scale.max(0.0)).max(self.sea_level)
    }
}

/// What a surface is made of.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceShape {
    /// Exact geometry: world-space vertices. Elevation is the top of their bounds.
    Mesh { vertices: Vec<Vec3> },
    /// Analytic displacement.
    Procedural(ProceduralParams),
}

/// A registered terrain surface.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainSurface {
    pub id: SurfaceId,
    pub shape: SurfaceShape,
    /// Flagged by the generator as the primary terrain.
    pub primary: bool,
    bounds: Bounds,
    priority: i32,
}

impl TerrainSurface {
    pub fn new(id: SurfaceId, shape: SurfaceShape) -> Self {
        let mut surface = Self {
            id,
            shape,
            primary: false,
            bounds: Bounds::new(Vec3::zeros(), Vec3::zeros()),
            priority: PRIORITY_BASELINE,
        };
        surface.bounds = surface.compute_bounds();
        surface
    }

    pub fn mesh(id: SurfaceId, vertices: Vec<Vec3>) -> Self {
        Self::new(id, SurfaceShape::Mesh { vertices })
    }

    /// Flat rectangular patch: footprint `min`..`max` in XZ, spanning `bottom`..`top` in Y.
    pub fn slab(id: SurfaceId, min_xz: Vec2, max_xz: Vec2, bottom: f32, top: f32) -> Self {
        Self::mesh(
            id,
            vec![
                Vec3::new(min_xz.x, bottom, min_xz.y),
                Vec3::new(max_xz.x, top, max_xz.y),
            ],
        )
    }

    pub fn procedural(id: SurfaceId, params: ProceduralParams) -> Self {
        Self::new(id, SurfaceShape::Procedural(params))
    }

    /// Builder: mark as primary terrain.
    pub fn as_primary(mut self) -> Self {
        self.primary = true;
        self
    }

    #[inline]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    #[inline]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    #[inline]
    pub fn is_procedural(&self) -> bool {
        matches!(self.shape, SurfaceShape::Procedural(_))
    }

    /// Recompute bounds and priority from the current shape.
    ///
    /// Procedural parameters are clamped in place; returns `true` if any were.
    pub(crate) fn recompute(&mut self, large_extent: f32) -> bool {
        let mut clamped = false;
        if let SurfaceShape::Procedural(params) = &mut self.shape {
            let (clean, changed) = params.sanitized();
            *params = clean;
            clamped = changed;
        }

        self.bounds = self.compute_bounds();
        self.priority = if self.primary {
            PRIORITY_PRIMARY
        } else if self.bounds.horizontal_extent() > large_extent {
            PRIORITY_LARGE
        } else {
            PRIORITY_BASELINE
        };
        clamped
    }

    fn compute_bounds(&self) -> Bounds {
        match &self.shape {
            SurfaceShape::Mesh { vertices } => Bounds::from_points(vertices)
                .unwrap_or_else(|| Bounds::new(Vec3::zeros(), Vec3::zeros())),
            SurfaceShape::Procedural(p) => Bounds::new(
                Vec3::new(
                    p.center.x - p.half_extents.x,
                    p.floor(),
                    p.center.y - p.half_extents.y,
                ),
                Vec3::new(
                    p.center.x + p.half_extents.x,
                    p.ceiling(),
                    p.center.y + p.half_extents.y,
                ),
            ),
        }
    }

    /// Elevation at (x, z), assuming the point lies inside the footprint.
    #[inline]
    pub fn elevation_at(&self, x: f32, z: f32) -> f32 {
        match &self.shape {
            SurfaceShape::Mesh { .. } => self.bounds.top(),
            SurfaceShape::Procedural(p) => noise::procedural_height(p, x, z),
        }
    }

    /// Elevation used when this surface is the nearest one to a point outside every footprint.
    #[inline]
    pub fn base_elevation(&self) -> f32 {
        self.bounds.min.y
    }
}
