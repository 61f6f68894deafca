//! Ground elevation queries.
//!
//! `HeightQueryService` owns the [`TerrainRegistry`] and a [`HeightCache`]. Queries
//! take `&self`: the cache sits behind a `RefCell`, which is sound because the whole
//! subsystem runs on the simulation thread and terrain is only mutated between
//! ticks through the `&mut self` registry calls below.

use std::{
    cell::{Cell, RefCell},
    time::Instant,
};

use crate::{
    collision::{
        narrow_phase::cast_ray_against_box,
        types::{Vec2, Vec3, up},
    },
    config::TerrainSettings,
    logging::Logger,
    quantize::quantize_xz,
    terrain::{
        cache::HeightCache,
        registry::TerrainRegistry,
        surface::{SurfaceId, SurfaceShape, TerrainSurface},
    },
};

/// Anything that can answer "how high is the ground at (x, z)?".
pub trait HeightProvider {
    /// Ground elevation at (x, z). Never fails.
    fn height(&self, x: f32, z: f32) -> f32;

    /// Distance along `dir` from `origin` to the nearest solid terrain edge within
    /// `max_distance`, for wall/ceiling proximity tests.
    ///
    /// Providers without edge geometry report nothing.
    fn cast_wall_ray(&self, _origin: &Vec3, _dir: &Vec3, _max_distance: f32) -> Option<f32> {
        None
    }

    /// Exact ground under (x, z) and where that elevation may be reused.
    ///
    /// Unlike [`height`](Self::height) this never answers from a cache, so it is
    /// the one to use when deciding whether a body still stands on something.
    fn support(&self, x: f32, z: f32) -> GroundSupport {
        GroundSupport {
            elevation: self.height(x, z),
            region: SupportRegion::Unbounded,
        }
    }
}

/// Planar region over which a sampled ground elevation stays valid as a flat plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SupportRegion {
    /// No footprints to leave: a plain height field or the sea-level fallback.
    Unbounded,
    /// Footprint of the surface that supplied the elevation (edges inclusive).
    Footprint { min: Vec2, max: Vec2 },
    /// Off every footprint. The elevation is a fallback and holds nowhere else.
    Fallback,
}

impl SupportRegion {
    #[inline]
    pub fn contains_xz(&self, x: f32, z: f32) -> bool {
        match self {
            SupportRegion::Unbounded => true,
            SupportRegion::Footprint { min, max } => {
                x >= min.x && x <= max.x && z >= min.y && z <= max.y
            }
            SupportRegion::Fallback => false,
        }
    }
}

/// Result of [`HeightProvider::support`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundSupport {
    pub elevation: f32,
    pub region: SupportRegion,
}

/// Cached height lookups over the registered terrain.
#[derive(Debug)]
pub struct HeightQueryService {
    registry: TerrainRegistry,
    cache: RefCell<HeightCache>,
    seen_generation: Cell<u64>,
    settings: TerrainSettings,
    /// Set once the empty-registry fallback has been reported for the current generation.
    fallback_reported: Cell<bool>,
    logger: Logger,
}

impl HeightQueryService {
    pub fn new(settings: TerrainSettings, logger: Logger) -> Self {
        let registry = TerrainRegistry::with_large_extent(
            settings.large_surface_extent,
            logger.scoped("kinematics::terrain::registry"),
        );
        Self {
            cache: RefCell::new(HeightCache::new(
                settings.cache_ttl(),
                settings.cache_max_entries,
            )),
            seen_generation: Cell::new(registry.generation()),
            registry,
            settings,
            fallback_reported: Cell::new(false),
            logger,
        }
    }

    /// Service with default settings logging to the global `log` backend.
    pub fn with_defaults() -> Self {
        Self::new(
            TerrainSettings::default(),
            Logger::global("kinematics::terrain::height"),
        )
    }

    pub fn registry(&self) -> &TerrainRegistry {
        &self.registry
    }

    /// Replace all terrain surfaces.
    pub fn register_terrain(&mut self, surfaces: Vec<TerrainSurface>) {
        self.registry.register(surfaces);
    }

    /// Recompute every surface's bounds after shape changes.
    pub fn refresh_terrain(&mut self) {
        self.registry.refresh();
    }

    /// Recompute one surface's bounds. Returns `false` for an unknown id.
    pub fn refresh_surface(&mut self, id: SurfaceId) -> bool {
        self.registry.refresh_surface(id)
    }

    pub fn unregister_surface(&mut self, id: SurfaceId) -> Option<TerrainSurface> {
        self.registry.unregister(id)
    }

    /// Generator-side mutation point; call [`refresh_surface`](Self::refresh_surface) afterwards.
    pub fn shape_mut(&mut self, id: SurfaceId) -> Option<&mut SurfaceShape> {
        self.registry.shape_mut(id)
    }

    /// Number of live or stale entries currently cached.
    pub fn cached_entries(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Ground elevation at (x, z) as of `now`.
    pub fn height_at(&self, x: f32, z: f32, now: Instant) -> f32 {
        self.sync_generation();

        let key = quantize_xz(x, z, self.settings.cache_quantum);
        if let Some(elevation) = self.cache.borrow().get(key, now) {
            return elevation;
        }

        let elevation = self.sample(x, z);
        let pruned = self.cache.borrow_mut().insert(key, elevation, now);
        if pruned > 0 {
            self.logger
                .debug(format_args!("pruned {pruned} stale height cache entries"));
        }
        elevation
    }

    /// Approximate surface normal at (x, z) from central differences of the height field.
    pub fn ground_normal(&self, x: f32, z: f32) -> Vec3 {
        let now = Instant::now();
        let s = self.settings.cache_quantum.max(1.0e-3);
        let dx = self.height_at(x - s, z, now) - self.height_at(x + s, z, now);
        let dz = self.height_at(x, z - s, now) - self.height_at(x, z + s, now);
        let n = Vec3::new(dx, 2.0 * s, dz);
        let len = n.norm();
        if len > 1.0e-12 { n / len } else { up() }
    }

    fn sync_generation(&self) {
        let generation = self.registry.generation();
        if self.seen_generation.get() != generation {
            self.cache.borrow_mut().clear();
            self.seen_generation.set(generation);
            self.fallback_reported.set(false);
            self.logger
                .debug(format_args!("terrain changed; height cache invalidated"));
        }
    }

    /// Uncached elevation.
    #[inline]
    fn sample(&self, x: f32, z: f32) -> f32 {
        self.sample_support(x, z).elevation
    }

    fn sample_support(&self, x: f32, z: f32) -> GroundSupport {
        let surfaces = self.registry.surfaces();
        if surfaces.is_empty() {
            if !self.fallback_reported.replace(true) {
                self.logger.warn(format_args!(
                    "no terrain registered; using default sea level {}",
                    self.settings.default_sea_level
                ));
            }
            return GroundSupport {
                elevation: self.settings.default_sea_level,
                region: SupportRegion::Unbounded,
            };
        }

        // Overlapping surfaces: the highest wins. Earlier (higher priority) entries
        // keep ties.
        let mut best: Option<(&TerrainSurface, f32)> = None;
        for s in surfaces.iter().filter(|s| s.bounds().contains_xz(x, z)) {
            let e = s.elevation_at(x, z);
            if best.is_none_or(|(_, b)| e > b) {
                best = Some((s, e));
            }
        }
        if let Some((s, elevation)) = best {
            let b = s.bounds();
            return GroundSupport {
                elevation,
                region: SupportRegion::Footprint {
                    min: Vec2::new(b.min.x, b.min.z),
                    max: Vec2::new(b.max.x, b.max.z),
                },
            };
        }

        // Outside every footprint: nearest surface, ties going to the higher priority.
        let mut nearest: Option<(&TerrainSurface, f32)> = None;
        for s in surfaces {
            let d = s.bounds().planar_distance_sq(x, z);
            if nearest.is_none_or(|(_, best)| d < best) {
                nearest = Some((s, d));
            }
        }
        GroundSupport {
            elevation: nearest
                .map(|(s, _)| s.base_elevation())
                .unwrap_or(self.settings.default_sea_level),
            region: SupportRegion::Fallback,
        }
    }
}

impl HeightProvider for HeightQueryService {
    #[inline]
    fn height(&self, x: f32, z: f32) -> f32 {
        self.height_at(x, z, Instant::now())
    }

    fn support(&self, x: f32, z: f32) -> GroundSupport {
        self.sync_generation();
        self.sample_support(x, z)
    }

    /// Only exact-geometry surfaces have edges. Surfaces that already contain the
    /// origin are skipped; that overlap is a vertical penetration, not a wall.
    fn cast_wall_ray(&self, origin: &Vec3, dir: &Vec3, max_distance: f32) -> Option<f32> {
        self.registry
            .surfaces()
            .iter()
            .filter(|s| !s.is_procedural())
            .filter(|s| !s.bounds().contains(origin))
            .filter_map(|s| {
                let b = s.bounds();
                cast_ray_against_box(origin, dir, max_distance, &b.min, &b.max)
            })
            .reduce(f32::min)
    }
}
