//! The prioritized set of terrain surfaces.
//!
//! Every mutating call bumps [`TerrainRegistry::generation`]. The height service
//! compares generations before answering and drops its cache on any change, so the
//! registry never has to know about the cache.

use crate::{
    constants::LARGE_SURFACE_EXTENT,
    logging::Logger,
    terrain::surface::{SurfaceId, SurfaceShape, TerrainSurface},
};

#[derive(Debug)]
pub struct TerrainRegistry {
    surfaces: Vec<TerrainSurface>,
    generation: u64,
    large_surface_extent: f32,
    logger: Logger,
}

impl TerrainRegistry {
    pub fn new(logger: Logger) -> Self {
        Self::with_large_extent(LARGE_SURFACE_EXTENT, logger)
    }

    pub fn with_large_extent(large_surface_extent: f32, logger: Logger) -> Self {
        Self {
            surfaces: Vec::new(),
            generation: 0,
            large_surface_extent,
            logger,
        }
    }

    /// Replace the full surface list.
    ///
    /// Bounds and priorities are recomputed and the list is sorted by descending
    /// priority (registration order is kept among equal priorities).
    pub fn register(&mut self, surfaces: Vec<TerrainSurface>) {
        self.surfaces = surfaces;
        if self.surfaces.is_empty() {
            self.logger.warn(format_args!(
                "no terrain surfaces registered; height queries fall back to sea level"
            ));
        }
        self.recompute_all();
        self.logger.info(format_args!(
            "registered {} terrain surface(s)",
            self.surfaces.len()
        ));
    }

    /// Recompute bounds and priority of every surface without changing membership.
    pub fn refresh(&mut self) {
        self.recompute_all();
    }

    /// Recompute bounds and priority of one surface.
    ///
    /// Returns `false` (and changes nothing) if `id` is not registered.
    pub fn refresh_surface(&mut self, id: SurfaceId) -> bool {
        let large = self.large_surface_extent;
        let Some(surface) = self.surfaces.iter_mut().find(|s| s.id == id) else {
            self.logger
                .debug(format_args!("refresh of unknown terrain surface {:?}", id));
            return false;
        };

        if surface.recompute(large) {
            self.logger.warn(format_args!(
                "terrain surface {:?} had out-of-range procedural parameters; clamped",
                id
            ));
        }
        self.sort();
        self.generation += 1;
        true
    }

    /// Remove one surface.
    pub fn unregister(&mut self, id: SurfaceId) -> Option<TerrainSurface> {
        let index = self.surfaces.iter().position(|s| s.id == id)?;
        let removed = self.surfaces.remove(index);
        self.generation += 1;
        if self.surfaces.is_empty() {
            self.logger.warn(format_args!(
                "last terrain surface removed; height queries fall back to sea level"
            ));
        }
        Some(removed)
    }

    /// Mutable access to a surface's shape, for the terrain generator.
    ///
    /// Derived data (bounds, priority) and cached heights stay stale until
    /// [`refresh_surface`](Self::refresh_surface) or [`refresh`](Self::refresh) is called.
    pub fn shape_mut(&mut self, id: SurfaceId) -> Option<&mut SurfaceShape> {
        self.surfaces
            .iter_mut()
            .find(|s| s.id == id)
            .map(|s| &mut s.shape)
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&TerrainSurface> {
        self.surfaces.iter().find(|s| s.id == id)
    }

    /// Surfaces in descending priority order.
    #[inline]
    pub fn surfaces(&self) -> &[TerrainSurface] {
        &self.surfaces
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Counter bumped by every mutating call.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    fn recompute_all(&mut self) {
        let large = self.large_surface_extent;
        for surface in &mut self.surfaces {
            if surface.recompute(large) {
                self.logger.warn(format_args!(
                    "terrain surface {:?} had out-of-range procedural parameters; clamped",
                    surface.id
                ));
            }
        }
        self.sort();
        self.generation += 1;
    }

    fn sort(&mut self) {
        // Stable: equal priorities keep registration order.
        self.surfaces
            .sort_by(|a, b| b.priority().cmp(&a.priority()));
    }
}
