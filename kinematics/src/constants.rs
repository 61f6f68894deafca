use std::time::Duration;

/// Elevation reported when no terrain is registered (meters).
///
/// This is the scene's sea level. Height queries never fail; with an empty registry
/// every query resolves to this value.
pub const DEFAULT_SEA_LEVEL: f32 = 0.0;

/// Quantization step for height cache keys (meters).
///
/// Queries whose (x, z) round to the same multiple of this step share one cache entry.
pub const HEIGHT_CACHE_QUANTUM: f32 = 0.2;

/// How long a cached height stays valid.
pub const HEIGHT_CACHE_TTL: Duration = Duration::from_secs(1);

/// Entry count above which the height cache prunes stale entries.
///
/// Pruning removes entries older than twice the TTL.
pub const HEIGHT_CACHE_MAX_ENTRIES: usize = 4096;

/// Priority assigned to the surface flagged as primary terrain.
pub const PRIORITY_PRIMARY: i32 = 100;

/// Priority assigned to surfaces whose horizontal extent exceeds [`LARGE_SURFACE_EXTENT`].
pub const PRIORITY_LARGE: i32 = 50;

/// Priority assigned to every other surface.
pub const PRIORITY_BASELINE: i32 = 0;

/// Horizontal extent (meters, along X or Z) above which a surface counts as "large".
pub const LARGE_SURFACE_EXTENT: f32 = 100.0;

/// How often collision and ground checks are re-evaluated by the controller.
///
/// Ticks that arrive faster than this reuse the last known ground elevation.
pub const COLLISION_CHECK_INTERVAL: Duration = Duration::from_millis(32);

/// Number of octaves summed by the procedural height function.
pub const NOISE_OCTAVES: u32 = 3;
