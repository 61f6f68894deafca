/*!
Terrain root module.

Terrain is a prioritized list of surfaces queried for ground elevation:

- surface:  surface shapes, bounds and priority tiers
- noise:    analytic reconstruction of procedural island patches
- registry: the surface list and its change counter
- cache:    TTL cache of sampled elevations
- height:   the query service consumed by collision and movement
*/

pub mod cache;
pub mod height;
pub mod noise;
pub mod registry;
pub mod surface;

pub use height::{GroundSupport, HeightProvider, HeightQueryService, SupportRegion};
pub use registry::TerrainRegistry;
pub use surface::{Bounds, ProceduralParams, SurfaceId, SurfaceShape, TerrainSurface};
