pub mod collision;
pub mod config;
pub mod constants;
pub mod logging;
pub mod movement;
pub mod quantize;
pub mod terrain;

pub use collision::{
    CollisionResult, CollisionVolume, CollisionWorld, Resolver, TerrainResolver, Vec2, Vec3,
    VolumeShape,
};
pub use config::{ConfigError, KinematicsConfig};
pub use constants::{DEFAULT_SEA_LEVEL, HEIGHT_CACHE_QUANTUM, HEIGHT_CACHE_TTL};
pub use logging::Logger;
pub use movement::{CharacterController, GroundMode, MoveInput, PlayerState};
pub use terrain::{
    HeightProvider, HeightQueryService, ProceduralParams, SurfaceId, SurfaceShape, TerrainSurface,
};
