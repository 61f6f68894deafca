/*!
Collision root module.

Volumes are resolved against the terrain height field, with ray probes against
exact-geometry surfaces for wall and ceiling proximity. The code is split for clarity:

- types:        volumes, results and math aliases
- settings:     tolerances and controller defaults
- narrow_phase: thin wrappers over parry3d ray queries
- resolver:     volume-vs-terrain penetration and correction
- objects:      registry of collidable bodies and their gravity step
*/

pub mod narrow_phase;
pub mod objects;
pub mod resolver;
pub mod settings;
pub mod types;

// Re-export commonly used types.
pub use objects::{BodyHandle, BodyKind, CollidableObject, CollisionWorld, ObjectId};
pub use resolver::{Resolver, TerrainResolver};
pub use types::{CollisionResult, CollisionVolume, Quat, Vec2, Vec3, VolumeShape};
