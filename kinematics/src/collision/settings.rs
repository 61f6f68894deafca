/*!
Kinematic character controller (KCC) settings and tolerances.

These constants centralize the parameters used by the collision resolver and the
character controller. They are the defaults behind [`crate::config::KinematicsConfig`];
keeping them together makes tuning easier.

Notes
- Distances are in meters, time in seconds.
- Favor practical world-space tolerances over machine epsilon for robust behavior.
*/

/// Separation added along the contact normal to every correction (meters).
/// A corrected body must never sit exactly on the surface, otherwise the next
/// penetration test sees it as touching and the body sticks.
pub const CONTACT_EPSILON: f32 = 0.01;

/// Length of the wall/ceiling proximity rays cast from each capsule sample (meters).
pub const WALL_PROBE_DISTANCE: f32 = 0.1;

/// Practical small distance for comparisons (meters).
pub const DIST_EPS: f32 = 1.0e-6;

/// Minimum upward component for a contact normal to count as ground.
pub const GROUND_NORMAL_MIN_Y: f32 = 0.5;

/// Nominal distance below the capsule's lowest point within which ground is detected (meters).
/// A grounded body keeps its state until the gap exceeds twice this distance.
pub const GROUND_CHECK_DISTANCE: f32 = 0.1;

/// Vertical speed above which the body counts as moving up, which blocks grounding (m/s).
pub const UPWARD_VELOCITY_THRESHOLD: f32 = 0.5;

/// Default capsule radius (meters).
pub const DEFAULT_CAPSULE_RADIUS: f32 = 0.5;

/// Default capsule total height, caps included (meters).
pub const DEFAULT_CAPSULE_HEIGHT: f32 = 2.0;

/// Default walking speed (m/s).
pub const DEFAULT_WALK_SPEED: f32 = 5.0;

/// Default running speed (m/s).
pub const DEFAULT_RUN_SPEED: f32 = 9.0;

/// Vertical speed applied on jump (m/s).
pub const DEFAULT_JUMP_SPEED: f32 = 8.0;

/// Gravity magnitude in meters per second squared (positive value).
pub const GRAVITY_MPS2: f32 = 20.0;

/// Horizontal velocity multiplier applied each tick without movement input.
pub const GROUND_FRICTION: f32 = 0.8;

/// Horizontal velocity multiplier applied each airborne tick.
pub const AIR_RESISTANCE: f32 = 0.98;

/// Horizontal speeds below this are snapped to zero while decaying (m/s).
pub const MIN_HORIZONTAL_SPEED: f32 = 1.0e-3;
