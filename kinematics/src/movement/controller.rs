/*!
Player character controller.

One `tick` per simulation frame:

1. Input becomes a camera-relative planar direction.
2. Horizontal velocity is set from input, or decays by ground friction without it.
3. A grounded jump request with the latch available launches the body.
4. Airborne bodies accelerate under gravity and lose horizontal speed to air resistance.
5. The candidate position `position + velocity * dt` is resolved against terrain.
   Ground hits land the body. Wall hits and misses re-evaluate ground contact
   against the exact ground under the body through a hysteresis band, so the state
   does not chatter near the ground.

Collision checks are throttled to `check_interval_secs`. Ticks in between treat the
last known ground elevation as a flat plane, but only while the body stays over the
footprint that elevation came from.
*/

use crate::{
    collision::{
        resolver::Resolver,
        settings::{DIST_EPS, MIN_HORIZONTAL_SPEED},
        types::{CollisionVolume, Vec3},
    },
    config::{ControllerSettings, KinematicsConfig},
    logging::Logger,
    terrain::height::{GroundSupport, HeightProvider},
};

use super::{
    input::MoveInput,
    state::{GroundBand, GroundMode, PlayerState},
};

#[derive(Debug)]
pub struct CharacterController {
    settings: ControllerSettings,
    contact_epsilon: f32,
    state: PlayerState,
    mode: GroundMode,
    /// Seconds accumulated since the last full collision check.
    since_check: f32,
    /// Ground found by the last full check.
    support: Option<GroundSupport>,
    logger: Logger,
}

impl CharacterController {
    pub fn new(
        settings: ControllerSettings,
        contact_epsilon: f32,
        spawn: Vec3,
        logger: Logger,
    ) -> Self {
        Self {
            settings,
            contact_epsilon,
            state: PlayerState::at(spawn),
            mode: GroundMode::Airborne,
            since_check: 0.0,
            support: None,
            logger,
        }
    }

    pub fn from_config(config: &KinematicsConfig, spawn: Vec3, logger: Logger) -> Self {
        Self::new(
            config.controller.clone(),
            config.collision.contact_epsilon,
            spawn,
            logger,
        )
    }

    #[inline]
    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    #[inline]
    pub fn mode(&self) -> GroundMode {
        self.mode
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Capsule volume at the current position.
    pub fn volume(&self) -> CollisionVolume {
        CollisionVolume::capsule(
            self.settings.capsule_radius,
            self.settings.capsule_height,
            self.state.position,
        )
    }

    /// Move the body without integrating, e.g. on respawn. The body starts falling.
    pub fn teleport(&mut self, position: Vec3) {
        self.state = PlayerState {
            position,
            velocity: Vec3::zeros(),
            jump_available: self.state.jump_available,
            ..PlayerState::at(position)
        };
        self.set_mode(GroundMode::Airborne);
        self.support = None;
        self.since_check = 0.0;
    }

    fn band(&self) -> GroundBand {
        GroundBand {
            check_distance: self.settings.ground_check_distance,
            upward_velocity_threshold: self.settings.upward_velocity_threshold,
        }
    }

    fn set_mode(&mut self, mode: GroundMode) {
        if self.mode != mode {
            self.logger.debug(format_args!(
                "ground state {:?} -> {:?} at {:?}",
                self.mode, mode, self.state.position
            ));
            self.mode = mode;
        }
    }

    /// Advance the body by `dt` seconds.
    pub fn tick<R, H>(
        &mut self,
        dt: f32,
        input: &MoveInput,
        resolver: &R,
        terrain: &H,
    ) -> PlayerState
    where
        R: Resolver + ?Sized,
        H: HeightProvider + ?Sized,
    {
        if !dt.is_finite() || dt <= 0.0 {
            return self.state;
        }

        let s = &self.settings;
        let mut velocity = self.state.velocity;

        // Horizontal velocity from input, or friction decay.
        let direction = input.world_direction();
        match direction {
            Some((dir, magnitude)) => {
                let speed = if input.run { s.run_speed } else { s.walk_speed };
                velocity.x = dir.x * speed * magnitude;
                velocity.z = dir.z * speed * magnitude;
            }
            None => {
                velocity.x *= s.ground_friction;
                velocity.z *= s.ground_friction;
                if velocity.x.hypot(velocity.z) < MIN_HORIZONTAL_SPEED {
                    velocity.x = 0.0;
                    velocity.z = 0.0;
                }
            }
        }

        // Jump latch resets once grounded with the button released.
        if self.mode == GroundMode::Grounded && !input.jump {
            self.state.jump_available = true;
        }
        if self.mode == GroundMode::Grounded && input.jump && self.state.jump_available {
            velocity.y = s.jump_speed;
            self.state.jump_available = false;
            self.set_mode(GroundMode::Airborne);
        }

        let s = &self.settings;
        if self.mode == GroundMode::Airborne {
            velocity.y -= s.gravity * dt;
            velocity.x *= s.air_resistance;
            velocity.z *= s.air_resistance;
        }

        let candidate = self.state.position + velocity * dt;

        self.since_check += dt;
        let (position, velocity) = match self.support {
            Some(support)
                if self.since_check < self.settings.check_interval_secs
                    && support.region.contains_xz(candidate.x, candidate.z) =>
            {
                self.settle_on_plane(candidate, velocity, support.elevation)
            }
            _ => {
                self.since_check = 0.0;
                self.full_check(candidate, velocity, resolver, terrain)
            }
        };

        self.state.position = position;
        self.state.velocity = velocity;
        self.state.grounded = self.mode == GroundMode::Grounded;
        self.state.moving = direction.is_some();
        self.state.running = direction.is_some() && input.run;
        self.state
    }

    fn full_check<R, H>(
        &mut self,
        candidate: Vec3,
        mut velocity: Vec3,
        resolver: &R,
        terrain: &H,
    ) -> (Vec3, Vec3)
    where
        R: Resolver + ?Sized,
        H: HeightProvider + ?Sized,
    {
        let volume = CollisionVolume::capsule(
            self.settings.capsule_radius,
            self.settings.capsule_height,
            candidate,
        );
        let res = resolver.resolve(&volume, candidate);

        let mut position = candidate;
        if res.hit {
            position = res.corrected;
            if res.normal.y > self.settings.ground_normal_min_y {
                velocity.y = velocity.y.max(0.0);
                self.support = Some(terrain.support(position.x, position.z));
                self.set_mode(GroundMode::Grounded);
                return (position, velocity);
            }
            // Wall or ceiling: drop only the component moving into the surface.
            let into = velocity.dot(&res.normal);
            if into < 0.0 {
                velocity -= res.normal * into;
            }
        }

        // Ground presence comes from an exact lookup, never a cached cell.
        let support = terrain.support(position.x, position.z);
        self.support = Some(support);
        self.settle_on_plane(position, velocity, support.elevation)
    }

    /// Resolve `candidate` against a flat ground plane at `ground`.
    fn settle_on_plane(
        &mut self,
        candidate: Vec3,
        mut velocity: Vec3,
        ground: f32,
    ) -> (Vec3, Vec3) {
        let r = self.settings.capsule_radius;
        let eps = self.contact_epsilon;
        let mut position = candidate;
        let gap = candidate.y - r - ground;

        if gap < -DIST_EPS {
            position.y = ground + r + eps;
            velocity.y = velocity.y.max(0.0);
            self.set_mode(GroundMode::Grounded);
            return (position, velocity);
        }

        let mode = self.band().evaluate(self.mode, gap, velocity.y);
        self.set_mode(mode);
        if mode == GroundMode::Grounded {
            // Snap down so slopes are walked without hopping.
            if gap > eps {
                position.y = ground + r + eps;
            }
            velocity.y = velocity.y.max(0.0);
        }
        (position, velocity)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{
        collision::{resolver::TerrainResolver, types::Vec2},
        config::TerrainSettings,
        logging::capture::CaptureLog,
        terrain::{HeightQueryService, SurfaceId, TerrainSurface},
    };

    const DT: f32 = 0.05;
    /// One render frame at 60 Hz, shorter than the collision check interval.
    const FRAME: f32 = 1.0 / 60.0;

    fn heights(surfaces: Vec<TerrainSurface>) -> HeightQueryService {
        let (_, logger) = CaptureLog::logger("terrain");
        let mut heights = HeightQueryService::new(TerrainSettings::default(), logger);
        heights.register_terrain(surfaces);
        heights
    }

    fn flat_ground(top: f32) -> TerrainSurface {
        TerrainSurface::slab(
            SurfaceId(1),
            Vec2::new(-500.0, -500.0),
            Vec2::new(500.0, 500.0),
            top - 1.0,
            top,
        )
        .as_primary()
    }

    fn controller(spawn: Vec3) -> CharacterController {
        let (_, logger) = CaptureLog::logger("controller");
        CharacterController::from_config(&KinematicsConfig::default(), spawn, logger)
    }

    fn run<H: HeightProvider>(
        controller: &mut CharacterController,
        terrain: &H,
        input: &MoveInput,
        ticks: usize,
    ) -> PlayerState {
        run_at(DT, controller, terrain, input, ticks)
    }

    fn run_at<H: HeightProvider>(
        dt: f32,
        controller: &mut CharacterController,
        terrain: &H,
        input: &MoveInput,
        ticks: usize,
    ) -> PlayerState {
        let resolver = TerrainResolver::with_defaults(terrain);
        let mut state = *controller.state();
        for _ in 0..ticks {
            state = controller.tick(dt, input, &resolver, terrain);
        }
        state
    }

    fn patch(top: f32) -> TerrainSurface {
        TerrainSurface::slab(
            SurfaceId(2),
            Vec2::new(-5.0, -5.0),
            Vec2::new(5.0, 5.0),
            top - 4.0,
            top,
        )
    }

    #[test]
    fn starts_airborne() {
        let c = controller(Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(c.mode(), GroundMode::Airborne);
        assert!(!c.state().grounded);
    }

    #[test]
    fn falling_body_comes_to_rest_on_flat_ground() {
        let terrain = heights(vec![flat_ground(0.0)]);
        let mut c = controller(Vec3::new(0.0, 5.0, 0.0));

        let state = run(&mut c, &terrain, &MoveInput::default(), 60);
        assert_abs_diff_eq!(state.position.y, 0.5, epsilon = 0.05);
        assert!(state.feet(0.5) >= 0.0);
        assert!(state.grounded);
        assert_eq!(c.mode(), GroundMode::Grounded);
        assert_abs_diff_eq!(state.velocity.y, 0.0);
    }

    #[test]
    fn grounded_body_stays_put_over_many_ticks() {
        let terrain = heights(vec![flat_ground(2.0)]);
        let mut c = controller(Vec3::new(3.0, 4.0, -1.0));
        run(&mut c, &terrain, &MoveInput::default(), 40);

        let resolver = TerrainResolver::with_defaults(&terrain);
        for _ in 0..100 {
            let state = c.tick(DT, &MoveInput::default(), &resolver, &terrain);
            assert!(state.grounded);
            assert!(state.feet(0.5) >= 2.0);
            assert_abs_diff_eq!(state.position.y, 2.5, epsilon = 0.05);
        }
    }

    #[test]
    fn walking_past_a_patch_edge_is_airborne_immediately() {
        // Slab top at 3, footprint ends at x = 5; nothing else under it.
        let patch = TerrainSurface::slab(
            SurfaceId(1),
            Vec2::new(-5.0, -5.0),
            Vec2::new(5.0, 5.0),
            -1.0,
            3.0,
        );
        let terrain = heights(vec![patch]);
        let mut c = controller(Vec3::new(4.0, 3.6, 0.0));
        let resolver = TerrainResolver::with_defaults(&terrain);

        for _ in 0..10 {
            c.tick(DT, &MoveInput::default(), &resolver, &terrain);
        }
        assert!(c.state().grounded);

        let walk = MoveInput::digital(1.0, 0.0, -Vec3::z());
        let mut was_over_patch = true;
        for _ in 0..20 {
            let state = c.tick(DT, &walk, &resolver, &terrain);
            if was_over_patch && state.position.x > 5.0 {
                assert!(!state.grounded, "still grounded past the edge at {:?}", state.position);
                assert_eq!(c.mode(), GroundMode::Airborne);
                return;
            }
            was_over_patch = state.position.x <= 5.0;
            assert!(state.grounded);
        }
        panic!("never reached the edge");
    }

    #[test]
    fn walking_off_a_patch_at_frame_rate_drops_on_the_next_tick() {
        // A lone patch, and the same patch raised over open ground.
        let scenes = [vec![patch(3.0)], vec![flat_ground(0.0), patch(3.0)]];
        for surfaces in scenes {
            let terrain = heights(surfaces);
            let mut c = controller(Vec3::new(4.0, 3.6, 0.0));
            let settled = run_at(FRAME, &mut c, &terrain, &MoveInput::idle(Vec3::x()), 30);
            assert!(settled.grounded);

            let resolver = TerrainResolver::with_defaults(&terrain);
            let walk = MoveInput::digital(0.0, 1.0, Vec3::x());
            let mut left_patch = false;
            for i in 0..40 {
                let state = c.tick(FRAME, &walk, &resolver, &terrain);
                if state.position.x > 5.0 {
                    assert!(!state.grounded, "grounded past the edge on tick {i}: {state:?}");
                    left_patch = true;
                    break;
                }
                assert!(state.grounded, "dropped before the edge on tick {i}: {state:?}");
            }
            assert!(left_patch, "never reached the edge");
        }
    }

    #[test]
    fn pressing_into_a_wall_keeps_the_body_grounded() {
        let wall = TerrainSurface::slab(
            SurfaceId(2),
            Vec2::new(2.0, -5.0),
            Vec2::new(3.0, 5.0),
            0.0,
            6.0,
        );
        let terrain = heights(vec![flat_ground(0.0), wall]);
        let mut c = controller(Vec3::new(0.0, 0.6, 0.0));
        run_at(FRAME, &mut c, &terrain, &MoveInput::idle(Vec3::x()), 20);

        let resolver = TerrainResolver::with_defaults(&terrain);
        let walk = MoveInput::digital(0.0, 1.0, Vec3::x());
        for i in 0..90 {
            let state = c.tick(FRAME, &walk, &resolver, &terrain);
            assert!(state.grounded, "left the ground on tick {i}: {state:?}");
            assert_abs_diff_eq!(state.velocity.y, 0.0);
        }
        let pressed = c.state().position;
        assert!(pressed.x > 1.2 && pressed.x < 1.7, "not held at the wall: {pressed:?}");
        assert_abs_diff_eq!(pressed.y, 0.51, epsilon = 0.02);

        let jump = c.tick(FRAME, &walk.with_jump(true), &resolver, &terrain);
        assert!(!jump.grounded);
        assert!(jump.velocity.y > 0.0);
    }

    #[test]
    fn walking_over_small_bumps_never_leaves_the_ground() {
        struct Bumps;
        impl HeightProvider for Bumps {
            fn height(&self, x: f32, _z: f32) -> f32 {
                0.04 * (3.0 * x).sin()
            }
        }

        let mut c = controller(Vec3::new(0.0, 0.6, 0.0));
        run_at(FRAME, &mut c, &Bumps, &MoveInput::default(), 30);
        assert!(c.state().grounded);

        let resolver = TerrainResolver::with_defaults(&Bumps);
        let walk = MoveInput::digital(1.0, 0.0, -Vec3::z());
        for i in 0..240 {
            let state = c.tick(FRAME, &walk, &resolver, &Bumps);
            assert!(state.grounded, "chattered on tick {i}: {state:?}");
            assert!(state.feet(0.5) >= Bumps.height(state.position.x, 0.0) - 0.1);
        }
    }

    #[test]
    fn jump_fires_once_per_latch_reset() {
        let terrain = heights(vec![flat_ground(0.0)]);
        let mut c = controller(Vec3::new(0.0, 0.6, 0.0));
        run(&mut c, &terrain, &MoveInput::default(), 10);
        assert!(c.state().grounded);

        let resolver = TerrainResolver::with_defaults(&terrain);
        let hold = MoveInput::default().with_jump(true);
        let launched = c.tick(DT, &hold, &resolver, &terrain);
        assert!(!launched.grounded);
        assert!(launched.velocity.y > 0.0);
        assert!(!launched.jump_available);

        // Holding jump through the flight and the landing never relaunches.
        let mut landed_at = None;
        for i in 0..60 {
            let state = c.tick(DT, &hold, &resolver, &terrain);
            if state.grounded {
                landed_at.get_or_insert(i);
                assert!(state.velocity.y <= 0.0 + DIST_EPS);
            }
        }
        assert!(landed_at.is_some());
        assert!(c.state().grounded);

        // Release, then press again.
        c.tick(DT, &MoveInput::default(), &resolver, &terrain);
        assert!(c.state().jump_available);
        let again = c.tick(DT, &hold, &resolver, &terrain);
        assert!(again.velocity.y > 0.0);
    }

    #[test]
    fn jump_while_airborne_does_not_touch_vertical_velocity() {
        let terrain = heights(vec![flat_ground(0.0)]);
        let mut c = controller(Vec3::new(0.0, 20.0, 0.0));
        let resolver = TerrainResolver::with_defaults(&terrain);

        let before = c.tick(DT, &MoveInput::default(), &resolver, &terrain);
        let after = c.tick(DT, &MoveInput::default().with_jump(true), &resolver, &terrain);
        let gravity = c.settings().gravity;
        assert_abs_diff_eq!(after.velocity.y, before.velocity.y - gravity * DT, epsilon = 1e-4);
    }

    #[test]
    fn walk_and_run_set_horizontal_speed_and_friction_decays_it() {
        let terrain = heights(vec![flat_ground(0.0)]);
        let mut c = controller(Vec3::new(0.0, 0.6, 0.0));
        run(&mut c, &terrain, &MoveInput::default(), 10);

        let forward = MoveInput::digital(0.0, 1.0, -Vec3::z());
        let walking = run(&mut c, &terrain, &forward, 3);
        assert_abs_diff_eq!(walking.velocity.z, -5.0, epsilon = 1e-4);
        assert!(walking.moving && !walking.running);

        let running = run(&mut c, &terrain, &forward.with_run(true), 1);
        assert_abs_diff_eq!(running.velocity.z, -9.0, epsilon = 1e-4);
        assert!(running.running);

        let coasting = run(&mut c, &terrain, &MoveInput::default(), 1);
        assert_abs_diff_eq!(coasting.velocity.z, -9.0 * 0.8, epsilon = 1e-4);
        assert!(!coasting.moving);

        let stopped = run(&mut c, &terrain, &MoveInput::default(), 80);
        assert_eq!(stopped.velocity.z, 0.0);
        assert!(stopped.grounded);
    }

    #[test]
    fn analog_input_scales_speed() {
        let terrain = heights(vec![flat_ground(0.0)]);
        let mut c = controller(Vec3::new(0.0, 0.6, 0.0));
        run(&mut c, &terrain, &MoveInput::default(), 10);

        let half = MoveInput::analog(0.5, 0.0, -Vec3::z());
        let state = run(&mut c, &terrain, &half, 2);
        assert_abs_diff_eq!(state.velocity.x, 2.5, epsilon = 1e-4);
    }

    #[test]
    fn fast_ticks_reuse_the_last_ground_between_checks() {
        let terrain = heights(vec![flat_ground(0.0)]);
        let mut c = controller(Vec3::new(0.0, 0.6, 0.0));
        run(&mut c, &terrain, &MoveInput::default(), 10);

        struct Panics;
        impl Resolver for Panics {
            fn resolve(
                &self,
                _: &CollisionVolume,
                _: Vec3,
            ) -> crate::collision::types::CollisionResult {
                panic!("collision check inside the throttle window");
            }
        }

        // 10 ms ticks: the last full check just ran, so the next two are throttled.
        let state = c.tick(0.01, &MoveInput::default(), &Panics, &terrain);
        assert!(state.grounded);
        let state = c.tick(0.01, &MoveInput::default(), &Panics, &terrain);
        assert!(state.grounded);
        assert_abs_diff_eq!(state.position.y, 0.5, epsilon = 0.05);
    }

    #[test]
    fn empty_terrain_still_integrates_onto_sea_level() {
        let terrain = heights(Vec::new());
        let mut c = controller(Vec3::new(0.0, 3.0, 0.0));

        let state = run(&mut c, &terrain, &MoveInput::default(), 40);
        assert!(state.grounded);
        assert_abs_diff_eq!(state.position.y, 0.5, epsilon = 0.05);
    }

    #[test]
    fn side_contact_removes_velocity_into_the_wall() {
        let ground = flat_ground(0.0);
        let wall = TerrainSurface::slab(
            SurfaceId(2),
            Vec2::new(2.0, -5.0),
            Vec2::new(3.0, 5.0),
            0.0,
            6.0,
        );
        let terrain = heights(vec![ground, wall]);
        let mut c = controller(Vec3::new(0.0, 0.6, 0.0));
        run(&mut c, &terrain, &MoveInput::default(), 10);

        let into_wall = MoveInput::digital(1.0, 0.0, -Vec3::z());
        let state = run(&mut c, &terrain, &into_wall, 40);
        assert!(state.position.x < 2.0 - 0.5 + 0.1, "walked into the wall: {:?}", state.position);
    }

    #[test]
    fn teleport_resets_to_airborne() {
        let terrain = heights(vec![flat_ground(0.0)]);
        let mut c = controller(Vec3::new(0.0, 0.6, 0.0));
        run(&mut c, &terrain, &MoveInput::default(), 10);
        assert_eq!(c.mode(), GroundMode::Grounded);

        c.teleport(Vec3::new(10.0, 8.0, 10.0));
        assert_eq!(c.mode(), GroundMode::Airborne);
        assert_eq!(c.state().position, Vec3::new(10.0, 8.0, 10.0));
        assert_eq!(c.volume().position, Vec3::new(10.0, 8.0, 10.0));
    }
}
