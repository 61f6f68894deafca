use crate::collision::{
    settings::DIST_EPS,
    types::{Vec2, Vec3, up},
};

/// Per-tick input supplied by the input/camera layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveInput {
    /// Movement intent: `x` strafes right, `y` moves forward.
    pub intent: Vec2,
    /// Analog intent keeps its magnitude (clamped to 1); digital intent is on/off per axis.
    pub analog: bool,
    pub run: bool,
    pub jump: bool,
    /// Camera forward in world space. Only its XZ projection is used.
    pub camera_forward: Vec3,
}

impl Default for MoveInput {
    fn default() -> Self {
        Self {
            intent: Vec2::zeros(),
            analog: false,
            run: false,
            jump: false,
            camera_forward: -Vec3::z(),
        }
    }
}

impl MoveInput {
    /// No movement, facing `camera_forward`.
    pub fn idle(camera_forward: Vec3) -> Self {
        Self {
            camera_forward,
            ..Self::default()
        }
    }

    /// Digital intent along the camera's axes.
    pub fn digital(right: f32, forward: f32, camera_forward: Vec3) -> Self {
        Self {
            intent: Vec2::new(right, forward),
            camera_forward,
            ..Self::default()
        }
    }

    /// Analog stick intent along the camera's axes.
    pub fn analog(right: f32, forward: f32, camera_forward: Vec3) -> Self {
        Self {
            intent: Vec2::new(right, forward),
            analog: true,
            camera_forward,
            ..Self::default()
        }
    }

    pub fn with_run(mut self, run: bool) -> Self {
        self.run = run;
        self
    }

    pub fn with_jump(mut self, jump: bool) -> Self {
        self.jump = jump;
        self
    }

    /// World-space planar direction and speed scale for this input.
    ///
    /// Returns `None` when there is no movement intent.
    pub fn world_direction(&self) -> Option<(Vec3, f32)> {
        let (intent, magnitude) = if self.analog {
            let len = self.intent.norm();
            if !len.is_finite() || len <= DIST_EPS {
                return None;
            }
            (self.intent / len, len.min(1.0))
        } else {
            let on = Vec2::new(axis_state(self.intent.x), axis_state(self.intent.y));
            let len = on.norm();
            if len <= DIST_EPS {
                return None;
            }
            (on / len, 1.0)
        };

        let forward = planar_forward(&self.camera_forward);
        let right = forward.cross(&up());
        let dir = right * intent.x + forward * intent.y;
        let len = dir.norm();
        if len <= DIST_EPS {
            return None;
        }
        Some((dir / len, magnitude))
    }
}

/// Digital axis: -1, 0 or 1.
#[inline]
fn axis_state(v: f32) -> f32 {
    if v > DIST_EPS {
        1.0
    } else if v < -DIST_EPS {
        -1.0
    } else {
        0.0
    }
}

/// Camera forward flattened onto XZ, defaulting to -Z when the camera looks straight up or down.
#[inline]
fn planar_forward(camera_forward: &Vec3) -> Vec3 {
    let flat = Vec3::new(camera_forward.x, 0.0, camera_forward.z);
    let len = flat.norm();
    if len.is_finite() && len > DIST_EPS {
        flat / len
    } else {
        -Vec3::z()
    }
}
