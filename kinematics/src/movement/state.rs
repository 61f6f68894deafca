use crate::collision::types::Vec3;

/// Ground contact state of the controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GroundMode {
    Grounded,
    /// Initial state, so the first tick pulls the body onto terrain.
    #[default]
    Airborne,
}

/// Snapshot of the controlled body, returned by every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerState {
    /// Center of the capsule's lower hemisphere (world space).
    pub position: Vec3,
    pub velocity: Vec3,
    pub grounded: bool,
    /// Whether the next jump request on the ground will be honoured.
    pub jump_available: bool,
    pub moving: bool,
    pub running: bool,
}

impl PlayerState {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::zeros(),
            grounded: false,
            jump_available: true,
            moving: false,
            running: false,
        }
    }

    /// Where the rendering layer places the visual body: the capsule's middle.
    #[inline]
    pub fn render_position(&self, radius: f32, height: f32) -> Vec3 {
        let mut p = self.position;
        p.y += 0.5 * height - radius;
        p
    }

    /// Elevation of the capsule's lowest point.
    #[inline]
    pub fn feet(&self, radius: f32) -> f32 {
        self.position.y - radius
    }
}

/// Tolerances of the hysteretic ground check.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundBand {
    /// Gap (meters) within which an airborne body lands. A grounded body stays
    /// grounded up to twice this gap.
    pub check_distance: f32,
    /// Vertical speed above which the body can neither land nor stay grounded (m/s).
    pub upward_velocity_threshold: f32,
}

impl GroundBand {
    /// Next mode from the gap between the lowest point and the ground.
    ///
    /// `gap` is positive above the ground.
    pub fn evaluate(&self, current: GroundMode, gap: f32, vertical_velocity: f32) -> GroundMode {
        if vertical_velocity > self.upward_velocity_threshold {
            return GroundMode::Airborne;
        }

        let band = match current {
            GroundMode::Grounded => 2.0 * self.check_distance,
            GroundMode::Airborne => self.check_distance,
        };
        if gap <= band {
            GroundMode::Grounded
        } else {
            GroundMode::Airborne
        }
    }
}
