/*!
Player movement.

- input:      per-tick intent and its camera-relative world direction
- state:      player snapshot, ground modes and the hysteresis band
- controller: the per-tick state machine
*/

pub mod controller;
pub mod input;
pub mod state;

pub use controller::CharacterController;
pub use input::MoveInput;
pub use state::{GroundBand, GroundMode, PlayerState};
