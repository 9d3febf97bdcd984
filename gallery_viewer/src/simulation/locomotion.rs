// simulation/locomotion.rs - First-person walking, bounds and the jump arc
//
// Units are per tick: one call to `tick` is one displayed frame.

use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

use super::{clamp_reporting, InputState, LocomotionState};
use crate::config::{JumpTuning, PhysicsTuning};
use crate::geometry::RoomPlan;
use crate::types::Vec3;

/// Radians of rotation per pixel of pointer motion
pub const LOOK_SENSITIVITY: f32 = 0.002;
/// Pitch stops just short of straight up/down
pub const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// Player camera state, read back by the renderer every frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub position: Vec3,
    pub vertical_velocity: f32,
    pub is_airborne: bool,
    /// Rotation about +Y; 0 looks down -Z
    pub yaw: f32,
    pub pitch: f32,
}

impl PlayerState {
    pub fn locomotion_state(&self) -> LocomotionState {
        if self.is_airborne {
            LocomotionState::Airborne
        } else {
            LocomotionState::Grounded
        }
    }

    /// Horizontal facing direction for the current yaw
    pub fn forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }
}

/// Integrates input into [`PlayerState`] once per tick.
///
/// Grounded: y is pinned to the eye height and held movement keys move the
/// player relative to yaw. Airborne: velocity loses gravity (or the softer
/// apex deceleration just below the peak) and y follows; touching the eye
/// height lands the player with zero velocity. The horizontal clamp runs
/// every tick in both states.
#[derive(Debug, Clone)]
pub struct LocomotionController {
    state: PlayerState,
    eye_height: f32,
    move_speed: f32,
    x_limit: f32,
    z_limit: f32,
    jump: Option<JumpTuning>,
}

impl LocomotionController {
    pub fn new(plan: &RoomPlan, tuning: &PhysicsTuning) -> Self {
        let x_limit = (plan.half_width() - tuning.margin).max(0.0);
        let z_limit = (plan.half_depth() - tuning.margin).max(0.0);
        log::debug!(
            "Locomotion bounds x in [-{:.2}, {:.2}], z in [-{:.2}, {:.2}], jump {}",
            x_limit,
            x_limit,
            z_limit,
            z_limit,
            if tuning.jump.is_some() { "enabled" } else { "disabled" }
        );

        Self {
            state: PlayerState {
                position: Vec3::new(0.0, tuning.eye_height, 0.0),
                vertical_velocity: 0.0,
                is_airborne: false,
                yaw: 0.0,
                pitch: 0.0,
            },
            eye_height: tuning.eye_height,
            move_speed: tuning.move_speed,
            x_limit,
            z_limit,
            jump: tuning.jump,
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// Half extents of the walkable rectangle
    pub fn limits(&self) -> (f32, f32) {
        (self.x_limit, self.z_limit)
    }

    pub fn eye_height(&self) -> f32 {
        self.eye_height
    }

    /// Apply pointer motion in pixels to yaw and pitch
    pub fn look(&mut self, dx: f32, dy: f32) {
        self.state.yaw -= dx * LOOK_SENSITIVITY;
        self.state.pitch = (self.state.pitch - dy * LOOK_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Advance one tick. Input is honoured only while the pointer is locked;
    /// physics and bounds apply regardless.
    pub fn tick(&mut self, input: &mut InputState) -> LocomotionState {
        let jump_requested = input.take_jump();
        let mut jumped = false;

        if input.pointer_locked() {
            let (dx, dy) = input.take_look();
            self.look(dx, dy);
            self.walk(input);

            if jump_requested && !self.state.is_airborne {
                if let Some(jump) = self.jump {
                    self.state.is_airborne = true;
                    self.state.vertical_velocity = jump.jump_velocity;
                    jumped = true;
                    log::trace!("Jump at ({:.2}, {:.2})", self.state.position.x, self.state.position.z);
                }
            }
        }

        if self.state.is_airborne && !jumped {
            self.fall();
        }
        if !self.state.is_airborne {
            self.state.position.y = self.eye_height;
        }

        self.apply_bounds();
        self.state.locomotion_state()
    }

    fn walk(&mut self, input: &InputState) {
        let forward = self.state.forward();
        let right = self.state.right();
        let mut pos = self.state.position;
        if input.move_forward {
            pos += forward * self.move_speed;
        }
        if input.move_backward {
            pos += forward * -self.move_speed;
        }
        if input.move_left {
            pos += right * -self.move_speed;
        }
        if input.move_right {
            pos += right * self.move_speed;
        }
        self.state.position = pos;
    }

    fn fall(&mut self) {
        let Some(jump) = self.jump else {
            self.land();
            return;
        };

        let v = self.state.vertical_velocity;
        let decrement = match jump.apex {
            Some(apex) if v > 0.0 && v < apex.threshold => apex.deceleration,
            _ => jump.gravity,
        };
        self.state.vertical_velocity = v - decrement;
        self.state.position.y += self.state.vertical_velocity;

        if self.state.position.y <= self.eye_height {
            self.land();
        }
    }

    fn land(&mut self) {
        self.state.position.y = self.eye_height;
        self.state.vertical_velocity = 0.0;
        self.state.is_airborne = false;
    }

    fn apply_bounds(&mut self) {
        let (x, _) = clamp_reporting(self.state.position.x, -self.x_limit, self.x_limit);
        let (z, _) = clamp_reporting(self.state.position.z, -self.z_limit, self.z_limit);
        self.state.position.x = x;
        self.state.position.z = z;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApexSoftening;
    use proptest::prelude::*;

    fn plan_6x8() -> RoomPlan {
        RoomPlan::new(6.0, 8.0, 3.2, 0.1, 1.0).unwrap()
    }

    fn jumping_tuning() -> PhysicsTuning {
        PhysicsTuning {
            jump: Some(JumpTuning::default()),
            ..PhysicsTuning::default()
        }
    }

    fn locked() -> InputState {
        let mut input = InputState::default();
        input.set_pointer_locked(true);
        input
    }

    #[test]
    fn test_starts_grounded_at_eye_height() {
        let ctl = LocomotionController::new(&plan_6x8(), &PhysicsTuning::default());
        let s = ctl.state();
        assert_eq!(s.position, Vec3::new(0.0, 1.6, 0.0));
        assert!(!s.is_airborne);
        assert_eq!(s.locomotion_state(), LocomotionState::Grounded);
    }

    #[test]
    fn test_forward_moves_along_negative_z() {
        let mut ctl = LocomotionController::new(&plan_6x8(), &PhysicsTuning::default());
        let mut input = locked();
        input.handle_key("KeyW", true, false);
        ctl.tick(&mut input);
        let p = ctl.state().position;
        assert!(p.x.abs() < 1e-6);
        assert!((p.z + 0.05).abs() < 1e-6);

        input.handle_key("KeyW", false, false);
        input.handle_key("KeyD", true, false);
        ctl.tick(&mut input);
        assert!((ctl.state().position.x - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_yaw_rotates_movement() {
        let mut ctl = LocomotionController::new(&plan_6x8(), &PhysicsTuning::default());
        ctl.look(-(std::f32::consts::FRAC_PI_2 / LOOK_SENSITIVITY), 0.0);
        let mut input = locked();
        input.handle_key("KeyW", true, false);
        ctl.tick(&mut input);
        // a quarter turn left faces -X
        let p = ctl.state().position;
        assert!((p.x + 0.05).abs() < 1e-5);
        assert!(p.z.abs() < 1e-5);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut ctl = LocomotionController::new(&plan_6x8(), &PhysicsTuning::default());
        ctl.look(0.0, -100_000.0);
        assert_eq!(ctl.state().pitch, PITCH_LIMIT);
        ctl.look(0.0, 100_000.0);
        assert_eq!(ctl.state().pitch, -PITCH_LIMIT);
    }

    #[test]
    fn test_input_inert_while_unlocked() {
        let mut ctl = LocomotionController::new(&plan_6x8(), &jumping_tuning());
        let mut input = InputState::default();
        input.handle_key("KeyW", true, false);
        input.handle_key("Space", true, false);
        ctl.tick(&mut input);
        let s = ctl.state();
        assert_eq!(s.position, Vec3::new(0.0, 1.6, 0.0));
        assert!(!s.is_airborne);
    }

    #[test]
    fn test_jump_state_machine() {
        let mut ctl = LocomotionController::new(&plan_6x8(), &jumping_tuning());
        let mut input = locked();

        input.handle_key("Space", true, false);
        assert_eq!(ctl.tick(&mut input), LocomotionState::Airborne);
        assert!(ctl.state().is_airborne);
        assert_eq!(ctl.state().vertical_velocity, 0.16);

        // mirror controller that never receives a second jump
        let mut control = ctl.clone();
        let mut idle = locked();

        input.handle_key("Space", false, false);
        input.handle_key("Space", true, false);
        ctl.tick(&mut input);
        control.tick(&mut idle);
        assert_eq!(ctl.state().vertical_velocity, control.state().vertical_velocity);
        assert_eq!(ctl.state().position, control.state().position);

        let mut landed = false;
        for _ in 0..200 {
            if ctl.tick(&mut input) == LocomotionState::Grounded {
                landed = true;
                break;
            }
            assert!(ctl.state().position.y > 1.6);
        }
        assert!(landed);
        let s = ctl.state();
        assert_eq!(s.position.y, 1.6);
        assert_eq!(s.vertical_velocity, 0.0);
        assert!(!s.is_airborne);
    }

    #[test]
    fn test_constant_gravity_arc() {
        let mut ctl = LocomotionController::new(&plan_6x8(), &jumping_tuning());
        let mut input = locked();
        input.handle_key("Space", true, false);
        ctl.tick(&mut input);
        ctl.tick(&mut input);
        assert!((ctl.state().vertical_velocity - 0.148).abs() < 1e-6);
        assert!((ctl.state().position.y - 1.748).abs() < 1e-5);
    }

    #[test]
    fn test_apex_softening_stretches_the_arc() {
        let airtime = |tuning: PhysicsTuning| {
            let mut ctl = LocomotionController::new(&plan_6x8(), &tuning);
            let mut input = locked();
            input.handle_key("Space", true, false);
            ctl.tick(&mut input);
            let mut ticks = 0;
            while ctl.tick(&mut input) == LocomotionState::Airborne {
                ticks += 1;
            }
            ticks
        };

        let plain = airtime(jumping_tuning());
        let softened = airtime(PhysicsTuning {
            jump: Some(JumpTuning {
                apex: Some(ApexSoftening::default()),
                ..JumpTuning::default()
            }),
            ..PhysicsTuning::default()
        });
        assert!(softened > plain);
    }

    #[test]
    fn test_jump_without_tuning_is_ignored() {
        let mut ctl = LocomotionController::new(&plan_6x8(), &PhysicsTuning::default());
        let mut input = locked();
        input.handle_key("Space", true, false);
        assert_eq!(ctl.tick(&mut input), LocomotionState::Grounded);
        assert_eq!(ctl.state().vertical_velocity, 0.0);
    }

    #[test]
    fn test_walls_stop_the_player() {
        let mut ctl = LocomotionController::new(&plan_6x8(), &PhysicsTuning::default());
        let mut input = locked();
        input.handle_key("KeyW", true, false);
        for _ in 0..500 {
            ctl.tick(&mut input);
        }
        assert!((ctl.state().position.z + 3.65).abs() < 1e-5);
        let (x_limit, z_limit) = ctl.limits();
        assert!((x_limit - 2.65).abs() < 1e-6);
        assert!((z_limit - 3.65).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_player_stays_in_bounds(
            steps in prop::collection::vec((0u8..32, -400.0f32..400.0), 1..300),
            speed in 0.01f32..0.8,
        ) {
            let tuning = PhysicsTuning { move_speed: speed, ..jumping_tuning() };
            let mut ctl = LocomotionController::new(&plan_6x8(), &tuning);
            let mut input = locked();

            for (keys, turn) in steps {
                input.handle_key("KeyW", keys & 1 != 0, false);
                input.handle_key("KeyS", keys & 2 != 0, false);
                input.handle_key("KeyA", keys & 4 != 0, false);
                input.handle_key("KeyD", keys & 8 != 0, false);
                input.handle_key("Space", keys & 16 != 0, false);
                input.handle_pointer_motion(turn, 0.0);
                ctl.tick(&mut input);

                let p = ctl.state().position;
                prop_assert!(p.x >= -2.65 - 1e-5 && p.x <= 2.65 + 1e-5);
                prop_assert!(p.z >= -3.65 - 1e-5 && p.z <= 3.65 + 1e-5);
                prop_assert!(p.y >= 1.6);
                if !ctl.state().is_airborne {
                    prop_assert_eq!(p.y, 1.6);
                }
            }
        }
    }
}
