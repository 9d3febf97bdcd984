// simulation/input.rs - Keyboard and pointer state read once per tick

use serde::{Deserialize, Serialize};

/// Actions the keyboard can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyAction {
    Forward,
    Backward,
    Left,
    Right,
    Jump,
}

impl KeyAction {
    /// Map a DOM-style key code (`KeyW`, `Space`, ...) to an action
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "KeyW" => Some(KeyAction::Forward),
            "KeyS" => Some(KeyAction::Backward),
            "KeyA" => Some(KeyAction::Left),
            "KeyD" => Some(KeyAction::Right),
            "Space" => Some(KeyAction::Jump),
            _ => None,
        }
    }
}

/// Input flags written by event handling and consumed by the tick.
///
/// Movement keys are level-triggered (held). Jump is edge-triggered: one
/// request per physical press, auto-repeat does not re-arm it.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct InputState {
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_left: bool,
    pub move_right: bool,
    jump_held: bool,
    jump_requested: bool,
    pointer_locked: bool,
    look_dx: f32,
    look_dy: f32,
}

impl InputState {
    /// Returns `true` if the code is bound
    pub fn handle_key(&mut self, code: &str, pressed: bool, repeat: bool) -> bool {
        let Some(action) = KeyAction::from_code(code) else {
            return false;
        };
        match action {
            KeyAction::Forward => self.move_forward = pressed,
            KeyAction::Backward => self.move_backward = pressed,
            KeyAction::Left => self.move_left = pressed,
            KeyAction::Right => self.move_right = pressed,
            KeyAction::Jump => {
                if pressed && !repeat && !self.jump_held {
                    self.jump_requested = true;
                }
                self.jump_held = pressed;
            }
        }
        true
    }

    pub fn set_pointer_locked(&mut self, locked: bool) {
        if self.pointer_locked != locked {
            log::debug!("Pointer lock {}", if locked { "engaged" } else { "released" });
        }
        self.pointer_locked = locked;
        if !locked {
            self.jump_requested = false;
            self.look_dx = 0.0;
            self.look_dy = 0.0;
        }
    }

    pub fn pointer_locked(&self) -> bool {
        self.pointer_locked
    }

    /// Accumulate pointer motion in pixels; dropped while unlocked
    pub fn handle_pointer_motion(&mut self, dx: f32, dy: f32) {
        if self.pointer_locked {
            self.look_dx += dx;
            self.look_dy += dy;
        }
    }

    pub fn jump_pending(&self) -> bool {
        self.jump_requested
    }

    /// Consume the pending jump request
    pub fn take_jump(&mut self) -> bool {
        std::mem::take(&mut self.jump_requested)
    }

    /// Consume accumulated pointer motion
    pub fn take_look(&mut self) -> (f32, f32) {
        (std::mem::take(&mut self.look_dx), std::mem::take(&mut self.look_dy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_keys_are_held() {
        let mut input = InputState::default();
        assert!(input.handle_key("KeyW", true, false));
        assert!(input.handle_key("KeyD", true, false));
        assert!(input.move_forward && input.move_right);
        input.handle_key("KeyW", false, false);
        assert!(!input.move_forward);
        assert!(input.move_right);
        assert!(!input.handle_key("KeyQ", true, false));
    }

    #[test]
    fn test_jump_is_edge_triggered() {
        let mut input = InputState::default();
        input.set_pointer_locked(true);
        input.handle_key("Space", true, false);
        assert!(input.take_jump());
        assert!(!input.take_jump());

        // auto-repeat and a second keydown without keyup do not re-arm
        input.handle_key("Space", true, true);
        input.handle_key("Space", true, false);
        assert!(!input.jump_pending());

        input.handle_key("Space", false, false);
        input.handle_key("Space", true, false);
        assert!(input.take_jump());
    }

    #[test]
    fn test_pointer_motion_gated_by_lock() {
        let mut input = InputState::default();
        input.handle_pointer_motion(10.0, 5.0);
        assert_eq!(input.take_look(), (0.0, 0.0));

        input.set_pointer_locked(true);
        input.handle_pointer_motion(10.0, 5.0);
        input.handle_pointer_motion(-4.0, 1.0);
        assert_eq!(input.take_look(), (6.0, 6.0));
        assert_eq!(input.take_look(), (0.0, 0.0));
    }

    #[test]
    fn test_unlock_discards_jump() {
        let mut input = InputState::default();
        input.set_pointer_locked(true);
        input.handle_key("Space", true, false);
        input.set_pointer_locked(false);
        assert!(!input.take_jump());
    }
}
