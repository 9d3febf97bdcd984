// simulation/mod.rs - Per-tick player movement and ambient dust
// Both controllers own their state outright and never read each other's.

pub mod dust;
pub mod input;
pub mod locomotion;

pub use dust::*;
pub use input::*;
pub use locomotion::*;

use serde::{Deserialize, Serialize};

// ============================================================================
// LOCOMOTION STATE
// ============================================================================

/// Vertical state of the player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocomotionState {
    #[default]
    Grounded,
    Airborne,
}

// ============================================================================
// UTILITY FUNCTIONS
// ============================================================================

/// Clamp `value` into `[min, max]`, reporting whether it had to move
#[inline]
pub fn clamp_reporting(value: f32, min: f32, max: f32) -> (f32, bool) {
    if value < min {
        (min, true)
    } else if value > max {
        (max, true)
    } else {
        (value, false)
    }
}
