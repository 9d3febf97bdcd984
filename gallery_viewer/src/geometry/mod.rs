// geometry/mod.rs - Derived room and frame geometry handed to the renderer

pub mod room;
pub mod frame;

pub use room::*;
pub use frame::*;
