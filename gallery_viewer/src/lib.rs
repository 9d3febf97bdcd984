// lib.rs - Library exports for gallery-viewer
// Renderer-agnostic core of a first-person photo gallery: room shell, procedural
// materials, photo framing, locomotion and ambient dust.

pub mod config;
pub mod error_handling;
pub mod gallery;
pub mod geometry;
pub mod materials;
pub mod session;
pub mod simulation;
pub mod types;

// Re-export commonly used types
pub use config::{GalleryConfig, MaterialTheme, Preset};
pub use error_handling::{GalleryError, Result};
pub use gallery::{LoadEvent, LoadOutcome, PhotoBoard, PhotoLoader, PhotoState};
pub use geometry::{FrameStyle, PhotoFrameFitter, RoomGeometry, RoomGeometryBuilder, RoomPlan, WallSide};
pub use materials::{HeightToNormalConverter, MaterialLibrary, MaterialMapSet, SurfaceKind, TextureSynthesizer};
pub use session::{FrameSnapshot, GallerySession, Viewport, ViewportChange};
pub use simulation::{DustParticleSimulator, InputState, LocomotionController, LocomotionState, PlayerState};
pub use types::Vec3;
