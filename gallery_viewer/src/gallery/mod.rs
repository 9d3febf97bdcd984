// gallery/mod.rs - Photos on the walls: layout, async loading, placeholders

pub mod loader;
pub mod photos;
pub mod placeholder;

pub use loader::{load_photo, LoadEvent, LoadOutcome, PhotoLoader};
pub use photos::{slot_layout, PhotoBoard, PhotoRecord, PhotoSlot, PhotoState, PHOTO_SLOTS};
pub use placeholder::{placeholder_aspect, placeholder_label, render_placeholder};
