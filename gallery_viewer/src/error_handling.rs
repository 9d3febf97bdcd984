// error_handling.rs - Error types shared by every gallery component

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Invalid room plan: {reason}")]
    InvalidRoomPlan { reason: String },

    #[error("Invalid door opening on {wall} wall: {reason}")]
    InvalidOpening { wall: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid raster: {reason}")]
    InvalidRaster { reason: String },

    #[error("Unknown photo slot {0}")]
    UnknownPhotoSlot(usize),

    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GalleryError>;

impl GalleryError {
    pub(crate) fn opening(wall: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        GalleryError::InvalidOpening {
            wall: wall.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn room(reason: impl Into<String>) -> Self {
        GalleryError::InvalidRoomPlan {
            reason: reason.into(),
        }
    }
}

/// Reject non-finite or non-positive dimensions with a readable message.
pub(crate) fn ensure_positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GalleryError::room(format!("{} must be > 0 (got {})", name, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_positive() {
        assert!(ensure_positive("width", 6.0).is_ok());
        assert!(ensure_positive("width", 0.0).is_err());
        assert!(ensure_positive("width", -1.0).is_err());
        assert!(ensure_positive("width", f32::NAN).is_err());
    }

    #[test]
    fn test_opening_message() {
        let err = GalleryError::opening("left", "too wide");
        assert_eq!(err.to_string(), "Invalid door opening on left wall: too wide");
    }
}
