// config.rs - One parametrised description of a gallery room
// Room scale, material theme, physics tuning and optional features all live here,
// so every room variant is data rather than a fork of the scene code.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error_handling::{GalleryError, Result};
use crate::geometry::{FrameStyle, RoomPlan, WallSide};

/// Complete gallery configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub gallery_id: String,
    pub image_extension: String,
    pub image_root: PathBuf,
    pub room: RoomScale,
    pub theme: MaterialTheme,
    pub textures: TextureSettings,
    pub physics: PhysicsTuning,
    pub photos: PhotoSettings,
    pub features: FeatureToggles,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            gallery_id: "test".to_string(),
            image_extension: "jpg".to_string(),
            image_root: PathBuf::from("images"),
            room: RoomScale::default(),
            theme: MaterialTheme::default(),
            textures: TextureSettings::default(),
            physics: PhysicsTuning::default(),
            photos: PhotoSettings::default(),
            features: FeatureToggles::default(),
        }
    }
}

/// Raw room dimensions before scaling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomScale {
    pub width: f32,
    pub depth: f32,
    pub height: f32,
    pub wall_thickness: f32,
    pub scale: f32,
}

impl Default for RoomScale {
    fn default() -> Self {
        Self {
            width: 6.0,
            depth: 4.0,
            height: 3.0,
            wall_thickness: 0.1,
            scale: 1.0,
        }
    }
}

impl RoomScale {
    pub fn plan(&self) -> Result<RoomPlan> {
        RoomPlan::new(self.width, self.depth, self.height, self.wall_thickness, self.scale)
    }
}

/// Palette family used by the texture synthesizer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialTheme {
    #[default]
    Gallery,
    Warm,
    Noir,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureSettings {
    /// Edge length in pixels of every synthesized map
    pub resolution: u32,
    /// Fixed seed for reproducible synthesis; `None` draws from entropy
    pub seed: Option<u64>,
}

impl Default for TextureSettings {
    fn default() -> Self {
        Self {
            resolution: 512,
            seed: None,
        }
    }
}

/// Per-tick movement constants. Units are world units per tick, not per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    pub eye_height: f32,
    pub margin: f32,
    pub move_speed: f32,
    pub jump: Option<JumpTuning>,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            eye_height: 1.6,
            margin: 0.35,
            move_speed: 0.05,
            jump: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpTuning {
    pub jump_velocity: f32,
    pub gravity: f32,
    /// Softer deceleration near the top of the arc; `None` keeps gravity constant
    pub apex: Option<ApexSoftening>,
}

impl Default for JumpTuning {
    fn default() -> Self {
        Self {
            jump_velocity: 0.16,
            gravity: 0.012,
            apex: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApexSoftening {
    /// Upward velocity below which the apex deceleration replaces gravity
    pub threshold: f32,
    pub deceleration: f32,
}

impl Default for ApexSoftening {
    fn default() -> Self {
        Self {
            threshold: 0.04,
            deceleration: 0.006,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoSettings {
    pub max_side: f32,
    pub wall_inset: f32,
    pub hang_height: f32,
    pub frame_style: FrameStyle,
}

impl Default for PhotoSettings {
    fn default() -> Self {
        Self {
            max_side: 1.5,
            wall_inset: 0.14,
            hang_height: 1.5,
            frame_style: FrameStyle::Solid,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureToggles {
    pub door: Option<DoorSpec>,
    pub dust: Option<DustSettings>,
}

/// Door cut into one wall. `offset` is measured along the wall from its centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorSpec {
    pub wall: WallSide,
    pub offset: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DustSettings {
    pub count: usize,
    /// Distance kept from the walls when particles are seeded
    pub margin: f32,
    pub min_y: f32,
    /// Distance kept below the ceiling
    pub max_y_inset: f32,
    /// Largest horizontal drift per tick
    pub speed: f32,
    /// Largest vertical drift per tick
    pub vertical_speed: f32,
    pub sway_amplitude: f32,
    /// Radians per second of the vertical sway
    pub sway_rate: f32,
}

impl Default for DustSettings {
    fn default() -> Self {
        Self {
            count: 180,
            margin: 0.3,
            min_y: 0.15,
            max_y_inset: 0.25,
            speed: 0.0025,
            vertical_speed: 0.0012,
            sway_amplitude: 0.0008,
            sway_rate: 0.8,
        }
    }
}

/// Named room variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Single small room, walk only
    Minimal,
    /// Deep room with a door, dust motes and a plain jump
    Salon,
    /// Scaled-up warm hall with a softened jump arc
    Grand,
}

impl GalleryConfig {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Minimal => Self::default(),
            Preset::Salon => Self {
                room: RoomScale {
                    width: 6.0,
                    depth: 8.0,
                    height: 3.2,
                    ..RoomScale::default()
                },
                physics: PhysicsTuning {
                    jump: Some(JumpTuning::default()),
                    ..PhysicsTuning::default()
                },
                photos: PhotoSettings {
                    frame_style: FrameStyle::Mitred,
                    ..PhotoSettings::default()
                },
                features: FeatureToggles {
                    door: Some(DoorSpec {
                        wall: WallSide::Left,
                        offset: -2.55,
                        width: 1.16,
                        height: 2.1,
                    }),
                    dust: Some(DustSettings::default()),
                },
                ..Self::default()
            },
            Preset::Grand => Self {
                room: RoomScale {
                    width: 6.0,
                    depth: 8.0,
                    height: 3.2,
                    wall_thickness: 0.12,
                    scale: 1.5,
                },
                theme: MaterialTheme::Warm,
                physics: PhysicsTuning {
                    move_speed: 0.06,
                    jump: Some(JumpTuning {
                        apex: Some(ApexSoftening::default()),
                        ..JumpTuning::default()
                    }),
                    ..PhysicsTuning::default()
                },
                photos: PhotoSettings {
                    frame_style: FrameStyle::Mitred,
                    hang_height: 1.6,
                    ..PhotoSettings::default()
                },
                features: FeatureToggles {
                    door: Some(DoorSpec {
                        wall: WallSide::Back,
                        offset: 0.0,
                        width: 1.4,
                        height: 2.4,
                    }),
                    dust: Some(DustSettings {
                        count: 260,
                        ..DustSettings::default()
                    }),
                },
                ..Self::default()
            },
        }
    }

    /// Load a configuration from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: GalleryConfig = serde_json::from_str(&text)?;
        config.validate()?;
        log::info!("Loaded gallery configuration from {}", path.display());
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<()> {
        let plan = self.room.plan()?;

        if self.gallery_id.trim().is_empty() {
            return Err(GalleryError::InvalidConfig("gallery_id must not be empty".into()));
        }
        if !(8..=4096).contains(&self.textures.resolution) {
            return Err(GalleryError::InvalidConfig(format!(
                "texture resolution {} outside 8..=4096",
                self.textures.resolution
            )));
        }

        let p = &self.physics;
        if !(p.eye_height > 0.0 && p.eye_height < plan.height()) {
            return Err(GalleryError::InvalidConfig(format!(
                "eye height {} must lie inside the room height {}",
                p.eye_height,
                plan.height()
            )));
        }
        if !(p.margin >= 0.0 && p.margin < plan.half_width() && p.margin < plan.half_depth()) {
            return Err(GalleryError::InvalidConfig(format!(
                "player margin {} leaves no walkable area",
                p.margin
            )));
        }
        if !(p.move_speed >= 0.0 && p.move_speed.is_finite()) {
            return Err(GalleryError::InvalidConfig("move_speed must be >= 0".into()));
        }
        if let Some(jump) = p.jump {
            if !(jump.jump_velocity > 0.0 && jump.gravity > 0.0) {
                return Err(GalleryError::InvalidConfig(
                    "jump velocity and gravity must be > 0".into(),
                ));
            }
            if let Some(apex) = jump.apex {
                if !(apex.threshold > 0.0 && apex.deceleration > 0.0) {
                    return Err(GalleryError::InvalidConfig(
                        "apex threshold and deceleration must be > 0".into(),
                    ));
                }
            }
        }

        if !(self.photos.max_side > 0.0) {
            return Err(GalleryError::InvalidConfig("photo max_side must be > 0".into()));
        }

        if let Some(dust) = self.features.dust {
            if !(dust.min_y >= 0.0) {
                return Err(GalleryError::InvalidConfig(format!(
                    "dust min_y {} is below the floor",
                    dust.min_y
                )));
            }
            let drifts = [
                ("speed", dust.speed),
                ("vertical_speed", dust.vertical_speed),
                ("sway_amplitude", dust.sway_amplitude),
                ("sway_rate", dust.sway_rate),
            ];
            if let Some((name, value)) = drifts.iter().find(|(_, v)| !(v.is_finite() && *v >= 0.0)) {
                return Err(GalleryError::InvalidConfig(format!(
                    "dust {} {} must be >= 0",
                    name, value
                )));
            }
            let max_y = plan.height() - dust.max_y_inset;
            if dust.min_y >= max_y {
                return Err(GalleryError::InvalidConfig(format!(
                    "dust band [{}, {}] is empty",
                    dust.min_y, max_y
                )));
            }
            if dust.margin >= plan.half_width() || dust.margin >= plan.half_depth() {
                return Err(GalleryError::InvalidConfig(format!(
                    "dust margin {} leaves no interior",
                    dust.margin
                )));
            }
            if dust.count > 10_000 {
                return Err(GalleryError::InvalidConfig(format!(
                    "dust count {} is unreasonably large",
                    dust.count
                )));
            }
        }

        Ok(())
    }

    /// Path of photo `index` (1-based): `{image_root}/{gallery_id}/{index}.{ext}`
    pub fn photo_path(&self, index: usize) -> PathBuf {
        self.image_root
            .join(&self.gallery_id)
            .join(format!("{}.{}", index, self.image_extension))
    }
}
