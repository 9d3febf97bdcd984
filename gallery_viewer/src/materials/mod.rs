// materials/mod.rs - Surface material maps and the library that owns them
// Synthesis runs once at startup; the renderer only reads the finished maps.

pub mod normal;
pub mod raster;
pub mod synth;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error_handling::{GalleryError, Result};

pub use normal::{decode_normal, HeightToNormalConverter};
pub use raster::{GrayRaster, Pixel, Raster, RgbRaster};
pub use synth::TextureSynthesizer;

/// Every surface the room is dressed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    FloorWood,
    WallPlaster,
    CeilingPanel,
    FrameMetal,
    DoorWood,
}

impl SurfaceKind {
    pub const ALL: [SurfaceKind; 5] = [
        SurfaceKind::FloorWood,
        SurfaceKind::WallPlaster,
        SurfaceKind::CeilingPanel,
        SurfaceKind::FrameMetal,
        SurfaceKind::DoorWood,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SurfaceKind::FloorWood => "floor_wood",
            SurfaceKind::WallPlaster => "wall_plaster",
            SurfaceKind::CeilingPanel => "ceiling_panel",
            SurfaceKind::FrameMetal => "frame_metal",
            SurfaceKind::DoorWood => "door_wood",
        }
    }

    /// Shading parameters the renderer applies on top of the maps
    pub fn default_params(self) -> MaterialParams {
        match self {
            SurfaceKind::FloorWood => MaterialParams::new(0.0, 0.95, 2.0),
            SurfaceKind::WallPlaster => MaterialParams::new(0.0, 0.9, 1.2),
            SurfaceKind::CeilingPanel => MaterialParams::new(0.0, 0.85, 3.0),
            SurfaceKind::FrameMetal => MaterialParams::new(0.15, 0.7, 0.6),
            SurfaceKind::DoorWood => MaterialParams::new(0.0, 0.8, 2.5),
        }
    }

    pub fn repeat(self) -> TextureRepeat {
        match self {
            SurfaceKind::FloorWood => TextureRepeat::new(3.0, 3.0),
            SurfaceKind::WallPlaster => TextureRepeat::new(2.0, 1.0),
            SurfaceKind::CeilingPanel => TextureRepeat::new(2.0, 2.0),
            SurfaceKind::FrameMetal | SurfaceKind::DoorWood => TextureRepeat::new(1.0, 1.0),
        }
    }

    /// Per-kind offset so each surface draws from its own RNG stream
    fn stream(self) -> u64 {
        match self {
            SurfaceKind::FloorWood => 0x9e37_79b9,
            SurfaceKind::WallPlaster => 0x85eb_ca6b,
            SurfaceKind::CeilingPanel => 0xc2b2_ae35,
            SurfaceKind::FrameMetal => 0x27d4_eb2f,
            SurfaceKind::DoorWood => 0x1656_67b1,
        }
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Material parameters for PBR rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialParams {
    pub metalness: f32,
    pub roughness: f32,
    /// Gradient gain used when deriving the normal map from height
    pub normal_strength: f32,
}

impl MaterialParams {
    pub const fn new(metalness: f32, roughness: f32, normal_strength: f32) -> Self {
        Self {
            metalness,
            roughness,
            normal_strength,
        }
    }
}

/// Horizontal and vertical tiling factor, applied by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextureRepeat {
    pub u: f32,
    pub v: f32,
}

impl TextureRepeat {
    pub const fn new(u: f32, v: f32) -> Self {
        Self { u, v }
    }
}

/// All maps for one surface. Every raster has the same dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialMapSet {
    pub kind: SurfaceKind,
    pub color: RgbRaster,
    pub height: GrayRaster,
    pub normal: RgbRaster,
    pub roughness: GrayRaster,
    pub ao: GrayRaster,
    pub repeat: TextureRepeat,
    pub params: MaterialParams,
}

impl MaterialMapSet {
    pub fn dimensions(&self) -> (u32, u32) {
        self.color.dimensions()
    }

    pub fn is_consistent(&self) -> bool {
        let dims = self.dimensions();
        [
            self.height.dimensions(),
            self.normal.dimensions(),
            self.roughness.dimensions(),
            self.ao.dimensions(),
        ]
        .iter()
        .all(|d| *d == dims)
    }
}

/// File naming patterns for texture maps
#[derive(Debug, Clone, PartialEq)]
pub struct TextureFileNames {
    pub albedo: String,
    pub normal: String,
    pub roughness: String,
    pub ao: String,
    pub height: String,
}

impl TextureFileNames {
    /// `{kind}_{map}.png`; normals are OpenGL-convention (+Y up)
    pub fn for_kind(kind: SurfaceKind) -> Self {
        let name = kind.name();
        Self {
            albedo: format!("{}_albedo.png", name),
            normal: format!("{}_normal-ogl.png", name),
            roughness: format!("{}_roughness.png", name),
            ao: format!("{}_ao.png", name),
            height: format!("{}_height.png", name),
        }
    }
}

/// The five synthesized surfaces, keyed by kind
#[derive(Debug, Clone)]
pub struct MaterialLibrary {
    seed: u64,
    resolution: u32,
    materials: BTreeMap<SurfaceKind, MaterialMapSet>,
}

impl MaterialLibrary {
    /// Synthesize every surface in parallel. Each kind gets its own RNG
    /// derived from `seed`, so the result does not depend on scheduling.
    pub fn synthesize(synth: &TextureSynthesizer, seed: u64) -> Self {
        log::info!(
            "Synthesizing {} materials at {}px ({:?} theme, seed {})",
            SurfaceKind::ALL.len(),
            synth.resolution(),
            synth.theme(),
            seed
        );

        let materials = SurfaceKind::ALL
            .par_iter()
            .map(|&kind| {
                let mut rng = StdRng::seed_from_u64(seed ^ kind.stream());
                (kind, synth.synthesize(kind, &mut rng))
            })
            .collect();

        Self {
            seed,
            resolution: synth.resolution(),
            materials,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn get(&self, kind: SurfaceKind) -> Option<&MaterialMapSet> {
        self.materials.get(&kind)
    }

    pub fn list(&self) -> Vec<SurfaceKind> {
        self.materials.keys().copied().collect()
    }

    pub fn update_params(&mut self, kind: SurfaceKind, params: MaterialParams) -> Result<()> {
        let set = self
            .materials
            .get_mut(&kind)
            .ok_or_else(|| GalleryError::InvalidConfig(format!("material '{}' not synthesized", kind)))?;
        set.params = params;
        log::info!("Updated material parameters for '{}'", kind);
        Ok(())
    }

    /// Write every map of every surface as PNG into `dir`
    pub fn export_png(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(self.materials.len() * 5);

        for (kind, set) in &self.materials {
            let names = TextureFileNames::for_kind(*kind);

            let albedo = dir.join(&names.albedo);
            set.color.to_image().save_with_format(&albedo, image::ImageFormat::Png)?;
            let normal = dir.join(&names.normal);
            set.normal.to_image().save_with_format(&normal, image::ImageFormat::Png)?;
            let roughness = dir.join(&names.roughness);
            set.roughness.to_image().save_with_format(&roughness, image::ImageFormat::Png)?;
            let ao = dir.join(&names.ao);
            set.ao.to_image().save_with_format(&ao, image::ImageFormat::Png)?;
            let height = dir.join(&names.height);
            set.height.to_image().save_with_format(&height, image::ImageFormat::Png)?;

            log::debug!("Exported {} maps to {}", kind, dir.display());
            written.extend([albedo, normal, roughness, ao, height]);
        }

        log::info!("Exported {} texture files to {}", written.len(), dir.display());
        Ok(written)
    }

    /// JSON summary of the library
    pub fn describe(&self) -> Result<String> {
        let materials: Vec<_> = self
            .materials
            .values()
            .map(|set| {
                let (width, height) = set.dimensions();
                serde_json::json!({
                    "name": set.kind.name(),
                    "width": width,
                    "height": height,
                    "repeat": set.repeat,
                    "parameters": set.params,
                    "mean_height": set.height.mean(),
                    "mean_roughness": set.roughness.mean(),
                    "mean_ao": set.ao.mean(),
                    "albedo_file": TextureFileNames::for_kind(set.kind).albedo,
                })
            })
            .collect();

        let summary = serde_json::json!({
            "seed": self.seed,
            "resolution": self.resolution,
            "materials": materials,
        });
        Ok(serde_json::to_string_pretty(&summary)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MaterialTheme;

    fn library(seed: u64) -> MaterialLibrary {
        let synth = TextureSynthesizer::new(MaterialTheme::Gallery, 16).unwrap();
        MaterialLibrary::synthesize(&synth, seed)
    }

    #[test]
    fn test_library_holds_every_kind() {
        let lib = library(1);
        assert_eq!(lib.list(), SurfaceKind::ALL.to_vec());
        for kind in SurfaceKind::ALL {
            let set = lib.get(kind).unwrap();
            assert_eq!(set.kind, kind);
            assert_eq!(set.dimensions(), (16, 16));
            assert_eq!(set.repeat, kind.repeat());
        }
    }

    #[test]
    fn test_library_is_reproducible() {
        let a = library(77);
        let b = library(77);
        for kind in SurfaceKind::ALL {
            assert_eq!(a.get(kind), b.get(kind));
        }
    }

    #[test]
    fn test_kinds_draw_independent_streams() {
        let lib = library(3);
        let floor = lib.get(SurfaceKind::FloorWood).unwrap();
        let door = lib.get(SurfaceKind::DoorWood).unwrap();
        assert_ne!(floor.height, door.height);
    }

    #[test]
    fn test_file_names() {
        let names = TextureFileNames::for_kind(SurfaceKind::WallPlaster);
        assert_eq!(names.albedo, "wall_plaster_albedo.png");
        assert_eq!(names.normal, "wall_plaster_normal-ogl.png");
        assert_eq!(names.ao, "wall_plaster_ao.png");
    }

    #[test]
    fn test_update_params() {
        let mut lib = library(4);
        let params = MaterialParams::new(0.3, 0.4, 1.0);
        lib.update_params(SurfaceKind::FrameMetal, params).unwrap();
        assert_eq!(lib.get(SurfaceKind::FrameMetal).unwrap().params, params);
    }

    #[test]
    fn test_describe_is_json() {
        let json = library(5).describe().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["seed"], 5);
        assert_eq!(value["materials"].as_array().unwrap().len(), 5);
        assert_eq!(value["materials"][3]["name"], "frame_metal");
        assert!((value["materials"][3]["parameters"]["metalness"].as_f64().unwrap() - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_export_png_writes_all_maps() {
        let dir = std::env::temp_dir().join(format!("gallery-export-{}", std::process::id()));
        let written = library(6).export_png(&dir).unwrap();
        assert_eq!(written.len(), 25);
        for path in &written {
            assert!(path.exists(), "missing {}", path.display());
        }
        let img = image::open(dir.join("floor_wood_albedo.png")).unwrap();
        assert_eq!((img.width(), img.height()), (16, 16));
        std::fs::remove_dir_all(&dir).ok();
    }
}
