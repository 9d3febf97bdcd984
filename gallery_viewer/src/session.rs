// session.rs - Owns every component of one running gallery and drives the tick

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use crate::config::GalleryConfig;
use crate::error_handling::Result;
use crate::gallery::{LoadEvent, PhotoBoard, PhotoLoader};
use crate::geometry::{DoorOpening, RoomGeometry, RoomGeometryBuilder};
use crate::materials::{MaterialLibrary, TextureSynthesizer};
use crate::simulation::{
    DustParticleSimulator, InputState, LocomotionController, LocomotionState, ParticleInstance,
    PlayerState,
};

/// Device pixel ratio is capped here to bound fill cost on dense displays
pub const MAX_PIXEL_RATIO: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_pixel_ratio: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            device_pixel_ratio: 1.0,
        }
    }
}

impl Viewport {
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio.min(MAX_PIXEL_RATIO)
    }
}

/// What the renderer must apply after a resize
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportChange {
    pub aspect: f32,
    pub pixel_ratio: f32,
    pub width: u32,
    pub height: u32,
}

/// Read-only view of one tick, for the renderer or the headless runner
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    pub tick: u64,
    pub elapsed_secs: f32,
    pub player: PlayerState,
    pub locomotion: LocomotionState,
    pub particles: Vec<ParticleInstance>,
    pub photo_revisions: Vec<u32>,
    pub pending_photos: usize,
}

/// One gallery visit: geometry, materials, photos and the per-tick state
pub struct GallerySession {
    config: GalleryConfig,
    seed: u64,
    geometry: RoomGeometry,
    materials: MaterialLibrary,
    photos: PhotoBoard,
    locomotion: LocomotionController,
    dust: Option<DustParticleSimulator>,
    input: InputState,
    loader: PhotoLoader,
    events: UnboundedReceiver<LoadEvent>,
    viewport: Viewport,
    elapsed: Duration,
    ticks: u64,
}

impl GallerySession {
    /// Build everything that is fixed for the session: room shell, materials,
    /// photo slots and the particle set. Runs synchronously.
    pub fn new(config: GalleryConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.textures.seed.unwrap_or_else(rand::random::<u64>);
        let plan = config.room.plan()?;

        let mut builder = RoomGeometryBuilder::new(plan);
        if let Some(door) = config.features.door {
            builder = builder.with_opening(door.wall, DoorOpening::new(door.offset, door.width, door.height));
        }
        let geometry = builder.build()?;

        let synth = TextureSynthesizer::new(config.theme, config.textures.resolution)?;
        let materials = MaterialLibrary::synthesize(&synth, seed);

        let photos = PhotoBoard::new(&config, &geometry);
        let locomotion = LocomotionController::new(&plan, &config.physics);

        let mut rng = StdRng::seed_from_u64(seed.rotate_left(17));
        let dust = config
            .features
            .dust
            .map(|settings| DustParticleSimulator::new(&plan, &settings, &mut rng));

        let (loader, events) = PhotoLoader::channel();

        log::info!(
            "Gallery '{}' ready: {} wall segments, {} photo slots, {} dust particles",
            config.gallery_id,
            geometry.walls.len(),
            photos.records().len(),
            dust.as_ref().map_or(0, |d| d.len())
        );

        Ok(Self {
            config,
            seed,
            geometry,
            materials,
            photos,
            locomotion,
            dust,
            input: InputState::default(),
            loader,
            events,
            viewport: Viewport::default(),
            elapsed: Duration::ZERO,
            ticks: 0,
        })
    }

    /// Spawn one load task per photo slot. Must be called inside a tokio runtime.
    pub fn start_loading(&self) -> Vec<JoinHandle<()>> {
        self.photos
            .records()
            .iter()
            .enumerate()
            .map(|(slot, record)| self.loader.spawn(slot, record.source.clone()))
            .collect()
    }

    /// Handle for posting load results from elsewhere
    pub fn loader(&self) -> PhotoLoader {
        self.loader.clone()
    }

    pub fn handle_key(&mut self, code: &str, pressed: bool, repeat: bool) -> bool {
        self.input.handle_key(code, pressed, repeat)
    }

    pub fn set_pointer_locked(&mut self, locked: bool) {
        self.input.set_pointer_locked(locked);
    }

    pub fn handle_pointer_motion(&mut self, dx: f32, dy: f32) {
        self.input.handle_pointer_motion(dx, dy);
    }

    /// Record new window dimensions. The player is not touched.
    pub fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f32) -> ViewportChange {
        self.viewport = Viewport {
            width,
            height,
            device_pixel_ratio,
        };
        let change = ViewportChange {
            aspect: self.viewport.aspect(),
            pixel_ratio: self.viewport.pixel_ratio(),
            width,
            height,
        };
        log::debug!("Viewport {}x{} (aspect {:.3}, ratio {})", width, height, change.aspect, change.pixel_ratio);
        change
    }

    /// Advance one frame: apply finished loads, then move the player and the dust.
    pub fn tick(&mut self, dt: Duration) -> FrameSnapshot {
        let applied = self.drain_load_events();
        if applied > 0 {
            log::debug!("Applied {} photo loads before tick {}", applied, self.ticks + 1);
        }

        let locomotion = self.locomotion.tick(&mut self.input);
        self.elapsed += dt;
        if let Some(dust) = self.dust.as_mut() {
            dust.tick(self.elapsed.as_secs_f32());
        }
        self.ticks += 1;
        log::trace!(
            "tick {}: player ({:.3}, {:.3}, {:.3}) {:?}",
            self.ticks,
            self.player().position.x,
            self.player().position.y,
            self.player().position.z,
            locomotion
        );

        FrameSnapshot {
            tick: self.ticks,
            elapsed_secs: self.elapsed.as_secs_f32(),
            player: *self.locomotion.state(),
            locomotion,
            particles: self.dust.as_ref().map(|d| d.instances()).unwrap_or_default(),
            photo_revisions: self.photos.revisions(),
            pending_photos: self.photos.pending_count(),
        }
    }

    /// Load results are only applied here, between ticks
    fn drain_load_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            match self.photos.apply(event) {
                Ok(true) => applied += 1,
                Ok(false) => {}
                Err(e) => log::error!("Dropped load event: {}", e),
            }
        }
        applied
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn geometry(&self) -> &RoomGeometry {
        &self.geometry
    }

    pub fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }

    pub fn photos(&self) -> &PhotoBoard {
        &self.photos
    }

    pub fn player(&self) -> &PlayerState {
        self.locomotion.state()
    }

    pub fn dust(&self) -> Option<&DustParticleSimulator> {
        self.dust.as_ref()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
