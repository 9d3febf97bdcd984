// main.rs - Headless gallery runner: builds a session, drives a scripted walk
// through it and writes the resulting frame, geometry and photo state as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use gallery_viewer::config::{GalleryConfig, Preset};
use gallery_viewer::gallery::{PhotoSlot, PhotoState};
use gallery_viewer::geometry::{FittedPhoto, RoomGeometry};
use gallery_viewer::session::{FrameSnapshot, GallerySession};

/// Fixed simulation step
const TICK: Duration = Duration::from_micros(16_667);

/// CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Gallery configuration JSON; overrides --preset
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Built-in configuration to start from
    #[arg(short, long, value_enum, default_value = "salon")]
    pub preset: Preset,

    /// Gallery whose photos are loaded from <image-root>/<gallery-id>/
    #[arg(short, long)]
    pub gallery_id: Option<String>,

    /// Root directory for photo folders
    #[arg(long)]
    pub image_root: Option<PathBuf>,

    /// Seed for texture synthesis and dust; random when absent
    #[arg(long)]
    pub seed: Option<u64>,

    /// Texture resolution in pixels
    #[arg(short, long)]
    pub resolution: Option<u32>,

    /// Number of ticks to simulate
    #[arg(short, long, default_value = "600")]
    pub ticks: u64,

    /// Pace ticks at 60 Hz instead of running flat out
    #[arg(long)]
    pub realtime: bool,

    /// Lock the pointer and hold KeyW for the whole run
    #[arg(long)]
    pub walk: bool,

    /// Press Space every N ticks, releasing it on the tick after (N >= 2;
    /// requires a preset with jumping)
    #[arg(long, value_parser = clap::value_parser!(u64).range(2..))]
    pub jump_every: Option<u64>,

    /// Write every material map as PNG into this directory
    #[arg(long)]
    pub export_textures: Option<PathBuf>,

    /// Run report JSON path; use "-" for stdout
    #[arg(short, long, default_value = "-")]
    pub snapshot: PathBuf,
}

#[derive(Serialize)]
struct PhotoReport<'a> {
    index: usize,
    source: &'a Path,
    slot: PhotoSlot,
    state: &'static str,
    detail: Option<&'a str>,
    fitted: FittedPhoto,
    revision: u32,
}

#[derive(Serialize)]
struct RunReport<'a> {
    gallery_id: &'a str,
    seed: u64,
    elapsed_ms: u128,
    frame: FrameSnapshot,
    geometry: &'a RoomGeometry,
    photos: Vec<PhotoReport<'a>>,
    materials: serde_json::Value,
}

fn build_config(args: &Args) -> Result<GalleryConfig> {
    let mut config = match &args.config {
        Some(path) => GalleryConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => GalleryConfig::preset(args.preset),
    };

    if let Some(id) = &args.gallery_id {
        config.gallery_id = id.clone();
    }
    if let Some(root) = &args.image_root {
        config.image_root = root.clone();
    }
    if let Some(seed) = args.seed {
        config.textures.seed = Some(seed);
    }
    if let Some(resolution) = args.resolution {
        config.textures.resolution = resolution;
    }
    config.validate().context("Invalid configuration after CLI overrides")?;
    Ok(config)
}

fn photo_reports(session: &GallerySession) -> Vec<PhotoReport<'_>> {
    session
        .photos()
        .records()
        .iter()
        .map(|record| {
            let (state, detail) = match record.state() {
                PhotoState::Pending => ("pending", None),
                PhotoState::Loaded { .. } => ("loaded", None),
                PhotoState::Placeholder { reason, .. } => ("placeholder", Some(reason.as_str())),
            };
            PhotoReport {
                index: record.index,
                source: &record.source,
                slot: record.slot,
                state,
                detail,
                fitted: *record.fitted(),
                revision: record.revision(),
            }
        })
        .collect()
}

/// Space goes down on every `every`th tick and up on the next one
fn space_held(tick: u64, every: u64) -> bool {
    every > 1 && tick % every == 0
}

fn write_output(path: &Path, json: &str) -> Result<()> {
    if path.as_os_str() == "-" {
        println!("{}", json);
        return Ok(());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, json).with_context(|| format!("Failed writing {}", path.display()))?;
    info!("Saved run report to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    info!("Starting with {args:?}");

    let config = build_config(&args)?;
    let start = Instant::now();
    let mut session = GallerySession::new(config).context("Failed to build gallery session")?;
    info!(
        "Session built in {:.1} ms (seed {})",
        start.elapsed().as_secs_f64() * 1000.0,
        session.seed()
    );

    if let Some(dir) = &args.export_textures {
        let files = session
            .materials()
            .export_png(dir)
            .with_context(|| format!("Failed to export textures to {}", dir.display()))?;
        info!("Wrote {} texture maps", files.len());
    }

    let mut loads = session.start_loading();
    info!("Loading {} photos", loads.len());
    if !args.realtime {
        // flat-out runs see every photo resolved on the first tick
        for handle in loads.iter_mut() {
            if let Err(e) = handle.await {
                warn!("Photo load task failed: {}", e);
            }
        }
    }

    if args.walk {
        session.set_pointer_locked(true);
        session.handle_key("KeyW", true, false);
    }
    if args.jump_every.is_some() && session.config().physics.jump.is_none() {
        warn!("--jump-every has no effect: jumping is disabled for this gallery");
    }

    let mut interval = tokio::time::interval(TICK);
    // settle tick: applies whatever has already loaded
    let mut frame = session.tick(Duration::ZERO);
    for tick in 1..=args.ticks {
        if args.realtime {
            interval.tick().await;
        }

        if let Some(every) = args.jump_every {
            session.handle_key("Space", space_held(tick, every), false);
        }
        frame = session.tick(TICK);

        if tick % 120 == 0 {
            info!(
                "tick {}: player at ({:.2}, {:.2}, {:.2}), {} photos pending",
                tick,
                frame.player.position.x,
                frame.player.position.y,
                frame.player.position.z,
                frame.pending_photos
            );
        }
    }

    if frame.pending_photos > 0 {
        info!("{} photos still loading after {} ticks", frame.pending_photos, args.ticks);
    }

    let materials: serde_json::Value =
        serde_json::from_str(&session.materials().describe()?).context("Material summary was not valid JSON")?;
    let report = RunReport {
        gallery_id: &session.config().gallery_id,
        seed: session.seed(),
        elapsed_ms: start.elapsed().as_millis(),
        frame,
        geometry: session.geometry(),
        photos: photo_reports(&session),
        materials,
    };
    let json = serde_json::to_string_pretty(&report).context("Failed to serialise run report")?;
    write_output(&args.snapshot, &json)?;

    for handle in loads {
        handle.abort();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_every_rejects_one() {
        assert!(Args::try_parse_from(["gallery-viewer", "--jump-every", "1"]).is_err());
        assert!(Args::try_parse_from(["gallery-viewer", "--jump-every", "0"]).is_err());
        let args = Args::try_parse_from(["gallery-viewer", "--jump-every", "2"]).unwrap();
        assert_eq!(args.jump_every, Some(2));
    }

    #[test]
    fn test_space_released_between_presses() {
        let held: Vec<bool> = (1..=6).map(|tick| space_held(tick, 2)).collect();
        assert_eq!(held, [false, true, false, true, false, true]);
        assert!(!space_held(5, 1));
    }
}
