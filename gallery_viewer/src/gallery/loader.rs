// gallery/loader.rs - Asynchronous photo loading
//
// One tokio task per slot reads and decodes the file, then posts the result
// on an unbounded channel. Loads finish in any order; the session applies
// them only between ticks.

use image::RgbImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// Result of one photo load
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Loaded {
        width: u32,
        height: u32,
        image: Arc<RgbImage>,
    },
    Failed {
        reason: String,
    },
}

impl LoadOutcome {
    /// Natural width / height, `None` for failures
    pub fn aspect(&self) -> Option<f32> {
        match self {
            LoadOutcome::Loaded { width, height, .. } => Some(*width as f32 / *height as f32),
            LoadOutcome::Failed { .. } => None,
        }
    }
}

/// Completion message for slot `slot` (0-based)
#[derive(Debug, Clone)]
pub struct LoadEvent {
    pub slot: usize,
    pub outcome: LoadOutcome,
}

/// Spawns load tasks that report on a shared channel
#[derive(Debug, Clone)]
pub struct PhotoLoader {
    tx: UnboundedSender<LoadEvent>,
}

impl PhotoLoader {
    /// Create a loader and the receiving end the session drains
    pub fn channel() -> (Self, UnboundedReceiver<LoadEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Start loading `path` for `slot`. Must be called inside a tokio runtime.
    pub fn spawn(&self, slot: usize, path: PathBuf) -> JoinHandle<()> {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = load_photo(&path).await;
            match &outcome {
                LoadOutcome::Loaded { width, height, .. } => {
                    log::info!("Loaded photo {} ({}x{})", path.display(), width, height)
                }
                LoadOutcome::Failed { reason } => {
                    log::warn!("Photo {} failed to load: {}", path.display(), reason)
                }
            }
            if tx.send(LoadEvent { slot, outcome }).is_err() {
                log::debug!("Session gone before slot {} finished loading", slot);
            }
        })
    }

    /// Post an already known outcome, bypassing the filesystem
    pub fn post(&self, event: LoadEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Read and decode one image file
pub async fn load_photo(path: &Path) -> LoadOutcome {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return LoadOutcome::Failed {
                reason: format!("read failed: {}", e),
            }
        }
    };

    // decoding is CPU-bound, keep it off the async workers
    let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes)).await;
    match decoded {
        Ok(Ok(image)) => {
            let rgb = image.to_rgb8();
            let (width, height) = rgb.dimensions();
            if width == 0 || height == 0 {
                return LoadOutcome::Failed {
                    reason: "image has zero size".to_string(),
                };
            }
            LoadOutcome::Loaded {
                width,
                height,
                image: Arc::new(rgb),
            }
        }
        Ok(Err(e)) => LoadOutcome::Failed {
            reason: format!("decode failed: {}", e),
        },
        Err(e) => LoadOutcome::Failed {
            reason: format!("decoder task failed: {}", e),
        },
    }
}
