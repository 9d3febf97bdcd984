// gallery/photos.rs - Photo slots on the walls and their load state

use image::RgbImage;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use super::loader::{LoadEvent, LoadOutcome};
use super::placeholder::{placeholder_aspect, placeholder_label, render_placeholder};
use crate::config::GalleryConfig;
use crate::error_handling::{GalleryError, Result};
use crate::geometry::{
    DoorOpening, FittedPhoto, PhotoFrameFitter, RoomGeometry, WallSide, CHAMFER_SIZE,
    FRAME_OFFSET_Z, FRAME_PADDING, PHOTO_OFFSET_Z,
};
use crate::types::Vec3;

pub const PHOTO_SLOTS: usize = 8;

/// Minimum gap between a frame edge and a door opening
const DOOR_GAP: f32 = 0.05;
/// Gap left after moving a slot off a door
const DOOR_CLEARANCE: f32 = DOOR_GAP * 2.0;

/// Wall and side of centre for each slot, in hanging order
const SLOT_ORDER: [(WallSide, f32); PHOTO_SLOTS] = [
    (WallSide::Back, -1.0),
    (WallSide::Back, 1.0),
    (WallSide::Right, -1.0),
    (WallSide::Right, 1.0),
    (WallSide::Front, 1.0),
    (WallSide::Front, -1.0),
    (WallSide::Left, 1.0),
    (WallSide::Left, -1.0),
];

/// Where one photo hangs
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhotoSlot {
    pub wall: WallSide,
    /// Offset along the wall axis
    pub along: f32,
    /// Group origin, already pushed off the wall by the inset
    pub position: Vec3,
    pub yaw: f32,
}

/// Compute all slot positions. Slots sit at a quarter of the wall span either
/// side of centre; a slot that would overlap a door is moved clear of it and of
/// the other frame on that wall.
pub fn slot_layout(config: &GalleryConfig, geometry: &RoomGeometry) -> Vec<PhotoSlot> {
    let plan = &geometry.plan;
    let settings = &config.photos;
    // largest frame a slot can ever hold: the pending square
    let half_extent = (settings.max_side + FRAME_PADDING) * 0.5;

    let nominal: Vec<(WallSide, f32)> = SLOT_ORDER
        .iter()
        .map(|&(wall, side)| (wall, side * wall.span_length(plan) * 0.25))
        .collect();

    let mut slots: Vec<PhotoSlot> = Vec::with_capacity(PHOTO_SLOTS);
    for (i, &(wall, along)) in nominal.iter().enumerate() {
        let span = wall.span_length(plan);
        let limit = span * 0.5 - plan.wall_thickness() * 0.5 - CHAMFER_SIZE - half_extent;
        let openings: Vec<DoorOpening> = geometry.openings_on(wall).copied().collect();
        // earlier slots are final, later ones still at their nominal offset
        let siblings: Vec<f32> = slots
            .iter()
            .filter(|s| s.wall == wall)
            .map(|s| s.along)
            .chain(nominal[i + 1..].iter().filter(|(w, _)| *w == wall).map(|(_, a)| *a))
            .collect();
        let along = clear_of_openings(along, half_extent, limit, &openings, &siblings);
        slots.push(PhotoSlot {
            wall,
            along,
            position: wall.world_point(plan, along, settings.hang_height, settings.wall_inset),
            yaw: wall.facing_yaw(),
        });
    }
    slots
}

fn overlaps(along: f32, half_extent: f32, opening: &DoorOpening) -> bool {
    along + half_extent > opening.start() - DOOR_GAP && along - half_extent < opening.end() + DOOR_GAP
}

/// Two frames of the same size closer than the door gap
fn crowds(along: f32, half_extent: f32, sibling: f32) -> bool {
    (along - sibling).abs() < 2.0 * half_extent + DOOR_GAP
}

/// Move `along` off any opening it overlaps, preferring the side nearer the
/// wall centre. Left unchanged (with a warning) if no position fits.
fn clear_of_openings(
    along: f32,
    half_extent: f32,
    limit: f32,
    openings: &[DoorOpening],
    siblings: &[f32],
) -> f32 {
    let Some(blocking) = openings.iter().find(|o| overlaps(along, half_extent, o)) else {
        return along;
    };

    let mut candidates = [
        blocking.start() - DOOR_CLEARANCE - half_extent,
        blocking.end() + DOOR_CLEARANCE + half_extent,
    ];
    candidates.sort_by(|a, b| a.abs().total_cmp(&b.abs()));

    for candidate in candidates {
        let fits = candidate.abs() <= limit.max(0.0);
        if fits
            && !openings.iter().any(|o| overlaps(candidate, half_extent, o))
            && !siblings.iter().any(|s| crowds(candidate, half_extent, *s))
        {
            log::debug!("Photo slot moved from {:.2} to {:.2} to clear a door", along, candidate);
            return candidate;
        }
    }

    log::warn!("No room for a photo beside the door at {:.2}", blocking.offset);
    along
}

/// Load state of one photo
#[derive(Debug, Clone)]
pub enum PhotoState {
    /// Load in flight; shown as the max-side square
    Pending,
    Loaded { aspect: f32, image: Arc<RgbImage> },
    /// Load failed; the generated card replaces the photo for good
    Placeholder {
        label: String,
        reason: String,
        image: Arc<RgbImage>,
    },
}

/// One framed photo on the wall
#[derive(Debug, Clone)]
pub struct PhotoRecord {
    pub index: usize,
    pub source: PathBuf,
    pub slot: PhotoSlot,
    state: PhotoState,
    fitted: FittedPhoto,
    revision: u32,
}

impl PhotoRecord {
    pub fn state(&self) -> &PhotoState {
        &self.state
    }

    /// Current photo and frame sizes. Replaced wholesale on every refit.
    pub fn fitted(&self) -> &FittedPhoto {
        &self.fitted
    }

    /// Bumped each time the geometry changes
    pub fn revision(&self) -> u32 {
        self.revision
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self.state, PhotoState::Pending)
    }

    /// Natural aspect of whatever is shown; `None` while pending
    pub fn aspect(&self) -> Option<f32> {
        match &self.state {
            PhotoState::Pending => None,
            PhotoState::Loaded { aspect, .. } => Some(*aspect),
            PhotoState::Placeholder { .. } => Some(placeholder_aspect()),
        }
    }

    pub fn image(&self) -> Option<&Arc<RgbImage>> {
        match &self.state {
            PhotoState::Pending => None,
            PhotoState::Loaded { image, .. } | PhotoState::Placeholder { image, .. } => Some(image),
        }
    }

    /// Photo plane centre, just in front of the group origin
    pub fn photo_position(&self) -> Vec3 {
        self.slot.position + self.slot.wall.inward_normal() * PHOTO_OFFSET_Z
    }

    /// Frame box centre, behind the photo
    pub fn frame_position(&self) -> Vec3 {
        self.slot.position + self.slot.wall.inward_normal() * FRAME_OFFSET_Z
    }
}

/// All photos of one gallery
#[derive(Debug, Clone)]
pub struct PhotoBoard {
    fitter: PhotoFrameFitter,
    records: Vec<PhotoRecord>,
}

impl PhotoBoard {
    /// Lay out every slot in the pending state
    pub fn new(config: &GalleryConfig, geometry: &RoomGeometry) -> Self {
        let fitter = PhotoFrameFitter::new(config.photos.max_side, config.photos.frame_style);
        let pending = fitter.pending();

        let records = slot_layout(config, geometry)
            .into_iter()
            .enumerate()
            .map(|(i, slot)| PhotoRecord {
                index: i + 1,
                source: config.photo_path(i + 1),
                slot,
                state: PhotoState::Pending,
                fitted: pending,
                revision: 0,
            })
            .collect();

        Self { fitter, records }
    }

    pub fn records(&self) -> &[PhotoRecord] {
        &self.records
    }

    pub fn get(&self, slot: usize) -> Option<&PhotoRecord> {
        self.records.get(slot)
    }

    pub fn pending_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_resolved()).count()
    }

    pub fn revisions(&self) -> Vec<u32> {
        self.records.iter().map(|r| r.revision).collect()
    }

    /// Apply a finished load. Returns `Ok(false)` if the slot was already
    /// resolved; a slot is never refitted twice.
    pub fn apply(&mut self, event: LoadEvent) -> Result<bool> {
        let fitter = self.fitter;
        let record = self
            .records
            .get_mut(event.slot)
            .ok_or(GalleryError::UnknownPhotoSlot(event.slot))?;

        if record.is_resolved() {
            log::warn!("Ignoring late load event for photo {}", record.index);
            return Ok(false);
        }

        let (state, aspect) = match event.outcome {
            LoadOutcome::Loaded { width, height, image } => {
                let aspect = width as f32 / height as f32;
                (PhotoState::Loaded { aspect, image }, aspect)
            }
            LoadOutcome::Failed { reason } => {
                let label = placeholder_label(&record.source);
                log::warn!("Photo {} replaced by placeholder: {}", record.index, reason);
                let image = Arc::new(render_placeholder(&label).to_image());
                (PhotoState::Placeholder { label, reason, image }, placeholder_aspect())
            }
        };

        record.state = state;
        record.fitted = fitter.fit(aspect);
        log::debug!(
            "Photo {} refitted to {:.2}x{:.2}",
            record.index,
            record.fitted.photo.width,
            record.fitted.photo.height
        );
        record.revision += 1;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DoorSpec, Preset};
    use crate::geometry::{FrameStyle, RoomGeometryBuilder, MAX_SIDE};

    fn board_for(config: &GalleryConfig) -> (PhotoBoard, RoomGeometry) {
        let plan = config.room.plan().unwrap();
        let mut builder = RoomGeometryBuilder::new(plan);
        if let Some(door) = config.features.door {
            builder = builder.with_opening(door.wall, DoorOpening::new(door.offset, door.width, door.height));
        }
        let geometry = builder.build().unwrap();
        (PhotoBoard::new(config, &geometry), geometry)
    }

    fn loaded(slot: usize, width: u32, height: u32) -> LoadEvent {
        LoadEvent {
            slot,
            outcome: LoadOutcome::Loaded {
                width,
                height,
                image: Arc::new(RgbImage::new(width, height)),
            },
        }
    }

    #[test]
    fn test_default_layout_matches_single_room() {
        let config = GalleryConfig::default();
        let (board, _) = board_for(&config);
        let expected = [
            (-1.5, -1.86, 0.0),
            (1.5, -1.86, 0.0),
            (2.86, -1.0, -std::f32::consts::FRAC_PI_2),
            (2.86, 1.0, -std::f32::consts::FRAC_PI_2),
            (1.5, 1.86, std::f32::consts::PI),
            (-1.5, 1.86, std::f32::consts::PI),
            (-2.86, 1.0, std::f32::consts::FRAC_PI_2),
            (-2.86, -1.0, std::f32::consts::FRAC_PI_2),
        ];
        assert_eq!(board.records().len(), PHOTO_SLOTS);
        for (record, (x, z, yaw)) in board.records().iter().zip(expected) {
            let p = record.slot.position;
            assert!((p.x - x).abs() < 1e-5, "slot {} x {}", record.index, p.x);
            assert!((p.z - z).abs() < 1e-5, "slot {} z {}", record.index, p.z);
            assert!((p.y - 1.5).abs() < 1e-6);
            assert_eq!(record.slot.yaw, yaw);
        }
    }

    #[test]
    fn test_sources_follow_gallery_id() {
        let config = GalleryConfig {
            gallery_id: "north".into(),
            ..GalleryConfig::default()
        };
        let (board, _) = board_for(&config);
        assert_eq!(board.records()[0].source, PathBuf::from("images/north/1.jpg"));
        assert_eq!(board.records()[7].source, PathBuf::from("images/north/8.jpg"));
    }

    #[test]
    fn test_pending_is_max_side_square() {
        let (board, _) = board_for(&GalleryConfig::default());
        for record in board.records() {
            assert!(!record.is_resolved());
            assert!(record.aspect().is_none());
            assert_eq!(record.fitted().photo.width, MAX_SIDE);
            assert_eq!(record.fitted().photo.height, MAX_SIDE);
            assert_eq!(record.revision(), 0);
        }
        assert_eq!(board.pending_count(), 8);
    }

    #[test]
    fn test_load_refits_once() {
        let (mut board, _) = board_for(&GalleryConfig::default());
        assert!(board.apply(loaded(2, 300, 200)).unwrap());
        let record = board.get(2).unwrap();
        assert_eq!(record.revision(), 1);
        assert!((record.fitted().photo.width - 1.5).abs() < 1e-6);
        assert!((record.fitted().photo.height - 1.0).abs() < 1e-6);

        // a second event for the same slot changes nothing
        assert!(!board.apply(loaded(2, 100, 400)).unwrap());
        let record = board.get(2).unwrap();
        assert_eq!(record.revision(), 1);
        assert!((record.fitted().photo.height - 1.0).abs() < 1e-6);
        assert_eq!(board.pending_count(), 7);
    }

    #[test]
    fn test_failure_substitutes_placeholder_permanently() {
        let (mut board, _) = board_for(&GalleryConfig::default());
        let failed = LoadEvent {
            slot: 0,
            outcome: LoadOutcome::Failed {
                reason: "404".into(),
            },
        };
        assert!(board.apply(failed).unwrap());
        let record = board.get(0).unwrap();
        match record.state() {
            PhotoState::Placeholder { label, image, .. } => {
                assert_eq!(label, "NO PHOTO: 1.jpg");
                assert_eq!(image.dimensions(), (1024, 683));
            }
            other => panic!("expected placeholder, got {:?}", other),
        }
        let fitted = record.fitted().photo;
        assert!((fitted.width / fitted.height - 1024.0 / 683.0).abs() < 1e-4);

        // a late success does not replace the placeholder
        assert!(!board.apply(loaded(0, 10, 10)).unwrap());
        assert!(matches!(board.get(0).unwrap().state(), PhotoState::Placeholder { .. }));
    }

    #[test]
    fn test_unknown_slot_is_an_error() {
        let (mut board, _) = board_for(&GalleryConfig::default());
        assert!(matches!(
            board.apply(loaded(8, 10, 10)),
            Err(GalleryError::UnknownPhotoSlot(8))
        ));
    }

    #[test]
    fn test_photo_in_front_of_frame() {
        let (board, _) = board_for(&GalleryConfig::default());
        let record = &board.records()[0];
        // back wall faces +Z
        assert!(record.photo_position().z > record.slot.position.z);
        assert!(record.frame_position().z < record.slot.position.z);
    }

    #[test]
    fn test_slots_avoid_doors() {
        let config = GalleryConfig::preset(Preset::Salon);
        let (board, geometry) = board_for(&config);
        let half = (config.photos.max_side + FRAME_PADDING) * 0.5;
        for record in board.records() {
            for opening in geometry.openings_on(record.slot.wall) {
                assert!(
                    !overlaps(record.slot.along, half, opening),
                    "slot {} overlaps the door",
                    record.index
                );
            }
        }
        // the left-wall slot near the door moved towards the centre
        let slot8 = board.records()[7].slot;
        assert!(slot8.along > -2.0);
        assert!((board.records()[6].slot.along - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_clear_of_openings_prefers_centre() {
        let door = DoorOpening::new(-1.0, 1.0, 2.0);
        let moved = clear_of_openings(-1.0, 0.5, 10.0, &[door], &[]);
        assert!((moved - 0.1).abs() < 1e-6);

        let untouched = clear_of_openings(3.0, 0.5, 10.0, &[door], &[]);
        assert_eq!(untouched, 3.0);
    }

    #[test]
    fn test_clear_of_openings_skips_sibling() {
        let door = DoorOpening::new(-1.0, 1.0, 2.0);
        // 0.1 would crowd the frame at 0.5, so the far side of the door wins
        let moved = clear_of_openings(-1.0, 0.5, 10.0, &[door], &[0.5]);
        assert!((moved + 2.1).abs() < 1e-6);

        // nowhere fits: stay put
        let stuck = clear_of_openings(-1.0, 0.5, 1.0, &[door], &[0.5]);
        assert_eq!(stuck, -1.0);
    }

    #[test]
    fn test_moved_slot_keeps_clear_of_neighbour() {
        let mut config = GalleryConfig::default();
        config.features.door = Some(DoorSpec {
            wall: WallSide::Back,
            offset: -1.5,
            width: 2.0,
            height: 2.0,
        });
        let (board, _) = board_for(&config);
        let half = (config.photos.max_side + FRAME_PADDING) * 0.5;
        let records = board.records();
        for (i, a) in records.iter().enumerate() {
            for b in &records[i + 1..] {
                if a.slot.wall != b.slot.wall {
                    continue;
                }
                let gap = (a.slot.along - b.slot.along).abs() - 2.0 * half;
                assert!(gap >= 0.0, "slots {} and {} overlap by {:.2}", a.index, b.index, -gap);
            }
        }
        assert!((records[1].slot.along - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_mitred_style_carries_through() {
        let mut config = GalleryConfig::default();
        config.photos.frame_style = FrameStyle::Mitred;
        config.features.door = Some(DoorSpec {
            wall: WallSide::Front,
            offset: 0.0,
            width: 1.0,
            height: 2.0,
        });
        let (board, _) = board_for(&config);
        assert!(board.records()[0].fitted().frame.inner.is_some());
    }
}
