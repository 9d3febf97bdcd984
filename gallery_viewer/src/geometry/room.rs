// geometry/room.rs - Wall spans, door carving, corner chamfers and trim placement

use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use std::fmt;

use crate::error_handling::{ensure_positive, GalleryError, Result};
use crate::types::Vec3;

/// Edge length of the 45° corner posts
pub const CHAMFER_SIZE: f32 = 0.16;
pub const BASEBOARD_HEIGHT: f32 = 0.12;
pub const BASEBOARD_DEPTH: f32 = 0.025;
pub const CORNICE_HEIGHT: f32 = 0.09;
pub const CORNICE_DEPTH: f32 = 0.04;
/// Gap left around a door leaf inside its opening
pub const DOOR_CLEARANCE: f32 = 0.01;
pub const DOOR_LEAF_DEPTH: f32 = 0.04;

/// Room dimensions. Immutable once built; every accessor returns the scaled value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomPlan {
    width: f32,
    depth: f32,
    height: f32,
    wall_thickness: f32,
    scale: f32,
}

impl RoomPlan {
    pub fn new(width: f32, depth: f32, height: f32, wall_thickness: f32, scale: f32) -> Result<Self> {
        ensure_positive("width", width)?;
        ensure_positive("depth", depth)?;
        ensure_positive("height", height)?;
        ensure_positive("wall thickness", wall_thickness)?;
        ensure_positive("scale", scale)?;
        Ok(Self {
            width,
            depth,
            height,
            wall_thickness,
            scale,
        })
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width * self.scale
    }

    #[inline]
    pub fn depth(&self) -> f32 {
        self.depth * self.scale
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height * self.scale
    }

    #[inline]
    pub fn wall_thickness(&self) -> f32 {
        self.wall_thickness * self.scale
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.width() * 0.5
    }

    #[inline]
    pub fn half_depth(&self) -> f32 {
        self.depth() * 0.5
    }
}

/// The four walls, named as seen from the room centre facing -Z
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallSide {
    /// z = -depth/2
    Back,
    /// x = +width/2
    Right,
    /// z = +depth/2
    Front,
    /// x = -width/2
    Left,
}

impl WallSide {
    pub const ALL: [WallSide; 4] = [WallSide::Back, WallSide::Right, WallSide::Front, WallSide::Left];

    /// Length of the wall along its own axis
    pub fn span_length(self, plan: &RoomPlan) -> f32 {
        match self {
            WallSide::Back | WallSide::Front => plan.width(),
            WallSide::Left | WallSide::Right => plan.depth(),
        }
    }

    /// Box rotation for wall slabs and trim running along this wall
    pub fn yaw(self) -> f32 {
        match self {
            WallSide::Back | WallSide::Front => 0.0,
            WallSide::Left | WallSide::Right => FRAC_PI_2,
        }
    }

    /// Rotation that makes a flat object face into the room
    pub fn facing_yaw(self) -> f32 {
        match self {
            WallSide::Back => 0.0,
            WallSide::Right => -FRAC_PI_2,
            WallSide::Front => PI,
            WallSide::Left => FRAC_PI_2,
        }
    }

    /// Unit vector pointing from the wall into the room
    pub fn inward_normal(self) -> Vec3 {
        match self {
            WallSide::Back => Vec3::new(0.0, 0.0, 1.0),
            WallSide::Right => Vec3::new(-1.0, 0.0, 0.0),
            WallSide::Front => Vec3::new(0.0, 0.0, -1.0),
            WallSide::Left => Vec3::new(1.0, 0.0, 0.0),
        }
    }

    /// World point at `along` on the wall axis, height `y`, pushed `inset` into the room
    pub fn world_point(self, plan: &RoomPlan, along: f32, y: f32, inset: f32) -> Vec3 {
        let base = match self {
            WallSide::Back => Vec3::new(along, y, -plan.half_depth()),
            WallSide::Front => Vec3::new(along, y, plan.half_depth()),
            WallSide::Left => Vec3::new(-plan.half_width(), y, along),
            WallSide::Right => Vec3::new(plan.half_width(), y, along),
        };
        base + self.inward_normal() * inset
    }
}

impl fmt::Display for WallSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WallSide::Back => "back",
            WallSide::Right => "right",
            WallSide::Front => "front",
            WallSide::Left => "left",
        };
        f.write_str(name)
    }
}

/// Door cut-out request. `offset` is the centre along the wall axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorOpening {
    pub offset: f32,
    pub width: f32,
    pub height: f32,
}

impl DoorOpening {
    pub fn new(offset: f32, width: f32, height: f32) -> Self {
        Self { offset, width, height }
    }

    #[inline]
    pub fn start(&self) -> f32 {
        self.offset - self.width * 0.5
    }

    #[inline]
    pub fn end(&self) -> f32 {
        self.offset + self.width * 0.5
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Uncut wall
    Full,
    /// Full-height piece beside an opening
    Jamb,
    /// Piece above an opening
    Header,
}

/// One box of wall. `span_start..span_end` is its extent along the wall axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallSegment {
    pub side: WallSide,
    pub kind: SegmentKind,
    pub span_start: f32,
    pub span_end: f32,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub center: Vec3,
    pub yaw: f32,
}

/// One piece of a carved span, before it is placed in the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanPiece {
    pub kind: SegmentKind,
    pub start: f32,
    pub end: f32,
    /// Bottom edge of the piece
    pub base: f32,
    pub height: f32,
}

impl SpanPiece {
    #[inline]
    pub fn width(&self) -> f32 {
        self.end - self.start
    }
}

/// Split a wall span of `length` (centred on 0) around `openings`.
///
/// One opening yields exactly three pieces: jamb, jamb and header. Openings
/// must lie strictly inside the span, be lower than the room and not overlap.
pub fn carve_span(
    side: WallSide,
    length: f32,
    room_height: f32,
    openings: &[DoorOpening],
) -> Result<Vec<SpanPiece>> {
    let half = length * 0.5;
    if openings.is_empty() {
        return Ok(vec![SpanPiece {
            kind: SegmentKind::Full,
            start: -half,
            end: half,
            base: 0.0,
            height: room_height,
        }]);
    }

    let mut sorted: Vec<DoorOpening> = openings.to_vec();
    sorted.sort_by(|a, b| a.offset.total_cmp(&b.offset));

    for opening in &sorted {
        if !opening.offset.is_finite() {
            return Err(GalleryError::opening(side, format!("offset {} is not finite", opening.offset)));
        }
        if !(opening.width.is_finite() && opening.width > 0.0) {
            return Err(GalleryError::opening(side, format!("width {} must be > 0", opening.width)));
        }
        if !(opening.height.is_finite() && opening.height > 0.0) {
            return Err(GalleryError::opening(side, format!("height {} must be > 0", opening.height)));
        }
        if opening.width * 0.5 >= half {
            return Err(GalleryError::opening(
                side,
                format!("width {} does not fit in a {} span", opening.width, length),
            ));
        }
        if opening.start() <= -half || opening.end() >= half {
            return Err(GalleryError::opening(
                side,
                format!(
                    "opening [{}, {}] is not inside the span [{}, {}]",
                    opening.start(),
                    opening.end(),
                    -half,
                    half
                ),
            ));
        }
        if opening.height >= room_height {
            return Err(GalleryError::opening(
                side,
                format!("height {} leaves no header under a {} ceiling", opening.height, room_height),
            ));
        }
    }

    let mut pieces = Vec::with_capacity(sorted.len() * 2 + 1);
    let mut cursor = -half;
    for opening in &sorted {
        if opening.start() <= cursor {
            return Err(GalleryError::opening(
                side,
                format!("opening at {} overlaps its neighbour", opening.offset),
            ));
        }
        pieces.push(SpanPiece {
            kind: SegmentKind::Jamb,
            start: cursor,
            end: opening.start(),
            base: 0.0,
            height: room_height,
        });
        pieces.push(SpanPiece {
            kind: SegmentKind::Header,
            start: opening.start(),
            end: opening.end(),
            base: opening.height,
            height: room_height - opening.height,
        });
        cursor = opening.end();
    }
    pieces.push(SpanPiece {
        kind: SegmentKind::Jamb,
        start: cursor,
        end: half,
        base: 0.0,
        height: room_height,
    });

    Ok(pieces)
}

/// Vertical post turned 45° to soften an interior corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChamferPlacement {
    pub center: Vec3,
    pub size: f32,
    pub height: f32,
    pub yaw: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimKind {
    Baseboard,
    Cornice,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimPlacement {
    pub side: WallSide,
    pub kind: TrimKind,
    pub length: f32,
    pub height: f32,
    pub depth: f32,
    pub center: Vec3,
    pub yaw: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceRole {
    Floor,
    Ceiling,
}

/// Horizontal plane covering the room footprint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfacePlacement {
    pub role: SurfaceRole,
    pub width: f32,
    pub depth: f32,
    pub center: Vec3,
}

/// Door panel filling an opening
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorLeaf {
    pub side: WallSide,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub center: Vec3,
    pub yaw: f32,
}

/// Light placement values derived from the room
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightRig {
    pub ambient_intensity: f32,
    pub key_position: Vec3,
    pub key_intensity: f32,
    pub key_range: f32,
    pub key_angle: f32,
    pub key_penumbra: f32,
    pub fill_position: Vec3,
    pub fill_intensity: f32,
}

impl LightRig {
    pub fn for_room(plan: &RoomPlan) -> Self {
        Self {
            ambient_intensity: 0.75,
            key_position: Vec3::new(0.0, plan.height() - 0.2, 0.0),
            key_intensity: 1.2,
            key_range: 18.0 * plan.scale(),
            key_angle: PI / 6.0,
            key_penumbra: 0.35,
            fill_position: Vec3::new(-2.0, 2.0, 2.0) * plan.scale(),
            fill_intensity: 0.25,
        }
    }
}

/// Everything the renderer needs to build the room shell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomGeometry {
    pub plan: RoomPlan,
    pub walls: Vec<WallSegment>,
    pub openings: Vec<(WallSide, DoorOpening)>,
    pub door_leaves: Vec<DoorLeaf>,
    pub chamfers: Vec<ChamferPlacement>,
    pub trims: Vec<TrimPlacement>,
    pub surfaces: Vec<SurfacePlacement>,
    pub lights: LightRig,
}

impl RoomGeometry {
    pub fn walls_on(&self, side: WallSide) -> impl Iterator<Item = &WallSegment> + '_ {
        self.walls.iter().filter(move |w| w.side == side)
    }

    pub fn openings_on(&self, side: WallSide) -> impl Iterator<Item = &DoorOpening> + '_ {
        self.openings.iter().filter(move |(s, _)| *s == side).map(|(_, o)| o)
    }
}

/// Derives the room shell from a [`RoomPlan`] and door requests
#[derive(Debug, Clone)]
pub struct RoomGeometryBuilder {
    plan: RoomPlan,
    openings: Vec<(WallSide, DoorOpening)>,
}

impl RoomGeometryBuilder {
    pub fn new(plan: RoomPlan) -> Self {
        Self {
            plan,
            openings: Vec::new(),
        }
    }

    pub fn with_opening(mut self, side: WallSide, opening: DoorOpening) -> Self {
        self.openings.push((side, opening));
        self
    }

    pub fn build(&self) -> Result<RoomGeometry> {
        let plan = self.plan;
        let thickness = plan.wall_thickness();

        let mut walls = Vec::new();
        let mut door_leaves = Vec::new();
        for side in WallSide::ALL {
            let openings: Vec<DoorOpening> = self
                .openings
                .iter()
                .filter(|(s, _)| *s == side)
                .map(|(_, o)| *o)
                .collect();

            let pieces = carve_span(side, side.span_length(&plan), plan.height(), &openings)?;
            for piece in pieces {
                let mid = (piece.start + piece.end) * 0.5;
                walls.push(WallSegment {
                    side,
                    kind: piece.kind,
                    span_start: piece.start,
                    span_end: piece.end,
                    width: piece.width(),
                    height: piece.height,
                    depth: thickness,
                    center: side.world_point(&plan, mid, piece.base + piece.height * 0.5, 0.0),
                    yaw: side.yaw(),
                });
            }

            for opening in &openings {
                let leaf_height = opening.height - DOOR_CLEARANCE;
                door_leaves.push(DoorLeaf {
                    side,
                    width: opening.width - 2.0 * DOOR_CLEARANCE,
                    height: leaf_height,
                    depth: DOOR_LEAF_DEPTH,
                    center: side.world_point(&plan, opening.offset, leaf_height * 0.5, 0.0),
                    yaw: side.yaw(),
                });
            }
        }

        let geometry = RoomGeometry {
            plan,
            walls,
            openings: self.openings.clone(),
            door_leaves,
            chamfers: chamfer_placements(&plan),
            trims: trim_placements(&plan),
            surfaces: surface_placements(&plan),
            lights: LightRig::for_room(&plan),
        };

        log::info!(
            "Built room {}x{}x{}: {} wall segments, {} openings, {} trims",
            plan.width(),
            plan.depth(),
            plan.height(),
            geometry.walls.len(),
            geometry.openings.len(),
            geometry.trims.len()
        );
        Ok(geometry)
    }
}

/// Posts sit on the corner where two interior wall faces meet
fn chamfer_placements(plan: &RoomPlan) -> Vec<ChamferPlacement> {
    let inset = plan.wall_thickness() * 0.5;
    let x = plan.half_width() - inset;
    let z = plan.half_depth() - inset;
    [(-x, -z), (x, -z), (x, z), (-x, z)]
        .into_iter()
        .map(|(cx, cz)| ChamferPlacement {
            center: Vec3::new(cx, plan.height() * 0.5, cz),
            size: CHAMFER_SIZE,
            height: plan.height(),
            yaw: FRAC_PI_4,
        })
        .collect()
}

fn trim_placements(plan: &RoomPlan) -> Vec<TrimPlacement> {
    let thickness = plan.wall_thickness();
    let mut trims = Vec::with_capacity(8);
    for side in WallSide::ALL {
        let length = side.span_length(plan) - thickness;
        for (kind, height, depth, y) in [
            (TrimKind::Baseboard, BASEBOARD_HEIGHT, BASEBOARD_DEPTH, BASEBOARD_HEIGHT * 0.5),
            (
                TrimKind::Cornice,
                CORNICE_HEIGHT,
                CORNICE_DEPTH,
                plan.height() - CORNICE_HEIGHT * 0.5,
            ),
        ] {
            trims.push(TrimPlacement {
                side,
                kind,
                length,
                height,
                depth,
                center: side.world_point(plan, 0.0, y, thickness * 0.5 + depth * 0.5),
                yaw: side.yaw(),
            });
        }
    }
    trims
}

fn surface_placements(plan: &RoomPlan) -> Vec<SurfacePlacement> {
    vec![
        SurfacePlacement {
            role: SurfaceRole::Floor,
            width: plan.width(),
            depth: plan.depth(),
            center: Vec3::zero(),
        },
        SurfacePlacement {
            role: SurfaceRole::Ceiling,
            width: plan.width(),
            depth: plan.depth(),
            center: Vec3::new(0.0, plan.height(), 0.0),
        },
    ]
}
