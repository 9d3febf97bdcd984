// geometry/frame.rs - Aspect-preserving photo fit and frame outlines

use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

use crate::types::Size2;

/// Longest side of a fitted photo
pub const MAX_SIDE: f32 = 1.5;
/// Added to each photo axis to get the outer frame size
pub const FRAME_PADDING: f32 = 0.08;
pub const FRAME_DEPTH: f32 = 0.06;
/// Width of one mitred frame member
pub const MEMBER_THICKNESS: f32 = 0.04;
pub const CORNER_RADIUS: f32 = 0.03;
/// Smallest inner hole edge; keeps tiny photos from producing inverted outlines
pub const MIN_HOLE: f32 = 0.02;
/// Photo plane offset in front of the group origin
pub const PHOTO_OFFSET_Z: f32 = 0.002;
/// Frame box centre offset behind the group origin
pub const FRAME_OFFSET_Z: f32 = -0.03;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStyle {
    /// Single box behind the photo
    #[default]
    Solid,
    /// Four mitred members around a rounded hole
    Mitred,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameEdge {
    Top,
    Right,
    Bottom,
    Left,
}

/// One trapezoidal member of a mitred frame, corners in frame-plane coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MitredPiece {
    pub edge: FrameEdge,
    /// outer-start, outer-end, inner-end, inner-start
    pub corners: [[f32; 2]; 4],
}

/// Frame outline derived from a fitted photo size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub style: FrameStyle,
    pub outer: Size2,
    pub depth: f32,
    pub member_thickness: f32,
    pub corner_radius: f32,
    /// Hole through a mitred frame; `None` for solid frames
    pub inner: Option<Size2>,
    pub inner_radius: f32,
}

impl FrameGeometry {
    /// Closed outline of the outer edge, counter-clockwise
    pub fn outer_outline(&self, segments_per_corner: usize) -> Vec<[f32; 2]> {
        rounded_rect_outline(self.outer, self.corner_radius, segments_per_corner)
    }

    pub fn inner_outline(&self, segments_per_corner: usize) -> Option<Vec<[f32; 2]>> {
        self.inner
            .map(|inner| rounded_rect_outline(inner, self.inner_radius, segments_per_corner))
    }

    /// The four members of a mitred frame
    pub fn mitred_pieces(&self) -> Option<[MitredPiece; 4]> {
        let inner = self.inner?;
        let (ox, oy) = (self.outer.width * 0.5, self.outer.height * 0.5);
        let (ix, iy) = (inner.width * 0.5, inner.height * 0.5);
        Some([
            MitredPiece {
                edge: FrameEdge::Top,
                corners: [[-ox, oy], [ox, oy], [ix, iy], [-ix, iy]],
            },
            MitredPiece {
                edge: FrameEdge::Right,
                corners: [[ox, oy], [ox, -oy], [ix, -iy], [ix, iy]],
            },
            MitredPiece {
                edge: FrameEdge::Bottom,
                corners: [[ox, -oy], [-ox, -oy], [-ix, -iy], [ix, -iy]],
            },
            MitredPiece {
                edge: FrameEdge::Left,
                corners: [[-ox, -oy], [-ox, oy], [-ix, iy], [-ix, -iy]],
            },
        ])
    }
}

/// Fitted photo plane plus the frame built around it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedPhoto {
    pub photo: Size2,
    pub frame: FrameGeometry,
}

/// Sizes photos to a maximum side and frames them consistently
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoFrameFitter {
    pub max_side: f32,
    pub padding: f32,
    pub depth: f32,
    pub member_thickness: f32,
    pub corner_radius: f32,
    pub style: FrameStyle,
}

impl Default for PhotoFrameFitter {
    fn default() -> Self {
        Self::new(MAX_SIDE, FrameStyle::Solid)
    }
}

impl PhotoFrameFitter {
    pub fn new(max_side: f32, style: FrameStyle) -> Self {
        Self {
            max_side,
            padding: FRAME_PADDING,
            depth: FRAME_DEPTH,
            member_thickness: MEMBER_THICKNESS,
            corner_radius: CORNER_RADIUS,
            style,
        }
    }

    /// Photo size for `aspect = width / height`. The longer side equals `max_side`.
    pub fn fit_photo(&self, aspect: f32) -> Size2 {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            log::warn!("Unusable aspect ratio {}, fitting as square", aspect);
            1.0
        };

        if aspect >= 1.0 {
            Size2::new(self.max_side, self.max_side / aspect)
        } else {
            Size2::new(self.max_side * aspect, self.max_side)
        }
    }

    /// Frame around an already fitted photo
    pub fn frame_for(&self, photo: Size2) -> FrameGeometry {
        let outer = Size2::new(photo.width + self.padding, photo.height + self.padding);
        let corner_radius = self.corner_radius.min(outer.width.min(outer.height) * 0.5);

        match self.style {
            FrameStyle::Solid => FrameGeometry {
                style: FrameStyle::Solid,
                outer,
                depth: self.depth,
                member_thickness: 0.0,
                corner_radius,
                inner: None,
                inner_radius: 0.0,
            },
            FrameStyle::Mitred => {
                let inner = Size2::new(
                    (outer.width - 2.0 * self.member_thickness).max(MIN_HOLE),
                    (outer.height - 2.0 * self.member_thickness).max(MIN_HOLE),
                );
                let inner_radius = (corner_radius - self.member_thickness * 0.5)
                    .max(0.0)
                    .min(inner.width.min(inner.height) * 0.5);
                FrameGeometry {
                    style: FrameStyle::Mitred,
                    outer,
                    depth: self.depth,
                    member_thickness: self.member_thickness,
                    corner_radius,
                    inner: Some(inner),
                    inner_radius,
                }
            }
        }
    }

    pub fn fit(&self, aspect: f32) -> FittedPhoto {
        let photo = self.fit_photo(aspect);
        FittedPhoto {
            photo,
            frame: self.frame_for(photo),
        }
    }

    /// Geometry shown while an image is still loading: a max-side square
    pub fn pending(&self) -> FittedPhoto {
        self.fit(1.0)
    }
}

/// Rounded rectangle centred on the origin. `radius` is clamped to half the short side.
pub fn rounded_rect_outline(size: Size2, radius: f32, segments_per_corner: usize) -> Vec<[f32; 2]> {
    let hx = size.width * 0.5;
    let hy = size.height * 0.5;
    let radius = radius.max(0.0).min(hx.min(hy));

    if radius <= f32::EPSILON || segments_per_corner == 0 {
        return vec![[hx, -hy], [hx, hy], [-hx, hy], [-hx, -hy]];
    }

    // corner centres, counter-clockwise from bottom-right
    let centres = [
        [hx - radius, -hy + radius],
        [hx - radius, hy - radius],
        [-hx + radius, hy - radius],
        [-hx + radius, -hy + radius],
    ];

    let mut points = Vec::with_capacity(4 * (segments_per_corner + 1));
    for (quadrant, centre) in centres.iter().enumerate() {
        let start = -FRAC_PI_2 + quadrant as f32 * FRAC_PI_2;
        for step in 0..=segments_per_corner {
            let angle = start + FRAC_PI_2 * step as f32 / segments_per_corner as f32;
            let (sin, cos) = angle.sin_cos();
            points.push([centre[0] + cos * radius, centre[1] + sin * radius]);
        }
    }
    points
}
