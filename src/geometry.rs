//! Mapping of two-point label shapes onto boxes in the resized image.

use serde::{Deserialize, Serialize};

use crate::config::BoxPolicy;
use crate::types::LabelShape;

/// Slack allowed when comparing scaled coordinates against the image border.
pub const EDGE_TOLERANCE: f64 = 1e-9;

/// Ratio between the target and the original resolution on each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor {
    pub scale_x: f64,
    pub scale_y: f64,
}

impl ScaleFactor {
    pub fn new(scale_x: f64, scale_y: f64) -> Self {
        Self { scale_x, scale_y }
    }

    pub fn from_resolutions(
        original_width: u32,
        original_height: u32,
        target_width: u32,
        target_height: u32,
    ) -> Self {
        Self {
            scale_x: target_width as f64 / original_width as f64,
            scale_y: target_height as f64 / original_height as f64,
        }
    }
}

/// Axis-aligned box `(x, y, w, h)` in target pixel space. `w` and `h` are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl From<[f64; 4]> for BoundingBox {
    fn from([x, y, w, h]: [f64; 4]) -> Self {
        Self { x, y, w, h }
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(bbox: BoundingBox) -> Self {
        [bbox.x, bbox.y, bbox.w, bbox.h]
    }
}

impl BoundingBox {
    /// Box spanned by two corners given in any order
    pub fn from_corners(p1: (f64, f64), p2: (f64, f64)) -> Self {
        Self {
            x: p1.0.min(p2.0),
            y: p1.1.min(p2.1),
            w: (p2.0 - p1.0).abs(),
            h: (p2.1 - p1.1).abs(),
        }
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Whether the box lies entirely inside `[0, width] x [0, height]`.
    ///
    /// Edges within `EDGE_TOLERANCE` of the border count as inside.
    pub fn is_within(&self, width: u32, height: u32) -> bool {
        self.x >= -EDGE_TOLERANCE
            && self.y >= -EDGE_TOLERANCE
            && self.right() <= width as f64 + EDGE_TOLERANCE
            && self.bottom() <= height as f64 + EDGE_TOLERANCE
    }

    /// Clip the box to `[0, width] x [0, height]`.
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let (x1, y1) = clamp_coords(self.x, self.y, width, height);
        let (x2, y2) = clamp_coords(self.right(), self.bottom(), width, height);
        Self::from_corners((x1, y1), (x2, y2))
    }
}

/// Scale both corners of `shape` and return the box they span.
pub fn normalize(shape: &LabelShape, scale: ScaleFactor) -> BoundingBox {
    let p1 = (shape.p1.0 * scale.scale_x, shape.p1.1 * scale.scale_y);
    let p2 = (shape.p2.0 * scale.scale_x, shape.p2.1 * scale.scale_y);
    BoundingBox::from_corners(p1, p2)
}

/// Apply the out-of-bounds policy to a normalized box.
///
/// Returns `None` when the policy is `Reject` and the box leaves the target image.
pub fn apply_box_policy(
    bbox: BoundingBox,
    policy: BoxPolicy,
    width: u32,
    height: u32,
) -> Option<BoundingBox> {
    match policy {
        BoxPolicy::PassThrough => Some(bbox),
        BoxPolicy::Clamp => Some(bbox.clamp_to(width, height)),
        BoxPolicy::Reject if bbox.is_within(width, height) => Some(bbox),
        BoxPolicy::Reject => None,
    }
}

/// Clamp coordinates to image bounds
pub fn clamp_coords(x: f64, y: f64, width: u32, height: u32) -> (f64, f64) {
    let x = x.max(0.0).min(width as f64);
    let y = y.max(0.0).min(height as f64);
    (x, y)
}
