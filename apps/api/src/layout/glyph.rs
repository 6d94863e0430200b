//! Glyph masks: the per-pixel footprint of a word at one size and orientation.
//!
//! Masks are rasterized from the same outline and transform the renderer uses, with
//! anti-aliasing on, and every pixel with non-zero coverage is counted. Rendered ink is
//! therefore always a subset of the mask.

use serde::{Deserialize, Serialize};
use tiny_skia::{FillRule, Mask, Transform};

use crate::layout::font_metrics::WordOutline;
use crate::layout::occupancy::BitGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    /// Rotated 90° counter-clockwise; reads bottom to top.
    Vertical,
}

impl Orientation {
    /// Maps outline coordinates (horizontal box of `outline_width` px) into the
    /// oriented box with its top-left at the origin.
    pub fn transform(self, outline_width: u32) -> Transform {
        match self {
            Orientation::Horizontal => Transform::identity(),
            // (x, y) → (y, W - x)
            Orientation::Vertical => {
                Transform::from_row(0.0, -1.0, 1.0, 0.0, 0.0, outline_width as f32)
            }
        }
    }

    /// Size of the oriented box for a horizontal box of `width × height`.
    pub fn oriented_size(self, width: u32, height: u32) -> (u32, u32) {
        match self {
            Orientation::Horizontal => (width, height),
            Orientation::Vertical => (height, width),
        }
    }
}

/// Transform from outline coordinates into the oriented mask box, and that box's size.
/// The box is the word's ink frame, so overhanging ink is never clipped. The layout
/// engine and the renderer both go through here.
pub fn mask_geometry(outline: &WordOutline, orientation: Orientation) -> (Transform, u32, u32) {
    let frame = outline.ink_frame();
    let (w, h) = orientation.oriented_size(frame.width, frame.height);
    let transform = Transform::from_translate(frame.dx, frame.dy)
        .post_concat(orientation.transform(frame.width));
    (transform, w, h)
}

/// The occupancy footprint of one word.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphMask {
    bits: BitGrid,
}

impl GlyphMask {
    /// Rasterizes `outline` in `orientation`. `None` if the outline has no ink.
    pub fn rasterize(outline: &WordOutline, orientation: Orientation) -> Option<GlyphMask> {
        let path = outline.path.as_ref()?;
        let (transform, mw, mh) = mask_geometry(outline, orientation);
        let mut mask = Mask::new(mw, mh)?;
        mask.fill_path(path, FillRule::Winding, true, transform);
        let bits = BitGrid::from_coverage(mw, mh, mask.data());
        if bits.is_empty() {
            return None;
        }
        Some(GlyphMask { bits })
    }

    pub fn width(&self) -> u32 {
        self.bits.width()
    }

    pub fn height(&self) -> u32 {
        self.bits.height()
    }

    pub fn bits(&self) -> &BitGrid {
        &self.bits
    }

    pub fn ink(&self) -> usize {
        self.bits.count_ones()
    }

    /// True if `self` at `origin` and `other` at `other_origin` share a pixel.
    pub fn intersects(&self, origin: (u32, u32), other: &GlyphMask, other_origin: (u32, u32)) -> bool {
        let (dx, dy) = (
            origin.0 as i64 - other_origin.0 as i64,
            origin.1 as i64 - other_origin.1 as i64,
        );
        self.bits.iter_ones().any(|(x, y)| {
            let (ox, oy) = (x as i64 + dx, y as i64 + dy);
            ox >= 0 && oy >= 0 && other.bits.get(ox as u32, oy as u32)
        })
    }
}
