//! Glyph sources: turn a word at a font size into a vector outline.
//!
//! Two backends implement [`GlyphSource`]:
//! - [`BlockFace`] (here): a built-in face that draws each character as a solid block
//!   sized from a static em-width table. Deterministic and font-free, so layouts are
//!   reproducible in tests and on hosts without fonts.
//! - `OutlineFace` (see `outline.rs`): real TrueType/OpenType outlines.
//!
//! Outline coordinates are pixels, origin at the top-left of the word's advance box,
//! y pointing down. The box is `width` (sum of advances) by `height` (line height).

use tiny_skia::{Path, PathBuilder, Rect};

/// A word's outline and its unrotated advance box, in pixels.
#[derive(Debug, Clone)]
pub struct WordOutline {
    /// `None` when the word has no ink (whitespace, unsupported glyphs only).
    pub path: Option<Path>,
    pub width: f32,
    pub height: f32,
}

impl WordOutline {
    /// Pixel size of the advance box, at least 1×1.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.width.ceil().max(1.0) as u32,
            self.height.ceil().max(1.0) as u32,
        )
    }

    /// The pixel box that holds both the advance box and every bit of ink. Real faces
    /// can draw past the advance box (negative left bearing, accents above the ascender).
    pub fn ink_frame(&self) -> InkFrame {
        let (w, h) = self.pixel_size();
        let (mut left, mut top, mut right, mut bottom) = (0.0_f32, 0.0_f32, w as f32, h as f32);
        if let Some(path) = &self.path {
            let bounds = path.bounds();
            left = left.min(bounds.left().floor());
            top = top.min(bounds.top().floor());
            right = right.max(bounds.right().ceil());
            bottom = bottom.max(bounds.bottom().ceil());
        }
        InkFrame {
            dx: -left,
            dy: -top,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        }
    }
}

/// Unrotated pixel frame of a word. Outline point (x, y) lands at (x + dx, y + dy).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InkFrame {
    pub dx: f32,
    pub dy: f32,
    pub width: u32,
    pub height: u32,
}

/// Pluggable glyph backend. Carried as `Arc<dyn GlyphSource>` in application state.
pub trait GlyphSource: Send + Sync {
    /// Human-readable face name, for logs.
    fn name(&self) -> &str;

    /// Outlines `text` laid out on one line at `font_size` pixels per em.
    fn outline(&self, text: &str, font_size: f32) -> WordOutline;
}

// ────────────────────────────────────────────────────────────────────────────
// Block face
// ────────────────────────────────────────────────────────────────────────────

/// Vertical extent class of a block glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GlyphShape {
    /// No ink.
    Blank,
    /// Capitals, digits, ascender letters.
    Tall,
    /// x-height letters.
    Short,
    /// Letters with a descender.
    Descending,
    /// Commas, periods, underscores.
    Low,
    /// Ideographs and other full-width characters.
    Wide,
}

// Vertical metrics in em, y down, baseline at ASCENT.
const ASCENT: f32 = 0.8;
const CAP_HEIGHT: f32 = 0.7;
const X_HEIGHT: f32 = 0.5;
const DESCENT: f32 = 0.2;
const LINE_HEIGHT: f32 = ASCENT + DESCENT;
const SIDE_BEARING: f32 = 0.08;

/// Built-in block glyph face.
///
/// `widths[i]` = advance of ASCII character `(i + 32)` in em, covering 0x20 (space)
/// through 0x7E (~).
///
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct BlockFace {
    widths: [f32; 95],
    /// Advance for non-ASCII, non-wide characters.
    average_char_width: f32,
    /// Advance for ideographs and other full-width characters.
    wide_char_width: f32,
}

static BLOCK_FACE: BlockFace = BlockFace {
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.25, 0.30, 0.38, 0.56, 0.56, 0.89, 0.67, 0.22, 0.33, 0.33, 0.39, 0.59, 0.28, 0.33, 0.28, 0.31,
        // 0     1     2     3     4     5     6     7     8     9
        0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56,
        // :     ;     <     =     >     ?     @
        0.28, 0.28, 0.59, 0.59, 0.59, 0.50, 1.02,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.67, 0.61, 0.61, 0.67, 0.56, 0.50, 0.67, 0.67, 0.25, 0.39, 0.61, 0.53, 0.78,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.67, 0.72, 0.56, 0.72, 0.61, 0.50, 0.56, 0.67, 0.67, 0.89, 0.61, 0.61, 0.56,
        // [     \     ]     ^     _     `
        0.28, 0.31, 0.28, 0.47, 0.56, 0.34,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.56, 0.56, 0.50, 0.56, 0.56, 0.31, 0.56, 0.56, 0.22, 0.22, 0.53, 0.22, 0.83,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.56, 0.56, 0.56, 0.56, 0.33, 0.44, 0.39, 0.56, 0.50, 0.72, 0.50, 0.50, 0.44,
        // {     |     }     ~
        0.33, 0.26, 0.33, 0.59,
    ],
    average_char_width: 0.56,
    wide_char_width: 1.0,
};

impl BlockFace {
    /// The shared built-in face.
    pub fn shared() -> &'static BlockFace {
        &BLOCK_FACE
    }

    /// Advance of one character in em.
    pub fn advance(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else if is_wide(c) {
            self.wide_char_width
        } else if c.is_whitespace() {
            self.widths[0]
        } else {
            self.average_char_width
        }
    }

    /// Width of a string in em.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.advance(c)).sum()
    }
}

fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3040..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x20000..=0x3FFFD
    )
}

fn shape_of(c: char) -> GlyphShape {
    if c.is_whitespace() || c.is_control() {
        return GlyphShape::Blank;
    }
    if is_wide(c) {
        return GlyphShape::Wide;
    }
    match c {
        'g' | 'j' | 'p' | 'q' | 'y' => GlyphShape::Descending,
        ',' | '.' | '_' => GlyphShape::Low,
        'a' | 'c' | 'e' | 'm' | 'n' | 'o' | 'r' | 's' | 'u' | 'v' | 'w' | 'x' | 'z' => {
            GlyphShape::Short
        }
        _ => GlyphShape::Tall,
    }
}

/// Top and bottom of a block glyph in em, y down.
fn vertical_extent(shape: GlyphShape) -> Option<(f32, f32)> {
    match shape {
        GlyphShape::Blank => None,
        GlyphShape::Tall => Some((ASCENT - CAP_HEIGHT, ASCENT)),
        GlyphShape::Short => Some((ASCENT - X_HEIGHT, ASCENT)),
        GlyphShape::Descending => Some((ASCENT - X_HEIGHT, LINE_HEIGHT - 0.02)),
        GlyphShape::Low => Some((ASCENT - 0.15, ASCENT)),
        GlyphShape::Wide => Some((0.06, LINE_HEIGHT - 0.06)),
    }
}

impl GlyphSource for BlockFace {
    fn name(&self) -> &str {
        "built-in block face"
    }

    fn outline(&self, text: &str, font_size: f32) -> WordOutline {
        let mut builder = PathBuilder::new();
        let mut pen = 0.0_f32;

        for c in text.chars() {
            let advance = self.advance(c) * font_size;
            if let Some((top, bottom)) = vertical_extent(shape_of(c)) {
                let inset = SIDE_BEARING * advance;
                let rect = Rect::from_ltrb(
                    pen + inset,
                    top * font_size,
                    pen + advance - inset,
                    bottom * font_size,
                );
                if let Some(rect) = rect {
                    builder.push_rect(rect);
                }
            }
            pen += advance;
        }

        WordOutline {
            path: builder.finish(),
            width: pen,
            height: LINE_HEIGHT * font_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_empty_returns_zero() {
        assert_eq!(BlockFace::shared().measure_str(""), 0.0);
    }

    #[test]
    fn test_measure_str_ascii_characters() {
        // "Rust" = R(0.61) + u(0.56) + s(0.44) + t(0.39) = 2.00
        let width = BlockFace::shared().measure_str("Rust");
        assert!((width - 2.00).abs() < 1e-3, "Rust width should be ~2.00, got {width}");
    }

    #[test]
    fn test_ideographs_are_full_width() {
        let face = BlockFace::shared();
        assert_eq!(face.advance('词'), 1.0);
        assert_eq!(face.advance('é'), face.average_char_width);
    }

    #[test]
    fn test_outline_box_scales_with_font_size() {
        let face = BlockFace::shared();
        let small = face.outline("cat", 10.0);
        let large = face.outline("cat", 40.0);
        assert!((large.width - small.width * 4.0).abs() < 1e-3);
        assert!((large.height - 40.0).abs() < 1e-3);
        assert_eq!(small.pixel_size(), (15, 10));
    }

    #[test]
    fn test_outline_of_whitespace_has_no_ink() {
        let outline = BlockFace::shared().outline("   ", 20.0);
        assert!(outline.path.is_none());
        assert!(outline.width > 0.0);
    }

    #[test]
    fn test_outline_ink_stays_inside_box() {
        let outline = BlockFace::shared().outline("gyp词Q", 30.0);
        let bounds = outline.path.unwrap().bounds();
        assert!(bounds.left() >= 0.0 && bounds.top() >= 0.0);
        assert!(bounds.right() <= outline.width && bounds.bottom() <= outline.height);
    }

    #[test]
    fn test_ink_frame_of_block_face_is_advance_box() {
        let outline = BlockFace::shared().outline("gyp词Q", 30.0);
        let frame = outline.ink_frame();
        assert_eq!((frame.width, frame.height), outline.pixel_size());
        assert_eq!((frame.dx, frame.dy), (0.0, 0.0));
    }

    #[test]
    fn test_ink_frame_covers_overhanging_ink() {
        let mut builder = PathBuilder::new();
        builder.push_rect(Rect::from_ltrb(-4.5, -3.0, 12.0, 10.0).unwrap());
        let outline = WordOutline {
            path: builder.finish(),
            width: 10.0,
            height: 8.0,
        };
        let frame = outline.ink_frame();
        assert_eq!((frame.dx, frame.dy), (5.0, 3.0));
        assert_eq!((frame.width, frame.height), (17, 13));
    }

    #[test]
    fn test_glyph_shapes_differ_by_class() {
        assert_eq!(shape_of('x'), GlyphShape::Short);
        assert_eq!(shape_of('k'), GlyphShape::Tall);
        assert_eq!(shape_of('y'), GlyphShape::Descending);
        assert_eq!(shape_of('.'), GlyphShape::Low);
        assert_eq!(shape_of('云'), GlyphShape::Wide);
        assert_eq!(shape_of(' '), GlyphShape::Blank);
    }
}
