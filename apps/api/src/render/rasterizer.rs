//! Draws a finished [`Layout`] into a pixel buffer.
//!
//! Each word is filled into its own tile the size of its mask, using the outline and
//! orientation transform the layout engine rasterized the mask from, then composited at
//! the word's committed position. The tile clips ink to the mask box, so drawn pixels
//! never reach outside what the occupancy grid reserved.

use tiny_skia::{FillRule, Paint, Pixmap, PixmapPaint, Transform};

use crate::errors::AppError;
use crate::layout::glyph::mask_geometry;
use crate::layout::{GlyphSource, Layout, PlacedWord};

pub fn rasterize(layout: &Layout, glyphs: &dyn GlyphSource) -> Result<Pixmap, AppError> {
    let mut canvas = Pixmap::new(layout.width, layout.height).ok_or_else(|| {
        AppError::Render(format!(
            "cannot allocate a {}x{} canvas",
            layout.width, layout.height
        ))
    })?;
    canvas.fill(layout.background.to_skia());

    for word in &layout.words {
        if let Some(tile) = draw_word(word, glyphs)? {
            canvas.draw_pixmap(
                word.x as i32,
                word.y as i32,
                tile.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
    }

    Ok(canvas)
}

fn draw_word(word: &PlacedWord, glyphs: &dyn GlyphSource) -> Result<Option<Pixmap>, AppError> {
    let outline = glyphs.outline(&word.term, word.font_size as f32);
    let Some(path) = outline.path.as_ref() else {
        return Ok(None);
    };
    let (transform, width, height) = mask_geometry(&outline, word.orientation);
    debug_assert_eq!((width, height), (word.width, word.height));
    let mut tile = Pixmap::new(word.width, word.height)
        .ok_or_else(|| AppError::Render(format!("cannot allocate a tile for '{}'", word.term)))?;

    let mut paint = Paint::default();
    paint.set_color(word.color.to_skia());
    paint.anti_alias = true;

    tile.fill_path(path, &paint, FillRule::Winding, transform, None);
    Ok(Some(tile))
}
