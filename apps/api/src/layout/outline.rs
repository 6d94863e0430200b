//! TrueType/OpenType glyph source.
//!
//! Glyph outlines come from `ttf-parser` in font design units (y up) and are converted
//! to tiny-skia paths, then scaled and flipped into the word's pixel box. Fonts are
//! either loaded from an explicit file or discovered through `fontdb`; when neither
//! yields a usable face the built-in [`BlockFace`] takes over.

use std::path::Path as FsPath;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tiny_skia::{PathBuilder, Transform};
use tracing::{info, warn};

use crate::layout::font_metrics::{BlockFace, GlyphSource, WordOutline};

// ────────────────────────────────────────────────────────────────────────────
// ttf-parser → tiny-skia
// ────────────────────────────────────────────────────────────────────────────

/// Receives `ttf_parser::OutlineBuilder` commands and records them into a tiny-skia path.
struct GlyphOutlineBuilder {
    builder: PathBuilder,
}

impl GlyphOutlineBuilder {
    fn new() -> Self {
        Self {
            builder: PathBuilder::new(),
        }
    }
}

impl ttf_parser::OutlineBuilder for GlyphOutlineBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

/// Maps design units to pixels: scale, flip Y, move the baseline to `baseline_y`.
fn glyph_transform(scale: f32, pen_x: f32, baseline_y: f32) -> Transform {
    Transform::from_row(scale, 0.0, 0.0, -scale, pen_x, baseline_y)
}

// ────────────────────────────────────────────────────────────────────────────
// Outline face
// ────────────────────────────────────────────────────────────────────────────

/// A parsed font file kept as raw bytes; faces are re-borrowed per call.
pub struct OutlineFace {
    name: String,
    data: Arc<Vec<u8>>,
    index: u32,
    units_per_em: f32,
    ascender: f32,
    descender: f32,
}

impl OutlineFace {
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>, index: u32) -> Result<Self> {
        let name = name.into();
        let face = ttf_parser::Face::parse(&data, index)
            .map_err(|e| anyhow!("failed to parse font '{name}': {e}"))?;
        let units_per_em = face.units_per_em() as f32;
        let ascender = face.ascender() as f32;
        let descender = face.descender() as f32;
        Ok(Self {
            name,
            data: Arc::new(data),
            index,
            units_per_em,
            ascender,
            descender,
        })
    }

    pub fn from_file(path: &FsPath) -> Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("failed to read font file {}", path.display()))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(name, data, 0)
    }
}

impl GlyphSource for OutlineFace {
    fn name(&self) -> &str {
        &self.name
    }

    fn outline(&self, text: &str, font_size: f32) -> WordOutline {
        let scale = font_size / self.units_per_em;
        let baseline_y = self.ascender * scale;
        let height = (self.ascender - self.descender) * scale;

        // Validated in `from_bytes`; a failure here means the bytes changed under us.
        let Ok(face) = ttf_parser::Face::parse(&self.data, self.index) else {
            return WordOutline {
                path: None,
                width: 0.0,
                height,
            };
        };

        let mut word = PathBuilder::new();
        let mut pen = 0.0_f32;
        for c in text.chars() {
            let glyph = face.glyph_index(c).unwrap_or(ttf_parser::GlyphId(0));
            let mut builder = GlyphOutlineBuilder::new();
            if face.outline_glyph(glyph, &mut builder).is_some() {
                if let Some(path) = builder
                    .builder
                    .finish()
                    .and_then(|p| p.transform(glyph_transform(scale, pen, baseline_y)))
                {
                    word.push_path(&path);
                }
            }
            let advance = face
                .glyph_hor_advance(glyph)
                .map_or(self.units_per_em / 2.0, f32::from);
            pen += advance * scale;
        }

        WordOutline {
            path: word.finish(),
            width: pen,
            height,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Discovery
// ────────────────────────────────────────────────────────────────────────────

/// Resolves the glyph source for the process.
///
/// Order: explicit font file, then `family` via the system font database, then the
/// default sans-serif family, then the built-in block face.
pub fn load_glyph_source(font_path: Option<&FsPath>, family: Option<&str>) -> Arc<dyn GlyphSource> {
    if let Some(path) = font_path {
        match OutlineFace::from_file(path) {
            Ok(face) => {
                info!("Using font file {}", path.display());
                return Arc::new(face);
            }
            Err(e) => warn!("Ignoring font file: {e:#}"),
        }
    }

    match query_system_font(family) {
        Ok(face) => {
            info!("Using system font '{}'", face.name);
            Arc::new(face)
        }
        Err(e) => {
            warn!("No usable system font ({e:#}); falling back to the built-in block face");
            Arc::new(BlockFaceSource)
        }
    }
}

fn query_system_font(family: Option<&str>) -> Result<OutlineFace> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();

    let mut families = Vec::with_capacity(2);
    if let Some(name) = family {
        families.push(fontdb::Family::Name(name));
    }
    families.push(fontdb::Family::SansSerif);

    let query = fontdb::Query {
        families: &families,
        ..Default::default()
    };
    let id = db
        .query(&query)
        .ok_or_else(|| anyhow!("no face matches {families:?}"))?;
    let name = db
        .face(id)
        .and_then(|info| info.families.first().map(|(name, _)| name.clone()))
        .unwrap_or_else(|| "system font".to_string());

    db.with_face_data(id, |data, index| {
        OutlineFace::from_bytes(name, data.to_vec(), index)
    })
    .ok_or_else(|| anyhow!("font data for {id:?} is unavailable"))?
}

/// Owned handle to the shared block face, so it can sit behind `Arc<dyn GlyphSource>`.
pub struct BlockFaceSource;

impl GlyphSource for BlockFaceSource {
    fn name(&self) -> &str {
        BlockFace::shared().name()
    }

    fn outline(&self, text: &str, font_size: f32) -> WordOutline {
        BlockFace::shared().outline(text, font_size)
    }
}
