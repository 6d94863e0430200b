//! Word placement: ranked terms → non-overlapping glyphs on a fixed canvas.
//!
//! # Architecture
//! - `run_layout` is the synchronous entry point. It owns one [`OccupancyMap`] and
//!   walks the ranked terms once, most frequent first.
//! - Each term gets an [`AttemptSchedule`]: `(size, horizontal)`, `(size, vertical)`,
//!   then the same at `size - font_step`, down to and including `min_font_size`.
//! - The schedule starts at the largest size whose box can fit the canvas, and any
//!   attempt whose box is still too large is skipped before rasterizing.
//! - Each attempt rasterizes a [`GlyphMask`] and walks a [`Spiral`] from the canvas
//!   center. The first collision-free position wins and the mask is stamped into the
//!   occupancy grid, dilated by `margin`.
//! - A term whose schedule runs out is recorded as [`LayoutExhausted`] and skipped.
//!
//! A term never starts larger than the last placed term, so font size stays
//! monotonic in frequency even after earlier terms had to shrink.
//!
//! CPU-bound. Callers on the async runtime must go through `spawn_blocking`.

use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::layout::font_metrics::{GlyphSource, WordOutline};
use crate::layout::glyph::{mask_geometry, GlyphMask, Orientation};
use crate::layout::occupancy::OccupancyMap;
use crate::layout::scaling::FontScale;
use crate::layout::spiral::Spiral;
use crate::render::color::{word_color, Rgb};
use crate::text::FrequencyEntry;

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutConfig {
    pub width: u32,
    pub height: u32,
    pub background: Rgb,
    pub max_words: usize,
    pub min_font_size: u32,
    pub max_font_size: u32,
    /// Shrink step between attempts, in pixels.
    pub font_step: u32,
    /// Distance between spiral samples, in pixels.
    pub spiral_step: u32,
    /// Minimum gap kept between glyphs, in pixels.
    pub margin: u32,
    pub allow_vertical: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 400,
            background: Rgb::WHITE,
            max_words: 100,
            min_font_size: 10,
            max_font_size: 100,
            font_step: 2,
            spiral_step: 2,
            margin: 2,
            allow_vertical: true,
        }
    }
}

/// Upper bound on canvas side length; keeps the occupancy grid and PNG reasonable.
pub const MAX_CANVAS_SIDE: u32 = 4096;

/// `max_font_size` may be at most this many times the longer canvas side. Nothing
/// larger can ever fit, and the schedule starts at the largest size that does.
pub const FONT_SIZE_CANVAS_FACTOR: u32 = 10;

/// Margin always accepted, even on canvases too small for `min(width, height) / 2`.
const MIN_MARGIN_CAP: u32 = 2;

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        let invalid = |msg: String| Err(AppError::Validation(msg));
        if !(1..=MAX_CANVAS_SIDE).contains(&self.width) || !(1..=MAX_CANVAS_SIDE).contains(&self.height) {
            return invalid(format!(
                "canvas must be between 1x1 and {MAX_CANVAS_SIDE}x{MAX_CANVAS_SIDE}, got {}x{}",
                self.width, self.height
            ));
        }
        if self.max_words == 0 {
            return invalid("max_words must be at least 1".into());
        }
        if self.min_font_size == 0 || self.min_font_size > self.max_font_size {
            return invalid(format!(
                "font sizes must satisfy 1 <= min <= max, got {}..{}",
                self.min_font_size, self.max_font_size
            ));
        }
        if self.max_font_size > self.max_font_size_cap() {
            return invalid(format!(
                "max_font_size must be at most {} on a {}x{} canvas, got {}",
                self.max_font_size_cap(),
                self.width,
                self.height,
                self.max_font_size
            ));
        }
        if self.font_step == 0 || self.spiral_step == 0 {
            return invalid("font_step and spiral_step must be at least 1".into());
        }
        if self.margin > self.margin_cap() {
            return invalid(format!(
                "margin must be at most {} on a {}x{} canvas, got {}",
                self.margin_cap(),
                self.width,
                self.height,
                self.margin
            ));
        }
        Ok(())
    }

    pub fn max_font_size_cap(&self) -> u32 {
        self.width.max(self.height).saturating_mul(FONT_SIZE_CANVAS_FACTOR)
    }

    pub fn margin_cap(&self) -> u32 {
        (self.width.min(self.height) / 2).max(MIN_MARGIN_CAP)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Attempt schedule
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    pub font_size: u32,
    pub orientation: Orientation,
}

/// Per-term retry order: every size from `start` down to `min` in `step` decrements,
/// horizontal then (optionally) vertical at each size. `min` is always tried.
#[derive(Debug, Clone)]
pub struct AttemptSchedule {
    next_size: Option<u32>,
    pending_vertical: Option<u32>,
    min: u32,
    step: u32,
    allow_vertical: bool,
}

impl AttemptSchedule {
    pub fn new(start: u32, min: u32, step: u32, allow_vertical: bool) -> Self {
        Self {
            next_size: Some(start.max(min)),
            pending_vertical: None,
            min,
            step: step.max(1),
            allow_vertical,
        }
    }

    /// Upper bound on the number of attempts the schedule yields.
    pub fn max_len(start: u32, min: u32, step: u32, allow_vertical: bool) -> usize {
        let sizes = (start.saturating_sub(min)).div_ceil(step.max(1)) as usize + 1;
        if allow_vertical {
            2 * sizes
        } else {
            sizes
        }
    }
}

impl Iterator for AttemptSchedule {
    type Item = Attempt;

    fn next(&mut self) -> Option<Attempt> {
        if let Some(font_size) = self.pending_vertical.take() {
            return Some(Attempt {
                font_size,
                orientation: Orientation::Vertical,
            });
        }
        let font_size = self.next_size?;
        self.next_size = if font_size <= self.min {
            None
        } else {
            Some(font_size.saturating_sub(self.step).max(self.min))
        };
        if self.allow_vertical {
            self.pending_vertical = Some(font_size);
        }
        Some(Attempt {
            font_size,
            orientation: Orientation::Horizontal,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// A committed word. `x`, `y` is the top-left of its oriented box.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedWord {
    pub term: String,
    pub count: u32,
    pub font_size: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub orientation: Orientation,
    pub color: Rgb,
    #[serde(skip)]
    pub mask: GlyphMask,
}

impl PlacedWord {
    pub fn overlaps(&self, other: &PlacedWord) -> bool {
        self.mask
            .intersects((self.x, self.y), &other.mask, (other.x, other.y))
    }
}

/// A term that found no room at any size in its schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("no room for '{term}' down to {smallest_size}px after {attempts} attempts")]
pub struct LayoutExhausted {
    pub term: String,
    pub count: u32,
    pub smallest_size: u32,
    pub attempts: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub background: Rgb,
    pub words: Vec<PlacedWord>,
    pub dropped: Vec<LayoutExhausted>,
}

// ────────────────────────────────────────────────────────────────────────────
// Placement
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct RunStats {
    attempts: usize,
    probes: usize,
}

/// Lays out `ranked` (frequency-descending) on a fresh canvas.
pub fn run_layout(ranked: &[FrequencyEntry], config: &LayoutConfig, glyphs: &dyn GlyphSource) -> Layout {
    let entries = &ranked[..ranked.len().min(config.max_words)];
    let scale = FontScale::new(entries, config.min_font_size, config.max_font_size);
    let mut occupancy = OccupancyMap::new(config.width, config.height);
    let mut stats = RunStats::default();
    let margin = config.margin.min(config.margin_cap());

    let mut words: Vec<PlacedWord> = Vec::with_capacity(entries.len());
    let mut dropped = Vec::new();
    let mut ceiling = config.max_font_size;

    for entry in entries {
        let start = scale.size_for(entry.count).min(ceiling);
        let start = largest_fitting_size(&entry.term, start, config, glyphs);
        match place_term(entry, start, words.len(), margin, config, glyphs, &mut occupancy, &mut stats) {
            Ok(word) => {
                ceiling = word.font_size;
                words.push(word);
            }
            Err(exhausted) => {
                warn!("Layout dropped term: {exhausted}");
                dropped.push(exhausted);
            }
        }
    }

    debug!(
        placed = words.len(),
        dropped = dropped.len(),
        attempts = stats.attempts,
        probes = stats.probes,
        face = glyphs.name(),
        "Layout finished on {}x{} canvas",
        config.width,
        config.height
    );

    Layout {
        width: config.width,
        height: config.height,
        background: config.background,
        words,
        dropped,
    }
}

/// Largest size `<= start` at which the word's box can fit the canvas in some allowed
/// orientation, from one measurement at `start`. Boxes scale linearly with font size;
/// rounding can leave the estimate a pixel too large, which the schedule then shrinks.
fn largest_fitting_size(term: &str, start: u32, config: &LayoutConfig, glyphs: &dyn GlyphSource) -> u32 {
    let outline = glyphs.outline(term, start as f32);
    if outline.path.is_none() {
        return start;
    }
    let frame = outline.ink_frame();
    let (w, h) = (frame.width.max(1) as f64, frame.height.max(1) as f64);
    let (cw, ch) = (config.width as f64, config.height as f64);
    let mut ratio = (cw / w).min(ch / h);
    if config.allow_vertical {
        ratio = ratio.max((cw / h).min(ch / w));
    }
    if ratio >= 1.0 {
        return start;
    }
    // The epsilon keeps an exact fit (e.g. 400 px on a 400 px canvas) from rounding down.
    ((start as f64 * ratio + 1e-9).floor() as u32).clamp(config.min_font_size.min(start), start)
}

#[allow(clippy::too_many_arguments)]
fn place_term(
    entry: &FrequencyEntry,
    start: u32,
    index: usize,
    margin: u32,
    config: &LayoutConfig,
    glyphs: &dyn GlyphSource,
    occupancy: &mut OccupancyMap,
    stats: &mut RunStats,
) -> Result<PlacedWord, LayoutExhausted> {
    let schedule = AttemptSchedule::new(
        start,
        config.min_font_size,
        config.font_step,
        config.allow_vertical,
    );
    let mut outline: Option<(u32, WordOutline)> = None;
    let mut attempts = 0;
    let mut smallest_size = start;

    for attempt in schedule {
        attempts += 1;
        stats.attempts += 1;
        smallest_size = attempt.font_size;

        // Horizontal and vertical attempts at one size share an outline.
        if outline.as_ref().map(|(size, _)| *size) != Some(attempt.font_size) {
            let fresh = glyphs.outline(&entry.term, attempt.font_size as f32);
            outline = Some((attempt.font_size, fresh));
        }
        let Some((_, current)) = &outline else {
            continue;
        };
        if current.path.is_none() {
            break;
        }

        let (_, mask_width, mask_height) = mask_geometry(current, attempt.orientation);
        if mask_width > config.width || mask_height > config.height {
            continue;
        }
        let Some(mask) = GlyphMask::rasterize(current, attempt.orientation) else {
            continue;
        };
        let free = (config.width * config.height) as usize
            - occupancy.box_sum(0, 0, config.width, config.height) as usize;
        if free < mask.ink() {
            continue;
        }

        if let Some((x, y)) = find_position(occupancy, &mask, config, stats) {
            match mask.bits().dilate(margin) {
                Some(footprint) => {
                    let m = margin as i64;
                    occupancy.stamp(&footprint, x as i64 - m, y as i64 - m);
                }
                None => occupancy.stamp(mask.bits(), x as i64, y as i64),
            }
            return Ok(PlacedWord {
                term: entry.term.clone(),
                count: entry.count,
                font_size: attempt.font_size,
                x,
                y,
                width: mask.width(),
                height: mask.height(),
                orientation: attempt.orientation,
                color: word_color(index, config.background),
                mask,
            });
        }
    }

    Err(LayoutExhausted {
        term: entry.term.clone(),
        count: entry.count,
        smallest_size,
        attempts,
    })
}

/// Walks the spiral from the canvas center and returns the first top-left corner at
/// which `mask` lies inside the canvas without touching occupied pixels.
fn find_position(
    occupancy: &OccupancyMap,
    mask: &GlyphMask,
    config: &LayoutConfig,
    stats: &mut RunStats,
) -> Option<(u32, u32)> {
    let max_x = (config.width - mask.width()) as i64;
    let max_y = (config.height - mask.height()) as i64;
    let (cx, cy) = (max_x / 2, max_y / 2);
    let mut last = None;

    for (dx, dy) in Spiral::new(config.width, config.height, config.spiral_step) {
        let x = (cx + dx as i64).clamp(0, max_x) as u32;
        let y = (cy + dy as i64).clamp(0, max_y) as u32;
        if last == Some((x, y)) {
            continue;
        }
        last = Some((x, y));
        stats.probes += 1;
        if !occupancy.collides(mask.bits(), x, y) {
            return Some((x, y));
        }
    }
    None
}
