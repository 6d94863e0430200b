//! Pixel occupancy for one layout pass.
//!
//! [`BitGrid`] stores one bit per pixel, rows packed into `u64` words, so a glyph mask
//! can be tested against the canvas 64 pixels at a time. [`OccupancyMap`] pairs the
//! canvas grid with a summed-area table that answers "is this box entirely free" and
//! "is this box entirely full" in O(1) before falling back to the exact bit test.

const WORD_BITS: usize = 64;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitGrid {
    width: u32,
    height: u32,
    stride: usize,
    words: Vec<u64>,
}

impl BitGrid {
    pub fn new(width: u32, height: u32) -> Self {
        let stride = (width as usize).div_ceil(WORD_BITS);
        Self {
            width,
            height,
            stride,
            words: vec![0; stride * height as usize],
        }
    }

    /// Thresholds an 8-bit coverage buffer (row-major, `width * height` bytes).
    /// Any non-zero coverage counts as set.
    pub fn from_coverage(width: u32, height: u32, coverage: &[u8]) -> Self {
        let mut grid = Self::new(width, height);
        for (i, &alpha) in coverage.iter().enumerate() {
            if alpha == 0 {
                continue;
            }
            let x = (i % width as usize) as u32;
            let y = (i / width as usize) as u32;
            grid.set(x, y);
        }
        grid
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let (i, bit) = self.locate(x, y);
        self.words[i] & (1 << bit) != 0
    }

    pub fn set(&mut self, x: u32, y: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let (i, bit) = self.locate(x, y);
        self.words[i] |= 1 << bit;
    }

    fn locate(&self, x: u32, y: u32) -> (usize, usize) {
        let x = x as usize;
        (
            y as usize * self.stride + x / WORD_BITS,
            x % WORD_BITS,
        )
    }

    pub fn row(&self, y: u32) -> &[u64] {
        let start = y as usize * self.stride;
        &self.words[start..start + self.stride]
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Coordinates of every set bit, row by row.
    pub fn iter_ones(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.height).flat_map(move |y| self.row_ones(y).map(move |x| (x, y)))
    }

    /// Columns of the set bits in row `y`, left to right.
    fn row_ones(&self, y: u32) -> impl Iterator<Item = u32> + '_ {
        self.row(y).iter().enumerate().flat_map(|(k, &word)| {
            let mut rest = word;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let bit = rest.trailing_zeros();
                rest &= rest - 1;
                Some((k * WORD_BITS) as u32 + bit)
            })
        })
    }

    /// Sets columns `[x0, x1)` of row `y`, clipped to the grid width.
    fn fill_span(&mut self, y: u32, x0: u32, x1: u32) {
        let x1 = x1.min(self.width) as usize;
        let x0 = x0 as usize;
        if x0 >= x1 || y >= self.height {
            return;
        }
        let start = y as usize * self.stride;
        let (first, last) = (x0 / WORD_BITS, (x1 - 1) / WORD_BITS);
        for k in first..=last {
            let lo = if k == first { x0 % WORD_BITS } else { 0 };
            let hi = if k == last { (x1 - 1) % WORD_BITS + 1 } else { WORD_BITS };
            let bits = if hi - lo == WORD_BITS {
                u64::MAX
            } else {
                ((1u64 << (hi - lo)) - 1) << lo
            };
            self.words[start + k] |= bits;
        }
    }

    /// Grows every set pixel into a `(2r+1)²` square. The result is `2r` wider and
    /// taller; pixel (x, y) of `self` lands at (x + r, y + r). `None` if the grown
    /// size does not fit in `u32`.
    ///
    /// Separable: runs are widened along each row, then rows are OR-ed over a sliding
    /// window of `2r+1` using block prefix/suffix ORs. Cost is linear in the output
    /// size, independent of `r`.
    pub fn dilate(&self, radius: u32) -> Option<BitGrid> {
        if radius == 0 {
            return Some(self.clone());
        }
        let span = radius.checked_mul(2)?;
        let width = self.width.checked_add(span)?;
        let height = self.height.checked_add(span)?;

        let mut wide = BitGrid::new(width, self.height);
        for y in 0..self.height {
            let mut run: Option<(u32, u32)> = None;
            for x in self.row_ones(y) {
                let (lo, hi) = (x, x + span + 1);
                run = match run {
                    Some((a, b)) if lo <= b => Some((a, hi)),
                    Some((a, b)) => {
                        wide.fill_span(y, a, b);
                        Some((lo, hi))
                    }
                    None => Some((lo, hi)),
                };
            }
            if let Some((a, b)) = run {
                wide.fill_span(y, a, b);
            }
        }

        // Output row j is the OR of `wide` rows j - 2r ..= j.
        let window = span as usize + 1;
        let (rows, stride) = (height as usize, wide.stride);
        let source = |i: usize, k: usize| {
            if i < self.height as usize {
                wide.words[i * stride + k]
            } else {
                0
            }
        };
        let mut prefix = vec![0u64; rows * stride];
        let mut suffix = vec![0u64; rows * stride];
        for i in 0..rows {
            let carry = i % window != 0;
            for k in 0..stride {
                let below = if carry { prefix[(i - 1) * stride + k] } else { 0 };
                prefix[i * stride + k] = below | source(i, k);
            }
        }
        for i in (0..rows).rev() {
            let carry = (i + 1) % window != 0 && i + 1 < rows;
            for k in 0..stride {
                let above = if carry { suffix[(i + 1) * stride + k] } else { 0 };
                suffix[i * stride + k] = above | source(i, k);
            }
        }

        let mut out = BitGrid::new(width, height);
        for j in 0..rows {
            for k in 0..stride {
                let tail = prefix[j * stride + k];
                out.words[j * stride + k] = match (j + 1).checked_sub(window) {
                    Some(s) => suffix[s * stride + k] | tail,
                    None => tail,
                };
            }
        }
        Some(out)
    }

    /// Reads `WORD_BITS` bits of row `y` starting at bit `offset`. Bits past the end read 0.
    fn window(&self, y: u32, offset: usize) -> u64 {
        let row = self.row(y);
        let i = offset / WORD_BITS;
        let shift = offset % WORD_BITS;
        let lo = row.get(i).copied().unwrap_or(0) >> shift;
        let hi = if shift == 0 {
            0
        } else {
            row.get(i + 1).copied().unwrap_or(0) << (WORD_BITS - shift)
        };
        lo | hi
    }

    /// True if `mask` placed with its top-left at (x, y) shares any set bit with `self`.
    /// The mask must lie inside the grid.
    pub fn overlaps(&self, mask: &BitGrid, x: u32, y: u32) -> bool {
        debug_assert!(x + mask.width <= self.width && y + mask.height <= self.height);
        (0..mask.height).any(|r| {
            mask.row(r).iter().enumerate().any(|(k, &m)| {
                m != 0 && self.window(y + r, x as usize + k * WORD_BITS) & m != 0
            })
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Occupancy map
// ────────────────────────────────────────────────────────────────────────────

/// Canvas occupancy for one layout pass.
#[derive(Debug, Clone)]
pub struct OccupancyMap {
    bits: BitGrid,
    /// Summed-area table, `(width + 1) * (height + 1)`; entry (x, y) counts set pixels
    /// in `[0, x) × [0, y)`.
    sat: Vec<u32>,
}

impl OccupancyMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            bits: BitGrid::new(width, height),
            sat: vec![0; (width as usize + 1) * (height as usize + 1)],
        }
    }

    pub fn width(&self) -> u32 {
        self.bits.width
    }

    pub fn height(&self) -> u32 {
        self.bits.height
    }

    pub fn bits(&self) -> &BitGrid {
        &self.bits
    }

    fn sat_at(&self, x: u32, y: u32) -> u32 {
        self.sat[y as usize * (self.bits.width as usize + 1) + x as usize]
    }

    /// Number of occupied pixels in the box `[x, x + w) × [y, y + h)`.
    pub fn box_sum(&self, x: u32, y: u32, w: u32, h: u32) -> u32 {
        self.sat_at(x + w, y + h) + self.sat_at(x, y) - self.sat_at(x, y + h) - self.sat_at(x + w, y)
    }

    /// True if `mask` at (x, y) would touch an occupied pixel. The mask must fit.
    pub fn collides(&self, mask: &BitGrid, x: u32, y: u32) -> bool {
        let (w, h) = (mask.width, mask.height);
        match self.box_sum(x, y, w, h) {
            0 => false,
            full if full == w * h => !mask.is_empty(),
            _ => self.bits.overlaps(mask, x, y),
        }
    }

    /// Marks `footprint` occupied with its top-left at (x, y). Parts outside the canvas
    /// are clipped.
    pub fn stamp(&mut self, footprint: &BitGrid, x: i64, y: i64) {
        let (width, height) = (self.bits.width as i64, self.bits.height as i64);
        let mut rows: Option<(i64, i64)> = None;
        for (fx, fy) in footprint.iter_ones() {
            let (cx, cy) = (x + fx as i64, y + fy as i64);
            if (0..width).contains(&cx) && (0..height).contains(&cy) {
                self.bits.set(cx as u32, cy as u32);
                rows = Some(rows.map_or((cy, cy), |(lo, hi)| (lo.min(cy), hi.max(cy))));
            }
        }
        if let Some((first, last)) = rows {
            self.update_sat(first as u32, last as u32);
        }
    }

    /// Recomputes the table for grid rows `first..=last`, then shifts every table row
    /// below them by the per-column change at the last recomputed row.
    fn update_sat(&mut self, first: u32, last: u32) {
        let stride = self.bits.width as usize + 1;
        let boundary = (last as usize + 1) * stride;
        let before: Vec<u32> = self.sat[boundary..boundary + stride].to_vec();

        for y in first..=last {
            let above = y as usize * stride;
            let below = above + stride;
            let row = self.bits.row(y);
            let mut row_sum = 0u32;
            for x in 0..self.bits.width as usize {
                row_sum += ((row[x / WORD_BITS] >> (x % WORD_BITS)) & 1) as u32;
                self.sat[below + x + 1] = self.sat[above + x + 1] + row_sum;
            }
        }

        let delta: Vec<u32> = self.sat[boundary..boundary + stride]
            .iter()
            .zip(&before)
            .map(|(now, was)| now - was)
            .collect();
        for row in self.sat[boundary + stride..].chunks_exact_mut(stride) {
            for (cell, d) in row.iter_mut().zip(&delta) {
                *cell += d;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: u32) -> BitGrid {
        let mut grid = BitGrid::new(size, size);
        for y in 0..size {
            for x in 0..size {
                grid.set(x, y);
            }
        }
        grid
    }

    #[test]
    fn test_set_get_across_word_boundary() {
        let mut grid = BitGrid::new(130, 2);
        grid.set(63, 0);
        grid.set(64, 0);
        grid.set(129, 1);
        assert!(grid.get(63, 0) && grid.get(64, 0) && grid.get(129, 1));
        assert!(!grid.get(65, 0));
        assert_eq!(grid.count_ones(), 3);
        assert!(!grid.get(500, 0), "out of range reads are clear");
    }

    #[test]
    fn test_from_coverage_thresholds_nonzero() {
        let grid = BitGrid::from_coverage(3, 2, &[0, 1, 0, 255, 0, 0]);
        assert!(grid.get(1, 0));
        assert!(grid.get(0, 1));
        assert_eq!(grid.count_ones(), 2);
    }

    #[test]
    fn test_iter_ones_matches_get() {
        let mut grid = BitGrid::new(70, 3);
        for &(x, y) in &[(0, 0), (69, 0), (64, 2), (5, 1)] {
            grid.set(x, y);
        }
        let ones: Vec<(u32, u32)> = grid.iter_ones().collect();
        assert_eq!(ones, vec![(0, 0), (69, 0), (5, 1), (64, 2)]);
    }

    #[test]
    fn test_dilate_grows_by_radius() {
        let mut grid = BitGrid::new(1, 1);
        grid.set(0, 0);
        let grown = grid.dilate(2).unwrap();
        assert_eq!((grown.width(), grown.height()), (5, 5));
        assert_eq!(grown.count_ones(), 25);
    }

    /// Square-by-square dilation, for comparison.
    fn dilate_naive(grid: &BitGrid, radius: u32) -> BitGrid {
        let mut out = BitGrid::new(grid.width() + 2 * radius, grid.height() + 2 * radius);
        for (x, y) in grid.iter_ones() {
            for dy in 0..=2 * radius {
                for dx in 0..=2 * radius {
                    out.set(x + dx, y + dy);
                }
            }
        }
        out
    }

    fn scattered(width: u32, height: u32) -> BitGrid {
        let mut grid = BitGrid::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if (x * 7 + y * 13) % 17 == 0 || (x > 60 && x < 70 && y == 3) {
                    grid.set(x, y);
                }
            }
        }
        grid
    }

    #[test]
    fn test_dilate_matches_square_growth() {
        let grid = scattered(130, 9);
        for radius in [1, 2, 3, 7, 40] {
            assert_eq!(grid.dilate(radius).unwrap(), dilate_naive(&grid, radius), "radius {radius}");
        }
    }

    #[test]
    fn test_dilate_rejects_overflowing_radius() {
        let mut grid = BitGrid::new(3, 3);
        grid.set(1, 1);
        assert!(grid.dilate(u32::MAX / 2).is_none());
        assert!(grid.dilate(u32::MAX).is_none());
    }

    #[test]
    fn test_overlaps_at_unaligned_offsets() {
        let mut canvas = BitGrid::new(200, 10);
        canvas.set(130, 5);
        let mask = square(4);
        assert!(canvas.overlaps(&mask, 127, 2));
        assert!(canvas.overlaps(&mask, 130, 5));
        assert!(!canvas.overlaps(&mask, 131, 5));
        assert!(!canvas.overlaps(&mask, 126, 5));
        assert!(!canvas.overlaps(&mask, 127, 6));
    }

    #[test]
    fn test_wide_mask_overlap() {
        let mut canvas = BitGrid::new(300, 4);
        canvas.set(250, 1);
        let mut mask = BitGrid::new(150, 1);
        mask.set(149, 0);
        assert!(canvas.overlaps(&mask, 101, 1));
        assert!(!canvas.overlaps(&mask, 100, 1));
    }

    #[test]
    fn test_box_sum_after_stamp() {
        let mut map = OccupancyMap::new(20, 20);
        map.stamp(&square(3), 5, 5);
        assert_eq!(map.box_sum(0, 0, 20, 20), 9);
        assert_eq!(map.box_sum(5, 5, 3, 3), 9);
        assert_eq!(map.box_sum(6, 6, 1, 1), 1);
        assert_eq!(map.box_sum(0, 0, 5, 20), 0);
    }

    #[test]
    fn test_sat_matches_bit_counts_after_overlapping_stamps() {
        let mut map = OccupancyMap::new(90, 40);
        map.stamp(&square(5), 10, 30);
        map.stamp(&scattered(70, 9), 3, 2);
        map.stamp(&square(12), 60, 10);
        map.stamp(&square(4), 62, 12);
        map.stamp(&square(3), -1, 38);

        for y in 0..=40 {
            for x in 0..=90 {
                let expected = (0..y)
                    .map(|r| (0..x).filter(|&c| map.bits().get(c, r)).count() as u32)
                    .sum::<u32>();
                assert_eq!(map.sat_at(x, y), expected, "table entry ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_stamp_clips_outside_canvas() {
        let mut map = OccupancyMap::new(4, 4);
        map.stamp(&square(3), -1, -1);
        assert_eq!(map.bits().count_ones(), 4);
        map.stamp(&square(3), 3, 3);
        assert_eq!(map.bits().count_ones(), 5);
    }

    #[test]
    fn test_collides_uses_exact_shape() {
        let mut map = OccupancyMap::new(10, 10);
        // occupy the top-left corner pixel only
        map.stamp(&square(1), 0, 0);
        // an L-shaped mask whose box covers the corner but whose ink does not
        let mut l_shape = BitGrid::new(3, 3);
        for i in 0..3 {
            l_shape.set(2, i);
            l_shape.set(i, 2);
        }
        assert!(!map.collides(&l_shape, 0, 0));
        assert!(map.collides(&square(3), 0, 0));
    }

    #[test]
    fn test_collides_on_full_box() {
        let mut map = OccupancyMap::new(8, 8);
        map.stamp(&square(8), 0, 0);
        assert!(map.collides(&square(2), 3, 3));
        assert!(!map.collides(&BitGrid::new(2, 2), 3, 3));
    }
}
