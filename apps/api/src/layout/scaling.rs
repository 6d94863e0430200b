//! Frequency → font size.
//!
//! Square-root compression between the lowest and highest surviving counts:
//!
//! ```text
//! t    = (count - lo) / (hi - lo)          // 0 ..= 1
//! size = min + round(sqrt(t) * (max - min))
//! ```
//!
//! The most frequent term gets `max`, the least frequent gets `min`. When every count
//! is equal all terms get `max`. The mapping is monotonic and depends only on counts.

use crate::text::FrequencyEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontScale {
    lo: u32,
    hi: u32,
    min_size: u32,
    max_size: u32,
}

impl FontScale {
    /// Builds the scale from the entries that will actually be laid out.
    pub fn new(entries: &[FrequencyEntry], min_size: u32, max_size: u32) -> Self {
        let lo = entries.iter().map(|e| e.count).min().unwrap_or(1);
        let hi = entries.iter().map(|e| e.count).max().unwrap_or(1);
        Self {
            lo,
            hi,
            min_size: min_size.min(max_size),
            max_size,
        }
    }

    pub fn size_for(&self, count: u32) -> u32 {
        if self.hi == self.lo {
            return self.max_size;
        }
        let count = count.clamp(self.lo, self.hi);
        let t = (count - self.lo) as f64 / (self.hi - self.lo) as f64;
        let span = (self.max_size - self.min_size) as f64;
        self.min_size + (t.sqrt() * span).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(counts: &[u32]) -> Vec<FrequencyEntry> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &count)| FrequencyEntry {
                term: format!("t{i}"),
                count,
            })
            .collect()
    }

    #[test]
    fn test_extremes_map_to_bounds() {
        let scale = FontScale::new(&entries(&[9, 4, 1]), 10, 100);
        assert_eq!(scale.size_for(9), 100);
        assert_eq!(scale.size_for(1), 10);
    }

    #[test]
    fn test_square_root_interpolation() {
        let scale = FontScale::new(&entries(&[5, 1]), 10, 100);
        // t = 0.25 → sqrt = 0.5 → 10 + 45
        assert_eq!(scale.size_for(2), 55);
    }

    #[test]
    fn test_single_term_gets_max() {
        let scale = FontScale::new(&entries(&[3]), 10, 100);
        assert_eq!(scale.size_for(3), 100);
    }

    #[test]
    fn test_monotonic_over_range() {
        let scale = FontScale::new(&entries(&[1000, 1]), 12, 80);
        let sizes: Vec<u32> = (1..=1000).map(|c| scale.size_for(c)).collect();
        assert!(sizes.windows(2).all(|w| w[0] <= w[1]));
        assert!(sizes.iter().all(|&s| (12..=80).contains(&s)));
    }

    #[test]
    fn test_out_of_range_counts_are_clamped() {
        let scale = FontScale::new(&entries(&[10, 2]), 10, 50);
        assert_eq!(scale.size_for(100), 50);
        assert_eq!(scale.size_for(0), 10);
    }
}
