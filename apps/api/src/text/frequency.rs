//! Frequency aggregation with optional [min, max] bounds and top-K selection.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const DEFAULT_TOP_K: usize = 10;

/// One term and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub term: String,
    pub count: u32,
}

impl fmt::Display for FrequencyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.term, self.count)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Bounds
// ────────────────────────────────────────────────────────────────────────────

/// Inclusive frequency window. `max = None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyBounds {
    pub min: u32,
    pub max: Option<u32>,
}

impl Default for FrequencyBounds {
    fn default() -> Self {
        Self { min: 1, max: None }
    }
}

impl FrequencyBounds {
    pub fn new(min: Option<u32>, max: Option<u32>) -> Result<Self, AppError> {
        let bounds = Self {
            min: min.unwrap_or(1),
            max,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.min == 0 {
            return Err(AppError::Validation("min_freq must be at least 1".to_string()));
        }
        if let Some(max) = self.max {
            if max < self.min {
                return Err(AppError::Validation(format!(
                    "max_freq ({max}) must not be below min_freq ({})",
                    self.min
                )));
            }
        }
        Ok(())
    }

    pub fn contains(&self, count: u32) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }

    /// Parses bounds typed by a user: `""` keeps the default, `∞`/`inf` is unbounded.
    pub fn parse(min: &str, max: &str) -> Result<Self, AppError> {
        let min = parse_bound(min, "min_freq")?;
        let max = parse_bound(max, "max_freq")?;
        Self::new(min, max)
    }
}

/// `Ok(None)` for blank or infinite input.
pub fn parse_bound(raw: &str, field: &str) -> Result<Option<u32>, AppError> {
    let raw = raw.trim();
    match raw {
        "" | "∞" | "inf" | "infinity" => Ok(None),
        digits if digits.chars().all(|c| c.is_ascii_digit()) => digits
            .parse::<u32>()
            .map(Some)
            .map_err(|_| AppError::Validation(format!("{field} is out of range: {raw}"))),
        _ => Err(AppError::Validation(format!(
            "{field} must be a non-negative integer or ∞, got '{raw}'"
        ))),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Table
// ────────────────────────────────────────────────────────────────────────────

/// Bounded term counts, ranked by count descending then first occurrence.
#[derive(Debug, Clone, Serialize)]
pub struct FrequencyTable {
    ranked: Vec<FrequencyEntry>,
}

impl FrequencyTable {
    /// Counts `terms`, keeps counts inside `bounds`, and ranks the survivors.
    ///
    /// Fails with `EmptyAfterFilter` if nothing is left.
    pub fn from_terms<S: AsRef<str>>(
        terms: &[S],
        bounds: FrequencyBounds,
    ) -> Result<Self, AppError> {
        bounds.validate()?;

        // Insertion order of `first_seen` doubles as the tie-break.
        let mut index: FxHashMap<&str, usize> = FxHashMap::default();
        let mut counted: Vec<FrequencyEntry> = Vec::new();
        for term in terms {
            let term = term.as_ref();
            match index.get(term) {
                Some(&i) => counted[i].count += 1,
                None => {
                    index.insert(term, counted.len());
                    counted.push(FrequencyEntry {
                        term: term.to_string(),
                        count: 1,
                    });
                }
            }
        }

        let mut ranked: Vec<FrequencyEntry> = counted
            .into_iter()
            .filter(|entry| bounds.contains(entry.count))
            .collect();
        if ranked.is_empty() {
            return Err(AppError::EmptyAfterFilter);
        }
        // Stable sort keeps first-seen order among equal counts.
        ranked.sort_by(|a, b| b.count.cmp(&a.count));

        Ok(Self { ranked })
    }

    /// All entries in rank order.
    pub fn ranked(&self) -> &[FrequencyEntry] {
        &self.ranked
    }

    pub fn top_k(&self, k: usize) -> Vec<FrequencyEntry> {
        self.ranked.iter().take(k).cloned().collect()
    }

    pub fn get(&self, term: &str) -> Option<u32> {
        self.ranked
            .iter()
            .find(|entry| entry.term == term)
            .map(|entry| entry.count)
    }

    pub fn max_count(&self) -> u32 {
        self.ranked.first().map_or(0, |entry| entry.count)
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(terms: &[&str], bounds: FrequencyBounds) -> Result<FrequencyTable, AppError> {
        FrequencyTable::from_terms(terms, bounds)
    }

    #[test]
    fn test_counts_and_ranks() {
        let t = table(&["cat", "cat", "dog"], FrequencyBounds::default()).unwrap();
        assert_eq!(t.get("cat"), Some(2));
        assert_eq!(t.get("dog"), Some(1));
        assert_eq!(t.ranked()[0].term, "cat");
        assert_eq!(t.max_count(), 2);
    }

    #[test]
    fn test_ties_break_by_first_occurrence() {
        let t = table(&["b", "a", "c", "a", "b", "c"], FrequencyBounds::default()).unwrap();
        let order: Vec<&str> = t.ranked().iter().map(|e| e.term.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_bounds_clip_counts() {
        let terms = ["a", "a", "a", "b", "b", "c"];
        let t = table(&terms, FrequencyBounds::new(Some(2), Some(2)).unwrap()).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.get("b"), Some(2));
    }

    #[test]
    fn test_min_freq_above_all_counts_is_empty_after_filter() {
        let terms = ["a", "a", "b"];
        let err = table(&terms, FrequencyBounds::new(Some(3), None).unwrap()).unwrap_err();
        assert!(matches!(err, AppError::EmptyAfterFilter));
    }

    #[test]
    fn test_no_terms_is_empty_after_filter() {
        let err = table(&[], FrequencyBounds::default()).unwrap_err();
        assert!(matches!(err, AppError::EmptyAfterFilter));
    }

    #[test]
    fn test_top_k_truncates() {
        let terms: Vec<String> = (0..20).map(|i| format!("w{i}")).collect();
        let t = FrequencyTable::from_terms(&terms, FrequencyBounds::default()).unwrap();
        assert_eq!(t.top_k(DEFAULT_TOP_K).len(), 10);
        assert_eq!(t.top_k(100).len(), 20);
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        assert!(matches!(
            FrequencyBounds::new(Some(0), None),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            FrequencyBounds::new(Some(5), Some(2)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_bounds_from_user_text() {
        assert_eq!(
            FrequencyBounds::parse("", "∞").unwrap(),
            FrequencyBounds::default()
        );
        assert_eq!(
            FrequencyBounds::parse("2", "7").unwrap(),
            FrequencyBounds { min: 2, max: Some(7) }
        );
        assert!(matches!(
            FrequencyBounds::parse("-1", ""),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            FrequencyBounds::parse("abc", ""),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_entry_display() {
        let entry = FrequencyEntry {
            term: "cat".to_string(),
            count: 2,
        };
        assert_eq!(entry.to_string(), "cat: 2");
    }
}
