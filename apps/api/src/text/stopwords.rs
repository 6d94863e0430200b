//! Stopword registry: a fixed baseline set plus a user-editable custom set.
//!
//! The registry is versioned. Every successful mutation bumps the version and returns
//! a fresh [`StopwordSnapshot`]; generation runs hold a snapshot so a concurrent edit
//! never changes the filter halfway through a pass.

use std::sync::{Arc, LazyLock};

use rustc_hash::FxHashSet;

use crate::errors::AppError;

/// Punctuation, CJK particles/function words and English function words.
static BASELINE_TERMS: &[&str] = &[
    // CJK punctuation
    "，", "。", "！", "？", "、", "；", "：", "“", "”", "‘", "’", "（", "）", "【", "】",
    "《", "》", "〈", "〉", "…", "—", "～", "@", "#", "￥", "%",
    // ASCII punctuation
    "!", "\"", "#", "$", "%", "&", "'", "(", ")", "*", "+", ",", "-", ".", "/", ":", ";",
    "<", "=", ">", "?", "@", "[", "\\", "]", "^", "_", "`", "{", "|", "}", "~",
    // Chinese interjections and particles
    "啊", "哎", "哎呀", "哎哟", "唉", "嗯", "呢", "吧", "啦", "呀", "哦", "噢", "的", "了",
    "着", "嘛", "吗", "都", "就", "而", "而且", "但是", "但", "却", "这", "那", "这个",
    "那个", "这些", "那些", "什么", "谁", "哪", "哪个", "哪些", "怎么", "怎么样", "怎样",
    "为什么", "是", "不是", "没", "没有", "不", "不要", "得", "地",
    // English function words
    "a", "an", "the", "and", "or", "but", "if", "of", "to", "in", "on", "at", "by", "for",
    "with", "from", "as", "is", "are", "was", "were", "be", "been", "it", "its", "this",
    "that", "these", "those", "he", "she", "they", "we", "you", "his", "her", "their",
    "our", "your", "not", "no", "so", "do", "does", "did", "has", "have", "had", "will",
    "would", "can", "could", "there", "than", "then", "into", "about",
];

static BASELINE: LazyLock<FxHashSet<&'static str>> =
    LazyLock::new(|| BASELINE_TERMS.iter().copied().collect());

/// Longest baseline entry in characters, used to bound lexicon matching.
pub const MAX_STOPWORD_CHARS: usize = 4;

/// Returns true if `term` is a baseline stopword.
pub fn is_baseline(term: &str) -> bool {
    BASELINE.contains(term)
}

// ────────────────────────────────────────────────────────────────────────────
// Snapshot
// ────────────────────────────────────────────────────────────────────────────

/// Immutable view of the stopword sets at one registry version.
///
/// Cheap to clone: the custom set is shared behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct StopwordSnapshot {
    custom: Arc<FxHashSet<String>>,
    version: u64,
}

impl StopwordSnapshot {
    /// A snapshot with only the baseline set in effect.
    pub fn baseline_only() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Membership in either set. Checked verbatim and lowercased.
    pub fn contains(&self, term: &str) -> bool {
        if is_baseline(term) || self.custom.contains(term) {
            return true;
        }
        let lower = term.to_lowercase();
        lower != term && (is_baseline(&lower) || self.custom.contains(&lower))
    }

    pub fn custom_len(&self) -> usize {
        self.custom.len()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Registry
// ────────────────────────────────────────────────────────────────────────────

/// The mutable custom set, versioned. The baseline set is read-only.
#[derive(Debug, Default)]
pub struct StopwordRegistry {
    custom: Arc<FxHashSet<String>>,
    version: u64,
}

impl StopwordRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StopwordSnapshot {
        StopwordSnapshot {
            custom: Arc::clone(&self.custom),
            version: self.version,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn contains_custom(&self, term: &str) -> bool {
        self.custom.contains(term.trim())
    }

    /// Adds a custom stopword. Fails with `AlreadyPresent` if it is already custom.
    pub fn add(&mut self, term: &str) -> Result<StopwordSnapshot, AppError> {
        let term = normalize(term)?;
        if self.custom.contains(term) {
            return Err(AppError::AlreadyPresent(term.to_string()));
        }
        Arc::make_mut(&mut self.custom).insert(term.to_string());
        self.version += 1;
        Ok(self.snapshot())
    }

    /// Removes a custom stopword. Fails with `NotPresent` if it is not custom.
    pub fn remove(&mut self, term: &str) -> Result<StopwordSnapshot, AppError> {
        let term = normalize(term)?;
        if !self.custom.contains(term) {
            return Err(AppError::NotPresent(term.to_string()));
        }
        Arc::make_mut(&mut self.custom).remove(term);
        self.version += 1;
        Ok(self.snapshot())
    }

    /// Clears the custom set. Baseline is untouched.
    pub fn reset(&mut self) -> StopwordSnapshot {
        if !self.custom.is_empty() {
            self.custom = Arc::new(FxHashSet::default());
            self.version += 1;
        }
        self.snapshot()
    }

    /// Custom terms in sorted order, for display.
    pub fn custom_terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = self.custom.iter().cloned().collect();
        terms.sort_unstable();
        terms
    }
}

fn normalize(term: &str) -> Result<&str, AppError> {
    let term = term.trim();
    if term.is_empty() {
        return Err(AppError::Validation("stopword cannot be empty".to_string()));
    }
    Ok(term)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_contains_punctuation_and_particles() {
        assert!(is_baseline("，"));
        assert!(is_baseline("."));
        assert!(is_baseline("的"));
        assert!(is_baseline("the"));
        assert!(!is_baseline("cat"));
    }

    #[test]
    fn test_baseline_entries_fit_lexicon_bound() {
        assert!(BASELINE_TERMS
            .iter()
            .filter(|t| !t.is_ascii())
            .all(|t| t.chars().count() <= MAX_STOPWORD_CHARS));
    }

    #[test]
    fn test_add_then_remove_restores_membership() {
        let mut registry = StopwordRegistry::new();
        let before = registry.snapshot();
        assert!(!before.contains("cat"));

        let added = registry.add("cat").unwrap();
        assert!(added.contains("cat"));

        let removed = registry.remove("cat").unwrap();
        assert!(!removed.contains("cat"));
        assert_eq!(removed.custom_len(), before.custom_len());
    }

    #[test]
    fn test_add_twice_fails_already_present() {
        let mut registry = StopwordRegistry::new();
        registry.add("cat").unwrap();
        let err = registry.add("cat").unwrap_err();
        assert!(matches!(err, AppError::AlreadyPresent(ref t) if t == "cat"));
        assert_eq!(registry.version(), 1, "rejected add must not bump the version");
    }

    #[test]
    fn test_remove_absent_fails_not_present() {
        let mut registry = StopwordRegistry::new();
        let err = registry.remove("dog").unwrap_err();
        assert!(matches!(err, AppError::NotPresent(ref t) if t == "dog"));
    }

    #[test]
    fn test_baseline_term_cannot_be_removed() {
        let mut registry = StopwordRegistry::new();
        assert!(matches!(registry.remove("the"), Err(AppError::NotPresent(_))));
        assert!(registry.snapshot().contains("the"));
    }

    #[test]
    fn test_blank_term_is_rejected() {
        let mut registry = StopwordRegistry::new();
        assert!(matches!(registry.add("   "), Err(AppError::Validation(_))));
        assert_eq!(registry.version(), 0);
    }

    #[test]
    fn test_terms_are_trimmed() {
        let mut registry = StopwordRegistry::new();
        registry.add("  cat ").unwrap();
        assert!(registry.contains_custom("cat"));
        assert!(registry.remove("cat").is_ok());
    }

    #[test]
    fn test_reset_clears_custom_only() {
        let mut registry = StopwordRegistry::new();
        registry.add("cat").unwrap();
        registry.add("dog").unwrap();
        let snapshot = registry.reset();
        assert_eq!(snapshot.custom_len(), 0);
        assert!(snapshot.contains("the"));
        assert!(!snapshot.contains("cat"));
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_mutation() {
        let mut registry = StopwordRegistry::new();
        let before = registry.snapshot();
        registry.add("cat").unwrap();
        assert!(!before.contains("cat"));
        assert_eq!(before.version(), 0);
        assert_eq!(registry.snapshot().version(), 1);
    }

    #[test]
    fn test_membership_is_case_insensitive_for_lowercase_entries() {
        let snapshot = StopwordSnapshot::baseline_only();
        assert!(snapshot.contains("The"));
        assert!(snapshot.contains("THE"));
    }

    #[test]
    fn test_custom_terms_sorted() {
        let mut registry = StopwordRegistry::new();
        registry.add("zebra").unwrap();
        registry.add("apple").unwrap();
        assert_eq!(registry.custom_terms(), vec!["apple", "zebra"]);
    }
}
