//! Tokenizer and term filter.
//!
//! Segmentation is rule-based and deterministic:
//! - runs of word characters (alphanumeric or `_`) form one token, and an apostrophe or
//!   hyphen between two word runs joins them (`don't`, `well-known`);
//! - runs of whitespace form one token;
//! - ideographic runs (CJK, kana, hangul) are cut by forward maximum matching against the
//!   stopword lexicon, with unmatched stretches emitted as bigrams;
//! - every other character (punctuation, symbols) is a token of its own.
//!
//! Filtering then drops stopwords, whitespace, single characters and pure digit strings.

use crate::text::stopwords::{StopwordSnapshot, MAX_STOPWORD_CHARS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Ideograph,
    Space,
    Other,
}

fn classify(c: char) -> CharClass {
    if is_ideographic(c) {
        CharClass::Ideograph
    } else if c.is_alphanumeric() || c == '_' {
        CharClass::Word
    } else if c.is_whitespace() {
        CharClass::Space
    } else {
        CharClass::Other
    }
}

fn is_ideographic(c: char) -> bool {
    matches!(c as u32,
        0x3040..=0x30FF     // hiragana, katakana
        | 0x3400..=0x4DBF   // CJK extension A
        | 0x4E00..=0x9FFF   // CJK unified ideographs
        | 0xAC00..=0xD7AF   // hangul syllables
        | 0xF900..=0xFAFF   // CJK compatibility ideographs
        | 0x20000..=0x2FA1F // CJK extensions B..F, compatibility supplement
    )
}

fn is_joiner(c: char) -> bool {
    matches!(c, '\'' | '’' | '-')
}

// ────────────────────────────────────────────────────────────────────────────
// Segmentation
// ────────────────────────────────────────────────────────────────────────────

/// Splits `text` into raw segments. Concatenating the segments reproduces `text`.
///
/// `lexicon` supplies the multi-character stopwords used to cut ideographic runs.
pub fn segment<'a>(text: &'a str, lexicon: &StopwordSnapshot) -> Vec<&'a str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let byte_at = |i: usize| chars.get(i).map_or(text.len(), |&(b, _)| b);
    let mut segments = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let class = classify(chars[i].1);
        let start = i;
        match class {
            CharClass::Word => {
                i += 1;
                loop {
                    match chars.get(i) {
                        Some(&(_, c)) if classify(c) == CharClass::Word => i += 1,
                        Some(&(_, c))
                            if is_joiner(c)
                                && chars
                                    .get(i + 1)
                                    .is_some_and(|&(_, n)| classify(n) == CharClass::Word) =>
                        {
                            i += 2
                        }
                        _ => break,
                    }
                }
                segments.push(&text[byte_at(start)..byte_at(i)]);
            }
            CharClass::Space => {
                while chars.get(i).is_some_and(|&(_, c)| classify(c) == CharClass::Space) {
                    i += 1;
                }
                segments.push(&text[byte_at(start)..byte_at(i)]);
            }
            CharClass::Other => {
                i += 1;
                segments.push(&text[byte_at(start)..byte_at(i)]);
            }
            CharClass::Ideograph => {
                while chars
                    .get(i)
                    .is_some_and(|&(_, c)| classify(c) == CharClass::Ideograph)
                {
                    i += 1;
                }
                let run = &text[byte_at(start)..byte_at(i)];
                segment_ideographic(run, lexicon, &mut segments);
            }
        }
    }

    segments
}

/// Forward maximum matching over one ideographic run.
fn segment_ideographic<'a>(run: &'a str, lexicon: &StopwordSnapshot, out: &mut Vec<&'a str>) {
    let bounds: Vec<usize> = run
        .char_indices()
        .map(|(b, _)| b)
        .chain(std::iter::once(run.len()))
        .collect();
    let n = bounds.len() - 1;
    let longest_stopword_at = |pos: usize| -> Option<usize> {
        (1..=MAX_STOPWORD_CHARS.min(n - pos))
            .rev()
            .find(|&len| lexicon.contains(&run[bounds[pos]..bounds[pos + len]]))
    };

    let mut pos = 0;
    while pos < n {
        let len = match longest_stopword_at(pos) {
            Some(len) => len,
            None if pos + 1 < n && longest_stopword_at(pos + 1).is_none() => 2,
            None => 1,
        };
        out.push(&run[bounds[pos]..bounds[pos + len]]);
        pos += len;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Filtering
// ────────────────────────────────────────────────────────────────────────────

/// Returns the rejection rule a candidate trips, or `None` if it survives.
pub fn rejection_reason(candidate: &str, stopwords: &StopwordSnapshot) -> Option<Rejection> {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return Some(Rejection::Whitespace);
    }
    if stopwords.contains(trimmed) {
        return Some(Rejection::Stopword);
    }
    if trimmed.chars().count() <= 1 {
        return Some(Rejection::TooShort);
    }
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Some(Rejection::Numeric);
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Stopword,
    TooShort,
    Whitespace,
    Numeric,
}

/// Segments and filters `text` into candidate terms. Duplicates are preserved.
pub fn extract_terms(text: &str, stopwords: &StopwordSnapshot) -> Vec<String> {
    segment(text, stopwords)
        .into_iter()
        .filter(|candidate| rejection_reason(candidate, stopwords).is_none())
        .map(|candidate| candidate.trim().to_string())
        .collect()
}
