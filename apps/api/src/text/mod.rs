// Text stage: raw text → filtered terms → bounded, ranked frequencies.
// The stopword registry is consulted only by the tokenizer.

pub mod frequency;
pub mod stopwords;
pub mod tokenizer;

pub use frequency::{FrequencyBounds, FrequencyEntry, FrequencyTable, DEFAULT_TOP_K};
pub use stopwords::{StopwordRegistry, StopwordSnapshot};
pub use tokenizer::extract_terms;
