// ============================================================
// Layer 3 — SentencePair Domain Type
// ============================================================
// Represents one aligned example from a parallel corpus:
// a sentence in the source language and its reference
// translation in the target language.
//
// This is the core concept of supervised machine translation —
// the model never sees dictionaries or grammar rules, only
// thousands of these pairs, and learns the mapping between
// them from scratch.
//
// Example:
//   source: "new jersey is sometimes quiet during autumn"
//   target: "new jersey est parfois calme pendant l automne"
//
// Using #[derive(...)] gives us:
//   - Debug: print the struct with {:?}
//   - Clone: make copies of the struct
//   - Serialize/Deserialize: save/load as JSON
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};

/// One aligned source/target sentence pair, as raw text.
/// By the time a SentencePair exists the two files have been
/// read and line-aligned, but no cleaning has happened yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentencePair {
    /// The sentence in the source language (what we translate FROM)
    pub source: String,

    /// The reference translation in the target language
    /// (what we translate TO)
    pub target: String,
}

impl SentencePair {
    /// Create a new SentencePair.
    /// Uses impl Into<String> so callers can pass &str or String.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}
