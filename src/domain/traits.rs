// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// Traits define shared behaviour — the contract between the
// data layer and the application layer. The application code
// is written against the trait, never against a concrete
// loader, so the corpus format can change without touching
// the training pipeline.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use crate::domain::sentence_pair::SentencePair;
use anyhow::Result;

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// Any component that can supply aligned sentence pairs.
///
/// Implementations:
///   - ParallelFileLoader → two line-aligned plain-text files
///   - (future) TsvLoader → single tab-separated file
pub trait CorpusSource {
    /// Load every aligned pair from this source, in file order.
    fn load_pairs(&self) -> Result<Vec<SentencePair>>;
}
