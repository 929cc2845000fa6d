// ============================================================
// Layer 4 — Vocabulary
// ============================================================
// Word-level token ↔ integer-id mapping, one per language.
//
// Three ids are reserved and fixed before any corpus text is
// seen:
//   <pad>   = 0   fills sequences to uniform length
//   [start] = 1   first token of every target sentence
//   [end]   = 2   last real token of every sentence
//
// Every other id is assigned in FIRST-SEEN order while folding
// over the prepared corpus, and never changes afterwards. The
// whole table is therefore a pure function of corpus order:
// `absorb` consumes the vocabulary and returns the updated one,
// so construction is a single fold expression with no shared
// mutable map threaded through callbacks.
//
//   let vocab = sentences.iter()
//       .fold(Vocabulary::new(), |v, s| v.absorb(s));
//
// The struct is serde-serialisable so the exact mapping from a
// training run can be written to disk and reloaded when the
// checkpoint is evaluated later (ids must match the embedding
// rows they were trained against).
//
// Reference: Rust Book §8 (HashMaps), §13 (Iterators and Folds)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reserved token spellings. `prepare` adds the bracket markers
/// around every sentence; `<pad>` never appears in text.
pub const PAD_TOKEN: &str = "<pad>";
pub const START_TOKEN: &str = "[start]";
pub const END_TOKEN: &str = "[end]";

/// Reserved token ids. The rest of the pipeline (masking, loss,
/// padding) assumes pad is id 0.
pub const PAD_ID: u32 = 0;
pub const START_ID: u32 = 1;
pub const END_ID: u32 = 2;

/// First-seen-order vocabulary for one language.
///
/// Kept as two parallel views of the same mapping:
///   token_to_id for encoding (word → id)
///   id_to_token for decoding (id → word, index = id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    token_to_id: HashMap<String, u32>,
    id_to_token: Vec<String>,
}

impl Vocabulary {
    /// A vocabulary containing only the three reserved entries.
    pub fn new() -> Self {
        let reserved = [PAD_TOKEN, START_TOKEN, END_TOKEN];

        let mut token_to_id = HashMap::new();
        let mut id_to_token = Vec::new();

        for (id, token) in reserved.iter().enumerate() {
            token_to_id.insert(token.to_string(), id as u32);
            id_to_token.push(token.to_string());
        }

        Self { token_to_id, id_to_token }
    }

    /// One fold step: add every unseen token of `sentence`, in
    /// order of appearance. Tokens already present keep the id
    /// they were first assigned — absorbing the same sentence
    /// twice is a no-op.
    pub fn absorb(mut self, sentence: &str) -> Self {
        for token in sentence.split_whitespace() {
            if !self.token_to_id.contains_key(token) {
                let id = self.id_to_token.len() as u32;
                self.token_to_id.insert(token.to_string(), id);
                self.id_to_token.push(token.to_string());
            }
        }
        self
    }

    /// Number of distinct tokens, reserved entries included.
    /// This is the embedding-table row count for this language.
    pub fn len(&self) -> usize {
        self.id_to_token.len()
    }

    pub fn is_empty(&self) -> bool {
        // Never true in practice — reserved entries always exist
        self.id_to_token.is_empty()
    }

    /// Look up the id of a single token.
    pub fn id_of(&self, token: &str) -> Option<u32> {
        self.token_to_id.get(token).copied()
    }

    /// Look up the spelling of a single id.
    pub fn token_of(&self, id: u32) -> Option<&str> {
        self.id_to_token.get(id as usize).map(|s| s.as_str())
    }

    /// Encode a prepared sentence to token ids by whitespace
    /// splitting. Tokens missing from the vocabulary are
    /// silently skipped — the vocabulary is built over the full
    /// corpus before any encoding, so at training time nothing
    /// is ever out of vocabulary.
    pub fn encode(&self, sentence: &str) -> Vec<u32> {
        sentence
            .split_whitespace()
            .filter_map(|token| self.id_of(token))
            .collect()
    }

    /// Decode ids back to the plain sentence, dropping the
    /// reserved markers. This is the exact inverse of
    /// `Preprocessor::prepare` followed by `encode`.
    pub fn decode_sentence(&self, ids: &[u32]) -> String {
        ids.iter()
            .filter(|&&id| id != PAD_ID && id != START_ID && id != END_ID)
            .filter_map(|&id| self.token_of(id))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_ids_are_fixed() {
        let v = Vocabulary::new();
        assert_eq!(v.len(), 3);
        assert_eq!(v.id_of(PAD_TOKEN), Some(PAD_ID));
        assert_eq!(v.id_of(START_TOKEN), Some(START_ID));
        assert_eq!(v.id_of(END_TOKEN), Some(END_ID));
    }

    #[test]
    fn test_first_seen_order() {
        let v = Vocabulary::new().absorb("[start] the cat [end]");
        assert_eq!(v.id_of("the"), Some(3));
        assert_eq!(v.id_of("cat"), Some(4));
        assert_eq!(v.len(), 5);
    }

    #[test]
    fn test_ids_are_immutable_once_assigned() {
        // Re-absorbing in a different order must not move ids
        let v = Vocabulary::new()
            .absorb("the cat sat")
            .absorb("sat cat the on");
        assert_eq!(v.id_of("the"), Some(3));
        assert_eq!(v.id_of("cat"), Some(4));
        assert_eq!(v.id_of("sat"), Some(5));
        assert_eq!(v.id_of("on"), Some(6));
    }

    #[test]
    fn test_fold_construction() {
        let sentences = ["a b", "b c", "c d"];
        let v = sentences
            .iter()
            .fold(Vocabulary::new(), |v, s| v.absorb(s));
        assert_eq!(v.len(), 3 + 4); // reserved + a b c d
        assert_eq!(v.id_of("d"), Some(6));
    }

    #[test]
    fn test_encode_known_sentence() {
        let v = Vocabulary::new().absorb("[start] the cat [end]");
        assert_eq!(v.encode("[start] the cat [end]"), vec![1, 3, 4, 2]);
    }

    #[test]
    fn test_encode_skips_unknown_tokens() {
        let v = Vocabulary::new().absorb("the cat");
        assert_eq!(v.encode("the dog cat"), vec![3, 4]);
    }

    #[test]
    fn test_round_trip_excludes_markers() {
        let v = Vocabulary::new().absorb("[start] the cat sat [end]");
        let ids = v.encode("[start] the cat sat [end]");
        assert_eq!(v.decode_sentence(&ids), "the cat sat");
    }

    #[test]
    fn test_round_trip_ignores_padding() {
        let v = Vocabulary::new().absorb("[start] the cat [end]");
        let ids = vec![1, 3, 4, 2, 0, 0, 0];
        assert_eq!(v.decode_sentence(&ids), "the cat");
    }

    #[test]
    fn test_serde_round_trip_preserves_ids() {
        let v = Vocabulary::new().absorb("[start] une phrase [end]");
        let json = serde_json::to_string(&v).unwrap();
        let back: Vocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id_of("une"), v.id_of("une"));
        assert_eq!(back.id_of("phrase"), v.id_of("phrase"));
        assert_eq!(back.len(), v.len());
    }
}
