// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Normalises raw corpus sentences before vocabulary building
// and tokenisation.
//
// Why do we need to clean text?
//   Parallel corpora scraped from the web contain:
//   - Mixed upper/lower case ("New Jersey" vs "new jersey")
//   - Punctuation glued to words ("calme," vs "calme")
//   - Apostrophes splitting words ("l'automne")
//   - Stray double spaces from alignment tooling
//
// If we don't clean these, the vocabulary fills with near
// duplicates ("The", "the", "the,") and the model wastes
// capacity learning that they mean the same thing.
//
// Cleaning steps (applied in order):
//   1. Lowercase every character
//   2. Replace anything that is not a letter, digit or space
//      with a space (punctuation becomes a word boundary)
//   3. Collapse consecutive spaces into one
//   4. Trim leading/trailing whitespace
//
// After cleaning, `prepare` wraps the sentence in the
// [start] / [end] markers the decoder is trained on. The
// markers are added AFTER cleaning so their brackets survive.
//
// Reference: Rust Book §8 (Strings in Rust)
//            Rust Book §13 (Iterators)

pub struct Preprocessor;

impl Preprocessor {
    /// Create a new Preprocessor instance
    pub fn new() -> Self {
        Self
    }

    /// Clean a raw sentence for downstream tokenisation.
    /// Takes a &str and returns an owned String.
    pub fn clean(&self, text: &str) -> String {

        // ── Step 1: Lowercase + strip punctuation ─────────────────────────────
        // to_lowercase() is an iterator because some characters
        // lowercase to more than one char (e.g. 'İ'), so we
        // flat_map rather than map. is_alphanumeric() keeps
        // accented letters — important for non-English corpora.
        let step1: String = text
            .chars()
            .flat_map(|c| c.to_lowercase())
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();

        // ── Step 2: Collapse runs of spaces ───────────────────────────────────
        let mut out        = String::with_capacity(step1.len());
        let mut last_space = false;

        for c in step1.chars() {
            if c == ' ' {
                // Only add a space if the last char wasn't a space
                if !last_space {
                    out.push(' ');
                }
                last_space = true;
            } else {
                out.push(c);
                last_space = false;
            }
        }

        // ── Step 3: Trim the edges ─────────────────────────────────────────────
        out.trim().to_string()
    }

    /// Clean a sentence and wrap it in the sequence markers:
    /// "the cat" → "[start] the cat [end]".
    /// Every sentence fed to the model goes through this, so
    /// the decoder always sees [start] first and learns to
    /// emit [end] last.
    pub fn prepare(&self, text: &str) -> String {
        format!("[start] {} [end]", self.clean(text))
    }
}

/// Implement Default so Preprocessor can be created with Preprocessor::default()
impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
// These tests run with `cargo test` and verify the cleaning logic.
// Reference: Rust Book §11 (Writing Automated Tests)
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("New Jersey"), "new jersey");
    }

    #[test]
    fn test_strips_punctuation() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("quiet, during autumn."), "quiet during autumn");
    }

    #[test]
    fn test_apostrophe_becomes_boundary() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("l'automne"), "l automne");
    }

    #[test]
    fn test_collapses_multiple_spaces() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("hello   world"), "hello world");
    }

    #[test]
    fn test_trims_edges() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("  hello world  "), "hello world");
    }

    #[test]
    fn test_keeps_accented_letters() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("février est agréable"), "février est agréable");
    }

    #[test]
    fn test_prepare_wraps_with_markers() {
        let p = Preprocessor::new();
        assert_eq!(p.prepare("The cat!"), "[start] the cat [end]");
    }

    #[test]
    fn test_empty_string() {
        let p = Preprocessor::new();
        assert_eq!(p.clean(""), "");
        assert_eq!(p.prepare(""), "[start]  [end]");
    }
}
