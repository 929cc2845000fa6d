// ============================================================
// Layer 4 — Parallel Corpus Loader
// ============================================================
// Loads an aligned translation corpus from two plain-text
// files: one sentence per line, line N of the source file is
// the translation counterpart of line N of the target file.
//
// This is the standard distribution format for small parallel
// corpora (e.g. the small_vocab English/French set):
//
//   corpus.en    line 0:  new jersey is sometimes quiet ...
//   corpus.fr    line 0:  new jersey est parfois calme ...
//
// Alignment is purely positional, so the two files MUST have
// the same number of lines — a mismatch means the corpus is
// corrupt and there is no safe way to guess the pairing, so
// we fail the run rather than zip to the shorter file.
//
// Reference: Rust Book §8 (Collections)
//            Rust Book §9 (Error Handling)
//            std::io::BufReader docs

use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::domain::sentence_pair::SentencePair;
use crate::domain::traits::CorpusSource;

/// Loads aligned sentence pairs from two line-per-sentence files.
/// Implements the CorpusSource trait from Layer 3.
pub struct ParallelFileLoader {
    /// Path to the source-language file
    source_path: String,

    /// Path to the target-language file
    target_path: String,
}

impl ParallelFileLoader {
    /// Create a new loader pointed at the two corpus files
    pub fn new(source_path: impl Into<String>, target_path: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            target_path: target_path.into(),
        }
    }
}

/// Implement the CorpusSource trait so the application layer
/// can call load_pairs() without knowing about file layout
impl CorpusSource for ParallelFileLoader {
    fn load_pairs(&self) -> Result<Vec<SentencePair>> {
        let source_lines = read_lines(&self.source_path)?;
        let target_lines = read_lines(&self.target_path)?;

        // Positional alignment only works if the files agree
        if source_lines.len() != target_lines.len() {
            return Err(anyhow::anyhow!(
                "Corpus files are misaligned: '{}' has {} lines but '{}' has {}",
                self.source_path,
                source_lines.len(),
                self.target_path,
                target_lines.len()
            ));
        }

        let mut pairs = Vec::with_capacity(source_lines.len());
        let mut skipped = 0usize;

        for (src, tgt) in source_lines.into_iter().zip(target_lines) {
            // A blank line on either side has no counterpart to
            // learn from — drop the pair, keep the alignment
            if src.trim().is_empty() || tgt.trim().is_empty() {
                skipped += 1;
                continue;
            }
            pairs.push(SentencePair::new(src, tgt));
        }

        if skipped > 0 {
            tracing::warn!("Skipped {} blank-line pairs", skipped);
        }
        tracing::info!("Loaded {} aligned sentence pairs", pairs.len());

        Ok(pairs)
    }
}

/// Read every line of a text file into owned Strings.
fn read_lines(path: &str) -> Result<Vec<String>> {
    let file = File::open(Path::new(path))
        .with_context(|| format!("Cannot open corpus file '{}'", path))?;

    let mut lines = Vec::new();
    for line in BufReader::new(file).lines() {
        lines.push(line.with_context(|| format!("Cannot read line from '{}'", path))?);
    }

    Ok(lines)
}
