// ============================================================
// Layer 6 — Vocabulary Store
// ============================================================
// Persists the source and target vocabularies next to the
// model snapshot so evaluation encodes text with EXACTLY the
// ids training used. Token ids are first-seen order, so
// rebuilding a vocabulary from a different corpus (or even the
// same corpus read in a different order) would silently remap
// every embedding row.
//
// Files written:
//   {dir}/vocab.src.json — source-language vocabulary
//   {dir}/vocab.tgt.json — target-language vocabulary

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::data::vocab::Vocabulary;

const SOURCE_FILE: &str = "vocab.src.json";
const TARGET_FILE: &str = "vocab.tgt.json";

pub struct VocabStore {
    dir: PathBuf,
}

impl VocabStore {
    pub fn new(dir: impl Into<String>) -> Self {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Write both vocabularies as pretty-printed JSON.
    pub fn save(&self, source: &Vocabulary, target: &Vocabulary) -> Result<()> {
        self.write_one(SOURCE_FILE, source)?;
        self.write_one(TARGET_FILE, target)?;
        tracing::debug!(
            "Saved vocabularies ({} source / {} target tokens) to '{}'",
            source.len(),
            target.len(),
            self.dir.display(),
        );
        Ok(())
    }

    /// Load both vocabularies back. Fails with a pointer to the
    /// train command if the files are missing.
    pub fn load(&self) -> Result<(Vocabulary, Vocabulary)> {
        Ok((self.read_one(SOURCE_FILE)?, self.read_one(TARGET_FILE)?))
    }

    fn write_one(&self, name: &str, vocab: &Vocabulary) -> Result<()> {
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(vocab)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write vocabulary to '{}'", path.display()))
    }

    fn read_one(&self, name: &str) -> Result<Vocabulary> {
        let path = self.dir.join(name);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read vocabulary from '{}'. \
                 Make sure you have run 'train' before 'evaluate'.",
                path.display()
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}
