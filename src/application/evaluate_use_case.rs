// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Scores a trained snapshot on the held-out test slice:
//
//   Step 1: Restore model + config    (Layer 5 - ml)
//   Step 2: Load the parallel corpus  (Layer 4 - data)
//   Step 3: Clean + wrap with markers (Layer 4 - data)
//   Step 4: Load saved vocabularies   (Layer 6 - infra)
//   Step 5: Encode + pad samples      (Layer 4 - data)
//   Step 6: Reproduce the split       (Layer 4 - data)
//   Step 7: Forward-only scoring      (Layer 5 - ml)
//
// Steps 2-6 mirror the training pipeline exactly — same seed,
// same fractions, same vocabularies, same padded width — so the
// test slice really is the data training never saw.

use anyhow::Result;

use crate::application::train_use_case::{SPLIT_SEED, TRAIN_FRACTION, VAL_FRACTION};
use crate::data::{
    dataset::TranslationDataset,
    dataset::TranslationSample,
    loader::ParallelFileLoader,
    preprocessor::Preprocessor,
    splitter::split_three_way,
};
use crate::domain::traits::CorpusSource;
use crate::infra::vocab_store::VocabStore;
use crate::ml::evaluator::Evaluator;

pub struct EvaluateUseCase {
    source_file:    String,
    target_file:    String,
    checkpoint_dir: String,
}

impl EvaluateUseCase {
    pub fn new(
        source_file:    impl Into<String>,
        target_file:    impl Into<String>,
        checkpoint_dir: impl Into<String>,
    ) -> Self {
        Self {
            source_file:    source_file.into(),
            target_file:    target_file.into(),
            checkpoint_dir: checkpoint_dir.into(),
        }
    }

    /// Execute the full evaluation pipeline end to end.
    /// Returns the mean cross-entropy over the test slice.
    pub fn execute(&self) -> Result<f64> {
        // ── Step 1: Restore the trained model and its config ──────────────────
        let evaluator = Evaluator::from_checkpoint(&self.checkpoint_dir)?;
        let cfg = evaluator.config();

        // ── Step 2: Load the parallel corpus ──────────────────────────────────
        let loader = ParallelFileLoader::new(&self.source_file, &self.target_file);
        let pairs  = loader.load_pairs()?;

        // ── Step 3: Clean and wrap with sequence markers ──────────────────────
        let preprocessor = Preprocessor::new();
        let prepared: Vec<(String, String)> = pairs
            .iter()
            .map(|p| (preprocessor.prepare(&p.source), preprocessor.prepare(&p.target)))
            .collect();

        // ── Step 4: Load the saved vocabularies ───────────────────────────────
        // Rebuilding from text would remap every id; the embedding
        // rows only mean what the training-time vocabularies said
        let (src_vocab, tgt_vocab) = VocabStore::new(&self.checkpoint_dir).load()?;

        // ── Step 5: Encode and pad to the trained width ───────────────────────
        let samples: Vec<TranslationSample> = prepared
            .iter()
            .map(|(src, tgt)| {
                TranslationSample::padded(
                    src_vocab.encode(src),
                    tgt_vocab.encode(tgt),
                    cfg.max_seq_len,
                )
            })
            .collect();

        // ── Step 6: Reproduce the split, keep only the test slice ─────────────
        let (train_samples, val_samples, test_samples) =
            split_three_way(samples, TRAIN_FRACTION, VAL_FRACTION, SPLIT_SEED);
        tracing::info!(
            "Reproduced split: {} train / {} validation skipped, scoring {} test samples",
            train_samples.len(),
            val_samples.len(),
            test_samples.len()
        );

        // ── Step 7: Forward-only scoring ──────────────────────────────────────
        let mean_loss = evaluator.evaluate(TranslationDataset::new(test_samples))?;

        Ok(mean_loss)
    }
}
