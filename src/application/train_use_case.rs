// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the parallel corpus   (Layer 4 - data)
//   Step 2: Clean + wrap with markers  (Layer 4 - data)
//   Step 3: Build vocabularies         (Layer 4 - data)
//   Step 4: Measure padded length      (Layer 4 - data)
//   Step 5: Encode + pad samples       (Layer 4 - data)
//   Step 6: Split train/val/test       (Layer 4 - data)
//   Step 7: Build Burn datasets        (Layer 4 - data)
//   Step 8: Persist config + vocabs    (Layer 6 - infra)
//   Step 9: Run training loop          (Layer 5 - ml)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::TranslationDataset,
    dataset::TranslationSample,
    loader::ParallelFileLoader,
    preprocessor::Preprocessor,
    splitter::split_three_way,
    vocab::Vocabulary,
};
use crate::domain::traits::CorpusSource;
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::MetricsLogger,
    vocab_store::VocabStore,
};
use crate::ml::trainer::run_training;

// ─── Split constants ─────────────────────────────────────────────────────────
// The evaluate command must reproduce this split exactly, so the
// fractions and the shuffle seed are fixed here rather than being
// run-time options.
pub const TRAIN_FRACTION: f64 = 0.8;
pub const VAL_FRACTION:   f64 = 0.1;
pub const SPLIT_SEED:     u64 = 42;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Serialisable so it can be saved to disk and reloaded for evaluation.
// The #[derive(Serialize, Deserialize)] macros from serde handle
// reading/writing this struct to JSON automatically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub source_file:    String,
    pub target_file:    String,
    pub checkpoint_dir: String,
    pub metrics_path:   String,
    pub batch_size:     usize,
    pub epochs:         usize,
    pub lr:             f64,
    pub d_model:        usize,
    pub num_heads:      usize,
    pub num_layers:     usize,
    pub d_ff:           usize,
    pub seed:           u64,

    // Derived from the corpus during `train` and persisted so
    // `evaluate` can rebuild the identical architecture. Zero
    // until Step 8 fills them in.
    pub src_vocab_size: usize,
    pub tgt_vocab_size: usize,
    pub max_seq_len:    usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            source_file:    "data/source.txt".to_string(),
            target_file:    "data/target.txt".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            metrics_path:   "metrics.csv".to_string(),
            batch_size:     512,
            epochs:         2,
            lr:             1e-4,
            d_model:        512,
            num_heads:      8,
            num_layers:     6,
            d_ff:           2048,
            seed:           1337,
            src_vocab_size: 0,
            tgt_vocab_size: 0,
            max_seq_len:    0,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full training pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    /// Create a new TrainUseCase with the given configuration
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<()> {
        let mut cfg = self.config.clone();

        // ── Step 1: Load the parallel corpus ──────────────────────────────────
        // One sentence per line, line i of the source file paired
        // with line i of the target file
        tracing::info!(
            "Loading parallel corpus: '{}' / '{}'",
            cfg.source_file,
            cfg.target_file
        );
        let loader = ParallelFileLoader::new(&cfg.source_file, &cfg.target_file);
        let pairs  = loader.load_pairs()?;
        tracing::info!("Loaded {} sentence pairs", pairs.len());

        if pairs.is_empty() {
            anyhow::bail!(
                "corpus is empty — nothing to train on (checked '{}')",
                cfg.source_file
            );
        }

        // ── Step 2: Clean and wrap with sequence markers ──────────────────────
        // Lowercase + strip punctuation, then "[start] ... [end]"
        let preprocessor = Preprocessor::new();
        let prepared: Vec<(String, String)> = pairs
            .iter()
            .map(|p| (preprocessor.prepare(&p.source), preprocessor.prepare(&p.target)))
            .collect();

        // ── Step 3: Build one vocabulary per language ─────────────────────────
        // A pure fold over the prepared text: each absorb consumes
        // the vocabulary and returns the extended one, ids assigned
        // in first-seen order
        let src_vocab = prepared
            .iter()
            .fold(Vocabulary::new(), |vocab, (src, _)| vocab.absorb(src));
        let tgt_vocab = prepared
            .iter()
            .fold(Vocabulary::new(), |vocab, (_, tgt)| vocab.absorb(tgt));
        tracing::info!(
            "Vocabularies: {} source tokens, {} target tokens",
            src_vocab.len(),
            tgt_vocab.len()
        );

        // ── Step 4: Measure the padded sequence length ────────────────────────
        // One corpus-wide maximum over BOTH languages, taken before
        // the split so every batch in every split shares one width
        let max_seq_len = corpus_max_len(&prepared);
        tracing::info!("Padding every sequence to {} tokens", max_seq_len);

        // ── Step 5: Encode and right-pad every pair ───────────────────────────
        let samples: Vec<TranslationSample> = prepared
            .iter()
            .map(|(src, tgt)| {
                TranslationSample::padded(
                    src_vocab.encode(src),
                    tgt_vocab.encode(tgt),
                    max_seq_len,
                )
            })
            .collect();

        if let Some(first) = samples.first() {
            tracing::debug!("First sample source ids: {:?}", first.source_ids);
            tracing::debug!("First sample target ids: {:?}", first.target_ids);
        }

        // ── Step 6: Train / validation / test split (80/10/10) ────────────────
        // Seeded shuffle so the split is reproducible; the test slice
        // is held out here and only ever read by `evaluate`
        let (train_samples, val_samples, test_samples) =
            split_three_way(samples, TRAIN_FRACTION, VAL_FRACTION, SPLIT_SEED);
        tracing::info!(
            "Split: {} train, {} validation, {} test (held out)",
            train_samples.len(),
            val_samples.len(),
            test_samples.len()
        );

        // ── Step 7: Build Burn datasets ───────────────────────────────────────
        // TranslationDataset implements Burn's Dataset trait so the
        // DataLoader can call .get(index) and .len() on it
        let train_dataset = TranslationDataset::new(train_samples);
        let val_dataset   = TranslationDataset::new(val_samples);

        // ── Step 8: Persist config and vocabularies ───────────────────────────
        // Evaluation rebuilds the exact architecture from the config
        // and re-encodes text with the exact ids from the vocab files
        cfg.src_vocab_size = src_vocab.len();
        cfg.tgt_vocab_size = tgt_vocab.len();
        cfg.max_seq_len    = max_seq_len;

        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(&cfg)?;
        VocabStore::new(&cfg.checkpoint_dir).save(&src_vocab, &tgt_vocab)?;

        // ── Step 9: Run training loop (Layer 5) ───────────────────────────────
        let metrics = MetricsLogger::new(&cfg.metrics_path)?;
        run_training(&cfg, train_dataset, val_dataset, ckpt_manager, metrics)?;

        Ok(())
    }
}

// ─── Padded length measurement ───────────────────────────────────────────────
// Longest whitespace token count across both sides of the corpus.
// Includes the [start]/[end] markers since they are already part
// of the prepared text.
fn corpus_max_len(prepared: &[(String, String)]) -> usize {
    prepared
        .iter()
        .flat_map(|(src, tgt)| {
            [src.split_whitespace().count(), tgt.split_whitespace().count()]
        })
        .max()
        .unwrap_or(0)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_max_len_spans_both_languages() {
        let prepared = vec![
            ("[start] the cat [end]".to_string(), "[start] le chat noir dort [end]".to_string()),
            ("[start] hello [end]".to_string(), "[start] bonjour [end]".to_string()),
        ];
        // Longest side is the 6-token French sentence
        assert_eq!(corpus_max_len(&prepared), 6);
    }

    #[test]
    fn test_corpus_max_len_of_empty_corpus_is_zero() {
        assert_eq!(corpus_max_len(&[]), 0);
    }
}
