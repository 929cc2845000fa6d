// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from raw corpus files all the
// way to device-ready tensor batches.
//
// The pipeline flows in this order:
//
//   two aligned text files
//       │
//       ▼
//   ParallelFileLoader → reads files, pairs lines by index
//       │
//       ▼
//   Preprocessor       → cleans text, adds [start]/[end]
//       │
//       ▼
//   Vocabulary         → folds prepared text into token ids
//       │
//       ▼
//   TranslationDataset → padded samples, Burn's Dataset trait
//       │
//       ▼
//   TranslationBatcher → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader         → feeds batches to the training loop
//
// Each module is responsible for exactly one step.
// This makes each step independently testable and replaceable.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Loads aligned sentence pairs from two line-per-sentence files
pub mod loader;

/// Cleans raw sentences and wraps them in sequence markers
pub mod preprocessor;

/// First-seen-order word vocabulary with reserved ids
pub mod vocab;

/// Implements Burn's Dataset trait for padded translation samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded shuffle and three-way train/validation/test split
pub mod splitter;
