// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains all the model-side Burn code: the
// architecture, the masks, the training loop and evaluation.
// Other layers touch Burn only for tensors and datasets.
//
// What's in this layer:
//
//   error.rs     — Typed failures for model construction and
//                  batch validation (shape, device, config)
//
//   masking.rs   — Boolean attention masks: source padding
//                  mask and the combined causal + padding
//                  target mask
//
//   encoding.rs  — Sinusoidal positional encoding table,
//                  precomputed once per model
//
//   attention.rs — Multi-head scaled dot-product attention
//                  built from Linear projections
//
//   model.rs     — The encoder-decoder transformer:
//                  • Token embeddings (scaled by √d_model)
//                  • Positional encoding
//                  • Post-norm residual encoder/decoder stacks
//                  • Feed-forward networks (ReLU activation)
//                  • Vocabulary projection head
//
//   trainer.rs   — The training loop
//                  Teacher-forced forward pass, cross-entropy,
//                  backward pass, Adam step, epoch metrics and
//                  the end-of-run snapshot
//
//   evaluator.rs — Restores a snapshot and scores held-out
//                  data with the trainer's forward path
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Vaswani et al. (2017) Attention Is All You Need

/// Typed model-layer errors
pub mod error;

/// Padding and causal attention masks
pub mod masking;

/// Sinusoidal positional encoding
pub mod encoding;

/// Multi-head scaled dot-product attention
pub mod attention;

/// Encoder-decoder transformer architecture
pub mod model;

/// Full training loop with validation and metrics
pub mod trainer;

/// Evaluation — loads a snapshot and scores a dataset
pub mod evaluator;
