// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `evaluate`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Note there are no flags for the vocabulary sizes or the
// padded sequence length — those are measured from the corpus
// during training, not chosen by the user.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the translation model on a parallel corpus
    Train(TrainArgs),

    /// Score a trained snapshot on the held-out test slice
    Evaluate(EvaluateArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Source-language corpus file, one sentence per line
    #[arg(long, default_value = "data/source.txt")]
    pub source_file: String,

    /// Target-language corpus file, aligned line-by-line with the source
    #[arg(long, default_value = "data/target.txt")]
    pub target_file: String,

    /// Directory to save the model snapshot, config and vocabularies
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// CSV file that receives one metrics row per epoch
    #[arg(long, default_value = "metrics.csv")]
    pub metrics_path: String,

    /// Number of sentence pairs processed together in one forward pass
    #[arg(long, default_value_t = 512)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 2)]
    pub epochs: usize,

    /// How fast the model learns — too high causes instability,
    /// too low causes slow convergence
    #[arg(long, default_value_t = 1e-4)]
    pub lr: f64,

    /// Hidden dimension of the transformer (d_model in the paper)
    /// Every token is represented as a vector of this size
    #[arg(long, default_value_t = 512)]
    pub d_model: usize,

    /// Number of attention heads in multi-head attention
    /// d_model must be divisible by num_heads
    #[arg(long, default_value_t = 8)]
    pub num_heads: usize,

    /// Number of stacked layers in the encoder and in the decoder
    #[arg(long, default_value_t = 6)]
    pub num_layers: usize,

    /// Inner dimension of the feed-forward network
    /// Typically 4x d_model
    #[arg(long, default_value_t = 2048)]
    pub d_ff: usize,

    /// Seed for parameter initialisation, reused across runs
    /// for reproducible starting weights
    #[arg(long, default_value_t = 1337)]
    pub seed: u64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            source_file:    a.source_file,
            target_file:    a.target_file,
            checkpoint_dir: a.checkpoint_dir,
            metrics_path:   a.metrics_path,
            batch_size:     a.batch_size,
            epochs:         a.epochs,
            lr:             a.lr,
            d_model:        a.d_model,
            num_heads:      a.num_heads,
            num_layers:     a.num_layers,
            d_ff:           a.d_ff,
            seed:           a.seed,
            // Measured from the corpus in Step 4 of the pipeline
            src_vocab_size: 0,
            tgt_vocab_size: 0,
            max_seq_len:    0,
        }
    }
}

/// All arguments for the `evaluate` command
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Source-language corpus file (same as used during training)
    #[arg(long, default_value = "data/source.txt")]
    pub source_file: String,

    /// Target-language corpus file (same as used during training)
    #[arg(long, default_value = "data/target.txt")]
    pub target_file: String,

    /// Directory where the snapshot was saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}
