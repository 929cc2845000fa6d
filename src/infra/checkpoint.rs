// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// What gets saved per run:
//   1. Model weights (.mpk file) — all learned parameters,
//      one flat snapshot written once after the final epoch
//   2. config.json               — run + architecture config
//
// Why save the config separately?
//   When loading for evaluation, we need to know the exact
//   model architecture (d_model, num_layers, vocab sizes, the
//   padded sequence length) to rebuild the model before
//   loading the weights into it.
//
// Burn's CompactRecorder:
//   - Serialises model parameters to MessagePack format
//   - Type-safe: loading fails if architecture doesn't match
//
// There is no epoch numbering and no latest-pointer file: a
// run produces exactly one snapshot, and a second run simply
// overwrites it.
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use serde_json;

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::Transformer;

/// Manages saving and loading of the trained snapshot.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    /// Path to the directory where snapshot files are stored
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<String>) -> Self {
        let dir = PathBuf::from(dir.into());
        // create_dir_all creates parent directories too, like `mkdir -p`
        // .ok() ignores the error if the directory already exists
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Save the model weights as the run's single snapshot.
    ///
    /// Uses Burn's CompactRecorder which:
    ///   1. Calls model.into_record() to extract all parameters
    ///   2. Serialises to MessagePack binary format
    ///   3. Writes to {dir}/model.mpk
    pub fn save_model<B: Backend>(&self, model: &Transformer<B>) -> Result<()> {
        // Build the file path (without extension — recorder adds it)
        let path = self.dir.join("model");

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save snapshot to '{}'", path.display())
            })?;

        tracing::debug!("Saved model snapshot to '{}'", path.display());
        Ok(())
    }

    /// Load model weights from the snapshot into a freshly
    /// initialised model.
    ///
    /// The model parameter must have the correct architecture
    /// (matching the saved snapshot) or loading will fail.
    pub fn load_model<B: Backend>(
        &self,
        model:  Transformer<B>,
        device: &B::Device,
    ) -> Result<Transformer<B>> {
        let path = self.dir.join("model");

        // Load the serialised record from disk
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load snapshot '{}'. Have you trained the model first?",
                    path.display())
            })?;

        // load_record() returns a new model with the loaded weights
        Ok(model.load_record(record))
    }

    /// Save the run configuration to JSON.
    ///
    /// This must be called before training starts so evaluation
    /// can reconstruct the exact model architecture.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("config.json");

        // serde_json::to_string_pretty adds indentation for readability
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| {
                format!("Cannot write config to '{}'", path.display())
            })?;

        tracing::debug!("Saved run config to '{}'", path.display());
        Ok(())
    }

    /// Load the run configuration from JSON.
    ///
    /// Called by the Evaluator to know what model architecture
    /// was used during training so it can rebuild the same model.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("config.json");

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' before 'evaluate'.",
                    path.display()
                )
            })?;

        // Deserialise JSON back into TrainConfig struct
        Ok(serde_json::from_str(&json)?)
    }
}
