// ============================================================
// Layer 5 — Evaluation
// ============================================================
// Restores a trained snapshot and scores a held-out dataset
// with the exact forward + cross-entropy path the trainer
// used, just without gradients. Runs on the inner backend.

use anyhow::{Context, Result};

use burn::{data::dataloader::DataLoaderBuilder, prelude::*};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::TranslationBatcher, dataset::TranslationDataset};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{Transformer, TransformerConfig};
use crate::ml::trainer::batch_loss;

type EvalBackend = burn::backend::Wgpu;

/// Holds a restored model plus the configuration it was trained
/// with, ready to score datasets.
pub struct Evaluator {
    model:  Transformer<EvalBackend>,
    config: TrainConfig,
    device: burn::backend::wgpu::WgpuDevice,
}

impl Evaluator {
    /// Rebuild the architecture from the saved run configuration,
    /// then load the trained parameters into it.
    pub fn from_checkpoint(checkpoint_dir: &str) -> Result<Self> {
        let ckpt = CheckpointManager::new(checkpoint_dir);
        let config = ckpt
            .load_config()
            .with_context(|| format!("no run configuration under '{checkpoint_dir}'"))?;

        let device = burn::backend::wgpu::WgpuDevice::default();

        let model_cfg = TransformerConfig::new(
            config.src_vocab_size,
            config.tgt_vocab_size,
            config.max_seq_len,
            config.d_model,
        )
        .with_num_heads(config.num_heads)
        .with_num_layers(config.num_layers)
        .with_d_ff(config.d_ff);

        let model: Transformer<EvalBackend> = model_cfg.init(&device)?;
        let model = ckpt.load_model(model, &device)?;
        tracing::info!("Restored model snapshot from {}", checkpoint_dir);

        Ok(Self { model, config, device })
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Mean cross-entropy over the given dataset.
    pub fn evaluate(&self, dataset: TranslationDataset) -> Result<f64> {
        mean_loss(
            &self.model,
            dataset,
            self.config.batch_size,
            self.config.max_seq_len,
            &self.device,
        )
    }
}

/// Forward-only scoring pass shared with the tests. Batches come
/// out in fixed order, no shuffling, no gradient tape.
pub fn mean_loss<B: Backend>(
    model:       &Transformer<B>,
    dataset:     TranslationDataset,
    batch_size:  usize,
    max_seq_len: usize,
    device:      &B::Device,
) -> Result<f64> {
    let sample_count = dataset.sample_count();

    let batcher = TranslationBatcher::<B>::new(device.clone());
    let loader  = DataLoaderBuilder::new(batcher)
        .batch_size(batch_size)
        .num_workers(1)
        .build(dataset);

    // Weight each batch by its row count; the final batch may be short
    let mut loss_sum = 0.0f64;
    let mut rows     = 0usize;

    for batch in loader.iter() {
        let batch_rows = batch.source.dims()[0];
        let loss = batch_loss(model, batch, max_seq_len, device)?;
        loss_sum += loss.into_scalar().elem::<f64>() * batch_rows as f64;
        rows     += batch_rows;
    }

    if rows == 0 {
        anyhow::bail!("evaluation dataset is empty");
    }

    let mean = loss_sum / rows as f64;
    tracing::info!("Scored {} samples, mean loss {:.4}", sample_count, mean);
    Ok(mean)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::TranslationSample;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_mean_loss_is_finite_over_uneven_batches() {
        let device = Default::default();
        let model = TransformerConfig::new(6, 6, 5, 16)
            .with_num_heads(2)
            .with_num_layers(1)
            .with_d_ff(32)
            .init::<TestBackend>(&device)
            .unwrap();

        // Three samples with batch_size 2 → one full batch, one short
        let dataset = TranslationDataset::new(vec![
            TranslationSample::padded(vec![1, 3, 2], vec![1, 4, 2], 5),
            TranslationSample::padded(vec![1, 4, 5, 2], vec![1, 3, 2], 5),
            TranslationSample::padded(vec![1, 5, 2], vec![1, 5, 4, 2], 5),
        ]);

        let mean = mean_loss(&model, dataset, 2, 5, &device).unwrap();
        assert!(mean.is_finite());
        assert!(mean >= 0.0);
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        let device = Default::default();
        let model = TransformerConfig::new(6, 6, 5, 16)
            .with_num_heads(2)
            .with_num_layers(1)
            .with_d_ff(32)
            .init::<TestBackend>(&device)
            .unwrap();

        let result = mean_loss(&model, TranslationDataset::new(vec![]), 2, 5, &device);
        assert!(result.is_err());
    }
}
