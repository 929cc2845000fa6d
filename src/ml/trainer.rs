// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Full train + validation loop using Burn's DataLoader and Adam.
//
// Key Burn 0.16 insight:
//   - Training uses MyBackend (Autodiff<Wgpu>) for gradients
//   - model.valid() returns the model on MyInnerBackend (Wgpu)
//   - Validation batcher must also use MyInnerBackend
//   - Optimizer::step is functional: it consumes the model and
//     returns the updated one, so there is nothing to zero
//     between batches
//
// Per batch the loop applies teacher forcing: the decoder is
// fed target[..len-1] and scored against target[1..], i.e. it
// always predicts the next ground-truth token.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use std::time::Instant;

use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    nn::loss::CrossEntropyLossConfig,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{TranslationBatch, TranslationBatcher},
    dataset::TranslationDataset,
    vocab::PAD_ID,
};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::error::ModelError;
use crate::ml::masking::{source_padding_mask, target_causal_mask};
use crate::ml::model::{Transformer, TransformerConfig};

type MyBackend      = burn::backend::Autodiff<burn::backend::Wgpu>;
type MyInnerBackend = burn::backend::Wgpu;

pub fn run_training(
    cfg:           &TrainConfig,
    train_dataset: TranslationDataset,
    val_dataset:   TranslationDataset,
    ckpt_manager:  CheckpointManager,
    metrics:       MetricsLogger,
) -> Result<()> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop(cfg, train_dataset, val_dataset, ckpt_manager, metrics, device)
}

fn train_loop(
    cfg:           &TrainConfig,
    train_dataset: TranslationDataset,
    val_dataset:   TranslationDataset,
    ckpt_manager:  CheckpointManager,
    metrics:       MetricsLogger,
    device:        burn::backend::wgpu::WgpuDevice,
) -> Result<()> {

    // Seed the backend RNG so parameter init is reproducible
    MyBackend::seed(cfg.seed);

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = TransformerConfig::new(
        cfg.src_vocab_size, cfg.tgt_vocab_size, cfg.max_seq_len, cfg.d_model,
    )
    .with_num_heads(cfg.num_heads)
    .with_num_layers(cfg.num_layers)
    .with_d_ff(cfg.d_ff);
    let mut model: Transformer<MyBackend> = model_cfg.init(&device)?;
    tracing::info!(
        "Model ready: {} layers, d_model={}, {:.1}M parameters",
        cfg.num_layers,
        cfg.d_model,
        model.num_params() as f64 / 1e6,
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let optim_cfg = AdamConfig::new().with_epsilon(1e-8);
    let mut optim = optim_cfg.init();

    // ── Training data loader (AutodiffBackend, shuffled) ──────────────────────
    let train_batcher = TranslationBatcher::<MyBackend>::new(device.clone());
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(42)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation data loader (InnerBackend — fixed order, no autodiff) ──────
    let val_batcher = TranslationBatcher::<MyInnerBackend>::new(device.clone());
    let val_loader  = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        let epoch_timer = Instant::now();

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let loss = batch_loss(&model, batch, cfg.max_seq_len, &device)?;

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            train_loss_sum += loss_val;
            train_batches  += 1;

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        // model.valid() → Transformer<MyInnerBackend>; forward-only,
        // parameters untouched
        let model_valid = model.valid();

        let mut val_loss_sum = 0.0f64;
        let mut val_batches  = 0usize;

        for batch in val_loader.iter() {
            let loss = batch_loss(&model_valid, batch, cfg.max_seq_len, &device)?;
            val_loss_sum += loss.into_scalar().elem::<f64>();
            val_batches  += 1;
        }

        let avg_val_loss = if val_batches > 0 {
            val_loss_sum / val_batches as f64
        } else { f64::NAN };

        let epoch_secs = epoch_timer.elapsed().as_secs_f64();

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | {:.1}s",
            epoch, cfg.epochs, avg_train_loss, avg_val_loss, epoch_secs,
        );

        metrics.log(&EpochMetrics::new(epoch, avg_train_loss, avg_val_loss, epoch_secs))?;
    }

    // ── Single end-of-run snapshot ────────────────────────────────────────────
    // One flat parameter collection, written once after the last
    // epoch — there are no intermediate checkpoints to roll back to
    ckpt_manager.save_model(&model)?;
    tracing::info!("Training complete — snapshot saved");

    Ok(())
}

/// Forward pass + cross-entropy for one batch. Generic over the
/// backend so the training loop (autodiff), the validation loop
/// and the evaluator (inner backend) all share the exact same
/// numerical path.
pub fn batch_loss<B: Backend>(
    model:       &Transformer<B>,
    batch:       TranslationBatch<B>,
    max_seq_len: usize,
    device:      &B::Device,
) -> Result<Tensor<B, 1>, ModelError> {
    validate_batch(&batch, max_seq_len, device)?;

    let [batch_size, seq_len] = batch.target.dims();

    // Teacher forcing: input is the target without its last
    // token, the label is the target without its first
    let tgt_input  = batch.target.clone().slice([0..batch_size, 0..seq_len - 1]);
    let tgt_output = batch.target.slice([0..batch_size, 1..seq_len]);

    let src_mask = source_padding_mask(batch.source.clone(), PAD_ID);
    let tgt_mask = target_causal_mask(tgt_input.clone(), PAD_ID);

    let memory = model.encode(batch.source, src_mask.clone());
    let logits = model.decode(tgt_input, memory, src_mask, tgt_mask);

    let (flat_logits, flat_targets) = flatten_for_loss(logits, tgt_output)?;

    // The mean runs over EVERY position, pad slots included —
    // pads dominate short sentences and dilute the loss signal.
    // CrossEntropyLossConfig's pad_tokens option is deliberately
    // left unset to keep that behaviour.
    let ce = CrossEntropyLossConfig::new().init(&flat_logits.device());
    Ok(ce.forward(flat_logits, flat_targets))
}

/// Explicit shape/device gate for incoming batches. Rejects
/// anything that does not match the [batch, max_seq_len] layout
/// the collaborator promised, before it reaches the model.
fn validate_batch<B: Backend>(
    batch:       &TranslationBatch<B>,
    max_seq_len: usize,
    device:      &B::Device,
) -> Result<(), ModelError> {
    let src_dims = batch.source.dims();
    let tgt_dims = batch.target.dims();

    if src_dims[1] != max_seq_len {
        return Err(ModelError::DataShape {
            tensor:   "source batch",
            expected: vec![src_dims[0], max_seq_len],
            found:    src_dims.to_vec(),
        });
    }
    if tgt_dims != src_dims {
        return Err(ModelError::DataShape {
            tensor:   "target batch",
            expected: src_dims.to_vec(),
            found:    tgt_dims.to_vec(),
        });
    }
    if batch.source.device() != *device {
        return Err(ModelError::DeviceMismatch { tensor: "source batch" });
    }
    if batch.target.device() != *device {
        return Err(ModelError::DeviceMismatch { tensor: "target batch" });
    }

    Ok(())
}

/// Flatten [B, T, V] logits and [B, T] labels to the [N, V] /
/// [N] pair cross-entropy expects, checking the named dims
/// agree first instead of trusting the reshape.
fn flatten_for_loss<B: Backend>(
    logits:  Tensor<B, 3>,
    targets: Tensor<B, 2, Int>,
) -> Result<(Tensor<B, 2>, Tensor<B, 1, Int>), ModelError> {
    let [batch_size, seq_len, vocab_size] = logits.dims();
    let target_dims = targets.dims();

    if target_dims != [batch_size, seq_len] {
        return Err(ModelError::DataShape {
            tensor:   "decoder targets",
            expected: vec![batch_size, seq_len],
            found:    target_dims.to_vec(),
        });
    }

    Ok((
        logits.reshape([batch_size * seq_len, vocab_size]),
        targets.reshape([batch_size * seq_len]),
    ))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::TranslationSample;
    use burn::data::dataloader::batcher::Batcher;

    type TestBackend = burn::backend::NdArray;
    type TestAutodiffBackend = burn::backend::Autodiff<burn::backend::NdArray>;

    fn copy_task_batch<B: Backend>(device: &B::Device) -> TranslationBatch<B> {
        // vocabulary: <pad>=0, [start]=1, [end]=2, the=3, cat=4
        // "[start] the cat [end]" → [1, 3, 4, 2], padded to 5
        let sample = TranslationSample::padded(vec![1, 3, 4, 2], vec![1, 3, 4, 2], 5);
        assert_eq!(sample.source_ids, vec![1, 3, 4, 2, 0]);
        TranslationBatcher::<B>::new(device.clone()).batch(vec![sample])
    }

    fn tiny_model<B: Backend>(device: &B::Device) -> Transformer<B> {
        TransformerConfig::new(5, 5, 5, 16)
            .with_num_heads(2)
            .with_num_layers(2)
            .with_d_ff(32)
            .init(device)
            .unwrap()
    }

    #[test]
    fn test_copy_task_training_step_gives_finite_loss() {
        let device = Default::default();
        let model = tiny_model::<TestAutodiffBackend>(&device);

        let loss = batch_loss(&model, copy_task_batch(&device), 5, &device).unwrap();
        let value: f64 = loss.clone().into_scalar().elem::<f64>();
        assert!(value.is_finite(), "loss was {value}");
        assert!(value >= 0.0, "cross-entropy cannot be negative, got {value}");

        // One full optimiser step must also run cleanly ...
        let mut optim = AdamConfig::new().with_epsilon(1e-8).init();
        let grads = GradientsParams::from_grads(loss.backward(), &model);
        let model = optim.step(1e-4, model, grads);

        // ... and the updated parameters still score finite
        let loss_after = batch_loss(&model, copy_task_batch(&device), 5, &device).unwrap();
        let value_after: f64 = loss_after.into_scalar().elem::<f64>();
        assert!(value_after.is_finite());
    }

    #[test]
    fn test_batch_with_wrong_width_is_rejected() {
        let device = Default::default();
        let model = tiny_model::<TestBackend>(&device);

        // Samples padded to 6, but the run was configured for 5
        let sample = TranslationSample::padded(vec![1, 3, 2], vec![1, 4, 2], 6);
        let batch = TranslationBatcher::<TestBackend>::new(device.clone()).batch(vec![sample]);

        let result = batch_loss(&model, batch, 5, &device);
        assert!(matches!(result, Err(ModelError::DataShape { .. })));
    }

    #[test]
    fn test_flatten_rejects_disagreeing_dims() {
        let device: burn::backend::ndarray::NdArrayDevice = Default::default();

        let logits  = Tensor::<TestBackend, 3>::zeros([2, 4, 7], &device);
        let targets = Tensor::<TestBackend, 2, Int>::zeros([2, 3], &device);

        let result = flatten_for_loss(logits, targets);
        assert!(matches!(result, Err(ModelError::DataShape { .. })));
    }

    #[test]
    fn test_flatten_produces_loss_ready_shapes() {
        let device: burn::backend::ndarray::NdArrayDevice = Default::default();

        let logits  = Tensor::<TestBackend, 3>::zeros([2, 4, 7], &device);
        let targets = Tensor::<TestBackend, 2, Int>::zeros([2, 4], &device);

        let (flat_logits, flat_targets) = flatten_for_loss(logits, targets).unwrap();
        assert_eq!(flat_logits.dims(), [8, 7]);
        assert_eq!(flat_targets.dims(), [8]);
    }
}
