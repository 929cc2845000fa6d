// ============================================================
// Layer 5 — Multi-Head Scaled Dot-Product Attention
// ============================================================
// Built from first principles on tensor ops rather than with
// burn's bundled attention module — the masking and scaling
// behaviour here is the contract the rest of the model is
// specified against, so it is implemented where it can be read
// and tested directly.
//
// Shape walk for one forward pass (D = d_model, H = heads,
// dk = D / H):
//
//   query            [B, Tq, D]
//   after projection [B, Tq, D]     learned Linear
//   split into heads [B, H, Tq, dk] reshape + swap_dims
//   scores           [B, H, Tq, Tk] q · kᵀ / sqrt(dk)
//   weights          [B, H, Tq, Tk] softmax over Tk
//   context          [B, H, Tq, dk] weights · v
//   merged           [B, Tq, D]     swap_dims + reshape
//   output           [B, Tq, D]     learned Linear
//
// Masking contract: disallowed (query, key) entries get a
// -1e9 additive bias before the softmax. exp(-1e9) underflows
// to exactly 0.0 in f32, so masked keys receive zero
// probability; a fully-masked row degrades to a uniform
// distribution instead of NaN.
//
// Reference: Vaswani et al. (2017) §3.2.1–3.2.2

use burn::{
    nn::{Linear, LinearConfig},
    prelude::*,
    tensor::activation::softmax,
};

/// Additive bias for masked score positions.
const MASKED_SCORE: f32 = -1.0e9;

#[derive(Module, Debug)]
pub struct MultiHeadAttention<B: Backend> {
    query:  Linear<B>,
    key:    Linear<B>,
    value:  Linear<B>,
    output: Linear<B>,

    num_heads: usize,
    head_dim:  usize,
}

/// Result of one attention pass: the projected context plus the
/// post-softmax weights, kept so callers and tests can inspect
/// where each position attended.
#[derive(Debug)]
pub struct AttentionOutput<B: Backend> {
    /// [batch, q_len, d_model]
    pub context: Tensor<B, 3>,

    /// [batch, heads, q_len, k_len]
    pub weights: Tensor<B, 4>,
}

impl<B: Backend> MultiHeadAttention<B> {
    /// Build the four projection layers. Divisibility of
    /// d_model by num_heads is validated once by
    /// TransformerConfig::init before this runs.
    pub fn new(d_model: usize, num_heads: usize, device: &B::Device) -> Self {
        Self {
            query:  LinearConfig::new(d_model, d_model).init(device),
            key:    LinearConfig::new(d_model, d_model).init(device),
            value:  LinearConfig::new(d_model, d_model).init(device),
            output: LinearConfig::new(d_model, d_model).init(device),
            num_heads,
            head_dim: d_model / num_heads,
        }
    }

    /// Attend `query` over `key`/`value`. The mask, when given,
    /// must broadcast to [batch, heads, q_len, k_len]; true
    /// entries are attendable.
    pub fn forward(
        &self,
        query: Tensor<B, 3>,
        key: Tensor<B, 3>,
        value: Tensor<B, 3>,
        mask: Option<Tensor<B, 4, Bool>>,
    ) -> AttentionOutput<B> {
        let [batch_size, q_len, _] = query.dims();
        let [_, k_len, _] = key.dims();

        let q = self.split_heads(self.query.forward(query)); // [B, H, Tq, dk]
        let k = self.split_heads(self.key.forward(key));     // [B, H, Tk, dk]
        let v = self.split_heads(self.value.forward(value)); // [B, H, Tk, dk]

        // Scaled dot product: [B, H, Tq, dk] · [B, H, dk, Tk]
        let scores = q.matmul(k.swap_dims(2, 3)) / (self.head_dim as f64).sqrt();

        // Suppress disallowed positions BEFORE the softmax so
        // they end up with zero probability, not small
        let scores = match mask {
            Some(mask) => {
                let mask = mask.expand([batch_size, self.num_heads, q_len, k_len]);
                scores.mask_fill(mask.bool_not(), MASKED_SCORE)
            }
            None => scores,
        };

        // Each query row becomes a distribution over key positions
        let weights = softmax(scores, 3);

        let context = self.merge_heads(weights.clone().matmul(v));
        let context = self.output.forward(context);

        AttentionOutput { context, weights }
    }

    /// [B, T, D] → [B, H, T, dk]
    fn split_heads(&self, x: Tensor<B, 3>) -> Tensor<B, 4> {
        let [batch_size, seq_len, _] = x.dims();
        x.reshape([batch_size, seq_len, self.num_heads, self.head_dim])
            .swap_dims(1, 2)
    }

    /// [B, H, T, dk] → [B, T, D]
    fn merge_heads(&self, x: Tensor<B, 4>) -> Tensor<B, 3> {
        let [batch_size, heads, seq_len, head_dim] = x.dims();
        x.swap_dims(1, 2)
            .reshape([batch_size, seq_len, heads * head_dim])
    }
}
