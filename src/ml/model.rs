// ============================================================
// Layer 5 — Transformer Encoder-Decoder
// ============================================================
// The full translation model: embeddings → encoder stack →
// decoder stack → vocabulary projection. Purely a
// differentiable function from token-id batches to logits;
// no training logic lives here.
//
// Residual wiring follows the original paper (post-norm):
//   x = LayerNorm(x + Sublayer(x))
//
// Reference: Vaswani et al. (2017) Attention Is All You Need

use burn::{
    nn::{
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::ml::attention::MultiHeadAttention;
use crate::ml::encoding::PositionalEncoding;
use crate::ml::error::ModelError;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct TransformerConfig {
    /// Embedding-table rows for the source language
    pub src_vocab_size: usize,
    /// Embedding-table rows for the target language
    pub tgt_vocab_size: usize,
    /// Longest padded sequence the model will ever see
    pub max_seq_len: usize,
    /// Width of every representation in the model (D)
    pub d_model: usize,

    #[config(default = 8)]
    pub num_heads: usize,
    #[config(default = 6)]
    pub num_layers: usize,
    #[config(default = 2048)]
    pub d_ff: usize,
}

impl TransformerConfig {
    /// Validate the architecture and build the model on `device`.
    /// Head splitting requires d_model to divide evenly into
    /// num_heads subspaces, so that is rejected here before any
    /// tensor is allocated.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<Transformer<B>, ModelError> {
        if self.num_heads == 0 || self.d_model % self.num_heads != 0 {
            return Err(ModelError::config(format!(
                "d_model ({}) must be divisible by num_heads ({})",
                self.d_model, self.num_heads
            )));
        }
        if self.num_layers == 0 {
            return Err(ModelError::config("num_layers must be at least 1"));
        }

        let encoder = Encoder {
            layers: (0..self.num_layers)
                .map(|_| self.build_encoder_layer(device))
                .collect(),
        };
        let decoder = Decoder {
            layers: (0..self.num_layers)
                .map(|_| self.build_decoder_layer(device))
                .collect(),
        };

        Ok(Transformer {
            src_embedding: EmbeddingConfig::new(self.src_vocab_size, self.d_model).init(device),
            tgt_embedding: EmbeddingConfig::new(self.tgt_vocab_size, self.d_model).init(device),
            positional:    PositionalEncoding::new(self.max_seq_len, self.d_model, device),
            encoder,
            decoder,
            project:       LinearConfig::new(self.d_model, self.tgt_vocab_size).init(device),
            d_model:       self.d_model,
        })
    }

    fn build_encoder_layer<B: Backend>(&self, device: &B::Device) -> EncoderLayer<B> {
        EncoderLayer {
            self_attn:    MultiHeadAttention::new(self.d_model, self.num_heads, device),
            feed_forward: FeedForward::new(self.d_model, self.d_ff, device),
            norm1:        LayerNormConfig::new(self.d_model).init(device),
            norm2:        LayerNormConfig::new(self.d_model).init(device),
        }
    }

    fn build_decoder_layer<B: Backend>(&self, device: &B::Device) -> DecoderLayer<B> {
        DecoderLayer {
            self_attn:    MultiHeadAttention::new(self.d_model, self.num_heads, device),
            cross_attn:   MultiHeadAttention::new(self.d_model, self.num_heads, device),
            feed_forward: FeedForward::new(self.d_model, self.d_ff, device),
            norm1:        LayerNormConfig::new(self.d_model).init(device),
            norm2:        LayerNormConfig::new(self.d_model).init(device),
            norm3:        LayerNormConfig::new(self.d_model).init(device),
        }
    }
}

// ─── FeedForward ──────────────────────────────────────────────────────────────
/// Position-wise two-layer projection: D → d_ff → D with ReLU
/// between. Applied to every position independently, so it
/// never mixes information across the sequence axis.
#[derive(Module, Debug)]
pub struct FeedForward<B: Backend> {
    expand:   Linear<B>,
    contract: Linear<B>,
}

impl<B: Backend> FeedForward<B> {
    pub fn new(d_model: usize, d_ff: usize, device: &B::Device) -> Self {
        Self {
            expand:   LinearConfig::new(d_model, d_ff).init(device),
            contract: LinearConfig::new(d_ff, d_model).init(device),
        }
    }

    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        self.contract.forward(relu(self.expand.forward(x)))
    }
}

// ─── EncoderLayer ─────────────────────────────────────────────────────────────
/// Self-attention over the source followed by the feed-forward,
/// each wrapped in residual + LayerNorm.
#[derive(Module, Debug)]
pub struct EncoderLayer<B: Backend> {
    self_attn:    MultiHeadAttention<B>,
    feed_forward: FeedForward<B>,
    norm1:        LayerNorm<B>,
    norm2:        LayerNorm<B>,
}

impl<B: Backend> EncoderLayer<B> {
    pub fn forward(&self, x: Tensor<B, 3>, mask: Tensor<B, 4, Bool>) -> Tensor<B, 3> {
        let attn = self
            .self_attn
            .forward(x.clone(), x.clone(), x.clone(), Some(mask))
            .context;
        let x = self.norm1.forward(x + attn);

        let ff = self.feed_forward.forward(x.clone());
        self.norm2.forward(x + ff)
    }
}

// ─── DecoderLayer ─────────────────────────────────────────────────────────────
/// Masked self-attention over the target prefix, then
/// cross-attention querying the encoder output, then the
/// feed-forward — residual + LayerNorm around each.
#[derive(Module, Debug)]
pub struct DecoderLayer<B: Backend> {
    self_attn:    MultiHeadAttention<B>,
    cross_attn:   MultiHeadAttention<B>,
    feed_forward: FeedForward<B>,
    norm1:        LayerNorm<B>,
    norm2:        LayerNorm<B>,
    norm3:        LayerNorm<B>,
}

impl<B: Backend> DecoderLayer<B> {
    pub fn forward(
        &self,
        x: Tensor<B, 3>,
        memory: Tensor<B, 3>,
        src_mask: Tensor<B, 4, Bool>,
        tgt_mask: Tensor<B, 4, Bool>,
    ) -> Tensor<B, 3> {
        let self_attn = self
            .self_attn
            .forward(x.clone(), x.clone(), x.clone(), Some(tgt_mask))
            .context;
        let x = self.norm1.forward(x + self_attn);

        // Queries come from the target side, keys/values from the
        // encoder — the source mask gates which source positions
        // each target position may read
        let cross = self
            .cross_attn
            .forward(x.clone(), memory.clone(), memory, Some(src_mask))
            .context;
        let x = self.norm2.forward(x + cross);

        let ff = self.feed_forward.forward(x.clone());
        self.norm3.forward(x + ff)
    }
}

// ─── Encoder / Decoder stacks ─────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct Encoder<B: Backend> {
    layers: Vec<EncoderLayer<B>>,
}

impl<B: Backend> Encoder<B> {
    pub fn forward(&self, mut x: Tensor<B, 3>, mask: Tensor<B, 4, Bool>) -> Tensor<B, 3> {
        for layer in &self.layers {
            x = layer.forward(x, mask.clone());
        }
        x
    }
}

#[derive(Module, Debug)]
pub struct Decoder<B: Backend> {
    layers: Vec<DecoderLayer<B>>,
}

impl<B: Backend> Decoder<B> {
    pub fn forward(
        &self,
        mut x: Tensor<B, 3>,
        memory: Tensor<B, 3>,
        src_mask: Tensor<B, 4, Bool>,
        tgt_mask: Tensor<B, 4, Bool>,
    ) -> Tensor<B, 3> {
        for layer in &self.layers {
            x = layer.forward(x, memory.clone(), src_mask.clone(), tgt_mask.clone());
        }
        x
    }
}

// ─── Transformer ──────────────────────────────────────────────────────────────
/// The composed model. Owns both embedding tables, the two
/// stacks, the shared positional table and the final projection
/// to target-vocabulary logits.
#[derive(Module, Debug)]
pub struct Transformer<B: Backend> {
    src_embedding: Embedding<B>,
    tgt_embedding: Embedding<B>,
    positional:    PositionalEncoding<B>,
    encoder:       Encoder<B>,
    decoder:       Decoder<B>,
    project:       Linear<B>,
    d_model:       usize,
}

impl<B: Backend> Transformer<B> {
    /// Contextualise a source batch: [B, L] ids → [B, L, D].
    pub fn encode(&self, src: Tensor<B, 2, Int>, src_mask: Tensor<B, 4, Bool>) -> Tensor<B, 3> {
        let x = self.embed(self.src_embedding.forward(src));
        self.encoder.forward(x, src_mask)
    }

    /// Predict next-token logits for a teacher-forced target
    /// prefix: [B, L'] ids → [B, L', tgt_vocab_size].
    pub fn decode(
        &self,
        tgt_input: Tensor<B, 2, Int>,
        memory: Tensor<B, 3>,
        src_mask: Tensor<B, 4, Bool>,
        tgt_mask: Tensor<B, 4, Bool>,
    ) -> Tensor<B, 3> {
        let x = self.embed(self.tgt_embedding.forward(tgt_input));
        let x = self.decoder.forward(x, memory, src_mask, tgt_mask);
        self.project.forward(x)
    }

    /// Scale embeddings by sqrt(D), then add order information.
    /// The scale keeps embedding magnitudes comparable to the
    /// positional table so neither drowns out the other.
    fn embed(&self, embedded: Tensor<B, 3>) -> Tensor<B, 3> {
        self.positional
            .forward(embedded * (self.d_model as f64).sqrt())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::masking::{source_padding_mask, target_causal_mask};

    type TestBackend = burn::backend::NdArray;

    fn small_config() -> TransformerConfig {
        TransformerConfig::new(10, 12, 6, 16)
            .with_num_heads(2)
            .with_num_layers(2)
            .with_d_ff(32)
    }

    fn ids(rows: &[i32], batch: usize, len: usize) -> Tensor<TestBackend, 2, Int> {
        let device = Default::default();
        Tensor::<TestBackend, 1, Int>::from_ints(rows, &device).reshape([batch, len])
    }

    #[test]
    fn test_config_rejects_indivisible_heads() {
        let device = Default::default();
        let result = TransformerConfig::new(10, 10, 6, 10)
            .with_num_heads(3)
            .init::<TestBackend>(&device);
        assert!(matches!(result, Err(ModelError::Configuration { .. })));
    }

    #[test]
    fn test_config_rejects_zero_layers() {
        let device = Default::default();
        let result = small_config().with_num_layers(0).init::<TestBackend>(&device);
        assert!(matches!(result, Err(ModelError::Configuration { .. })));
    }

    #[test]
    fn test_encoder_shape_does_not_depend_on_padding() {
        let device = Default::default();
        let model = small_config().init::<TestBackend>(&device).unwrap();

        // One nearly-full row, one nearly-empty row
        let dense  = ids(&[1, 3, 4, 5, 6, 2], 1, 6);
        let sparse = ids(&[1, 2, 0, 0, 0, 0], 1, 6);

        let out_dense  = model.encode(dense.clone(), source_padding_mask(dense, 0));
        let out_sparse = model.encode(sparse.clone(), source_padding_mask(sparse, 0));

        assert_eq!(out_dense.dims(), [1, 6, 16]);
        assert_eq!(out_sparse.dims(), [1, 6, 16]);
    }

    #[test]
    fn test_decode_projects_to_target_vocab() {
        let device = Default::default();
        let model = small_config().init::<TestBackend>(&device).unwrap();

        let src = ids(&[1, 3, 4, 2, 0, 0], 1, 6);
        let tgt_input = ids(&[1, 5, 6, 7, 2], 1, 5);

        let src_mask = source_padding_mask(src.clone(), 0);
        let tgt_mask = target_causal_mask(tgt_input.clone(), 0);

        let memory = model.encode(src, src_mask.clone());
        let logits = model.decode(tgt_input, memory, src_mask, tgt_mask);

        // tgt vocab size is 12 in small_config
        assert_eq!(logits.dims(), [1, 5, 12]);
    }

    #[test]
    fn test_repeated_forward_is_identical() {
        // Same parameters + same batch → bitwise-same logits
        let device = Default::default();
        let model = small_config().init::<TestBackend>(&device).unwrap();

        let src = ids(&[1, 3, 4, 2, 0, 0], 1, 6);
        let tgt_input = ids(&[1, 5, 6, 2, 0], 1, 5);
        let src_mask = source_padding_mask(src.clone(), 0);
        let tgt_mask = target_causal_mask(tgt_input.clone(), 0);

        let run = || -> Vec<f32> {
            let memory = model.encode(src.clone(), src_mask.clone());
            model
                .decode(tgt_input.clone(), memory, src_mask.clone(), tgt_mask.clone())
                .into_data()
                .to_vec()
                .unwrap()
        };

        assert_eq!(run(), run());
    }
}
