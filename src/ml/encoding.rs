// ============================================================
// Layer 5 — Sinusoidal Positional Encoding
// ============================================================
// Self-attention is permutation-invariant, so word order has
// to be injected into the embeddings explicitly. This module
// adds the fixed sinusoidal table from the original
// transformer paper:
//
//   PE(pos, 2i)   = sin(pos / 10000^(2i / d_model))
//   PE(pos, 2i+1) = cos(pos / 10000^(2i / d_model))
//
// Each position gets a unique pattern of phases, and any
// relative offset is a linear function of the pattern, which
// is what lets attention learn "the word three places back".
//
// The table is a plain tensor field, not a Param: Burn treats
// it as a module constant (ConstantRecord), so it carries no
// gradient and is rebuilt at construction instead of being
// persisted inside checkpoints.
//
// Reference: Vaswani et al. (2017) §3.5

use burn::prelude::*;

#[derive(Module, Debug)]
pub struct PositionalEncoding<B: Backend> {
    /// Precomputed table, shape [1, max_len, d_model]
    table: Tensor<B, 3>,
}

impl<B: Backend> PositionalEncoding<B> {
    /// Precompute the encoding for every position up to
    /// `max_len`. Plain f32 math on the CPU, moved to the
    /// device once as a single tensor.
    pub fn new(max_len: usize, d_model: usize, device: &B::Device) -> Self {
        let mut values = vec![0.0f32; max_len * d_model];

        for pos in 0..max_len {
            for i in 0..d_model {
                // Dimension pairs (2i, 2i+1) share one frequency
                let pair = (i / 2) as f32;
                let angle =
                    pos as f32 / 10_000f32.powf(2.0 * pair / d_model as f32);

                values[pos * d_model + i] = if i % 2 == 0 {
                    angle.sin()
                } else {
                    angle.cos()
                };
            }
        }

        let table = Tensor::from_data(
            TensorData::new(values, [1, max_len, d_model]),
            device,
        );

        Self { table }
    }

    /// Add order information to a batch of scaled embeddings:
    /// x + PE[..seq_len]. Works for any seq_len up to max_len.
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let [batch_size, seq_len, d_model] = x.dims();

        let slice = self
            .table
            .clone()
            .slice([0..1, 0..seq_len, 0..d_model])
            .expand([batch_size, seq_len, d_model]);

        x + slice
    }

    /// Longest sequence this table covers.
    pub fn max_len(&self) -> usize {
        self.table.dims()[1]
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    fn table_values(max_len: usize, d_model: usize) -> Vec<f32> {
        let device = Default::default();
        PositionalEncoding::<TestBackend>::new(max_len, d_model, &device)
            .table
            .into_data()
            .to_vec()
            .unwrap()
    }

    #[test]
    fn test_position_zero_is_alternating_zero_one() {
        // sin(0) = 0 for even dims, cos(0) = 1 for odd dims
        let values = table_values(4, 6);
        for i in 0..6 {
            let expected = if i % 2 == 0 { 0.0 } else { 1.0 };
            assert!((values[i] - expected).abs() < 1e-6, "dim {i}");
        }
    }

    #[test]
    fn test_first_dimension_is_sin_of_position() {
        // Frequency of dim 0 is 1, so PE(pos, 0) = sin(pos)
        let d = 8;
        let values = table_values(5, d);
        for pos in 0..5 {
            let expected = (pos as f32).sin();
            assert!((values[pos * d] - expected).abs() < 1e-5, "pos {pos}");
        }
    }

    #[test]
    fn test_distinct_positions_get_distinct_encodings() {
        let d = 16;
        let values = table_values(10, d);
        let row = |p: usize| &values[p * d..(p + 1) * d];
        assert_ne!(row(1), row(2));
        assert_ne!(row(0), row(9));
    }

    #[test]
    fn test_forward_adds_table_to_input() {
        let device = Default::default();
        let pe = PositionalEncoding::<TestBackend>::new(6, 4, &device);

        // Zeros in → the output IS the table slice, for each batch row
        let x = Tensor::<TestBackend, 3>::zeros([2, 3, 4], &device);
        let out: Vec<f32> = pe.forward(x).into_data().to_vec().unwrap();

        let expected = table_values(6, 4);
        assert_eq!(&out[..12], &expected[..12]); // batch row 0
        assert_eq!(&out[12..], &expected[..12]); // batch row 1
    }

    #[test]
    fn test_forward_is_deterministic() {
        let device = Default::default();
        let pe = PositionalEncoding::<TestBackend>::new(5, 4, &device);
        let x = Tensor::<TestBackend, 3>::ones([1, 5, 4], &device);

        let a: Vec<f32> = pe.forward(x.clone()).into_data().to_vec().unwrap();
        let b: Vec<f32> = pe.forward(x).into_data().to_vec().unwrap();
        assert_eq!(a, b);
    }
}
