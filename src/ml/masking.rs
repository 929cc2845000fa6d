// ============================================================
// Layer 5 — Attention Masks
// ============================================================
// Pure functions that turn token-id batches into the boolean
// masks attention consumes. `true` = this key position may be
// attended to, `false` = suppressed before the softmax.
//
// Two kinds of mask:
//
//   Source mask [batch, 1, 1, len]
//     key j attendable ⇔ source token j is not padding.
//     The two singleton axes broadcast over heads and query
//     positions — every query row sees the same key gating.
//
//   Target mask [batch, 1, len, len]
//     entry (i, j) attendable ⇔ target token j is not padding
//     AND j <= i. The triangular part stops a position from
//     peeking at later tokens during teacher-forced training;
//     without it the decoder would just copy the next token
//     from its own input.
//
// Both are pure functions of the id batch — no state, no RNG.
//
// Reference: Vaswani et al. (2017) §3.2.3 (masked attention)

use burn::prelude::*;

/// Source-side padding mask: [batch, 1, 1, len], true where the
/// token is a real word rather than padding.
pub fn source_padding_mask<B: Backend>(
    tokens: Tensor<B, 2, Int>,
    pad_id: u32,
) -> Tensor<B, 4, Bool> {
    let [batch_size, seq_len] = tokens.dims();

    tokens
        .not_equal_elem(pad_id as i32)
        .reshape([batch_size, 1, 1, seq_len])
}

/// Target-side combined mask: [batch, 1, len, len], entry (i, j)
/// true iff token j is not padding and j <= i.
pub fn target_causal_mask<B: Backend>(
    tokens: Tensor<B, 2, Int>,
    pad_id: u32,
) -> Tensor<B, 4, Bool> {
    let [batch_size, seq_len] = tokens.dims();
    let device = tokens.device();

    // Padding part: same key gating for every query row
    let pad_mask = tokens
        .not_equal_elem(pad_id as i32)
        .int()
        .reshape([batch_size, 1, 1, seq_len])
        .expand([batch_size, 1, seq_len, seq_len]);

    // Causal part: lower triangle (j <= i) of an all-ones matrix
    let causal = Tensor::<B, 2, Int>::ones([seq_len, seq_len], &device)
        .tril(0)
        .reshape([1, 1, seq_len, seq_len])
        .expand([batch_size, 1, seq_len, seq_len]);

    // Both conditions must hold: elementwise AND via Int multiply
    (pad_mask * causal).bool()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    fn tokens(rows: &[i32], batch: usize, len: usize) -> Tensor<TestBackend, 2, Int> {
        let device = Default::default();
        Tensor::<TestBackend, 1, Int>::from_ints(rows, &device).reshape([batch, len])
    }

    #[test]
    fn test_source_mask_marks_pad_positions() {
        // [start]=1, the=3, [end]=2, <pad>=0
        let mask = source_padding_mask(tokens(&[1, 3, 2, 0], 1, 4), 0);
        assert_eq!(mask.dims(), [1, 1, 1, 4]);

        let values: Vec<bool> = mask.into_data().to_vec().unwrap();
        assert_eq!(values, vec![true, true, true, false]);
    }

    #[test]
    fn test_target_mask_is_lower_triangular() {
        // No padding — the mask must be exactly j <= i
        let mask = target_causal_mask(tokens(&[1, 3, 4, 2], 1, 4), 0);
        assert_eq!(mask.dims(), [1, 1, 4, 4]);

        let values: Vec<bool> = mask.into_data().to_vec().unwrap();
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(
                    values[i * 4 + j],
                    j <= i,
                    "entry ({i},{j}) must be attendable iff j <= i"
                );
            }
        }
    }

    #[test]
    fn test_target_mask_blocks_pad_keys() {
        // Last position is padding: no query row may attend it,
        // even rows at or after its index
        let mask = target_causal_mask(tokens(&[1, 3, 0], 1, 3), 0);

        let values: Vec<bool> = mask.into_data().to_vec().unwrap();
        for i in 0..3 {
            assert!(!values[i * 3 + 2], "pad key visible from query row {i}");
        }
        // Non-pad keys still follow the triangle
        assert!(values[0]);          // (0,0)
        assert!(!values[1]);         // (0,1) future
        assert!(values[3] && values[4]); // (1,0), (1,1)
    }

    #[test]
    fn test_masks_are_per_batch_row() {
        // Two rows with padding in different places must get
        // different gating
        let mask = source_padding_mask(tokens(&[1, 3, 0, 1, 0, 0], 2, 3), 0);
        let values: Vec<bool> = mask.into_data().to_vec().unwrap();
        assert_eq!(values[..3], [true, true, false]);
        assert_eq!(values[3..], [true, false, false]);
    }
}
