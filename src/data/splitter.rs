// ============================================================
// Layer 4 — Train/Validation/Test Splitter
// ============================================================
// Shuffles samples with a FIXED seed and splits them into
// three sets:
//   - Training set:   used to update model weights
//   - Validation set: measured after every epoch, never trained on
//   - Test set:       held out entirely, scored only by `evaluate`
//
// Why shuffle before splitting?
//   Corpus files are often sorted (by length, by topic, by
//   crawl date). Without shuffling, the held-out sets would
//   contain only one kind of sentence.
//
// Why a SEEDED shuffle?
//   The split must be reproducible across runs: `evaluate`
//   reconstructs the same test slice from the same corpus and
//   seed, instead of persisting index lists alongside the
//   checkpoint.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom with a
// StdRng seeded from the split seed.
//
// Reference: Rust Book §8 (Vectors)
//            rand crate documentation

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `samples` deterministically and split into
/// (train, validation, test).
///
/// # Arguments
/// * `samples`        - All available samples (consumed)
/// * `train_fraction` - Proportion for training, e.g. 0.8
/// * `val_fraction`   - Proportion for validation, e.g. 0.1
/// * `seed`           - Shuffle seed; same seed = same split
///
/// The test set is whatever remains after the first two cuts.
pub fn split_three_way<T>(
    mut samples: Vec<T>,
    train_fraction: f64,
    val_fraction: f64,
    seed: u64,
) -> (Vec<T>, Vec<T>, Vec<T>) {
    // Seeded RNG so every run of the same corpus produces the
    // same permutation
    let mut rng = StdRng::seed_from_u64(seed);

    // Fisher-Yates shuffle — every permutation equally likely
    samples.shuffle(&mut rng);

    // Contiguous cuts after the shuffle:
    // [0..train_end) = train, [train_end..val_end) = val, rest = test
    let total     = samples.len();
    let train_end = ((total as f64) * train_fraction).round() as usize;
    let val_end   = ((total as f64) * (train_fraction + val_fraction)).round() as usize;

    // Clamp to valid range to avoid panics on tiny datasets
    let train_end = train_end.min(total);
    let val_end   = val_end.clamp(train_end, total);

    // split_off(n) removes elements [n..] and returns them
    let mut rest = samples.split_off(train_end);
    let test     = rest.split_off(val_end - train_end);

    tracing::debug!(
        "Dataset split: {} training, {} validation, {} test",
        samples.len(),
        rest.len(),
        test.len(),
    );

    (samples, rest, test)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, val, test) = split_three_way(items, 0.8, 0.1, 42);
        assert_eq!(train.len(), 80);
        assert_eq!(val.len(),   10);
        assert_eq!(test.len(),  10);
    }

    #[test]
    fn test_all_items_preserved() {
        // No items should be lost across the three cuts
        let items: Vec<usize> = (0..53).collect();
        let (train, val, test) = split_three_way(items, 0.7, 0.2, 7);

        let mut seen: Vec<usize> = train.into_iter().chain(val).chain(test).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..53).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = split_three_way((0..40).collect::<Vec<_>>(), 0.8, 0.1, 42);
        let b = split_three_way((0..40).collect::<Vec<_>>(), 0.8, 0.1, 42);
        assert_eq!(a.0, b.0);
        assert_eq!(a.1, b.1);
        assert_eq!(a.2, b.2);
    }

    #[test]
    fn test_different_seed_different_order() {
        let a = split_three_way((0..200).collect::<Vec<_>>(), 0.8, 0.1, 1);
        let b = split_three_way((0..200).collect::<Vec<_>>(), 0.8, 0.1, 2);
        // Same sizes, almost surely a different permutation
        assert_eq!(a.0.len(), b.0.len());
        assert_ne!(a.0, b.0);
    }

    #[test]
    fn test_empty_dataset() {
        let items: Vec<usize> = Vec::new();
        let (train, val, test) = split_three_way(items, 0.8, 0.1, 42);
        assert!(train.is_empty());
        assert!(val.is_empty());
        assert!(test.is_empty());
    }

    #[test]
    fn test_full_training_split() {
        // 1.0 fraction sends everything to training
        let items: Vec<usize> = (0..10).collect();
        let (train, val, test) = split_three_way(items, 1.0, 0.0, 42);
        assert_eq!(train.len(), 10);
        assert!(val.is_empty());
        assert!(test.is_empty());
    }
}
