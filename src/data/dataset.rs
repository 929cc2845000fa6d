use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::data::vocab::PAD_ID;

/// One fully tokenised and padded training sample.
/// Both sequences: [start] tokens... [end] <pad>...
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationSample {
    pub source_ids: Vec<u32>,
    pub target_ids: Vec<u32>,
}

impl TranslationSample {
    /// Right-pad both id sequences to exactly `max_len`.
    /// max_len is the corpus-wide maximum computed before the
    /// split, so resize only ever extends.
    pub fn padded(mut source_ids: Vec<u32>, mut target_ids: Vec<u32>, max_len: usize) -> Self {
        source_ids.resize(max_len, PAD_ID);
        target_ids.resize(max_len, PAD_ID);
        Self { source_ids, target_ids }
    }

    pub fn seq_len(&self) -> usize {
        self.source_ids.len()
    }
}

pub struct TranslationDataset {
    samples: Vec<TranslationSample>,
}

impl TranslationDataset {
    pub fn new(samples: Vec<TranslationSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<TranslationSample> for TranslationDataset {
    fn get(&self, index: usize) -> Option<TranslationSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::preprocessor::Preprocessor;
    use crate::data::vocab::Vocabulary;

    #[test]
    fn test_padding_extends_to_max_len() {
        let s = TranslationSample::padded(vec![1, 3, 2], vec![1, 4, 5, 2], 6);
        assert_eq!(s.source_ids, vec![1, 3, 2, 0, 0, 0]);
        assert_eq!(s.target_ids, vec![1, 4, 5, 2, 0, 0]);
        assert_eq!(s.seq_len(), 6);
    }

    #[test]
    fn test_the_cat_encodes_and_pads_as_expected() {
        // '<pad>'=0, '[start]'=1, '[end]'=2, 'the'=3, 'cat'=4
        let p = Preprocessor::new();
        let prepared = p.prepare("the cat");
        let v = Vocabulary::new().absorb(&prepared);

        let ids = v.encode(&prepared);
        assert_eq!(ids, vec![1, 3, 4, 2]);

        let s = TranslationSample::padded(ids.clone(), ids, 5);
        assert_eq!(s.source_ids, vec![1, 3, 4, 2, 0]);
        assert_eq!(s.target_ids, vec![1, 3, 4, 2, 0]);
    }

    #[test]
    fn test_dataset_get_and_len() {
        let ds = TranslationDataset::new(vec![
            TranslationSample::padded(vec![1, 2], vec![1, 2], 4),
            TranslationSample::padded(vec![1, 3, 2], vec![1, 3, 2], 4),
        ]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.get(1).unwrap().source_ids, vec![1, 3, 2, 0]);
        assert!(ds.get(2).is_none());
    }
}
