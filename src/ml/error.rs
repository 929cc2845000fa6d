// ============================================================
// Layer 5 — Model Error Taxonomy
// ============================================================
// Typed errors for the ML layer. Everything here is fatal:
// there is no retry path anywhere in training, so a single bad
// batch or config aborts the run. The application layer wraps
// these in anyhow for reporting.
//
// Reference: thiserror crate documentation
//            Rust Book §9 (Error Handling)

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    /// Architecture parameters that cannot produce a valid
    /// model, caught at construction time.
    #[error("invalid model configuration: {reason}")]
    Configuration { reason: String },

    /// A tensor whose dimensions do not match what the trainer
    /// expects. Checked with explicit named shapes at the batch
    /// and loss boundaries instead of trusting reshapes to blow
    /// up somewhere deeper.
    #[error("unexpected {tensor} shape: expected {expected:?}, found {found:?}")]
    DataShape {
        tensor:   &'static str,
        expected: Vec<usize>,
        found:    Vec<usize>,
    },

    /// A tensor living on a different device than the one the
    /// run was configured with. All inputs, masks and parameters
    /// must share one compute target.
    #[error("device mismatch: {tensor} is not on the training device")]
    DeviceMismatch { tensor: &'static str },
}

impl ModelError {
    /// Shorthand for configuration failures.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Configuration { reason: reason.into() }
    }
}
