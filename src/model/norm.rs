//! Per-feature normalisation applied after each recurrent layer.

use candle_core::Tensor;
use candle_nn::{BatchNorm, ModuleT, VarBuilder, batch_norm};

/// Matches the batch-normalisation epsilon the stored weights were trained with.
const EPSILON: f64 = 1e-3;

/// Batch normalisation over the last dimension of `N × T × D` sequences.
///
/// `candle_nn::BatchNorm` normalises dimension 1, so the sequence is viewed
/// as `N × D × T` around the call. Running statistics live in the variable
/// store as `running_mean` and `running_var` and persist with the weights.
#[derive(Debug, Clone)]
pub struct FeatureNorm {
    inner: BatchNorm,
}

impl FeatureNorm {
    /// Allocate an identity normalisation over `features` channels.
    ///
    /// # Errors
    ///
    /// Propagates allocation failures from the variable store.
    pub fn new(features: usize, vb: VarBuilder) -> candle_core::Result<Self> {
        Ok(Self {
            inner: batch_norm(features, EPSILON, vb)?,
        })
    }

    /// Normalise `xs` along its last dimension; `train` uses batch
    /// statistics and updates the running ones.
    ///
    /// # Errors
    ///
    /// Propagates shape errors when the last dimension does not match.
    pub fn forward(&self, xs: &Tensor, train: bool) -> candle_core::Result<Tensor> {
        let channels_first = xs.transpose(1, 2)?.contiguous()?;
        self.inner
            .forward_t(&channels_first, train)?
            .transpose(1, 2)?
            .contiguous()
    }
}
