//! Learned attention pooling over the time axis.
//!
//! Each hidden channel is treated as a signal over time. Two dense
//! projections along the time axis produce, per channel, a distribution of
//! weights over timesteps:
//!
//! 1. `scores = sigmoid(W₁ · h_channel + b₁)`
//! 2. `weights = softmax_time(W₂ · scores + b₂)`
//!
//! The pooled vector is `Σ_t weights[t, d] · h[t, d]` for every channel `d`,
//! so the output width equals the hidden width.

use candle_core::{D, Tensor};
use candle_nn::{
    Linear, Module, VarBuilder, linear,
    ops::{sigmoid, softmax},
};

use super::errors::ClassifierError;
use super::forward_err;

/// Attention pooling operator for `N × T × D` hidden-state batches.
///
/// # Examples
///
/// ```
/// use candle_core::{DType, Device, Tensor};
/// use candle_nn::{VarBuilder, VarMap};
/// use emotion_rnn::model::AttentionPooling;
///
/// let var_map = VarMap::new();
/// let vb = VarBuilder::from_varmap(&var_map, DType::F32, &Device::Cpu);
/// let attention = AttentionPooling::new(4, vb).unwrap();
/// let hidden = Tensor::ones((2, 4, 3), DType::F32, &Device::Cpu).unwrap();
/// let pooled = attention.forward(&hidden).unwrap();
/// assert_eq!(pooled.dims(), &[2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct AttentionPooling {
    score: Linear,
    normalise: Linear,
    timesteps: usize,
}

impl AttentionPooling {
    /// Allocate both time-axis projections for sequences of `timesteps`.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::Build`] if parameter allocation fails.
    pub fn new(timesteps: usize, vb: VarBuilder) -> Result<Self, ClassifierError> {
        let build = |layer: &str, source| ClassifierError::Build {
            layer: format!("attention.{layer}"),
            source,
        };
        let score = linear(timesteps, timesteps, vb.pp("score")).map_err(|e| build("score", e))?;
        let normalise =
            linear(timesteps, timesteps, vb.pp("normalise")).map_err(|e| build("normalise", e))?;
        Ok(Self {
            score,
            normalise,
            timesteps,
        })
    }

    #[must_use]
    pub fn timesteps(&self) -> usize {
        self.timesteps
    }

    /// Per-timestep, per-channel weights shaped `N × T × D`; they sum to one
    /// along the time axis for every channel.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::TimestepMismatch`] when `hidden` does not
    /// have the configured number of timesteps, and
    /// [`ClassifierError::Forward`] when a tensor operation fails.
    pub fn weights(&self, hidden: &Tensor) -> Result<Tensor, ClassifierError> {
        let (_, timesteps, _) = hidden.dims3().map_err(forward_err("attention input"))?;
        if timesteps != self.timesteps {
            return Err(ClassifierError::TimestepMismatch {
                expected: self.timesteps,
                actual: timesteps,
            });
        }
        let err = forward_err("attention weights");
        let per_channel = hidden.transpose(1, 2).and_then(|t| t.contiguous()).map_err(&err)?;
        let scores = self
            .score
            .forward(&per_channel)
            .and_then(|t| sigmoid(&t))
            .map_err(&err)?;
        let weights = self
            .normalise
            .forward(&scores)
            .and_then(|t| softmax(&t, D::Minus1))
            .map_err(&err)?;
        weights.transpose(1, 2).and_then(|t| t.contiguous()).map_err(err)
    }

    /// Attention-weighted sum over time, shaped `N × D`.
    ///
    /// # Errors
    ///
    /// See [`AttentionPooling::weights`].
    pub fn forward(&self, hidden: &Tensor) -> Result<Tensor, ClassifierError> {
        let weights = self.weights(hidden)?;
        hidden
            .mul(&weights)
            .and_then(|weighted| weighted.sum(1))
            .map_err(forward_err("attention pooling"))
    }
}
