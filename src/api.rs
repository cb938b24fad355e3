//! Core prediction types shared by the classifier, the pipeline and the
//! evaluation harness.

use serde::{Deserialize, Serialize};

/// Emotion predicted for a piece of text.
///
/// # Examples
///
/// ```
/// use emotion_rnn::api::Prediction;
///
/// let p = Prediction::new("happy", vec![0.1, 0.9]);
/// assert_eq!(p.label, "happy");
/// assert!((p.confidence() - 0.9).abs() < f32::EPSILON);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    /// Output distribution in sorted class order.
    pub probabilities: Vec<f32>,
}

impl Prediction {
    #[must_use]
    pub fn new(label: impl Into<String>, probabilities: Vec<f32>) -> Self {
        Self {
            label: label.into(),
            probabilities,
        }
    }

    /// Largest probability in the distribution, or `0.0` when it is empty.
    #[must_use]
    pub fn confidence(&self) -> f32 {
        self.probabilities.iter().copied().fold(0.0, f32::max)
    }
}

/// A model mapping padded token batches to class distributions.
pub trait SequenceModel {
    /// Error type returned when inference fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Predict one distribution per row of `batch`.
    ///
    /// Each row is a padded sequence of token ids; each output row has one
    /// entry per class in sorted class order.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch is malformed or inference fails.
    fn predict(&self, batch: &[Vec<u32>]) -> Result<Vec<Vec<f32>>, Self::Error>;
}

impl<M: SequenceModel + ?Sized> SequenceModel for &M {
    type Error = M::Error;

    fn predict(&self, batch: &[Vec<u32>]) -> Result<Vec<Vec<f32>>, Self::Error> {
        (**self).predict(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(vec![], 0.0)]
    #[case(vec![0.2, 0.5, 0.3], 0.5)]
    fn confidence_is_the_maximum(#[case] probabilities: Vec<f32>, #[case] expected: f32) {
        let p = Prediction::new("x", probabilities);
        assert!((p.confidence() - expected).abs() < f32::EPSILON);
    }
}
