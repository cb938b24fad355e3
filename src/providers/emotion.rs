use thiserror::Error;

use super::TextProcessor;
use crate::api::{Prediction, SequenceModel};
use crate::labels::{LabelError, LabelSet};
use crate::text::{LinguisticNormalizer, Tokenizer, TokenizerError};

/// Errors returned by [`EmotionPipeline::process`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),
    #[error(transparent)]
    Labels(#[from] LabelError),
    #[error("model inference failed: {0}")]
    Model(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("model returned {actual} predictions for {expected} texts")]
    PredictionCount { expected: usize, actual: usize },
}

/// Text → emotion pipeline: optional normalisation, encoding, padding,
/// inference and label interpretation.
///
/// # Examples
///
/// ```
/// use std::convert::Infallible;
/// use emotion_rnn::api::SequenceModel;
/// use emotion_rnn::config::TokenizerConfig;
/// use emotion_rnn::labels::LabelSet;
/// use emotion_rnn::providers::{EmotionPipeline, TextProcessor};
/// use emotion_rnn::text::Tokenizer;
///
/// struct Calm;
///
/// impl SequenceModel for Calm {
///     type Error = Infallible;
///     fn predict(&self, batch: &[Vec<u32>]) -> Result<Vec<Vec<f32>>, Infallible> {
///         Ok(batch.iter().map(|_| vec![0.8, 0.2]).collect())
///     }
/// }
///
/// let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
/// tokenizer.fit(["a quiet evening"]);
/// let pipeline = EmotionPipeline::new(tokenizer, Calm, LabelSet::fit(["calm", "tense"]), 5);
/// let prediction = pipeline.process("A quiet evening").unwrap();
/// assert_eq!(prediction.label, "calm");
/// ```
#[derive(Debug)]
pub struct EmotionPipeline<M> {
    normalizer: Option<LinguisticNormalizer>,
    tokenizer: Tokenizer,
    model: M,
    classes: LabelSet,
    max_length: usize,
}

impl<M: SequenceModel> EmotionPipeline<M> {
    #[must_use]
    pub fn new(tokenizer: Tokenizer, model: M, classes: LabelSet, max_length: usize) -> Self {
        Self {
            normalizer: None,
            tokenizer,
            model,
            classes,
            max_length,
        }
    }

    /// Normalise text with `normalizer` before it reaches the tokenizer.
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: LinguisticNormalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    #[must_use]
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    #[must_use]
    pub fn classes(&self) -> &LabelSet {
        &self.classes
    }

    /// Predict every text in one batch.
    ///
    /// # Errors
    ///
    /// See [`EmotionPipeline::process`].
    pub fn predict_batch<I, S>(&self, texts: I) -> Result<Vec<Prediction>, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prepared: Vec<String> = texts
            .into_iter()
            .map(|text| match &self.normalizer {
                Some(normalizer) => normalizer.joined(text.as_ref()),
                None => text.as_ref().to_owned(),
            })
            .collect();
        let padded = self.tokenizer.encode_padded(&prepared, self.max_length)?;
        let rows = self
            .model
            .predict(&padded)
            .map_err(|err| PipelineError::Model(Box::new(err)))?;
        if rows.len() != prepared.len() {
            return Err(PipelineError::PredictionCount {
                expected: prepared.len(),
                actual: rows.len(),
            });
        }
        rows.into_iter()
            .map(|row| {
                let label = self.classes.interpret(&row)?.to_owned();
                Ok(Prediction::new(label, row))
            })
            .collect()
    }
}

impl<M> TextProcessor for EmotionPipeline<M>
where
    M: SequenceModel,
{
    type Output = Prediction;
    type Error = PipelineError;

    fn process(&self, input: &str) -> Result<Self::Output, Self::Error> {
        self.predict_batch([input])?
            .pop()
            .ok_or(PipelineError::PredictionCount {
                expected: 1,
                actual: 0,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenizerConfig;
    use crate::text::{NormalizerOptions, RuleBasedPipeline};
    use rstest::rstest;
    use std::convert::Infallible;
    use std::sync::{Arc, Mutex};

    /// Records the batches it sees and predicts the first class.
    #[derive(Default)]
    struct Recording(Mutex<Vec<Vec<u32>>>);

    impl SequenceModel for Recording {
        type Error = Infallible;

        fn predict(&self, batch: &[Vec<u32>]) -> Result<Vec<Vec<f32>>, Self::Error> {
            if let Ok(mut seen) = self.0.lock() {
                seen.extend(batch.iter().cloned());
            }
            Ok(batch.iter().map(|_| vec![0.6, 0.4]).collect())
        }
    }

    fn tokenizer() -> Tokenizer {
        let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
        tokenizer.fit(["feel calm", "feel tense"]);
        tokenizer
    }

    #[rstest]
    fn pads_to_configured_length() {
        let pipeline = EmotionPipeline::new(tokenizer(), Recording::default(), LabelSet::fit(["a", "b"]), 4);
        let prediction = pipeline.process("feel calm").unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(prediction.label, "a");
        let seen = pipeline.model.0.lock().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(seen[0], vec![0, 0, 1, 2]);
    }

    #[rstest]
    fn normalizer_runs_before_tokenizer() {
        let normalizer = LinguisticNormalizer::new(
            Arc::new(RuleBasedPipeline),
            NormalizerOptions::filter_and_extract_lemma(),
        );
        let pipeline = EmotionPipeline::new(tokenizer(), Recording::default(), LabelSet::fit(["a", "b"]), 3)
            .with_normalizer(normalizer);
        pipeline.process("I was feeling calm").unwrap_or_else(|e| panic!("{e}"));
        let seen = pipeline.model.0.lock().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(seen[0], vec![0, 1, 2]);
    }

    #[rstest]
    fn width_mismatch_is_reported() {
        let pipeline = EmotionPipeline::new(tokenizer(), Recording::default(), LabelSet::fit(["a"]), 3);
        assert!(matches!(
            pipeline.process("calm"),
            Err(PipelineError::Labels(LabelError::WidthMismatch { expected: 1, actual: 2 }))
        ));
    }
}
