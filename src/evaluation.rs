//! Smoke-test harness for a fitted tokenizer and trained classifier.
//!
//! The harness runs `encode → pad → predict → decode` over a fixed set of
//! `(sentence, expected label)` pairs and reports each outcome alongside a
//! raw correct count. A wrong prediction is an outcome, never an error; only
//! a broken pipeline (unfitted tokenizer, malformed model output) fails.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::api::SequenceModel;
use crate::labels::{LabelError, LabelSet};
use crate::text::{Tokenizer, TokenizerError, pad_sequences};

/// Structural failures that stop an evaluation run.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),
    #[error(transparent)]
    Labels(#[from] LabelError),
    #[error("model inference failed: {0}")]
    Model(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("model returned {actual} predictions for {expected} examples")]
    MissingPrediction { expected: usize, actual: usize },
}

/// Result of evaluating one example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExampleOutcome {
    pub sentence: String,
    /// Tokens recovered from the full encoded sentence, before truncation.
    pub restored: Vec<String>,
    pub expected: String,
    pub predicted: String,
}

impl ExampleOutcome {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.expected == self.predicted
    }
}

/// Per-example outcomes and the number of correct predictions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvaluationReport {
    pub outcomes: Vec<ExampleOutcome>,
    pub correct: usize,
}

impl EvaluationReport {
    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            writeln!(f, "sentence:  {}", outcome.sentence)?;
            writeln!(f, "restored:  {}", outcome.restored.join(" "))?;
            writeln!(
                f,
                "expected:  {}  predicted: {}  [{}]",
                outcome.expected,
                outcome.predicted,
                if outcome.is_correct() { "ok" } else { "miss" }
            )?;
            writeln!(f)?;
        }
        write!(f, "correct: {}/{}", self.correct, self.total())
    }
}

/// Borrowing harness over a fitted tokenizer, a model and its class list.
///
/// # Examples
///
/// ```
/// use std::convert::Infallible;
/// use emotion_rnn::api::SequenceModel;
/// use emotion_rnn::config::TokenizerConfig;
/// use emotion_rnn::evaluation::EvaluationHarness;
/// use emotion_rnn::labels::LabelSet;
/// use emotion_rnn::text::Tokenizer;
///
/// struct AlwaysFirst;
///
/// impl SequenceModel for AlwaysFirst {
///     type Error = Infallible;
///     fn predict(&self, batch: &[Vec<u32>]) -> Result<Vec<Vec<f32>>, Infallible> {
///         Ok(batch.iter().map(|_| vec![1.0, 0.0]).collect())
///     }
/// }
///
/// let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
/// tokenizer.fit(["calm day", "bad day"]);
/// let classes = LabelSet::fit(["calm", "sad"]);
/// let harness = EvaluationHarness::new(&tokenizer, AlwaysFirst, &classes, 4);
/// let report = harness.run([("calm day", "calm"), ("bad day", "sad")]).unwrap();
/// assert_eq!(report.correct, 1);
/// ```
#[derive(Debug)]
pub struct EvaluationHarness<'a, M> {
    tokenizer: &'a Tokenizer,
    model: M,
    classes: &'a LabelSet,
    max_length: usize,
}

impl<'a, M: SequenceModel> EvaluationHarness<'a, M> {
    #[must_use]
    pub fn new(tokenizer: &'a Tokenizer, model: M, classes: &'a LabelSet, max_length: usize) -> Self {
        Self {
            tokenizer,
            model,
            classes,
            max_length,
        }
    }

    /// Evaluate every `(sentence, expected)` pair in a single batch.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::Tokenizer`] when the tokenizer is not
    /// fitted, [`EvaluationError::Model`] when inference fails, and
    /// [`EvaluationError::Labels`] or [`EvaluationError::MissingPrediction`]
    /// when the model output does not line up with the examples or classes.
    pub fn run<I, S, L>(&self, examples: I) -> Result<EvaluationReport, EvaluationError>
    where
        I: IntoIterator<Item = (S, L)>,
        S: AsRef<str>,
        L: AsRef<str>,
    {
        let examples: Vec<(S, L)> = examples.into_iter().collect();
        let encoded = self
            .tokenizer
            .encode(examples.iter().map(|(sentence, _)| sentence))?;
        let padded = pad_sequences(&encoded, self.max_length);
        let rows = self
            .model
            .predict(&padded)
            .map_err(|err| EvaluationError::Model(Box::new(err)))?;
        if rows.len() != examples.len() {
            return Err(EvaluationError::MissingPrediction {
                expected: examples.len(),
                actual: rows.len(),
            });
        }

        let mut report = EvaluationReport::default();
        for (((sentence, expected), sequence), row) in examples.iter().zip(&encoded).zip(&rows) {
            let outcome = ExampleOutcome {
                sentence: sentence.as_ref().to_owned(),
                restored: self.tokenizer.restore(sequence)?,
                expected: expected.as_ref().to_owned(),
                predicted: self.classes.interpret(row)?.to_owned(),
            };
            info!(
                sentence = %outcome.sentence,
                restored = %outcome.restored.join(" "),
                expected = %outcome.expected,
                predicted = %outcome.predicted,
                "evaluated example"
            );
            if outcome.is_correct() {
                report.correct += 1;
            }
            report.outcomes.push(outcome);
        }
        info!(correct = report.correct, total = report.total(), "evaluation finished");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenizerConfig;
    use rstest::{fixture, rstest};
    use std::convert::Infallible;

    struct Fixed(Vec<f32>);

    impl SequenceModel for Fixed {
        type Error = Infallible;

        fn predict(&self, batch: &[Vec<u32>]) -> Result<Vec<Vec<f32>>, Self::Error> {
            Ok(batch.iter().map(|_| self.0.clone()).collect())
        }
    }

    struct Short;

    impl SequenceModel for Short {
        type Error = Infallible;

        fn predict(&self, _batch: &[Vec<u32>]) -> Result<Vec<Vec<f32>>, Self::Error> {
            Ok(Vec::new())
        }
    }

    #[fixture]
    fn tokenizer() -> Tokenizer {
        let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
        tokenizer.fit(["what a lovely day", "such a gloomy day"]);
        tokenizer
    }

    #[rstest]
    fn unfitted_tokenizer_is_structural() {
        let tokenizer = Tokenizer::new(TokenizerConfig::default());
        let classes = LabelSet::fit(["a"]);
        let harness = EvaluationHarness::new(&tokenizer, Fixed(vec![1.0]), &classes, 3);
        assert!(matches!(
            harness.run([("hi", "a")]),
            Err(EvaluationError::Tokenizer(TokenizerError::NotFitted))
        ));
    }

    #[rstest]
    fn mismatches_are_counted_not_raised(tokenizer: Tokenizer) {
        let classes = LabelSet::fit(["gloomy", "lovely"]);
        let harness = EvaluationHarness::new(&tokenizer, Fixed(vec![0.1, 0.9]), &classes, 6);
        let report = harness
            .run([("What a lovely day!", "lovely"), ("Such a gloomy day", "gloomy")])
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(report.correct, 1);
        assert_eq!(report.total(), 2);
        assert_eq!(report.outcomes[1].predicted, "lovely");
        assert!(!report.outcomes[1].is_correct());
    }

    #[rstest]
    fn restores_known_tokens(tokenizer: Tokenizer) {
        let classes = LabelSet::fit(["x"]);
        let harness = EvaluationHarness::new(&tokenizer, Fixed(vec![1.0]), &classes, 8);
        let report = harness
            .run([("A lovely, gloomy day", "x")])
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(report.outcomes[0].restored, vec!["a", "lovely", "gloomy", "day"]);
    }

    #[rstest]
    fn restores_whole_sentence_past_max_length() {
        let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
        tokenizer.fit(["alpha beta gamma delta"]);
        let classes = LabelSet::fit(["x"]);
        let harness = EvaluationHarness::new(&tokenizer, Fixed(vec![1.0]), &classes, 3);
        let report = harness
            .run([("alpha beta gamma delta", "x")])
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(report.outcomes[0].restored, vec!["alpha", "beta", "gamma", "delta"]);
    }

    #[rstest]
    fn wrong_width_is_structural(tokenizer: Tokenizer) {
        let classes = LabelSet::fit(["a", "b", "c"]);
        let harness = EvaluationHarness::new(&tokenizer, Fixed(vec![1.0]), &classes, 4);
        assert!(matches!(
            harness.run([("day", "a")]),
            Err(EvaluationError::Labels(LabelError::WidthMismatch { expected: 3, actual: 1 }))
        ));
    }

    #[rstest]
    fn missing_rows_are_structural(tokenizer: Tokenizer) {
        let classes = LabelSet::fit(["a"]);
        let harness = EvaluationHarness::new(&tokenizer, Short, &classes, 4);
        assert!(matches!(
            harness.run([("day", "a")]),
            Err(EvaluationError::MissingPrediction { expected: 1, actual: 0 })
        ));
    }

    #[rstest]
    fn report_ends_with_count(tokenizer: Tokenizer) {
        let classes = LabelSet::fit(["a"]);
        let harness = EvaluationHarness::new(&tokenizer, Fixed(vec![1.0]), &classes, 4);
        let report = harness.run([("day", "a")]).unwrap_or_else(|e| panic!("{e}"));
        assert!(report.to_string().ends_with("correct: 1/1"));
    }
}
