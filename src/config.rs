//! Configuration records for tokenization and classifier construction.
//!
//! Every record is `serde`-deserialisable so it can be embedded in a TOML
//! file, and exposes a `validate` method that rejects structurally invalid
//! values before any vocabulary is built or tensor allocated.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::emotions::{FILTERS, MAX_WORDS};

/// Errors raised when a configuration record is structurally invalid.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("layers_sizes needs an embedding width and at least one recurrent width, found {actual} entries")]
    TooFewLayers { actual: usize },
    #[error("layer width at position {position} must be greater than 0")]
    ZeroLayerWidth { position: usize },
    #[error("vocab_size must be greater than 0")]
    ZeroVocabulary,
    #[error("max_length must be greater than 0")]
    ZeroSequenceLength,
    #[error("output_size must be greater than 0")]
    ZeroOutputSize,
    #[error("dropout must lie in [0, 1), found {0}")]
    InvalidDropout(f32),
    #[error("max_words must be greater than 0")]
    ZeroMaxWords,
    #[error("unknown architecture preset `{0}`")]
    UnknownPreset(String),
}

/// How the tokenizer treats tokens missing from the fitted vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfVocabulary {
    /// Emit the reserved index `0`.
    #[default]
    Zero,
    /// Skip the token entirely.
    Drop,
}

/// Configuration for [`crate::text::Tokenizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenizerConfig {
    /// Maximum number of distinct tokens kept after fitting; must be greater
    /// than zero.
    pub max_words: usize,
    /// Characters replaced by `split` before tokenising.
    pub filters: String,
    /// Lowercase text before filtering.
    pub lowercase: bool,
    /// Token delimiter.
    pub split: char,
    /// Treatment of unknown tokens during encoding.
    pub out_of_vocabulary: OutOfVocabulary,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            max_words: MAX_WORDS,
            filters: FILTERS.to_owned(),
            lowercase: true,
            split: ' ',
            out_of_vocabulary: OutOfVocabulary::Zero,
        }
    }
}

impl TokenizerConfig {
    /// Ensure the configuration values are within acceptable bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroMaxWords`] if `max_words` is zero.
    #[must_use = "Validation should not be ignored"]
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.max_words == 0 {
            Err(ConfigError::ZeroMaxWords)
        } else {
            Ok(self)
        }
    }
}

/// Whether recurrent layers read the sequence in one or both directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Unidirectional,
    Bidirectional,
}

/// Recurrent cell family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    #[default]
    Lstm,
    Gru,
}

/// How the final recurrent output sequence is reduced to one vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pooling {
    /// Keep only the last timestep.
    #[default]
    LastTimestep,
    /// Learned attention-weighted sum over time.
    Attention,
}

/// Activation applied to the classification head.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputActivation {
    /// Normalised exponential across classes (multi-class).
    #[default]
    Softmax,
    /// Independent logistic per class (multi-label).
    Sigmoid,
}

/// Configuration for [`crate::model::SequenceClassifier`].
///
/// # Examples
///
/// ```
/// use emotion_rnn::config::{CellKind, ClassifierConfig, Direction};
///
/// let config = ClassifierConfig::new(3000, 30, vec![64, 32, 16], 14)
///     .with_direction(Direction::Bidirectional)
///     .with_cell(CellKind::Gru);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Number of rows in the embedding table (largest token id + 1).
    pub vocab_size: usize,
    /// Padded sequence length `L`.
    pub max_length: usize,
    /// Embedding width followed by one width per recurrent layer.
    pub layers_sizes: Vec<usize>,
    /// Number of output classes.
    pub output_size: usize,
    #[serde(default = "default_dropout")]
    pub dropout: f32,
    #[serde(default = "default_true")]
    pub batch_normalization: bool,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub cell: CellKind,
    #[serde(default)]
    pub pooling: Pooling,
    #[serde(default)]
    pub activation: OutputActivation,
}

fn default_dropout() -> f32 {
    0.5
}

fn default_true() -> bool {
    true
}

impl ClassifierConfig {
    /// Create a unidirectional LSTM configuration with last-timestep pooling,
    /// dropout `0.5`, normalisation enabled and a softmax head.
    #[must_use]
    pub fn new(
        vocab_size: usize,
        max_length: usize,
        layers_sizes: Vec<usize>,
        output_size: usize,
    ) -> Self {
        Self {
            vocab_size,
            max_length,
            layers_sizes,
            output_size,
            dropout: default_dropout(),
            batch_normalization: true,
            direction: Direction::default(),
            cell: CellKind::default(),
            pooling: Pooling::default(),
            activation: OutputActivation::default(),
        }
    }

    /// Build the configuration of one of the reference architectures.
    ///
    /// # Examples
    ///
    /// ```
    /// use emotion_rnn::config::{ArchitecturePreset, ClassifierConfig, OutputActivation, Pooling};
    ///
    /// let config = ClassifierConfig::preset(ArchitecturePreset::BidirectionalLstmAttention, 3000, 30, 14);
    /// assert_eq!(config.pooling, Pooling::Attention);
    /// assert_eq!(config.activation, OutputActivation::Sigmoid);
    /// ```
    #[must_use]
    pub fn preset(
        preset: ArchitecturePreset,
        vocab_size: usize,
        max_length: usize,
        output_size: usize,
    ) -> Self {
        let base = Self::new(vocab_size, max_length, vec![64, 32, 16], output_size);
        match preset {
            ArchitecturePreset::UnidirectionalLstm => base,
            ArchitecturePreset::BidirectionalLstm => base.with_direction(Direction::Bidirectional),
            ArchitecturePreset::UnidirectionalGru => base.with_cell(CellKind::Gru),
            ArchitecturePreset::BidirectionalGru => base
                .with_cell(CellKind::Gru)
                .with_direction(Direction::Bidirectional),
            ArchitecturePreset::UnidirectionalLstmAttention => base
                .with_pooling(Pooling::Attention)
                .with_activation(OutputActivation::Sigmoid),
            ArchitecturePreset::BidirectionalLstmAttention => base
                .with_direction(Direction::Bidirectional)
                .with_pooling(Pooling::Attention)
                .with_activation(OutputActivation::Sigmoid),
        }
    }

    #[must_use]
    pub fn with_dropout(mut self, dropout: f32) -> Self {
        self.dropout = dropout;
        self
    }

    #[must_use]
    pub fn with_batch_normalization(mut self, enabled: bool) -> Self {
        self.batch_normalization = enabled;
        self
    }

    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn with_cell(mut self, cell: CellKind) -> Self {
        self.cell = cell;
        self
    }

    #[must_use]
    pub fn with_pooling(mut self, pooling: Pooling) -> Self {
        self.pooling = pooling;
        self
    }

    #[must_use]
    pub fn with_activation(mut self, activation: OutputActivation) -> Self {
        self.activation = activation;
        self
    }

    /// Width of the embedding layer.
    #[must_use]
    pub fn embedding_size(&self) -> usize {
        self.layers_sizes.first().copied().unwrap_or_default()
    }

    /// Widths of the recurrent layers, in stacking order.
    #[must_use]
    pub fn recurrent_sizes(&self) -> &[usize] {
        self.layers_sizes.get(1..).unwrap_or_default()
    }

    /// Ensure the configuration describes a buildable classifier.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TooFewLayers`] when `layers_sizes` has fewer
    /// than two entries, and the matching zero-size or dropout variant for
    /// every other out-of-range field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.layers_sizes.len() < 2 {
            return Err(ConfigError::TooFewLayers {
                actual: self.layers_sizes.len(),
            });
        }
        if let Some(position) = self.layers_sizes.iter().position(|width| *width == 0) {
            return Err(ConfigError::ZeroLayerWidth { position });
        }
        if self.vocab_size == 0 {
            return Err(ConfigError::ZeroVocabulary);
        }
        if self.max_length == 0 {
            return Err(ConfigError::ZeroSequenceLength);
        }
        if self.output_size == 0 {
            return Err(ConfigError::ZeroOutputSize);
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(ConfigError::InvalidDropout(self.dropout));
        }
        Ok(())
    }
}

/// The reference architectures, all with layer sizes `[64, 32, 16]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchitecturePreset {
    UnidirectionalLstm,
    BidirectionalLstm,
    UnidirectionalGru,
    BidirectionalGru,
    UnidirectionalLstmAttention,
    BidirectionalLstmAttention,
}

impl ArchitecturePreset {
    pub const ALL: [Self; 6] = [
        Self::UnidirectionalLstm,
        Self::BidirectionalLstm,
        Self::UnidirectionalGru,
        Self::BidirectionalGru,
        Self::UnidirectionalLstmAttention,
        Self::BidirectionalLstmAttention,
    ];

    /// Snake-case name used in configuration files and on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::UnidirectionalLstm => "unidirectional_lstm",
            Self::BidirectionalLstm => "bidirectional_lstm",
            Self::UnidirectionalGru => "unidirectional_gru",
            Self::BidirectionalGru => "bidirectional_gru",
            Self::UnidirectionalLstmAttention => "unidirectional_lstm_attention",
            Self::BidirectionalLstmAttention => "bidirectional_lstm_attention",
        }
    }
}

impl FromStr for ArchitecturePreset {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalised = value.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|preset| preset.name() == normalised)
            .ok_or_else(|| ConfigError::UnknownPreset(value.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn deserialise_classifier_with_defaults() {
        let json = r#"{"vocab_size":3001,"max_length":30,"layers_sizes":[64,32],"output_size":14,"pooling":"attention"}"#;
        #[expect(clippy::expect_used, reason = "test should fail loudly")]
        let cfg: ClassifierConfig = serde_json::from_str(json).expect("deserialise ClassifierConfig");
        assert_eq!(
            cfg,
            ClassifierConfig::new(3001, 30, vec![64, 32], 14).with_pooling(Pooling::Attention)
        );
    }

    #[rstest]
    fn deserialise_rejects_unknown_fields() {
        let json = r#"{"vocab_size":1,"max_length":1,"layers_sizes":[1,1],"output_size":1,"heads":4}"#;
        let cfg: Result<ClassifierConfig, _> = serde_json::from_str(json);
        assert!(cfg.is_err());
    }

    #[rstest]
    #[case(vec![], 0)]
    #[case(vec![64], 1)]
    fn rejects_missing_recurrent_layer(#[case] layers: Vec<usize>, #[case] actual: usize) {
        let cfg = ClassifierConfig::new(10, 5, layers, 3);
        assert_eq!(cfg.validate(), Err(ConfigError::TooFewLayers { actual }));
    }

    #[rstest]
    #[case(ClassifierConfig::new(10, 5, vec![8, 0], 3), ConfigError::ZeroLayerWidth { position: 1 })]
    #[case(ClassifierConfig::new(0, 5, vec![8, 4], 3), ConfigError::ZeroVocabulary)]
    #[case(ClassifierConfig::new(10, 0, vec![8, 4], 3), ConfigError::ZeroSequenceLength)]
    #[case(ClassifierConfig::new(10, 5, vec![8, 4], 0), ConfigError::ZeroOutputSize)]
    #[case(ClassifierConfig::new(10, 5, vec![8, 4], 3).with_dropout(1.0), ConfigError::InvalidDropout(1.0))]
    fn rejects_out_of_range_fields(#[case] cfg: ClassifierConfig, #[case] expected: ConfigError) {
        assert_eq!(cfg.validate(), Err(expected));
    }

    #[rstest]
    fn splits_embedding_and_recurrent_sizes() {
        let cfg = ClassifierConfig::new(10, 5, vec![64, 32, 16], 3);
        assert_eq!(cfg.embedding_size(), 64);
        assert_eq!(cfg.recurrent_sizes(), &[32, 16]);
    }

    #[rstest]
    #[case("bidirectional_gru", ArchitecturePreset::BidirectionalGru)]
    #[case("Unidirectional-LSTM-Attention", ArchitecturePreset::UnidirectionalLstmAttention)]
    fn parses_preset_names(#[case] name: &str, #[case] expected: ArchitecturePreset) {
        assert_eq!(name.parse::<ArchitecturePreset>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_preset() {
        assert_eq!(
            "transformer".parse::<ArchitecturePreset>(),
            Err(ConfigError::UnknownPreset("transformer".into()))
        );
    }

    #[rstest]
    fn tokenizer_defaults_validate() {
        assert!(TokenizerConfig::default().validate().is_ok());
        let cfg = TokenizerConfig {
            max_words: 0,
            ..TokenizerConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroMaxWords));
    }

    #[rstest]
    fn tokenizer_config_from_partial_json() {
        #[expect(clippy::expect_used, reason = "test should fail loudly")]
        let cfg: TokenizerConfig =
            serde_json::from_str(r#"{"max_words":10,"out_of_vocabulary":"drop"}"#)
                .expect("deserialise TokenizerConfig");
        assert_eq!(cfg.max_words, 10);
        assert_eq!(cfg.out_of_vocabulary, OutOfVocabulary::Drop);
        assert!(cfg.lowercase);
    }
}
