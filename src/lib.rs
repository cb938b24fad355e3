//! Emotion classification for short texts.
//!
//! The crate covers the whole text → emotion path: linguistic
//! normalisation, vocabulary tokenization and padding, reversible label
//! codecs, a configurable recurrent classifier with optional attention
//! pooling, and a smoke-test evaluation harness.

pub mod api;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod emotions;
pub mod evaluation;
pub mod labels;
pub mod model;
pub mod providers;
pub mod text;

pub use api::{Prediction, SequenceModel};
#[cfg(feature = "cli")]
pub use cli::EmorcArgs;
pub use config::{
    ArchitecturePreset, CellKind, ClassifierConfig, ConfigError, Direction, OutOfVocabulary,
    OutputActivation, Pooling, TokenizerConfig,
};
pub use evaluation::{EvaluationError, EvaluationHarness, EvaluationReport, ExampleOutcome};
pub use labels::{LabelError, LabelSet};
pub use model::{ClassifierError, SequenceClassifier, WeightsArtefact, WeightsError};
pub use providers::{EmotionPipeline, EmotionPredictor, SentenceEmbedder, TextProcessor};
pub use text::{Tokenizer, TokenizerError, WordVectors};

pub mod tests;
