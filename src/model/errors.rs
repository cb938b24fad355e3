use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors produced while building or running a [`super::SequenceClassifier`].
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("invalid classifier configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to allocate {layer} parameters: {source}")]
    Build {
        layer: String,
        #[source]
        source: candle_core::Error,
    },
    #[error("tensor operation failed during {stage}: {source}")]
    Forward {
        stage: &'static str,
        #[source]
        source: candle_core::Error,
    },
    #[error("sequence {row} has length {actual} but the classifier expects {expected}")]
    SequenceLength {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("token id {token} is outside the embedding table of {vocab_size} rows")]
    TokenOutOfRange { token: u32, vocab_size: usize },
    #[error("hidden states have {actual} timesteps but attention was built for {expected}")]
    TimestepMismatch { expected: usize, actual: usize },
}

/// Errors raised while loading or saving classifier weights.
#[derive(Debug, Error)]
pub enum WeightsError {
    #[error("failed to read weights at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("weights at {path} expected SHA-256 {expected} but found {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
    #[error("failed to load weights from {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: candle_core::Error,
    },
    #[error("failed to save weights to {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: candle_core::Error,
    },
}
