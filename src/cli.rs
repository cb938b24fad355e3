//! CLI argument types and layered configuration for the `emorc` binary.
//! Loads from CLI args, environment (prefix `EMORC_`), and optional config
//! files.

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use ortho_config::OrthoError;
use serde::Deserialize;
use std::path::PathBuf;

use crate::config::{ArchitecturePreset, ConfigError};
use crate::emotions::{MAX_TEXT_LEN, MAX_WORDS};
use crate::model::WeightsArtefact;

/// Command-line arguments for the `emorc` binary.
///
/// Configuration values are loaded from command line arguments, environment
/// variables (prefixed with `EMORC_`), and an optional configuration file.
/// Unset options fall back to the reference architecture and sizes.
///
/// # Examples
///
/// Parse flags directly:
/// ```
/// use emotion_rnn::cli::EmorcArgs;
/// use ortho_config::OrthoConfig;
///
/// let args = EmorcArgs::load_from_iter(["emorc", "--dry-run=true", "--preset", "bidirectional_gru"])
///     .expect("load args from CLI iterator");
/// assert!(args.dry_run);
/// assert_eq!(args.preset().unwrap().name(), "bidirectional_gru");
/// ```
///
/// Load from a configuration file:
/// ```
/// use emotion_rnn::cli::EmorcArgs;
/// use ortho_config::OrthoConfig;
/// use std::io::Write;
/// use tempfile::NamedTempFile;
///
/// let mut file = NamedTempFile::new().expect("create temp file");
/// writeln!(file, "max_length = 12").expect("write config");
/// let path = file.path().to_str().expect("path str");
/// let args = EmorcArgs::load_from_iter(["emorc", "--config-path", path])
///     .expect("load args from config path");
/// assert_eq!(args.max_length(), 12);
/// ```
#[derive(Debug, Deserialize, ortho_config::OrthoConfig)]
#[ortho_config(prefix = "EMORC")]
pub struct EmorcArgs {
    /// Validate the configuration and exit without building a model.
    #[ortho_config(default = false)]
    #[serde(default)]
    pub dry_run: bool,

    /// Print the evaluation report as JSON instead of text.
    #[ortho_config(default = false)]
    #[serde(default)]
    pub json: bool,

    /// Reference architecture, e.g. `bidirectional_lstm_attention`.
    #[serde(default)]
    pub preset: Option<String>,

    /// Vocabulary cap `V`.
    #[serde(default)]
    pub max_words: Option<usize>,

    /// Padded sequence length `L`.
    #[serde(default)]
    pub max_length: Option<usize>,

    /// Text file with one training sentence per line used to fit the
    /// tokenizer.
    #[serde(default)]
    pub corpus: Option<PathBuf>,

    /// Safetensors weights for the chosen architecture.
    #[serde(default)]
    pub weights: Option<PathBuf>,

    /// Expected SHA-256 of `weights`.
    #[serde(default)]
    pub weights_sha256: Option<String>,

    /// Optional path to a configuration file.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl EmorcArgs {
    /// Selected architecture, defaulting to the unidirectional LSTM.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownPreset`] for unrecognised names.
    pub fn preset(&self) -> Result<ArchitecturePreset, ConfigError> {
        self.preset
            .as_deref()
            .map_or(Ok(ArchitecturePreset::UnidirectionalLstm), str::parse)
    }

    #[must_use]
    pub fn max_words(&self) -> usize {
        self.max_words.unwrap_or(MAX_WORDS)
    }

    #[must_use]
    pub fn max_length(&self) -> usize {
        self.max_length.unwrap_or(MAX_TEXT_LEN)
    }

    /// Weights to load, pinned to the configured digest when one is given.
    #[must_use]
    pub fn weights_artefact(&self) -> Option<WeightsArtefact> {
        self.weights.as_ref().map(|path| WeightsArtefact {
            path: path.clone(),
            sha256: self.weights_sha256.clone(),
        })
    }

    /// Load configuration solely from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an [`OrthoError`] if any variable cannot be parsed.
    pub fn load_from_env() -> Result<Self, OrthoError> {
        Figment::new()
            .merge(Env::prefixed("EMORC_"))
            .extract()
            .map_err(Into::into)
    }

    /// Load configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an [`OrthoError`] if the file cannot be read or parsed.
    pub fn load_from_config(path: &str) -> Result<Self, OrthoError> {
        Figment::new()
            .merge(Toml::file(path))
            .extract()
            .map_err(Into::into)
    }

    /// Load configuration from environment variables and a file path.
    ///
    /// # Errors
    ///
    /// Returns an [`OrthoError`] if either source contains invalid values.
    pub fn load_from_env_and_config(path: &str) -> Result<Self, OrthoError> {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("EMORC_"))
            .extract()
            .map_err(Into::into)
    }
}
