//! Embedding → stacked recurrent layers → pooling → dense head.

use candle_core::{D, DType, Device, Tensor};
use candle_nn::{
    Dropout, Embedding, Linear, Module, VarBuilder, VarMap, embedding, linear,
    ops::{sigmoid, softmax},
};
use tracing::debug;

use super::attention::AttentionPooling;
use super::errors::ClassifierError;
use super::forward_err;
use super::recurrent::{RecurrentLayer, RecurrentSpec};
use crate::api::SequenceModel;
use crate::config::{ClassifierConfig, Direction, OutputActivation, Pooling};

/// Recurrent sequence classifier mapping padded token ids to class scores.
///
/// Parameters are drawn from the supplied [`VarBuilder`], so a classifier
/// built over a [`VarMap`] shares its weights with that map for saving,
/// loading and training.
///
/// # Examples
///
/// ```
/// use candle_core::Device;
/// use candle_nn::VarMap;
/// use emotion_rnn::api::SequenceModel;
/// use emotion_rnn::config::ClassifierConfig;
/// use emotion_rnn::model::SequenceClassifier;
///
/// let config = ClassifierConfig::new(10, 4, vec![8, 6, 4], 3);
/// let var_map = VarMap::new();
/// let model = SequenceClassifier::with_var_map(&config, &var_map, &Device::Cpu).unwrap();
/// let scores = model.predict(&[vec![0, 0, 3, 7]]).unwrap();
/// assert_eq!(scores[0].len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct SequenceClassifier {
    config: ClassifierConfig,
    embedding: Embedding,
    layers: Vec<RecurrentLayer>,
    attention: Option<AttentionPooling>,
    pooled_dropout: Dropout,
    head: Linear,
    device: Device,
}

impl SequenceClassifier {
    /// Validate `config` and allocate every layer from `vb`.
    ///
    /// In bidirectional mode with last-timestep pooling the final recurrent
    /// layer runs forward only; with attention pooling every layer is
    /// bidirectional.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::Config`] before touching `vb` when the
    /// configuration is invalid, and [`ClassifierError::Build`] when a
    /// parameter cannot be allocated.
    pub fn new(config: &ClassifierConfig, vb: VarBuilder) -> Result<Self, ClassifierError> {
        config.validate()?;

        let embedding = embedding(config.vocab_size, config.embedding_size(), vb.pp("embedding"))
            .map_err(build_err("embedding"))?;

        let sizes = config.recurrent_sizes();
        let mut layers = Vec::with_capacity(sizes.len());
        let mut input = config.embedding_size();
        for (position, &hidden) in sizes.iter().enumerate() {
            let bidirectional = match (config.direction, config.pooling) {
                (Direction::Unidirectional, _) => false,
                (Direction::Bidirectional, Pooling::Attention) => true,
                (Direction::Bidirectional, Pooling::LastTimestep) => position + 1 < sizes.len(),
            };
            let spec = RecurrentSpec {
                cell: config.cell,
                input,
                hidden,
                bidirectional,
                dropout: config.dropout,
                normalise: config.batch_normalization,
            };
            let name = format!("recurrent_{position}");
            let layer = RecurrentLayer::new(spec, vb.pp(&name)).map_err(build_err(name))?;
            input = layer.output_dim();
            layers.push(layer);
        }

        let attention = match config.pooling {
            Pooling::Attention => Some(AttentionPooling::new(config.max_length, vb.pp("attention"))?),
            Pooling::LastTimestep => None,
        };
        let head = linear(input, config.output_size, vb.pp("head")).map_err(build_err("head"))?;

        debug!(
            layers = layers.len(),
            cell = ?config.cell,
            direction = ?config.direction,
            pooling = ?config.pooling,
            classes = config.output_size,
            "built sequence classifier"
        );
        Ok(Self {
            config: config.clone(),
            embedding,
            layers,
            attention,
            pooled_dropout: Dropout::new(config.dropout),
            head,
            device: vb.device().clone(),
        })
    }

    /// Build a classifier whose parameters live in `var_map`.
    ///
    /// # Errors
    ///
    /// See [`SequenceClassifier::new`].
    pub fn with_var_map(
        config: &ClassifierConfig,
        var_map: &VarMap,
        device: &Device,
    ) -> Result<Self, ClassifierError> {
        Self::new(config, VarBuilder::from_varmap(var_map, DType::F32, device))
    }

    #[must_use]
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    #[must_use]
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Check every row and pack `batch` into an `N × L` id tensor.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::SequenceLength`] for rows that are not
    /// exactly `max_length` long and [`ClassifierError::TokenOutOfRange`] for
    /// ids outside the embedding table.
    pub fn batch_tensor(&self, batch: &[Vec<u32>]) -> Result<Tensor, ClassifierError> {
        let expected = self.config.max_length;
        let mut flat = Vec::with_capacity(batch.len() * expected);
        for (row, ids) in batch.iter().enumerate() {
            if ids.len() != expected {
                return Err(ClassifierError::SequenceLength {
                    row,
                    expected,
                    actual: ids.len(),
                });
            }
            if let Some(&token) = ids
                .iter()
                .find(|&&token| !usize::try_from(token).is_ok_and(|t| t < self.config.vocab_size))
            {
                return Err(ClassifierError::TokenOutOfRange {
                    token,
                    vocab_size: self.config.vocab_size,
                });
            }
            flat.extend_from_slice(ids);
        }
        Tensor::from_vec(flat, (batch.len(), expected), &self.device).map_err(forward_err("input"))
    }

    /// Class scores for an `N × L` id tensor, shaped `N × C`.
    ///
    /// `train` enables dropout.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::Forward`] when a tensor operation fails.
    pub fn forward(&self, ids: &Tensor, train: bool) -> Result<Tensor, ClassifierError> {
        let mut hidden = self.embedding.forward(ids).map_err(forward_err("embedding"))?;
        for layer in &self.layers {
            hidden = layer.forward(&hidden, train).map_err(forward_err("recurrent"))?;
        }
        let pooled = match &self.attention {
            Some(attention) => {
                let pooled = attention.forward(&hidden)?;
                self.pooled_dropout
                    .forward(&pooled, train)
                    .map_err(forward_err("attention dropout"))?
            }
            None => last_timestep(&hidden).map_err(forward_err("pooling"))?,
        };
        let logits = self.head.forward(&pooled).map_err(forward_err("head"))?;
        let scores = match self.config.activation {
            OutputActivation::Softmax => softmax(&logits, D::Minus1),
            OutputActivation::Sigmoid => sigmoid(&logits),
        };
        scores.map_err(forward_err("activation"))
    }
}

fn build_err(layer: impl Into<String>) -> impl FnOnce(candle_core::Error) -> ClassifierError {
    let layer = layer.into();
    move |source| ClassifierError::Build { layer, source }
}

fn last_timestep(hidden: &Tensor) -> candle_core::Result<Tensor> {
    let steps = hidden.dim(1)?;
    hidden.narrow(1, steps - 1, 1)?.squeeze(1)
}

impl SequenceModel for SequenceClassifier {
    type Error = ClassifierError;

    fn predict(&self, batch: &[Vec<u32>]) -> Result<Vec<Vec<f32>>, Self::Error> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        let ids = self.batch_tensor(batch)?;
        self.forward(&ids, false)?
            .to_vec2()
            .map_err(forward_err("output"))
    }
}
