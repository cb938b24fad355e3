//! Stacked recurrent layers with optional reverse-direction passes.

use candle_core::Tensor;
use candle_nn::{Dropout, GRU, GRUConfig, LSTM, LSTMConfig, RNN, VarBuilder, gru, lstm};

use super::norm::FeatureNorm;
use crate::config::CellKind;

/// A single recurrent cell run over a whole sequence.
#[derive(Debug, Clone)]
enum Cell {
    Lstm(LSTM),
    Gru(GRU),
}

impl Cell {
    fn new(kind: CellKind, input: usize, hidden: usize, vb: VarBuilder) -> candle_core::Result<Self> {
        Ok(match kind {
            CellKind::Lstm => Self::Lstm(lstm(input, hidden, LSTMConfig::default(), vb)?),
            CellKind::Gru => Self::Gru(gru(input, hidden, GRUConfig::default(), vb)?),
        })
    }

    /// Hidden state at every timestep, shaped `N × T × H`.
    ///
    /// The hidden states are stacked here rather than through
    /// `RNN::states_to_tensor`, which concatenates GRU states into
    /// `N × (T·H)`.
    fn run(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let hidden: Vec<Tensor> = match self {
            Self::Lstm(cell) => cell.seq(xs)?.into_iter().map(|state| state.h).collect(),
            Self::Gru(cell) => cell.seq(xs)?.into_iter().map(|state| state.h).collect(),
        };
        Tensor::stack(&hidden, 1)
    }
}

/// Shape of one recurrent layer.
#[derive(Debug, Clone, Copy)]
pub struct RecurrentSpec {
    pub cell: CellKind,
    pub input: usize,
    pub hidden: usize,
    pub bidirectional: bool,
    pub dropout: f32,
    pub normalise: bool,
}

/// Recurrent layer followed by dropout and optional feature normalisation.
///
/// Bidirectional layers run a second cell over the time-reversed input and
/// concatenate its re-reversed states after the forward states, so the
/// output width is twice the hidden width.
#[derive(Debug, Clone)]
pub struct RecurrentLayer {
    forward: Cell,
    backward: Option<Cell>,
    dropout: Dropout,
    norm: Option<FeatureNorm>,
    output_dim: usize,
}

impl RecurrentLayer {
    /// # Errors
    ///
    /// Propagates parameter allocation failures.
    pub fn new(spec: RecurrentSpec, vb: VarBuilder) -> candle_core::Result<Self> {
        let forward = Cell::new(spec.cell, spec.input, spec.hidden, vb.pp("forward"))?;
        let backward = if spec.bidirectional {
            Some(Cell::new(spec.cell, spec.input, spec.hidden, vb.pp("backward"))?)
        } else {
            None
        };
        let output_dim = if spec.bidirectional { spec.hidden * 2 } else { spec.hidden };
        let norm = if spec.normalise {
            Some(FeatureNorm::new(output_dim, vb.pp("norm"))?)
        } else {
            None
        };
        Ok(Self {
            forward,
            backward,
            dropout: Dropout::new(spec.dropout),
            norm,
            output_dim,
        })
    }

    #[must_use]
    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    #[must_use]
    pub fn is_bidirectional(&self) -> bool {
        self.backward.is_some()
    }

    /// Run the layer over `xs` (`N × T × input`), returning `N × T × output_dim`.
    ///
    /// # Errors
    ///
    /// Propagates tensor shape and backend errors.
    pub fn forward(&self, xs: &Tensor, train: bool) -> candle_core::Result<Tensor> {
        let forward = self.forward.run(xs)?;
        let states = match &self.backward {
            Some(cell) => {
                let reversed = reverse_time(xs)?;
                let backward = reverse_time(&cell.run(&reversed)?)?;
                Tensor::cat(&[&forward, &backward], 2)?
            }
            None => forward,
        };
        let states = self.dropout.forward(&states, train)?;
        match &self.norm {
            Some(norm) => norm.forward(&states, train),
            None => Ok(states),
        }
    }
}

/// Reverse the time axis (dimension 1) of an `N × T × D` tensor.
fn reverse_time(xs: &Tensor) -> candle_core::Result<Tensor> {
    let steps = xs.dim(1)?;
    let order: Vec<u32> = (0..steps)
        .rev()
        .map(|step| u32::try_from(step).map_err(candle_core::Error::wrap))
        .collect::<candle_core::Result<_>>()?;
    let index = Tensor::new(order.as_slice(), xs.device())?;
    xs.index_select(&index, 1)
}
