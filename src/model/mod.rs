//! Recurrent sequence classifier on the candle tensor backend.

mod attention;
mod classifier;
mod errors;
mod norm;
mod recurrent;
mod weights;

pub use attention::AttentionPooling;
pub use classifier::SequenceClassifier;
pub use errors::{ClassifierError, WeightsError};
pub use norm::FeatureNorm;
pub use recurrent::{RecurrentLayer, RecurrentSpec};
pub use weights::{WeightsArtefact, compute_sha256, normalise_hex, save_weights};

/// Wrap a backend error with the forward-pass stage it came from.
fn forward_err(stage: &'static str) -> impl Fn(candle_core::Error) -> ClassifierError {
    move |source| ClassifierError::Forward { stage, source }
}
