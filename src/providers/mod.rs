//! Provider interfaces for text-to-prediction and text-to-embedding
//! processors.
//!
//! Defines the `TextProcessor` trait, the provider aliases built on it and
//! the end-to-end [`EmotionPipeline`].

mod emotion;

pub use emotion::{EmotionPipeline, PipelineError};

use crate::api::Prediction;

/// Processes text to produce a structured, thread-safe output.
///
/// Emotion predictors and sentence embedders both implement this trait via
/// type aliases.
pub trait TextProcessor {
    /// Structured result returned by the processor.
    ///
    /// Outputs must be `Send + Sync + 'static` so they can be safely shared
    /// across threads and stored in trait objects without borrowing.
    type Output: Send + Sync + 'static;
    /// Error type returned when processing fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Process the supplied text.
    ///
    /// # Errors
    ///
    /// Returns an error if processing fails.
    fn process(&self, input: &str) -> Result<Self::Output, Self::Error>;
}

/// Predicts the emotion expressed by a piece of text.
pub type EmotionPredictor<E> =
    dyn TextProcessor<Output = Prediction, Error = E> + Send + Sync + 'static;

/// Provides sentence embeddings.
pub type SentenceEmbedder<E> =
    dyn TextProcessor<Output = Box<[f32]>, Error = E> + Send + Sync + 'static;
