//! Text encoding: normalisation, vocabulary tokenization, padding and
//! word-vector aggregation.

pub mod normalize;
pub mod padding;
pub mod tokenizer;
pub mod word_vectors;

pub use normalize::{
    AnalysedToken, LanguagePipeline, LinguisticNormalizer, NormalizerOptions, RuleBasedPipeline,
};
pub use padding::{PadOptions, Side, pad_sequences, pad_sequences_with};
pub use tokenizer::{Tokenizer, TokenizerError, Vocabulary, VocabularyEntry};
pub use word_vectors::{WordVectorError, WordVectors};
