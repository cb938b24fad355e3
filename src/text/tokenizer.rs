//! Frequency-ranked vocabulary and the tokenizer built around it.
//!
//! The vocabulary is an explicit bidirectional table: a forward map from
//! token to index and an ordered entry list whose position is the index
//! minus one. Index `0` is reserved for padding and unknown tokens.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::config::{OutOfVocabulary, TokenizerConfig};
use crate::text::padding::pad_sequences;

/// Errors returned by [`Tokenizer`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenizerError {
    /// Encoding or decoding was attempted before [`Tokenizer::fit`].
    #[error("tokenizer used before fit")]
    NotFitted,
    /// A sequence contained a non-zero index with no vocabulary entry.
    #[error("index {index} is not part of the vocabulary")]
    UnknownIndex { index: u32 },
}

/// One fitted vocabulary token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyEntry {
    pub token: String,
    /// Occurrences across the fit corpus.
    pub count: usize,
    /// Position of the first occurrence among all corpus tokens.
    pub first_seen: usize,
}

/// Frozen token ↔ index table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    forward: HashMap<String, u32>,
    entries: Vec<VocabularyEntry>,
}

impl Vocabulary {
    /// Rank tokens by descending frequency, breaking ties by first
    /// occurrence, and keep the `max_words` most frequent.
    pub fn from_tokens<I, S>(tokens: I, max_words: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut ranked: Vec<VocabularyEntry> = Vec::new();
        for (seen, token) in tokens.into_iter().enumerate() {
            let token = token.as_ref();
            if let Some(&slot) = positions.get(token) {
                ranked[slot].count += 1;
            } else {
                positions.insert(token.to_owned(), ranked.len());
                ranked.push(VocabularyEntry {
                    token: token.to_owned(),
                    count: 1,
                    first_seen: seen,
                });
            }
        }
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then(a.first_seen.cmp(&b.first_seen)));
        ranked.truncate(max_words);

        let mut forward = HashMap::with_capacity(ranked.len());
        for (rank, entry) in ranked.iter().enumerate() {
            forward.insert(entry.token.clone(), index_for_rank(rank));
        }
        Self {
            forward,
            entries: ranked,
        }
    }

    /// Index of `token`, if it is part of the vocabulary.
    #[must_use]
    pub fn index_of(&self, token: &str) -> Option<u32> {
        self.forward.get(token).copied()
    }

    /// Token stored at `index`; `0` never resolves.
    #[must_use]
    pub fn token(&self, index: u32) -> Option<&str> {
        let position = usize::try_from(index).ok()?.checked_sub(1)?;
        self.entries.get(position).map(|entry| entry.token.as_str())
    }

    /// Entries in index order (entry `i` has index `i + 1`).
    #[must_use]
    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct ids an encoded sequence may contain, including the
    /// reserved `0`. This is the embedding-table size a classifier needs.
    #[must_use]
    pub fn index_space(&self) -> usize {
        self.entries.len() + 1
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "vocabulary ranks are bounded by max_words"
)]
fn index_for_rank(rank: usize) -> u32 {
    (rank + 1) as u32
}

/// Vocabulary tokenizer: splits text, maps tokens to indices and back.
///
/// # Examples
///
/// ```
/// use emotion_rnn::config::TokenizerConfig;
/// use emotion_rnn::text::Tokenizer;
///
/// let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
/// tokenizer.fit(["the cat sat", "the dog"]);
/// let encoded = tokenizer.encode(["the cat ran"]).unwrap();
/// assert_eq!(encoded, vec![vec![1, 2, 0]]);
/// assert_eq!(tokenizer.decode(&encoded).unwrap(), vec!["the cat".to_owned()]);
/// ```
#[derive(Debug, Clone)]
pub struct Tokenizer {
    config: TokenizerConfig,
    vocabulary: Option<Vocabulary>,
}

impl Tokenizer {
    #[must_use]
    pub fn new(config: TokenizerConfig) -> Self {
        Self {
            config,
            vocabulary: None,
        }
    }

    /// Build a tokenizer around an already fitted vocabulary.
    #[must_use]
    pub fn from_vocabulary(config: TokenizerConfig, vocabulary: Vocabulary) -> Self {
        Self {
            config,
            vocabulary: Some(vocabulary),
        }
    }

    #[must_use]
    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Split `text` into tokens: optional lowercasing, every filter
    /// character replaced by the split character, empty pieces dropped.
    #[must_use]
    pub fn split(&self, text: &str) -> Vec<String> {
        let source = if self.config.lowercase {
            text.to_lowercase()
        } else {
            text.to_owned()
        };
        let split = self.config.split;
        let filtered: String = source
            .chars()
            .map(|c| if self.config.filters.contains(c) { split } else { c })
            .collect();
        filtered
            .split(split)
            .filter(|piece| !piece.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Build and freeze the vocabulary from `corpus`, replacing any
    /// previously fitted table.
    pub fn fit<I, S>(&mut self, corpus: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: Vec<String> = corpus
            .into_iter()
            .flat_map(|text| self.split(text.as_ref()))
            .collect();
        let vocabulary = Vocabulary::from_tokens(&tokens, self.config.max_words);
        debug!(
            corpus_tokens = tokens.len(),
            vocabulary = vocabulary.len(),
            "fitted vocabulary"
        );
        self.vocabulary = Some(vocabulary);
    }

    /// The fitted vocabulary.
    ///
    /// # Errors
    ///
    /// Returns [`TokenizerError::NotFitted`] before [`Tokenizer::fit`].
    pub fn vocabulary(&self) -> Result<&Vocabulary, TokenizerError> {
        self.vocabulary.as_ref().ok_or(TokenizerError::NotFitted)
    }

    /// Encode each text into a variable-length index sequence.
    ///
    /// # Errors
    ///
    /// Returns [`TokenizerError::NotFitted`] before [`Tokenizer::fit`].
    pub fn encode<I, S>(&self, texts: I) -> Result<Vec<Vec<u32>>, TokenizerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let vocabulary = self.vocabulary()?;
        Ok(texts
            .into_iter()
            .map(|text| self.encode_one(vocabulary, text.as_ref()))
            .collect())
    }

    fn encode_one(&self, vocabulary: &Vocabulary, text: &str) -> Vec<u32> {
        self.split(text)
            .iter()
            .filter_map(|token| match (vocabulary.index_of(token), self.config.out_of_vocabulary) {
                (Some(index), _) => Some(index),
                (None, OutOfVocabulary::Zero) => Some(0),
                (None, OutOfVocabulary::Drop) => None,
            })
            .collect()
    }

    /// Encode then left-pad/left-truncate every sequence to `length`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenizerError::NotFitted`] before [`Tokenizer::fit`].
    pub fn encode_padded<I, S>(&self, texts: I, length: usize) -> Result<Vec<Vec<u32>>, TokenizerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.encode(texts)
            .map(|sequences| pad_sequences(&sequences, length))
    }

    /// Map a sequence back to its tokens, dropping every `0`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenizerError::NotFitted`] before [`Tokenizer::fit`] and
    /// [`TokenizerError::UnknownIndex`] for non-zero ids outside the
    /// vocabulary.
    pub fn restore(&self, sequence: &[u32]) -> Result<Vec<String>, TokenizerError> {
        let vocabulary = self.vocabulary()?;
        sequence
            .iter()
            .filter(|index| **index != 0)
            .map(|&index| {
                vocabulary
                    .token(index)
                    .map(str::to_owned)
                    .ok_or(TokenizerError::UnknownIndex { index })
            })
            .collect()
    }

    /// Reverse [`Tokenizer::encode`], joining tokens with the split
    /// character. Padding and unknown tokens (`0`) are dropped.
    ///
    /// # Errors
    ///
    /// See [`Tokenizer::restore`].
    pub fn decode<S: AsRef<[u32]>>(&self, sequences: &[S]) -> Result<Vec<String>, TokenizerError> {
        let mut separator = [0_u8; 4];
        let separator: &str = self.config.split.encode_utf8(&mut separator);
        sequences
            .iter()
            .map(|sequence| {
                self.restore(sequence.as_ref())
                    .map(|tokens| tokens.join(separator))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn fitted() -> Tokenizer {
        let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
        tokenizer.fit(["b a c", "a c", "a d"]);
        tokenizer
    }

    #[rstest]
    fn ranks_by_frequency_then_first_seen(fitted: Tokenizer) {
        #[expect(clippy::expect_used, reason = "test should fail loudly")]
        let vocabulary = fitted.vocabulary().expect("fitted");
        let tokens: Vec<&str> = vocabulary.entries().iter().map(|e| e.token.as_str()).collect();
        assert_eq!(tokens, vec!["a", "c", "b", "d"]);
        assert_eq!(vocabulary.index_of("a"), Some(1));
        assert_eq!(vocabulary.index_of("d"), Some(4));
        assert_eq!(vocabulary.token(0), None);
        assert_eq!(vocabulary.token(2), Some("c"));
        assert_eq!(vocabulary.index_space(), 5);
    }

    #[rstest]
    fn caps_vocabulary_at_max_words() {
        let config = TokenizerConfig {
            max_words: 2,
            ..TokenizerConfig::default()
        };
        let mut tokenizer = Tokenizer::new(config);
        tokenizer.fit(["x y y z z z"]);
        #[expect(clippy::expect_used, reason = "test should fail loudly")]
        let vocabulary = tokenizer.vocabulary().expect("fitted");
        assert_eq!(vocabulary.len(), 2);
        assert_eq!(vocabulary.index_of("z"), Some(1));
        assert_eq!(vocabulary.index_of("y"), Some(2));
        assert_eq!(vocabulary.index_of("x"), None);
    }

    #[rstest]
    fn unfitted_tokenizer_refuses_to_encode() {
        let tokenizer = Tokenizer::new(TokenizerConfig::default());
        assert_eq!(tokenizer.encode(["hello"]), Err(TokenizerError::NotFitted));
        assert_eq!(tokenizer.decode(&[vec![1]]), Err(TokenizerError::NotFitted));
    }

    #[rstest]
    fn split_applies_filters_and_lowercase(fitted: Tokenizer) {
        assert_eq!(
            fitted.split("Hello, World! It's (fine)."),
            vec!["hello", "world!", "it's", "fine"]
        );
    }

    #[rstest]
    #[case(OutOfVocabulary::Zero, vec![1, 0, 2])]
    #[case(OutOfVocabulary::Drop, vec![1, 2])]
    fn unknown_tokens_follow_policy(#[case] policy: OutOfVocabulary, #[case] expected: Vec<u32>) {
        let config = TokenizerConfig {
            out_of_vocabulary: policy,
            ..TokenizerConfig::default()
        };
        let mut tokenizer = Tokenizer::new(config);
        tokenizer.fit(["a a b"]);
        assert_eq!(tokenizer.encode(["a zzz b"]), Ok(vec![expected]));
    }

    #[rstest]
    fn decode_drops_padding(fitted: Tokenizer) {
        assert_eq!(
            fitted.decode(&[vec![0, 0, 3, 1, 2]]),
            Ok(vec!["b a c".to_owned()])
        );
    }

    #[rstest]
    fn decode_rejects_unknown_index(fitted: Tokenizer) {
        assert_eq!(
            fitted.decode(&[vec![9]]),
            Err(TokenizerError::UnknownIndex { index: 9 })
        );
    }

    #[rstest]
    fn encode_padded_left_pads(fitted: Tokenizer) {
        assert_eq!(fitted.encode_padded(["d a"], 4), Ok(vec![vec![0, 0, 4, 1]]));
    }
}
