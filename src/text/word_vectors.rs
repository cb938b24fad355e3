//! Sentence vectors from a pretrained word-vector table.
//!
//! A sentence is represented by the arithmetic mean of the vectors of its
//! known tokens. Sentences with no known token map to the exact zero vector.

use std::collections::HashMap;
use std::convert::Infallible;
use std::io::BufRead;

use thiserror::Error;

use crate::providers::TextProcessor;

/// Errors raised while building a [`WordVectors`] table.
#[derive(Debug, Error)]
pub enum WordVectorError {
    #[error("vector for `{token}` has {actual} components but the table expects {expected}")]
    DimensionMismatch {
        token: String,
        expected: usize,
        actual: usize,
    },
    #[error("word-vector table must have a dimension greater than 0")]
    ZeroDimension,
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("failed to read word vectors: {0}")]
    Io(#[from] std::io::Error),
}

/// Token → dense vector lookup table of fixed dimensionality.
///
/// # Examples
///
/// ```
/// use emotion_rnn::text::WordVectors;
///
/// let mut table = WordVectors::new(2).unwrap();
/// table.insert("calm", vec![1.0, 0.0]).unwrap();
/// table.insert("joy", vec![0.0, 1.0]).unwrap();
/// assert_eq!(table.vectorize_sentence("calm joy"), vec![0.5, 0.5]);
/// assert_eq!(table.vectorize_sentence("unknown words"), vec![0.0, 0.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WordVectors {
    dimension: usize,
    table: HashMap<String, Vec<f32>>,
}

impl WordVectors {
    /// Create an empty table.
    ///
    /// # Errors
    ///
    /// Returns [`WordVectorError::ZeroDimension`] if `dimension` is zero.
    pub fn new(dimension: usize) -> Result<Self, WordVectorError> {
        if dimension == 0 {
            return Err(WordVectorError::ZeroDimension);
        }
        Ok(Self {
            dimension,
            table: HashMap::new(),
        })
    }

    /// Parse the word2vec/GloVe text format: one `token v1 v2 ...` entry per
    /// line, optionally preceded by a `count dimension` header.
    ///
    /// A first line of two integers is only a header when the rows after it
    /// have the declared dimension; otherwise it is a one-dimensional entry.
    ///
    /// # Errors
    ///
    /// Returns [`WordVectorError::Parse`] for malformed lines,
    /// [`WordVectorError::DimensionMismatch`] when rows disagree on width, and
    /// [`WordVectorError::Io`] when reading fails.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, WordVectorError> {
        let mut vectors: Option<Self> = None;
        let mut header: Option<HeaderCandidate> = None;
        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            let fields: Vec<&str> = line.split_whitespace().collect();
            let Some((&token, rest)) = fields.split_first() else {
                continue;
            };
            let values = rest
                .iter()
                .map(|field| field.parse::<f32>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| WordVectorError::Parse {
                    line: number + 1,
                    message: err.to_string(),
                })?;
            if number == 0 {
                if let Some(declared) = declared_dimension(token, rest) {
                    header = Some(HeaderCandidate {
                        token: token.to_owned(),
                        values,
                        declared,
                    });
                    continue;
                }
            }
            if let Some(candidate) = header.take() {
                if candidate.declared != values.len() {
                    Self::push(&mut vectors, &candidate.token, candidate.values, 1)?;
                }
            }
            Self::push(&mut vectors, token, values, number + 1)?;
        }
        if let Some(candidate) = header {
            Self::push(&mut vectors, &candidate.token, candidate.values, 1)?;
        }
        vectors.ok_or_else(|| WordVectorError::Parse {
            line: 0,
            message: "no word vectors found".into(),
        })
    }

    /// Insert a parsed row, sizing the table from the first one.
    fn push(
        vectors: &mut Option<Self>,
        token: &str,
        values: Vec<f32>,
        line: usize,
    ) -> Result<(), WordVectorError> {
        if vectors.is_none() {
            let table = Self::new(values.len()).map_err(|_| WordVectorError::Parse {
                line,
                message: format!("no vector components for `{token}`"),
            })?;
            *vectors = Some(table);
        }
        match vectors.as_mut() {
            Some(table) => table.insert(token, values),
            None => Ok(()),
        }
    }

    /// Add or replace the vector for `token`.
    ///
    /// # Errors
    ///
    /// Returns [`WordVectorError::DimensionMismatch`] if `vector` does not
    /// have the table's dimension.
    pub fn insert(&mut self, token: impl Into<String>, vector: Vec<f32>) -> Result<(), WordVectorError> {
        let token = token.into();
        if vector.len() != self.dimension {
            return Err(WordVectorError::DimensionMismatch {
                token,
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        self.table.insert(token, vector);
        Ok(())
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    #[must_use]
    pub fn get(&self, token: &str) -> Option<&[f32]> {
        self.table.get(token).map(Vec::as_slice)
    }

    /// Mean vector of the tokens of `sentence`, split on single spaces.
    #[must_use]
    pub fn vectorize_sentence(&self, sentence: &str) -> Vec<f32> {
        let mut sum = vec![0.0_f32; self.dimension];
        let mut found = 0_usize;
        for vector in sentence.split(' ').filter_map(|word| self.get(word)) {
            for (acc, value) in sum.iter_mut().zip(vector) {
                *acc += value;
            }
            found += 1;
        }
        if found > 0 {
            #[expect(clippy::cast_precision_loss, reason = "token counts fit in f32")]
            let count = found as f32;
            for acc in &mut sum {
                *acc /= count;
            }
        }
        sum
    }

    /// [`WordVectors::vectorize_sentence`] over a batch.
    pub fn vectorize_sentences<I, S>(&self, sentences: I) -> Vec<Vec<f32>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        sentences
            .into_iter()
            .map(|sentence| self.vectorize_sentence(sentence.as_ref()))
            .collect()
    }
}

/// First line held back until the next row shows whether it is a header.
struct HeaderCandidate {
    token: String,
    values: Vec<f32>,
    declared: usize,
}

/// The dimension a `count dimension` line declares, if it has that shape.
fn declared_dimension(token: &str, rest: &[&str]) -> Option<usize> {
    match rest {
        [dimension] if token.parse::<usize>().is_ok() => dimension.parse().ok(),
        _ => None,
    }
}

impl TextProcessor for WordVectors {
    type Output = Box<[f32]>;
    type Error = Infallible;

    fn process(&self, input: &str) -> Result<Self::Output, Self::Error> {
        Ok(self.vectorize_sentence(input).into_boxed_slice())
    }
}
