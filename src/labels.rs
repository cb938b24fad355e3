//! Reversible categorical encoding of emotion labels.
//!
//! A [`LabelSet`] is the deduplicated, lexically sorted class list. Its order
//! is the only mapping between class names and one-hot or enumerated
//! positions, so encoders and decoders must share the same set.

use thiserror::Error;
use tracing::debug;

/// Errors returned by [`LabelSet`] encoders and decoders.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LabelError {
    /// The label is not part of the frozen class list.
    #[error("label `{label}` is not one of the known classes")]
    UnknownLabel { label: String },
    /// An enumerated value does not address a class.
    #[error("class index {index} is out of range for {classes} classes")]
    IndexOutOfRange { index: usize, classes: usize },
    /// A one-hot or probability row has the wrong number of columns.
    #[error("row has {actual} columns but {expected} classes are known")]
    WidthMismatch { expected: usize, actual: usize },
    /// A row has no columns to take the maximum of.
    #[error("cannot decode an empty row")]
    EmptyRow,
}

/// Sorted, immutable class list.
///
/// # Examples
///
/// ```
/// use emotion_rnn::labels::LabelSet;
///
/// let classes = LabelSet::fit(["b", "a", "c", "b"]);
/// let encoded = classes.enumerate_encode(["b", "a"]).unwrap();
/// assert_eq!(encoded, vec![1, 0]);
/// assert_eq!(classes.enumerate_decode(&encoded).unwrap(), vec!["b", "a"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    classes: Vec<String>,
}

impl LabelSet {
    /// Deduplicate and sort `labels`.
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classes: Vec<String> = labels.into_iter().map(|l| l.as_ref().to_owned()).collect();
        classes.sort();
        classes.dedup();
        debug!(classes = classes.len(), "fitted label set");
        Self { classes }
    }

    /// The fitted class list, in sorted order.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Position of `label` in the sorted class list.
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::UnknownLabel`] if `label` is not a class.
    pub fn position(&self, label: &str) -> Result<usize, LabelError> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .map_err(|_| LabelError::UnknownLabel {
                label: label.to_owned(),
            })
    }

    /// Class name at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::IndexOutOfRange`] if `index` is not a position.
    pub fn label(&self, index: usize) -> Result<&str, LabelError> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or(LabelError::IndexOutOfRange {
                index,
                classes: self.classes.len(),
            })
    }

    /// One unit row per label.
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::UnknownLabel`] for the first label that is not a
    /// class.
    pub fn one_hot_encode<I, S>(&self, labels: I) -> Result<Vec<Vec<f32>>, LabelError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let positions = self.enumerate_encode(labels)?;
        self.enumerate_to_one_hot(&positions)
    }

    /// Class at the arg-max of each row; ties resolve to the lowest index.
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::WidthMismatch`] when a row is not as wide as the
    /// class list.
    pub fn one_hot_decode<R: AsRef<[f32]>>(&self, rows: &[R]) -> Result<Vec<String>, LabelError> {
        rows.iter()
            .map(|row| self.interpret(row.as_ref()).map(str::to_owned))
            .collect()
    }

    /// Class predicted by a single probability row.
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::WidthMismatch`] when `row` is not as wide as the
    /// class list.
    pub fn interpret(&self, row: &[f32]) -> Result<&str, LabelError> {
        if row.len() != self.classes.len() {
            return Err(LabelError::WidthMismatch {
                expected: self.classes.len(),
                actual: row.len(),
            });
        }
        self.label(argmax(row)?)
    }

    /// Integer position of each label.
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::UnknownLabel`] for the first label that is not a
    /// class.
    pub fn enumerate_encode<I, S>(&self, labels: I) -> Result<Vec<usize>, LabelError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        labels
            .into_iter()
            .map(|label| self.position(label.as_ref()))
            .collect()
    }

    /// Class name of each integer position.
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::IndexOutOfRange`] for positions past the end of
    /// the class list.
    pub fn enumerate_decode(&self, encoded: &[usize]) -> Result<Vec<String>, LabelError> {
        encoded
            .iter()
            .map(|&index| self.label(index).map(str::to_owned))
            .collect()
    }

    /// Unit rows as wide as this class list.
    ///
    /// # Errors
    ///
    /// See [`enumerate_to_one_hot`].
    pub fn enumerate_to_one_hot(&self, encoded: &[usize]) -> Result<Vec<Vec<f32>>, LabelError> {
        enumerate_to_one_hot(encoded, self.classes.len())
    }
}

/// Arg-max of every row.
///
/// # Errors
///
/// Returns [`LabelError::EmptyRow`] for rows without columns.
pub fn one_hot_to_enumerate<R: AsRef<[f32]>>(rows: &[R]) -> Result<Vec<usize>, LabelError> {
    rows.iter().map(|row| argmax(row.as_ref())).collect()
}

/// Expand integer positions to unit rows of width `class_count`.
///
/// # Errors
///
/// Returns [`LabelError::IndexOutOfRange`] when a position is not below
/// `class_count`.
pub fn enumerate_to_one_hot(encoded: &[usize], class_count: usize) -> Result<Vec<Vec<f32>>, LabelError> {
    encoded
        .iter()
        .map(|&index| {
            if index >= class_count {
                return Err(LabelError::IndexOutOfRange {
                    index,
                    classes: class_count,
                });
            }
            let mut row = vec![0.0; class_count];
            row[index] = 1.0;
            Ok(row)
        })
        .collect()
}

/// Index of the first maximum of `row`, ignoring NaN scores.
///
/// A row holding only NaN decodes to its first column.
fn argmax(row: &[f32]) -> Result<usize, LabelError> {
    if row.is_empty() {
        return Err(LabelError::EmptyRow);
    }
    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in row.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((index, value)),
        }
    }
    Ok(best.map_or(0, |(index, _)| index))
}
