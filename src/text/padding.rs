//! Fixing variable-length token sequences to a uniform length.

use serde::{Deserialize, Serialize};

/// End of a sequence that padding or truncation operates on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The front of the sequence (earliest tokens).
    #[default]
    Pre,
    /// The back of the sequence (latest tokens).
    Post,
}

/// Options for [`pad_sequences_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PadOptions {
    /// Target length; `None` pads to the longest input sequence.
    pub length: Option<usize>,
    /// Where fill values are inserted.
    pub padding: Side,
    /// Which end is dropped from sequences longer than the target.
    pub truncating: Side,
    /// Fill value.
    pub value: u32,
}

impl Default for PadOptions {
    fn default() -> Self {
        Self {
            length: None,
            padding: Side::Pre,
            truncating: Side::Pre,
            value: 0,
        }
    }
}

/// Left-pad with `0` and left-truncate every sequence to exactly `length`.
///
/// # Examples
///
/// ```
/// use emotion_rnn::text::pad_sequences;
///
/// let padded = pad_sequences(&[vec![7, 3, 9], vec![1, 2, 3, 4, 5, 6]], 5);
/// assert_eq!(padded, vec![vec![0, 0, 7, 3, 9], vec![2, 3, 4, 5, 6]]);
/// ```
#[must_use]
pub fn pad_sequences<S: AsRef<[u32]>>(sequences: &[S], length: usize) -> Vec<Vec<u32>> {
    pad_sequences_with(
        sequences,
        PadOptions {
            length: Some(length),
            ..PadOptions::default()
        },
    )
}

/// Pad and truncate sequences according to `options`.
#[must_use]
pub fn pad_sequences_with<S: AsRef<[u32]>>(sequences: &[S], options: PadOptions) -> Vec<Vec<u32>> {
    let length = options.length.unwrap_or_else(|| {
        sequences
            .iter()
            .map(|sequence| sequence.as_ref().len())
            .max()
            .unwrap_or(0)
    });
    sequences
        .iter()
        .map(|sequence| fit_row(sequence.as_ref(), length, options))
        .collect()
}

fn fit_row(sequence: &[u32], length: usize, options: PadOptions) -> Vec<u32> {
    let kept = if sequence.len() > length {
        match options.truncating {
            Side::Pre => &sequence[sequence.len() - length..],
            Side::Post => &sequence[..length],
        }
    } else {
        sequence
    };
    let fill = length - kept.len();
    let mut row = Vec::with_capacity(length);
    match options.padding {
        Side::Pre => {
            row.resize(fill, options.value);
            row.extend_from_slice(kept);
        }
        Side::Post => {
            row.extend_from_slice(kept);
            row.resize(length, options.value);
        }
    }
    row
}
