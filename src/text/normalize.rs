//! Linguistic normalisation ahead of tokenization.
//!
//! A [`LanguagePipeline`] segments text and annotates every token with its
//! lemma and stop-word/punctuation flags. [`LinguisticNormalizer`] owns a
//! handle to a pipeline that is loaded once and shared, and applies the
//! configured lowercase, filter and lemma steps.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A token annotated by a [`LanguagePipeline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysedToken {
    /// Surface form as it appears in the text.
    pub text: String,
    /// Base form, e.g. `feel` for `feeling`.
    pub lemma: String,
    pub is_stop: bool,
    pub is_punct: bool,
}

/// Sentence segmentation and token annotation.
///
/// Implementations must be deterministic for a given input.
pub trait LanguagePipeline: Send + Sync {
    /// Segment `text` into annotated tokens, in order.
    fn analyse(&self, text: &str) -> Vec<AnalysedToken>;
}

/// Independently toggled normalisation steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizerOptions {
    pub lowercase: bool,
    /// Drop stop words and punctuation tokens.
    pub drop_stop_and_punct: bool,
    /// Replace each token with its lemma.
    pub lemmatize: bool,
}

impl NormalizerOptions {
    /// Lowercased tokens without stop words or punctuation.
    #[must_use]
    pub fn filter_tokens() -> Self {
        Self {
            lowercase: true,
            drop_stop_and_punct: true,
            lemmatize: false,
        }
    }

    /// Every token replaced by its lemma.
    #[must_use]
    pub fn extract_lemma() -> Self {
        Self {
            lowercase: false,
            drop_stop_and_punct: false,
            lemmatize: true,
        }
    }

    /// Lemmas of the tokens that are neither stop words nor punctuation.
    #[must_use]
    pub fn filter_and_extract_lemma() -> Self {
        Self {
            lowercase: false,
            drop_stop_and_punct: true,
            lemmatize: true,
        }
    }
}

/// Applies [`NormalizerOptions`] on top of a shared [`LanguagePipeline`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use emotion_rnn::text::{LinguisticNormalizer, NormalizerOptions, RuleBasedPipeline};
///
/// let normalizer = LinguisticNormalizer::new(
///     Arc::new(RuleBasedPipeline),
///     NormalizerOptions::filter_and_extract_lemma(),
/// );
/// assert_eq!(normalizer.joined("I was feeling exhausted!"), "feel exhaust");
/// ```
#[derive(Clone)]
pub struct LinguisticNormalizer {
    pipeline: Arc<dyn LanguagePipeline>,
    options: NormalizerOptions,
}

impl std::fmt::Debug for LinguisticNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinguisticNormalizer")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl LinguisticNormalizer {
    #[must_use]
    pub fn new(pipeline: Arc<dyn LanguagePipeline>, options: NormalizerOptions) -> Self {
        Self { pipeline, options }
    }

    #[must_use]
    pub fn options(&self) -> NormalizerOptions {
        self.options
    }

    /// Normalised tokens of `text`, in order.
    #[must_use]
    pub fn tokens(&self, text: &str) -> Vec<String> {
        self.pipeline
            .analyse(text)
            .into_iter()
            .filter(|token| !(self.options.drop_stop_and_punct && (token.is_stop || token.is_punct)))
            .map(|token| {
                let form = if self.options.lemmatize {
                    token.lemma
                } else {
                    token.text
                };
                if self.options.lowercase {
                    form.to_lowercase()
                } else {
                    form
                }
            })
            .collect()
    }

    /// Normalised tokens of `text` joined with single spaces.
    #[must_use]
    pub fn joined(&self, text: &str) -> String {
        self.tokens(text).join(" ")
    }
}

/// Lightweight English pipeline: regex segmentation, a fixed stop-word list
/// and suffix-stripping lemmas.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedPipeline;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::expect_used, reason = "pattern is constant and valid")]
    Regex::new(r"[\p{L}\p{N}]+(?:['’][\p{L}\p{N}]+)*|[^\s\p{L}\p{N}]")
        .expect("valid regex")
});

impl LanguagePipeline for RuleBasedPipeline {
    fn analyse(&self, text: &str) -> Vec<AnalysedToken> {
        TOKEN_RE
            .find_iter(text)
            .map(|m| {
                let surface = m.as_str();
                let lower = surface.to_lowercase();
                AnalysedToken {
                    text: surface.to_owned(),
                    lemma: lemmatise(&lower),
                    is_stop: STOP_WORDS.contains(&lower.as_str()),
                    is_punct: !surface.chars().any(char::is_alphanumeric),
                }
            })
            .collect()
    }
}

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("am", "be"),
    ("are", "be"),
    ("is", "be"),
    ("was", "be"),
    ("were", "be"),
    ("been", "be"),
    ("has", "have"),
    ("had", "have"),
    ("does", "do"),
    ("did", "do"),
    ("felt", "feel"),
    ("went", "go"),
    ("gone", "go"),
    ("made", "make"),
    ("knew", "know"),
    ("came", "come"),
    ("gave", "give"),
    ("took", "take"),
    ("taken", "take"),
    ("sat", "sit"),
    ("children", "child"),
    ("people", "person"),
    ("men", "man"),
    ("women", "woman"),
];

const SUFFIX_EXCEPTIONS: &[&str] = &[
    "this", "his", "its", "us", "thus", "always", "perhaps", "news", "yes", "during", "nothing",
    "something", "anything", "everything", "morning", "evening", "indeed", "need", "bed", "red",
];

/// Reduce a lowercase word to an approximate lemma.
fn lemmatise(word: &str) -> String {
    if let Some((_, lemma)) = IRREGULAR.iter().find(|(form, _)| *form == word) {
        return (*lemma).to_owned();
    }
    if SUFFIX_EXCEPTIONS.contains(&word) || !word.chars().all(char::is_alphabetic) {
        return word.to_owned();
    }
    let len = word.chars().count();
    if len > 4 && word.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }
    if len > 5 && word.ends_with("ing") {
        return undouble(&word[..word.len() - 3]);
    }
    if len > 4 && word.ends_with("ed") && !word.ends_with("eed") {
        return undouble(&word[..word.len() - 2]);
    }
    if word.ends_with("sses") {
        return word[..word.len() - 2].to_owned();
    }
    if len > 3 && word.ends_with('s') && !word.ends_with("ss") && !word.ends_with("us") && !word.ends_with("is") {
        return word[..word.len() - 1].to_owned();
    }
    word.to_owned()
}

/// Collapse a trailing doubled consonant left behind by suffix stripping
/// (`stopp` → `stop`), keeping `ll`, `ss` and `ff` endings intact.
fn undouble(stem: &str) -> String {
    let mut chars = stem.chars().rev();
    match (chars.next(), chars.next()) {
        (Some(last), Some(prev))
            if last == prev && !"aeioulsf".contains(last) && last.is_alphabetic() =>
        {
            stem[..stem.len() - last.len_utf8()].to_owned()
        }
        _ => stem.to_owned(),
    }
}
