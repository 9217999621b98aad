//! # Dictionary Configuration
//!
//! [`VocabOptions`] is read-only for the dictionary's lifetime: it is
//! validated once at construction and shared by the tokenizer, the subword
//! engine, and the pruning logic. Invalid combinations are fatal up front
//! rather than surfacing later as cryptic n-gram failures.

use crate::errors::{SgResult, SubgramError};
use crate::types::{MAX_LINE_SIZE, MAX_VOCAB_SIZE};

/// Configuration consumed by [`crate::Dictionary`].
#[derive(Debug, Clone, PartialEq)]
pub struct VocabOptions {
    /// Minimum occurrence weight for a word to survive the final threshold
    /// pass.
    pub min_count: u64,

    /// Minimum occurrence weight for a label to survive the final threshold
    /// pass.
    pub min_count_label: u64,

    /// Subsampling threshold `t` for discard probabilities.
    pub sampling_threshold: f64,

    /// Shortest character n-gram length; `maxn == 0` disables subwords.
    pub minn: usize,

    /// Longest character n-gram length.
    pub maxn: usize,

    /// Number of hashed n-gram buckets.
    pub bucket: usize,

    /// Prefix marking a token as a supervised label.
    pub label_prefix: String,

    /// Word-level n-gram order for [`crate::Dictionary::get_line`];
    /// 1 means unigrams only.
    pub word_ngrams: usize,

    /// Maximum tokens consumed per line.
    pub max_line_len: usize,

    /// Capacity bound of the vocabulary and its open-addressing table.
    pub max_vocab_size: usize,
}

impl Default for VocabOptions {
    fn default() -> Self {
        Self {
            min_count: 5,
            min_count_label: 0,
            sampling_threshold: 1e-4,
            minn: 3,
            maxn: 6,
            bucket: 2_000_000,
            label_prefix: "__label__".to_string(),
            word_ngrams: 1,
            max_line_len: MAX_LINE_SIZE,
            max_vocab_size: MAX_VOCAB_SIZE,
        }
    }
}

impl VocabOptions {
    /// Sets the minimum word and label counts.
    pub fn with_min_count(
        self,
        min_count: u64,
        min_count_label: u64,
    ) -> Self {
        Self {
            min_count,
            min_count_label,
            ..self
        }
    }

    /// Sets the subsampling threshold `t`.
    pub fn with_sampling_threshold(
        self,
        sampling_threshold: f64,
    ) -> Self {
        Self {
            sampling_threshold,
            ..self
        }
    }

    /// Sets the character n-gram length bounds; `maxn == 0` disables
    /// subwords entirely.
    pub fn with_subword_range(
        self,
        minn: usize,
        maxn: usize,
    ) -> Self {
        Self { minn, maxn, ..self }
    }

    /// Sets the hashed n-gram bucket count.
    pub fn with_bucket(
        self,
        bucket: usize,
    ) -> Self {
        Self { bucket, ..self }
    }

    /// Sets the label prefix.
    pub fn with_label_prefix<S: Into<String>>(
        self,
        label_prefix: S,
    ) -> Self {
        Self {
            label_prefix: label_prefix.into(),
            ..self
        }
    }

    /// Sets the word-level n-gram order.
    pub fn with_word_ngrams(
        self,
        word_ngrams: usize,
    ) -> Self {
        Self {
            word_ngrams,
            ..self
        }
    }

    /// Sets the vocabulary capacity bound.
    pub fn with_max_vocab_size(
        self,
        max_vocab_size: usize,
    ) -> Self {
        Self {
            max_vocab_size,
            ..self
        }
    }

    /// Checks the option set for combinations that cannot be executed.
    ///
    /// ## Returns
    /// `Ok(())`, or [`SubgramError::InvalidConfig`] naming the offending
    /// field.
    pub fn validate(&self) -> SgResult<()> {
        fn invalid<T>(reason: impl Into<String>) -> SgResult<T> {
            Err(SubgramError::InvalidConfig {
                reason: reason.into(),
            })
        }

        if self.max_vocab_size == 0 {
            return invalid("max_vocab_size must be >= 1");
        }
        if self.maxn > 0 && self.minn == 0 {
            return invalid("minn must be >= 1 when subwords are enabled");
        }
        if self.maxn > 0 && self.minn > self.maxn {
            return invalid(format!(
                "minn ({}) must not exceed maxn ({})",
                self.minn, self.maxn
            ));
        }
        if (self.maxn > 0 || self.word_ngrams > 1) && self.bucket == 0 {
            return invalid("bucket must be >= 1 when hashed n-grams are enabled");
        }
        if !self.sampling_threshold.is_finite() || self.sampling_threshold < 0.0 {
            return invalid(format!(
                "sampling_threshold ({}) must be finite and non-negative",
                self.sampling_threshold
            ));
        }
        if self.label_prefix.is_empty() {
            return invalid("label_prefix must be non-empty");
        }
        if self.word_ngrams == 0 {
            return invalid("word_ngrams must be >= 1");
        }
        if self.max_line_len == 0 {
            return invalid("max_line_len must be >= 1");
        }
        Ok(())
    }
}
