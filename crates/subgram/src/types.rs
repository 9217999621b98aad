//! # Common Types and Constants

use core::fmt;

use crate::errors::{SgResult, SubgramError};

/// Default hard cap on live vocabulary entries, and the default capacity of
/// the open-addressing word table.
///
/// Sized for tens of millions of entries; tests and small corpora should
/// configure a smaller capacity through
/// [`crate::VocabOptions::with_max_vocab_size`].
pub const MAX_VOCAB_SIZE: usize = 30_000_000;

/// Default cap on tokens consumed per line by
/// [`crate::vocab::Dictionary::get_line`].
pub const MAX_LINE_SIZE: usize = 1024;

/// The end-of-line sentinel token.
///
/// A bare newline in the input stream is surfaced as this token so line and
/// sentence boundaries survive tokenization.
pub const EOS: &str = "</s>";

/// Begin-of-word marker prepended before character n-gram extraction.
pub const BOW: &str = "<";

/// End-of-word marker appended before character n-gram extraction.
pub const EOW: &str = ">";

/// Classification of a vocabulary entry.
///
/// The ordering matters: after a threshold pass, `Word` entries sort before
/// `Label` entries so word ids form a dense prefix of the id space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryKind {
    /// A corpus word.
    Word,
    /// A supervised label (a token carrying the configured label prefix).
    Label,
}

impl EntryKind {
    /// The persisted tag byte for this kind.
    pub fn tag(self) -> u8 {
        match self {
            EntryKind::Word => 0,
            EntryKind::Label => 1,
        }
    }

    /// Decode a persisted tag byte.
    ///
    /// ## Arguments
    /// * `tag` - the tag byte read from a dictionary stream.
    ///
    /// ## Returns
    /// The kind, or [`SubgramError::InvalidEntryKind`] for unknown tags.
    pub fn from_tag(tag: u8) -> SgResult<Self> {
        match tag {
            0 => Ok(EntryKind::Word),
            1 => Ok(EntryKind::Label),
            _ => Err(SubgramError::InvalidEntryKind { tag }),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            EntryKind::Word => write!(f, "word"),
            EntryKind::Label => write!(f, "label"),
        }
    }
}

/// One vocabulary record.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The token string, unique across the vocabulary.
    pub word: String,

    /// Accumulated occurrence weight.
    pub weight: f32,

    /// Word or label.
    pub kind: EntryKind,

    /// The entry's own id followed by its hashed n-gram ids.
    ///
    /// Populated lazily by `init_ngrams` once the full vocabulary is known;
    /// empty until then.
    pub subwords: Vec<usize>,
}
