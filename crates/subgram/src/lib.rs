//! # `subgram` Subword Vocabulary Core
//!
//! `subgram` is the vocabulary/dictionary subsystem of a word-embedding and
//! text-classification toolkit. It turns raw whitespace-delimited text into
//! stable integer token ids, derives hashed character n-gram ("subword") ids
//! for out-of-vocabulary and morphologically related words, and maintains the
//! frequency statistics a downstream training loop needs.
//!
//! See:
//! * [`vocab::Dictionary`] for the vocabulary store and query surface.
//! * [`reader`] to scan a corpus stream into a vocabulary.
//! * [`subwords`] for character n-gram enumeration and bucket hashing.
//! * [`io`] for the binary persistence format.
//!
//! The intended usage pattern is "build fully, then share read-only":
//! all mutating calls ([`vocab::Dictionary::add`],
//! [`vocab::Dictionary::threshold`], [`vocab::Dictionary::prune`],
//! [`vocab::Dictionary::load`]) must complete before the dictionary is
//! handed to concurrent readers. Worker threads each hold their own random
//! stream for subsample draws; none of them mutate the dictionary.
//!
//! ```rust
//! use std::io::Cursor;
//! use subgram::{Dictionary, VocabOptions};
//!
//! let options = VocabOptions::default()
//!     .with_max_vocab_size(1 << 16)
//!     .with_min_count(1, 1);
//!
//! let mut dict = Dictionary::new(options)?;
//! let corpus = "the cat sat on the mat\nthe dog sat\n";
//! dict.read_from_file(&mut Cursor::new(corpus))?;
//!
//! let id = dict.get_id("cat").unwrap();
//! assert_eq!(dict.get_word(id), Some("cat"));
//! # Ok::<(), subgram::SubgramError>(())
//! ```
#![warn(missing_docs, unused)]

pub mod errors;
pub mod hashing;
pub mod io;
pub mod options;
pub mod reader;
pub mod subwords;
pub mod types;
pub mod vocab;

#[doc(inline)]
pub use errors::{SgResult, SubgramError};
#[doc(inline)]
pub use options::VocabOptions;
#[doc(inline)]
pub use types::{Entry, EntryKind};
#[doc(inline)]
pub use vocab::Dictionary;
