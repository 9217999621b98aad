//! # Subword Engine
//!
//! Character n-gram enumeration and bucket hashing. Words are wrapped in the
//! [`BOW`]/[`EOW`] boundary markers, then every UTF-8 character span with a
//! length inside the configured bounds is hashed into the shared bucket
//! range `[nwords, nwords + bucket)`. Ids come out in left-to-right,
//! increasing-length order and are not deduplicated; the trainer consumes
//! the sequence as-is, so the order is part of the contract.

use crate::hashing::fnv1a;
use crate::types::{BOW, EOS, EOW, EntryKind};
use crate::vocab::Dictionary;

/// Visit every character n-gram of `word` wrapped in `bow`/`eow`.
///
/// Spans are visited position by position, left to right, and by increasing
/// length at each position; the full wrapped word is included when its
/// length falls inside `[minn, maxn]`. Nothing is visited when
/// `minn > maxn`, `minn == 0`, or the wrapped word is shorter than `minn`
/// characters.
pub fn for_each_ngram<F>(
    word: &str,
    minn: usize,
    maxn: usize,
    bow: &str,
    eow: &str,
    mut f: F,
) where
    F: FnMut(&str),
{
    if minn == 0 || minn > maxn {
        return;
    }

    let wrapped = format!("{bow}{word}{eow}");
    let mut bounds: Vec<usize> = wrapped.char_indices().map(|(i, _)| i).collect();
    let nchars = bounds.len();
    bounds.push(wrapped.len());
    if nchars < minn {
        return;
    }

    for start in 0..nchars {
        let longest = maxn.min(nchars - start);
        for len in minn..=longest {
            f(&wrapped[bounds[start]..bounds[start + len]]);
        }
    }
}

/// Collect the character n-gram spans of `word` wrapped in `bow`/`eow`.
///
/// See [`for_each_ngram`] for the ordering and emptiness rules.
pub fn ngram_spans(
    word: &str,
    minn: usize,
    maxn: usize,
    bow: &str,
    eow: &str,
) -> Vec<String> {
    let mut spans = Vec::new();
    for_each_ngram(word, minn, maxn, bow, eow, |span| {
        spans.push(span.to_string())
    });
    spans
}

impl Dictionary {
    /// Hash the character n-grams of `word` into the bucket range and append
    /// the resulting ids, honoring pruning redirection.
    pub(crate) fn append_subword_hashes(
        &self,
        word: &str,
        out: &mut Vec<usize>,
    ) {
        let bucket = self.options.bucket;
        for_each_ngram(
            word,
            self.options.minn,
            self.options.maxn,
            BOW,
            EOW,
            |span| {
                self.push_hash(out, fnv1a(span.as_bytes()) as usize % bucket);
            },
        );
    }

    /// Populate every entry's cached subword list.
    ///
    /// Each list starts with the entry's own id; WORD entries other than the
    /// end-of-line sentinel follow with their hashed n-gram ids. Runs after
    /// the vocabulary is finalized, and again after pruning.
    pub fn init_ngrams(&mut self) {
        for id in 0..self.words.len() {
            let mut subwords = vec![id];
            if self.words[id].kind == EntryKind::Word && self.words[id].word != EOS {
                let word = self.words[id].word.clone();
                self.append_subword_hashes(&word, &mut subwords);
            }
            self.words[id].subwords = subwords;
        }
    }

    /// Cached subword ids for entry `id`: the id itself followed by its
    /// n-gram ids.
    pub fn get_subwords(
        &self,
        id: usize,
    ) -> Option<&[usize]> {
        self.words.get(id).map(|e| e.subwords.as_slice())
    }

    /// Subword ids for `word`, whether or not it is in the vocabulary.
    ///
    /// Known words return their cached list. An unknown word falls back to
    /// hashing its raw n-grams into the bucket range; unknown labels and the
    /// end-of-line sentinel yield nothing.
    pub fn subwords_of(
        &self,
        word: &str,
    ) -> Vec<usize> {
        if let Some(id) = self.get_id(word) {
            return self.words[id].subwords.clone();
        }
        let mut out = Vec::new();
        if word != EOS && self.kind_of(word) == EntryKind::Word {
            self.append_subword_hashes(word, &mut out);
        }
        out
    }

    /// Append the representation of one line token: the cached subwords of a
    /// known entry, or the hashed n-grams of an unknown word.
    pub(crate) fn add_subwords(
        &self,
        out: &mut Vec<usize>,
        token: &str,
        id: Option<usize>,
    ) {
        match id {
            Some(id) => out.extend_from_slice(&self.words[id].subwords),
            None => {
                if token != EOS {
                    self.append_subword_hashes(token, out);
                }
            }
        }
    }

    /// Append word-level n-gram ids composed from consecutive token hashes.
    ///
    /// Consecutive hashes combine with a fixed multiplier into the bucket
    /// range, so "the cat" contributes a bigram id distinct from either
    /// word. `order == 1` appends nothing.
    pub(crate) fn add_word_ngrams(
        &self,
        line: &mut Vec<usize>,
        hashes: &[u32],
        order: usize,
    ) {
        for i in 0..hashes.len() {
            let mut h = u64::from(hashes[i]);
            for j in (i + 1)..hashes.len().min(i + order) {
                h = h.wrapping_mul(116_049_371).wrapping_add(u64::from(hashes[j]));
                self.push_hash(line, (h % self.options.bucket as u64) as usize);
            }
        }
    }
}
