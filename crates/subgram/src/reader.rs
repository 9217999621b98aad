//! # Tokenizer / Stream Reader
//!
//! Whitespace tokenization only: words are byte runs between separators, and
//! a bare newline is surfaced as the [`EOS`] sentinel so downstream line and
//! sentence boundaries are preserved. No linguistic rules.

use std::io::BufRead;

use rand::Rng;

use crate::errors::{SgResult, SubgramError};
use crate::hashing::fnv1a;
use crate::types::{EOS, EntryKind};
use crate::vocab::Dictionary;

/// Token separator set: space, tab, newline, vertical-tab, form-feed,
/// carriage-return, and NUL.
pub(crate) fn is_separator(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r' | 0)
}

/// Read one token from `reader`.
///
/// Consumes bytes up to the next separator. A bare newline with no pending
/// token is returned as the [`EOS`] sentinel; a newline terminating a token
/// is left unconsumed so the next call yields [`EOS`]. End of stream flushes
/// any pending partial token.
///
/// ## Returns
/// `Ok(Some(token))`, or `Ok(None)` at end of stream with nothing pending.
pub fn read_word<R: BufRead>(reader: &mut R) -> SgResult<Option<String>> {
    let mut word: Vec<u8> = Vec::new();
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(if word.is_empty() {
                None
            } else {
                Some(String::from_utf8_lossy(&word).into_owned())
            });
        }

        let byte = buf[0];
        if is_separator(byte) {
            if word.is_empty() {
                reader.consume(1);
                if byte == b'\n' {
                    return Ok(Some(EOS.to_string()));
                }
                continue;
            }
            if byte != b'\n' {
                reader.consume(1);
            }
            return Ok(Some(String::from_utf8_lossy(&word).into_owned()));
        }

        word.push(byte);
        reader.consume(1);
    }
}

impl Dictionary {
    /// Scan a whole corpus stream, building the vocabulary in one pass.
    ///
    /// Drives repeated [`read_word`] + [`Dictionary::add`], then finalizes:
    /// the configured threshold pass, discard-probability table, and subword
    /// caches. Implicit capacity rethresholds may run along the way.
    ///
    /// ## Returns
    /// `Ok(())`, or [`SubgramError::EmptyVocabulary`] when nothing survives
    /// the final threshold pass.
    pub fn read_from_file<R: BufRead>(
        &mut self,
        reader: &mut R,
    ) -> SgResult<()> {
        while let Some(token) = read_word(reader)? {
            self.add(&token);
            if self.ntokens().is_multiple_of(1_000_000) {
                log::info!("read {}M tokens", self.ntokens() / 1_000_000);
            }
        }

        self.threshold(self.options.min_count, self.options.min_count_label);
        self.init_table_discard();
        self.init_ngrams();

        log::info!(
            "corpus scan complete: {} tokens, {} words, {} labels",
            self.ntokens(),
            self.nwords(),
            self.nlabels(),
        );

        if self.size() == 0 {
            return Err(SubgramError::EmptyVocabulary);
        }
        Ok(())
    }

    /// Read one line, filling word-token and label-id sequences.
    ///
    /// Word tokens expand to their subword ids (unknown words fall back to
    /// hashed n-grams); labels map to word-relative ids counted from the end
    /// of the word block. Word-level n-grams are appended per the configured
    /// order. Reading stops at [`EOS`], end of stream, or the line length
    /// cap.
    ///
    /// ## Returns
    /// The number of tokens consumed.
    pub fn get_line<R: BufRead>(
        &self,
        reader: &mut R,
        words: &mut Vec<usize>,
        labels: &mut Vec<usize>,
    ) -> SgResult<usize> {
        let mut word_hashes: Vec<u32> = Vec::new();
        let mut ntokens = 0usize;

        words.clear();
        labels.clear();

        while let Some(token) = read_word(reader)? {
            let hash = fnv1a(token.as_bytes());
            let id = self.get_id_hashed(&token, hash);
            let kind = match id {
                Some(id) => self.words[id].kind,
                None => self.kind_of(&token),
            };

            ntokens += 1;
            match kind {
                EntryKind::Word => {
                    self.add_subwords(words, &token, id);
                    word_hashes.push(hash);
                }
                EntryKind::Label => {
                    if let Some(label_id) = id.and_then(|id| id.checked_sub(self.nwords())) {
                        labels.push(label_id);
                    }
                }
            }

            if token == EOS || ntokens >= self.options.max_line_len {
                break;
            }
        }

        self.add_word_ngrams(words, &word_hashes, self.options.word_ngrams);
        Ok(ntokens)
    }

    /// Tokenize one already-read line for inference, subsampling known words
    /// with draws from `rng`.
    ///
    /// Unknown tokens are skipped. Accepted word ids are appended to `words`
    /// and their weights accumulated into `weight`, when those sinks are
    /// supplied.
    ///
    /// ## Returns
    /// The number of in-vocabulary tokens seen.
    pub fn convert_line<R: Rng>(
        &self,
        line: &str,
        rng: &mut R,
        mut words: Option<&mut Vec<usize>>,
        mut weight: Option<&mut f32>,
    ) -> usize {
        if let Some(words) = words.as_mut() {
            words.clear();
        }
        if let Some(weight) = weight.as_mut() {
            **weight = 0.0;
        }

        let mut ntokens = 0usize;
        let tokens = line
            .split(|c: char| c.is_ascii() && is_separator(c as u8))
            .filter(|t| !t.is_empty());

        for token in tokens {
            let Some(id) = self.get_id(token) else {
                continue;
            };
            ntokens += 1;

            if self.words[id].kind == EntryKind::Word && !self.discard(id, rng.random::<f32>()) {
                if let Some(words) = words.as_mut() {
                    words.push(id);
                }
                if let Some(weight) = weight.as_mut() {
                    **weight += self.words[id].weight;
                }
            }

            if token == EOS || ntokens >= self.options.max_line_len {
                break;
            }
        }
        ntokens
    }
}
