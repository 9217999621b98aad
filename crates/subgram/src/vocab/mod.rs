//! # Vocabulary Store
//!
//! [`Dictionary`] owns one arena of [`Entry`] records plus a fixed-capacity
//! [`table::SlotTable`] resolving hashed words to entry ids. Ids are assigned
//! at insertion and stay stable until a rebuild ([`Dictionary::threshold`] or
//! [`Dictionary::load`]); pruning redirects n-gram buckets through a remap
//! table instead of deleting entries.
//!
//! Lifecycle: construct empty (or [`Dictionary::load`] from a stream),
//! populate with repeated [`Dictionary::add`] during a corpus scan, finalize
//! with [`Dictionary::threshold`] and the init passes, optionally
//! [`Dictionary::prune`], then treat as read-only.

pub mod table;

use std::collections::HashMap;

use crate::errors::SgResult;
use crate::hashing::fnv1a;
use crate::options::VocabOptions;
use crate::reader::is_separator;
use crate::types::{Entry, EntryKind};
use table::SlotTable;

/// The vocabulary store and query surface.
pub struct Dictionary {
    pub(crate) options: VocabOptions,
    pub(crate) words: Vec<Entry>,
    pub(crate) word2int: SlotTable,
    pub(crate) pdiscard: Vec<f32>,
    pub(crate) nwords: usize,
    pub(crate) nlabels: usize,
    pub(crate) ntokens: u64,
    pub(crate) total_weight: f64,
    pub(crate) pruneidx: HashMap<usize, usize>,
    pub(crate) pruneidx_size: Option<usize>,
    /// Running cutoff for implicit threshold passes; doubles each pass.
    pub(crate) min_threshold: u64,
}

impl Dictionary {
    /// Create an empty dictionary.
    ///
    /// ## Arguments
    /// * `options` - the configuration, held read-only for the dictionary's
    ///   lifetime.
    ///
    /// ## Returns
    /// A `Result` with the dictionary, or [`crate::SubgramError::InvalidConfig`].
    pub fn new(options: VocabOptions) -> SgResult<Self> {
        options.validate()?;
        let word2int = SlotTable::new(options.max_vocab_size);
        Ok(Self {
            options,
            words: Vec::new(),
            word2int,
            pdiscard: Vec::new(),
            nwords: 0,
            nlabels: 0,
            ntokens: 0,
            total_weight: 0.0,
            pruneidx: HashMap::new(),
            pruneidx_size: None,
            min_threshold: 1,
        })
    }

    /// The configuration this dictionary was built with.
    pub fn options(&self) -> &VocabOptions {
        &self.options
    }

    /// Number of live entries (words plus labels).
    pub fn size(&self) -> usize {
        self.words.len()
    }

    /// Number of WORD entries.
    pub fn nwords(&self) -> usize {
        self.nwords
    }

    /// Number of LABEL entries.
    pub fn nlabels(&self) -> usize {
        self.nlabels
    }

    /// Total token occurrences seen during the corpus scan.
    pub fn ntokens(&self) -> u64 {
        self.ntokens
    }

    /// Whether [`Dictionary::prune`] has ever run on this dictionary.
    ///
    /// One-way: once true, true for the rest of the object's life.
    pub fn is_pruned(&self) -> bool {
        self.pruneidx_size.is_some()
    }

    /// Classify a token string by the configured label prefix.
    pub fn kind_of(
        &self,
        word: &str,
    ) -> EntryKind {
        if word.starts_with(&self.options.label_prefix) {
            EntryKind::Label
        } else {
            EntryKind::Word
        }
    }

    /// Probe-resolved slot index in the word table for `word`.
    ///
    /// Deterministic for a given capacity and hash; the slot may be empty
    /// (word absent) or occupied by the word's entry id.
    pub fn find(
        &self,
        word: &str,
    ) -> usize {
        self.find_hashed(word, fnv1a(word.as_bytes()))
    }

    /// [`Dictionary::find`] with a precomputed hash.
    pub fn find_hashed(
        &self,
        word: &str,
        hash: u32,
    ) -> usize {
        self.word2int
            .probe(hash, |id| self.words[id].word == word)
    }

    /// Entry id for `word`, if present.
    ///
    /// Absence is a normal outcome, not an error.
    pub fn get_id(
        &self,
        word: &str,
    ) -> Option<usize> {
        self.get_id_hashed(word, fnv1a(word.as_bytes()))
    }

    /// [`Dictionary::get_id`] with a precomputed hash.
    pub fn get_id_hashed(
        &self,
        word: &str,
        hash: u32,
    ) -> Option<usize> {
        self.word2int.get(self.find_hashed(word, hash))
    }

    /// The token string for entry `id`.
    pub fn get_word(
        &self,
        id: usize,
    ) -> Option<&str> {
        self.words.get(id).map(|e| e.word.as_str())
    }

    /// The kind of entry `id`.
    pub fn get_kind(
        &self,
        id: usize,
    ) -> Option<EntryKind> {
        self.words.get(id).map(|e| e.kind)
    }

    /// The label string for word-relative label id `label_id`.
    ///
    /// Label ids count from zero after the word block, mirroring the ids
    /// produced by [`Dictionary::get_line`].
    pub fn get_label(
        &self,
        label_id: usize,
    ) -> Option<&str> {
        if label_id >= self.nlabels {
            return None;
        }
        self.get_word(self.nwords + label_id)
    }

    /// Occurrence weights for every entry of `kind`, in stored order.
    pub fn get_counts(
        &self,
        kind: EntryKind,
    ) -> Vec<f32> {
        self.words
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.weight)
            .collect()
    }

    /// Record one occurrence of `word` with weight 1.
    ///
    /// See [`Dictionary::add_weighted`].
    pub fn add(
        &mut self,
        word: &str,
    ) -> bool {
        self.add_weighted(word, 1.0)
    }

    /// Record one occurrence of `word`.
    ///
    /// An existing entry accumulates `weight`; a new entry is appended and
    /// inserted into the table. Every accepted occurrence bumps the token
    /// counter. When the live vocabulary exceeds 3/4 of capacity, an
    /// implicit threshold pass runs with a cutoff that doubles each pass.
    /// A new word that would fill the last table slot is dropped.
    ///
    /// ## Returns
    /// `true` when an implicit threshold pass ran, invalidating previously
    /// observed entry ids.
    pub fn add_weighted(
        &mut self,
        word: &str,
        weight: f32,
    ) -> bool {
        if word.is_empty() || word.bytes().all(is_separator) {
            return false;
        }

        let hash = fnv1a(word.as_bytes());
        let slot = self.find_hashed(word, hash);

        // At least one slot must stay empty or probes for absent words
        // would never terminate; a new word that would fill the table is
        // dropped instead.
        if self.word2int.get(slot).is_none() && self.size() + 1 >= self.word2int.capacity() {
            return self.maybe_rethreshold();
        }

        self.ntokens += 1;
        self.total_weight += f64::from(weight);

        match self.word2int.get(slot) {
            Some(id) => {
                self.words[id].weight += weight;
            }
            None => {
                let kind = self.kind_of(word);
                self.words.push(Entry {
                    word: word.to_string(),
                    weight,
                    kind,
                    subwords: Vec::new(),
                });
                self.word2int.set(slot, self.words.len() - 1);
                match kind {
                    EntryKind::Word => self.nwords += 1,
                    EntryKind::Label => self.nlabels += 1,
                }
            }
        }

        self.maybe_rethreshold()
    }

    /// Implicit capacity control: when the live vocabulary exceeds 3/4 of
    /// capacity, run a threshold pass with a doubled cutoff.
    fn maybe_rethreshold(&mut self) -> bool {
        if self.size() <= self.options.max_vocab_size / 4 * 3 {
            return false;
        }
        self.min_threshold *= 2;
        log::info!(
            "vocabulary at {} entries exceeds 3/4 of capacity {}; rethresholding at cutoff {}",
            self.size(),
            self.options.max_vocab_size,
            self.min_threshold,
        );
        self.threshold(self.min_threshold, self.min_threshold);
        true
    }

    /// Rebuild the vocabulary keeping only entries at or above the per-kind
    /// minimum weight.
    ///
    /// Retained entries are stably sorted words-first by descending weight
    /// (insertion order on ties), so frequent words cluster at the low ids
    /// used as dense embedding rows. All previously observed ids are
    /// invalidated.
    pub fn threshold(
        &mut self,
        min_count_word: u64,
        min_count_label: u64,
    ) {
        self.words
            .sort_by(|a, b| a.kind.cmp(&b.kind).then(b.weight.total_cmp(&a.weight)));
        self.words.retain(|e| match e.kind {
            EntryKind::Word => e.weight >= min_count_word as f32,
            EntryKind::Label => e.weight >= min_count_label as f32,
        });
        self.words.shrink_to_fit();

        self.word2int.clear();
        self.pdiscard.clear();
        self.nwords = 0;
        self.nlabels = 0;
        self.total_weight = 0.0;

        for id in 0..self.words.len() {
            let hash = fnv1a(self.words[id].word.as_bytes());
            let words = &self.words;
            let slot = self.word2int.probe(hash, |i| words[i].word == words[id].word);
            self.word2int.set(slot, id);

            self.total_weight += f64::from(self.words[id].weight);
            match self.words[id].kind {
                EntryKind::Word => self.nwords += 1,
                EntryKind::Label => self.nlabels += 1,
            }
            self.words[id].subwords.clear();
        }

        log::debug!(
            "threshold pass retained {} words and {} labels",
            self.nwords,
            self.nlabels,
        );
    }

    /// Precompute per-entry subsampling keep probabilities.
    ///
    /// For a word with corpus frequency `f = weight / total_weight`,
    /// `pdiscard = sqrt(t / f) + t / f`, clamped to `[0, 1]`. Labels are
    /// never discarded and get probability 1.
    pub fn init_table_discard(&mut self) {
        let t = self.options.sampling_threshold;
        self.pdiscard = self
            .words
            .iter()
            .map(|e| match e.kind {
                EntryKind::Label => 1.0,
                EntryKind::Word => {
                    let f = f64::from(e.weight) / self.total_weight;
                    ((t / f).sqrt() + t / f).clamp(0.0, 1.0) as f32
                }
            })
            .collect();
    }

    /// Subsampling decision for one training instance of entry `id`.
    ///
    /// ## Arguments
    /// * `id` - the entry id.
    /// * `uniform` - a uniform draw in `[0, 1]` from the caller's random
    ///   stream.
    ///
    /// ## Returns
    /// `true` to skip this occurrence. Always `false` for labels and for
    /// out-of-range ids.
    pub fn discard(
        &self,
        id: usize,
        uniform: f32,
    ) -> bool {
        self.discard_boosted(id, uniform, 1.0)
    }

    /// [`Dictionary::discard`] with a keep-probability boost factor.
    pub fn discard_boosted(
        &self,
        id: usize,
        uniform: f32,
        boost: f32,
    ) -> bool {
        if id >= self.pdiscard.len() {
            return false;
        }
        if self.words[id].kind == EntryKind::Label {
            return false;
        }
        uniform > self.pdiscard[id] * boost
    }

    /// Shrink the hashed n-gram space to a retained set of buckets.
    ///
    /// ## Arguments
    /// * `ids` - sorted combined ids to retain: entry ids below
    ///   [`Dictionary::nwords`] (accepted for interface compatibility; entry
    ///   ids stay stable regardless) and offset bucket ids at or above it.
    ///
    /// Retained buckets keep their identity; every other bucket drops out of
    /// the index space and contributes nothing to subword lookups from here
    /// on. The transition is permanent: [`Dictionary::is_pruned`] stays true
    /// for the rest of the object's life.
    pub fn prune(
        &mut self,
        ids: &[usize],
    ) {
        self.pruneidx.clear();
        let mut retained = 0usize;
        for &id in ids {
            if id >= self.nwords {
                let bucket = id - self.nwords;
                if self.pruneidx.insert(bucket, bucket).is_none() {
                    retained += 1;
                }
            }
        }
        self.pruneidx_size = Some(retained);

        self.init_ngrams();
        log::info!("pruned n-gram space to {retained} retained buckets");
    }

    /// Bucket redirection for a hashed n-gram, honoring pruning.
    ///
    /// Maps `bucket` into the combined id space at `nwords + bucket`. After
    /// pruning, buckets absent from the remap table are dropped and append
    /// nothing.
    pub(crate) fn push_hash(
        &self,
        out: &mut Vec<usize>,
        bucket: usize,
    ) {
        let mut bucket = bucket;
        if let Some(retained) = self.pruneidx_size {
            if retained == 0 {
                return;
            }
            match self.pruneidx.get(&bucket) {
                Some(&mapped) => bucket = mapped,
                None => return,
            }
        }
        out.push(self.nwords + bucket);
    }
}
