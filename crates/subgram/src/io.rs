//! # Binary Persistence
//!
//! Little-endian binary format: the scalar counters, then one record per
//! entry (length-prefixed word bytes, weight, kind tag), then the pruning
//! redirection pairs when present. Derived state — discard probabilities and
//! subword caches — is never persisted; [`Dictionary::load`] reconstructs it
//! by re-running the same init passes as a fresh corpus scan, which is
//! reproducible because the weights round-trip exactly and accumulate in
//! stored entry order.

use std::io::{Read, Write};

use crate::errors::{SgResult, SubgramError};
use crate::hashing::fnv1a;
use crate::options::VocabOptions;
use crate::types::{Entry, EntryKind};
use crate::vocab::Dictionary;

/// Longest accepted persisted word, in bytes. Anything larger is treated as
/// stream corruption rather than a real token.
const MAX_WORD_LEN: usize = 1 << 16;

fn corrupt<T>(reason: impl Into<String>) -> SgResult<T> {
    Err(SubgramError::CorruptStream(reason.into()))
}

fn read_array<R: Read, const N: usize>(reader: &mut R) -> SgResult<[u8; N]> {
    let mut bytes = [0u8; N];
    reader.read_exact(&mut bytes)?;
    Ok(bytes)
}

fn read_u32<R: Read>(reader: &mut R) -> SgResult<u32> {
    Ok(u32::from_le_bytes(read_array(reader)?))
}

fn read_u64<R: Read>(reader: &mut R) -> SgResult<u64> {
    Ok(u64::from_le_bytes(read_array(reader)?))
}

fn read_i64<R: Read>(reader: &mut R) -> SgResult<i64> {
    Ok(i64::from_le_bytes(read_array(reader)?))
}

fn read_f32<R: Read>(reader: &mut R) -> SgResult<f32> {
    Ok(f32::from_le_bytes(read_array(reader)?))
}

fn read_u8<R: Read>(reader: &mut R) -> SgResult<u8> {
    Ok(u8::from_le_bytes(read_array(reader)?))
}

impl Dictionary {
    /// Write the dictionary to `writer`.
    ///
    /// The scalar counters, every `(word, weight, kind)` record in stored
    /// order, and the pruning redirection table when pruned. Round-trips
    /// exactly through [`Dictionary::load`].
    pub fn save<W: Write>(
        &self,
        writer: &mut W,
    ) -> SgResult<()> {
        writer.write_all(&(self.size() as u32).to_le_bytes())?;
        writer.write_all(&(self.nwords() as u32).to_le_bytes())?;
        writer.write_all(&(self.nlabels() as u32).to_le_bytes())?;
        writer.write_all(&self.ntokens().to_le_bytes())?;

        let prune_tag: i64 = match self.pruneidx_size {
            None => -1,
            Some(count) => count as i64,
        };
        writer.write_all(&prune_tag.to_le_bytes())?;

        for entry in &self.words {
            let bytes = entry.word.as_bytes();
            writer.write_all(&(bytes.len() as u32).to_le_bytes())?;
            writer.write_all(bytes)?;
            writer.write_all(&entry.weight.to_le_bytes())?;
            writer.write_all(&[entry.kind.tag()])?;
        }

        if self.pruneidx_size.is_some() {
            // Sorted for deterministic bytes.
            let mut pairs: Vec<(usize, usize)> =
                self.pruneidx.iter().map(|(&k, &v)| (k, v)).collect();
            pairs.sort_unstable();
            for (key, value) in pairs {
                writer.write_all(&(key as u64).to_le_bytes())?;
                writer.write_all(&(value as u64).to_le_bytes())?;
            }
        }
        Ok(())
    }

    /// Read a dictionary from `writer`'s counterpart stream.
    ///
    /// Rebuilds the slot table by re-inserting each word (the table layout
    /// is an implementation detail; only the set of mappings is part of the
    /// format), then re-derives discard probabilities and subword caches.
    /// Truncated or inconsistent input fails without yielding a partially
    /// built dictionary.
    ///
    /// ## Arguments
    /// * `options` - the configuration the dictionary was trained with.
    /// * `reader` - the persisted stream.
    pub fn load<R: Read>(
        options: VocabOptions,
        reader: &mut R,
    ) -> SgResult<Self> {
        let mut dict = Dictionary::new(options)?;

        let size = read_u32(reader)? as usize;
        let nwords = read_u32(reader)? as usize;
        let nlabels = read_u32(reader)? as usize;
        let ntokens = read_u64(reader)?;
        let prune_tag = read_i64(reader)?;

        if nwords + nlabels != size {
            return corrupt(format!(
                "entry counts disagree: {nwords} words + {nlabels} labels != {size}"
            ));
        }
        // One table slot must stay empty so probes for absent words
        // terminate.
        if size >= dict.options.max_vocab_size {
            return corrupt(format!(
                "persisted vocabulary ({size} entries) does not fit capacity ({})",
                dict.options.max_vocab_size
            ));
        }

        dict.words.reserve_exact(size);
        for _ in 0..size {
            let len = read_u32(reader)? as usize;
            if len > MAX_WORD_LEN {
                return corrupt(format!("entry length {len} exceeds limit"));
            }
            let mut bytes = vec![0u8; len];
            reader.read_exact(&mut bytes)?;
            let word = match String::from_utf8(bytes) {
                Ok(word) => word,
                Err(_) => return corrupt("entry is not valid UTF-8"),
            };
            let weight = read_f32(reader)?;
            let kind = EntryKind::from_tag(read_u8(reader)?)?;

            let hash = fnv1a(word.as_bytes());
            let slot = dict.find_hashed(&word, hash);
            if dict.word2int.get(slot).is_some() {
                return corrupt(format!("duplicate entry: {word:?}"));
            }

            dict.words.push(Entry {
                word,
                weight,
                kind,
                subwords: Vec::new(),
            });
            dict.word2int.set(slot, dict.words.len() - 1);
            dict.total_weight += f64::from(weight);
            match kind {
                EntryKind::Word => dict.nwords += 1,
                EntryKind::Label => dict.nlabels += 1,
            }
        }

        if dict.nwords != nwords || dict.nlabels != nlabels {
            return corrupt(format!(
                "kind counts disagree with header: read {} words, {} labels",
                dict.nwords, dict.nlabels,
            ));
        }
        dict.ntokens = ntokens;

        if prune_tag >= 0 {
            let count = prune_tag as usize;
            dict.pruneidx.reserve(count);
            for _ in 0..count {
                let key = read_u64(reader)? as usize;
                let value = read_u64(reader)? as usize;
                dict.pruneidx.insert(key, value);
            }
            if dict.pruneidx.len() != count {
                return corrupt("duplicate pruning redirection keys");
            }
            dict.pruneidx_size = Some(count);
        }

        dict.init_table_discard();
        dict.init_ngrams();

        log::info!(
            "loaded dictionary: {} words, {} labels, {} tokens",
            dict.nwords(),
            dict.nlabels(),
            dict.ntokens(),
        );
        Ok(dict)
    }

    /// Write a human-readable listing for diagnostics.
    ///
    /// One `word weight kind` line per entry, in stored order. Not meant for
    /// reload; use [`Dictionary::save`] for that.
    pub fn dump<W: Write>(
        &self,
        writer: &mut W,
    ) -> SgResult<()> {
        writeln!(writer, "{} {} {}", self.size(), self.nwords(), self.nlabels())?;
        for entry in &self.words {
            writeln!(writer, "{} {} {}", entry.word, entry.weight, entry.kind)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn test_options() -> VocabOptions {
        VocabOptions::default()
            .with_max_vocab_size(1 << 10)
            .with_bucket(1 << 8)
            .with_min_count(1, 1)
    }

    fn sample_dict() -> Dictionary {
        let corpus = "the cat sat on the mat __label__pets\nthe dog sat __label__pets\n";
        let mut dict = Dictionary::new(test_options()).unwrap();
        dict.read_from_file(&mut Cursor::new(corpus)).unwrap();
        dict
    }

    fn save_to_vec(dict: &Dictionary) -> Vec<u8> {
        let mut bytes = Vec::new();
        dict.save(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_round_trip() {
        let dict = sample_dict();
        let bytes = save_to_vec(&dict);
        let loaded = Dictionary::load(test_options(), &mut Cursor::new(&bytes)).unwrap();

        assert_eq!(loaded.size(), dict.size());
        assert_eq!(loaded.nwords(), dict.nwords());
        assert_eq!(loaded.nlabels(), dict.nlabels());
        assert_eq!(loaded.ntokens(), dict.ntokens());
        assert!(!loaded.is_pruned());

        for id in 0..dict.size() {
            let word = dict.get_word(id).unwrap();
            assert_eq!(loaded.get_word(id), Some(word));
            assert_eq!(loaded.get_id(word), Some(id));
            assert_eq!(loaded.get_kind(id), dict.get_kind(id));
            assert_eq!(loaded.words[id].weight, dict.words[id].weight);
            // Derived state is recomputed, not persisted.
            assert_eq!(loaded.get_subwords(id), dict.get_subwords(id));
            assert_eq!(loaded.pdiscard[id], dict.pdiscard[id]);
        }
    }

    #[test]
    fn test_round_trip_insertion_order() {
        // A dictionary saved before any threshold pass stores entries in
        // insertion order, so a label may precede a word on disk.
        let mut dict = Dictionary::new(test_options()).unwrap();
        dict.add("__label__pets");
        dict.add("cat");

        let bytes = save_to_vec(&dict);
        let loaded = Dictionary::load(test_options(), &mut Cursor::new(&bytes)).unwrap();

        assert_eq!(loaded.get_word(0), Some("__label__pets"));
        assert_eq!(loaded.get_word(1), Some("cat"));
        assert_eq!(loaded.nwords(), 1);
        assert_eq!(loaded.nlabels(), 1);
        assert_eq!(loaded.get_id("cat"), Some(1));
    }

    #[test]
    fn test_round_trip_empty() {
        let dict = Dictionary::new(test_options()).unwrap();
        let bytes = save_to_vec(&dict);
        let loaded = Dictionary::load(test_options(), &mut Cursor::new(&bytes)).unwrap();
        assert_eq!(loaded.size(), 0);
        assert_eq!(loaded.ntokens(), 0);
    }

    #[test]
    fn test_round_trip_pruned() {
        let mut dict = sample_dict();
        let cat = dict.get_id("cat").unwrap();
        let mut keep: Vec<usize> = dict.get_subwords(cat).unwrap().to_vec();
        keep.sort_unstable();
        keep.dedup();
        dict.prune(&keep);

        let bytes = save_to_vec(&dict);
        let loaded = Dictionary::load(test_options(), &mut Cursor::new(&bytes)).unwrap();

        assert!(loaded.is_pruned());
        assert_eq!(loaded.pruneidx_size, dict.pruneidx_size);
        assert_eq!(loaded.pruneidx, dict.pruneidx);
        assert_eq!(loaded.get_subwords(cat), dict.get_subwords(cat));
    }

    #[test]
    fn test_save_deterministic() {
        let dict = sample_dict();
        assert_eq!(save_to_vec(&dict), save_to_vec(&dict));
    }

    #[test]
    fn test_truncated_stream() {
        let dict = sample_dict();
        let bytes = save_to_vec(&dict);

        for cut in [0, 3, 10, bytes.len() - 1] {
            let result = Dictionary::load(test_options(), &mut Cursor::new(&bytes[..cut]));
            assert!(matches!(result, Err(SubgramError::Io(_))), "cut at {cut}");
        }
    }

    #[test]
    fn test_invalid_kind_tag() {
        let dict = sample_dict();
        let mut bytes = save_to_vec(&dict);

        // The first entry's kind tag sits right after the header, its word
        // bytes, its length prefix, and its weight.
        let word_len = dict.get_word(0).unwrap().len();
        let offset = 4 + 4 + 4 + 8 + 8 + 4 + word_len + 4;
        bytes[offset] = 9;

        let result = Dictionary::load(test_options(), &mut Cursor::new(&bytes));
        assert!(matches!(
            result,
            Err(SubgramError::InvalidEntryKind { tag: 9 })
        ));
    }

    #[test]
    fn test_inconsistent_header() {
        let dict = sample_dict();
        let mut bytes = save_to_vec(&dict);

        // Corrupt the word count.
        bytes[4] = bytes[4].wrapping_add(1);
        let result = Dictionary::load(test_options(), &mut Cursor::new(&bytes));
        assert!(matches!(result, Err(SubgramError::CorruptStream(_))));
    }

    #[test]
    fn test_oversized_vocabulary_rejected() {
        let dict = sample_dict();
        let bytes = save_to_vec(&dict);

        let tiny = test_options().with_max_vocab_size(2);
        let result = Dictionary::load(tiny, &mut Cursor::new(&bytes));
        assert!(matches!(result, Err(SubgramError::CorruptStream(_))));
    }

    #[test]
    fn test_dump_listing() {
        let dict = sample_dict();
        let mut out = Vec::new();
        dict.dump(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            format!("{} {} {}", dict.size(), dict.nwords(), dict.nlabels())
        );
        assert_eq!(text.lines().count(), dict.size() + 1);
        assert!(text.contains("the 3 word"));
        assert!(text.contains("__label__pets 2 label"));
    }

    #[test]
    fn test_file_round_trip() {
        let dict = sample_dict();

        tempdir::TempDir::new("subgram_dict_test")
            .and_then(|dir| {
                let path = dir.path().join("model.bin");

                let mut file = std::fs::File::create(&path).expect("failed to create file");
                dict.save(&mut file).expect("failed to save dictionary");

                let mut file = std::fs::File::open(&path).expect("failed to open file");
                let loaded = Dictionary::load(test_options(), &mut file)
                    .expect("failed to load dictionary");

                assert_eq!(loaded.size(), dict.size());
                assert_eq!(loaded.ntokens(), dict.ntokens());
                Ok(())
            })
            .unwrap();
    }
}
