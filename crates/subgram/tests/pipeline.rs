#![allow(missing_docs)]

use std::io::Cursor;

use rand::SeedableRng;
use rand::rngs::StdRng;
use subgram::{Dictionary, EntryKind, SubgramError, VocabOptions};

const CORPUS: &str = "\
__label__pets the cat sat on the mat
__label__pets the dog chased the cat
__label__food the cat ate the fish
the quick brown fox jumps over the lazy dog
";

fn corpus_options() -> VocabOptions {
    VocabOptions::default()
        .with_max_vocab_size(1 << 12)
        .with_bucket(1 << 12)
        .with_min_count(1, 1)
}

fn trained_dict(options: VocabOptions) -> Dictionary {
    let mut dict = Dictionary::new(options).unwrap();
    dict.read_from_file(&mut Cursor::new(CORPUS)).unwrap();
    dict
}

#[test]
fn build_then_query() {
    let dict = trained_dict(corpus_options());

    // "the" dominates the corpus and takes id 0.
    assert_eq!(dict.get_word(0), Some("the"));
    assert_eq!(dict.get_kind(0), Some(EntryKind::Word));

    // Ids are stable across repeated lookups.
    let cat = dict.get_id("cat").unwrap();
    assert_eq!(dict.get_id("cat"), Some(cat));
    assert_eq!(dict.get_word(cat), Some("cat"));

    // Labels sort after words and are reachable by relative id.
    assert_eq!(dict.nlabels(), 2);
    for label_id in 0..dict.nlabels() {
        let label = dict.get_label(label_id).unwrap();
        assert!(label.starts_with("__label__"));
        assert_eq!(dict.get_id(label), Some(dict.nwords() + label_id));
    }

    // Absent words are a normal outcome.
    assert_eq!(dict.get_id("zebra"), None);
}

#[test]
fn min_count_thresholding() {
    let dict = trained_dict(corpus_options().with_min_count(2, 1));

    // Every retained word occurs at least twice.
    for count in dict.get_counts(EntryKind::Word) {
        assert!(count >= 2.0);
    }
    assert_eq!(dict.get_id("quick"), None);
    assert!(dict.get_id("cat").is_some());
}

#[test]
fn subword_backoff_for_unknown_words() {
    let dict = trained_dict(corpus_options());

    // A morphological variant of a known word shares n-gram buckets with it.
    let cat = dict.get_id("cat").unwrap();
    let known: Vec<usize> = dict.get_subwords(cat).unwrap()[1..].to_vec();
    let unknown = dict.subwords_of("cats");

    assert!(dict.get_id("cats").is_none());
    assert!(!unknown.is_empty());
    assert!(unknown.iter().any(|id| known.contains(id)));
}

#[test]
fn line_conversion_for_training() {
    let dict = trained_dict(corpus_options());

    let mut words = Vec::new();
    let mut labels = Vec::new();
    let mut reader = Cursor::new("__label__pets the cat purred\nnext line");
    let ntokens = dict.get_line(&mut reader, &mut words, &mut labels).unwrap();

    // Stops at the end-of-line sentinel, leaving the next line unread.
    assert_eq!(ntokens, 5);
    assert_eq!(labels.len(), 1);
    assert_eq!(dict.get_label(labels[0]), Some("__label__pets"));

    // Known words contribute their ids; "purred" is unknown and contributes
    // only bucket-range n-gram ids.
    assert!(words.contains(&dict.get_id("the").unwrap()));
    assert!(words.contains(&dict.get_id("cat").unwrap()));
    assert!(words.iter().all(|&id| id < dict.nwords() + dict.options().bucket));
}

#[test]
fn line_conversion_for_inference() {
    // A saturating sampling threshold keeps every word.
    let dict = trained_dict(corpus_options().with_sampling_threshold(1e4));

    let mut rng = StdRng::seed_from_u64(42);
    let mut words = Vec::new();
    let mut weight = 0.0f32;
    let ntokens = dict.convert_line(
        "the lazy unknown_word dog",
        &mut rng,
        Some(&mut words),
        Some(&mut weight),
    );

    assert_eq!(ntokens, 3);
    assert_eq!(
        words,
        vec![
            dict.get_id("the").unwrap(),
            dict.get_id("lazy").unwrap(),
            dict.get_id("dog").unwrap(),
        ]
    );
    assert!(weight > 0.0);
}

#[test]
fn save_load_round_trip_law() {
    let dict = trained_dict(corpus_options());

    let mut bytes = Vec::new();
    dict.save(&mut bytes).unwrap();
    let loaded = Dictionary::load(corpus_options(), &mut Cursor::new(&bytes)).unwrap();

    assert_eq!(loaded.nwords(), dict.nwords());
    assert_eq!(loaded.nlabels(), dict.nlabels());
    assert_eq!(loaded.ntokens(), dict.ntokens());

    let triples = |d: &Dictionary| -> Vec<(String, f32, EntryKind)> {
        (0..d.size())
            .map(|id| {
                (
                    d.get_word(id).unwrap().to_string(),
                    d.get_counts(EntryKind::Word)
                        .into_iter()
                        .chain(d.get_counts(EntryKind::Label))
                        .nth(id)
                        .unwrap(),
                    d.get_kind(id).unwrap(),
                )
            })
            .collect()
    };
    assert_eq!(triples(&loaded), triples(&dict));

    // Derived discard/subword state is recomputed identically.
    for word in ["the", "cat", "dog"] {
        assert_eq!(loaded.subwords_of(word), dict.subwords_of(word));
    }
}

#[test]
fn prune_then_round_trip() {
    let mut dict = trained_dict(corpus_options());
    assert!(!dict.is_pruned());

    // Keep only the buckets used by two words.
    let mut keep = Vec::new();
    for word in ["cat", "dog"] {
        let id = dict.get_id(word).unwrap();
        keep.extend_from_slice(dict.get_subwords(id).unwrap());
    }
    keep.sort_unstable();
    keep.dedup();
    dict.prune(&keep);
    assert!(dict.is_pruned());

    // Retained words still resolve to their full subword lists.
    let cat = dict.get_id("cat").unwrap();
    assert!(dict.get_subwords(cat).unwrap().len() > 1);
    for &id in &dict.get_subwords(cat).unwrap()[1..] {
        assert!(keep.contains(&id));
    }

    // Other words lose their dropped buckets but keep their own ids.
    let the = dict.get_id("the").unwrap();
    for &id in &dict.get_subwords(the).unwrap()[1..] {
        assert!(keep.contains(&id));
    }

    // Pruned state survives a save/load cycle.
    let mut bytes = Vec::new();
    dict.save(&mut bytes).unwrap();
    let loaded = Dictionary::load(corpus_options(), &mut Cursor::new(&bytes)).unwrap();
    assert!(loaded.is_pruned());
    assert_eq!(loaded.get_subwords(cat), dict.get_subwords(cat));
}

#[test]
fn invalid_options_rejected_up_front() {
    let options = corpus_options().with_subword_range(7, 3);
    assert!(matches!(
        Dictionary::new(options),
        Err(SubgramError::InvalidConfig { .. })
    ));
}
