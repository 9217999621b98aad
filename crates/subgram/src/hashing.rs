//! # Deterministic String Hashing
//!
//! One FNV-1a hash is shared between vocabulary lookup keys and n-gram
//! bucket assignment. Sharing a single hash space, partitioned by the word
//! count offset, lets the embedding matrix be one flat array sized
//! `nwords + bucket` with no second lookup table at training time.

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// 32-bit FNV-1a over raw bytes.
///
/// This hash is part of the persisted-model contract: a dictionary reloaded
/// with the same configuration must re-derive identical n-gram buckets.
pub fn fnv1a(bytes: &[u8]) -> u32 {
    let mut h = FNV_OFFSET_BASIS;
    for &b in bytes {
        h ^= u32::from(b);
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}
