//! Proof-of-work search over block nonces.
//!
//! Difficulty counts leading `'0'` hex characters, so every extra unit
//! multiplies the expected number of attempts by 16.

use crate::{constants::HASH_SIZE, Hash};
use rayon::prelude::*;
use sha2::{Digest, Sha256};

pub fn count_leading_zero_bits(hash: &Hash) -> u32 {
    let mut total = 0u32;
    for b in hash {
        if *b == 0 {
            total += 8;
        } else {
            total += b.leading_zeros();
            break;
        }
    }
    total
}

/// Leading zero hex characters of the digest.
pub fn leading_zero_nibbles(hash: &Hash) -> u32 {
    count_leading_zero_bits(hash) / 4
}

/// True when `hash_hex` starts with at least `difficulty` `'0'` characters.
pub fn meets_difficulty(hash_hex: &str, difficulty: u32) -> bool {
    let difficulty = difficulty as usize;
    hash_hex.len() >= difficulty && hash_hex.bytes().take(difficulty).all(|b| b == b'0')
}

/// SHA-256 of `prefix` followed by the little-endian nonce.
pub fn hash_with_nonce(prefix: &[u8], nonce: u64) -> Hash {
    finish(&Sha256::new().chain_update(prefix), nonce)
}

fn finish(base: &Sha256, nonce: u64) -> Hash {
    let digest = base.clone().chain_update(nonce.to_le_bytes()).finalize();
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(&digest[..]);
    out
}

/// Tries nonces `start, start + 1, ...` until the digest has at least
/// `difficulty` leading zero hex characters. `start` itself is tried first.
/// Returns `None` only if the nonce space runs out.
pub fn search_nonce(prefix: &[u8], start: u64, difficulty: u32) -> Option<(u64, Hash)> {
    let base = Sha256::new().chain_update(prefix);
    let mut nonce = start;
    loop {
        let hash = finish(&base, nonce);
        if leading_zero_nibbles(&hash) >= difficulty {
            return Some((nonce, hash));
        }
        nonce = nonce.checked_add(1)?;
    }
}

/// Same contract as [`search_nonce`], with the range split across the rayon
/// pool. Whichever worker finds a qualifying nonce first wins, so the result
/// is not necessarily the smallest one.
pub fn search_nonce_parallel(prefix: &[u8], start: u64, difficulty: u32) -> Option<(u64, Hash)> {
    let base = Sha256::new().chain_update(prefix);
    (start..u64::MAX)
        .into_par_iter()
        .map(|nonce| (nonce, finish(&base, nonce)))
        .find_any(|(_, hash)| leading_zero_nibbles(hash) >= difficulty)
}
