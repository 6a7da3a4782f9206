use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use sha3::Keccak256;

type Blake2b256 = Blake2b<U32>;

/// `blake2b256(input)`.
///
/// Used for the context-keyed entropy accumulator (spec.md §4.3) and for the
/// message digest that guarantee/assurance signatures are computed over
/// (spec.md §4.5, §4.6): callers prepend their own context string (e.g.
/// `b"jam_guarantee"`) to `input` before calling this function, exactly as
/// the protocol's keyed-hash constructions are written in spec.md.
pub fn blake2b_256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(input);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// `keccak256(input)`, used by the accumulate-root Merkle tree (spec.md §4.7)
/// and the recent-history beefy MMR root derived from it (spec.md §4.9).
pub fn keccak_256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(input);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}
