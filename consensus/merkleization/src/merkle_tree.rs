use crate::hashing::keccak_256;

/// Binary Keccak-256 Merkle tree root over an ordered sequence of 32-byte
/// leaves, as specified for the accumulate root (spec.md §4.7): "feed the
/// resulting blobs into a binary Keccak-256 Merkle tree".
///
/// An odd node at any level is promoted unchanged to the next level rather
/// than hashed with a padding leaf, so that appending a leaf to a
/// already-even-sized sequence cannot silently reuse a hash that used to
/// belong to a duplicated pair. An empty leaf set hashes to the all-zero
/// root.
pub fn merkle_root(leaves: &[[u8; 32]]) -> [u8; 32] {
    if leaves.is_empty() {
        return [0u8; 32];
    }

    let mut level: Vec<[u8; 32]> = leaves.to_vec();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut pairs = level.chunks_exact(2);
        for pair in &mut pairs {
            let mut buf = [0u8; 64];
            buf[..32].copy_from_slice(&pair[0]);
            buf[32..].copy_from_slice(&pair[1]);
            next.push(keccak_256(&buf));
        }
        if let [odd] = pairs.remainder() {
            next.push(*odd);
        }
        level = next;
    }
    level[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tree_is_zero() {
        assert_eq!(merkle_root(&[]), [0u8; 32]);
    }

    #[test]
    fn single_leaf_is_identity() {
        let leaf = [7u8; 32];
        assert_eq!(merkle_root(&[leaf]), leaf);
    }

    #[test]
    fn deterministic_and_order_sensitive() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        let root_ab = merkle_root(&[a, b]);
        let root_ba = merkle_root(&[b, a]);
        assert_ne!(root_ab, root_ba);
        assert_eq!(root_ab, merkle_root(&[a, b]));
    }

    #[test]
    fn odd_count_promotes_last_leaf() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        let c = [3u8; 32];
        let root = merkle_root(&[a, b, c]);
        let ab = {
            let mut buf = [0u8; 64];
            buf[..32].copy_from_slice(&a);
            buf[32..].copy_from_slice(&b);
            keccak_256(&buf)
        };
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(&ab);
        buf[32..].copy_from_slice(&c);
        assert_eq!(root, keccak_256(&buf));
    }
}
