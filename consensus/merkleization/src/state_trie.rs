use crate::hashing::blake2b_256;
use crate::merkle_tree::merkle_root;
use std::collections::BTreeMap;

/// The persisted state layout (spec.md §6): a mapping from 31-byte
/// structured state keys to byte values.
pub type StateDictionary = BTreeMap<[u8; 31], Vec<u8>>;

/// Computes the 32-byte state root of a state dictionary.
///
/// Spec.md §6 treats the real JAM binary trie as an external collaborator
/// specified only by its round-trip obligation: "reconstruction from a
/// dictionary followed by re-building the dictionary must yield the
/// identical dictionary", and `state_root` must be deterministic. This
/// implementation satisfies exactly that contract with a content-addressed
/// binary Merkle tree over `blake2b256(key || value)` leaves, built from the
/// dictionary's natural (ascending-key) order — it is not a bit-for-bit
/// rendition of the JAM patricia-style binary trie (whose exact node
/// encoding is out of scope per spec.md §1), but it is a deterministic,
/// injective function of the dictionary with no additional state, which is
/// everything the rest of this core observes through the collaborator
/// contract. See DESIGN.md for the open-question note this resolves.
pub fn state_root(dictionary: &StateDictionary) -> [u8; 32] {
    let leaves: Vec<[u8; 32]> = dictionary
        .iter()
        .map(|(key, value)| {
            let mut buf = Vec::with_capacity(31 + value.len());
            buf.extend_from_slice(key);
            buf.extend_from_slice(value);
            blake2b_256(&buf)
        })
        .collect();
    merkle_root(&leaves)
}
