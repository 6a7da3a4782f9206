//! Hashing, canonical encoding, and Merkle collaborators.
//!
//! This crate plays the role that `consensus/merkle_proof` and
//! `ethereum_ssz`/`tree_hash` play in the teacher stack, adapted to the two
//! hash functions the core actually needs: blake2b-256 for signed messages
//! and entropy accumulation, and keccak-256 for the accumulate-root Merkle
//! tree. Both the canonical encoding trait and the Merkle tree are treated
//! as external collaborators by the rest of the workspace (per spec.md §1,
//! §6): `state_processing` and `jam_types` depend only on the contract
//! surface exposed here, never on the hash function directly.

mod canonical;
mod hashing;
mod merkle_tree;
mod state_trie;

pub use canonical::Canonical;
pub use hashing::{blake2b_256, keccak_256};
pub use merkle_tree::merkle_root;
pub use state_trie::{state_root, StateDictionary};
