use crate::extrinsics::Extrinsics;
use crate::header::Header;
use merkleization::Canonical;

/// A full block: header plus the extrinsic bundles it authorizes
/// (spec.md §2).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Block {
    pub header: Header,
    pub extrinsics: Extrinsics,
}

impl Block {
    pub fn hash(&self) -> crate::hash::Hash32 {
        crate::hash::Hash32::from(merkleization::blake2b_256(&self.header.canonical_bytes()))
    }
}
