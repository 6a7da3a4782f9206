use crate::assurance::Assurance;
use crate::dispute::DisputesExtrinsic;
use crate::guarantee::Guarantee;
use crate::safrole::TicketEnvelope;
use merkleization::Canonical;

/// A submitted preimage: a service to store it under and the raw bytes
/// (spec.md §4.8).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PreimageExtrinsicEntry {
    pub service_id: u32,
    pub data: Vec<u8>,
}

impl Canonical for PreimageExtrinsicEntry {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        self.service_id.encode_canonical(buf);
        self.data.encode_canonical(buf);
    }
}

/// The five extrinsic bundles a block carries, processed in the order
/// spec.md §2 fixes: disputes, then preimages, then assurances, then
/// guarantees, with tickets folded into Safrole's own block processing.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Extrinsics {
    pub tickets: Vec<TicketEnvelope>,
    pub disputes: DisputesExtrinsic,
    pub preimages: Vec<PreimageExtrinsicEntry>,
    pub assurances: Vec<Assurance>,
    pub guarantees: Vec<Guarantee>,
}

impl Canonical for Extrinsics {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        self.tickets.encode_canonical(buf);
        self.disputes.encode_canonical(buf);
        self.preimages.encode_canonical(buf);
        self.assurances.encode_canonical(buf);
        self.guarantees.encode_canonical(buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Hash32;

    #[test]
    fn distinct_extrinsics_hash_differently() {
        let empty = Extrinsics::default();
        let mut with_preimage = Extrinsics::default();
        with_preimage.preimages.push(PreimageExtrinsicEntry {
            service_id: 0,
            data: vec![1, 2, 3],
        });
        assert_ne!(
            Hash32::from(merkleization::blake2b_256(&empty.canonical_bytes())),
            Hash32::from(merkleization::blake2b_256(&with_preimage.canonical_bytes())),
        );
    }
}
