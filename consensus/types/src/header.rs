use crate::hash::Hash32;
use crate::slot::Slot;
use crate::validator::ValidatorKeys;
use merkleization::Canonical;

/// The epoch marker a header carries when it is the first block of a new
/// epoch (spec.md §4.2, §4.4): the new epoch's entropy and the Bandersnatch
/// keys of the validators who will author in it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EpochMark {
    pub entropy: Hash32,
    pub tickets_entropy: Hash32,
    pub validators: Vec<[u8; 32]>,
}

impl Canonical for EpochMark {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        self.entropy.encode_canonical(buf);
        self.tickets_entropy.encode_canonical(buf);
        (self.validators.len() as u32).encode_canonical(buf);
        for v in &self.validators {
            v.encode_canonical(buf);
        }
    }
}

/// The tickets marker a header carries when the outside-in sequence for the
/// next epoch has just been finalized (spec.md §4.4).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TicketsMark {
    pub tickets: Vec<crate::safrole::TicketBody>,
}

impl Canonical for TicketsMark {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        self.tickets.encode_canonical(buf);
    }
}

/// A block header (spec.md §3). `seal` and `entropy_source` are VRF
/// signatures over the rest of the header; everything else is plain data.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Header {
    pub parent: Hash32,
    pub parent_state_root: Hash32,
    pub extrinsic_hash: Hash32,
    pub slot: Slot,
    pub epoch_mark: Option<EpochMark>,
    pub tickets_mark: Option<TicketsMark>,
    pub offenders_mark: Vec<[u8; 32]>,
    pub author_index: u32,
    /// Bandersnatch VRF signature over the unsigned header, binding the
    /// author to the seal key selected for this slot.
    pub seal: Vec<u8>,
    /// Bandersnatch VRF signature over the per-block entropy input,
    /// feeding η′ (spec.md §4.3).
    pub entropy_source: Vec<u8>,
    pub author_key: ValidatorKeys,
}

impl Header {
    /// The canonical encoding of everything but `seal`, i.e. what the seal
    /// signature is computed over (spec.md §4.4).
    pub fn unsigned_encoding(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.parent.encode_canonical(&mut buf);
        self.parent_state_root.encode_canonical(&mut buf);
        self.extrinsic_hash.encode_canonical(&mut buf);
        self.slot.encode_canonical(&mut buf);
        self.epoch_mark.encode_canonical(&mut buf);
        self.tickets_mark.encode_canonical(&mut buf);
        self.offenders_mark.encode_canonical(&mut buf);
        self.author_index.encode_canonical(&mut buf);
        self.entropy_source.encode_canonical(&mut buf);
        buf
    }
}

impl Canonical for Header {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.unsigned_encoding());
        self.seal.encode_canonical(buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> Header {
        Header {
            parent: Hash32::zero(),
            parent_state_root: Hash32::zero(),
            extrinsic_hash: Hash32::zero(),
            slot: Slot::new(1),
            epoch_mark: None,
            tickets_mark: None,
            offenders_mark: vec![],
            author_index: 0,
            seal: vec![1, 2, 3],
            entropy_source: vec![4, 5, 6],
            author_key: ValidatorKeys::null(),
        }
    }

    #[test]
    fn unsigned_encoding_excludes_seal() {
        let h1 = sample_header();
        let mut h2 = sample_header();
        h2.seal = vec![9, 9, 9];
        assert_eq!(h1.unsigned_encoding(), h2.unsigned_encoding());
        assert_ne!(h1.canonical_bytes(), h2.canonical_bytes());
    }
}
