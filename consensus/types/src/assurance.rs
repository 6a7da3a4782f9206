use crate::hash::Hash32;
use merkleization::Canonical;

/// An assurance extrinsic entry: a validator's bitfield of which pending
/// cores it can attest have available erasure-coded data, signed over the
/// parent hash (spec.md §4.6).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Assurance {
    pub anchor: Hash32,
    pub validator_index: u32,
    /// One bit per core, `core_count` bits wide, packed little-endian.
    pub bitfield: Vec<u8>,
    pub signature: [u8; 64],
}

impl Assurance {
    pub fn attests_core(&self, core_index: u32) -> bool {
        let byte = core_index / 8;
        let bit = core_index % 8;
        self.bitfield
            .get(byte as usize)
            .is_some_and(|b| b & (1 << bit) != 0)
    }
}

impl Canonical for Assurance {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        self.anchor.encode_canonical(buf);
        self.validator_index.encode_canonical(buf);
        self.bitfield.encode_canonical(buf);
        buf.extend_from_slice(&self.signature);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitfield_bit_order_is_little_endian_per_byte() {
        let a = Assurance {
            anchor: Hash32::zero(),
            validator_index: 0,
            bitfield: vec![0b0000_0101],
            signature: [0u8; 64],
        };
        assert!(a.attests_core(0));
        assert!(!a.attests_core(1));
        assert!(a.attests_core(2));
        assert!(!a.attests_core(8));
    }
}
