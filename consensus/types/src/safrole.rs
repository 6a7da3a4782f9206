use crate::hash::Hash32;
use merkleization::Canonical;

/// The VRF output that orders a ticket in the outside-in sequence
/// (spec.md §4.4). Lower `TicketId`s sort first under the accumulator's
/// insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct TicketId(pub Hash32);

/// A ticket as it lives in the epoch's accumulator once validated: the
/// VRF output plus which of a validator's `N` attempts produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TicketBody {
    pub id: TicketId,
    pub attempt: u8,
}

impl Canonical for TicketBody {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        self.id.0.encode_canonical(buf);
        buf.push(self.attempt);
    }
}

/// A ticket as submitted in an extrinsic, before its VRF has been verified
/// and its `TicketId` derived (spec.md §4.4).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TicketEnvelope {
    pub attempt: u8,
    /// Ring-VRF signature (opaque to this crate; verified by
    /// `state_processing::safrole::vrf`).
    pub signature: Vec<u8>,
}

impl Canonical for TicketEnvelope {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        buf.push(self.attempt);
        self.signature.encode_canonical(buf);
    }
}

/// γ_s: which mode the upcoming epoch's block-authoring lottery is in
/// (spec.md §4.4).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SealingKeys {
    /// Ticket mode: the outside-in sequence of the winning `E` tickets.
    Tickets(Vec<TicketBody>),
    /// Fallback mode: one Bandersnatch key per slot, chosen deterministically
    /// from entropy when an epoch did not collect enough tickets in time.
    Fallback(Vec<[u8; 32]>),
}

impl SealingKeys {
    pub fn len(&self) -> usize {
        match self {
            SealingKeys::Tickets(t) => t.len(),
            SealingKeys::Fallback(k) => k.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, SealingKeys::Fallback(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_ids_order_by_hash_value() {
        let a = TicketId(Hash32::from([1u8; 32]));
        let b = TicketId(Hash32::from([2u8; 32]));
        assert!(a < b);
    }

    #[test]
    fn sealing_keys_length_matches_variant() {
        let fallback = SealingKeys::Fallback(vec![[0u8; 32]; 12]);
        assert_eq!(fallback.len(), 12);
        assert!(fallback.is_fallback());
    }
}
