//! Ticket ordering and the epoch ticket accumulator (spec.md §4.4). Grounded
//! on the insertion-ordered `TicketAccumulator` and `outside_in_sequence`
//! helpers referenced (but not bundled) by the Sassafras-derived safrole
//! module in the retrieval pack; reimplemented here against this crate's
//! own `TicketBody`/`TicketId` types.

use super::vrf::{self, VrfError};
use jam_types::{Hash32, TicketBody, TicketEnvelope, TicketId};
use sp_core::bandersnatch::ring_vrf::RingVerifierKey;

/// Domain separator for both ticket-submission ring-VRF proofs and,
/// ultimately, the header seal they back (spec.md §4.4 step 5: the same
/// prefix is used for the ticket's own VRF output and the seal that must
/// later reproduce it).
pub const TICKET_SEAL_CONTEXT: &[u8] = b"jam_ticket_seal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TicketError {
    #[error("ticket attempt {attempt} is not less than N")]
    AttemptOutOfRange { attempt: u8 },
    #[error("vrf verification failed: {0:?}")]
    Vrf(VrfError),
}

impl From<VrfError> for TicketError {
    fn from(e: VrfError) -> Self {
        TicketError::Vrf(e)
    }
}

/// Verifies one submitted ticket envelope against the epoch's ring
/// verifier key and returns the validated `TicketBody` (spec.md §4.4
/// "ticket submissions... each carry a VRF proof and an attempt index
/// bounded by N").
pub fn verify_ticket_envelope(
    envelope: &TicketEnvelope,
    ring_verifier: &RingVerifierKey,
    ticket_entropy: Hash32,
    attempts_cap: u8,
) -> Result<TicketBody, TicketError> {
    if envelope.attempt >= attempts_cap {
        return Err(TicketError::AttemptOutOfRange {
            attempt: envelope.attempt,
        });
    }

    let mut context = Vec::with_capacity(TICKET_SEAL_CONTEXT.len() + 32);
    context.extend_from_slice(TICKET_SEAL_CONTEXT);
    context.extend_from_slice(ticket_entropy.as_bytes());

    let output = vrf::verify_ring_vrf(
        ring_verifier,
        &context,
        &[envelope.attempt],
        &envelope.signature,
    )?;

    Ok(TicketBody {
        id: TicketId(Hash32::from(output)),
        attempt: envelope.attempt,
    })
}

/// Inserts a newly-validated ticket into the epoch accumulator, which is
/// kept sorted ascending by `TicketId` and bounded to `capacity` entries
/// (spec.md §3 "a: accumulated tickets this epoch (bounded by E)"). Lower
/// ids are strictly preferred: once the accumulator is at capacity, a new
/// ticket is accepted only if it beats the current worst entry, which is
/// then evicted.
pub fn insert_ticket(accumulator: &mut Vec<TicketBody>, ticket: TicketBody, capacity: usize) -> bool {
    if accumulator.iter().any(|t| t.id == ticket.id) {
        return false;
    }

    let position = accumulator.partition_point(|t| t.id < ticket.id);

    if accumulator.len() < capacity {
        accumulator.insert(position, ticket);
        return true;
    }

    if position == accumulator.len() {
        return false;
    }

    accumulator.insert(position, ticket);
    accumulator.pop();
    true
}

/// The outside-in reordering of a full, ascending-sorted ticket
/// accumulator into the epoch's slot-by-slot sealing sequence (spec.md
/// §4.4: "use the outside-in reordering of γ.a as the ticket sequence").
/// Alternates taking the lowest remaining id and the highest remaining id:
/// `[t0, t_{n-1}, t1, t_{n-2}, ...]`.
pub fn outside_in_sequence(sorted_ascending: &[TicketBody]) -> Vec<TicketBody> {
    let mut result = Vec::with_capacity(sorted_ascending.len());
    let mut lo = 0usize;
    let mut hi = sorted_ascending.len();

    while lo < hi {
        result.push(sorted_ascending[lo]);
        lo += 1;
        if lo < hi {
            hi -= 1;
            result.push(sorted_ascending[hi]);
        }
    }

    result
}
