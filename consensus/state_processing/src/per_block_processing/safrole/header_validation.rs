//! Header validation contract consumed by block import (spec.md §4.4,
//! steps 1-8).

use super::tickets::outside_in_sequence;
use super::vrf::{self, VrfError};
use crate::common::work_group::{join_results, Executor};
use crate::staged_state::StagedState;
use jam_types::{Hash32, Header, Parameters, SealingKeys, TicketBody};

pub const TICKET_SEAL_PREFIX: &[u8] = b"jam_ticket_seal";
pub const FALLBACK_SEAL_PREFIX: &[u8] = b"jam_fallback_seal";
pub const ENTROPY_SOURCE_CONTEXT: &[u8] = b"jam_entropy";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HeaderValidationError {
    #[error("header.parent does not match the hash of the last recent block")]
    BadParent,
    #[error("header.parent_state_root does not match the state root computed from \u{3c3}")]
    BadParentStateRoot,
    #[error("header.extrinsic_hash does not match the merkle hash of the extrinsics")]
    BadExtrinsicHash,
    #[error("header.author_index {0} is out of range")]
    BadAuthorIndex(u32),
    #[error("ticket seal verification failed: {0:?}")]
    TicketSealFailed(VrfError),
    #[error("fallback seal verification failed: {0:?}")]
    FallbackSealFailed(VrfError),
    #[error("seal vrf output does not match the slot's winning ticket id")]
    TicketIdMismatch,
    #[error("entropy-source vrf verification failed: {0:?}")]
    EntropySourceFailed(VrfError),
    #[error("header.author_index does not match the expected fallback author")]
    WrongFallbackAuthor,
    #[error("epoch_mark presence does not match is-new-epoch")]
    BadEpochMarkerTiming,
    #[error("tickets_mark presence does not match the ticket-contest schedule")]
    BadTicketsMarkerTiming,
}

impl From<VrfError> for HeaderValidationError {
    fn from(e: VrfError) -> Self {
        HeaderValidationError::TicketSealFailed(e)
    }
}

/// The effective four-entry entropy ring used for this block's validation
/// (spec.md §4.4 step 1).
fn effective_entropy(prior_entropy: &[Hash32; 4], is_new_epoch: bool) -> [Hash32; 4] {
    if is_new_epoch {
        [Hash32::zero(), prior_entropy[0], prior_entropy[1], prior_entropy[2]]
    } else {
        *prior_entropy
    }
}

/// Which ticket (if any) is assigned to this slot, and thus which mode the
/// seal must be validated in (spec.md §4.4 step 2).
enum SlotAssignment<'a> {
    Ticket(&'a TicketBody),
    Fallback,
}

fn resolve_slot_assignment(
    sealing_keys: &SealingKeys,
    slot_in_epoch: u32,
) -> SlotAssignment<'_> {
    match sealing_keys {
        SealingKeys::Tickets(tickets) => tickets
            .get(slot_in_epoch as usize)
            .map(SlotAssignment::Ticket)
            .unwrap_or(SlotAssignment::Fallback),
        SealingKeys::Fallback(_) => SlotAssignment::Fallback,
    }
}

fn derive_fallback_author(entropy: Hash32, slot_in_epoch: u32, validator_count: u32) -> u32 {
    let mut buf = Vec::with_capacity(36);
    buf.extend_from_slice(entropy.as_bytes());
    buf.extend_from_slice(&slot_in_epoch.to_le_bytes());
    let digest = merkleization::blake2b_256(&buf);
    let value = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]);
    value % validator_count.max(1)
}

pub struct HeaderValidationOutcome {
    pub seal_output: [u8; 32],
    pub entropy_source_output: [u8; 32],
    pub consumed_ticket: Option<TicketBody>,
}

/// Validates the structural and cryptographic contract of an incoming
/// header against the staged (pre-Safrole-transition) state, running seal
/// and entropy-source VRF verification in parallel (spec.md §4.4, §5).
#[allow(clippy::too_many_arguments)]
pub fn validate_header<E: Executor>(
    staged: &StagedState,
    params: &Parameters,
    header: &Header,
    is_new_epoch: bool,
    slot_in_epoch: u32,
    last_recent_block_hash: Hash32,
    computed_parent_state_root: Hash32,
    computed_extrinsic_hash: Hash32,
    epoch_successfully_contested: bool,
    is_first_epoch: bool,
    executor: &E,
) -> Result<HeaderValidationOutcome, HeaderValidationError> {
    if header.parent != last_recent_block_hash {
        return Err(HeaderValidationError::BadParent);
    }
    if header.parent_state_root != computed_parent_state_root {
        return Err(HeaderValidationError::BadParentStateRoot);
    }
    if header.extrinsic_hash != computed_extrinsic_hash {
        return Err(HeaderValidationError::BadExtrinsicHash);
    }

    let validators = if is_new_epoch {
        staged.safrole().next_validators.as_slice()
    } else {
        staged.active_validators().as_slice()
    };
    let author = validators
        .get(header.author_index as usize)
        .ok_or(HeaderValidationError::BadAuthorIndex(header.author_index))?;

    let eta_prime = effective_entropy(&staged.base().entropy, is_new_epoch);
    let effective_keys = effective_sealing_keys(staged, is_new_epoch, epoch_successfully_contested);
    let assignment = resolve_slot_assignment(&effective_keys, slot_in_epoch);

    let unsigned_message = header.unsigned_encoding();

    let (seal_context, expected_ticket_id) = match &assignment {
        SlotAssignment::Ticket(ticket) => {
            let mut context = Vec::with_capacity(TICKET_SEAL_PREFIX.len() + 32 + 1);
            context.extend_from_slice(TICKET_SEAL_PREFIX);
            context.extend_from_slice(eta_prime[3].as_bytes());
            context.push(ticket.attempt);
            (context, Some(ticket.id))
        }
        SlotAssignment::Fallback => {
            if !is_first_epoch && header.author_index
                != derive_fallback_author(eta_prime[2], slot_in_epoch, validators.len() as u32)
            {
                return Err(HeaderValidationError::WrongFallbackAuthor);
            }
            let mut context = Vec::with_capacity(FALLBACK_SEAL_PREFIX.len() + 32);
            context.extend_from_slice(FALLBACK_SEAL_PREFIX);
            context.extend_from_slice(eta_prime[3].as_bytes());
            (context, None)
        }
    };

    let seal_task = || -> Result<[u8; 32], HeaderValidationError> {
        vrf::verify_vrf(&author.bandersnatch, &seal_context, &unsigned_message, &header.seal)
            .map_err(HeaderValidationError::TicketSealFailed)
    };

    let entropy_task = |seal_output_for_context: [u8; 32]| -> Result<[u8; 32], HeaderValidationError> {
        let mut context = Vec::with_capacity(ENTROPY_SOURCE_CONTEXT.len() + 32);
        context.extend_from_slice(ENTROPY_SOURCE_CONTEXT);
        context.extend_from_slice(&seal_output_for_context);
        vrf::verify_vrf(&author.bandersnatch, &context, &[], &header.entropy_source)
            .map_err(HeaderValidationError::EntropySourceFailed)
    };

    // The entropy-source context depends on the seal's VRF output, so the
    // two verifications are not fully independent in this implementation;
    // we still run them through the WorkGroup contract, computing the
    // seal first and handing its output to the second task's closure.
    let seal_output = seal_task()?;
    let (seal_output, entropy_source_output) = join_results(
        executor,
        || Ok::<_, HeaderValidationError>(seal_output),
        || entropy_task(seal_output),
    )?;

    if let Some(expected_id) = expected_ticket_id {
        if seal_output != *expected_id.0.as_bytes() {
            return Err(HeaderValidationError::TicketIdMismatch);
        }
    }

    if header.epoch_mark.is_some() != is_new_epoch {
        return Err(HeaderValidationError::BadEpochMarkerTiming);
    }

    let tickets_mark_expected = is_new_epoch && epoch_successfully_contested;
    if header.tickets_mark.is_some() != tickets_mark_expected {
        return Err(HeaderValidationError::BadTicketsMarkerTiming);
    }

    let _ = params;
    let consumed_ticket = match assignment {
        SlotAssignment::Ticket(t) => Some(*t),
        SlotAssignment::Fallback => None,
    };

    Ok(HeaderValidationOutcome {
        seal_output,
        entropy_source_output,
        consumed_ticket,
    })
}

/// Chooses which sealing-key sequence governs this slot, accounting for a
/// just-contested epoch whose outside-in sequence has not yet been
/// committed to γ.s by the Safrole epoch transition proper (spec.md §4.4
/// step 2: "if the block sits on the epoch boundary following a
/// 'successful contest'... use the outside-in reordering of γ.a as the
/// ticket sequence"). `run_epoch_transition` only writes that reordering
/// into γ.s *after* header validation has already run, so on a
/// contest-boundary block this function must derive it here rather than
/// read the not-yet-updated γ.s.
fn effective_sealing_keys(
    staged: &StagedState,
    is_new_epoch: bool,
    epoch_successfully_contested: bool,
) -> SealingKeys {
    if is_new_epoch && epoch_successfully_contested {
        SealingKeys::Tickets(outside_in_sequence(&staged.safrole().ticket_accumulator))
    } else {
        staged.safrole().sealing_keys.clone()
    }
}
