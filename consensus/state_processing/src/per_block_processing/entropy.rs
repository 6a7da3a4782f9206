//! Entropy (spec.md §4.3): accumulates the per-block VRF output into η[0],
//! rotating the four-deep ring at epoch boundaries first.

use crate::staged_state::StagedState;
use jam_types::Hash32;

const ENTROPY_CONTEXT: &[u8] = b"jam_entropy";

/// `accumulate(prior, vrf_output) = blake2b256("jam_entropy" || prior || vrf_output)`
/// (spec.md §4.3).
fn accumulate(prior: Hash32, vrf_output: &[u8]) -> Hash32 {
    let mut buf = Vec::with_capacity(ENTROPY_CONTEXT.len() + 32 + vrf_output.len());
    buf.extend_from_slice(ENTROPY_CONTEXT);
    buf.extend_from_slice(prior.as_bytes());
    buf.extend_from_slice(vrf_output);
    Hash32::from(merkleization::blake2b_256(&buf))
}

/// Advances η given this block's entropy-source VRF output. On a new-epoch
/// block the ring is shifted before the new η′[0] is derived, so that
/// η′[1..3] reflect the epoch boundary and η′[0] is this block's fresh
/// contribution.
#[tracing::instrument(level = "debug", skip_all, fields(is_new_epoch))]
pub fn process_entropy(state: &mut StagedState, vrf_output: &[u8], is_new_epoch: bool) {
    let prior = *state.entropy();
    let ring = state.entropy_mut();

    if is_new_epoch {
        ring[3] = ring[2];
        ring[2] = ring[1];
        ring[1] = ring[0];
    }

    ring[0] = accumulate(prior[0], vrf_output);
}

#[cfg(test)]
mod tests {
    use super::*;
    use jam_types::{DisputesState, Privileges, SafroleState, SealingKeys, Slot, State};
    use std::collections::BTreeMap;

    fn base_state() -> State {
        State {
            auth_pools: vec![],
            recent_history: vec![],
            safrole: SafroleState {
                sealing_keys: SealingKeys::Fallback(vec![]),
                ticket_accumulator: vec![],
                ring_commitment: vec![],
                next_validators: vec![],
            },
            services: BTreeMap::new(),
            entropy: [
                Hash32::from([1u8; 32]),
                Hash32::from([2u8; 32]),
                Hash32::from([3u8; 32]),
                Hash32::from([4u8; 32]),
            ],
            next_validators: vec![],
            active_validators: vec![],
            previous_validators: vec![],
            pending_reports: vec![],
            slot: Slot::new(0),
            auth_queue: vec![],
            privileges: Privileges::default(),
            disputes: DisputesState::default(),
            statistics: vec![],
            accumulated_history: vec![],
            accumulation_queue: vec![],
        }
    }

    #[test]
    fn same_epoch_only_rewrites_slot_zero() {
        let base = base_state();
        let mut staged = StagedState::new(&base);
        process_entropy(&mut staged, b"vrf-output", false);
        let ring = staged.entropy();
        assert_ne!(ring[0], base.entropy[0]);
        assert_eq!(ring[1], base.entropy[1]);
        assert_eq!(ring[2], base.entropy[2]);
        assert_eq!(ring[3], base.entropy[3]);
    }

    #[test]
    fn new_epoch_shifts_ring_before_accumulating() {
        let base = base_state();
        let mut staged = StagedState::new(&base);
        process_entropy(&mut staged, b"vrf-output", true);
        let ring = staged.entropy();
        assert_eq!(ring[1], base.entropy[0]);
        assert_eq!(ring[2], base.entropy[1]);
        assert_eq!(ring[3], base.entropy[2]);
        assert_ne!(ring[0], base.entropy[0]);
    }

    #[test]
    fn accumulation_is_deterministic() {
        let base = base_state();
        let mut s1 = StagedState::new(&base);
        let mut s2 = StagedState::new(&base);
        process_entropy(&mut s1, b"same-input", false);
        process_entropy(&mut s2, b"same-input", false);
        assert_eq!(s1.entropy()[0], s2.entropy()[0]);
    }
}
