//! Authorization α, φ (spec.md §4.11): φ is a per-core ring of queued
//! authorizer hashes; α is a per-core bounded pool refilled from φ's head
//! each block. Guarantee acceptance (reports.rs) already removed each
//! core's consumed authorizer from α; this module only does the refill.

use crate::staged_state::StagedState;
use jam_types::Parameters;
use std::convert::Infallible;

pub type AuthorizationError = Infallible;

/// Rotates each core's authorization queue and tops its pool back up to
/// `auth_pool_size` (spec.md §4.11).
#[tracing::instrument(level = "debug", skip_all)]
pub fn process_authorization(staged: &mut StagedState, params: &Parameters) -> Result<(), AuthorizationError> {
    let core_count = staged.base().core_count();
    for core_index in 0..core_count {
        if staged.auth_queue()[core_index].is_empty() {
            continue;
        }

        let next_authorizer = staged.auth_queue_mut()[core_index].remove(0);
        let pool = &mut staged.auth_pools_mut()[core_index];
        pool.push(next_authorizer);
        let overflow = pool.len().saturating_sub(params.auth_pool_size);
        if overflow > 0 {
            pool.drain(0..overflow);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jam_types::{
        DisputesState, Hash32, Privileges, SafroleState, SealingKeys, ServiceAccount, Slot, State,
        ValidatorStatistics,
    };
    use std::collections::BTreeMap;

    fn base_state(auth_pools: Vec<Vec<Hash32>>, auth_queue: Vec<Vec<Hash32>>) -> State {
        let core_count = auth_pools.len();
        State {
            auth_pools,
            recent_history: vec![],
            safrole: SafroleState {
                sealing_keys: SealingKeys::Fallback(vec![]),
                ticket_accumulator: vec![],
                ring_commitment: vec![],
                next_validators: vec![],
            },
            services: BTreeMap::<u32, ServiceAccount>::new(),
            entropy: [Hash32::zero(); 4],
            next_validators: vec![],
            active_validators: vec![],
            previous_validators: vec![],
            pending_reports: vec![None; core_count],
            slot: Slot::new(0),
            auth_queue,
            privileges: Privileges::default(),
            disputes: DisputesState::default(),
            statistics: Vec::<ValidatorStatistics>::new(),
            accumulated_history: vec![],
            accumulation_queue: vec![],
        }
    }

    #[test]
    fn pool_is_refilled_from_the_queue_head() {
        let base = base_state(vec![vec![]], vec![vec![Hash32::from([1u8; 32]), Hash32::from([2u8; 32])]]);
        let mut staged = StagedState::new(&base);
        let mut params = Parameters::tiny();
        params.auth_pool_size = 8;

        process_authorization(&mut staged, &params).unwrap();
        assert_eq!(staged.auth_pools()[0], vec![Hash32::from([1u8; 32])]);
        assert_eq!(staged.auth_queue()[0], vec![Hash32::from([2u8; 32])]);
    }

    #[test]
    fn pool_beyond_capacity_drops_the_oldest() {
        let base = base_state(
            vec![vec![Hash32::from([1u8; 32]), Hash32::from([2u8; 32])]],
            vec![vec![Hash32::from([3u8; 32])]],
        );
        let mut staged = StagedState::new(&base);
        let mut params = Parameters::tiny();
        params.auth_pool_size = 2;

        process_authorization(&mut staged, &params).unwrap();
        assert_eq!(
            staged.auth_pools()[0],
            vec![Hash32::from([2u8; 32]), Hash32::from([3u8; 32])]
        );
    }

    #[test]
    fn empty_queue_leaves_pool_untouched() {
        let base = base_state(vec![vec![Hash32::from([1u8; 32])]], vec![vec![]]);
        let mut staged = StagedState::new(&base);
        let params = Parameters::tiny();
        process_authorization(&mut staged, &params).unwrap();
        assert_eq!(staged.auth_pools()[0], vec![Hash32::from([1u8; 32])]);
    }
}
