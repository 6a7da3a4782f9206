//! Recent history β (spec.md §4.9): an append-only bounded ring of recent
//! blocks, closed one block in arrears because a header commits to its
//! parent's post-state rather than its own.

use crate::staged_state::StagedState;
use jam_types::{Hash32, HistoryEntry, Parameters};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RecentHistoryError {
    #[error("recent history is empty but a parent entry was expected")]
    MissingParentEntry,
}

/// Closes the previous entry's state root with the parent's actual
/// post-state root (spec.md §4.9 "update the previous entry's state_root"),
/// then appends a fresh entry for the current block whose own state_root
/// is filled in by the *next* block.
#[tracing::instrument(level = "debug", skip_all)]
pub fn process_recent_history(
    staged: &mut StagedState,
    params: &Parameters,
    header_hash: Hash32,
    parent_post_state_root: Hash32,
    accumulate_root: Hash32,
    work_package_hashes: Vec<Hash32>,
) -> Result<(), RecentHistoryError> {
    if let Some(previous) = staged.recent_history_mut().last_mut() {
        previous.state_root = parent_post_state_root;
    } else if staged.base().slot.as_u64() != 0 {
        return Err(RecentHistoryError::MissingParentEntry);
    }

    staged.recent_history_mut().push(HistoryEntry {
        header_hash,
        state_root: Hash32::zero(),
        accumulate_root,
        work_package_hashes,
    });

    let max_len = params.recent_history_size;
    let overflow = staged.recent_history().len().saturating_sub(max_len);
    if overflow > 0 {
        staged.recent_history_mut().drain(0..overflow);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jam_types::{
        DisputesState, Privileges, SafroleState, SealingKeys, ServiceAccount, Slot, State,
        ValidatorStatistics,
    };
    use std::collections::BTreeMap;

    fn base_state(recent_history: Vec<HistoryEntry>, slot: u64) -> State {
        State {
            auth_pools: vec![],
            recent_history,
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
            pending_reports: vec![],
            slot: Slot::new(slot),
            auth_queue: vec![],
            privileges: Privileges::default(),
            disputes: DisputesState::default(),
            statistics: Vec::<ValidatorStatistics>::new(),
            accumulated_history: vec![],
            accumulation_queue: vec![],
        }
    }

    #[test]
    fn genesis_block_appends_without_a_prior_entry() {
        let base = base_state(vec![], 0);
        let mut staged = StagedState::new(&base);
        let params = Parameters::tiny();
        process_recent_history(
            &mut staged,
            &params,
            Hash32::from([1u8; 32]),
            Hash32::zero(),
            Hash32::from([2u8; 32]),
            vec![],
        )
        .unwrap();
        assert_eq!(staged.recent_history().len(), 1);
    }

    #[test]
    fn later_block_closes_the_previous_entrys_state_root() {
        let prior = HistoryEntry {
            header_hash: Hash32::from([9u8; 32]),
            state_root: Hash32::zero(),
            accumulate_root: Hash32::zero(),
            work_package_hashes: vec![],
        };
        let base = base_state(vec![prior], 5);
        let mut staged = StagedState::new(&base);
        let params = Parameters::tiny();
        let parent_root = Hash32::from([5u8; 32]);
        process_recent_history(
            &mut staged,
            &params,
            Hash32::from([1u8; 32]),
            parent_root,
            Hash32::from([2u8; 32]),
            vec![],
        )
        .unwrap();
        assert_eq!(staged.recent_history()[0].state_root, parent_root);
        assert_eq!(staged.recent_history().len(), 2);
    }

    #[test]
    fn ring_is_bounded_to_recent_history_size() {
        let mut params = Parameters::tiny();
        params.recent_history_size = 2;
        let prior = vec![
            HistoryEntry {
                header_hash: Hash32::from([1u8; 32]),
                state_root: Hash32::zero(),
                accumulate_root: Hash32::zero(),
                work_package_hashes: vec![],
            },
            HistoryEntry {
                header_hash: Hash32::from([2u8; 32]),
                state_root: Hash32::zero(),
                accumulate_root: Hash32::zero(),
                work_package_hashes: vec![],
            },
        ];
        let base = base_state(prior, 5);
        let mut staged = StagedState::new(&base);
        process_recent_history(
            &mut staged,
            &params,
            Hash32::from([3u8; 32]),
            Hash32::from([9u8; 32]),
            Hash32::zero(),
            vec![],
        )
        .unwrap();
        assert_eq!(staged.recent_history().len(), 2);
        assert_eq!(staged.recent_history()[0].header_hash, Hash32::from([2u8; 32]));
    }
}
