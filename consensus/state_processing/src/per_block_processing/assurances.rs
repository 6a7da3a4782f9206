//! Assurances (spec.md §4.6): tallies each core's confirming-validator
//! count from the assurances extrinsic, promotes cores that cross the
//! super-majority threshold to "ready for accumulation", and drops timed
//! out occupants. Produces ρ‡ and the block's ready-report list in the
//! pipeline's terms (spec.md §2).

use crate::common::signatures::verify_ed25519;
use jam_types::{Assurance, Hash32, Parameters, PendingReport, Slot, WorkReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AssuranceError {
    #[error("assurance anchor does not match the parent block hash")]
    BadAnchor,
    #[error("assurance validator index {0} is out of range")]
    BadValidatorIndex(u32),
    #[error("assurances are not strictly ascending by validator index")]
    NotSortedOrUnique,
    #[error("assurance bitfield length does not match core_count")]
    BadBitfieldLength,
    #[error("assurance signature did not verify")]
    BadSignature,
    #[error("assurance attests core {0} which has no pending report")]
    BadBitfieldForFreeCore(u32),
}

const ASSURANCE_CONTEXT: &[u8] = b"jam_assurance";

/// The reports that attained availability this block, ready to feed
/// accumulation (spec.md §4.7).
pub struct AssurancesOutcome {
    pub ready_reports: Vec<WorkReport>,
}

/// Validates the assurances extrinsic and updates ρ (spec.md §4.6).
#[tracing::instrument(level = "debug", skip_all)]
pub fn process_assurances(
    staged: &mut crate::staged_state::StagedState,
    params: &Parameters,
    assurances: &[Assurance],
    parent_hash: Hash32,
    current_slot: Slot,
) -> Result<AssurancesOutcome, AssuranceError> {
    let core_count = staged.base().core_count();
    let bitfield_len = core_count.div_ceil(8);
    let validators = staged.active_validators().clone();

    let mut last_index: Option<u32> = None;
    let mut confirmations = vec![0u32; core_count];

    for assurance in assurances {
        if assurance.anchor != parent_hash {
            return Err(AssuranceError::BadAnchor);
        }
        if let Some(last) = last_index {
            if assurance.validator_index <= last {
                return Err(AssuranceError::NotSortedOrUnique);
            }
        }
        last_index = Some(assurance.validator_index);

        let validator = validators
            .get(assurance.validator_index as usize)
            .ok_or(AssuranceError::BadValidatorIndex(assurance.validator_index))?;

        if assurance.bitfield.len() != bitfield_len {
            return Err(AssuranceError::BadBitfieldLength);
        }

        let mut message = Vec::with_capacity(ASSURANCE_CONTEXT.len() + 32);
        message.extend_from_slice(ASSURANCE_CONTEXT);
        message.extend_from_slice(assurance.anchor.as_bytes());
        if !verify_ed25519(&validator.ed25519, &message, &assurance.signature) {
            return Err(AssuranceError::BadSignature);
        }

        for core_index in 0..core_count as u32 {
            if assurance.attests_core(core_index) {
                if staged.pending_reports()[core_index as usize].is_none() {
                    return Err(AssuranceError::BadBitfieldForFreeCore(core_index));
                }
                confirmations[core_index as usize] += 1;
            }
        }
    }

    let mut ready_reports = Vec::new();
    for (core_index, pending_slot) in staged.pending_reports_mut().iter_mut().enumerate() {
        let Some(pending) = pending_slot.as_ref() else {
            continue;
        };

        if confirmations[core_index] >= params.supermajority {
            ready_reports.push(pending.report.clone());
            *pending_slot = None;
        } else if timed_out(pending, current_slot, params.rotation_period) {
            *pending_slot = None;
        }
    }

    Ok(AssurancesOutcome { ready_reports })
}

fn timed_out(pending: &PendingReport, current_slot: Slot, replacement_period: u64) -> bool {
    current_slot.as_u64().saturating_sub(pending.guaranteed_at.as_u64()) >= replacement_period
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staged_state::StagedState;
    use jam_types::{
        DisputesState, HistoryEntry, Privileges, RefinementContext, SafroleState, SealingKeys,
        ServiceAccount, State, ValidatorKeys, ValidatorStatistics, WorkPackageSpec,
    };
    use sp_core::{ed25519, Pair};
    use std::collections::BTreeMap;

    fn sample_validators(n: usize) -> (Vec<ed25519::Pair>, Vec<ValidatorKeys>) {
        let pairs: Vec<_> = (0..n)
            .map(|i| ed25519::Pair::from_seed(&[i as u8 + 1; 32]))
            .collect();
        let keys = pairs
            .iter()
            .map(|p| {
                let mut k = ValidatorKeys::null();
                k.ed25519 = p.public().0;
                k
            })
            .collect();
        (pairs, keys)
    }

    fn sample_report() -> WorkReport {
        WorkReport {
            package_spec: WorkPackageSpec {
                package_hash: Hash32::from([1u8; 32]),
                length: 0,
                erasure_root: Hash32::zero(),
                exports_root: Hash32::zero(),
                exports_count: 0,
            },
            context: RefinementContext {
                anchor_header_hash: Hash32::zero(),
                anchor_state_root: Hash32::zero(),
                anchor_beefy_root: Hash32::zero(),
                lookup_anchor_hash: Hash32::zero(),
                lookup_anchor_slot: Slot::new(0),
            },
            core_index: 0,
            authorizer_hash: Hash32::zero(),
            auth_output: vec![],
            results: vec![],
            dependencies: vec![],
        }
    }

    fn base_state(validators: Vec<ValidatorKeys>, pending: Vec<Option<PendingReport>>) -> State {
        let core_count = pending.len();
        State {
            auth_pools: vec![vec![]; core_count],
            recent_history: Vec::<HistoryEntry>::new(),
            safrole: SafroleState {
                sealing_keys: SealingKeys::Fallback(vec![]),
                ticket_accumulator: vec![],
                ring_commitment: vec![],
                next_validators: vec![],
            },
            services: BTreeMap::<u32, ServiceAccount>::new(),
            entropy: [Hash32::zero(); 4],
            next_validators: vec![],
            active_validators: validators,
            previous_validators: vec![],
            pending_reports: pending,
            slot: Slot::new(0),
            auth_queue: vec![vec![]; core_count],
            privileges: Privileges::default(),
            disputes: DisputesState::default(),
            statistics: Vec::<ValidatorStatistics>::new(),
            accumulated_history: vec![],
            accumulation_queue: vec![],
        }
    }

    fn sign_assurance(pair: &ed25519::Pair, anchor: Hash32) -> [u8; 64] {
        let mut message = ASSURANCE_CONTEXT.to_vec();
        message.extend_from_slice(anchor.as_bytes());
        pair.sign(&message).0
    }

    #[test]
    fn supermajority_confirmation_promotes_report_to_ready() {
        let (pairs, keys) = sample_validators(6);
        let parent_hash = Hash32::from([2u8; 32]);
        let pending = vec![Some(PendingReport {
            report: sample_report(),
            guaranteed_at: Slot::new(1),
        })];
        let base = base_state(keys, pending);
        let mut staged = StagedState::new(&base);
        let params = Parameters::tiny();

        let assurances: Vec<Assurance> = pairs
            .iter()
            .take(5)
            .enumerate()
            .map(|(i, pair)| Assurance {
                anchor: parent_hash,
                validator_index: i as u32,
                bitfield: vec![0b0000_0001],
                signature: sign_assurance(pair, parent_hash),
            })
            .collect();

        let outcome =
            process_assurances(&mut staged, &params, &assurances, parent_hash, Slot::new(2)).unwrap();
        assert_eq!(outcome.ready_reports.len(), 1);
        assert!(staged.pending_reports()[0].is_none());
    }

    #[test]
    fn below_threshold_and_not_timed_out_stays_pending() {
        let (pairs, keys) = sample_validators(6);
        let parent_hash = Hash32::from([2u8; 32]);
        let pending = vec![Some(PendingReport {
            report: sample_report(),
            guaranteed_at: Slot::new(1),
        })];
        let base = base_state(keys, pending);
        let mut staged = StagedState::new(&base);
        let params = Parameters::tiny();

        let assurances: Vec<Assurance> = pairs
            .iter()
            .take(2)
            .enumerate()
            .map(|(i, pair)| Assurance {
                anchor: parent_hash,
                validator_index: i as u32,
                bitfield: vec![0b0000_0001],
                signature: sign_assurance(pair, parent_hash),
            })
            .collect();

        let outcome =
            process_assurances(&mut staged, &params, &assurances, parent_hash, Slot::new(2)).unwrap();
        assert!(outcome.ready_reports.is_empty());
        assert!(staged.pending_reports()[0].is_some());
    }

    #[test]
    fn mismatched_anchor_is_rejected() {
        let (pairs, keys) = sample_validators(6);
        let base = base_state(keys, vec![None]);
        let mut staged = StagedState::new(&base);
        let params = Parameters::tiny();
        let wrong_anchor = Hash32::from([9u8; 32]);
        let assurances = vec![Assurance {
            anchor: wrong_anchor,
            validator_index: 0,
            bitfield: vec![0],
            signature: sign_assurance(&pairs[0], wrong_anchor),
        }];
        let err = process_assurances(&mut staged, &params, &assurances, Hash32::from([2u8; 32]), Slot::new(2))
            .unwrap_err();
        assert_eq!(err, AssuranceError::BadAnchor);
    }
}
