//! Disputes (ψ, spec.md §3, §4.6 "removes condemned reports from cores"):
//! classifies each verdict's report hash as good/bad/wonky by a
//! super-majority vote of judgements, records culprits/faults as offenders,
//! and clears any pending report on a core whose report was found bad or
//! wonky (producing ρ† in the pipeline's terms, spec.md §2).

use crate::common::signatures::verify_ed25519;
use crate::staged_state::StagedState;
use jam_types::{Culprit, DisputesExtrinsic, Fault, Hash32, Parameters, ValidatorKeys, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DisputeError {
    #[error("verdict for report {0:?} already has a classification")]
    AlreadyJudged(Hash32),
    #[error("verdict for report {0:?} carries no judgements")]
    EmptyJudgements(Hash32),
    #[error("verdict judgements are not strictly ascending by validator index")]
    JudgementsNotSortedOrUnique,
    #[error("judgement references out-of-range validator index {0}")]
    BadValidatorIndex(u32),
    #[error("judgement signature did not verify")]
    BadJudgementSignature,
    #[error("culprit names report {0:?} which was not found bad")]
    CulpritNotBad(Hash32),
    #[error("culprit signature did not verify")]
    BadCulpritSignature,
    #[error("fault names report {0:?} with no verdict classification")]
    FaultUnknownReport(Hash32),
    #[error("fault's recorded vote matches the report's actual classification")]
    FaultVoteMatchesVerdict,
    #[error("fault signature did not verify")]
    BadFaultSignature,
}

const JUDGEMENT_VALID_CONTEXT: &[u8] = b"jam_valid";
const JUDGEMENT_INVALID_CONTEXT: &[u8] = b"jam_invalid";
const CULPRIT_CONTEXT: &[u8] = b"jam_culprit";
const FAULT_CONTEXT: &[u8] = b"jam_fault";

/// Three-way outcome of a verdict's judgement tally (spec.md §3 "ψ...
/// three disjoint sets").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Classification {
    Good,
    Bad,
    Wonky,
}

fn classify(positive_votes: usize, total_votes: usize, supermajority: u32) -> Classification {
    let negative_votes = total_votes - positive_votes;
    if positive_votes as u32 >= supermajority {
        Classification::Good
    } else if negative_votes as u32 >= supermajority {
        Classification::Bad
    } else {
        Classification::Wonky
    }
}

fn judgement_message(report_hash: Hash32, valid: bool) -> Vec<u8> {
    let mut buf = Vec::with_capacity(16 + 32);
    buf.extend_from_slice(if valid {
        JUDGEMENT_VALID_CONTEXT
    } else {
        JUDGEMENT_INVALID_CONTEXT
    });
    buf.extend_from_slice(report_hash.as_bytes());
    buf
}

fn verify_verdict(
    verdict: &Verdict,
    validators: &[ValidatorKeys],
    supermajority: u32,
) -> Result<Classification, DisputeError> {
    if verdict.judgements.is_empty() {
        return Err(DisputeError::EmptyJudgements(verdict.report_hash));
    }

    let mut last_index: Option<u32> = None;
    for judgement in &verdict.judgements {
        if let Some(last) = last_index {
            if judgement.validator_index <= last {
                return Err(DisputeError::JudgementsNotSortedOrUnique);
            }
        }
        last_index = Some(judgement.validator_index);

        let validator = validators
            .get(judgement.validator_index as usize)
            .ok_or(DisputeError::BadValidatorIndex(judgement.validator_index))?;

        let message = judgement_message(verdict.report_hash, judgement.valid);
        if !verify_ed25519(&validator.ed25519, &message, &judgement.signature) {
            return Err(DisputeError::BadJudgementSignature);
        }
    }

    Ok(classify(
        verdict.positive_votes(),
        verdict.judgements.len(),
        supermajority,
    ))
}

fn verify_culprit(culprit: &Culprit) -> bool {
    let mut message = Vec::with_capacity(CULPRIT_CONTEXT.len() + 32);
    message.extend_from_slice(CULPRIT_CONTEXT);
    message.extend_from_slice(culprit.report_hash.as_bytes());
    verify_ed25519(&culprit.validator_key, &message, &culprit.signature)
}

fn verify_fault(fault: &Fault) -> bool {
    let mut message = Vec::with_capacity(FAULT_CONTEXT.len() + 33);
    message.extend_from_slice(FAULT_CONTEXT);
    message.extend_from_slice(fault.report_hash.as_bytes());
    message.push(fault.vote as u8);
    verify_ed25519(&fault.validator_key, &message, &fault.signature)
}

/// Applies the disputes extrinsic to ψ, and clears any pending report whose
/// hash was found bad or wonky from ρ (spec.md §4.6, §2).
#[tracing::instrument(level = "debug", skip_all)]
pub fn process_disputes(
    staged: &mut StagedState,
    params: &Parameters,
    extrinsic: &DisputesExtrinsic,
) -> Result<(), DisputeError> {
    let validators = staged.active_validators().clone();

    let mut condemned: Vec<Hash32> = Vec::new();

    for verdict in &extrinsic.verdicts {
        let disputes = staged.disputes();
        if disputes.good.contains(&verdict.report_hash)
            || disputes.bad.contains(&verdict.report_hash)
            || disputes.wonky.contains(&verdict.report_hash)
        {
            return Err(DisputeError::AlreadyJudged(verdict.report_hash));
        }

        let classification = verify_verdict(verdict, &validators, params.supermajority)?;

        let disputes = staged.disputes_mut();
        match classification {
            Classification::Good => {
                disputes.good.insert(verdict.report_hash);
            }
            Classification::Bad => {
                disputes.bad.insert(verdict.report_hash);
                condemned.push(verdict.report_hash);
            }
            Classification::Wonky => {
                disputes.wonky.insert(verdict.report_hash);
                condemned.push(verdict.report_hash);
            }
        }
    }

    for culprit in &extrinsic.culprits {
        if !staged.disputes().bad.contains(&culprit.report_hash) {
            return Err(DisputeError::CulpritNotBad(culprit.report_hash));
        }
        if !verify_culprit(culprit) {
            return Err(DisputeError::BadCulpritSignature);
        }
        staged.disputes_mut().offenders.insert(culprit.validator_key);
    }

    for fault in &extrinsic.faults {
        let disputes = staged.disputes();
        let actual_valid = if disputes.good.contains(&fault.report_hash) {
            true
        } else if disputes.bad.contains(&fault.report_hash) {
            false
        } else {
            return Err(DisputeError::FaultUnknownReport(fault.report_hash));
        };
        if fault.vote == actual_valid {
            return Err(DisputeError::FaultVoteMatchesVerdict);
        }
        if !verify_fault(fault) {
            return Err(DisputeError::BadFaultSignature);
        }
        staged.disputes_mut().offenders.insert(fault.validator_key);
    }

    if !condemned.is_empty() {
        for slot in staged.pending_reports_mut().iter_mut() {
            let drop = slot
                .as_ref()
                .is_some_and(|pending| condemned.contains(&pending.report.hash()));
            if drop {
                *slot = None;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jam_types::{DisputesState, Epoch, HistoryEntry, Judgement, PendingReport, Privileges, SafroleState, SealingKeys, ServiceAccount, Slot, State, ValidatorStatistics, WorkOutput, WorkPackageSpec, WorkReport, RefinementContext};
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

    fn base_state(validators: Vec<ValidatorKeys>, core_count: usize) -> State {
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
            pending_reports: vec![None; core_count],
            slot: Slot::new(0),
            auth_queue: vec![vec![]; core_count],
            privileges: Privileges::default(),
            disputes: DisputesState::default(),
            statistics: Vec::<ValidatorStatistics>::new(),
            accumulated_history: vec![],
            accumulation_queue: vec![],
        }
    }

    fn sample_report(core_index: u32) -> WorkReport {
        WorkReport {
            package_spec: WorkPackageSpec {
                package_hash: Hash32::from([core_index as u8 + 1; 32]),
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
            core_index,
            authorizer_hash: Hash32::zero(),
            auth_output: vec![],
            results: vec![],
            dependencies: vec![],
        }
    }

    fn sign_judgement(pair: &ed25519::Pair, report_hash: Hash32, valid: bool) -> [u8; 64] {
        pair.sign(&judgement_message(report_hash, valid)).0
    }

    #[test]
    fn unanimous_invalid_verdict_marks_report_bad_and_clears_pending_core() {
        let (pairs, keys) = sample_validators(6);
        let base = base_state(keys, 2);
        let mut staged = StagedState::new(&base);
        let report = sample_report(0);
        let report_hash = report.hash();
        *staged.pending_reports_mut() = vec![
            Some(PendingReport { report, guaranteed_at: Slot::new(1) }),
            None,
        ];

        let judgements = pairs
            .iter()
            .enumerate()
            .map(|(i, pair)| Judgement {
                validator_index: i as u32,
                valid: false,
                signature: sign_judgement(pair, report_hash, false),
            })
            .collect();
        let extrinsic = DisputesExtrinsic {
            verdicts: vec![Verdict { report_hash, epoch: Epoch::new(0), judgements }],
            culprits: vec![],
            faults: vec![],
        };

        let params = Parameters::tiny();
        process_disputes(&mut staged, &params, &extrinsic).unwrap();
        assert!(staged.disputes().bad.contains(&report_hash));
        assert!(staged.pending_reports()[0].is_none());
    }

    #[test]
    fn duplicate_verdict_is_rejected() {
        let (pairs, keys) = sample_validators(6);
        let base = base_state(keys, 2);
        let mut staged = StagedState::new(&base);
        let report_hash = Hash32::from([9u8; 32]);
        staged.disputes_mut().bad.insert(report_hash);

        let judgements = pairs
            .iter()
            .enumerate()
            .map(|(i, pair)| Judgement {
                validator_index: i as u32,
                valid: false,
                signature: sign_judgement(pair, report_hash, false),
            })
            .collect();
        let extrinsic = DisputesExtrinsic {
            verdicts: vec![Verdict { report_hash, epoch: Epoch::new(0), judgements }],
            culprits: vec![],
            faults: vec![],
        };
        let params = Parameters::tiny();
        let err = process_disputes(&mut staged, &params, &extrinsic).unwrap_err();
        assert_eq!(err, DisputeError::AlreadyJudged(report_hash));
    }

    #[test]
    fn culprit_for_a_good_report_is_rejected() {
        let (_pairs, keys) = sample_validators(6);
        let base = base_state(keys, 2);
        let mut staged = StagedState::new(&base);
        let report_hash = Hash32::from([3u8; 32]);
        staged.disputes_mut().good.insert(report_hash);

        let extrinsic = DisputesExtrinsic {
            verdicts: vec![],
            culprits: vec![Culprit {
                report_hash,
                validator_key: [0u8; 32],
                signature: [0u8; 64],
            }],
            faults: vec![],
        };
        let params = Parameters::tiny();
        let err = process_disputes(&mut staged, &params, &extrinsic).unwrap_err();
        assert_eq!(err, DisputeError::CulpritNotBad(report_hash));
    }
}
