//! Reports — guarantee validation (spec.md §4.5): the largest single
//! per-block rule set. Accepted guarantees become ρ's new pending-report
//! occupants; assurances.rs later promotes them to ready-for-accumulation.

use crate::common::signatures::verify_ed25519;
use crate::staged_state::StagedState;
use jam_types::{Guarantee, Hash32, Parameters, PendingReport, Slot, ValidatorKeys, WorkOutput};

const MAX_REPORT_BYTES: usize = 48 * 1024;
const GUARANTEE_CONTEXT: &[u8] = b"jam_guarantee";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    #[error("duplicate work package hash within the extrinsic")]
    DuplicatePackage,
    #[error("guarantees are not strictly ascending by core index")]
    OutOfOrderGuarantee,
    #[error("core index {0} is out of range")]
    BadCoreIndex(u32),
    #[error("work report exceeds the maximum encoded size")]
    WorkReportTooBig,
    #[error("work report's total accumulate gas exceeds the per-report cap")]
    WorkReportGasTooHigh,
    #[error("work report names more dependencies than allowed")]
    TooManyDependencies,
    #[error("guarantee slot is in the future")]
    FutureReportSlot,
    #[error("guarantee slot predates the last rotation period")]
    ReportEpochBeforeLast,
    #[error("anchor header hash is not present in recent history")]
    AnchorNotRecent,
    #[error("anchor state root does not match recent history")]
    BadStateRoot,
    #[error("guarantee carries an insufficient number of signatures")]
    InsufficientGuarantees,
    #[error("guarantee carries more signatures than allowed")]
    TooManyGuarantees,
    #[error("guarantor validator indices are not sorted or unique")]
    NotSortedOrUniqueGuarantors,
    #[error("guarantor validator index {0} is out of range")]
    BadValidatorIndex(u32),
    #[error("validator {0} is not an assigned guarantor for this core at this rotation")]
    WrongAssignment(u32),
    #[error("guarantee signature did not verify")]
    BadSignature,
    #[error("work result names an unknown service id {0}")]
    BadServiceId(u32),
    #[error("work result's code hash does not match the service's code hash")]
    BadCodeHash,
    #[error("work result's accumulate gas is below the service's minimum")]
    ServiceItemGasTooLow,
    #[error("a named dependency is not available in recent history or this extrinsic")]
    DependencyMissing,
    #[error("core is already engaged by a report that has not yet timed out")]
    CoreEngaged,
    #[error("authorizer is not in this core's authorization pool")]
    CoreUnauthorized,
}

/// What a successful pass of `process_reports` produced, threaded onward to
/// statistics accounting (spec.md §4.12).
pub struct ReportsOutcome {
    pub accepted_package_hashes: Vec<Hash32>,
    pub reporters: Vec<u32>,
}

/// Which band of cores a validator is assigned to guarantee for at a given
/// rotation. Validators are split into `core_count` contiguous bands of the
/// active set, rotated by `rotation_index` positions each rotation period
/// (spec.md §4.5 "assigned guarantor for core_index at the report's
/// rotation"; the precise shuffle algorithm is left to the collaborator
/// that assigns cores, which this mirrors at the granularity the guarantee
/// rule needs).
fn assigned_core(validator_index: u32, rotation_index: u64, validator_count: u32, core_count: u32) -> u32 {
    if validator_count == 0 || core_count == 0 {
        return 0;
    }
    let shifted = (validator_index as u64 + rotation_index) % validator_count as u64;
    ((shifted * core_count as u64) / validator_count as u64) as u32
}

#[tracing::instrument(level = "debug", skip_all)]
pub fn process_reports(
    staged: &mut StagedState,
    params: &Parameters,
    guarantees: &[Guarantee],
    current_slot: Slot,
) -> Result<ReportsOutcome, ReportError> {
    let core_count = staged.base().core_count();

    let mut package_hashes: Vec<Hash32> = guarantees
        .iter()
        .map(|g| g.report.package_spec.package_hash)
        .collect();
    package_hashes.sort();
    for pair in package_hashes.windows(2) {
        if pair[0] == pair[1] {
            return Err(ReportError::DuplicatePackage);
        }
    }
    for entry in staged.recent_history() {
        for hash in &entry.work_package_hashes {
            if package_hashes.binary_search(hash).is_ok() {
                return Err(ReportError::DuplicatePackage);
            }
        }
    }

    let known_dependencies: std::collections::BTreeSet<Hash32> = staged
        .recent_history()
        .iter()
        .flat_map(|entry| entry.work_package_hashes.iter().copied())
        .chain(package_hashes.iter().copied())
        .collect();

    let current_rotation = current_slot.as_u64() / params.rotation_period.max(1);

    let mut last_core_index: Option<u32> = None;
    let mut accepted_package_hashes = Vec::new();
    let mut reporters = Vec::new();

    for guarantee in guarantees {
        let report = &guarantee.report;
        let core_index = report.core_index;

        if core_index >= core_count as u32 {
            return Err(ReportError::BadCoreIndex(core_index));
        }
        if let Some(last) = last_core_index {
            if core_index <= last {
                return Err(ReportError::OutOfOrderGuarantee);
            }
        }
        last_core_index = Some(core_index);

        let output_bytes = report.auth_output.len()
            + report
                .results
                .iter()
                .map(|r| match &r.output {
                    WorkOutput::Ok(bytes) => bytes.len(),
                    _ => 0,
                })
                .sum::<usize>();
        if output_bytes > MAX_REPORT_BYTES {
            return Err(ReportError::WorkReportTooBig);
        }

        let per_report_gas_cap = params
            .accumulate_gas_per_service
            .saturating_mul(report.results.len().max(1) as u64);
        let total_gas = report
            .total_accumulate_gas()
            .ok_or(ReportError::WorkReportGasTooHigh)?;
        if total_gas > per_report_gas_cap {
            return Err(ReportError::WorkReportGasTooHigh);
        }

        if report.dependencies.len() > params.max_dependencies {
            return Err(ReportError::TooManyDependencies);
        }

        if guarantee.slot.as_u64() > current_slot.as_u64() {
            return Err(ReportError::FutureReportSlot);
        }
        let earliest_allowed_rotation = current_rotation.saturating_sub(1);
        if guarantee.slot.as_u64() / params.rotation_period.max(1) < earliest_allowed_rotation {
            return Err(ReportError::ReportEpochBeforeLast);
        }

        let anchor_entry = staged
            .recent_history()
            .iter()
            .find(|entry| entry.header_hash == report.context.anchor_header_hash)
            .ok_or(ReportError::AnchorNotRecent)?;
        if anchor_entry.state_root != report.context.anchor_state_root {
            return Err(ReportError::BadStateRoot);
        }

        if guarantee.signatures.len() < 2 {
            return Err(ReportError::InsufficientGuarantees);
        }
        if guarantee.signatures.len() > 3 {
            return Err(ReportError::TooManyGuarantees);
        }

        let guarantee_rotation = guarantee.slot.as_u64() / params.rotation_period.max(1);
        let guarantor_pool: &Vec<ValidatorKeys> = if guarantee_rotation == current_rotation {
            staged.active_validators()
        } else {
            &staged.base().previous_validators
        };

        let message = {
            let mut m = Vec::with_capacity(GUARANTEE_CONTEXT.len() + 32);
            m.extend_from_slice(GUARANTEE_CONTEXT);
            m.extend_from_slice(report.hash().as_bytes());
            m
        };

        let mut last_signer: Option<u32> = None;
        for signature in &guarantee.signatures {
            if let Some(last) = last_signer {
                if signature.validator_index <= last {
                    return Err(ReportError::NotSortedOrUniqueGuarantors);
                }
            }
            last_signer = Some(signature.validator_index);

            let validator = guarantor_pool
                .get(signature.validator_index as usize)
                .ok_or(ReportError::BadValidatorIndex(signature.validator_index))?;

            if assigned_core(
                signature.validator_index,
                guarantee_rotation,
                guarantor_pool.len() as u32,
                core_count as u32,
            ) != core_index
            {
                return Err(ReportError::WrongAssignment(signature.validator_index));
            }

            if !verify_ed25519(&validator.ed25519, &message, &signature.signature) {
                return Err(ReportError::BadSignature);
            }
        }

        for result in &report.results {
            let service = staged
                .services()
                .get(&result.service_id)
                .ok_or(ReportError::BadServiceId(result.service_id))?;
            if service.code_hash != result.code_hash {
                return Err(ReportError::BadCodeHash);
            }
            if result.accumulate_gas < service.min_gas_accumulate {
                return Err(ReportError::ServiceItemGasTooLow);
            }
        }

        for dependency in &report.dependencies {
            if !known_dependencies.contains(&dependency.report_hash) {
                return Err(ReportError::DependencyMissing);
            }
        }

        let occupant_free = match &staged.pending_reports()[core_index as usize] {
            None => true,
            Some(pending) => {
                current_slot.as_u64().saturating_sub(pending.guaranteed_at.as_u64())
                    >= params.rotation_period
            }
        };
        if !occupant_free {
            return Err(ReportError::CoreEngaged);
        }

        if !staged.auth_pools()[core_index as usize].contains(&report.authorizer_hash) {
            return Err(ReportError::CoreUnauthorized);
        }

        let authorizer_hash = report.authorizer_hash;
        let package_hash = report.package_spec.package_hash;
        let pending = PendingReport {
            report: report.clone(),
            guaranteed_at: current_slot,
        };

        staged.pending_reports_mut()[core_index as usize] = Some(pending);
        staged.auth_pools_mut()[core_index as usize].retain(|hash| *hash != authorizer_hash);

        accepted_package_hashes.push(package_hash);
        reporters.extend(guarantee.signatures.iter().map(|s| s.validator_index));
    }

    Ok(ReportsOutcome {
        accepted_package_hashes,
        reporters,
    })
}
