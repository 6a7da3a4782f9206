use crate::dispute::DisputesState;
use crate::hash::Hash32;
use crate::safrole::SealingKeys;
use crate::service::ServiceAccount;
use crate::slot::Slot;
use crate::validator::ValidatorKeys;
use crate::work_report::WorkReport;
use std::collections::BTreeMap;

/// One entry of β, the recent-history ring (spec.md §4.9).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HistoryEntry {
    pub header_hash: Hash32,
    pub state_root: Hash32,
    pub accumulate_root: Hash32,
    pub work_package_hashes: Vec<Hash32>,
}

/// γ, the Safrole sub-state (spec.md §4.4): the next epoch's ticket/fallback
/// sealing keys, the in-progress ticket accumulator, and the Bandersnatch
/// ring commitment over κ.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SafroleState {
    pub sealing_keys: SealingKeys,
    pub ticket_accumulator: Vec<crate::safrole::TicketBody>,
    pub ring_commitment: Vec<u8>,
    pub next_validators: Vec<ValidatorKeys>,
}

/// One core's pending report awaiting availability (spec.md §4.5, §4.6):
/// ρ's per-core slot, `None` when the core is idle.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PendingReport {
    pub report: WorkReport,
    pub guaranteed_at: Slot,
}

/// π, per-validator activity counters reset each epoch (spec.md §4.12).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidatorStatistics {
    pub blocks_produced: u32,
    pub tickets_submitted: u32,
    pub preimages_submitted: u32,
    pub preimage_bytes_submitted: u64,
    pub guarantees_submitted: u32,
    pub assurances_submitted: u32,
}

/// χ, the privileged-service registry (spec.md §4.11): which services may
/// submit the blessed authorization queue and manager actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Privileges {
    pub manager: u32,
    pub assign: Vec<u32>,
    pub designate: u32,
    /// Services accumulated every block regardless of whether they have a
    /// ready report, each with a standing gas allowance (spec.md §3
    /// "always_accumulate: map ServiceId → gas").
    pub always_accumulate: BTreeMap<u32, u64>,
}

/// The complete protocol state σ (spec.md §3): every top-level component
/// named by the Greek-letter state vector. `StagedState` in
/// `state_processing` wraps each field in a copy-on-write overlay; this
/// struct is the plain, fully-materialized shape they stage over.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct State {
    /// α: per-core authorization pools.
    pub auth_pools: Vec<Vec<Hash32>>,
    /// β: recent-history ring, most recent last.
    pub recent_history: Vec<HistoryEntry>,
    /// γ: Safrole sub-state.
    pub safrole: SafroleState,
    /// δ: service accounts, keyed by service id.
    pub services: BTreeMap<u32, ServiceAccount>,
    /// η: four-deep entropy ring, `eta[0]` the most recent.
    pub entropy: [Hash32; 4],
    /// ι: the validator keys queued to become κ at the next epoch boundary.
    pub next_validators: Vec<ValidatorKeys>,
    /// κ: the active validator set.
    pub active_validators: Vec<ValidatorKeys>,
    /// λ: the previous epoch's active validator set, retained for dispute
    /// signature verification.
    pub previous_validators: Vec<ValidatorKeys>,
    /// ρ: per-core pending reports awaiting availability.
    pub pending_reports: Vec<Option<PendingReport>>,
    /// τ: the most recently processed slot.
    pub slot: Slot,
    /// φ: per-core authorization queues (the pool refills from here).
    pub auth_queue: Vec<Vec<Hash32>>,
    /// χ: privileged-service registry.
    pub privileges: Privileges,
    /// ψ: dispute resolution state.
    pub disputes: DisputesState,
    /// π: per-validator statistics, indexed by validator index.
    pub statistics: Vec<ValidatorStatistics>,
    /// ξ: ring of work-package hashes accumulated in recent history, used
    /// to reject duplicate accumulation (spec.md §4.7).
    pub accumulated_history: Vec<Vec<Hash32>>,
    /// θ: reports that have attained availability but whose dependencies
    /// are not yet satisfied, awaiting a future block's accumulation pass.
    pub accumulation_queue: Vec<Vec<WorkReport>>,
}

impl State {
    pub fn core_count(&self) -> usize {
        self.auth_pools.len()
    }
}
