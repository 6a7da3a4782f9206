use jam_types::{Hash32, Slot};

/// Read access to the invoked service's (and, for `HISTORICAL_LOOKUP`,
/// other services') storage, as the host functions would observe it
/// (spec.md §4.7, §6). Grouped as a trait so `state_processing` can hand
/// the PVM a narrow view over `StagedState` without leaking the overlay
/// machinery across the collaborator boundary.
pub trait StorageView {
    fn read(&self, service_id: u32, key: &Hash32) -> Option<Vec<u8>>;
}

/// Read access to preimage availability, used by `LOOKUP` and
/// `HISTORICAL_LOOKUP` host calls.
pub trait PreimageLookup {
    fn lookup(&self, service_id: u32, hash: &Hash32) -> Option<Vec<u8>>;
    fn is_available_at(&self, service_id: u32, hash: &Hash32, length: u32, slot: Slot) -> bool;
}

/// Read access to the privileged-service registry, used by `BLESS`,
/// `ASSIGN` and `DESIGNATE` permission checks.
pub trait PrivilegeView {
    fn is_manager(&self, service_id: u32) -> bool;
    fn is_assigner(&self, service_id: u32, core_index: u32) -> bool;
    fn is_designator(&self, service_id: u32) -> bool;
}

/// The combined view handed to `PvmHost::invoke`. Blanket-implemented for
/// any type that implements the three constituent traits, mirroring how
/// the sub-traits compose in the host-call surface this is grounded on.
pub trait HostAccessView: StorageView + PreimageLookup + PrivilegeView {}

impl<T: StorageView + PreimageLookup + PrivilegeView> HostAccessView for T {}
