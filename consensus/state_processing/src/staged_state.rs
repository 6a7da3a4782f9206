//! The copy-on-write staging container every sub-transition writes through
//! (spec.md §4.1). Each of σ's sixteen components gets its own lazy overlay:
//! reads fall through to the base state until the first write, at which
//! point the component is deep-cloned into the overlay and all further
//! reads/writes go through the clone. `commit` folds every touched overlay
//! back into a fresh `State`; `abort` just drops the staged container,
//! leaving the caller's base untouched.

use jam_types::{
    DisputesState, HistoryEntry, Privileges, SafroleState, ServiceAccount, Slot, State,
    ValidatorKeys, ValidatorStatistics, WorkReport,
};
use jam_types::hash::Hash32;
use std::collections::BTreeMap;

/// One component's copy-on-write slot (spec.md §4.1, §9: "implement this as
/// per-component sum variants {unchanged | owned_clone}").
#[derive(Debug)]
pub enum Overlay<T> {
    Unchanged,
    Owned(Box<T>),
}

impl<T> Default for Overlay<T> {
    fn default() -> Self {
        Overlay::Unchanged
    }
}

impl<T: Clone> Overlay<T> {
    fn read<'a>(&'a self, base: &'a T) -> &'a T {
        match self {
            Overlay::Unchanged => base,
            Overlay::Owned(owned) => owned,
        }
    }

    fn ensure_mut(&mut self, base: &T) -> &mut T {
        if matches!(self, Overlay::Unchanged) {
            *self = Overlay::Owned(Box::new(base.clone()));
        }
        match self {
            Overlay::Owned(owned) => owned,
            Overlay::Unchanged => unreachable!("just initialized above"),
        }
    }

    fn into_value(self, base: &T) -> T {
        match self {
            Overlay::Unchanged => base.clone(),
            Overlay::Owned(owned) => *owned,
        }
    }
}

macro_rules! staged_component {
    ($field:ident, $overlay:ident, $read:ident, $mut:ident, $ty:ty) => {
        pub fn $read(&self) -> &$ty {
            self.$overlay.read(&self.base.$field)
        }

        pub fn $mut(&mut self) -> &mut $ty {
            self.$overlay.ensure_mut(&self.base.$field)
        }
    };
}

/// The staged view over σ for the duration of one block transition. Every
/// sub-transition takes `&mut StagedState` and only touches the components
/// it owns (spec.md §5 "shared resource policy").
pub struct StagedState<'a> {
    base: &'a State,

    auth_pools: Overlay<Vec<Vec<Hash32>>>,
    recent_history: Overlay<Vec<HistoryEntry>>,
    safrole: Overlay<SafroleState>,
    services: Overlay<BTreeMap<u32, ServiceAccount>>,
    entropy: Overlay<[Hash32; 4]>,
    next_validators: Overlay<Vec<ValidatorKeys>>,
    active_validators: Overlay<Vec<ValidatorKeys>>,
    previous_validators: Overlay<Vec<ValidatorKeys>>,
    pending_reports: Overlay<Vec<Option<jam_types::PendingReport>>>,
    slot: Overlay<Slot>,
    auth_queue: Overlay<Vec<Vec<Hash32>>>,
    privileges: Overlay<Privileges>,
    disputes: Overlay<DisputesState>,
    statistics: Overlay<Vec<ValidatorStatistics>>,
    accumulated_history: Overlay<Vec<Vec<Hash32>>>,
    accumulation_queue: Overlay<Vec<Vec<WorkReport>>>,
}

impl<'a> StagedState<'a> {
    pub fn new(base: &'a State) -> Self {
        StagedState {
            base,
            auth_pools: Overlay::Unchanged,
            recent_history: Overlay::Unchanged,
            safrole: Overlay::Unchanged,
            services: Overlay::Unchanged,
            entropy: Overlay::Unchanged,
            next_validators: Overlay::Unchanged,
            active_validators: Overlay::Unchanged,
            previous_validators: Overlay::Unchanged,
            pending_reports: Overlay::Unchanged,
            slot: Overlay::Unchanged,
            auth_queue: Overlay::Unchanged,
            privileges: Overlay::Unchanged,
            disputes: Overlay::Unchanged,
            statistics: Overlay::Unchanged,
            accumulated_history: Overlay::Unchanged,
            accumulation_queue: Overlay::Unchanged,
        }
    }

    /// The untouched parent state. Sub-transitions may always read it
    /// directly when they need the pre-image rather than the in-progress
    /// posterior (spec.md §4.1 rationale note).
    pub fn base(&self) -> &State {
        self.base
    }

    staged_component!(auth_pools, auth_pools, auth_pools, auth_pools_mut, Vec<Vec<Hash32>>);
    staged_component!(recent_history, recent_history, recent_history, recent_history_mut, Vec<HistoryEntry>);
    staged_component!(safrole, safrole, safrole, safrole_mut, SafroleState);
    staged_component!(services, services, services, services_mut, BTreeMap<u32, ServiceAccount>);
    staged_component!(entropy, entropy, entropy, entropy_mut, [Hash32; 4]);
    staged_component!(next_validators, next_validators, next_validators, next_validators_mut, Vec<ValidatorKeys>);
    staged_component!(active_validators, active_validators, active_validators, active_validators_mut, Vec<ValidatorKeys>);
    staged_component!(previous_validators, previous_validators, previous_validators, previous_validators_mut, Vec<ValidatorKeys>);
    staged_component!(pending_reports, pending_reports, pending_reports, pending_reports_mut, Vec<Option<jam_types::PendingReport>>);
    staged_component!(slot, slot, slot, slot_mut, Slot);
    staged_component!(auth_queue, auth_queue, auth_queue, auth_queue_mut, Vec<Vec<Hash32>>);
    staged_component!(privileges, privileges, privileges, privileges_mut, Privileges);
    staged_component!(disputes, disputes, disputes, disputes_mut, DisputesState);
    staged_component!(statistics, statistics, statistics, statistics_mut, Vec<ValidatorStatistics>);
    staged_component!(accumulated_history, accumulated_history, accumulated_history, accumulated_history_mut, Vec<Vec<Hash32>>);
    staged_component!(accumulation_queue, accumulation_queue, accumulation_queue, accumulation_queue_mut, Vec<Vec<WorkReport>>);

    /// Folds every overlay back into a fresh, fully-materialized `State`
    /// (spec.md §4.1 "commit"). Consumes `self`; there is no path back to
    /// the staged view afterwards.
    pub fn commit(self) -> State {
        State {
            auth_pools: self.auth_pools.into_value(&self.base.auth_pools),
            recent_history: self.recent_history.into_value(&self.base.recent_history),
            safrole: self.safrole.into_value(&self.base.safrole),
            services: self.services.into_value(&self.base.services),
            entropy: self.entropy.into_value(&self.base.entropy),
            next_validators: self.next_validators.into_value(&self.base.next_validators),
            active_validators: self.active_validators.into_value(&self.base.active_validators),
            previous_validators: self
                .previous_validators
                .into_value(&self.base.previous_validators),
            pending_reports: self.pending_reports.into_value(&self.base.pending_reports),
            slot: self.slot.into_value(&self.base.slot),
            auth_queue: self.auth_queue.into_value(&self.base.auth_queue),
            privileges: self.privileges.into_value(&self.base.privileges),
            disputes: self.disputes.into_value(&self.base.disputes),
            statistics: self.statistics.into_value(&self.base.statistics),
            accumulated_history: self
                .accumulated_history
                .into_value(&self.base.accumulated_history),
            accumulation_queue: self
                .accumulation_queue
                .into_value(&self.base.accumulation_queue),
        }
    }

    /// Drops every overlay, releasing any cloned components without
    /// touching the base (spec.md §4.1 "abort"). Equivalent to just
    /// dropping `self`, spelled out for call-site clarity.
    pub fn abort(self) {
        drop(self)
    }
}
