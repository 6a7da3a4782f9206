use crate::slot::Slot;

/// The historical availability status of one preimage lookup entry
/// (spec.md §4.8). A preimage moves `Requested` -> `Available` ->
/// (optionally) `Unavailable` -> `Available` again at most once more before
/// settling, so at most three timeslots are ever retained.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PreimageStatus {
    /// Requested by a service but not yet supplied.
    Requested,
    /// Supplied at `since` and continuously available since.
    Available { since: Slot },
    /// Was available from `since` until `until`, then forgotten.
    Unavailable { since: Slot, until: Slot },
    /// Available again from `reavailable_since`, having previously been
    /// available during `[since, until)`.
    Reavailable {
        since: Slot,
        until: Slot,
        reavailable_since: Slot,
    },
}

impl PreimageStatus {
    /// Whether a *historical* lookup against this entry at `slot` would
    /// succeed (spec.md §4.8: "returns the preimage iff t lies in an
    /// 'available' interval defined by the status") — this includes past
    /// availability windows that have since been forgotten, not just
    /// whether the entry is available right now.
    pub fn is_available_at(&self, slot: Slot) -> bool {
        let t = slot.as_u64();
        match self {
            PreimageStatus::Requested => false,
            PreimageStatus::Available { since } => t >= since.as_u64(),
            PreimageStatus::Unavailable { since, until } => {
                t >= since.as_u64() && t < until.as_u64()
            }
            PreimageStatus::Reavailable {
                since,
                until,
                reavailable_since,
            } => (t >= since.as_u64() && t < until.as_u64()) || t >= reavailable_since.as_u64(),
        }
    }

    /// Whether this entry is eligible to be expunged from δ's preimage
    /// lookup map once lookback beyond `D` slots (spec.md §4.8).
    pub fn is_expungeable(&self, current_slot: Slot, expunge_period: u64) -> bool {
        let until = match self {
            PreimageStatus::Unavailable { until, .. } => *until,
            _ => return false,
        };
        current_slot
            .as_u64()
            .saturating_sub(until.as_u64())
            >= expunge_period
    }
}
