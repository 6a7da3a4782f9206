//! Time (spec.md §4.2): derives epoch/slot-in-epoch/rotation quantities
//! from τ and the incoming header slot, and advances τ′.

use crate::staged_state::StagedState;
use jam_types::{Epoch, Parameters, Slot};
use safe_arith::SafeArith;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum TimeError {
    #[error("header slot {incoming:?} is not strictly greater than current slot {current:?}")]
    BadSlot { current: Slot, incoming: Slot },
    #[error("arithmetic error: {0:?}")]
    Arith(safe_arith::ArithError),
}

impl From<safe_arith::ArithError> for TimeError {
    fn from(e: safe_arith::ArithError) -> Self {
        TimeError::Arith(e)
    }
}

/// The derived-quantities bundle §4.2 promises callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSummary {
    pub epoch: Epoch,
    pub slot_in_epoch: u32,
    pub is_new_epoch: bool,
    pub is_consecutive_epoch: bool,
    pub rotation_period_advanced: bool,
}

/// Validates `incoming_slot` against τ, sets τ′ = `incoming_slot`, and
/// returns the derived quantities the rest of the transition consumes.
#[tracing::instrument(level = "debug", skip_all, fields(incoming_slot = incoming_slot.as_u64()))]
pub fn process_time(
    state: &mut StagedState,
    params: &Parameters,
    incoming_slot: Slot,
) -> Result<TimeSummary, TimeError> {
    let current = *state.slot();
    if incoming_slot.as_u64() <= current.as_u64() {
        return Err(TimeError::BadSlot {
            current,
            incoming: incoming_slot,
        });
    }

    let epoch = incoming_slot.epoch(params.epoch_length)?;
    let prior_epoch = current.epoch(params.epoch_length)?;
    let slot_in_epoch = incoming_slot.slot_in_epoch(params.epoch_length)?;
    let is_new_epoch = epoch.as_u64() > prior_epoch.as_u64();
    let is_consecutive_epoch = epoch.as_u64() == prior_epoch.safe_add(1)?.as_u64();

    let current_rotation = current.as_u64().safe_div(params.rotation_period)?;
    let incoming_rotation = incoming_slot.as_u64().safe_div(params.rotation_period)?;
    let rotation_period_advanced = incoming_rotation > current_rotation;

    *state.slot_mut() = incoming_slot;

    Ok(TimeSummary {
        epoch,
        slot_in_epoch,
        is_new_epoch,
        is_consecutive_epoch,
        rotation_period_advanced,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jam_types::{DisputesState, Privileges, SafroleState, SealingKeys, State};
    use std::collections::BTreeMap;

    fn base_state(slot: u64) -> State {
        State {
            auth_pools: vec![],
            recent_history: vec![],
            safrole: SafroleState {
                sealing_keys: SealingKeys::Fallback(vec![]),
                ticket_accumulator: vec![],
                ring_commitment: vec![],
                next_validators: vec![],
            },
            services: BTreeMap::new(),
            entropy: [jam_types::Hash32::zero(); 4],
            next_validators: vec![],
            active_validators: vec![],
            previous_validators: vec![],
            pending_reports: vec![],
            slot: Slot::new(slot),
            auth_queue: vec![],
            privileges: Privileges::default(),
            disputes: DisputesState::default(),
            statistics: vec![],
            accumulated_history: vec![],
            accumulation_queue: vec![],
        }
    }

    #[test]
    fn non_increasing_slot_is_rejected() {
        let base = base_state(10);
        let mut staged = StagedState::new(&base);
        let params = Parameters::tiny();
        let err = process_time(&mut staged, &params, Slot::new(10)).unwrap_err();
        assert_eq!(
            err,
            TimeError::BadSlot {
                current: Slot::new(10),
                incoming: Slot::new(10)
            }
        );
    }

    #[test]
    fn epoch_boundary_is_detected() {
        let params = Parameters::tiny();
        let base = base_state(params.epoch_length - 1);
        let mut staged = StagedState::new(&base);
        let summary = process_time(&mut staged, &params, Slot::new(params.epoch_length)).unwrap();
        assert!(summary.is_new_epoch);
        assert!(summary.is_consecutive_epoch);
        assert_eq!(summary.slot_in_epoch, 0);
        assert_eq!(staged.slot(), &Slot::new(params.epoch_length));
    }

    #[test]
    fn mid_epoch_slot_is_not_a_new_epoch() {
        let params = Parameters::tiny();
        let base = base_state(1);
        let mut staged = StagedState::new(&base);
        let summary = process_time(&mut staged, &params, Slot::new(2)).unwrap();
        assert!(!summary.is_new_epoch);
    }
}
