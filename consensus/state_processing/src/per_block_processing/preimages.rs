//! Preimages (spec.md §4.8): the per-(hash, length) lookup lifecycle and
//! the preimage extrinsic's "provide" operation. `solicit_preimage` and
//! `forget_preimage` are also called directly by accumulation.rs, since
//! the PVM's `SOLICIT`/`FORGET` host calls drive the same state machine
//! (spec.md §4.7 `StateUpdate::SolicitPreimage`/`ForgetPreimage`).

use crate::staged_state::StagedState;
use jam_types::{Hash32, Parameters, PreimageExtrinsicEntry, PreimageStatus, ServiceAccount, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PreimageError {
    #[error("preimage extrinsic entries are not sorted or unique by (service, hash)")]
    NotSortedOrUnique,
    #[error("preimage names an unknown service id {0}")]
    UnknownService(u32),
    #[error("preimage was not solicited before being provided")]
    NotSolicited,
    #[error("preimage has already been provided")]
    AlreadyProvided,
    #[error("lookup entry is already in a solicited or available state")]
    AlreadySolicited,
    #[error("the lookup has no entry to forget")]
    NothingToForget,
    #[error("the expungement period has not yet elapsed")]
    ForgetTooSoon,
}

/// Registers a new solicitation against `(hash, length)` (spec.md §4.8
/// "Solicit"). No-op on success; fails if the lookup is already tracked in
/// a state solicitation cannot restart from.
pub fn solicit_preimage(service: &mut ServiceAccount, hash: Hash32, length: u32) -> Result<(), PreimageError> {
    let key = (hash, length);
    match service.preimage_status.get(&key) {
        None => {
            service.preimage_status.insert(key, PreimageStatus::Requested);
            Ok(())
        }
        Some(PreimageStatus::Unavailable { since, until }) => {
            let (since, until) = (*since, *until);
            service.preimage_status.insert(
                key,
                PreimageStatus::Reavailable {
                    since,
                    until,
                    reavailable_since: until,
                },
            );
            Ok(())
        }
        Some(_) => Err(PreimageError::AlreadySolicited),
    }
}

/// Withdraws a lookup entry (spec.md §4.8 "Forget").
pub fn forget_preimage(
    service: &mut ServiceAccount,
    hash: Hash32,
    length: u32,
    current_slot: Slot,
    expunge_period: u64,
) -> Result<(), PreimageError> {
    let key = (hash, length);
    let status = service
        .preimage_status
        .get(&key)
        .ok_or(PreimageError::NothingToForget)?;

    match status {
        PreimageStatus::Requested => {
            service.preimage_status.remove(&key);
            service.preimages.remove(&hash);
        }
        PreimageStatus::Available { since } => {
            let since = *since;
            service
                .preimage_status
                .insert(key, PreimageStatus::Unavailable { since, until: current_slot });
        }
        PreimageStatus::Unavailable { until, .. } => {
            if current_slot.as_u64().saturating_sub(until.as_u64()) < expunge_period {
                return Err(PreimageError::ForgetTooSoon);
            }
            service.preimage_status.remove(&key);
            service.preimages.remove(&hash);
        }
        PreimageStatus::Reavailable { until, reavailable_since, .. } => {
            if current_slot.as_u64().saturating_sub(until.as_u64()) < expunge_period {
                return Err(PreimageError::ForgetTooSoon);
            }
            let reavailable_since = *reavailable_since;
            service.preimage_status.insert(
                key,
                PreimageStatus::Unavailable {
                    since: reavailable_since,
                    until: current_slot,
                },
            );
        }
    }
    Ok(())
}

/// Validates and applies the preimage extrinsic's "provide" operation
/// (spec.md §4.8).
#[tracing::instrument(level = "debug", skip_all)]
pub fn process_preimages(
    staged: &mut StagedState,
    _params: &Parameters,
    entries: &[PreimageExtrinsicEntry],
    current_slot: Slot,
) -> Result<(), PreimageError> {
    let mut last_key: Option<(u32, Hash32)> = None;
    for entry in entries {
        let hash = Hash32::from(merkleization::blake2b_256(&entry.data));
        let key = (entry.service_id, hash);
        if let Some(last) = last_key {
            if key <= last {
                return Err(PreimageError::NotSortedOrUnique);
            }
        }
        last_key = Some(key);

        let length = entry.data.len() as u32;
        let service = staged
            .services_mut()
            .get_mut(&entry.service_id)
            .ok_or(PreimageError::UnknownService(entry.service_id))?;

        let status_key = (hash, length);
        match service.preimage_status.get(&status_key) {
            Some(PreimageStatus::Requested) => {
                service.preimages.insert(hash, entry.data.clone());
                service
                    .preimage_status
                    .insert(status_key, PreimageStatus::Available { since: current_slot });
            }
            Some(PreimageStatus::Unavailable { since, until }) => {
                let (since, until) = (*since, *until);
                service.preimages.insert(hash, entry.data.clone());
                service.preimage_status.insert(
                    status_key,
                    PreimageStatus::Reavailable {
                        since,
                        until,
                        reavailable_since: current_slot,
                    },
                );
            }
            Some(PreimageStatus::Available { .. }) | Some(PreimageStatus::Reavailable { .. }) => {
                return Err(PreimageError::AlreadyProvided);
            }
            None => return Err(PreimageError::NotSolicited),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jam_types::Slot;
    use std::collections::BTreeMap;

    fn minimal_state(services: BTreeMap<u32, ServiceAccount>) -> jam_types::State {
        jam_types::State {
            auth_pools: vec![],
            recent_history: vec![],
            safrole: jam_types::SafroleState {
                sealing_keys: jam_types::SealingKeys::Fallback(vec![]),
                ticket_accumulator: vec![],
                ring_commitment: vec![],
                next_validators: vec![],
            },
            services,
            entropy: [Hash32::zero(); 4],
            next_validators: vec![],
            active_validators: vec![],
            previous_validators: vec![],
            pending_reports: vec![],
            slot: Slot::new(0),
            auth_queue: vec![],
            privileges: jam_types::Privileges::default(),
            disputes: jam_types::DisputesState::default(),
            statistics: vec![],
            accumulated_history: vec![],
            accumulation_queue: vec![],
        }
    }

    fn empty_service() -> ServiceAccount {
        ServiceAccount {
            code_hash: Hash32::zero(),
            balance: 0,
            min_gas_accumulate: 0,
            min_gas_on_transfer: 0,
            storage_offset: 0,
            creation_slot: Slot::new(0),
            last_accumulation_slot: Slot::new(0),
            parent_service_id: None,
            storage: BTreeMap::new(),
            preimages: BTreeMap::new(),
            preimage_status: BTreeMap::new(),
        }
    }

    #[test]
    fn solicit_then_provide_makes_it_available() {
        let mut service = empty_service();
        let data = b"hello world".to_vec();
        let hash = Hash32::from(merkleization::blake2b_256(&data));
        let length = data.len() as u32;

        solicit_preimage(&mut service, hash, length).unwrap();
        assert!(matches!(
            service.preimage_status.get(&(hash, length)),
            Some(PreimageStatus::Requested)
        ));

        let entries = vec![PreimageExtrinsicEntry { service_id: 0, data: data.clone() }];
        let mut services = BTreeMap::new();
        services.insert(0u32, service);
        let base = minimal_state(services);
        let mut staged = StagedState::new(&base);
        let params = Parameters::tiny();
        process_preimages(&mut staged, &params, &entries, Slot::new(5)).unwrap();
        assert!(matches!(
            staged.services().get(&0).unwrap().preimage_status.get(&(hash, length)),
            Some(PreimageStatus::Available { since }) if *since == Slot::new(5)
        ));
    }

    #[test]
    fn forget_before_expunge_period_is_rejected() {
        let mut service = empty_service();
        let key = (Hash32::from([1u8; 32]), 4u32);
        service
            .preimage_status
            .insert(key, PreimageStatus::Unavailable { since: Slot::new(0), until: Slot::new(10) });
        let err = forget_preimage(&mut service, key.0, key.1, Slot::new(15), 32).unwrap_err();
        assert_eq!(err, PreimageError::ForgetTooSoon);
    }

    #[test]
    fn forget_requested_removes_entry() {
        let mut service = empty_service();
        let key = (Hash32::from([1u8; 32]), 4u32);
        service.preimage_status.insert(key, PreimageStatus::Requested);
        forget_preimage(&mut service, key.0, key.1, Slot::new(5), 32).unwrap();
        assert!(service.preimage_status.get(&key).is_none());
    }
}
