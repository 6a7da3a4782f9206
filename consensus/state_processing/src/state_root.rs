//! Builds σ's state dictionary (spec.md §6 "Codec collaborator") and derives
//! its root through `merkleization::state_root`. Each top-level component of
//! `jam_types::State` gets its own fixed dictionary key (spec.md §3's
//! Greek-letter component list, in the order it is introduced); the value is
//! that component's JSON encoding, which is deterministic for the `BTreeMap`-
//! and `Vec`-shaped components this state is built from.

use jam_types::State;
use merkleization::StateDictionary;

fn component_key(tag: u8) -> [u8; 31] {
    let mut key = [0u8; 31];
    key[0] = tag;
    key
}

fn insert<T: serde::Serialize>(dictionary: &mut StateDictionary, tag: u8, component: &T) {
    let value = serde_json::to_vec(component).expect("state components are always serializable");
    dictionary.insert(component_key(tag), value);
}

/// Renders `state` into the dictionary form `merkleization::state_root`
/// hashes (spec.md §6).
pub fn state_dictionary(state: &State) -> StateDictionary {
    let mut dictionary = StateDictionary::new();
    insert(&mut dictionary, 0, &state.auth_pools);
    insert(&mut dictionary, 1, &state.recent_history);
    insert(&mut dictionary, 2, &state.safrole);
    insert(&mut dictionary, 3, &state.services);
    insert(&mut dictionary, 4, &state.entropy);
    insert(&mut dictionary, 5, &state.next_validators);
    insert(&mut dictionary, 6, &state.active_validators);
    insert(&mut dictionary, 7, &state.previous_validators);
    insert(&mut dictionary, 8, &state.pending_reports);
    insert(&mut dictionary, 9, &state.slot);
    insert(&mut dictionary, 10, &state.auth_queue);
    insert(&mut dictionary, 11, &state.privileges);
    insert(&mut dictionary, 12, &state.disputes);
    insert(&mut dictionary, 13, &state.statistics);
    insert(&mut dictionary, 14, &state.accumulated_history);
    insert(&mut dictionary, 15, &state.accumulation_queue);
    dictionary
}

/// The 32-byte root of `state` (spec.md §3's `parent_state_root`/
/// `anchor_state_root` fields, spec.md §6).
pub fn compute_state_root(state: &State) -> jam_types::Hash32 {
    jam_types::Hash32::from(merkleization::state_root(&state_dictionary(state)))
}
