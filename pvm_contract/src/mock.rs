use crate::{DeferredTransfer, EntryPoint, HostAccessView, InvocationResult, PvmHost, StateUpdate, Termination};
use jam_types::Hash32;
use std::collections::BTreeMap;

/// A scripted response for one service, used so `state_processing`'s
/// accumulation tests can assert on transfer/update plumbing without a real
/// interpreter (spec.md §6 names only the `invoke` contract, not an
/// implementation).
#[derive(Debug, Clone)]
pub struct ScriptedInvocation {
    pub termination: Termination,
    pub gas_consumed: u64,
    pub deferred_transfers: Vec<DeferredTransfer>,
    pub state_updates: Vec<StateUpdate>,
}

impl ScriptedInvocation {
    pub fn halt(gas_consumed: u64) -> Self {
        ScriptedInvocation {
            termination: Termination::Halt,
            gas_consumed,
            deferred_transfers: vec![],
            state_updates: vec![],
        }
    }

    pub fn out_of_gas(gas_consumed: u64) -> Self {
        ScriptedInvocation {
            termination: Termination::OutOfGas,
            gas_consumed,
            deferred_transfers: vec![],
            state_updates: vec![],
        }
    }
}

/// Deterministic stand-in for a real PVM interpreter. Services with no
/// script registered halt immediately with an output digest derived from
/// their inputs, consuming one gas unit; this keeps accumulation's
/// fixpoint and gas-accounting logic exercisable without an interpreter.
#[derive(Debug, Clone, Default)]
pub struct MockPvmHost {
    scripts: BTreeMap<(u32, bool), ScriptedInvocation>,
}

impl MockPvmHost {
    pub fn new() -> Self {
        MockPvmHost::default()
    }

    pub fn script(&mut self, service_id: u32, entry_point: EntryPoint, invocation: ScriptedInvocation) {
        self.scripts
            .insert((service_id, entry_point == EntryPoint::OnTransfer), invocation);
    }
}

impl PvmHost for MockPvmHost {
    fn invoke(
        &self,
        service_id: u32,
        entry_point: EntryPoint,
        gas_limit: u64,
        input: &[u8],
        _host_access: &mut dyn HostAccessView,
    ) -> InvocationResult {
        let key = (service_id, entry_point == EntryPoint::OnTransfer);
        if let Some(script) = self.scripts.get(&key) {
            let gas_consumed = script.gas_consumed.min(gas_limit);
            let termination = if script.gas_consumed > gas_limit {
                Termination::OutOfGas
            } else {
                script.termination
            };
            return InvocationResult {
                output_digest: termination.is_success().then(|| {
                    Hash32::from(merkleization::blake2b_256(
                        &[&service_id.to_le_bytes()[..], input].concat(),
                    ))
                }),
                deferred_transfers: if termination.is_success() {
                    script.deferred_transfers.clone()
                } else {
                    vec![]
                },
                state_updates: if termination.is_success() {
                    script.state_updates.clone()
                } else {
                    vec![]
                },
                gas_consumed,
                termination,
            };
        }

        if gas_limit == 0 {
            return InvocationResult {
                output_digest: None,
                deferred_transfers: vec![],
                state_updates: vec![],
                gas_consumed: 0,
                termination: Termination::OutOfGas,
            };
        }

        let mut buf = service_id.to_le_bytes().to_vec();
        buf.push(match entry_point {
            EntryPoint::Accumulate => 0,
            EntryPoint::OnTransfer => 1,
        });
        buf.extend_from_slice(input);
        InvocationResult {
            output_digest: Some(Hash32::from(merkleization::blake2b_256(&buf))),
            deferred_transfers: vec![],
            state_updates: vec![],
            gas_consumed: 1,
            termination: Termination::Halt,
        }
    }
}
