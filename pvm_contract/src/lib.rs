//! The PVM collaborator contract (spec.md §6): accumulation dispatches into
//! a service's compiled code through `invoke`, and observes only the shape
//! defined here. The actual interpreter is out of scope for this core; what
//! lives in this crate is the trait boundary plus a deterministic mock
//! implementation used by `state_processing`'s own tests.

mod host_access;
mod mock;

pub use host_access::{HostAccessView, PreimageLookup, PrivilegeView, StorageView};

use jam_types::Hash32;

/// Which entry point of a service's code an invocation targets
/// (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    Accumulate,
    OnTransfer,
}

/// Why an invocation stopped (spec.md §6). `Halt` is the only successful
/// termination; the rest all report zero accumulation output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Halt,
    Panic,
    OutOfGas,
    PageFault(u32),
    HostCall(u32),
}

impl Termination {
    pub fn is_success(&self) -> bool {
        matches!(self, Termination::Halt)
    }
}

/// A balance movement an accumulation produced, to be applied to δ once the
/// whole report's accumulation has been dispatched (spec.md §4.7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredTransfer {
    pub source: u32,
    pub destination: u32,
    pub amount: u64,
    pub memo: [u8; 128],
    pub gas_limit: u64,
}

/// A mutation the invocation wants applied to the invoked service's
/// storage, expressed as the host functions would have applied it
/// (spec.md §4.7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateUpdate {
    WriteStorage { key: Hash32, value: Vec<u8> },
    RemoveStorage { key: Hash32 },
    SolicitPreimage { hash: Hash32, length: u32 },
    ForgetPreimage { hash: Hash32, length: u32 },
}

/// Everything one `invoke` call returns (spec.md §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    /// 32-byte digest folded into the accumulate root; only meaningful when
    /// `termination` is `Halt`.
    pub output_digest: Option<Hash32>,
    pub deferred_transfers: Vec<DeferredTransfer>,
    pub state_updates: Vec<StateUpdate>,
    pub gas_consumed: u64,
    pub termination: Termination,
}

/// The PVM collaborator boundary itself. `state_processing::accumulation`
/// is generic over this trait so that its tests can run against the mock
/// executor without pulling in a real interpreter.
pub trait PvmHost {
    fn invoke(
        &self,
        service_id: u32,
        entry_point: EntryPoint,
        gas_limit: u64,
        input: &[u8],
        host_access: &mut dyn HostAccessView,
    ) -> InvocationResult;
}

pub use mock::{MockPvmHost, ScriptedInvocation};
