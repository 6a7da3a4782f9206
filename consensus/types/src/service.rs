use crate::hash::Hash32;
use crate::preimage::PreimageStatus;
use crate::slot::Slot;
use std::collections::BTreeMap;

/// A service account, the unit of on-chain state and accumulation
/// (spec.md §4.7). `storage` and `preimages` are keyed by the hash of the
/// key/preimage respectively, matching how δ addresses them.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ServiceAccount {
    pub code_hash: Hash32,
    pub balance: u64,
    pub min_gas_accumulate: u64,
    pub min_gas_on_transfer: u64,
    /// Offset of this service's allotted storage region within the global
    /// state dictionary key space (spec.md §6).
    pub storage_offset: u32,
    pub creation_slot: Slot,
    pub last_accumulation_slot: Slot,
    pub parent_service_id: Option<u32>,
    pub storage: BTreeMap<Hash32, Vec<u8>>,
    pub preimages: BTreeMap<Hash32, Vec<u8>>,
    pub preimage_status: BTreeMap<(Hash32, u32), PreimageStatus>,
}

impl ServiceAccount {
    /// `(a_i, a_o)` footprint used by balance-threshold checks (spec.md
    /// §4.10): a storage entry contributes 1 item and `34 + key_len +
    /// value_len` bytes; a preimage-lookup entry (keyed by `(hash,
    /// length)` in `preimage_status`) contributes 2 items and `81 +
    /// length` bytes. The raw preimage blobs in `preimages` are not
    /// themselves separately-counted entries — they are addressed through
    /// their lookup-status entry.
    pub fn footprint(&self) -> (u64, u64) {
        let mut items = 0u64;
        let mut bytes = 0u64;
        for (key, value) in &self.storage {
            items += 1;
            bytes += 34 + key.as_bytes().len() as u64 + value.len() as u64;
        }
        for (_hash, length) in self.preimage_status.keys() {
            items += 2;
            bytes += 81 + *length as u64;
        }
        (items, bytes)
    }

    /// The minimum balance required to hold the current footprint
    /// (spec.md §4.10): `B_S + B_I·a_i + B_L·max(0, a_o − storage_offset)`.
    pub fn threshold_balance(&self, base: u64, item_cost: u64, byte_cost: u64) -> u64 {
        let (items, bytes) = self.footprint();
        let excess_bytes = bytes.saturating_sub(self.storage_offset as u64);
        base.saturating_add(items.saturating_mul(item_cost))
            .saturating_add(excess_bytes.saturating_mul(byte_cost))
    }
}
