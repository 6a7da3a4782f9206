/// Protocol parameters threaded by reference through every sub-transition
/// (spec.md §6 "Parameters collaborator"). Mirrors the role the teacher's
/// `ChainSpec` plays for beacon-chain constants, but for JAM there are only
/// two fixed deployment profiles rather than an open-ended spec registry, so
/// this is a plain struct with two constructors instead of a YAML-loaded
/// type.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Parameters {
    /// `E`: slots per epoch.
    pub epoch_length: u64,
    /// `C`: number of cores.
    pub core_count: u32,
    /// `V`: number of validators.
    pub validator_count: u32,
    /// The availability/judgement super-majority threshold (spec.md §6):
    /// the number of confirming validators a core's assurance bitfield
    /// tally, or a dispute verdict's judgements, must reach.
    pub supermajority: u32,
    /// `R`: ticket submission / rotation period, in slots.
    pub rotation_period: u64,
    /// `D`: preimage expunction period, in slots.
    pub preimage_expunge_period: u64,
    /// `G_T`: total gas allowed per block across all accumulations.
    pub accumulate_gas_limit: u64,
    /// `G_A`: gas allowed per single service accumulation.
    pub accumulate_gas_per_service: u64,
    /// `H`: maximum recent-history entries retained in β.
    pub recent_history_size: usize,
    /// `Q`: max items in a single work-package queue contribution.
    pub max_queue_items: usize,
    /// `O`: max number of items in the authorization pool per core.
    pub auth_pool_size: usize,
    /// `J`: max dependencies per work report.
    pub max_dependencies: usize,
    /// `N`: number of ticket entries per validator per epoch.
    pub tickets_per_validator: u32,
    /// `K`: max tickets accepted per extrinsic.
    pub max_tickets_per_block: usize,
}

impl Parameters {
    /// The small, fast-epoch profile used for test vectors and local
    /// networks (spec.md §6).
    pub fn tiny() -> Self {
        Parameters {
            epoch_length: 12,
            core_count: 2,
            validator_count: 6,
            supermajority: 5,
            rotation_period: 4,
            preimage_expunge_period: 32,
            accumulate_gas_limit: 10_000_000,
            accumulate_gas_per_service: 1_000_000,
            recent_history_size: 8,
            max_queue_items: 4,
            auth_pool_size: 8,
            max_dependencies: 8,
            tickets_per_validator: 3,
            max_tickets_per_block: 16,
        }
    }

    /// The full-scale production profile (spec.md §6).
    pub fn full() -> Self {
        Parameters {
            epoch_length: 600,
            core_count: 341,
            validator_count: 1023,
            supermajority: 683,
            rotation_period: 10,
            preimage_expunge_period: 19_200,
            accumulate_gas_limit: 3_500_000_000,
            accumulate_gas_per_service: 50_000_000,
            recent_history_size: 8,
            max_queue_items: 128,
            auth_pool_size: 8,
            max_dependencies: 8,
            tickets_per_validator: 2,
            max_tickets_per_block: 1023,
        }
    }

    /// `⌊E/3⌋`, the super-majority threshold used by Safrole fallback
    /// eligibility and dispute quorum checks (spec.md §4.4, §4.6).
    pub fn two_thirds_validators(&self) -> u32 {
        (self.validator_count * 2) / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_are_internally_consistent() {
        let tiny = Parameters::tiny();
        assert!(tiny.rotation_period <= tiny.epoch_length);
        let full = Parameters::full();
        assert!(full.rotation_period <= full.epoch_length);
    }

    #[test]
    fn quorum_is_less_than_validator_count() {
        let p = Parameters::full();
        assert!(p.two_thirds_validators() < p.validator_count);
    }
}
