//! Validator statistics π (spec.md §4.12). Tickets are submitted under
//! ring-VRF anonymity and preimages are keyed by service rather than by
//! validator, so neither extrinsic carries a validator identity this
//! module could attribute a counter to; only the two groups whose
//! contributors are named in the block (block authorship, guarantee and
//! assurance signatures) are tracked against `jam_types::ValidatorStatistics`.
//! Per-core and per-service counters named by spec.md §4.12 have no
//! corresponding field on that type and are not tracked.

use crate::staged_state::StagedState;
use jam_types::{Parameters, ValidatorStatistics};
use std::convert::Infallible;

pub type StatisticsError = Infallible;

pub struct StatisticsInput {
    pub block_author: u32,
    pub is_new_epoch: bool,
    pub guarantee_signers: Vec<u32>,
    pub assurance_signers: Vec<u32>,
}

/// Updates π for the block just processed (spec.md §4.12): resets at an
/// epoch boundary, then tallies this block's contributions.
#[tracing::instrument(level = "debug", skip_all, fields(is_new_epoch = input.is_new_epoch))]
pub fn process_statistics(
    staged: &mut StagedState,
    params: &Parameters,
    input: StatisticsInput,
) -> Result<(), StatisticsError> {
    let validator_count = params.validator_count as usize;
    if input.is_new_epoch || staged.statistics().len() != validator_count {
        *staged.statistics_mut() = vec![ValidatorStatistics::default(); validator_count];
    }

    let stats = staged.statistics_mut();
    if let Some(author) = stats.get_mut(input.block_author as usize) {
        author.blocks_produced += 1;
    }
    for validator_index in &input.guarantee_signers {
        if let Some(entry) = stats.get_mut(*validator_index as usize) {
            entry.guarantees_submitted += 1;
        }
    }
    for validator_index in &input.assurance_signers {
        if let Some(entry) = stats.get_mut(*validator_index as usize) {
            entry.assurances_submitted += 1;
        }
    }

    Ok(())
}
