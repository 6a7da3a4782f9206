//! The block transition σ × Block → σ′ (spec.md §2), composing every
//! sub-transition module in the fixed order the protocol specifies.
//!
//! Three places diverge from a literal reading of spec.md §2's diagram,
//! each because the sub-transitions built in this crate have a data
//! dependency the diagram's position doesn't expose:
//!
//! - **Safrole runs immediately after time, before entropy.** η′ needs the
//!   block's verified entropy-source VRF output, and that output only
//!   exists once Safrole's header validation has verified the
//!   corresponding signature — `vrf::verify_vrf` has no way to produce a
//!   VRF output without verifying it. Header validation itself only reads
//!   `staged.base()` (the untouched parent), never the entropy overlay, so
//!   its result is identical whether entropy/disputes/statistics-reset
//!   have already run or not; moving it earlier changes nothing it
//!   observes. Because the whole transition is staged and only committed
//!   at the very end, an error anywhere still aborts cleanly regardless of
//!   this reordering.
//! - **Statistics resets and finalizes in one call, at the end.** Nothing
//!   between spec.md §2's "statistics reset" and "statistics finalize"
//!   positions reads π, so folding both halves into the single
//!   `process_statistics` call built for this crate and running it last
//!   is behaviorally identical to running the reset earlier.
//! - **Recent-history's "anchor refresh" position is a no-op.** `reports`
//!   already reads `staged.recent_history()` directly at the point the
//!   pipeline calls it, and at that point it holds only prior blocks'
//!   entries (nothing in between appends to it) — exactly what an anchor
//!   refresh before `reports` would have produced. The one substantive
//!   `process_recent_history` call (closing the previous entry's
//!   `state_root` and appending the new one) happens once, at spec.md
//!   §2's "recent-history append" position, after accumulation.

pub mod accumulation;
pub mod assurances;
pub mod authorization;
pub mod disputes;
pub mod entropy;
pub mod preimages;
pub mod recent_history;
pub mod reports;
pub mod safrole;
pub mod statistics;
pub mod time;

use crate::common::work_group::Executor;
use crate::errors::Error;
use crate::staged_state::StagedState;
use crate::state_root;
use accumulation::process_accumulation;
use assurances::process_assurances;
use authorization::process_authorization;
use disputes::process_disputes;
use entropy::process_entropy;
use jam_types::{Block, Hash32, Parameters, State};
use merkleization::{blake2b_256, Canonical};
use preimages::process_preimages;
use pvm_contract::PvmHost;
use recent_history::process_recent_history;
use reports::process_reports;
use safrole::process_safrole;
use statistics::{process_statistics, StatisticsInput};
use time::process_time;

/// Runs the full block transition against `base`, producing σ′. `base` is
/// left untouched; on any error the staged overlays are simply dropped
/// (spec.md §4.1 "abort").
#[tracing::instrument(level = "info", skip_all, fields(slot = block.header.slot.as_u64()))]
pub fn process_block<E: Executor>(
    base: &State,
    params: &Parameters,
    block: &Block,
    pvm: &dyn PvmHost,
    executor: &E,
) -> Result<State, Error> {
    let mut staged = StagedState::new(base);

    let time_summary = process_time(&mut staged, params, block.header.slot)?;

    // The state root of the state being transitioned *from*: what the
    // incoming header's `parent_state_root` must match, and what closes
    // the previous recent-history entry once this block is accepted.
    let parent_state_root = state_root::compute_state_root(base);
    let extrinsic_hash = Hash32::from(blake2b_256(&block.extrinsics.canonical_bytes()));
    let last_recent_block_hash = base
        .recent_history
        .last()
        .map(|entry| entry.header_hash)
        .unwrap_or_else(Hash32::zero);
    let is_first_epoch = base.recent_history.is_empty();

    let safrole_outcome = process_safrole(
        &mut staged,
        params,
        &block.header,
        &block.extrinsics.tickets,
        time_summary.is_new_epoch,
        time_summary.slot_in_epoch,
        last_recent_block_hash,
        parent_state_root,
        extrinsic_hash,
        is_first_epoch,
        executor,
    )?;

    process_entropy(
        &mut staged,
        &safrole_outcome.entropy_source_output,
        time_summary.is_new_epoch,
    );

    process_disputes(&mut staged, params, &block.extrinsics.disputes)?;

    let assurances_outcome = process_assurances(
        &mut staged,
        params,
        &block.extrinsics.assurances,
        block.header.parent,
        block.header.slot,
    )?;

    let reports_outcome = process_reports(
        &mut staged,
        params,
        &block.extrinsics.guarantees,
        block.header.slot,
    )?;

    let accumulation_outcome = process_accumulation(
        &mut staged,
        params,
        assurances_outcome.ready_reports,
        block.header.slot,
        base.slot,
        pvm,
    )?;

    process_preimages(
        &mut staged,
        params,
        &block.extrinsics.preimages,
        block.header.slot,
    )?;

    process_recent_history(
        &mut staged,
        params,
        block.hash(),
        parent_state_root,
        accumulation_outcome.accumulate_root,
        reports_outcome.accepted_package_hashes,
    )?;

    process_authorization(&mut staged, params).expect("authorization never fails");

    let assurance_signers = block
        .extrinsics
        .assurances
        .iter()
        .map(|a| a.validator_index)
        .collect();
    process_statistics(
        &mut staged,
        params,
        StatisticsInput {
            block_author: block.header.author_index,
            is_new_epoch: time_summary.is_new_epoch,
            guarantee_signers: reports_outcome.reporters,
            assurance_signers,
        },
    )
    .expect("statistics never fails");

    Ok(staged.commit())
}
