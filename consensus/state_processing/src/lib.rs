//! The state transition core (spec.md §1-§2): σ × Block → σ′ over the
//! `jam_types` data model, built from the per-component sub-transitions in
//! `per_block_processing` and composed by `per_block_processing::process_block`.

pub mod common;
pub mod errors;
pub mod per_block_processing;
pub mod staged_state;
pub mod state_root;

pub use errors::Error;
pub use per_block_processing::process_block;
