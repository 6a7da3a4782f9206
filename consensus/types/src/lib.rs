//! Plain data types for the JAM state-transition core: the shapes that make
//! up σ, the block and its extrinsics, and the parameters that size them.
//!
//! This crate plays the role the teacher's `types` crate plays for a beacon
//! state: every other crate in the workspace depends on it, and it carries
//! no transition logic of its own, only construction helpers and the
//! canonical-encoding impls that logic elsewhere relies on.

pub mod assurance;
pub mod block;
pub mod dispute;
pub mod errors;
pub mod extrinsics;
pub mod hash;
pub mod header;
pub mod params;
pub mod preimage;
pub mod safrole;
pub mod service;
pub mod slot;
pub mod state;
pub mod validator;
pub mod work_report;

pub use assurance::Assurance;
pub use block::Block;
pub use dispute::{Culprit, DisputesExtrinsic, DisputesState, Fault, Judgement, Verdict};
pub use errors::TypesError;
pub use extrinsics::{Extrinsics, PreimageExtrinsicEntry};
pub use hash::Hash32;
pub use header::{EpochMark, Header, TicketsMark};
pub use params::Parameters;
pub use preimage::PreimageStatus;
pub use safrole::{SealingKeys, TicketBody, TicketEnvelope, TicketId};
pub use service::ServiceAccount;
pub use slot::{Epoch, Slot};
pub use state::{HistoryEntry, PendingReport, Privileges, SafroleState, State, ValidatorStatistics};
pub use validator::ValidatorKeys;
pub use work_report::{RefinementContext, ReportDependency, WorkOutput, WorkPackageSpec, WorkReport, WorkResult};
pub use guarantee::{Guarantee, ReportSignature};

pub mod guarantee;
