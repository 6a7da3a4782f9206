//! The composed error type for a full block transition (spec.md §7).
//! Every sub-transition defines its own error enum naming only the kinds it
//! can raise; this type rolls them all up with `From` impls so the
//! orchestrator in `per_block_processing` can use `?` throughout, mirroring
//! how the teacher's `per_slot_processing::Error` wraps
//! `EpochProcessingError`/`BeaconStateError`.

use crate::per_block_processing::accumulation::AccumulationError;
use crate::per_block_processing::assurances::AssuranceError;
use crate::per_block_processing::authorization::AuthorizationError;
use crate::per_block_processing::disputes::DisputeError;
use crate::per_block_processing::preimages::PreimageError;
use crate::per_block_processing::recent_history::RecentHistoryError;
use crate::per_block_processing::reports::ReportError;
use crate::per_block_processing::safrole::SafroleError;
use crate::per_block_processing::time::TimeError;
use safe_arith::ArithError;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("time: {0:?}")]
    Time(TimeError),
    #[error("safrole: {0:?}")]
    Safrole(SafroleError),
    #[error("disputes: {0:?}")]
    Disputes(DisputeError),
    #[error("assurances: {0:?}")]
    Assurances(AssuranceError),
    #[error("reports: {0:?}")]
    Reports(ReportError),
    #[error("accumulation: {0:?}")]
    Accumulation(AccumulationError),
    #[error("preimages: {0:?}")]
    Preimages(PreimageError),
    #[error("recent history: {0:?}")]
    RecentHistory(RecentHistoryError),
    #[error("authorization: {0:?}")]
    Authorization(AuthorizationError),
    #[error("arithmetic error: {0:?}")]
    Arith(ArithError),
}

impl From<TimeError> for Error {
    fn from(e: TimeError) -> Self {
        Error::Time(e)
    }
}

impl From<SafroleError> for Error {
    fn from(e: SafroleError) -> Self {
        Error::Safrole(e)
    }
}

impl From<DisputeError> for Error {
    fn from(e: DisputeError) -> Self {
        Error::Disputes(e)
    }
}

impl From<AssuranceError> for Error {
    fn from(e: AssuranceError) -> Self {
        Error::Assurances(e)
    }
}

impl From<ReportError> for Error {
    fn from(e: ReportError) -> Self {
        Error::Reports(e)
    }
}

impl From<AccumulationError> for Error {
    fn from(e: AccumulationError) -> Self {
        Error::Accumulation(e)
    }
}

impl From<PreimageError> for Error {
    fn from(e: PreimageError) -> Self {
        Error::Preimages(e)
    }
}

impl From<RecentHistoryError> for Error {
    fn from(e: RecentHistoryError) -> Self {
        Error::RecentHistory(e)
    }
}

impl From<AuthorizationError> for Error {
    fn from(e: AuthorizationError) -> Self {
        Error::Authorization(e)
    }
}

impl From<ArithError> for Error {
    fn from(e: ArithError) -> Self {
        Error::Arith(e)
    }
}
