/// Errors raised constructing or converting the plain data types in this
/// crate, as distinct from the sub-transition errors that live in
/// `state_processing::errors` (spec.md §7).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypesError {
    #[error("expected {expected} bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },
    #[error("arithmetic error: {0:?}")]
    Arith(safe_arith::ArithError),
    #[error("invalid hex encoding")]
    InvalidHex,
}

impl From<safe_arith::ArithError> for TypesError {
    fn from(e: safe_arith::ArithError) -> Self {
        TypesError::Arith(e)
    }
}
