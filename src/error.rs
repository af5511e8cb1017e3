use crate::value::CoercionError;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures raised while building descriptors or moving values through them.
///
/// Annotation parsing has no error kind: unknown or malformed tags are
/// dropped.
#[derive(Debug, Error)]
pub enum Error {
    /// The caller handed over something that cannot be described: a
    /// non-object value, a model with no fields, a nameless field, or a
    /// type the instance provider could not produce.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Coercion(#[from] CoercionError),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}
