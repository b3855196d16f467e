use thiserror::Error;

/// Failures raised by mesh lookups, stencil construction and relaxation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FvError {
    #[error("invalid configuration: {reason}")]
    Config { reason: String },
    #[error("cell ({i}, {j}) is outside the extended index space")]
    Index { i: i32, j: i32 },
    #[error("not a face name: {0}")]
    InvalidFace(String),
    #[error("field selector not known: {0}")]
    InvalidField(String),
    /// The owner coefficient (or a width sum used as a denominator) was not
    /// strictly positive. Values already written during the sweep are kept.
    #[error("division singularity at cell ({i}, {j}): denominator {value:e}")]
    DivisionSingularity { i: i32, j: i32, value: f64 },
    /// A relaxed cell value came out NaN or infinite.
    #[error("non-finite value {value} at cell ({i}, {j})")]
    NonFinite { i: i32, j: i32, value: f64 },
}

impl FvError {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        FvError::Config {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FvError>;
