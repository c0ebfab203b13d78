//! Error taxonomy shared by the controller and the filter passes.
//!
//! Parameter problems are reported eagerly by the setters; binding and
//! allocation problems surface when a filter is invoked. Nothing here is
//! retried or swallowed: a failed call leaves the caller to decide whether to
//! re-issue it.

use crate::surface::SurfaceRole;

/// Errors raised by the filtering core.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Non-positive sigma, zero iterations, out-of-range similarity,
    /// degenerate clip range, mismatched or aliased surfaces.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A filter was invoked before the surface it needs was bound, or the bound
    /// handle no longer resolves in the store.
    #[error("{0} surface is not bound")]
    SurfaceNotBound(SurfaceRole),

    /// Scratch memory for a pass could not be reserved.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// View-space spatial units were requested without a projection matrix and
    /// clip range to convert them.
    #[error("view-space spatial units need a projection matrix and clip range")]
    MissingProjection,
}

impl FilterError {
    pub fn invalid<T: ToString>(msg: T) -> Self {
        FilterError::InvalidParameter(msg.to_string())
    }

    pub fn exhausted<T: ToString>(msg: T) -> Self {
        FilterError::ResourceExhausted(msg.to_string())
    }
}

impl From<std::collections::TryReserveError> for FilterError {
    fn from(err: std::collections::TryReserveError) -> Self {
        FilterError::ResourceExhausted(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;
