//! Error type shared by the runtime boundary and the container adaptors.

use thiserror::Error;

use crate::element::NativeType;

/// Errors raised while adapting foreign arrays.
///
/// Every variant is surfaced synchronously at the failing call; the adaptor
/// that produced it is left exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A fixed-rank adaptor met an array or shape of another rank.
    #[error("dimension mismatch: expected {expected} dimensions, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A reshape asked for a different total number of elements.
    #[error("cannot reshape {current} elements into shape {shape:?} ({requested} elements)")]
    SizeMismatch {
        shape: Vec<usize>,
        current: usize,
        requested: usize,
    },

    /// An expression could not be assigned to a container of this shape.
    #[error("shape mismatch: cannot assign shape {actual:?} to shape {expected:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// The foreign runtime refused an allocation.
    #[error("foreign allocation failed: {0}")]
    Allocation(String),

    /// A handle that does not name a live foreign object.
    #[error("invalid foreign handle {0:#x}")]
    InvalidHandle(usize),

    /// An adopted array stores elements of another native type.
    #[error("element type mismatch: expected {expected}, array holds {actual}")]
    ElementType {
        expected: NativeType,
        actual: NativeType,
    },

    /// A type descriptor of the wrong kind was passed to the runtime.
    #[error("invalid type descriptor: {0}")]
    DescriptorMismatch(String),
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
