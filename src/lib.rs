//! # jltensor
//!
//! Zero-copy N-dimensional array adaptors over arrays owned by a
//! garbage-collected foreign runtime.
//!
//! ## Features
//!
//! - **Zero-copy**: adaptors read and write the runtime's own buffers and
//!   array headers; nothing is mirrored on the native side
//! - **GC-safe allocation**: every allocation sequence is held in a scoped
//!   root frame ([`RootGuard`]), and live adaptors preserve their arrays
//! - **Two ranks**: [`JlArray`] for ranks known at run time, [`JlTensor`] for
//!   ranks fixed at compile time with a process-wide descriptor cache
//! - **Column-major**: first index fastest, matching the runtime's layout
//! - **Vectorize**: lift scalar functions to broadcasting array functions
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use jltensor::{vectorize, JlArray, JlTensor};
//!
//! // Allocated by the runtime, seen in place
//! let mut a = JlArray::<f64>::from_nested([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])?;
//! assert_eq!(a.shape(), [2, 3]);
//! assert_eq!(a.as_slice(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
//!
//! // Same buffer, new shape
//! a.reshape(&[3, 2])?;
//!
//! // Rank checked at every shape change
//! let t = JlTensor::<f64, 2>::from_dims([3, 2])?;
//! let sum = vectorize(|x: f64, y: f64| x + y).apply2(&a, &t)?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         User API                            │
//! │   JlArray<T> / JlTensor<T, N>      vectorize(f).applyN(..)  │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Container<T, Dimension, R>                 │
//! │   allocate / adopt / reshape / resize under RootGuard       │
//! │   BufferView (data)   ExtentsView (header)   strides        │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Runtime trait                        │
//! │   type descriptors, allocate, reshape, root stack, preserve │
//! │   Heap: in-process collector used as the default runtime    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod buffer;
pub mod container;
pub mod element;
pub mod error;
pub mod expr;
pub mod runtime;
pub mod vectorize;

// Re-exports
pub use buffer::{BufferView, BufferViewMut, ExtentsIter, ExtentsView};
pub use container::{
    checked_size, compute_contiguous_strides, compute_strides, evict_descriptors, Container,
    Descriptors, Dimension, Dyn, Fixed, JlArray, JlTensor, NestedLiteral,
};
pub use element::{Complex32, Complex64, Element, NativeType};
pub use error::{Error, Result};
pub use expr::{
    assign, broadcast_shapes, ElementAccess, ElementAccessMut, Layout, Shaped, Stepper, Strided,
};
pub use runtime::{
    ArrayRef, FrameId, Heap, HeapConfig, HeapStats, ObjectRef, RawExtents, RootGuard, Runtime,
};
pub use vectorize::{vectorize, Vectorizer};
