//! Foreign runtime boundary.
//!
//! This module defines the [`Runtime`] trait the adaptors allocate and query
//! through, and implementations:
//! - [`Heap`]: an in-process managed heap with a mark/sweep collector
//!
//! [`RootGuard`] provides the scoped root protection every multi-object
//! allocation sequence must hold.

mod config;
mod heap;
mod root;
mod traits;

pub use config::HeapConfig;
pub use heap::{Heap, HeapStats};
pub use root::RootGuard;
pub use traits::{ArrayRef, FrameId, ObjectRef, RawExtents, Runtime};
