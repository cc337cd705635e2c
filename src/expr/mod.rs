//! Capability traits that plug adaptors into an expression engine.
//!
//! The engine only needs a handful of capabilities from an operand:
//! - [`Shaped`]: a shape, a dimension count, and broadcasting
//! - [`Strided`]: per-axis strides and backstrides plus a static [`Layout`]
//! - [`ElementAccess`] / [`ElementAccessMut`]: reading at a multi-index and
//!   writing to linear storage
//!
//! Adaptors implement all four. Lazy nodes ([`Map`], [`ZipWith`],
//! [`Zip3With`]) implement [`Shaped`] and [`ElementAccess`], so they can be
//! materialized into an adaptor with [`assign`].

mod assign;
mod broadcast;
mod node;

pub use assign::{assign, Stepper};
pub use broadcast::{broadcast_into, broadcast_shapes};
pub use node::{Map, Zip3With, ZipWith};

use crate::buffer::ExtentsView;
use crate::error::Result;

/// Memory order of a strided container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Last index varies fastest.
    RowMajor,
    /// First index varies fastest (Fortran order).
    ColumnMajor,
}

/// Anything with a shape.
pub trait Shaped {
    /// Per-axis extents.
    fn shape(&self) -> ExtentsView<'_>;

    /// Number of dimensions.
    fn dimension(&self) -> usize {
        self.shape().len()
    }

    /// Total element count.
    fn size(&self) -> usize {
        self.shape().product()
    }

    /// Broadcast this shape into `shape`, aligned on trailing axes.
    ///
    /// Returns whether the broadcast is trivial, i.e. `shape` already equals
    /// this shape so no axis needs index remapping.
    fn broadcast_shape(&self, shape: &mut [usize]) -> Result<bool> {
        broadcast_into(self.shape(), shape)
    }
}

/// A shaped container laid out in memory with fixed strides.
pub trait Strided: Shaped {
    /// Element stride of each axis.
    fn strides(&self) -> &[usize];

    /// `(extent - 1) * stride` per axis: the offset to undo when an axis
    /// wraps around during iteration.
    fn backstrides(&self) -> &[usize];

    /// Memory order.
    fn layout(&self) -> Layout {
        Layout::ColumnMajor
    }
}

/// Elementwise read access at a full multi-index.
pub trait ElementAccess: Shaped {
    type Elem: Copy;

    /// Element at `index`, which has exactly [`Shaped::dimension`] entries,
    /// each within its extent.
    fn element(&self, index: &[usize]) -> Self::Elem;
}

/// Write access to the linear storage behind a [`Strided`] container.
pub trait ElementAccessMut: ElementAccess + Strided {
    /// The storage, addressed by stride offsets.
    fn storage_mut(&mut self) -> &mut [Self::Elem];
}

impl<E: Shaped + ?Sized> Shaped for &E {
    fn shape(&self) -> ExtentsView<'_> {
        (**self).shape()
    }
}

impl<E: ElementAccess + ?Sized> ElementAccess for &E {
    type Elem = E::Elem;

    #[inline]
    fn element(&self, index: &[usize]) -> E::Elem {
        (**self).element(index)
    }
}
