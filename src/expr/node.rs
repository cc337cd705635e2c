//! Lazy elementwise expression nodes.

use std::fmt;

use super::broadcast::{broadcast_shapes, read};
use super::{ElementAccess, Shaped};
use crate::buffer::ExtentsView;
use crate::error::Result;

/// Applies `f` to every element of one operand.
pub struct Map<E, F> {
    expr: E,
    f: F,
    shape: Vec<usize>,
}

impl<E: ElementAccess, F> Map<E, F> {
    pub fn new(expr: E, f: F) -> Self {
        let shape = expr.shape().to_vec();
        Self { expr, f, shape }
    }
}

impl<E, F> Shaped for Map<E, F> {
    fn shape(&self) -> ExtentsView<'_> {
        ExtentsView::from_slice(&self.shape)
    }
}

impl<E, F, O> ElementAccess for Map<E, F>
where
    E: ElementAccess,
    F: Fn(E::Elem) -> O,
    O: Copy,
{
    type Elem = O;

    #[inline]
    fn element(&self, index: &[usize]) -> O {
        (self.f)(self.expr.element(index))
    }
}

/// Combines two operands elementwise under broadcasting.
pub struct ZipWith<A, B, F> {
    a: A,
    b: B,
    f: F,
    shape: Vec<usize>,
}

impl<A: ElementAccess, B: ElementAccess, F> ZipWith<A, B, F> {
    /// Fails when the operand shapes do not broadcast together.
    pub fn new(a: A, b: B, f: F) -> Result<Self> {
        let shape = broadcast_shapes(&[a.shape(), b.shape()])?;
        Ok(Self { a, b, f, shape })
    }
}

impl<A, B, F> Shaped for ZipWith<A, B, F> {
    fn shape(&self) -> ExtentsView<'_> {
        ExtentsView::from_slice(&self.shape)
    }
}

impl<A, B, F, O> ElementAccess for ZipWith<A, B, F>
where
    A: ElementAccess,
    B: ElementAccess,
    F: Fn(A::Elem, B::Elem) -> O,
    O: Copy,
{
    type Elem = O;

    fn element(&self, index: &[usize]) -> O {
        (self.f)(read(&self.a, index), read(&self.b, index))
    }
}

/// Combines three operands elementwise under broadcasting.
pub struct Zip3With<A, B, C, F> {
    a: A,
    b: B,
    c: C,
    f: F,
    shape: Vec<usize>,
}

impl<A: ElementAccess, B: ElementAccess, C: ElementAccess, F> Zip3With<A, B, C, F> {
    /// Fails when the operand shapes do not broadcast together.
    pub fn new(a: A, b: B, c: C, f: F) -> Result<Self> {
        let shape = broadcast_shapes(&[a.shape(), b.shape(), c.shape()])?;
        Ok(Self { a, b, c, f, shape })
    }
}

impl<A, B, C, F> Shaped for Zip3With<A, B, C, F> {
    fn shape(&self) -> ExtentsView<'_> {
        ExtentsView::from_slice(&self.shape)
    }
}

impl<A, B, C, F, O> ElementAccess for Zip3With<A, B, C, F>
where
    A: ElementAccess,
    B: ElementAccess,
    C: ElementAccess,
    F: Fn(A::Elem, B::Elem, C::Elem) -> O,
    O: Copy,
{
    type Elem = O;

    fn element(&self, index: &[usize]) -> O {
        (self.f)(
            read(&self.a, index),
            read(&self.b, index),
            read(&self.c, index),
        )
    }
}

impl<E, F> fmt::Debug for Map<E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map").field("shape", &self.shape).finish()
    }
}

impl<A, B, F> fmt::Debug for ZipWith<A, B, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZipWith").field("shape", &self.shape).finish()
    }
}

impl<A, B, C, F> fmt::Debug for Zip3With<A, B, C, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Zip3With").field("shape", &self.shape).finish()
    }
}
