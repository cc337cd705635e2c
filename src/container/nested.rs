//! Nested array literals as container initializers.

use std::marker::PhantomData;

use crate::element::Element;

/// Depth marker for the innermost level of a literal: `[T; A]`.
#[derive(Debug)]
pub enum Flat {}

/// Depth marker for one level of nesting above `D`.
#[derive(Debug)]
pub struct Nested<D>(PhantomData<D>);

/// A rectangular nested array literal such as `[[1, 2, 3], [4, 5, 6]]`.
///
/// The shape comes from the array lengths, outermost first, so the literal
/// above has shape `[2, 3]`. The literal's position `[i, j]` holds the
/// element at multi-index `(i, j)`; storage order is still column-major.
///
/// `Depth` only exists to keep the one-level and multi-level impls apart;
/// it is always inferred.
pub trait NestedLiteral<T, Depth> {
    /// Nesting depth, i.e. the rank of the literal.
    const DEPTH: usize;

    /// Append this level's extent and those of the levels below.
    fn push_extents(shape: &mut Vec<usize>);

    /// Element at a full multi-index.
    fn value_at(&self, index: &[usize]) -> T;

    /// Shape of the literal.
    fn shape() -> Vec<usize> {
        let mut shape = Vec::with_capacity(Self::DEPTH);
        Self::push_extents(&mut shape);
        shape
    }
}

impl<T: Element, const A: usize> NestedLiteral<T, Flat> for [T; A] {
    const DEPTH: usize = 1;

    fn push_extents(shape: &mut Vec<usize>) {
        shape.push(A);
    }

    #[inline]
    fn value_at(&self, index: &[usize]) -> T {
        self[index[0]]
    }
}

impl<T, U, D, const A: usize> NestedLiteral<T, Nested<D>> for [U; A]
where
    T: Element,
    U: NestedLiteral<T, D>,
{
    const DEPTH: usize = U::DEPTH + 1;

    fn push_extents(shape: &mut Vec<usize>) {
        shape.push(A);
        U::push_extents(shape);
    }

    #[inline]
    fn value_at(&self, index: &[usize]) -> T {
        self[index[0]].value_at(&index[1..])
    }
}
