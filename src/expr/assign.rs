//! Strided traversal and expression assignment.

use super::broadcast::read;
use super::{ElementAccess, ElementAccessMut, Strided};
use crate::error::{Error, Result};

/// Walks every multi-index of a strided container in first-axis-fastest
/// order, tracking the linear storage offset incrementally.
///
/// Advancing along an axis adds its stride; wrapping an axis back to 0
/// subtracts its backstride.
///
/// # Example
///
/// ```rust,ignore
/// let mut stepper = Stepper::new(&array);
/// while !stepper.is_done() {
///     println!("{:?} -> {}", stepper.index(), stepper.offset());
///     stepper.advance();
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Stepper {
    shape: Vec<usize>,
    strides: Vec<usize>,
    backstrides: Vec<usize>,
    index: Vec<usize>,
    offset: usize,
    done: bool,
}

impl Stepper {
    /// Position a stepper on the first element of `container`.
    pub fn new<C: Strided + ?Sized>(container: &C) -> Self {
        let shape = container.shape().to_vec();
        let done = shape.contains(&0);
        Self {
            index: vec![0; shape.len()],
            strides: container.strides().to_vec(),
            backstrides: container.backstrides().to_vec(),
            shape,
            offset: 0,
            done,
        }
    }

    /// Whether every element has been visited.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Current multi-index.
    #[inline]
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// Storage offset of the current multi-index.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Move to the next multi-index.
    pub fn advance(&mut self) {
        for axis in 0..self.shape.len() {
            if self.index[axis] + 1 < self.shape[axis] {
                self.index[axis] += 1;
                self.offset += self.strides[axis];
                return;
            }
            self.offset -= self.backstrides[axis];
            self.index[axis] = 0;
        }
        self.done = true;
    }
}

/// Evaluate `src` into `dst` element by element.
///
/// `src` may broadcast to the shape of `dst`, but `dst` is never resized:
/// a source that would widen it is a [`Error::ShapeMismatch`].
pub fn assign<D, S>(dst: &mut D, src: &S) -> Result<()>
where
    D: ElementAccessMut + ?Sized,
    S: ElementAccess<Elem = D::Elem> + ?Sized,
{
    let mut target = dst.shape().to_vec();
    src.broadcast_shape(&mut target)?;
    if dst.shape() != target {
        return Err(Error::ShapeMismatch {
            expected: dst.shape().to_vec(),
            actual: src.shape().to_vec(),
        });
    }

    let mut stepper = Stepper::new(&*dst);
    let storage = dst.storage_mut();
    while !stepper.is_done() {
        storage[stepper.offset()] = read(src, stepper.index());
        stepper.advance();
    }
    Ok(())
}
