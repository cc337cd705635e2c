//! Rank-erased adaptor.

use super::{Container, Descriptors, Dimension};
use crate::buffer::ExtentsView;
use crate::element::Element;
use crate::error::Result;
use crate::runtime::{Heap, RootGuard, Runtime};

/// Rank decided at run time.
///
/// The shape is never copied: every query reads the array header. Type
/// descriptors are computed on each allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dyn {}

/// Adaptor over a foreign array of any rank.
///
/// # Example
///
/// ```rust,ignore
/// use jltensor::JlArray;
///
/// let mut a = JlArray::<f64>::from_shape(&[2, 3, 4])?;
/// a[[1, 2, 3]] = 1.5;
/// assert_eq!(a.strides(), &[1, 2, 6]);
///
/// a.reshape(&[6, 4])?;
/// assert_eq!(a.dimension(), 2);
/// ```
pub type JlArray<T, R = Heap> = Container<T, Dyn, R>;

impl Dimension for Dyn {
    const NAME: &'static str = "JlArray";

    type Seq = Vec<usize>;
    type ShapeCache = ();

    fn check_rank(_rank: usize) -> Result<()> {
        Ok(())
    }

    fn default_shape() -> Vec<usize> {
        vec![1]
    }

    fn zeros(rank: usize) -> Vec<usize> {
        vec![0; rank]
    }

    fn cache_shape(_header: ExtentsView<'_>) -> Result<()> {
        Ok(())
    }

    #[inline]
    fn shape_view<'a>(_cache: &'a (), header: ExtentsView<'a>) -> ExtentsView<'a> {
        header
    }

    fn descriptors<T: Element, R: Runtime>(
        runtime: &R,
        rank: usize,
        roots: &mut RootGuard<'_, R>,
    ) -> Result<Descriptors> {
        Descriptors::compute::<T, R>(runtime, rank, roots)
    }
}

impl<T: Element, R: Runtime> Container<T, Dyn, R> {
    /// Allocate a rank-0 array holding `value`.
    pub fn from_value(value: T) -> Result<Self>
    where
        R: Default,
    {
        Self::from_value_with_runtime(value, R::default())
    }

    /// Allocate a rank-0 array holding `value` in `runtime`.
    pub fn from_value_with_runtime(value: T, runtime: R) -> Result<Self> {
        Self::from_elem_with_runtime(&[], value, runtime)
    }
}
