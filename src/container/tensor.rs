//! Rank-fixed adaptor and its process-wide descriptor cache.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::LazyLock;

use parking_lot::Mutex;

use super::{Container, Descriptors, Dimension, FRAME_SLOTS};
use crate::buffer::ExtentsView;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::runtime::{Heap, RootGuard, Runtime};

/// Rank fixed at compile time to `N`.
///
/// The shape is copied into the adaptor at adoption, and the type
/// descriptors for each (element type, `N`, runtime) are computed once and
/// then served from a process-wide cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fixed<const N: usize>;

/// Adaptor over a foreign array of rank `N`.
///
/// # Example
///
/// ```rust,ignore
/// use jltensor::JlTensor;
///
/// let mut t = JlTensor::<f64, 2>::from_dims([2, 3])?;
/// t[[1, 2]] = 4.0;
/// t.reshape(&[3, 2])?;
/// assert!(t.reshape(&[6]).is_err()); // rank must stay 2
/// ```
pub type JlTensor<T, const N: usize, R = Heap> = Container<T, Fixed<N>, R>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    element: TypeId,
    runtime: TypeId,
    instance: u64,
    rank: usize,
}

/// Descriptors are type objects, which a runtime instance keeps alive until
/// it shuts down and calls [`evict_descriptors`].
static DESCRIPTORS: LazyLock<Mutex<HashMap<CacheKey, Descriptors>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Drop every cached descriptor of runtime instance `instance`.
///
/// Runtimes call this when an instance goes away, since its type objects go
/// with it.
pub fn evict_descriptors(instance: u64) {
    let mut cache = DESCRIPTORS.lock();
    let before = cache.len();
    cache.retain(|key, _| key.instance != instance);
    let evicted = before - cache.len();
    if evicted > 0 {
        tracing::debug!(instance, evicted, "evicted tensor descriptors");
    }
}

impl<const N: usize> Dimension for Fixed<N> {
    const NAME: &'static str = "JlTensor";

    type Seq = [usize; N];
    type ShapeCache = [usize; N];

    fn check_rank(rank: usize) -> Result<()> {
        if rank == N {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                expected: N,
                actual: rank,
            })
        }
    }

    fn default_shape() -> [usize; N] {
        [1; N]
    }

    fn zeros(_rank: usize) -> [usize; N] {
        [0; N]
    }

    fn cache_shape(header: ExtentsView<'_>) -> Result<[usize; N]> {
        Self::check_rank(header.len())?;
        let mut shape = [0; N];
        for (slot, extent) in shape.iter_mut().zip(header) {
            *slot = extent;
        }
        Ok(shape)
    }

    #[inline]
    fn shape_view<'a>(cache: &'a [usize; N], _header: ExtentsView<'a>) -> ExtentsView<'a> {
        ExtentsView::from_slice(cache)
    }

    fn descriptors<T: Element, R: Runtime>(
        runtime: &R,
        rank: usize,
        roots: &mut RootGuard<'_, R>,
    ) -> Result<Descriptors> {
        debug_assert_eq!(rank, N);
        let key = CacheKey {
            element: TypeId::of::<T>(),
            runtime: TypeId::of::<R>(),
            instance: runtime.instance_id(),
            rank: N,
        };
        let cached = DESCRIPTORS.lock().get(&key).copied();
        if let Some(descriptors) = cached {
            descriptors.root(roots);
            return Ok(descriptors);
        }

        // The lock is not held across runtime calls.
        let descriptors = Descriptors::compute::<T, R>(runtime, N, roots)?;
        DESCRIPTORS.lock().insert(key, descriptors);
        tracing::debug!(
            element = %T::NATIVE,
            rank = N,
            runtime = R::name(),
            "cached tensor descriptors"
        );
        Ok(descriptors)
    }
}

impl<T: Element, const N: usize, R: Runtime> Container<T, Fixed<N>, R> {
    /// Allocate a zero-filled tensor with extents `dims`.
    pub fn from_dims(dims: [usize; N]) -> Result<Self>
    where
        R: Default,
    {
        Self::from_shape(&dims)
    }

    /// Allocate a zero-filled tensor with extents `dims` in `runtime`.
    pub fn from_dims_with_runtime(dims: [usize; N], runtime: R) -> Result<Self> {
        Self::from_shape_with_runtime(&dims, runtime)
    }

    /// The shape as a fixed-size array.
    #[inline]
    pub fn dims(&self) -> [usize; N] {
        self.shape
    }

    /// Descriptors this tensor kind allocates with in `runtime`.
    pub fn descriptors(runtime: &R) -> Result<Descriptors> {
        let mut roots = RootGuard::new(runtime, FRAME_SLOTS);
        Fixed::<N>::descriptors::<T, R>(runtime, N, &mut roots)
    }
}
