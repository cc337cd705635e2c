//! Zero-copy adaptors over runtime-owned arrays.
//!
//! [`Container`] is the shared machinery: it holds a handle to a foreign
//! array, keeps it preserved for as long as the adaptor lives, and exposes the
//! array's buffer and header through non-owning views. The [`Dimension`]
//! parameter selects between the two public flavours:
//! - [`JlArray`]: rank known only at run time ([`Dyn`])
//! - [`JlTensor`]: rank fixed at compile time ([`Fixed`])
//!
//! Allocation never happens on the native side. Every new or resized array is
//! created by the runtime while its intermediate objects are held in a
//! [`RootGuard`] frame.

mod array;
mod nested;
mod strides;
mod tensor;

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};
use std::ptr::NonNull;
use std::slice;

use crate::buffer::{BufferView, BufferViewMut, ExtentsView};
use crate::element::Element;
use crate::error::{Error, Result};
use crate::expr::{
    assign, broadcast_into, ElementAccess, ElementAccessMut, Layout, Shaped, Stepper, Strided,
};
use crate::runtime::{ArrayRef, Heap, ObjectRef, RawExtents, RootGuard, Runtime};

pub use array::{Dyn, JlArray};
pub use nested::{Flat, Nested, NestedLiteral};
pub use strides::{checked_size, compute_contiguous_strides, compute_strides};
pub use tensor::{evict_descriptors, Fixed, JlTensor};

const ARRAY_TYPE_SLOT: usize = 0;
const TUPLE_TYPE_SLOT: usize = 1;
const DIMS_SLOT: usize = 2;
const ARRAY_SLOT: usize = 3;
const FRAME_SLOTS: usize = 4;

/// The runtime type objects needed to build an array of a given element type
/// and rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptors {
    /// `Array{T, rank}`.
    pub array_type: ObjectRef,
    /// The tuple type used to box a shape of `rank` extents.
    pub tuple_type: ObjectRef,
}

impl Descriptors {
    /// Ask the runtime for the descriptors of `T` at `rank`, rooting each one
    /// in `roots` as soon as it exists.
    pub fn compute<T: Element, R: Runtime>(
        runtime: &R,
        rank: usize,
        roots: &mut RootGuard<'_, R>,
    ) -> Result<Self> {
        let element = runtime.map_native_type(T::NATIVE)?;
        let array_type = runtime.apply_array_type(element, rank)?;
        roots.set(ARRAY_TYPE_SLOT, array_type);
        let tuple_type = runtime.shape_tuple_type(rank)?;
        roots.set(TUPLE_TYPE_SLOT, tuple_type);
        Ok(Self {
            array_type,
            tuple_type,
        })
    }

    /// Root already known descriptors in `roots`.
    pub fn root<R: Runtime>(&self, roots: &mut RootGuard<'_, R>) {
        roots.set(ARRAY_TYPE_SLOT, self.array_type);
        roots.set(TUPLE_TYPE_SLOT, self.tuple_type);
    }
}

/// How a container kind treats its rank.
///
/// Implemented by [`Dyn`] (any rank, shape read from the array header) and
/// [`Fixed<N>`] (rank `N`, shape copied at adoption).
pub trait Dimension: 'static {
    /// Name of the container kind, for diagnostics.
    const NAME: &'static str;

    /// Per-axis storage for strides and backstrides.
    type Seq: AsRef<[usize]> + AsMut<[usize]> + Clone + fmt::Debug;

    /// What the container keeps of the shape besides the array header.
    type ShapeCache: fmt::Debug;

    /// Whether `rank` is acceptable.
    fn check_rank(rank: usize) -> Result<()>;

    /// Shape of a default-constructed container.
    fn default_shape() -> Self::Seq;

    /// A zeroed sequence of `rank` entries. `rank` has passed
    /// [`check_rank`](Dimension::check_rank).
    fn zeros(rank: usize) -> Self::Seq;

    /// Build the shape cache from an adopted array's header.
    fn cache_shape(header: ExtentsView<'_>) -> Result<Self::ShapeCache>;

    /// The shape, served from the cache or straight from the header.
    fn shape_view<'a>(cache: &'a Self::ShapeCache, header: ExtentsView<'a>) -> ExtentsView<'a>;

    /// Descriptors for element type `T` at `rank`, rooted in `roots`.
    fn descriptors<T: Element, R: Runtime>(
        runtime: &R,
        rank: usize,
        roots: &mut RootGuard<'_, R>,
    ) -> Result<Descriptors>;
}

/// An adaptor over a foreign array owned by runtime `R`.
///
/// The container never owns the element buffer. It keeps the array alive by
/// preserving its handle with the runtime, and releases it on drop. Data,
/// shape and element queries all read the foreign object in place.
///
/// Use the aliases [`JlArray`] and [`JlTensor`] rather than naming this type
/// directly.
///
/// # Example
///
/// ```rust,ignore
/// use jltensor::JlArray;
///
/// let mut a = JlArray::<f64>::from_nested([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])?;
/// assert_eq!(a.shape(), [2, 3]);
/// assert_eq!(a.strides(), &[1, 2]);
/// assert_eq!(a[[1, 0]], 4.0);
///
/// a.reshape(&[3, 2])?;          // same buffer, new header
/// a.resize(&[4])?;              // new array from the runtime
/// ```
pub struct Container<T: Element, D: Dimension, R: Runtime = Heap> {
    runtime: R,
    handle: ArrayRef,
    data: NonNull<T>,
    len: usize,
    extents: RawExtents,
    shape: D::ShapeCache,
    strides: D::Seq,
    backstrides: D::Seq,
    _marker: PhantomData<T>,
}

impl<T: Element, D: Dimension, R: Runtime> Container<T, D, R> {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Allocate a default container: rank 1 with one element for [`JlArray`],
    /// all extents 1 for [`JlTensor`]. Elements are `T::default()`.
    pub fn new() -> Result<Self>
    where
        R: Default,
    {
        Self::new_with_runtime(R::default())
    }

    /// Allocate a default container in `runtime`.
    pub fn new_with_runtime(runtime: R) -> Result<Self> {
        Self::from_elem_with_runtime(D::default_shape().as_ref(), T::default(), runtime)
    }

    /// Allocate a zero-filled array of the given shape.
    pub fn from_shape(shape: &[usize]) -> Result<Self>
    where
        R: Default,
    {
        Self::from_shape_with_runtime(shape, R::default())
    }

    /// Allocate a zero-filled array of the given shape in `runtime`.
    pub fn from_shape_with_runtime(shape: &[usize], runtime: R) -> Result<Self> {
        Self::allocate(shape, runtime)
    }

    /// Allocate an array of the given shape with every element set to `value`.
    pub fn from_elem(shape: &[usize], value: T) -> Result<Self>
    where
        R: Default,
    {
        Self::from_elem_with_runtime(shape, value, R::default())
    }

    /// Allocate an array filled with `value` in `runtime`.
    pub fn from_elem_with_runtime(shape: &[usize], value: T, runtime: R) -> Result<Self> {
        let mut container = Self::allocate(shape, runtime)?;
        container.fill(value);
        Ok(container)
    }

    /// Allocate an array from a nested literal; its shape is the literal's.
    ///
    /// ```rust,ignore
    /// let t = JlTensor::<i32, 3>::from_nested([[[1, 2], [3, 4]], [[5, 6], [7, 8]]])?;
    /// assert_eq!(t[[1, 0, 1]], 6);
    /// ```
    pub fn from_nested<L, Depth>(literal: L) -> Result<Self>
    where
        L: NestedLiteral<T, Depth>,
        R: Default,
    {
        Self::from_nested_with_runtime(literal, R::default())
    }

    /// Allocate an array from a nested literal in `runtime`.
    pub fn from_nested_with_runtime<L, Depth>(literal: L, runtime: R) -> Result<Self>
    where
        L: NestedLiteral<T, Depth>,
    {
        let shape = L::shape();
        let mut container = Self::allocate(&shape, runtime)?;
        let mut stepper = Stepper::new(&container);
        let storage = container.as_mut_slice();
        while !stepper.is_done() {
            storage[stepper.offset()] = literal.value_at(stepper.index());
            stepper.advance();
        }
        Ok(container)
    }

    /// Evaluate an expression into a newly allocated array of its shape.
    pub fn from_expression<E>(expr: &E) -> Result<Self>
    where
        E: ElementAccess<Elem = T> + ?Sized,
        R: Default,
    {
        Self::from_expression_with_runtime(expr, R::default())
    }

    /// Evaluate an expression into a newly allocated array in `runtime`.
    pub fn from_expression_with_runtime<E>(expr: &E, runtime: R) -> Result<Self>
    where
        E: ElementAccess<Elem = T> + ?Sized,
    {
        let shape = expr.shape().to_vec();
        let mut container = Self::allocate(&shape, runtime)?;
        assign(&mut container, expr)?;
        Ok(container)
    }

    /// Adopt an existing foreign array without copying it.
    ///
    /// The element type must be `T` and, for [`JlTensor`], the rank must be
    /// `N`. The handle is preserved until the adaptor is dropped.
    ///
    /// # Safety
    ///
    /// `handle` must name a live array of `runtime`. While the adaptor
    /// exists, nothing else may write to the array's buffer, including other
    /// adaptors created from the same handle.
    pub unsafe fn from_handle(handle: ArrayRef, runtime: R) -> Result<Self> {
        Self::adopt(handle, runtime)
    }

    /// Allocate through the runtime. All intermediates stay rooted until the
    /// new array is adopted and preserved.
    fn allocate(shape: &[usize], runtime: R) -> Result<Self> {
        D::check_rank(shape.len())?;
        let mut roots = RootGuard::new(&runtime, FRAME_SLOTS);
        let descriptors = D::descriptors::<T, R>(&runtime, shape.len(), &mut roots)?;
        let dims = runtime.new_dims(descriptors.tuple_type, shape)?;
        roots.set(DIMS_SLOT, dims);
        let array = runtime.allocate_array(descriptors.array_type, dims)?;
        roots.set(ARRAY_SLOT, array);
        let container = Self::adopt(array, runtime.clone());
        drop(roots);
        container
    }

    /// Validate `handle`, cache its layout and preserve it.
    fn adopt(handle: ArrayRef, runtime: R) -> Result<Self> {
        let actual = runtime.array_eltype(handle)?;
        if actual != T::NATIVE {
            return Err(Error::ElementType {
                expected: T::NATIVE,
                actual,
            });
        }
        let rank = runtime.array_rank(handle)?;
        D::check_rank(rank)?;

        let len = runtime.array_length(handle)?;
        let extents = runtime.array_extents(handle)?;
        if extents.len != rank {
            return Err(Error::DescriptorMismatch(format!(
                "header of {:?} lists {} extents for rank {}",
                handle, extents.len, rank
            )));
        }
        // SAFETY: the header belongs to `handle`, which is live; the runtime
        // never rewrites the extents of an existing array.
        let header = unsafe { ExtentsView::from_raw(extents) };
        if checked_size(header) != Some(len) {
            return Err(Error::DescriptorMismatch(format!(
                "{:?} has {} elements but extents {:?}",
                handle, len, header
            )));
        }

        let raw = runtime.array_data_ptr(handle)?.cast::<T>();
        let data = match NonNull::new(raw) {
            Some(ptr) if raw.is_aligned() => ptr,
            None if len == 0 => NonNull::dangling(),
            _ => {
                return Err(Error::DescriptorMismatch(format!(
                    "data of {:?} at {:p} is not a valid {} buffer",
                    handle,
                    raw,
                    T::NATIVE
                )))
            }
        };

        let shape = D::cache_shape(header)?;
        let mut strides = D::zeros(rank);
        let mut backstrides = D::zeros(rank);
        compute_strides(header.iter(), strides.as_mut(), backstrides.as_mut());

        runtime.preserve(handle.as_object());
        tracing::trace!(?handle, shape = ?header, kind = D::NAME, "adopted foreign array");
        Ok(Self {
            runtime,
            handle,
            data,
            len,
            extents,
            shape,
            strides,
            backstrides,
            _marker: PhantomData,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Handle of the wrapped foreign array.
    #[inline]
    pub fn wrapped(&self) -> ArrayRef {
        self.handle
    }

    /// The runtime owning the array.
    #[inline]
    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Per-axis extents, read without copying.
    #[inline]
    pub fn shape(&self) -> ExtentsView<'_> {
        D::shape_view(&self.shape, self.header())
    }

    /// Element strides (column-major).
    #[inline]
    pub fn strides(&self) -> &[usize] {
        self.strides.as_ref()
    }

    /// `(extent - 1) * stride` per axis.
    #[inline]
    pub fn backstrides(&self) -> &[usize] {
        self.backstrides.as_ref()
    }

    /// Always [`Layout::ColumnMajor`].
    #[inline]
    pub fn layout(&self) -> Layout {
        Layout::ColumnMajor
    }

    /// Number of dimensions.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.extents.len
    }

    /// Total number of elements.
    #[inline]
    pub fn size(&self) -> usize {
        self.len
    }

    /// Whether the array holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// View of the element buffer.
    pub fn data(&self) -> BufferView<'_, T> {
        // SAFETY: the buffer holds `len` elements of `T` and stays alive while
        // the handle is preserved; `&self` forbids writes through the adaptor.
        unsafe { BufferView::from_raw_parts(self.data.as_ptr(), self.len) }
    }

    /// Mutable view of the element buffer.
    pub fn data_mut(&mut self) -> BufferViewMut<'_, T> {
        // SAFETY: as for `data`, with exclusivity from `&mut self`.
        unsafe { BufferViewMut::from_raw_parts(self.data.as_ptr(), self.len) }
    }

    /// The element buffer as a slice, in storage order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.data().as_slice()
    }

    /// The element buffer as a mutable slice, in storage order.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.data_mut().into_slice()
    }

    /// Raw pointer to the first element.
    #[inline]
    pub fn raw_data(&self) -> *const T {
        self.data.as_ptr()
    }

    /// Raw mutable pointer to the first element.
    #[inline]
    pub fn raw_data_mut(&mut self) -> *mut T {
        self.data.as_ptr()
    }

    /// Iterate the elements in storage order.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Iterate the elements mutably in storage order.
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Element at `index`, or `None` when out of bounds.
    ///
    /// An index with fewer entries than the rank addresses the trailing
    /// axes; extra leading entries are ignored.
    pub fn get(&self, index: &[usize]) -> Option<&T> {
        let offset = strides::offset_of(self.shape(), self.strides(), index)?;
        self.as_slice().get(offset)
    }

    /// Mutable element at `index`, or `None` when out of bounds.
    pub fn get_mut(&mut self, index: &[usize]) -> Option<&mut T> {
        let offset = strides::offset_of(self.shape(), self.strides(), index)?;
        self.as_mut_slice().get_mut(offset)
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: T) {
        self.as_mut_slice().fill(value);
    }

    /// Broadcast this shape into `shape`; see [`Shaped::broadcast_shape`].
    pub fn broadcast_shape(&self, shape: &mut [usize]) -> Result<bool> {
        broadcast_into(self.shape(), shape)
    }

    #[inline]
    fn header(&self) -> ExtentsView<'_> {
        // SAFETY: the handle is preserved for the lifetime of `self`, and the
        // runtime never rewrites the extents of an existing array.
        unsafe { ExtentsView::from_raw(self.extents) }
    }

    // ========================================================================
    // Shape changes
    // ========================================================================

    /// Change the shape, keeping the same element buffer.
    ///
    /// The element count must not change. Elements keep their storage
    /// positions, so the column-major linear order is preserved.
    ///
    /// # Errors
    ///
    /// - [`Error::DimensionMismatch`] if a [`JlTensor`] is given the wrong
    ///   number of extents
    /// - [`Error::SizeMismatch`] if the element count differs
    ///
    /// On error the container is unchanged.
    pub fn reshape(&mut self, shape: &[usize]) -> Result<()> {
        D::check_rank(shape.len())?;
        let requested = checked_size(shape.iter().copied());
        if requested != Some(self.len) {
            return Err(Error::SizeMismatch {
                shape: shape.to_vec(),
                current: self.len,
                requested: requested.unwrap_or(usize::MAX),
            });
        }

        let runtime = self.runtime.clone();
        let mut roots = RootGuard::new(&runtime, FRAME_SLOTS);
        let descriptors = D::descriptors::<T, R>(&runtime, shape.len(), &mut roots)?;
        let dims = runtime.new_dims(descriptors.tuple_type, shape)?;
        roots.set(DIMS_SLOT, dims);
        let reshaped = runtime.reshape_array(descriptors.array_type, self.handle, dims)?;
        roots.set(ARRAY_SLOT, reshaped);
        let adopted = Self::adopt(reshaped, runtime.clone())?;
        drop(roots);

        tracing::debug!(from = ?self.shape(), to = ?shape, kind = D::NAME, "reshaped array");
        *self = adopted;
        Ok(())
    }

    /// Change the shape, reallocating through the runtime.
    ///
    /// Does nothing when `shape` equals the current shape. Otherwise the
    /// container adopts a freshly allocated, zero-filled array; the previous
    /// contents are not carried over. On error the container is unchanged.
    pub fn resize(&mut self, shape: &[usize]) -> Result<()> {
        if self.shape() == shape {
            return Ok(());
        }
        let resized = Self::allocate(shape, self.runtime.clone())?;
        tracing::debug!(from = ?self.shape(), to = ?shape, kind = D::NAME, "resized array");
        *self = resized;
        Ok(())
    }

    /// Evaluate `expr` into this container, resizing it to the expression's
    /// shape first when they differ.
    pub fn assign_expr<E>(&mut self, expr: &E) -> Result<()>
    where
        E: ElementAccess<Elem = T> + ?Sized,
    {
        let shape = expr.shape().to_vec();
        self.resize(&shape)?;
        assign(self, expr)
    }

    /// Deep copy into a new foreign array of the same shape.
    pub fn try_clone(&self) -> Result<Self> {
        let shape = self.shape().to_vec();
        let mut copy = Self::allocate(&shape, self.runtime.clone())?;
        copy.as_mut_slice().copy_from_slice(self.as_slice());
        Ok(copy)
    }

    #[cold]
    fn out_of_bounds(&self, index: &[usize]) -> ! {
        panic!(
            "index {:?} out of bounds for shape {:?}",
            index,
            self.shape()
        )
    }
}

impl<T: Element, D: Dimension, R: Runtime> Drop for Container<T, D, R> {
    fn drop(&mut self) {
        self.runtime.release(self.handle.as_object());
    }
}

/// Deep copy through the runtime.
///
/// # Panics
///
/// Panics if the runtime cannot allocate the copy; use
/// [`Container::try_clone`] to handle that case.
impl<T: Element, D: Dimension, R: Runtime> Clone for Container<T, D, R> {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(err) => panic!("failed to copy {}: {}", D::NAME, err),
        }
    }

    /// Copies into the existing foreign array, reallocating only when the
    /// shapes differ.
    fn clone_from(&mut self, source: &Self) {
        let shape = source.shape().to_vec();
        if let Err(err) = self.resize(&shape) {
            panic!("failed to copy {}: {}", D::NAME, err);
        }
        self.as_mut_slice().copy_from_slice(source.as_slice());
    }
}

/// Allocates [`Container::new`] in the default runtime.
///
/// # Panics
///
/// Panics if the runtime cannot allocate the array.
impl<T: Element, D: Dimension, R: Runtime + Default> Default for Container<T, D, R> {
    fn default() -> Self {
        match Self::new() {
            Ok(container) => container,
            Err(err) => panic!("failed to allocate default {}: {}", D::NAME, err),
        }
    }
}

impl<T, D, R, D2, R2> PartialEq<Container<T, D2, R2>> for Container<T, D, R>
where
    T: Element,
    D: Dimension,
    R: Runtime,
    D2: Dimension,
    R2: Runtime,
{
    fn eq(&self, other: &Container<T, D2, R2>) -> bool {
        self.shape() == other.shape() && self.as_slice() == other.as_slice()
    }
}

impl<T: Element, D: Dimension, R: Runtime> fmt::Debug for Container<T, D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(D::NAME)
            .field("shape", &self.shape())
            .field("strides", &self.strides())
            .field("handle", &self.handle)
            .field("runtime", &R::name())
            .field("data", &self.as_slice())
            .finish()
    }
}

impl<T: Element, D: Dimension, R: Runtime, const K: usize> Index<[usize; K]>
    for Container<T, D, R>
{
    type Output = T;

    fn index(&self, index: [usize; K]) -> &T {
        match self.get(&index) {
            Some(value) => value,
            None => self.out_of_bounds(&index),
        }
    }
}

impl<T: Element, D: Dimension, R: Runtime, const K: usize> IndexMut<[usize; K]>
    for Container<T, D, R>
{
    fn index_mut(&mut self, index: [usize; K]) -> &mut T {
        let offset = strides::offset_of(self.shape(), self.strides(), &index);
        match offset {
            Some(offset) => &mut self.as_mut_slice()[offset],
            None => self.out_of_bounds(&index),
        }
    }
}

impl<T: Element, D: Dimension, R: Runtime> Index<&[usize]> for Container<T, D, R> {
    type Output = T;

    fn index(&self, index: &[usize]) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => self.out_of_bounds(index),
        }
    }
}

impl<T: Element, D: Dimension, R: Runtime> IndexMut<&[usize]> for Container<T, D, R> {
    fn index_mut(&mut self, index: &[usize]) -> &mut T {
        let offset = strides::offset_of(self.shape(), self.strides(), index);
        match offset {
            Some(offset) => &mut self.as_mut_slice()[offset],
            None => self.out_of_bounds(index),
        }
    }
}

impl<'a, T: Element, D: Dimension, R: Runtime> IntoIterator for &'a Container<T, D, R> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T: Element, D: Dimension, R: Runtime> IntoIterator for &'a mut Container<T, D, R> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

// ============================================================================
// Expression engine capabilities
// ============================================================================

impl<T: Element, D: Dimension, R: Runtime> Shaped for Container<T, D, R> {
    fn shape(&self) -> ExtentsView<'_> {
        Container::shape(self)
    }

    fn dimension(&self) -> usize {
        Container::dimension(self)
    }

    fn size(&self) -> usize {
        Container::size(self)
    }
}

impl<T: Element, D: Dimension, R: Runtime> Strided for Container<T, D, R> {
    fn strides(&self) -> &[usize] {
        Container::strides(self)
    }

    fn backstrides(&self) -> &[usize] {
        Container::backstrides(self)
    }

    fn layout(&self) -> Layout {
        Container::layout(self)
    }
}

impl<T: Element, D: Dimension, R: Runtime> ElementAccess for Container<T, D, R> {
    type Elem = T;

    #[inline]
    fn element(&self, index: &[usize]) -> T {
        self[index]
    }
}

impl<T: Element, D: Dimension, R: Runtime> ElementAccessMut for Container<T, D, R> {
    fn storage_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}
